use crate::commands::send_chunked;
use crate::{Context, Error};
use tracing::warn;

/// Get the current weather for one or more locations
#[poise::command(slash_command, prefix_command)]
pub async fn weather(
    ctx: Context<'_>,
    #[description = "One or more locations, comma separated"]
    #[rest]
    locations: String,
) -> Result<(), Error> {
    let list: Vec<String> = locations
        .split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect();

    if list.is_empty() {
        ctx.say("Give me at least one location, e.g. `weather Tokyo, London`.")
            .await?;
        return Ok(());
    }

    ctx.defer().await?;

    let report = ctx.data().weather.get_weather(&list).await;
    if !report.success {
        warn!("Weather agent failed for {:?}: {:?}", list, report.error);
    }

    send_chunked(&ctx, &report.text).await
}
