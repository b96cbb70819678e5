use crate::commands::send_chunked;
use crate::dispatch::APOLOGY;
use crate::{Context, Error};
use tracing::error;

/// Ask a question using the Groq API
#[poise::command(slash_command, prefix_command)]
pub async fn groq(
    ctx: Context<'_>,
    #[description = "Your question or prompt"] prompt: String,
    #[description = "Model id (see the models command)"] model: Option<String>,
) -> Result<(), Error> {
    ctx.defer().await?;

    let data = ctx.data();
    let model_id = model.unwrap_or_else(|| data.config.default_model.clone());
    let Some(model) = data.catalog.resolve(&model_id) else {
        ctx.say(format!(
            "Unknown model `{}`. Use the models command to see what's available.",
            model_id
        ))
        .await?;
        return Ok(());
    };

    let response = match data.gateway.complete(&prompt, model, &[]).await {
        Ok(r) => r,
        Err(e) => {
            error!("Groq completion failed: {}", e);
            APOLOGY.to_string()
        }
    };

    send_chunked(&ctx, &response).await
}
