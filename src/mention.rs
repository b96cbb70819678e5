use crate::chunk::chunk_message;
use crate::config::DISCORD_MESSAGE_LIMIT;
use crate::discord_text::strip_bot_mentions;
use crate::dispatch::{self, Attachment, InboundMessage, Route};
use crate::{Data, Error};
use poise::serenity_prelude as serenity;
use tracing::info;

/// Handle a message where the bot is mentioned/tagged.
pub async fn handle_mention(
    ctx: &serenity::Context,
    new_message: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    info!(
        "Handling mention from {} in channel {}",
        new_message.author.name, new_message.channel_id
    );

    let text = strip_bot_mentions(&new_message.content, data.bot_id);
    let inbound = InboundMessage {
        text,
        attachments: new_message
            .attachments
            .iter()
            .map(|a| Attachment {
                url: a.url.clone(),
                media_type: a.content_type.clone(),
            })
            .collect(),
    };

    let route = dispatch::classify(&inbound);

    // Someone only pinged the bot; greet without touching any backend.
    if route == Route::Greet {
        new_message
            .channel_id
            .say(&ctx.http, dispatch::GREETING)
            .await?;
        return Ok(());
    }

    let typing = new_message.channel_id.start_typing(&ctx.http);
    let response = dispatch::respond(data, route).await;
    drop(typing);

    for chunk in chunk_message(&response, DISCORD_MESSAGE_LIMIT) {
        new_message.channel_id.say(&ctx.http, chunk).await?;
    }

    Ok(())
}
