pub mod chat;
pub mod info;
pub mod vision;
pub mod weather;

use crate::chunk::chunk_message;
use crate::config::DISCORD_MESSAGE_LIMIT;
use crate::{Context, Error};

/// Send a response as one or more messages, each within Discord's limit.
pub(crate) async fn send_chunked(ctx: &Context<'_>, content: &str) -> Result<(), Error> {
    for chunk in chunk_message(content, DISCORD_MESSAGE_LIMIT) {
        ctx.say(chunk).await?;
    }
    Ok(())
}
