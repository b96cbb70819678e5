use crate::commands::send_chunked;
use crate::dispatch::{APOLOGY, NO_IMAGE_FOUND};
use crate::llm::gateway::ImageSource;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use tracing::error;

/// How far back to look for an image from the requesting user.
const IMAGE_LOOKBACK: u8 = 10;

/// Ask a vision model about a recently posted image
#[poise::command(slash_command, prefix_command)]
pub async fn vision(
    ctx: Context<'_>,
    #[description = "What to ask about the image"] prompt: String,
    #[description = "Vision model id (see the models command)"] model: Option<String>,
) -> Result<(), Error> {
    ctx.defer().await?;

    let data = ctx.data();
    let model_id = model.unwrap_or_else(|| data.config.vision_model.clone());
    let Some(model) = data.catalog.resolve(&model_id) else {
        ctx.say(format!(
            "Unknown model `{}`. Use the models command to see what's available.",
            model_id
        ))
        .await?;
        return Ok(());
    };
    if !model.supports_vision {
        ctx.say(format!("Model `{}` does not accept images.", model_id))
            .await?;
        return Ok(());
    }

    let images = find_recent_images(&ctx).await?;
    if images.is_empty() {
        ctx.say(NO_IMAGE_FOUND).await?;
        return Ok(());
    }

    let response = match data.gateway.complete(&prompt, model, &images).await {
        Ok(r) => r,
        Err(e) => {
            error!("Vision completion failed: {}", e);
            APOLOGY.to_string()
        }
    };

    send_chunked(&ctx, &response).await
}

/// Prefer attachments on the invoking message; otherwise take the newest of
/// the author's last few channel messages that carries an image.
async fn find_recent_images(ctx: &Context<'_>) -> Result<Vec<ImageSource>, Error> {
    if let poise::Context::Prefix(prefix_ctx) = ctx {
        let images = image_sources(&prefix_ctx.msg.attachments);
        if !images.is_empty() {
            return Ok(images);
        }
    }

    let builder = serenity::GetMessages::new().limit(IMAGE_LOOKBACK);
    let recent = ctx
        .channel_id()
        .messages(&ctx.serenity_context().http, builder)
        .await?;

    for message in recent.iter().filter(|m| m.author.id == ctx.author().id) {
        let images = image_sources(&message.attachments);
        if !images.is_empty() {
            return Ok(images);
        }
    }

    Ok(Vec::new())
}

fn image_sources(attachments: &[serenity::Attachment]) -> Vec<ImageSource> {
    attachments
        .iter()
        .filter(|a| {
            a.content_type
                .as_deref()
                .is_some_and(|ct| ct.starts_with("image/"))
        })
        .map(|a| ImageSource {
            url: a.url.clone(),
            media_type: a
                .content_type
                .clone()
                .unwrap_or_else(|| "image/jpeg".to_string()),
        })
        .collect()
}
