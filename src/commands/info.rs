use crate::{Context, Error};

const HELP_TEXT: &str = "I'm your helpful AI assistant powered by Groq LLMs!

How to use me:
- Just mention me with your question
- I'll respond to your questions and help with information

Commands:
- groq <prompt> [model] - Ask using a specific model
- vision <prompt> [model] - Ask about your most recently posted image
- weather <location[, location...]> - Current weather for one or more places
- models - See available AI models
- bothelp - Display this help message

Example:
@BotName What's the capital of France?";

/// Display available Groq models
#[poise::command(slash_command, prefix_command)]
pub async fn models(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(ctx.data().catalog.render_info()).await?;
    Ok(())
}

/// Display bot usage information
#[poise::command(slash_command, prefix_command)]
pub async fn bothelp(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(HELP_TEXT).await?;
    Ok(())
}
