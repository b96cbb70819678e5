use groqcord::commands::{chat, info, vision, weather};
use groqcord::{config::Config, mention, Data};
use poise::serenity_prelude as serenity;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    let discord_token = config.discord_token.clone();
    let bot_prefix = config.bot_prefix.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                chat::groq(),
                vision::vision(),
                weather::weather(),
                info::models(),
                info::bothelp(),
            ],
            prefix_options: groqcord::prefix_options(bot_prefix),
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    if let serenity::FullEvent::Message { new_message } = event {
                        if !new_message.author.bot
                            && new_message.mentions_user_id(serenity::UserId::new(data.bot_id))
                        {
                            if let Err(e) = mention::handle_mention(ctx, new_message, data).await {
                                error!("Failed to handle mention: {}", e);
                            }
                        }
                    }
                    Ok(())
                })
            },
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot is ready!");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                // Set bot status
                ctx.set_activity(Some(serenity::ActivityData::custom(&config.status_message)));

                let http_client = reqwest::Client::new();
                let gateway =
                    groqcord::llm::gateway::GroqClient::new(&config, http_client.clone());
                let weather_agent =
                    groqcord::weather::agent::WeatherAgent::new(&config, http_client);
                let catalog = groqcord::models::ModelCatalog::builtin();
                let bot_id = ready.user.id.get();

                Ok(Data {
                    config,
                    gateway,
                    weather: weather_agent,
                    catalog,
                    bot_id,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MESSAGES;

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}
