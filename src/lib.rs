pub mod chunk;
pub mod commands;
pub mod config;
pub mod discord_text;
pub mod dispatch;
pub mod images;
pub mod llm;
pub mod mention;
pub mod models;
pub mod weather;

/// Custom data passed to all commands
pub struct Data {
    pub config: config::Config,
    pub gateway: llm::gateway::GroqClient,
    pub weather: weather::agent::WeatherAgent,
    pub catalog: models::ModelCatalog,
    /// Bot's own user ID for mention stripping
    pub bot_id: u64,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Prefix-command parsing setup. Mentions are never treated as a command
/// prefix: they belong exclusively to `mention::handle_mention`, so each
/// mention is routed exactly once.
pub fn prefix_options(prefix: String) -> poise::PrefixFrameworkOptions<Data, Error> {
    poise::PrefixFrameworkOptions {
        prefix: Some(prefix),
        mention_as_prefix: false,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mentions_are_not_a_command_prefix() {
        let options = prefix_options("!".to_string());
        assert!(!options.mention_as_prefix);
        assert_eq!(options.prefix.as_deref(), Some("!"));
    }
}
