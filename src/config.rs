use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub bot_prefix: String,
    pub groq_api_key: String,
    pub groq_api_base: String,
    pub default_model: String,
    pub vision_model: String,
    pub weather_agent_model: String,
    pub weather_api_key: Option<String>,
    pub geo_api_key: Option<String>,
    pub geocode_url: String,
    pub weather_url: String,
    pub status_message: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        Ok(Config {
            discord_token: env::var("DISCORD_TOKEN")
                .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?,
            bot_prefix: env::var("BOT_PREFIX").unwrap_or_else(|_| "!".to_string()),
            groq_api_key: env::var("GROQ_API_KEY")
                .map_err(|_| anyhow::anyhow!("GROQ_API_KEY must be set"))?,
            groq_api_base: env::var("GROQ_API_BASE")
                .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string()),
            default_model: env::var("DEFAULT_MODEL")
                .unwrap_or_else(|_| "llama3-70b-8192".to_string()),
            vision_model: env::var("VISION_MODEL")
                .unwrap_or_else(|_| "llama-3.2-11b-vision-preview".to_string()),
            weather_agent_model: env::var("WEATHER_AGENT_MODEL")
                .unwrap_or_else(|_| "llama-3.1-70b-versatile".to_string()),
            // Missing keys switch the weather tools to deterministic offline data.
            weather_api_key: env::var("WEATHER_API_KEY").ok(),
            geo_api_key: env::var("GEO_API_KEY").ok(),
            geocode_url: env::var("GEOCODE_URL")
                .unwrap_or_else(|_| "https://geocode.maps.co/search".to_string()),
            weather_url: env::var("WEATHER_URL")
                .unwrap_or_else(|_| "https://api.tomorrow.io/v4/weather/realtime".to_string()),
            status_message: env::var("STATUS_MESSAGE")
                .unwrap_or_else(|_| "Mention me with a question!".to_string()),
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("bot_prefix", &self.bot_prefix)
            .field("groq_api_key", &"[REDACTED]")
            .field("groq_api_base", &self.groq_api_base)
            .field("default_model", &self.default_model)
            .field("vision_model", &self.vision_model)
            .field("weather_agent_model", &self.weather_agent_model)
            .field(
                "weather_api_key",
                &self.weather_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "geo_api_key",
                &self.geo_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("geocode_url", &self.geocode_url)
            .field("weather_url", &self.weather_url)
            .field("status_message", &self.status_message)
            .finish()
    }
}

/// Discord message limit is 2000 characters
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_logic() {
        // 1. Test missing vars
        env::remove_var("DISCORD_TOKEN");
        env::remove_var("GROQ_API_KEY");
        let result = Config::build();
        assert!(
            result.is_err(),
            "Should fail when required vars are missing"
        );

        // 2. Test defaults
        env::set_var("DISCORD_TOKEN", "test_token");
        env::set_var("GROQ_API_KEY", "secret_api_key");
        let config = Config::build().unwrap();
        assert_eq!(config.discord_token, "test_token");
        assert_eq!(config.bot_prefix, "!");
        assert_eq!(config.default_model, "llama3-70b-8192");
        assert!(config.weather_api_key.is_none());
        assert!(config.geo_api_key.is_none());

        // 3. Test debug redaction
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("test_token"));
        assert!(!debug_output.contains("secret_api_key"));
        assert!(debug_output.contains("[REDACTED]"));

        // Cleanup
        env::remove_var("DISCORD_TOKEN");
        env::remove_var("GROQ_API_KEY");
    }
}
