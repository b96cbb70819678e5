use crate::llm::gateway::ImageSource;
use crate::Data;
use tracing::{error, warn};

pub const GREETING: &str = "Hello! How can I help you today? Ask me any question.";
pub const APOLOGY: &str =
    "I'm sorry, I couldn't process your question right now. Please try again later.";
pub const NO_IMAGE_FOUND: &str =
    "I couldn't find a recent image from you in this channel. Attach one and try again.";

/// Fallback prompt for an image sent without any text.
const DEFAULT_VISION_PROMPT: &str = "What's in this image?";

/// Platform-independent view of one inbound message, after mention
/// stripping.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub text: String,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone)]
pub struct Attachment {
    pub url: String,
    pub media_type: Option<String>,
}

/// Which backend a message is routed to. First match wins: weather
/// pattern, then image attachments, then plain chat.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// Nothing left after stripping the mention: canned greeting, no
    /// backend call.
    Greet,
    Weather(Vec<String>),
    Vision {
        prompt: String,
        images: Vec<ImageRef>,
    },
    Chat {
        prompt: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRef {
    pub url: String,
    pub media_type: String,
}

pub fn classify(message: &InboundMessage) -> Route {
    if let Some(locations) = parse_weather_query(&message.text) {
        return Route::Weather(locations);
    }

    let images: Vec<ImageRef> = message
        .attachments
        .iter()
        .filter_map(|a| {
            let media_type = a.media_type.as_deref()?;
            media_type.starts_with("image/").then(|| ImageRef {
                url: a.url.clone(),
                media_type: media_type.to_string(),
            })
        })
        .collect();

    if !images.is_empty() {
        let prompt = if message.text.trim().is_empty() {
            DEFAULT_VISION_PROMPT.to_string()
        } else {
            message.text.trim().to_string()
        };
        return Route::Vision { prompt, images };
    }

    let prompt = message.text.trim();
    if prompt.is_empty() {
        return Route::Greet;
    }

    Route::Chat {
        prompt: prompt.to_string(),
    }
}

/// Recognize "... weather in <location[, location...]>" questions.
/// Returns the trimmed, non-empty locations in message order.
pub fn parse_weather_query(text: &str) -> Option<Vec<String>> {
    const PATTERN: &str = "weather in ";

    let lower = text.to_ascii_lowercase();
    let start = lower.find(PATTERN)? + PATTERN.len();

    let locations: Vec<String> = text[start..]
        .split(',')
        .map(|part| part.trim().trim_end_matches(['?', '!', '.']).trim())
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();

    if locations.is_empty() {
        None
    } else {
        Some(locations)
    }
}

/// Execute a route against the configured backends. Always produces a
/// user-facing string; backend failures become the fixed apology.
pub async fn respond(data: &Data, route: Route) -> String {
    match route {
        Route::Greet => GREETING.to_string(),
        Route::Weather(locations) => {
            let report = data.weather.get_weather(&locations).await;
            if !report.success {
                warn!(
                    "Weather agent failed for {:?}: {:?}",
                    locations, report.error
                );
            }
            report.text
        }
        Route::Vision { prompt, images } => {
            let Some(model) = data.catalog.resolve(&data.config.vision_model) else {
                error!(
                    "Configured vision model {} is not in the catalog",
                    data.config.vision_model
                );
                return APOLOGY.to_string();
            };
            let sources: Vec<ImageSource> = images
                .into_iter()
                .map(|i| ImageSource {
                    url: i.url,
                    media_type: i.media_type,
                })
                .collect();
            match data.gateway.complete(&prompt, model, &sources).await {
                Ok(text) => text,
                Err(e) => {
                    error!("Vision completion failed: {}", e);
                    APOLOGY.to_string()
                }
            }
        }
        Route::Chat { prompt } => {
            let Some(model) = data.catalog.resolve(&data.config.default_model) else {
                error!(
                    "Configured default model {} is not in the catalog",
                    data.config.default_model
                );
                return APOLOGY.to_string();
            };
            match data.gateway.complete(&prompt, model, &[]).await {
                Ok(text) => text,
                Err(e) => {
                    error!("Chat completion failed: {}", e);
                    APOLOGY.to_string()
                }
            }
        }
    }
}
