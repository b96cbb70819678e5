/// A model the bot is allowed to route requests to.
///
/// The catalog is authoritative: user-supplied model ids that are not listed
/// here are rejected up front instead of being passed through to the API.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub id: String,
    pub description: String,
    pub supports_vision: bool,
}

pub struct ModelCatalog {
    models: Vec<ModelSpec>,
}

impl ModelCatalog {
    /// Groq models the bot knows about.
    pub fn builtin() -> Self {
        let entry = |id: &str, description: &str, supports_vision: bool| ModelSpec {
            id: id.to_string(),
            description: description.to_string(),
            supports_vision,
        };

        Self {
            models: vec![
                entry("llama3-8b-8192", "Meta's Llama 3 8B model (fastest)", false),
                entry(
                    "llama3-70b-8192",
                    "Meta's Llama 3 70B model (more capable, default)",
                    false,
                ),
                entry(
                    "llama-3.1-70b-versatile",
                    "Llama 3.1 70B tuned for tool use",
                    false,
                ),
                entry(
                    "mixtral-8x7b-32768",
                    "Mixtral 8x7B model with 32k context",
                    false,
                ),
                entry("gemma-7b-it", "Google's Gemma 7B model", false),
                entry(
                    "llama-3.2-11b-vision-preview",
                    "Llama 3.2 11B with image understanding",
                    true,
                ),
                entry(
                    "llama-3.2-90b-vision-preview",
                    "Llama 3.2 90B with image understanding",
                    true,
                ),
            ],
        }
    }

    pub fn resolve(&self, id: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn list(&self) -> &[ModelSpec] {
        &self.models
    }

    /// Text block for the `models` command.
    pub fn render_info(&self) -> String {
        let mut out = String::from("Available Groq Models:\n");
        for model in &self.models {
            out.push_str(&format!("- {}: {}", model.id, model.description));
            if model.supports_vision {
                out.push_str(" [vision]");
            }
            out.push('\n');
        }
        out.push_str(
            "\nUsage:\n- Just mention me with your question\n\
             - Or use the groq command with an explicit model id",
        );
        out
    }
}
