use crate::config::Config;
use crate::weather::tools::{GeocodeTool, RealtimeWeatherTool, Tool, ToolError};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolType,
        CreateChatCompletionRequestArgs, FunctionObjectArgs,
    },
    Client,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const SYSTEM_PROMPT: &str = "Be concise, reply with one sentence. \
Use the `get_lat_lng` tool to get the latitude and longitude of the locations, \
then use the `get_weather` tool to get the weather for each location. \
Include temperature and weather conditions in your response.";

const WEATHER_APOLOGY: &str = "Sorry, I couldn't get the weather information at this time.";

/// End-to-end budget for one agent run.
const AGENT_TIMEOUT: Duration = Duration::from_secs(45);
/// Additional attempts allowed after a retryable tool failure.
const TOOL_RETRY_BUDGET: u32 = 2;
/// Hard cap on model round-trips per run.
const MAX_ITERATIONS: u32 = 8;

pub struct WeatherReport {
    pub text: String,
    pub success: bool,
    pub error: Option<String>,
}

enum AgentState {
    AwaitingModel,
    ExecutingTools(Vec<ChatCompletionMessageToolCall>),
    Done(String),
}

/// Tool-calling agent that answers natural-language weather questions by
/// letting the model drive the geocode and weather tools.
pub struct WeatherAgent {
    llm: Client<OpenAIConfig>,
    model: String,
    tools: Vec<Arc<dyn Tool>>,
}

impl WeatherAgent {
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_base(&config.groq_api_base)
            .with_api_key(&config.groq_api_key);

        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(GeocodeTool {
                http: http.clone(),
                api_key: config.geo_api_key.clone(),
                endpoint: config.geocode_url.clone(),
            }),
            Arc::new(RealtimeWeatherTool {
                http,
                api_key: config.weather_api_key.clone(),
                endpoint: config.weather_url.clone(),
            }),
        ];

        Self {
            llm: Client::with_config(openai_config),
            model: config.weather_agent_model.clone(),
            tools,
        }
    }

    /// Answer a weather question for one or more locations. All failures
    /// (timeout, exhausted retries, transport errors) are converted into a
    /// report here and never propagate to the dispatch layer.
    pub async fn get_weather(&self, locations: &[String]) -> WeatherReport {
        if locations.is_empty() {
            return WeatherReport {
                text: WEATHER_APOLOGY.to_string(),
                success: false,
                error: Some("no locations provided".to_string()),
            };
        }

        let question = format_question(locations);
        info!("Querying weather agent with prompt: {}", question);

        match tokio::time::timeout(AGENT_TIMEOUT, self.run(&question)).await {
            Ok(Ok(text)) => WeatherReport {
                text,
                success: true,
                error: None,
            },
            Ok(Err(e)) => {
                error!("Error running weather agent: {}", e);
                WeatherReport {
                    text: WEATHER_APOLOGY.to_string(),
                    success: false,
                    error: Some(e.to_string()),
                }
            }
            Err(_) => {
                error!(
                    "Weather agent timed out after {}s",
                    AGENT_TIMEOUT.as_secs()
                );
                WeatherReport {
                    text: WEATHER_APOLOGY.to_string(),
                    success: false,
                    error: Some(format!(
                        "weather agent timed out after {}s",
                        AGENT_TIMEOUT.as_secs()
                    )),
                }
            }
        }
    }

    async fn run(&self, question: &str) -> anyhow::Result<String> {
        let tool_definitions = self.tool_definitions()?;

        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(question)
                .build()?
                .into(),
        ];

        let mut retries_left = TOOL_RETRY_BUDGET;
        let mut iterations = 0;
        let mut state = AgentState::AwaitingModel;

        loop {
            state = match state {
                AgentState::AwaitingModel => {
                    iterations += 1;
                    if iterations > MAX_ITERATIONS {
                        anyhow::bail!("weather agent exceeded {} iterations", MAX_ITERATIONS);
                    }

                    let request = CreateChatCompletionRequestArgs::default()
                        .model(&self.model)
                        .messages(messages.clone())
                        .tools(tool_definitions.clone())
                        .build()?;

                    let response = self.llm.chat().create(request).await?;
                    let message = response
                        .choices
                        .into_iter()
                        .next()
                        .ok_or_else(|| anyhow::anyhow!("no response from LLM"))?
                        .message;

                    match message.tool_calls.filter(|calls| !calls.is_empty()) {
                        Some(tool_calls) => {
                            info!("Weather agent requested {} tool calls", tool_calls.len());
                            messages.push(
                                ChatCompletionRequestAssistantMessageArgs::default()
                                    .tool_calls(tool_calls.clone())
                                    .build()?
                                    .into(),
                            );
                            AgentState::ExecutingTools(tool_calls)
                        }
                        None => AgentState::Done(message.content.unwrap_or_default()),
                    }
                }
                AgentState::ExecutingTools(tool_calls) => {
                    for tool_call in &tool_calls {
                        let content = match self.execute_tool_call(tool_call).await {
                            Ok(result) => result.to_string(),
                            Err(ToolError::Retryable(msg)) => {
                                if retries_left == 0 {
                                    anyhow::bail!("tool retries exhausted: {}", msg);
                                }
                                retries_left -= 1;
                                warn!(
                                    "Retryable tool failure ({} retries left): {}",
                                    retries_left, msg
                                );
                                msg
                            }
                            Err(ToolError::Fatal(e)) => return Err(e),
                        };

                        messages.push(
                            ChatCompletionRequestToolMessageArgs::default()
                                .tool_call_id(tool_call.id.clone())
                                .content(content)
                                .build()?
                                .into(),
                        );
                    }
                    AgentState::AwaitingModel
                }
                AgentState::Done(text) => return Ok(text),
            };
        }
    }

    async fn execute_tool_call(
        &self,
        tool_call: &ChatCompletionMessageToolCall,
    ) -> Result<Value, ToolError> {
        let name = &tool_call.function.name;
        let arguments: Value = serde_json::from_str(&tool_call.function.arguments)
            .map_err(|e| ToolError::Retryable(format!("invalid arguments for {}: {}", name, e)))?;

        info!("Weather agent executing tool {} with {}", name, arguments);

        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ToolError::Retryable(format!("unknown tool: {}", name)))?;

        tool.execute(arguments).await
    }

    fn tool_definitions(&self) -> anyhow::Result<Vec<ChatCompletionTool>> {
        self.tools
            .iter()
            .map(|tool| {
                Ok(ChatCompletionToolArgs::default()
                    .r#type(ChatCompletionToolType::Function)
                    .function(
                        FunctionObjectArgs::default()
                            .name(tool.name())
                            .description(tool.description())
                            .parameters(tool.parameters_schema())
                            .build()?,
                    )
                    .build()?)
            })
            .collect()
    }
}

/// "Tokyo", "Tokyo and London", "Tokyo, London and Paris".
fn format_question(locations: &[String]) -> String {
    let joined = if locations.len() == 1 {
        locations[0].clone()
    } else {
        format!(
            "{} and {}",
            locations[..locations.len() - 1].join(", "),
            locations[locations.len() - 1]
        )
    };
    format!("What is the current weather in {}?", joined)
}
