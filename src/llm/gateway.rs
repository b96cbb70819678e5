use crate::config::Config;
use crate::images;
use crate::models::ModelSpec;
use serde_json::{json, Value};
use tracing::{error, warn};

/// An attachment the gateway may inline into a multimodal request.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub url: String,
    pub media_type: String,
}

/// Stateless client for the Groq chat-completions endpoint.
pub struct GroqClient {
    http: reqwest::Client,
    api_key: String,
    completions_url: String,
}

impl GroqClient {
    pub fn new(config: &Config, http: reqwest::Client) -> Self {
        Self {
            http,
            api_key: config.groq_api_key.clone(),
            completions_url: format!(
                "{}/chat/completions",
                config.groq_api_base.trim_end_matches('/')
            ),
        }
    }

    /// Run a single-turn completion. Images are only inlined when the model
    /// accepts them; individual download failures drop that image rather
    /// than failing the request. Any HTTP or transport failure is an error
    /// the caller turns into a user-facing apology.
    pub async fn complete(
        &self,
        prompt: &str,
        model: &ModelSpec,
        images: &[ImageSource],
    ) -> anyhow::Result<String> {
        if !images.is_empty() && !model.supports_vision {
            warn!(
                "Model {} does not accept images; sending text only",
                model.id
            );
        }

        let image_parts = if model.supports_vision {
            self.collect_image_parts(images).await
        } else {
            Vec::new()
        };

        let body = build_request_body(prompt, &model.id, &image_parts);

        let response = self
            .http
            .post(&self.completions_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Groq API returned {}: {}", status, error_text);
            anyhow::bail!("chat completion failed with status {}", status);
        }

        let result: Value = response.json().await?;
        let content = result["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("completion response had no message content"))?;

        Ok(content.to_string())
    }

    /// Download and inline each image as a base64 data URI, skipping any
    /// that fail to fetch.
    async fn collect_image_parts(&self, images: &[ImageSource]) -> Vec<String> {
        let mut parts = Vec::new();
        for image in images {
            match images::fetch_image(&self.http, &image.url).await {
                Ok(bytes) => parts.push(images::encode_data_uri(&bytes, &image.media_type)),
                Err(e) => warn!("Dropping image {}: {}", image.url, e),
            }
        }
        parts
    }
}

/// Build the chat-completions request body. With image parts present the
/// content is exactly one text part followed by the image parts, otherwise
/// the prompt goes through as a plain string.
fn build_request_body(prompt: &str, model_id: &str, image_parts: &[String]) -> Value {
    let content: Value = if image_parts.is_empty() {
        Value::String(prompt.to_string())
    } else {
        let mut parts = vec![json!({"type": "text", "text": prompt})];
        for uri in image_parts {
            parts.push(json!({"type": "image_url", "image_url": {"url": uri}}));
        }
        Value::Array(parts)
    };

    json!({
        "model": model_id,
        "messages": [{"role": "user", "content": content}],
        "temperature": 0.7,
        "max_tokens": 1024
    })
}

#[cfg(test)]
pub mod test_support {
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    /// Serve a single canned HTTP response on a loopback port.
    pub async fn serve_once(response: impl Into<String>) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = response.into();

        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = vec![0u8; 65536];
                let _ = stream.read(&mut buf).await;
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        addr
    }

    pub fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{http_response, serve_once};
    use super::*;

    fn text_model() -> ModelSpec {
        ModelSpec {
            id: "llama3-70b-8192".to_string(),
            description: String::new(),
            supports_vision: false,
        }
    }

    fn vision_model() -> ModelSpec {
        ModelSpec {
            id: "llama-3.2-11b-vision-preview".to_string(),
            description: String::new(),
            supports_vision: true,
        }
    }

    fn client_for(addr: std::net::SocketAddr) -> GroqClient {
        GroqClient {
            http: reqwest::Client::new(),
            api_key: "test-key".to_string(),
            completions_url: format!("http://{}/chat/completions", addr),
        }
    }

    #[test]
    fn plain_prompt_body_is_a_string() {
        let body = build_request_body("hello", "llama3-70b-8192", &[]);
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn multimodal_body_has_one_text_part_then_images() {
        let parts = vec![
            "data:image/png;base64,AAAA".to_string(),
            "data:image/jpeg;base64,BBBB".to_string(),
        ];
        let body = build_request_body("what is this?", "llama-3.2-11b-vision-preview", &parts);
        let content = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 3);
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "what is this?");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "data:image/png;base64,AAAA");
        assert_eq!(content[2]["image_url"]["url"], "data:image/jpeg;base64,BBBB");
    }

    #[tokio::test]
    async fn extracts_completion_text_on_success() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Paris."}}]}"#;
        let addr = serve_once(http_response("200 OK", body)).await;

        let result = client_for(addr)
            .complete("capital of France?", &text_model(), &[])
            .await
            .unwrap();
        assert_eq!(result, "Paris.");
    }

    #[tokio::test]
    async fn non_200_status_is_an_error_not_a_panic() {
        let addr = serve_once(http_response(
            "500 Internal Server Error",
            r#"{"error":"boom"}"#,
        ))
        .await;

        let result = client_for(addr).complete("hi", &text_model(), &[]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn failed_image_downloads_are_dropped_not_fatal() {
        let good = serve_once("HTTP/1.1 200 OK\r\ncontent-length: 3\r\nconnection: close\r\n\r\nabc").await;
        let bad = serve_once("HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n").await;

        let client = client_for(good); // completions_url unused here
        let sources = vec![
            ImageSource {
                url: format!("http://{}/a.png", bad),
                media_type: "image/png".to_string(),
            },
            ImageSource {
                url: format!("http://{}/b.png", good),
                media_type: "image/png".to_string(),
            },
        ];

        let parts = client.collect_image_parts(&sources).await;
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0], "data:image/png;base64,YWJj");
    }
}
