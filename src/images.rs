use base64::Engine;
use reqwest::Client;
use tracing::warn;

/// Download attachment bytes. Single GET, no retry; the caller decides
/// whether a failed image is fatal or just dropped from the request.
pub async fn fetch_image(client: &Client, url: &str) -> anyhow::Result<Vec<u8>> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        warn!("Image fetch for {} returned {}", url, response.status());
        anyhow::bail!("image fetch failed with status {}", response.status());
    }

    Ok(response.bytes().await?.to_vec())
}

/// Encode raw image bytes as an inline data URI for multimodal requests.
pub fn encode_data_uri(bytes: &[u8], media_type: &str) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", media_type, payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_data_uri() {
        let uri = encode_data_uri(b"abc", "image/png");
        assert_eq!(uri, "data:image/png;base64,YWJj");
    }

    #[tokio::test]
    async fn non_2xx_is_an_error() {
        let addr = crate::llm::gateway::test_support::serve_once(
            "HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;
        let client = Client::new();
        let result = fetch_image(&client, &format!("http://{}/missing.png", addr)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn fetches_bytes_on_success() {
        let addr = crate::llm::gateway::test_support::serve_once(
            "HTTP/1.1 200 OK\r\ncontent-length: 4\r\nconnection: close\r\n\r\nPNG!",
        )
        .await;
        let client = Client::new();
        let bytes = fetch_image(&client, &format!("http://{}/ok.png", addr))
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"PNG!");
    }
}
