//! HTTP client for an Ollama-compatible text-generation API.

use crate::error::{LlmError, LlmResult};
use crate::types::*;
use reqwest::Client;
use std::time::Duration;
use tome_config::LlmConfig;
use tracing::debug;

/// Client for the text-generation service.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    host: String,
    model: String,
    timeout: Duration,
}

impl LlmClient {
    /// Create a new client from configuration.
    pub fn from_config(config: &LlmConfig) -> LlmResult<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LlmError::Http)?;

        Ok(Self {
            client,
            host: config.host.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout,
        })
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Check if the generation server is reachable.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.host);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Generate text (non-streaming).
    pub async fn generate(&self, request: GenerateRequest) -> LlmResult<GenerateResponse> {
        let url = format!("{}/api/generate", self.host);
        debug!("Generating with model {}", request.model);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::ServerNotRunning {
                        host: self.host.clone(),
                    }
                } else if e.is_timeout() {
                    LlmError::Timeout {
                        seconds: self.timeout.as_secs(),
                    }
                } else {
                    LlmError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();

            if text.contains("not found") || status.as_u16() == 404 {
                return Err(LlmError::ModelNotFound {
                    model: request.model,
                });
            }

            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let generate_response: GenerateResponse = response.json().await?;
        Ok(generate_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = LlmConfig::default();
        let client = LlmClient::from_config(&config);
        assert!(client.is_ok());
    }

    #[test]
    fn test_generate_request_builder() {
        let request = GenerateRequest::new("gpt-oss:20b", "Split this document.")
            .with_system("You are a document splitter.")
            .with_options(GenerateOptions::new().with_temperature(0.3));

        assert_eq!(request.model, "gpt-oss:20b");
        assert!(request.system.is_some());
        assert!(request.options.is_some());
        assert!(!request.stream);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let config = LlmConfig {
            host: "http://127.0.0.1:1".to_string(),
            ..LlmConfig::default()
        };
        let client = LlmClient::from_config(&config).unwrap();
        assert!(!client.is_available().await);
    }
}
