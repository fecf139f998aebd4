//! Blocking facade over the async client.
//!
//! The batch pipeline is synchronous by design: a slow generation call
//! stalls the current batch, never the event subscription. This module owns
//! the async runtime so pipeline code stays free of it.

use crate::client::LlmClient;
use crate::error::{LlmError, LlmResult};
use crate::types::{GenerateOptions, GenerateRequest};
use tokio::runtime::Runtime;
use tome_config::LlmConfig;

/// Synchronous text generation, as consumed by the segmentation pipeline.
///
/// Transport retries and timeouts are the implementation's concern; a
/// returned error is fatal for the caller's current attempt only.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str, system: &str) -> LlmResult<String>;
}

/// Blocking adapter around [`LlmClient`].
pub struct BlockingLlm {
    client: LlmClient,
    rt: Runtime,
}

impl BlockingLlm {
    /// Create a blocking client from configuration.
    pub fn from_config(config: &LlmConfig) -> LlmResult<Self> {
        let client = LlmClient::from_config(config)?;
        let rt = Runtime::new().map_err(|e| LlmError::Runtime(e.to_string()))?;
        Ok(Self { client, rt })
    }

    /// Check if the generation server is reachable.
    pub fn is_available(&self) -> bool {
        self.rt.block_on(self.client.is_available())
    }
}

impl TextGenerator for BlockingLlm {
    fn generate(&self, prompt: &str, system: &str) -> LlmResult<String> {
        let request = GenerateRequest::new(self.client.model(), prompt)
            .with_system(system)
            .with_options(GenerateOptions::new().with_temperature(0.3));

        let response = self.rt.block_on(self.client.generate(request))?;
        Ok(response.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_client_creation() {
        let config = LlmConfig::default();
        assert!(BlockingLlm::from_config(&config).is_ok());
    }
}
