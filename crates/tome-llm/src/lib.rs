//! Tome LLM - Text-generation service client.
//!
//! The segmentation pipeline consumes text generation through the blocking
//! [`TextGenerator`] trait; [`LlmClient`] is the async HTTP client for an
//! Ollama-compatible API and [`BlockingLlm`] adapts it to the trait.

mod blocking;
mod client;
mod error;
mod types;

pub use blocking::{BlockingLlm, TextGenerator};
pub use client::LlmClient;
pub use error::{LlmError, LlmResult};
pub use types::*;
