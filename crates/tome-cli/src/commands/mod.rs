//! CLI command implementations.

pub mod config;
pub mod ingest;
pub mod init;
pub mod list;
pub mod remove;
pub mod search;
pub mod status;
pub mod watch;

use anyhow::Result;
use std::sync::Arc;
use tome_config::{AppPaths, Config};
use tome_ingest::IngestPipeline;
use tome_llm::BlockingLlm;
use tome_store::{DocumentStore, SqliteStore};

/// Load config and paths, opening the store.
///
/// An unreachable store is fatal for the process.
pub fn open_context() -> Result<(Config, AppPaths, Arc<dyn DocumentStore>)> {
    let config = Config::load().unwrap_or_default();
    let paths =
        AppPaths::new().ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;

    let store = SqliteStore::open(&paths.store_file)?;
    Ok((config, paths, Arc::new(store)))
}

/// Build the ingestion pipeline backed by the configured generation service.
pub fn build_pipeline(config: &Config, store: Arc<dyn DocumentStore>) -> Result<IngestPipeline> {
    let generator = BlockingLlm::from_config(&config.llm)?;

    if !generator.is_available() {
        anyhow::bail!(
            "Text-generation server is not reachable at {}",
            config.llm.host
        );
    }

    Ok(IngestPipeline::new(config, Box::new(generator), store))
}
