//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub chunking: ChunkingConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&paths.config_file)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &PathBuf) -> ConfigResult<()> {
        let default_config = Self::default_config_string();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, default_config)?;
        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Tome Configuration
# Document ingestion and versioned knowledge store

[general]
# Data directory for the store and manifest
# data_dir = "~/.local/share/tome"

[watch]
# Directories to watch for document changes
directories = [
    # "~/Documents/Papers",
]

# File patterns to ignore
ignore_patterns = [
    "*.tmp",
    "*.part",
    ".DS_Store",
    "._*",
]

# Interval between batch drains (seconds)
batch_interval_seconds = 2

[extraction]
# Pages yielding fewer characters than this go to OCR fallback
min_chars_per_page = 20

# Enable OCR fallback (requires tesseract and pdftoppm)
ocr_enabled = true

# Tesseract language code
ocr_language = "eng"

[chunking]
# Target chunk size in characters
target_chunk_chars = 500

# Accepted coverage gap between chunk ranges and source length (ratio)
coverage_tolerance = 0.02

# Segmentation attempts before the document is rejected
max_attempts = 2

[llm]
# Text-generation server address (Ollama-compatible API)
host = "http://localhost:11434"

# Model used for semantic segmentation
model = "gpt-oss:20b"

# Request timeout in seconds
timeout_seconds = 120
"#
        .to_string()
    }

    /// Add a directory to the watch list.
    pub fn add_watch_directory(&mut self, path: String) {
        if !self.watch.directories.contains(&path) {
            self.watch.directories.push(path);
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub data_dir: Option<String>,
}

/// Directory watching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub directories: Vec<String>,
    pub ignore_patterns: Vec<String>,
    pub batch_interval_seconds: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            directories: vec![],
            ignore_patterns: vec![
                "*.tmp".to_string(),
                "*.part".to_string(),
                ".DS_Store".to_string(),
                "._*".to_string(),
            ],
            batch_interval_seconds: 2,
        }
    }
}

/// Content extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub min_chars_per_page: usize,
    pub ocr_enabled: bool,
    pub ocr_language: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_chars_per_page: 20,
            ocr_enabled: true,
            ocr_language: "eng".to_string(),
        }
    }
}

/// Semantic chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub target_chunk_chars: usize,
    pub coverage_tolerance: f64,
    pub max_attempts: u32,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_chunk_chars: 500,
            coverage_tolerance: 0.02,
            max_attempts: 2,
        }
    }
}

/// Text-generation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub host: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "gpt-oss:20b".to_string(),
            timeout_seconds: 120,
        }
    }
}
