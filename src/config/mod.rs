/// Configuration system for doctwin
///
/// Supports loading from multiple sources with priority:
/// Environment variables > Config file > Defaults
use crate::chunker::DocumentChunker;
use crate::error::{ConfigError, IngestError};
use crate::paths::KeyMapper;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Object-store layout configuration
    #[serde(default)]
    pub store: StoreConfig,
}

/// Chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target tokens per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Tokens of overlap between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

/// Object-store layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Bucket holding source documents and twins
    #[serde(default)]
    pub bucket: String,

    /// Key prefix for source documents
    #[serde(default = "default_source_prefix")]
    pub source_prefix: String,

    /// Key prefix for twin JSON documents
    #[serde(default = "default_extracted_prefix")]
    pub extracted_prefix: String,
}

// Default value functions
fn default_chunk_size() -> usize {
    crate::chunker::DEFAULT_CHUNK_SIZE
}

fn default_chunk_overlap() -> usize {
    crate::chunker::DEFAULT_CHUNK_OVERLAP
}

fn default_source_prefix() -> String {
    "source".to_string()
}

fn default_extracted_prefix() -> String {
    "extracted".to_string()
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            source_prefix: default_source_prefix(),
            extracted_prefix: default_extracted_prefix(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, IngestError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), IngestError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::SaveFailed(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.chunking.chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "chunking.chunk_size".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(ConfigError::InvalidValue {
                key: "chunking.chunk_overlap".to_string(),
                reason: format!(
                    "must be less than chunk_size ({} >= {})",
                    self.chunking.chunk_overlap, self.chunking.chunk_size
                ),
            }
            .into());
        }

        if self.store.source_prefix.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "store.source_prefix".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        if self.store.extracted_prefix.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "store.extracted_prefix".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(bucket) = std::env::var("DOCTWIN_BUCKET") {
            self.store.bucket = bucket;
        }

        if let Ok(prefix) = std::env::var("DOCTWIN_SOURCE_PREFIX") {
            self.store.source_prefix = prefix;
        }

        if let Ok(prefix) = std::env::var("DOCTWIN_EXTRACTED_PREFIX") {
            self.store.extracted_prefix = prefix;
        }

        if let Ok(chunk_size) = std::env::var("DOCTWIN_CHUNK_SIZE")
            && let Ok(size) = chunk_size.parse()
        {
            self.chunking.chunk_size = size;
        }

        if let Ok(chunk_overlap) = std::env::var("DOCTWIN_CHUNK_OVERLAP")
            && let Ok(overlap) = chunk_overlap.parse()
        {
            self.chunking.chunk_overlap = overlap;
        }
    }

    /// Create a new Config with defaults and environment overrides
    pub fn from_env() -> Result<Self, IngestError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Build a chunker from the configured chunking parameters
    pub fn chunker(&self) -> Result<DocumentChunker, IngestError> {
        Ok(DocumentChunker::new(
            self.chunking.chunk_size,
            self.chunking.chunk_overlap,
        )?)
    }

    /// Build a key mapper from the configured store layout
    pub fn key_mapper(&self) -> KeyMapper {
        KeyMapper::new(
            self.store.source_prefix.clone(),
            self.store.extracted_prefix.clone(),
        )
    }
}
