/// Centralized error types for doctwin using thiserror
///
/// Provides domain-specific error types for better error handling and user-facing messages.
use thiserror::Error;

/// Main error type for the ingestion core
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Chunking error: {0}")]
    Chunking(#[from] ChunkingError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Object store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors related to chunker construction and splitting
#[derive(Error, Debug)]
pub enum ChunkingError {
    #[error("chunk_overlap must be less than chunk_size ({overlap} >= {size})")]
    InvalidOverlap { size: usize, overlap: usize },

    #[error("chunk_size must be greater than 0")]
    ZeroChunkSize,
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

/// Errors related to chunk export
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("An object store is required for target '{0}'")]
    StoreRequired(String),

    #[error("Invalid export target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },
}

/// Errors surfaced by object-store implementations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Failed to list keys under '{prefix}': {reason}")]
    ListFailed { prefix: String, reason: String },

    #[error("Failed to get object '{key}': {reason}")]
    GetFailed { key: String, reason: String },

    #[error("Failed to put object '{key}': {reason}")]
    PutFailed { key: String, reason: String },
}

// Conversion from anyhow::Error to IngestError
impl From<anyhow::Error> for IngestError {
    fn from(err: anyhow::Error) -> Self {
        IngestError::Other(format!("{:#}", err))
    }
}

// Helper methods for IngestError
impl IngestError {
    /// Create a new error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        IngestError::Other(msg.into())
    }

    /// Check if this is a caller error (bad parameters) vs system error
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            IngestError::Chunking(_)
                | IngestError::Config(_)
                | IngestError::Export(ExportError::StoreRequired(_))
                | IngestError::Export(ExportError::InvalidTarget { .. })
        )
    }
}
