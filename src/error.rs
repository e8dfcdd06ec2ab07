use std::path::PathBuf;
use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::llm::LlmError;

/// Main error type for docseer
#[derive(Error, Debug)]
pub enum DocseerError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Invalid configuration value
    #[error("Invalid configuration value at {path}: {message}")]
    InvalidConfigValue { path: String, message: String },

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// JSON errors
    #[error("JSON error: {context}: {source}")]
    Json {
        source: serde_json::Error,
        context: String,
    },

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Connection pool errors
    #[error("Connection pool error: {0}")]
    Pool(String),

    /// Named collection does not exist in the store
    #[error("Collection not found: {name}")]
    CollectionNotFound { name: String },

    /// Named collection already exists in the store
    #[error("Collection already exists: {name}")]
    CollectionExists { name: String },

    /// Embedding has a different dimension than the collection
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// An image file could not be opened during indexing
    #[error("Failed to load image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An image record was stored without its file path
    #[error("Image record '{id}' has no path metadata")]
    MissingImagePath { id: String },

    /// Embedding model errors
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// Language model errors
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for docseer operations
pub type Result<T> = std::result::Result<T, DocseerError>;
