//! Configuration management for docseer
//!
//! Every path, model identifier, collection name and retrieval constant lives
//! here. Defaults reproduce the values the assistant was tuned with.

use crate::error::{DocseerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    pub indexing: IndexingConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Documentation tree scanned for images
    pub docs_root: PathBuf,
    /// SQLite file holding every vector collection
    pub db_path: PathBuf,
    pub text_collection: String,
    pub image_collection: String,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Text encoder used by the text store
    pub text_model: String,
    /// Joint image/text encoder used for image matching
    pub image_model: String,
    pub batch_size: usize,
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: String,
    pub api_key_env: String,
    pub model: String,
    pub temperature: f32,
    pub base_url: String,
}

/// Retrieval configuration
///
/// Both values are coupled to the embedding models' output scale and must be
/// recalibrated together when a model is swapped.
///
/// Joint embeddings are unit length, so squared L2 distance is `2 - 2 * cos`
/// and lies in `[0, 4]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of text chunks placed in the prompt context
    pub top_k: usize,
    /// Nearest image is accepted only if its squared L2 distance is strictly below this.
    /// The default 2.0 keeps images with positive cosine similarity to the question.
    pub image_distance_threshold: f32,
}

/// Image indexing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Lowercase file extensions treated as images
    pub image_extensions: Vec<String>,
    pub id_scheme: ImageIdScheme,
}

/// How image record ids are derived from a discovered file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageIdScheme {
    /// Bare file name; same-named images in different folders collide
    Filename,
    /// BLAKE3 hash of the path relative to the docs root
    PathHash,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 15,
            image_distance_threshold: 2.0,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DocseerError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| DocseerError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Load the file if present, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                "Config file not found, using defaults. Run 'docseer config init' to create one."
            );
            let mut config = Config::default();
            config.apply_env_overrides();
            ConfigValidator::validate(&config)?;
            return Ok(config);
        }

        Self::load(path)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| DocseerError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: DOCSEER_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("DOCSEER_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "STORAGE__DOCS_ROOT" => self.storage.docs_root = PathBuf::from(value),
            "STORAGE__DB_PATH" => self.storage.db_path = PathBuf::from(value),
            "STORAGE__TEXT_COLLECTION" => self.storage.text_collection = value.to_string(),
            "STORAGE__IMAGE_COLLECTION" => self.storage.image_collection = value.to_string(),
            "EMBEDDING__TEXT_MODEL" => self.embedding.text_model = value.to_string(),
            "EMBEDDING__IMAGE_MODEL" => self.embedding.image_model = value.to_string(),
            "EMBEDDING__BATCH_SIZE" => self.embedding.batch_size = parse_value(path, value)?,
            "LLM__MODEL" => self.llm.model = value.to_string(),
            "LLM__API_KEY_ENV" => self.llm.api_key_env = value.to_string(),
            "LLM__TEMPERATURE" => self.llm.temperature = parse_value(path, value)?,
            "LLM__BASE_URL" => self.llm.base_url = value.to_string(),
            "RETRIEVAL__TOP_K" => self.retrieval.top_k = parse_value(path, value)?,
            "RETRIEVAL__IMAGE_DISTANCE_THRESHOLD" => {
                self.retrieval.image_distance_threshold = parse_value(path, value)?
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            DocseerError::Config("Cannot determine config directory".to_string())
        })?;

        Ok(config_dir.join("docseer").join("config.toml"))
    }
}

fn parse_value<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| DocseerError::InvalidConfigValue {
            path: path.to_string(),
            message: format!(
                "Cannot parse '{}' as {}",
                value,
                std::any::type_name::<T>()
            ),
        })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            storage: StorageConfig {
                docs_root: PathBuf::from("./mkdocs/docs"),
                db_path: PathBuf::from("./vector_db/store.sqlite"),
                text_collection: "mkdocs_collection".to_string(),
                image_collection: "mkdocs_images".to_string(),
            },
            embedding: EmbeddingConfig {
                text_model: "all-MiniLM-L6-v2".to_string(),
                image_model: "clip-ViT-B-32".to_string(),
                batch_size: 32,
            },
            llm: LlmConfig {
                provider: "gemini".to_string(),
                api_key_env: "GOOGLE_API_KEY".to_string(),
                model: "gemini-2.5-pro".to_string(),
                temperature: 0.3,
                base_url: "https://generativelanguage.googleapis.com".to_string(),
            },
            retrieval: RetrievalConfig::default(),
            indexing: IndexingConfig {
                image_extensions: ["png", "jpg", "jpeg", "gif"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                id_scheme: ImageIdScheme::Filename,
            },
        }
    }
}
