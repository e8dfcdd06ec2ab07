use crate::config::Config;
use crate::error::{DocseerError, Result, ValidationError};

/// Largest squared L2 distance between two unit-length embeddings
const MAX_UNIT_DISTANCE: f32 = 4.0;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_storage(config, &mut errors);
        Self::validate_embedding(config, &mut errors);
        Self::validate_llm(config, &mut errors);
        Self::validate_retrieval(config, &mut errors);
        Self::validate_indexing(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DocseerError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_storage(config: &Config, errors: &mut Vec<ValidationError>) {
        // Existence is not checked: the docs root only matters to the indexer
        // and the database file is created on first open.
        if config.storage.docs_root.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "storage.docs_root",
                "Documentation root cannot be empty",
            ));
        }

        if config.storage.db_path.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "storage.db_path",
                "Database path cannot be empty",
            ));
        }

        if config.storage.text_collection.trim().is_empty() {
            errors.push(ValidationError::new(
                "storage.text_collection",
                "Text collection name cannot be empty",
            ));
        }

        if config.storage.image_collection.trim().is_empty() {
            errors.push(ValidationError::new(
                "storage.image_collection",
                "Image collection name cannot be empty",
            ));
        }

        if config.storage.text_collection == config.storage.image_collection {
            errors.push(ValidationError::new(
                "storage.image_collection",
                "Image collection must differ from the text collection",
            ));
        }
    }

    fn validate_embedding(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.embedding.batch_size == 0 {
            errors.push(ValidationError::new(
                "embedding.batch_size",
                "Batch size must be greater than 0",
            ));
        }

        if config.embedding.text_model.is_empty() {
            errors.push(ValidationError::new(
                "embedding.text_model",
                "Model name cannot be empty",
            ));
        }

        if config.embedding.image_model.is_empty() {
            errors.push(ValidationError::new(
                "embedding.image_model",
                "Model name cannot be empty",
            ));
        }
    }

    fn validate_llm(config: &Config, errors: &mut Vec<ValidationError>) {
        // The API key itself is checked when the client is built, so that
        // indexing and config commands work without one.
        if config.llm.api_key_env.is_empty() {
            errors.push(ValidationError::new(
                "llm.api_key_env",
                "API key environment variable name cannot be empty",
            ));
        }

        let temp = config.llm.temperature;
        if !(0.0..=2.0).contains(&temp) {
            errors.push(ValidationError::new(
                "llm.temperature",
                format!("Temperature must be between 0.0 and 2.0, got {}", temp),
            ));
        }

        let provider = &config.llm.provider;
        let valid_providers = ["gemini"];
        if !valid_providers.contains(&provider.as_str()) {
            errors.push(ValidationError::new(
                "llm.provider",
                format!(
                    "Provider must be one of {:?}, got '{}'",
                    valid_providers, provider
                ),
            ));
        }

        if config.llm.model.is_empty() {
            errors.push(ValidationError::new("llm.model", "Model cannot be empty"));
        }
    }

    fn validate_retrieval(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.retrieval.top_k == 0 {
            errors.push(ValidationError::new(
                "retrieval.top_k",
                "top_k must be greater than 0",
            ));
        }

        let threshold = config.retrieval.image_distance_threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            errors.push(ValidationError::new(
                "retrieval.image_distance_threshold",
                format!("Threshold must be a positive number, got {}", threshold),
            ));
        } else if threshold > MAX_UNIT_DISTANCE {
            // Unit vectors are never further apart than this, so every image would pass
            errors.push(ValidationError::new(
                "retrieval.image_distance_threshold",
                format!(
                    "Threshold must be at most {} (squared L2 between unit vectors), got {}",
                    MAX_UNIT_DISTANCE, threshold
                ),
            ));
        }
    }

    fn validate_indexing(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.indexing.image_extensions.is_empty() {
            errors.push(ValidationError::new(
                "indexing.image_extensions",
                "At least one image extension is required",
            ));
        }

        for ext in &config.indexing.image_extensions {
            if ext.is_empty() || ext.starts_with('.') {
                errors.push(ValidationError::new(
                    "indexing.image_extensions",
                    format!("Extensions are given without a dot, got '{}'", ext),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_empty_db_path() {
        let mut config = Config::default();
        config.storage.db_path = PathBuf::new();
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_invalid_provider() {
        let mut config = Config::default();
        config.llm.provider = "invalid".to_string();
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_threshold_must_be_positive() {
        let mut config = Config::default();
        config.retrieval.image_distance_threshold = 0.0;
        assert!(ConfigValidator::validate(&config).is_err());

        config.retrieval.image_distance_threshold = f32::NAN;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_threshold_bounded_by_unit_sphere() {
        let mut config = Config::default();
        config.retrieval.image_distance_threshold = 4.0;
        assert!(ConfigValidator::validate(&config).is_ok());

        // Raw-scale value from unnormalised embeddings would accept every image
        config.retrieval.image_distance_threshold = 200.0;
        match ConfigValidator::validate(&config) {
            Err(DocseerError::ConfigValidation { errors }) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].path, "retrieval.image_distance_threshold");
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = Config::default();
        config.retrieval.top_k = 0;
        config.embedding.batch_size = 0;
        config.indexing.image_extensions = vec![".png".to_string()];

        match ConfigValidator::validate(&config) {
            Err(DocseerError::ConfigValidation { errors }) => {
                assert_eq!(errors.len(), 3);
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }
}
