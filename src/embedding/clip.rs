/// Joint image/text encoder backed by CLIP
use super::EmbeddingError;
use fastembed::{
    EmbeddingModel, ImageEmbedding, ImageEmbeddingModel, ImageInitOptions, InitOptions,
    TextEmbedding,
};
use std::path::PathBuf;

/// Maps images and text into one vector space so a question can be matched
/// against pictures.
pub trait JointEncoder: Send + Sync {
    /// Encode image files, one vector per path in input order
    fn encode_images(
        &self,
        paths: &[PathBuf],
        batch_size: usize,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Encode a text query into the image space
    fn encode_text(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    fn model_name(&self) -> &str;
}

/// CLIP ViT-B/32 through fastembed: the vision tower for images, the text
/// tower for queries. Both produce 512-dimensional unit-length vectors, so
/// squared L2 distances between them fall in `[0, 4]`.
pub struct ClipEncoder {
    vision: ImageEmbedding,
    text: TextEmbedding,
    model_name: String,
}

impl ClipEncoder {
    pub const DIMENSION: usize = 512;

    pub fn new(model_name: &str) -> Result<Self, EmbeddingError> {
        match model_name {
            "clip-ViT-B-32" | "clip-vit-b-32" => {}
            _ => {
                return Err(EmbeddingError::InitializationError(format!(
                    "Unsupported joint model: {}. Supported: clip-ViT-B-32",
                    model_name
                )));
            }
        }

        tracing::info!(
            "Initializing joint image/text model: {} ({}D)",
            model_name,
            Self::DIMENSION
        );

        let vision = ImageEmbedding::try_new(
            ImageInitOptions::new(ImageEmbeddingModel::ClipVitB32)
                .with_show_download_progress(true),
        )
        .map_err(|e| EmbeddingError::InitializationError(e.to_string()))?;

        let text = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::ClipVitB32).with_show_download_progress(true),
        )
        .map_err(|e| EmbeddingError::InitializationError(e.to_string()))?;

        Ok(Self {
            vision,
            text,
            model_name: model_name.to_string(),
        })
    }
}

impl JointEncoder for ClipEncoder {
    fn encode_images(
        &self,
        paths: &[PathBuf],
        batch_size: usize,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self
            .vision
            .embed(paths.to_vec(), Some(batch_size))
            .map_err(|e| EmbeddingError::GenerationError(e.to_string()))?;

        if embeddings.len() != paths.len() {
            return Err(EmbeddingError::GenerationError(format!(
                "Embedding count mismatch: expected {}, got {}",
                paths.len(),
                embeddings.len()
            )));
        }

        Ok(embeddings.into_iter().map(normalize).collect())
    }

    fn encode_text(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.is_empty() {
            return Err(EmbeddingError::InvalidInput("Empty text".to_string()));
        }

        self.text
            .embed(vec![text.to_string()], None)
            .map_err(|e| EmbeddingError::GenerationError(e.to_string()))?
            .pop()
            .map(normalize)
            .ok_or_else(|| EmbeddingError::GenerationError("No embeddings generated".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Scale to unit length; a zero vector is returned unchanged
fn normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
    vector
}
