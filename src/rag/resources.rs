//! Query-time resources, built once per process

use super::{ImageCollection, ImageSearch, TextRetriever, TextStore};
use crate::config::{Config, RetrievalConfig};
use crate::embedding::{ClipEncoder, EmbeddingProvider, FastEmbedProvider, JointEncoder};
use crate::error::Result;
use crate::llm::{ChatModel, GeminiClient};
use crate::store::VectorStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything a question needs; immutable after construction and shared by
/// reference across turns.
pub struct ResourceBundle {
    pub text_store: Arc<dyn TextRetriever>,
    pub llm: Arc<dyn ChatModel>,
    pub encoder: Arc<dyn JointEncoder>,
    /// `None` when images were never indexed
    pub image_collection: Option<Arc<dyn ImageSearch>>,
    pub retrieval: RetrievalConfig,
}

impl ResourceBundle {
    pub fn new(
        text_store: Arc<dyn TextRetriever>,
        llm: Arc<dyn ChatModel>,
        encoder: Arc<dyn JointEncoder>,
        image_collection: Option<Arc<dyn ImageSearch>>,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            text_store,
            llm,
            encoder,
            image_collection,
            retrieval,
        }
    }
}

/// Build the resource bundle from configuration
///
/// Failures of the text embedder, text store, language model client or joint
/// encoder are fatal. A missing or unreadable image collection only disables
/// image matching.
pub fn load_rag_resources(config: &Config) -> Result<ResourceBundle> {
    info!("Loading resources");

    info!("1. Text embeddings ({})", config.embedding.text_model);
    let embedder: Arc<dyn EmbeddingProvider> =
        Arc::new(FastEmbedProvider::new(&config.embedding.text_model)?);

    info!("2. Vector store ({})", config.storage.db_path.display());
    let store = VectorStore::open(&config.storage.db_path)?;
    let text_collection = store.get_or_create_collection(&config.storage.text_collection)?;
    let text_store = TextStore::new(text_collection, embedder);

    info!("3. Language model ({})", config.llm.model);
    let llm = GeminiClient::from_config(&config.llm)?;

    info!("4. Image model ({})", config.embedding.image_model);
    let encoder = ClipEncoder::new(&config.embedding.image_model)?;

    let image_collection: Option<Arc<dyn ImageSearch>> =
        match store.get_collection(&config.storage.image_collection) {
            Ok(collection) => {
                info!("Image collection found");
                Some(Arc::new(ImageCollection::new(collection)))
            }
            Err(e) => {
                warn!("Image collection not available, image matching disabled: {}", e);
                None
            }
        };

    Ok(ResourceBundle::new(
        Arc::new(text_store),
        Arc::new(llm),
        Arc::new(encoder),
        image_collection,
        config.retrieval.clone(),
    ))
}
