//! Image indexing
//!
//! Rebuilds the image collection from scratch on every run: discover image
//! files under the docs root, drop the old collection, encode every image and
//! store it with its path.

mod discovery;

pub use discovery::{discover_images, DiscoveredImage};

use crate::config::{Config, ImageIdScheme};
use crate::embedding::{ClipEncoder, JointEncoder};
use crate::error::{DocseerError, Result};
use crate::store::{Record, VectorStore};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Outcome of one indexing run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexReport {
    pub collection: String,
    pub discovered: usize,
    pub stored: usize,
    pub duration_ms: u64,
}

/// Indexer settings, taken from the storage, embedding and indexing sections
#[derive(Debug, Clone)]
pub struct IndexSettings {
    pub docs_root: PathBuf,
    pub collection: String,
    pub batch_size: usize,
    pub extensions: Vec<String>,
    pub id_scheme: ImageIdScheme,
}

impl IndexSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            docs_root: config.storage.docs_root.clone(),
            collection: config.storage.image_collection.clone(),
            batch_size: config.embedding.batch_size,
            extensions: config.indexing.image_extensions.clone(),
            id_scheme: config.indexing.id_scheme,
        }
    }
}

/// Writes the image collection
pub struct ImageIndexer<'a> {
    store: &'a VectorStore,
    encoder: &'a dyn JointEncoder,
    settings: IndexSettings,
}

impl<'a> ImageIndexer<'a> {
    pub fn new(store: &'a VectorStore, encoder: &'a dyn JointEncoder, settings: IndexSettings) -> Self {
        Self {
            store,
            encoder,
            settings,
        }
    }

    /// Replace the collection with embeddings of every image under the docs root
    pub fn run(&self) -> Result<IndexReport> {
        info!("Starting image ingestion from {}", self.settings.docs_root.display());

        let images = discover_images(&self.settings.docs_root, &self.settings.extensions)?;
        info!("Found {} images", images.len());

        self.index(&images)
    }

    /// Replace the collection with embeddings of the given images
    ///
    /// Any image that cannot be opened or encoded aborts the run and leaves
    /// the fresh collection empty; rerun after fixing the file.
    pub fn index(&self, images: &[DiscoveredImage]) -> Result<IndexReport> {
        let start = Instant::now();
        let name = &self.settings.collection;

        match self.store.delete_collection(name) {
            Ok(()) => info!("Deleted old image collection '{}'", name),
            Err(DocseerError::CollectionNotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let collection = self.store.create_collection(name)?;

        if images.is_empty() {
            warn!(
                "No images found under {}, check storage.docs_root",
                self.settings.docs_root.display()
            );
            return Ok(self.report(0, 0, start));
        }

        open_all(images)?;

        info!("Embedding {} images with {}", images.len(), self.encoder.model_name());
        let paths: Vec<PathBuf> = images.iter().map(|i| i.path.clone()).collect();
        let embeddings = self
            .encoder
            .encode_images(&paths, self.settings.batch_size)?;

        if embeddings.len() != images.len() {
            return Err(DocseerError::Other(anyhow::anyhow!(
                "Encoder returned {} embeddings for {} images",
                embeddings.len(),
                images.len()
            )));
        }

        let records: Vec<Record> = images
            .iter()
            .zip(embeddings)
            .map(|(image, embedding)| {
                Record::new(self.record_id(image), embedding)
                    .with_metadata("path", image.path.to_string_lossy().into_owned())
            })
            .collect();

        collection.add(records)?;
        let stored = collection.count()?;

        info!(
            "Stored {} images in '{}' ({} discovered)",
            stored,
            name,
            images.len()
        );

        Ok(self.report(images.len(), stored, start))
    }

    fn record_id(&self, image: &DiscoveredImage) -> String {
        match self.settings.id_scheme {
            ImageIdScheme::Filename => image.file_name.clone(),
            ImageIdScheme::PathHash => path_hash(&self.settings.docs_root, &image.path),
        }
    }

    fn report(&self, discovered: usize, stored: usize, start: Instant) -> IndexReport {
        IndexReport {
            collection: self.settings.collection.clone(),
            discovered,
            stored,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Check that every image can be opened before any encoding starts
fn open_all(images: &[DiscoveredImage]) -> Result<()> {
    for image in images {
        std::fs::File::open(&image.path).map_err(|e| DocseerError::ImageLoad {
            path: image.path.clone(),
            source: e,
        })?;
    }
    Ok(())
}

/// BLAKE3 of the path relative to the docs root, stable across checkouts
fn path_hash(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let normalized = relative.to_string_lossy().replace('\\', "/");
    blake3::hash(normalized.as_bytes()).to_hex().to_string()
}

/// Rebuild the configured image collection with the CLIP encoder
pub fn ingest_images(config: &Config) -> Result<IndexReport> {
    let store = VectorStore::open(&config.storage.db_path)?;
    let encoder = ClipEncoder::new(&config.embedding.image_model)?;

    ImageIndexer::new(&store, &encoder, IndexSettings::from_config(config)).run()
}
