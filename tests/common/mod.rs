//! Test doubles for the model-backed collaborators
#![allow(dead_code)]

use async_trait::async_trait;
use docseer::config::RetrievalConfig;
use docseer::embedding::{EmbeddingError, EmbeddingProvider, JointEncoder};
use docseer::llm::{ChatModel, LlmError, ReplyContent};
use docseer::rag::{DocumentChunk, ImageMatch, ImageSearch, ResourceBundle, TextRetriever, TextStore};
use docseer::store::{Collection, VectorStore};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const DIM: usize = 16;

/// Bag-of-words embedder: each lowercase word bumps one of `DIM` buckets
pub struct HashEmbedder;

impl EmbeddingProvider for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0; DIM];
        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|w| !w.is_empty())
        {
            let bucket = word.bytes().map(|b| b as usize).sum::<usize>() % DIM;
            vector[bucket] += 1.0;
        }
        Ok(vector)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimension(&self) -> usize {
        DIM
    }

    fn model_name(&self) -> &str {
        "hash-bow"
    }
}

/// Joint encoder that counts calls and derives vectors from file names
#[derive(Default)]
pub struct CountingEncoder {
    pub text_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
    pub fail: bool,
}

impl CountingEncoder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::SeqCst)
    }

    pub fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }
}

impl JointEncoder for CountingEncoder {
    fn encode_images(
        &self,
        paths: &[PathBuf],
        _batch_size: usize,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EmbeddingError::GenerationError("vision model crashed".to_string()));
        }
        Ok(paths
            .iter()
            .map(|p| vec![p.to_string_lossy().len() as f32, 1.0])
            .collect())
    }

    fn encode_text(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EmbeddingError::GenerationError("text tower crashed".to_string()));
        }
        Ok(vec![0.0, 0.0])
    }

    fn model_name(&self) -> &str {
        "counting"
    }
}

/// Joint encoder that maps every question to the same unit vector
pub struct QueryEncoder(pub Vec<f32>);

impl JointEncoder for QueryEncoder {
    fn encode_images(
        &self,
        _paths: &[PathBuf],
        _batch_size: usize,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(EmbeddingError::InvalidInput("query-only encoder".to_string()))
    }

    fn encode_text(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.0.clone())
    }

    fn model_name(&self) -> &str {
        "query"
    }
}

/// Image search that always returns the same nearest image
pub struct FixedImage {
    pub distance: Option<f32>,
}

impl ImageSearch for FixedImage {
    fn nearest(&self, _query: &[f32]) -> docseer::Result<Option<ImageMatch>> {
        Ok(self.distance.map(|distance| ImageMatch {
            id: "nav.png".to_string(),
            path: PathBuf::from("docs/img/nav.png"),
            distance,
        }))
    }
}

/// Chat model that records every prompt and replies with a canned result
pub struct RecordingModel {
    reply: Result<ReplyContent, String>,
    prompts: Mutex<Vec<String>>,
}

impl RecordingModel {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(ReplyContent::Text(text.to_string())),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_fragments(parts: &[&str]) -> Self {
        Self {
            reply: Ok(ReplyContent::Fragments(
                parts.iter().map(|p| p.to_string()).collect(),
            )),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for RecordingModel {
    async fn invoke(&self, prompt: &str) -> Result<ReplyContent, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(message) => Err(LlmError::Api {
                status: 503,
                body: message.clone(),
            }),
        }
    }

    fn model_name(&self) -> &str {
        "recording"
    }
}

/// Text store on a temporary SQLite file
pub struct TextFixture {
    pub store: Arc<TextStore>,
    pub collection: Collection,
    _temp: TempDir,
}

impl TextFixture {
    pub fn with_chunks(chunks: Vec<DocumentChunk>) -> Self {
        let temp = TempDir::new().unwrap();
        let vectors = VectorStore::open(&temp.path().join("store.sqlite")).unwrap();
        let collection = vectors.get_or_create_collection("mkdocs_collection").unwrap();
        let store = TextStore::new(collection.clone(), Arc::new(HashEmbedder));

        if !chunks.is_empty() {
            let ids = (0..chunks.len()).map(|i| format!("chunk-{}", i));
            store.add_chunks(ids.zip(chunks).collect()).unwrap();
        }

        Self {
            store: Arc::new(store),
            collection,
            _temp: temp,
        }
    }
}

pub fn numbered_chunks(n: usize) -> Vec<DocumentChunk> {
    (0..n)
        .map(|i| {
            DocumentChunk::new(
                format!("Page {} explains option_{} of the mkdocs theme.", i, i),
                format!("page_{}.md", i),
            )
        })
        .collect()
}

pub fn bundle(
    text_store: Arc<dyn TextRetriever>,
    llm: Arc<dyn ChatModel>,
    encoder: Arc<dyn JointEncoder>,
    images: Option<Arc<dyn ImageSearch>>,
) -> ResourceBundle {
    ResourceBundle::new(text_store, llm, encoder, images, RetrievalConfig::default())
}
