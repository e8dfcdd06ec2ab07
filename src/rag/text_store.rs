//! Text vector store: document chunks queried by question similarity

use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::store::{Collection, Record};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// A unit of indexed documentation text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub content: String,
    /// Everything stored alongside the text; `source` names the originating file
    pub metadata: Map<String, Value>,
}

impl DocumentChunk {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        let mut metadata = Map::new();
        metadata.insert("source".to_string(), Value::String(source.into()));
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// Source identifier, or `"unknown"` when the chunk was stored without one
    pub fn source(&self) -> &str {
        self.metadata
            .get("source")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
    }

    /// First `max_chars` characters followed by `...`
    pub fn preview(&self, max_chars: usize) -> String {
        let head: String = self.content.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}

/// Nearest-neighbour search over document chunks
pub trait TextRetriever: Send + Sync {
    /// The `k` chunks nearest to `query`, in store ranking order
    fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<DocumentChunk>>;
}

/// A store collection bound to the text embedder used for both chunks and queries
pub struct TextStore {
    collection: Collection,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl TextStore {
    pub fn new(collection: Collection, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            collection,
            embedder,
        }
    }

    /// Embed and store chunks under the given ids
    pub fn add_chunks(&self, chunks: Vec<(String, DocumentChunk)>) -> Result<usize> {
        let texts: Vec<String> = chunks.iter().map(|(_, c)| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts)?;

        let records = chunks
            .into_iter()
            .zip(embeddings)
            .map(|((id, chunk), embedding)| Record {
                id,
                embedding,
                document: Some(chunk.content),
                metadata: chunk.metadata,
            })
            .collect();

        self.collection.add(records)
    }
}

impl TextRetriever for TextStore {
    fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<DocumentChunk>> {
        let query_embedding = self.embedder.embed(query)?;

        let matches = self.collection.query(&query_embedding, k)?;
        tracing::debug!(
            "Text search returned {} chunks from '{}'",
            matches.len(),
            self.collection.name()
        );

        Ok(matches
            .into_iter()
            .map(|m| DocumentChunk {
                content: m.document.unwrap_or_default(),
                metadata: m.metadata,
            })
            .collect())
    }
}
