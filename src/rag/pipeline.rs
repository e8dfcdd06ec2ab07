//! Retrieval-and-answer pipeline

use super::{build_prompt, join_context, lookup_image, DocumentChunk, ImageLookup, ResourceBundle};
use crate::error::Result;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// Result of one question
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub text: String,
    /// Retrieved chunks in store ranking order
    pub docs: Vec<DocumentChunk>,
    /// Accepted image, if any
    pub image: Option<PathBuf>,
}

/// Answer a question from the indexed documentation
///
/// Text retrieval and language model failures propagate; image lookup
/// failures only drop the image.
pub async fn ask(question: &str, resources: &ResourceBundle) -> Result<Answer> {
    let docs = resources
        .text_store
        .similarity_search(question, resources.retrieval.top_k)?;
    let context = join_context(&docs);

    let lookup = match &resources.image_collection {
        Some(images) => lookup_image(
            question,
            resources.encoder.as_ref(),
            images.as_ref(),
            resources.retrieval.image_distance_threshold,
        ),
        None => ImageLookup::NoMatch,
    };
    debug!(?lookup, "Image lookup finished");

    let prompt = build_prompt(&context, question);
    let reply = resources.llm.invoke(&prompt).await?;

    Ok(Answer {
        text: reply.into_text(),
        docs,
        image: lookup.into_path(),
    })
}
