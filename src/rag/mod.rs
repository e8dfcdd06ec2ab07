//! Multimodal retrieval-augmented answering
//!
//! A question pulls the top-K nearest text chunks and, when an image
//! collection exists, the single nearest image. The text becomes the prompt
//! context; the image is shown only if it clears the distance threshold.

mod image_match;
mod pipeline;
mod prompt;
mod resources;
mod text_store;

pub use image_match::{accepts, lookup_image, ImageCollection, ImageLookup, ImageMatch, ImageSearch};
pub use pipeline::{ask, Answer};
pub use prompt::{build_prompt, join_context};
pub use resources::{load_rag_resources, ResourceBundle};
pub use text_store::{DocumentChunk, TextRetriever, TextStore};
