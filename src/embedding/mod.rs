//! Embedding models
//!
//! Two independent encoders sit behind traits:
//! - `EmbeddingProvider` embeds document chunks and questions for the text store
//! - `JointEncoder` maps images and text into one space for image matching
//!
//! Both are local fastembed models, downloaded on first use.
mod clip;
mod provider;

pub use clip::{ClipEncoder, JointEncoder};
pub use provider::{EmbeddingError, EmbeddingProvider, FastEmbedProvider};
