//! docseer - multimodal question answering over documentation
//!
//! Indexes the images of a documentation tree, retrieves the most relevant
//! text chunks and the best-matching image for a question, and asks a
//! language model for an answer grounded only in the retrieved text.

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod indexer;
pub mod llm;
pub mod rag;
pub mod shell;
pub mod store;

pub use error::{DocseerError, Result};
