//! Best-image lookup for a question

use crate::embedding::JointEncoder;
use crate::error::{DocseerError, Result};
use crate::store::Collection;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, warn};

/// Nearest image to a query vector
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMatch {
    pub id: String,
    pub path: PathBuf,
    /// Squared L2 distance in the joint embedding space
    pub distance: f32,
}

/// Single-nearest-neighbour search over indexed images
pub trait ImageSearch: Send + Sync {
    fn nearest(&self, query: &[f32]) -> Result<Option<ImageMatch>>;
}

/// Image collection as written by the indexer
pub struct ImageCollection {
    collection: Collection,
}

impl ImageCollection {
    pub fn new(collection: Collection) -> Self {
        Self { collection }
    }
}

impl ImageSearch for ImageCollection {
    fn nearest(&self, query: &[f32]) -> Result<Option<ImageMatch>> {
        let hit = self.collection.query(query, 1)?.into_iter().next();

        let Some(hit) = hit else {
            return Ok(None);
        };

        // The indexer always writes `path`; a bare id is not a displayable location
        let path = hit
            .metadata
            .get("path")
            .and_then(Value::as_str)
            .map(PathBuf::from)
            .ok_or_else(|| DocseerError::MissingImagePath { id: hit.id.clone() })?;

        Ok(Some(ImageMatch {
            id: hit.id,
            path,
            distance: hit.distance,
        }))
    }
}

/// Outcome of looking up an image for one question
#[derive(Debug, Clone, PartialEq)]
pub enum ImageLookup {
    /// Nearest image is close enough to show
    Accepted(ImageMatch),
    /// Nearest image is at or beyond the threshold
    Rejected(ImageMatch),
    /// The collection holds no images
    NoMatch,
    /// Encoding or querying failed; the answer proceeds without an image
    Failed(String),
}

impl ImageLookup {
    /// Path to display, if any
    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            ImageLookup::Accepted(found) => Some(found.path),
            ImageLookup::Rejected(_) | ImageLookup::NoMatch | ImageLookup::Failed(_) => None,
        }
    }
}

/// Strict acceptance: a distance equal to the threshold is rejected
pub fn accepts(distance: f32, threshold: f32) -> bool {
    distance < threshold
}

/// Encode the question, fetch the nearest image and apply the threshold
///
/// Never fails: errors become `ImageLookup::Failed`.
pub fn lookup_image(
    question: &str,
    encoder: &dyn JointEncoder,
    images: &dyn ImageSearch,
    threshold: f32,
) -> ImageLookup {
    info!("Searching images for: '{}'", question);

    let query = match encoder.encode_text(question) {
        Ok(query) => query,
        Err(e) => {
            warn!("Image search error: {}", e);
            return ImageLookup::Failed(e.to_string());
        }
    };

    let found = match images.nearest(&query) {
        Ok(Some(found)) => found,
        Ok(None) => {
            warn!("No images in collection");
            return ImageLookup::NoMatch;
        }
        Err(e) => {
            warn!("Image search error: {}", e);
            return ImageLookup::Failed(e.to_string());
        }
    };

    info!(
        best_match = %found.path.display(),
        distance = found.distance,
        threshold,
        "Nearest image"
    );

    if accepts(found.distance, threshold) {
        info!("Image match accepted");
        ImageLookup::Accepted(found)
    } else {
        info!("Image match rejected (distance too high)");
        ImageLookup::Rejected(found)
    }
}
