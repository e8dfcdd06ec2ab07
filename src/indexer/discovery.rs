use crate::error::{DocseerError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// An image file found under the docs root
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredImage {
    pub path: PathBuf,
    pub file_name: String,
}

/// Recursively collect files whose extension is in `extensions` (case-insensitive)
///
/// Entries are visited in file-name order within each directory, so repeated
/// runs over the same tree yield the same sequence. A missing root yields no
/// images.
pub fn discover_images(root: &Path, extensions: &[String]) -> Result<Vec<DiscoveredImage>> {
    if !root.exists() {
        tracing::warn!("Docs root does not exist: {}", root.display());
        return Ok(Vec::new());
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| DocseerError::Io {
            context: format!("Failed to walk {}", root.display()),
            source: e.into(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
            .unwrap_or(false);

        if matches {
            images.push(DiscoveredImage {
                path: path.to_path_buf(),
                file_name: entry.file_name().to_string_lossy().into_owned(),
            });
        }
    }

    Ok(images)
}
