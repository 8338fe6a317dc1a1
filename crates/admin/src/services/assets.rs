//! Asset store: uploaded files referenced by tech-pack attachments.
//!
//! Files land in a configured directory under a generated name; the returned
//! URL is what gets embedded in an attachment reference. File contents are
//! opaque to the rest of the system.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use stitchworks_core::techpack::AttachmentKind;

/// Errors that can occur storing an asset.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Filesystem error while writing the asset.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Filesystem-backed asset store.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
    base_url: String,
}

impl AssetStore {
    /// Create a store rooted at `root`, serving under `base_url`.
    #[must_use]
    pub fn new(root: PathBuf, base_url: impl Into<String>) -> Self {
        Self {
            root,
            base_url: base_url.into(),
        }
    }

    /// Store uploaded bytes under a generated name and return the URL to
    /// reference them by.
    ///
    /// # Errors
    ///
    /// Returns `AssetError::Io` if the directory or file cannot be written.
    pub async fn upload(&self, original_name: &str, bytes: &[u8]) -> Result<String, AssetError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let file_name = match Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext.to_ascii_lowercase()),
            None => Uuid::new_v4().to_string(),
        };
        tokio::fs::write(self.root.join(&file_name), bytes).await?;

        Ok(format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            file_name
        ))
    }
}

/// Classify an uploaded file by extension.
#[must_use]
pub fn kind_for(file_name: &str) -> AttachmentKind {
    let is_image = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            matches!(
                ext.to_ascii_lowercase().as_str(),
                "png" | "jpg" | "jpeg" | "gif" | "webp" | "svg"
            )
        });
    if is_image {
        AttachmentKind::Image
    } else {
        AttachmentKind::Document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_for_extensions() {
        assert_eq!(kind_for("sketch.PNG"), AttachmentKind::Image);
        assert_eq!(kind_for("grading.pdf"), AttachmentKind::Document);
        assert_eq!(kind_for("no-extension"), AttachmentKind::Document);
    }
}
