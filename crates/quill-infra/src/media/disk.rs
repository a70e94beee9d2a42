//! Disk-backed media store. Images land under an uploads directory that the
//! API server serves statically; the deletion handle is the path relative to
//! that directory.

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use quill_core::ports::{MediaError, MediaStore, StoredImage};

pub struct DiskMediaStore {
    root: PathBuf,
    public_base: String,
}

impl DiskMediaStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }

    /// Root from `UPLOAD_DIR` (default `./uploads`), served under `/uploads`.
    pub fn from_env() -> Self {
        let root = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());
        Self::new(root, "/uploads")
    }
}

/// Keep the stored name shell- and URL-safe.
fn sanitize(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.trim_matches('-').is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl MediaStore for DiskMediaStore {
    async fn store(
        &self,
        bytes: &[u8],
        filename: &str,
        namespace: &str,
    ) -> Result<StoredImage, MediaError> {
        let name = format!("{}-{}", Uuid::new_v4().simple(), sanitize(filename));
        let dir = self.root.join(namespace);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| MediaError::Upload(e.to_string()))?;
        tokio::fs::write(dir.join(&name), bytes)
            .await
            .map_err(|e| MediaError::Upload(e.to_string()))?;

        let handle = format!("{namespace}/{name}");
        let url = format!("{}/{handle}", self.public_base.trim_end_matches('/'));
        Ok(StoredImage { url, handle })
    }

    async fn release(&self, handle: &str) {
        if handle.is_empty() {
            return;
        }
        // Handles are produced by `store`; anything pointing outside the
        // uploads root is not ours to delete.
        if handle.contains("..") {
            tracing::warn!(handle, "refusing to release suspicious media handle");
            return;
        }
        if let Err(e) = tokio::fs::remove_file(self.root.join(handle)).await {
            tracing::debug!(handle, error = %e, "media release failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize;

    #[test]
    fn sanitize_keeps_safe_chars_and_replaces_the_rest() {
        assert_eq!(sanitize("photo.png"), "photo.png");
        assert_eq!(sanitize("my photo (1).png"), "my-photo--1-.png");
        assert_eq!(sanitize("???"), "image");
    }
}
