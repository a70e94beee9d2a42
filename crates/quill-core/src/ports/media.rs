//! Media store port - image hosting behind a capability interface.

use async_trait::async_trait;

/// A stored image: a stable public URL plus a handle for later deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub url: String,
    pub handle: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Image upload failed: {0}")]
    Upload(String),
}

/// Image storage service.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store an image buffer under a namespace, returning its URL and
    /// deletion handle.
    async fn store(
        &self,
        bytes: &[u8],
        filename: &str,
        namespace: &str,
    ) -> Result<StoredImage, MediaError>;

    /// Release a previously stored image. Best-effort: failures are handled
    /// (and at most logged) by the implementation, never surfaced to callers.
    /// An empty handle is a no-op.
    async fn release(&self, handle: &str);
}
