//! In-memory media store - used by tests and as a stand-in when no uploads
//! directory is writable.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::ports::{MediaError, MediaStore, StoredImage};

#[derive(Default)]
pub struct InMemoryMediaStore {
    store: RwLock<HashMap<String, Vec<u8>>>,
    released: RwLock<Vec<String>>,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, handle: &str) -> bool {
        self.store.read().await.contains_key(handle)
    }

    /// Handles released so far, in call order.
    pub async fn released(&self) -> Vec<String> {
        self.released.read().await.clone()
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn store(
        &self,
        bytes: &[u8],
        filename: &str,
        namespace: &str,
    ) -> Result<StoredImage, MediaError> {
        let handle = format!("{namespace}/{}-{filename}", Uuid::new_v4().simple());
        self.store
            .write()
            .await
            .insert(handle.clone(), bytes.to_vec());
        Ok(StoredImage {
            url: format!("memory://{handle}"),
            handle,
        })
    }

    async fn release(&self, handle: &str) {
        if handle.is_empty() {
            return;
        }
        self.store.write().await.remove(handle);
        self.released.write().await.push(handle.to_string());
    }
}
