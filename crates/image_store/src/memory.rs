//! In-memory image store used by tests: records every `store` and `destroy`
//! call and can be told to fail destroys for specific filenames.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{ImageStore, ImageStoreError, StoredImage};

/// Test double that keeps stored images in memory.
pub struct InMemoryImageStore {
    counter: AtomicU64,
    stored: Mutex<Vec<StoredImage>>,
    destroyed: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
}

impl InMemoryImageStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
            stored: Mutex::new(Vec::new()),
            destroyed: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Makes subsequent `destroy` calls for `filename` fail.
    pub fn fail_destroy_of(&self, filename: &str) {
        self.failing.lock().unwrap().insert(filename.to_string());
    }

    /// Filenames handed out by `store`, in call order.
    pub fn stored_filenames(&self) -> Vec<String> {
        self.stored
            .lock()
            .unwrap()
            .iter()
            .map(|image| image.filename.clone())
            .collect()
    }

    /// Filenames successfully destroyed, in call order.
    pub fn destroyed_filenames(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ImageStore for InMemoryImageStore {
    async fn store(&self, filename: &str, _bytes: Vec<u8>) -> Result<StoredImage, ImageStoreError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let stored = StoredImage {
            url: format!("memory://images/{}-{}", n, filename),
            filename: format!("{}-{}", n, filename),
        };
        self.stored.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn destroy(&self, filename: &str) -> Result<(), ImageStoreError> {
        if self.failing.lock().unwrap().contains(filename) {
            return Err(ImageStoreError::Rejected {
                operation: "destroy",
                status: 502,
            });
        }
        self.destroyed.lock().unwrap().push(filename.to_string());
        Ok(())
    }
}
