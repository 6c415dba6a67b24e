//! # Image Store
//!
//! This crate provides the collaborator contract with the hosted image
//! service: upload a binary image and get back a public URL plus the
//! provider-side filename used for later deletion.

use async_trait::async_trait;

/// HTTP-backed implementation talking to the hosted image service.
mod hosted;
pub use hosted::HostedImageStore;

/// In-memory double used by tests.
#[cfg(any(test, feature = "test-util"))]
pub mod memory;

/// A stored image as reported by the image host.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct StoredImage {
    /// Public URL serving the image.
    pub url: String,
    /// Provider-side identifier, unique per upload, used for deletion.
    pub filename: String,
}

/// Errors from the image host collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ImageStoreError {
    /// The HTTP call to the image host failed.
    #[error("image host request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The image host answered with a non-success status.
    #[error("image host rejected {operation} with status {status}")]
    Rejected {
        /// Which operation was rejected ("store" or "destroy").
        operation: &'static str,
        /// The HTTP status returned by the host.
        status: u16,
    },
}

/// Contract with the external image host: `store` uploads a binary image and
/// returns its public URL plus the filename to use for a later `destroy`.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Uploads an image, returning the hosted URL and provider filename.
    async fn store(&self, filename: &str, bytes: Vec<u8>) -> Result<StoredImage, ImageStoreError>;

    /// Deletes a previously stored image by its provider filename.
    async fn destroy(&self, filename: &str) -> Result<(), ImageStoreError>;
}
