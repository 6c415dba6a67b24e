use reqwest::Client;
use tracing::{debug, warn};

use crate::{ImageStore, ImageStoreError, StoredImage};

/// Client for the hosted image service.
///
/// The host exposes two endpoints: `POST {base}/upload` taking a multipart
/// body and returning `{url, filename}`, and `DELETE {base}/images/{filename}`.
pub struct HostedImageStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HostedImageStore {
    /// Create a new client for the image host at `base_url`.
    pub fn new(base_url: String, api_key: Option<String>) -> Result<Self, ImageStoreError> {
        let client = Client::builder()
            .user_agent("trailside/0.1")
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

#[async_trait::async_trait]
impl ImageStore for HostedImageStore {
    async fn store(&self, filename: &str, bytes: Vec<u8>) -> Result<StoredImage, ImageStoreError> {
        debug!("Uploading {} ({} bytes) to image host", filename, bytes.len());

        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("image", part);

        let url = format!("{}/upload", self.base_url);
        let response = self
            .authorize(self.client.post(&url))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Image host rejected upload with status {}", response.status());
            return Err(ImageStoreError::Rejected {
                operation: "store",
                status: response.status().as_u16(),
            });
        }

        let stored: StoredImage = response.json().await?;
        debug!("Image host stored {} at {}", stored.filename, stored.url);
        Ok(stored)
    }

    async fn destroy(&self, filename: &str) -> Result<(), ImageStoreError> {
        debug!("Deleting {} from image host", filename);

        let url = format!("{}/images/{}", self.base_url, urlencoding::encode(filename));
        let response = self.authorize(self.client.delete(&url)).send().await?;

        if !response.status().is_success() {
            warn!(
                "Image host rejected deletion of {} with status {}",
                filename,
                response.status()
            );
            return Err(ImageStoreError::Rejected {
                operation: "destroy",
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}
