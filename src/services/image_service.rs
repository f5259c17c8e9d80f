// src/services/image_service.rs
use crate::config::Config;
use crate::errors::SyncError;
use crate::models::*;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};

/// The external processing service, as seen by the client.
#[async_trait]
pub trait ImageService: Send + Sync {
    async fn submit_image(&self, file: &PendingFile) -> Result<UploadAck, SyncError>;

    async fn list_images(&self) -> Result<Vec<RawImageRecord>, SyncError>;

    async fn stats(&self) -> Result<ServiceStats, SyncError>;
}

pub struct HttpImageService {
    base_url: String,
    client: Client,
}

impl HttpImageService {
    pub fn new(config: &Config) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SyncError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.api_base.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> Result<T, SyncError> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SyncError::Transport(format!(
                "{} returned {}: {}",
                what, status, error_text
            )));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| SyncError::Decode(format!("Failed to parse {} response: {}", what, e)))
    }
}

#[async_trait]
impl ImageService for HttpImageService {
    async fn submit_image(&self, file: &PendingFile) -> Result<UploadAck, SyncError> {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/images", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| SyncError::Transport(format!("Upload request failed: {}", e)))?;

        Self::read_json(response, "Upload").await
    }

    async fn list_images(&self) -> Result<Vec<RawImageRecord>, SyncError> {
        let response = self
            .client
            .get(format!("{}/images", self.base_url))
            .send()
            .await
            .map_err(|e| SyncError::Transport(format!("Image list request failed: {}", e)))?;

        let values: Vec<serde_json::Value> = Self::read_json(response, "Image list").await?;
        Ok(values
            .into_iter()
            .filter_map(RawImageRecord::from_value)
            .collect())
    }

    async fn stats(&self) -> Result<ServiceStats, SyncError> {
        let response = self
            .client
            .get(format!("{}/stats", self.base_url))
            .send()
            .await
            .map_err(|e| SyncError::Transport(format!("Stats request failed: {}", e)))?;

        Self::read_json(response, "Stats").await
    }
}
