//! Anonymous image uploads to Imgur

use super::ImageHost;
use crate::error::{Result, StockError};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

pub const IMGUR_API_BASE: &str = "https://api.imgur.com";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    link: Option<String>,
}

/// Imgur upload client, authenticated with an application client id
pub struct ImgurClient {
    client: Client,
    client_id: String,
    api_base: String,
}

impl ImgurClient {
    pub fn new(client_id: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            client_id: client_id.into(),
            api_base: IMGUR_API_BASE.to_string(),
        })
    }

    /// Point the client at another host, e.g. a local mock server
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ImageHost for ImgurClient {
    #[instrument(skip(self, png), fields(bytes = png.len()))]
    async fn upload_png(&self, png: Vec<u8>) -> Result<String> {
        let part = Part::bytes(png)
            .file_name("chart.png")
            .mime_str("image/png")?;
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(format!("{}/3/image", self.api_base))
            .header("Authorization", format!("Client-ID {}", self.client_id))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StockError::UploadError(format!("HTTP {status}: {body}")));
        }

        let link = parse_upload_response(&response.text().await?)?;
        debug!(%link, "Uploaded image");
        Ok(link)
    }
}

fn parse_upload_response(body: &str) -> Result<String> {
    let response: UploadResponse = serde_json::from_str(body)?;
    response
        .data
        .link
        .filter(|link| !link.is_empty())
        .ok_or_else(|| StockError::UploadError("response has no image link".to_string()))
}
