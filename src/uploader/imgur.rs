//! Image-host backend: anonymous-style multipart upload to Imgur.
//!
//! One multipart POST per image against the fixed upload endpoint, with a
//! bearer credential. The host assigns the URL; there is no notion of a
//! key, and no way to check whether the image already exists — so the
//! `override` flag is accepted but has no effect here (every call uploads).
//! That no-op is deliberate, kept for contract compatibility with the
//! object-storage variant.

use crate::error::PublishError;
use crate::uploader::Uploader;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

const UPLOAD_ENDPOINT: &str = "https://api.imgur.com/3/image";

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub(crate) data: UploadedImage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadedImage {
    pub(crate) link: String,
}

pub struct ImgurUploader {
    client: reqwest::Client,
    access_token: String,
}

impl ImgurUploader {
    pub fn new(client: reqwest::Client, access_token: String) -> Self {
        Self {
            client,
            access_token,
        }
    }
}

#[async_trait]
impl Uploader for ImgurUploader {
    async fn upload(&self, image: &Path, _override_remote: bool) -> Result<String, PublishError> {
        let bytes = tokio::fs::read(image)
            .await
            .map_err(|e| PublishError::ImageRead {
                path: image.to_path_buf(),
                source: e,
            })?;

        let file_name = image
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let form = Form::new().part("image", Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(UPLOAD_ENDPOINT)
            .bearer_auth(&self.access_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PublishError::UploadFailed {
                path: image.to_path_buf(),
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::UploadFailed {
                path: image.to_path_buf(),
                detail: format!("HTTP {status}"),
            });
        }

        let payload: UploadResponse =
            response
                .json()
                .await
                .map_err(|e| PublishError::UploadFailed {
                    path: image.to_path_buf(),
                    detail: format!("malformed response payload: {e}"),
                })?;

        debug!("uploaded {} -> {}", image.display(), payload.data.link);
        Ok(payload.data.link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upload_response_payload() {
        let json = r#"{
            "data": {
                "id": "abc123",
                "link": "https://i.imgur.com/abc123.png",
                "deletehash": "xyz"
            },
            "success": true,
            "status": 200
        }"#;
        let payload: UploadResponse = serde_json::from_str(json).unwrap();
        assert_eq!(payload.data.link, "https://i.imgur.com/abc123.png");
    }

    #[test]
    fn rejects_payload_without_link() {
        let json = r#"{"data": {"id": "abc123"}, "success": true, "status": 200}"#;
        assert!(serde_json::from_str::<UploadResponse>(json).is_err());
    }
}
