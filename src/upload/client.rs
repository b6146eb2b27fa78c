// SPDX-License-Identifier: GPL-3.0-only

//! HTTP client for the upload endpoint
//!
//! Sends a prepared payload once. Failures are reported, never retried.

use super::payload::UploadPayload;
use crate::constants::UPLOAD_TIMEOUT;
use crate::errors::UploadError;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// JSON body returned by the endpoint
#[derive(Debug, Clone, Default, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Where the endpoint stored the image
    pub url: String,
}

/// Upload endpoint client
#[derive(Debug, Clone)]
pub struct UploadClient {
    endpoint: String,
    client: reqwest::Client,
}

impl UploadClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .user_agent(concat!("bodysnap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UploadError::Network(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST the payload as `multipart/form-data`
    pub async fn send(&self, payload: &UploadPayload) -> Result<UploadReceipt, UploadError> {
        let body = payload.to_multipart();

        info!(
            endpoint = %self.endpoint,
            filename = %payload.file.filename,
            size = payload.file.data.len(),
            category = %payload.category,
            "Uploading photo"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, body.content_type())
            .body(body.bytes)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        debug!(status, body_len = text.len(), "Upload response received");

        let result = interpret_response(status, &text);
        match &result {
            Ok(receipt) => info!(url = %receipt.url, "Upload complete"),
            Err(e) => warn!(status, error = %e, "Upload failed"),
        }
        result
    }
}

/// Map an endpoint response to a receipt or an error
pub fn interpret_response(status: u16, body: &str) -> Result<UploadReceipt, UploadError> {
    let parsed: Option<UploadResponse> = serde_json::from_str(body).ok();
    let message = |fallback: &str| {
        parsed
            .as_ref()
            .and_then(|r| r.error.clone())
            .unwrap_or_else(|| fallback.to_string())
    };

    match status {
        200..=299 => {
            let response = parsed.clone().ok_or_else(|| {
                UploadError::InvalidResponse("response body is not JSON".into())
            })?;
            if let Some(error) = response.error {
                return Err(UploadError::Server(error));
            }
            match (response.success, response.url) {
                (true, Some(url)) => Ok(UploadReceipt { url }),
                _ => Err(UploadError::InvalidResponse(
                    "response lacks success flag or url".into(),
                )),
            }
        }
        400 => Err(UploadError::Rejected(message("malformed request"))),
        _ => Err(UploadError::Server(message(&format!("HTTP status {}", status)))),
    }
}
