//! Multipart file upload client.
//!
//! Uploads go to a dedicated endpoint outside the REST base; storage is
//! owned by the backend, which answers with the public URL of the stored
//! file.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::instrument;

use crate::error::ApiResult;
use crate::gateway::Gateway;

/// Backend acknowledgement of a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    /// Public URL of the stored file.
    pub url: String,
}

/// Client for the multipart upload endpoint.
#[derive(Clone)]
pub struct UploadApi {
    gateway: Gateway,
    upload_url: String,
}

impl UploadApi {
    /// Create an upload client over the shared gateway.
    #[must_use]
    pub const fn new(gateway: Gateway, upload_url: String) -> Self {
        Self {
            gateway,
            upload_url,
        }
    }

    /// Upload a file and return its stored URL.
    ///
    /// # Errors
    ///
    /// Any gateway error; an invalid MIME string surfaces as
    /// [`ApiError::Http`](crate::error::ApiError::Http).
    #[instrument(skip(self, bytes), fields(filename = %filename, bytes = bytes.len()))]
    pub async fn upload(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> ApiResult<UploadResponse> {
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime)?;
        let form = Form::new().part("file", part);
        let builder = self
            .gateway
            .request_absolute(reqwest::Method::POST, &self.upload_url)
            .multipart(form);
        self.gateway.expect_json(builder).await
    }
}
