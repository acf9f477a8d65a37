//! Proof-of-payment upload over HTTP.

use crate::error::{ServiceError, UploadError};
use crate::gateway::ProofUploader;
use crate::http::{network, read_envelope, require};
use crate::types::ProofFile;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;

/// Identifier returned by the image endpoint; some deployments send a number
#[derive(Deserialize)]
#[serde(untagged)]
enum UploadedId {
    Text(String),
    Number(u64),
}

#[derive(Deserialize)]
struct UploadResponse {
    id: UploadedId,
}

/// Uploads proofs to the image endpoint as multipart field `file`.
///
/// The endpoint answers with the usual envelope, `data` being `{ id }`.
/// The stored image is served at `<endpoint>?_id=<id>`.
#[derive(Clone, Debug)]
pub struct HttpProofUploader {
    client: Client,
    upload_url: String,
}

impl HttpProofUploader {
    /// Creates an uploader for `upload_url` (e.g. `http://localhost:3000/api/image`)
    #[must_use]
    pub fn new(upload_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), upload_url)
    }

    /// Creates an uploader sharing an existing connection pool
    #[must_use]
    pub fn with_client(client: Client, upload_url: impl Into<String>) -> Self {
        Self {
            client,
            upload_url: upload_url.into(),
        }
    }

    /// Public URL of an uploaded image
    #[must_use]
    pub fn image_url(&self, id: &str) -> String {
        format!("{}?_id={id}", self.upload_url)
    }

    #[tracing::instrument(skip(self, file), fields(file = %file.file_name, len = file.bytes.len()))]
    async fn send(self, file: ProofFile) -> Result<String, UploadError> {
        if file.bytes.is_empty() {
            return Err(UploadError::EmptyFile);
        }

        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|_| UploadError::InvalidContentType(file.content_type.clone()))?;

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(Form::new().part("file", part))
            .send()
            .await
            .map_err(network)?;

        let body: UploadResponse = require(read_envelope(response).await?)?;

        let id = match body.id {
            UploadedId::Text(id) => id,
            UploadedId::Number(id) => id.to_string(),
        };
        if id.is_empty() {
            return Err(ServiceError::InvalidResponse("empty image id".to_string()).into());
        }

        let url = self.image_url(&id);
        tracing::info!(%url, "Proof of payment uploaded");
        Ok(url)
    }
}

impl ProofUploader for HttpProofUploader {
    fn upload(&self, file: ProofFile) -> Pin<Box<dyn Future<Output = Result<String, UploadError>> + Send>> {
        Box::pin(self.clone().send(file))
    }
}
