//! Outbound HTTP adapter: one client per rendition, PUT uploads to the origin.

use crate::domain::layout::redact;
use crate::error::PipelineError;
use crate::ports::upload::{UploadError, UploadPort};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{CONTENT_TYPE, LAST_MODIFIED};
use reqwest::Client;
use std::collections::HashMap;
use std::path::Path;

/// Sent for segments and manifests alike; the origin has only ever seen this.
pub const CONTENT_TYPE_MP2T: &str = "video/MP2T";

/// Dedicated HTTP client per rendition, created once and reused for every
/// upload of that rendition.
#[derive(Clone, Debug, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, Client>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the client for `rendition` unless one already exists.
    pub fn provision(&mut self, rendition: &str) -> Result<(), PipelineError> {
        if self.clients.contains_key(rendition) {
            return Ok(());
        }
        let client = Client::builder()
            .build()
            .map_err(|source| PipelineError::Client {
                rendition: rendition.to_string(),
                source,
            })?;
        self.clients.insert(rendition.to_string(), client);
        Ok(())
    }

    pub fn get(&self, rendition: &str) -> Option<&Client> {
        self.clients.get(rendition)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

/// RFC 7231 date, as used in `Last-Modified`.
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

pub struct HttpPusher {
    registry: ClientRegistry,
}

impl HttpPusher {
    pub fn new(registry: ClientRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl UploadPort for HttpPusher {
    async fn put_file(
        &self,
        rendition: &str,
        local_path: &Path,
        remote_url: &str,
    ) -> Result<u16, UploadError> {
        let client = self
            .registry
            .get(rendition)
            .ok_or_else(|| UploadError::UnknownRendition(rendition.to_string()))?;

        let body = tokio::fs::read(local_path)
            .await
            .map_err(|source| UploadError::Read {
                path: local_path.to_path_buf(),
                source,
            })?;

        // Userinfo in the URL is turned into basic auth by reqwest
        let response = client
            .put(remote_url)
            .header(CONTENT_TYPE, CONTENT_TYPE_MP2T)
            .header(LAST_MODIFIED, http_date(Utc::now()))
            .body(body)
            .send()
            .await
            .map_err(|source| UploadError::Transport {
                file: local_path.to_path_buf(),
                destination: redact(remote_url),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status {
                status: status.as_u16(),
                file: local_path.to_path_buf(),
                destination: redact(remote_url),
            });
        }

        tracing::info!(
            status = status.as_u16(),
            file = %local_path.display(),
            destination = %redact(remote_url),
            "PUT result"
        );
        Ok(status.as_u16())
    }
}
