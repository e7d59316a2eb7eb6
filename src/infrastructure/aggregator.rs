//! Aggregator Patch Lookup
//!
//! `PatchLookup` over an aggregator's HTTP API.

use async_trait::async_trait;
use tracing::debug;

use crate::config::NetworkConfig;
use crate::domain::ports::{LookupError, PatchLookup, QuiltPatch};

pub struct HttpPatchLookup {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPatchLookup {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn from_config(config: &NetworkConfig) -> Self {
        Self::new(config.aggregator_url.clone())
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn patches_url(&self, blob_id: &str) -> String {
        format!(
            "{}/v1/quilts/{}/patches",
            self.base_url.trim_end_matches('/'),
            blob_id
        )
    }
}

#[async_trait]
impl PatchLookup for HttpPatchLookup {
    async fn patches(&self, blob_id: &str) -> Result<Vec<QuiltPatch>, LookupError> {
        let url = self.patches_url(blob_id);
        debug!(url = %url, "looking up quilt patches");

        let request_error = |e: reqwest::Error| LookupError::Request {
            blob_id: blob_id.to_string(),
            message: e.to_string(),
        };
        let response = self.client.get(&url).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status {
                blob_id: blob_id.to_string(),
                status: status.as_u16(),
            });
        }
        response
            .json::<Vec<QuiltPatch>>()
            .await
            .map_err(|e| LookupError::Decode(e.to_string()))
    }
}
