//! Patch Lookup Port
//!
//! Resolves a bundle blob id into the patches it carries, as served by an
//! aggregator at `GET /v1/quilts/{blob_id}/patches`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("patch lookup for {blob_id} failed: {message}")]
    Request { blob_id: String, message: String },

    #[error("patch lookup for {blob_id} returned status {status}")]
    Status { blob_id: String, status: u16 },

    #[error("patch lookup returned an unreadable body: {0}")]
    Decode(String),
}

/// One patch of a bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuiltPatch {
    /// File identifier within the bundle, usually the resource path
    pub identifier: String,
    /// Content locator of the patch
    pub patch_id: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[async_trait]
pub trait PatchLookup: Send + Sync {
    async fn patches(&self, blob_id: &str) -> Result<Vec<QuiltPatch>, LookupError>;
}
