//! Deployment session state
//!
//! One `DeploymentState` exists per deployment attempt. It only ever moves
//! forward through `DeployPhase`, or falls back to the last stable phase
//! when a phase fails.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::manifest_diff::SiteManifestDiff;
use super::site::SiteManifest;
use crate::domain::value_objects::ObjectId;

/// Position in the deployment state machine
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DeployPhase {
    #[default]
    Idle,
    Preparing,
    Prepared,
    Uploading,
    Uploaded,
    Certifying,
    Certified,
    Deploying,
    Deployed,
}

impl DeployPhase {
    /// Stable phases are the ones a failed phase falls back to.
    pub fn is_stable(self) -> bool {
        matches!(
            self,
            DeployPhase::Idle
                | DeployPhase::Prepared
                | DeployPhase::Uploaded
                | DeployPhase::Certified
                | DeployPhase::Deployed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeployPhase::Idle => "idle",
            DeployPhase::Preparing => "preparing",
            DeployPhase::Prepared => "prepared",
            DeployPhase::Uploading => "uploading",
            DeployPhase::Uploaded => "uploaded",
            DeployPhase::Certifying => "certifying",
            DeployPhase::Certified => "certified",
            DeployPhase::Deploying => "deploying",
            DeployPhase::Deployed => "deployed",
        }
    }
}

impl fmt::Display for DeployPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ledger transaction submitted during the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub digest: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl TransactionRecord {
    pub fn new(digest: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            digest: digest.into(),
            description: description.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Upload-ready content produced by the blob network's encoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedUpload {
    /// Opaque handle understood by the blob network client
    pub handle: String,
    /// Resource paths bundled into this upload
    pub paths: Vec<String>,
    pub encoded_size: u64,
}

/// A certified storage blob and the files it carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertifiedBlob {
    pub blob_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_object: Option<ObjectId>,
    pub paths: Vec<String>,
}

/// Everything a deployment attempt accumulates
#[derive(Debug, Clone, Default)]
pub struct DeploymentState {
    pub phase: DeployPhase,
    /// Desired manifest, reconciled with locators after certification
    pub manifest: Option<SiteManifest>,
    /// Published manifest at prepare time
    pub current: Option<SiteManifest>,
    pub diff: Option<SiteManifestDiff>,
    pub pending_upload: Option<EncodedUpload>,
    /// Set once the register transaction of `pending_upload` landed
    pub upload_registered: bool,
    /// Set once the certify transaction of `pending_upload` landed
    pub upload_certified: bool,
    pub certified_blobs: Vec<CertifiedBlob>,
    /// Append-only
    pub transactions: Vec<TransactionRecord>,
    pub site_id: Option<ObjectId>,
    /// Deleted paths whose blobs were already removed by cleanup
    pub cleaned_paths: Vec<String>,
}

impl DeploymentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything prepared so far but keep the transaction log.
    pub fn reset(&mut self) {
        let transactions = std::mem::take(&mut self.transactions);
        *self = Self {
            transactions,
            ..Self::default()
        };
    }

    pub fn record(&mut self, record: TransactionRecord) {
        self.transactions.push(record);
    }
}
