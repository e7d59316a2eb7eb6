//! Deploy Result
//!
//! Outcomes and errors of deployment phases.

use thiserror::Error;

use crate::application::site_reader::ReadError;
use crate::domain::entities::{DeployPhase, DiffSummary};
use crate::domain::ports::{BlobError, LedgerError, LookupError, SignerError};
use crate::domain::services::{BuildError, ManifestError};
use crate::domain::value_objects::{ObjectId, PatchIdError};

/// Result of `prepare`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrepareOutcome {
    /// Published site already matches; nothing to deploy
    UpToDate,
    /// Diff computed and content encoded
    Prepared { summary: DiffSummary },
}

impl PrepareOutcome {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, PrepareOutcome::UpToDate)
    }
}

/// Result of `write_site`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub site_id: ObjectId,
    pub digest: String,
}

/// Underlying cause of a failed phase
#[derive(Debug, Error)]
pub enum PhaseError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    PatchId(#[from] PatchIdError),

    #[error("transaction {digest} failed on chain: {error}")]
    TransactionFailed { digest: String, error: String },

    #[error("no local content for resource '{0}'")]
    MissingAsset(String),

    #[error("certified upload has no patch for: {}", .0.join(", "))]
    UnresolvedResources(Vec<String>),

    #[error("transaction {0} did not produce a site object owned by the deployer")]
    MissingSiteObject(String),
}

/// Error returned by deployment flow operations
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("another deployment phase is already running")]
    ConcurrentOperation,

    #[error("cannot {operation} while the deployment is {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase: DeployPhase,
    },

    #[error("{phase} failed: {source}")]
    PhaseFailed {
        phase: DeployPhase,
        #[source]
        source: PhaseError,
    },

    #[error("cleanup of '{path}' failed: {source}")]
    CleanupFailed {
        path: String,
        #[source]
        source: PhaseError,
    },
}

impl FlowError {
    /// The phase that failed, for `PhaseFailed`.
    pub fn failed_phase(&self) -> Option<DeployPhase> {
        match self {
            FlowError::PhaseFailed { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}
