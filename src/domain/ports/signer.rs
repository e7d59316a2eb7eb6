//! Signer Port

use async_trait::async_trait;
use thiserror::Error;

use super::ledger::{Signature, UnsignedTransaction};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    #[error("signing was rejected: {0}")]
    Rejected(String),

    #[error("signer unavailable: {0}")]
    Unavailable(String),
}

/// Signs transactions on behalf of the site owner
///
/// Sponsored submission changes who pays, not what gets signed, so one
/// trait covers both.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign(&self, tx: &UnsignedTransaction) -> Result<Signature, SignerError>;
}
