//! Ledger Client Port
//!
//! Submits signed transactions and reports their effects.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::services::SiteTransaction;
use crate::domain::value_objects::{Address, ObjectId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("transaction submission failed: {0}")]
    Submission(String),

    #[error("transaction {digest} was not confirmed: {message}")]
    Unconfirmed { digest: String, message: String },
}

/// Contents of a transaction before signing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum TransactionPayload {
    /// Site-contract calls built by the operation builder
    Site(SiteTransaction),
    /// Serialized transaction built by another client (blob network)
    Prebuilt(Vec<u8>),
}

/// A transaction ready to be signed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnsignedTransaction {
    /// Human description recorded in the transaction log
    pub description: String,
    pub payload: TransactionPayload,
}

impl UnsignedTransaction {
    pub fn site(description: impl Into<String>, tx: SiteTransaction) -> Self {
        Self {
            description: description.into(),
            payload: TransactionPayload::Site(tx),
        }
    }

    pub fn prebuilt(description: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            description: description.into(),
            payload: TransactionPayload::Prebuilt(bytes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(pub Vec<u8>);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failure { error: String },
}

/// An object touched by a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectChange {
    pub object_id: ObjectId,
    pub object_type: String,
    /// Address owner, when the object is address-owned
    pub owner: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEffects {
    pub status: ExecutionStatus,
    #[serde(default)]
    pub created: Vec<ObjectChange>,
    #[serde(default)]
    pub mutated: Vec<ObjectChange>,
}

impl TransactionEffects {
    pub fn success() -> Self {
        Self {
            status: ExecutionStatus::Success,
            created: Vec::new(),
            mutated: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    /// Created objects first, then mutated ones.
    pub fn changed_objects(&self) -> impl Iterator<Item = &ObjectChange> {
        self.created.iter().chain(self.mutated.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub digest: String,
    pub effects: TransactionEffects,
}

/// Submit-and-wait access to the ledger
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submit a signed transaction and wait until it is confirmed.
    async fn execute(
        &self,
        tx: &UnsignedTransaction,
        signature: &Signature,
    ) -> Result<TransactionResponse, LedgerError>;
}
