//! Blob Network Port
//!
//! Storage side of a deployment: encode file bodies, pay for retention,
//! push bytes to storage nodes, certify availability.

use async_trait::async_trait;
use thiserror::Error;

use super::ledger::UnsignedTransaction;
use crate::domain::entities::EncodedUpload;
use crate::domain::value_objects::{Epochs, ObjectId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlobError {
    #[error("encoding failed: {0}")]
    Encoding(String),

    #[error("storage nodes rejected the upload: {0}")]
    Upload(String),

    #[error("blob network request failed: {0}")]
    Network(String),
}

/// One file body to store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub path: String,
    pub bytes: Vec<u8>,
}

/// A stored file and where the network put it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertifiedFile {
    pub path: String,
    /// Content locator of the blob holding the file
    pub blob_id: String,
    pub blob_object: Option<ObjectId>,
}

#[async_trait]
pub trait BlobNetwork: Send + Sync {
    /// Encode file bodies into an upload-ready handle.
    async fn encode(&self, files: &[UploadFile]) -> Result<EncodedUpload, BlobError>;

    /// Build the register-and-pay transaction for an encoded upload.
    async fn register(
        &self,
        upload: &EncodedUpload,
        epochs: Epochs,
        deletable: bool,
    ) -> Result<UnsignedTransaction, BlobError>;

    /// Push the encoded bytes to storage nodes. Only valid after the
    /// register transaction is confirmed.
    async fn push(&self, upload: &EncodedUpload) -> Result<(), BlobError>;

    /// Build the certification transaction for a pushed upload.
    async fn certify(&self, upload: &EncodedUpload) -> Result<UnsignedTransaction, BlobError>;

    /// Files of a certified upload with their blob locators.
    async fn certified_files(&self, upload: &EncodedUpload)
        -> Result<Vec<CertifiedFile>, BlobError>;

    /// Build a transaction deleting a stored blob.
    async fn delete(&self, blob_id: &str) -> Result<UnsignedTransaction, BlobError>;
}
