//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod blob_network;
pub mod chain_reader;
pub mod deploy_events;
pub mod ledger;
pub mod patch_lookup;
pub mod signer;

pub use blob_network::{BlobError, BlobNetwork, CertifiedFile, UploadFile};
pub use chain_reader::{
    ChainReader, DynamicFieldInfo, DynamicFieldName, DynamicFieldPage, ObjectData,
    ObjectErrorCode, ObjectOptions, ObjectResponse, RpcError,
};
pub use deploy_events::{FlowEvent, FlowEventSink, NoopEventSink, PhaseStatus, ProgressEvent};
pub use ledger::{
    ExecutionStatus, LedgerClient, LedgerError, ObjectChange, Signature, TransactionEffects,
    TransactionPayload, TransactionResponse, UnsignedTransaction,
};
pub use patch_lookup::{LookupError, PatchLookup, QuiltPatch};
pub use signer::{Signer, SignerError};
