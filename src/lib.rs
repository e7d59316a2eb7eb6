//! Siteforge - static site reconciliation and deployment
//!
//! Siteforge turns a local directory of files into a site published on a
//! content-addressed blob network, indexed by an on-chain site object. It
//! builds the desired manifest, reads what is already published, diffs the
//! two and drives the deployment through encode, upload, certify and write
//! phases so that only changed content is stored and only changed records
//! are touched.
//!
//! Signing keys and the blob network client are supplied by the caller
//! through the ports in [`domain::ports`].

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod telemetry;

// Re-exports for convenience
pub use application::{
    ChainSiteReader, DeployClients, DeployRequest, DeploymentFlow, FlowError, PrepareOutcome,
    Preview, PreviewUseCase, ReadError, WriteOutcome,
};
pub use config::{Config, ConfigWarning};
pub use domain::entities::{Asset, DeployPhase, Resource, Route, SiteManifest, SiteSettings};
pub use domain::services::{ManifestBuilder, ManifestDiffer, OperationBuilder};
pub use domain::value_objects::{Epochs, ObjectId, PatchId, U256};
pub use error::{SiteforgeError, SiteforgeResult};
