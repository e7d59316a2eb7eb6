//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `ChainSiteReader` - Reads the published manifest of a site
//! - `DeploymentFlow` - Drives a deployment through its phases
//! - `PreviewUseCase` - Builds, reads and diffs without submitting anything

pub mod deploy;
pub mod preview;
pub mod site_reader;

pub use deploy::{
    DeployClients, DeployRequest, DeploymentFlow, FlowError, PhaseError, PrepareOutcome,
    WriteOutcome,
};
pub use preview::{Preview, PreviewError, PreviewUseCase};
pub use site_reader::{ChainSiteReader, ReadError};
