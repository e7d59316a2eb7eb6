//! Deploy Module
//!
//! Orchestrates deployment of a site onto the blob network and the ledger.
//!
//! ## Structure
//!
//! - `options` - Inputs of one attempt (`DeployRequest`)
//! - `result` - Outcomes and errors (`PrepareOutcome`, `WriteOutcome`, `FlowError`)
//! - `flow` - The phase state machine (`DeploymentFlow`)
//!
//! ## Usage
//!
//! ```ignore
//! use siteforge::application::deploy::{DeployRequest, DeploymentFlow};
//!
//! let request = DeployRequest::new(assets, settings, owner).with_deploy_config(&config.deploy);
//! let flow = DeploymentFlow::new(clients, package, request);
//! if !flow.prepare().await?.is_up_to_date() {
//!     flow.upload_requested().await?;
//!     flow.certify().await?;
//!     let outcome = flow.write_site().await?;
//! }
//! ```

mod flow;
mod options;
mod result;

pub use flow::{DeployClients, DeploymentFlow, SITE_TYPE_SUFFIX};
pub use options::DeployRequest;
pub use result::{FlowError, PhaseError, PrepareOutcome, WriteOutcome};
