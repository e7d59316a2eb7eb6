//! Domain Entities
//!
//! - `SiteManifest`, `Resource`, `Route`, `Metadata` - desired or published site
//! - `SiteManifestDiff` - what changed between two manifests
//! - `SiteSettings`, `Asset` - inputs to manifest building
//! - `DeploymentState` - the one mutable entity of a deployment session

mod deployment;
mod manifest_diff;
mod settings;
mod site;

pub use deployment::{CertifiedBlob, DeployPhase, DeploymentState, EncodedUpload, TransactionRecord};
pub use manifest_diff::{DiffSummary, FieldUpdate, ResourceOp, SiteManifestDiff};
pub use settings::{Asset, OrderedMap, SiteSettings, SETTINGS_FILE_NAME};
pub use site::{normalize_path, ByteRange, Metadata, Resource, Route, SiteManifest, PENDING_LOCATOR};
