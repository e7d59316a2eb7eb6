//! Error types for Siteforge
//!
//! Each concern keeps its own `thiserror` enum next to the code that raises
//! it. `SiteforgeError` gathers them for callers that drive several steps.

use thiserror::Error;

use crate::application::{FlowError, PreviewError, ReadError};
use crate::config::ConfigError;
use crate::domain::services::{BuildError, ManifestError};
use crate::domain::value_objects::{ObjectIdError, PatchIdError};
use crate::infrastructure::AssetError;

/// Result type alias for Siteforge operations
pub type SiteforgeResult<T> = Result<T, SiteforgeError>;

/// Main error type for Siteforge operations
#[derive(Error, Debug)]
pub enum SiteforgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Assets(#[from] AssetError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error(transparent)]
    PatchId(#[from] PatchIdError),

    #[error(transparent)]
    ObjectId(#[from] ObjectIdError),

    /// A setting the command needs was not configured
    #[error("missing configuration: {key} (set it in siteforge.toml or {env})")]
    MissingConfig { key: &'static str, env: &'static str },
}

impl From<PreviewError> for SiteforgeError {
    fn from(error: PreviewError) -> Self {
        match error {
            PreviewError::Manifest(e) => SiteforgeError::Manifest(e),
            PreviewError::Read(e) => SiteforgeError::Read(e),
        }
    }
}
