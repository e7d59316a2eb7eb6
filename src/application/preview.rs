//! Preview Use Case
//!
//! Orchestrates the preview flow:
//! 1. Build the desired manifest from local assets
//! 2. Read the published manifest
//! 3. Diff them and plan the site transaction
//!
//! This is essentially a dry-run of the deployment flow. Nothing is
//! uploaded, signed or submitted.

use thiserror::Error;

use super::site_reader::{ChainSiteReader, ReadError};
use crate::domain::entities::{Asset, DiffSummary, SiteManifest, SiteManifestDiff, SiteSettings};
use crate::domain::services::{
    BuildError, ManifestBuilder, ManifestDiffer, ManifestError, OperationBuilder, SiteTransaction,
};
use crate::domain::value_objects::{Address, ObjectId};

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Read(#[from] ReadError),
}

/// What a deployment would do
#[derive(Debug, Clone)]
pub struct Preview {
    pub manifest: SiteManifest,
    pub current: SiteManifest,
    pub diff: SiteManifestDiff,
    /// Planned calls, or why the plan cannot be built yet
    pub plan: Result<SiteTransaction, BuildError>,
}

impl Preview {
    pub fn summary(&self) -> DiffSummary {
        self.diff.summary()
    }

    pub fn is_up_to_date(&self) -> bool {
        !self.diff.has_update()
    }
}

/// Preview use case
pub struct PreviewUseCase {
    reader: ChainSiteReader,
    package: ObjectId,
    include_unchanged: bool,
}

impl PreviewUseCase {
    pub fn new(reader: ChainSiteReader, package: ObjectId) -> Self {
        Self {
            reader,
            package,
            include_unchanged: false,
        }
    }

    /// Also list resources that would stay as they are.
    pub fn with_unchanged(mut self, include: bool) -> Self {
        self.include_unchanged = include;
        self
    }

    pub async fn execute(
        &self,
        assets: &[Asset],
        settings: &SiteSettings,
        site_id: Option<&ObjectId>,
        owner: Address,
    ) -> Result<Preview, PreviewError> {
        let manifest = ManifestBuilder::new().build(assets, settings)?;
        let current = self.reader.fetch_current(site_id).await?;
        let diff = ManifestDiffer::new()
            .with_unchanged(self.include_unchanged)
            .diff(&manifest, &current);
        let plan = OperationBuilder::new(self.package)
            .allow_pending(true)
            .build(site_id.copied(), &diff, owner);

        Ok(Preview {
            manifest,
            current,
            diff,
            plan,
        })
    }
}
