//! Structural diff between two site manifests

use std::fmt;

use serde::{Deserialize, Serialize};

use super::site::{Metadata, Resource, Route};

/// What happens to one resource path
///
/// A changed body is reported as `Created` with the new data; there is no
/// separate "updated" tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data", rename_all = "lowercase")]
pub enum ResourceOp {
    Created(Resource),
    Deleted(Resource),
    Unchanged(Resource),
}

impl ResourceOp {
    pub fn resource(&self) -> &Resource {
        match self {
            ResourceOp::Created(r) | ResourceOp::Deleted(r) | ResourceOp::Unchanged(r) => r,
        }
    }

    pub fn path(&self) -> &str {
        &self.resource().path
    }

    pub fn is_created(&self) -> bool {
        matches!(self, ResourceOp::Created(_))
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, ResourceOp::Deleted(_))
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, ResourceOp::Unchanged(_))
    }
}

/// Whole-value change of a manifest field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data", rename_all = "lowercase")]
pub enum FieldUpdate<T> {
    Noop,
    Update(T),
}

impl<T> FieldUpdate<T> {
    pub fn is_update(&self) -> bool {
        matches!(self, FieldUpdate::Update(_))
    }

    pub fn as_update(&self) -> Option<&T> {
        match self {
            FieldUpdate::Update(v) => Some(v),
            FieldUpdate::Noop => None,
        }
    }
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::Noop
    }
}

/// Result of diffing a desired manifest against the published one
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SiteManifestDiff {
    /// Emission order carries no meaning
    pub resources: Vec<ResourceOp>,
    /// Always the full new route list, never a delta
    pub routes: FieldUpdate<Vec<Route>>,
    pub metadata: FieldUpdate<Metadata>,
    pub site_name: FieldUpdate<String>,
}

impl SiteManifestDiff {
    /// True iff anything needs to be written on-chain.
    pub fn has_update(&self) -> bool {
        self.resources.iter().any(|op| !op.is_unchanged())
            || self.routes.is_update()
            || self.metadata.is_update()
            || self.site_name.is_update()
    }

    pub fn created(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter_map(|op| match op {
            ResourceOp::Created(r) => Some(r),
            _ => None,
        })
    }

    pub fn deleted(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter_map(|op| match op {
            ResourceOp::Deleted(r) => Some(r),
            _ => None,
        })
    }

    pub fn created_mut(&mut self) -> impl Iterator<Item = &mut Resource> {
        self.resources.iter_mut().filter_map(|op| match op {
            ResourceOp::Created(r) => Some(r),
            _ => None,
        })
    }

    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            created: self.resources.iter().filter(|op| op.is_created()).count(),
            deleted: self.resources.iter().filter(|op| op.is_deleted()).count(),
            unchanged: self.resources.iter().filter(|op| op.is_unchanged()).count(),
            routes_updated: self.routes.is_update(),
            metadata_updated: self.metadata.is_update(),
            name_updated: self.site_name.is_update(),
        }
    }
}

/// Counts for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DiffSummary {
    pub created: usize,
    pub deleted: usize,
    pub unchanged: usize,
    pub routes_updated: bool,
    pub metadata_updated: bool,
    pub name_updated: bool,
}

impl fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} deleted, {} unchanged",
            self.created, self.deleted, self.unchanged
        )?;
        let mut extras = Vec::new();
        if self.routes_updated {
            extras.push("routes");
        }
        if self.metadata_updated {
            extras.push("metadata");
        }
        if self.name_updated {
            extras.push("name");
        }
        if !extras.is_empty() {
            write!(f, "; updating {}", extras.join(", "))?;
        }
        Ok(())
    }
}
