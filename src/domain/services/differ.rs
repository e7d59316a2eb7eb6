//! Manifest Differ Domain Service
//!
//! Compares a desired manifest against the published one, path by path for
//! resources and as whole values for routes, metadata and name.

use std::collections::{HashMap, HashSet};

use crate::domain::entities::{FieldUpdate, ResourceOp, Route, SiteManifest, SiteManifestDiff};

/// Differ service for site manifests
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestDiffer {
    include_unchanged: bool,
}

impl ManifestDiffer {
    /// A differ that reports only resources that need work.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also report `Unchanged` ops, for previews that show every path.
    pub fn with_unchanged(mut self, include: bool) -> Self {
        self.include_unchanged = include;
        self
    }

    /// Compute the diff between `next` (desired) and `current` (published).
    pub fn diff(&self, next: &SiteManifest, current: &SiteManifest) -> SiteManifestDiff {
        SiteManifestDiff {
            resources: self.diff_resources(next, current),
            routes: diff_routes(next, current),
            metadata: diff_value(&next.metadata, &current.metadata),
            site_name: diff_value(&next.site_name, &current.site_name),
        }
    }

    fn diff_resources(&self, next: &SiteManifest, current: &SiteManifest) -> Vec<ResourceOp> {
        let current_by_path: HashMap<&str, _> = current
            .resources
            .iter()
            .map(|r| (r.path.as_str(), r))
            .collect();

        let mut ops = Vec::new();
        for resource in &next.resources {
            match current_by_path.get(resource.path.as_str()) {
                Some(existing) if existing.content_hash == resource.content_hash => {
                    if self.include_unchanged {
                        ops.push(ResourceOp::Unchanged(resource.clone()));
                    }
                }
                _ => ops.push(ResourceOp::Created(resource.clone())),
            }
        }

        let next_paths: HashSet<&str> = next.paths().collect();
        ops.extend(
            current
                .resources
                .iter()
                .filter(|r| !next_paths.contains(r.path.as_str()))
                .map(|r| ResourceOp::Deleted(r.clone())),
        );
        ops
    }
}

/// Routes compare as an ordered list; a missing list equals an empty one.
fn diff_routes(next: &SiteManifest, current: &SiteManifest) -> FieldUpdate<Vec<Route>> {
    let next_routes = next.routes_or_empty();
    if next_routes == current.routes_or_empty() {
        FieldUpdate::Noop
    } else {
        FieldUpdate::Update(next_routes.to_vec())
    }
}

/// Whole-value comparison. An absent next value against a present current
/// one is an update to the empty value.
fn diff_value<T>(next: &Option<T>, current: &Option<T>) -> FieldUpdate<T>
where
    T: Clone + PartialEq + Default,
{
    if next == current {
        FieldUpdate::Noop
    } else {
        FieldUpdate::Update(next.clone().unwrap_or_default())
    }
}
