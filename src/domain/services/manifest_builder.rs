//! Manifest building service
//!
//! Turns local assets plus site settings into a canonical `SiteManifest`.
//! Pure: no I/O, and the asset hashes are reused as-is.

use std::collections::HashSet;

use thiserror::Error;

use super::content_type::content_type_for;
use crate::domain::entities::{Asset, Resource, Route, SiteManifest, SiteSettings};

pub const CONTENT_ENCODING_HEADER: &str = "content-encoding";
pub const CONTENT_TYPE_HEADER: &str = "content-type";
pub const IDENTITY_ENCODING: &str = "identity";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    #[error("{}", describe_invalid_routes(.invalid, .valid_targets))]
    InvalidRoutes {
        invalid: Vec<Route>,
        valid_targets: Vec<String>,
    },

    #[error("resource path '{0}' appears more than once")]
    DuplicatePath(String),
}

fn describe_invalid_routes(invalid: &[Route], valid_targets: &[String]) -> String {
    let mut out = String::from("routes point at resources that do not exist:\n");
    for route in invalid {
        out.push_str(&format!("  {} -> {}\n", route.route, route.target));
    }
    out.push_str("valid targets:");
    if valid_targets.is_empty() {
        out.push_str(" (none)");
    }
    for target in valid_targets {
        out.push_str(&format!("\n  {}", target));
    }
    out
}

/// Builds manifests from assets and settings
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestBuilder;

impl ManifestBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(
        &self,
        assets: &[Asset],
        settings: &SiteSettings,
    ) -> Result<SiteManifest, ManifestError> {
        let mut seen = HashSet::with_capacity(assets.len());
        let mut resources = Vec::with_capacity(assets.len());

        for asset in assets {
            if !seen.insert(asset.path.as_str()) {
                return Err(ManifestError::DuplicatePath(asset.path.clone()));
            }
            resources.push(self.resource_for(asset, settings));
        }

        let routes = settings.route_list();
        if let Some(routes) = &routes {
            validate_routes(routes, &resources)?;
        }

        Ok(SiteManifest {
            resources,
            routes,
            metadata: settings.metadata.clone(),
            site_name: settings.site_name.clone(),
        })
    }

    fn resource_for(&self, asset: &Asset, settings: &SiteSettings) -> Resource {
        let mut resource = Resource::new(asset.path.clone(), asset.hash);
        resource.headers = match settings.headers_for(&resource.path) {
            Some(headers) => headers,
            None => default_headers(&resource.path),
        };
        resource
    }
}

/// The two headers every resource gets when nothing else is declared.
pub fn default_headers(path: &str) -> Vec<(String, String)> {
    vec![
        (
            CONTENT_ENCODING_HEADER.to_string(),
            IDENTITY_ENCODING.to_string(),
        ),
        (
            CONTENT_TYPE_HEADER.to_string(),
            content_type_for(path).to_string(),
        ),
    ]
}

fn validate_routes(routes: &[Route], resources: &[Resource]) -> Result<(), ManifestError> {
    let paths: HashSet<&str> = resources.iter().map(|r| r.path.as_str()).collect();
    let invalid: Vec<Route> = routes
        .iter()
        .filter(|route| !paths.contains(route.target.as_str()))
        .cloned()
        .collect();

    if invalid.is_empty() {
        return Ok(());
    }

    let mut valid_targets: Vec<String> = resources.iter().map(|r| r.path.clone()).collect();
    valid_targets.sort();
    Err(ManifestError::InvalidRoutes {
        invalid,
        valid_targets,
    })
}
