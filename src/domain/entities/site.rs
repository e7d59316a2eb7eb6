//! Site manifest entities
//!
//! A `SiteManifest` is the full description of a site: its resources keyed
//! by path, the routing table, display metadata and the site name.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::U256;

/// Placeholder locator for content that has not been uploaded yet.
pub const PENDING_LOCATOR: &str = "<pending>";

/// Byte-range restriction on a resource body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ByteRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
}

/// One addressable file of a site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Canonical path, always starting with `/`
    pub path: String,
    /// Response headers in declaration order; duplicates allowed
    pub headers: Vec<(String, String)>,
    /// Content-addressed reference, `PENDING_LOCATOR` until certified
    pub content_locator: String,
    /// SHA-256 of the body as a little-endian integer
    pub content_hash: U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<ByteRange>,
}

impl Resource {
    pub fn new(path: impl Into<String>, content_hash: U256) -> Self {
        Self {
            path: normalize_path(&path.into()),
            headers: Vec::new(),
            content_locator: PENDING_LOCATOR.to_string(),
            content_hash,
            range: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_locator(mut self, locator: impl Into<String>) -> Self {
        self.content_locator = locator.into();
        self
    }

    pub fn is_pending(&self) -> bool {
        self.content_locator == PENDING_LOCATOR
    }

    /// First header value with this name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Replace the first header with this name, or append it.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }
}

/// Routing table entry: requests to `route` are served from `target`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    pub route: String,
    pub target: String,
}

impl Route {
    pub fn new(route: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            target: target.into(),
        }
    }
}

/// Display metadata, replaced as a whole block
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.link.is_none()
            && self.image_url.is_none()
            && self.description.is_none()
            && self.project_url.is_none()
            && self.creator.is_none()
    }
}

/// Desired or published state of a site
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SiteManifest {
    pub resources: Vec<Resource>,
    /// `None` and an empty list both mean "no routes"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<Route>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
}

impl SiteManifest {
    /// Manifest of a site that has never been published.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn resource(&self, path: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.path == path)
    }

    pub fn resource_mut(&mut self, path: &str) -> Option<&mut Resource> {
        self.resources.iter_mut().find(|r| r.path == path)
    }

    pub fn routes_or_empty(&self) -> &[Route] {
        self.routes.as_deref().unwrap_or(&[])
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().map(|r| r.path.as_str())
    }
}

/// Ensure a resource path starts with exactly one `/` and uses `/` separators.
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    format!("/{}", unified.trim_start_matches('/'))
}
