//! Site settings and local assets
//!
//! `SiteSettings` mirrors the `ws-resources.json` file that lives next to
//! the site's files. JSON objects in that file are order-significant
//! (header order, route order), so they deserialize into `OrderedMap`.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::site::{normalize_path, Metadata, Route};
use crate::domain::value_objects::{ObjectId, U256};

/// File name of the per-site settings document.
pub const SETTINGS_FILE_NAME: &str = "ws-resources.json";

/// String-keyed map that keeps document order and duplicate keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, V)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map with string keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((k, v)) = access.next_entry::<String, V>()? {
            entries.push((k, v));
        }
        Ok(OrderedMap(entries))
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

/// Site-level settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SiteSettings {
    /// Per-path headers; when absent every resource gets default headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<OrderedMap<OrderedMap<String>>>,

    /// Route pattern -> resource path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<OrderedMap<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,

    /// Object id of the already published site, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<ObjectId>,

    /// Gitignore-style patterns of files to leave out
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore: Vec<String>,
}

impl SiteSettings {
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Declared routes in document order.
    pub fn route_list(&self) -> Option<Vec<Route>> {
        self.routes.as_ref().map(|routes| {
            routes
                .iter()
                .map(|(route, target)| Route::new(route.clone(), target.clone()))
                .collect()
        })
    }

    /// Headers declared for `path`, if the path has an entry.
    pub fn headers_for(&self, path: &str) -> Option<Vec<(String, String)>> {
        let headers = self.headers.as_ref()?;
        headers
            .iter()
            .find(|(p, _)| normalize_path(p) == path)
            .map(|(_, h)| h.iter().cloned().collect())
    }
}

/// A local file about to become a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub path: String,
    pub bytes: Vec<u8>,
    /// Computed once here and reused for every later comparison
    pub hash: U256,
}

impl Asset {
    pub fn new(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        let hash = U256::sha256_of(&bytes);
        Self {
            path: normalize_path(&path.into()),
            bytes,
            hash,
        }
    }
}
