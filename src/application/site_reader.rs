//! Chain Site Reader
//!
//! Reconstructs the published `SiteManifest` of a site object from the
//! ledger: display metadata and name from the object itself, resources from
//! its dynamic fields, routes from the `routes` dynamic field.
//!
//! A read either returns the whole manifest or fails. A routing table that
//! cannot be fetched is never reported as "no routes".

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::entities::{ByteRange, Metadata, Resource, Route, SiteManifest};
use crate::domain::ports::{
    ChainReader, DynamicFieldName, ObjectData, ObjectErrorCode, ObjectOptions, ObjectResponse,
    RpcError,
};
use crate::domain::services::routes_codec::{decode_routes_field, ROUTES_FIELD_NAME};
use crate::domain::value_objects::{patch_id, ObjectId, PatchId, PATCH_INTERNAL_ID_HEADER, U256};

/// Type suffix of the dynamic-field names that key site resources.
pub const RESOURCE_PATH_TYPE_SUFFIX: &str = "::site::ResourcePath";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("site {0} was not found on chain")]
    NotFound(ObjectId),

    #[error("site {site_id} is in an unreadable state: {reason}")]
    CorruptedState { site_id: ObjectId, reason: String },

    #[error("read of site {site_id} was incomplete: {source}")]
    PartialRead {
        site_id: ObjectId,
        #[source]
        source: RpcError,
    },

    #[error(transparent)]
    Transport(#[from] RpcError),
}

/// Reads published site manifests
#[derive(Clone)]
pub struct ChainSiteReader {
    chain: Arc<dyn ChainReader>,
}

impl ChainSiteReader {
    pub fn new(chain: Arc<dyn ChainReader>) -> Self {
        Self { chain }
    }

    /// Fetch the manifest currently published under `site_id`.
    ///
    /// No id means no site yet, which reads as the empty manifest.
    pub async fn fetch_current(&self, site_id: Option<&ObjectId>) -> Result<SiteManifest, ReadError> {
        let Some(site_id) = site_id else {
            debug!("no site id, starting from an empty manifest");
            return Ok(SiteManifest::empty());
        };

        let response = self
            .chain
            .get_object(site_id, ObjectOptions::display_and_content())
            .await?;
        let site = expect_site_object(site_id, response)?;
        let site_name = site_name(&site);
        let metadata = metadata_from_display(site.display.as_ref());

        let resources = self.read_resources(site_id).await?;
        let routes = self.read_routes(site_id).await?;

        debug!(
            site = %site_id,
            resources = resources.len(),
            routes = routes.as_ref().map_or(0, Vec::len),
            "read published site"
        );

        Ok(SiteManifest {
            resources,
            routes,
            metadata,
            site_name,
        })
    }

    async fn read_resources(&self, site_id: &ObjectId) -> Result<Vec<Resource>, ReadError> {
        let mut resources = Vec::new();
        let mut cursor = None;

        loop {
            let page = self.chain.dynamic_fields(site_id, cursor.take()).await?;

            for field in &page.data {
                if !field.name.type_tag.ends_with(RESOURCE_PATH_TYPE_SUFFIX) {
                    continue;
                }
                let response = self
                    .chain
                    .get_object(&field.object_id, ObjectOptions::content())
                    .await?;
                let data = match (response.data, response.error) {
                    (Some(data), None) => data,
                    (_, error) => {
                        return Err(corrupted(
                            site_id,
                            format!(
                                "resource field {} could not be read ({:?})",
                                field.object_id, error
                            ),
                        ))
                    }
                };
                let resource = parse_resource_field(&data).map_err(|reason| {
                    corrupted(site_id, format!("resource field {}: {reason}", field.object_id))
                })?;
                resources.push(resource);
            }

            if !page.has_next_page {
                break;
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => {
                    return Err(corrupted(
                        site_id,
                        "dynamic field page reports more pages but no cursor".to_string(),
                    ))
                }
            }
        }

        Ok(resources)
    }

    async fn read_routes(&self, site_id: &ObjectId) -> Result<Option<Vec<Route>>, ReadError> {
        let name = DynamicFieldName::bytes(ROUTES_FIELD_NAME);
        let response = self
            .chain
            .dynamic_field_object(site_id, &name)
            .await
            .map_err(|source| partial(site_id, source))?;

        let field = match (response.data, response.error) {
            (_, Some(ObjectErrorCode::DynamicFieldNotFound)) | (None, None) => {
                debug!(site = %site_id, "site has no routing table");
                return Ok(None);
            }
            (_, Some(code)) => {
                return Err(corrupted(
                    site_id,
                    format!("routing table could not be read ({code:?})"),
                ))
            }
            (Some(data), None) => data,
        };

        let bcs = match field.bcs {
            Some(bytes) => bytes,
            None => self.fetch_routes_bcs(site_id, &field).await?,
        };

        decode_routes_field(&bcs)
            .map(Some)
            .map_err(|e| corrupted(site_id, format!("routing table: {e}")))
    }

    async fn fetch_routes_bcs(
        &self,
        site_id: &ObjectId,
        field: &ObjectData,
    ) -> Result<Vec<u8>, ReadError> {
        let field_id = field
            .object_id
            .ok_or_else(|| corrupted(site_id, "routing table has no object id".to_string()))?;
        let response = self
            .chain
            .get_object(&field_id, ObjectOptions::bcs())
            .await
            .map_err(|source| partial(site_id, source))?;
        response
            .data
            .and_then(|data| data.bcs)
            .ok_or_else(|| corrupted(site_id, "routing table has no object bytes".to_string()))
    }
}

fn corrupted(site_id: &ObjectId, reason: String) -> ReadError {
    ReadError::CorruptedState {
        site_id: *site_id,
        reason,
    }
}

fn partial(site_id: &ObjectId, source: RpcError) -> ReadError {
    warn!(site = %site_id, error = %source, "routing table fetch failed");
    ReadError::PartialRead {
        site_id: *site_id,
        source,
    }
}

fn expect_site_object(site_id: &ObjectId, response: ObjectResponse) -> Result<ObjectData, ReadError> {
    match (response.data, response.error) {
        (Some(data), None) => Ok(data),
        (_, Some(ObjectErrorCode::DisplayError)) => Err(corrupted(
            site_id,
            "display fields could not be rendered".to_string(),
        )),
        (_, Some(ObjectErrorCode::Other(code))) => {
            Err(corrupted(site_id, format!("unexpected object error {code}")))
        }
        (_, Some(_)) | (None, None) => Err(ReadError::NotFound(*site_id)),
    }
}

fn site_name(site: &ObjectData) -> Option<String> {
    site.content
        .as_ref()
        .and_then(|content| content.get("name"))
        .and_then(Value::as_str)
        .or_else(|| {
            site.display
                .as_ref()
                .and_then(|display| display.get("name"))
                .map(String::as_str)
        })
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Empty display strings read as absent fields; an all-absent block is no
/// metadata at all.
fn metadata_from_display(display: Option<&BTreeMap<String, String>>) -> Option<Metadata> {
    let display = display?;
    let field = |key: &str| {
        display
            .get(key)
            .filter(|value| !value.is_empty())
            .cloned()
    };
    let metadata = Metadata {
        link: field("link"),
        image_url: field("image_url"),
        description: field("description"),
        project_url: field("project_url"),
        creator: field("creator"),
    };
    (!metadata.is_empty()).then_some(metadata)
}

/// Move values render as `{"type": ..., "fields": {...}}` or as the bare
/// fields object depending on depth.
fn fields_of(value: &Value) -> &Value {
    value.get("fields").unwrap_or(value)
}

fn parse_resource_field(data: &ObjectData) -> Result<Resource, String> {
    let content = data.content.as_ref().ok_or("missing content")?;
    let value = content.get("value").map(fields_of).ok_or("missing value")?;

    let path = value
        .get("path")
        .and_then(Value::as_str)
        .ok_or("missing path")?;
    let blob_id = value
        .get("blob_id")
        .map(parse_u256)
        .ok_or("missing blob_id")??;
    let blob_hash = value
        .get("blob_hash")
        .map(parse_u256)
        .ok_or("missing blob_hash")??;
    let headers = value.get("headers").map(parse_headers).unwrap_or_default();
    let range = match value.get("range") {
        None | Some(Value::Null) => None,
        Some(range) => Some(parse_range(range)?),
    };

    let mut resource = Resource::new(path, blob_hash);
    resource.headers = headers;
    resource.range = range;
    resource.content_locator = match resource.header(PATCH_INTERNAL_ID_HEADER) {
        Some(internal_id) => PatchId::from_internal_id(blob_id.to_le_bytes(), internal_id)
            .map_err(|e| e.to_string())?
            .to_string(),
        None => patch_id::encode_blob_id(&blob_id),
    };
    Ok(resource)
}

fn parse_u256(value: &Value) -> Result<U256, String> {
    match value {
        Value::String(s) => U256::from_decimal(s).map_err(|e| e.to_string()),
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| format!("{n} is not an unsigned integer")),
        other => Err(format!("expected an integer, got {other}")),
    }
}

fn parse_u64(value: &Value) -> Result<Option<u64>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => s.parse().map(Some).map_err(|_| format!("bad integer {s:?}")),
        Value::Number(n) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| format!("{n} is not an unsigned integer")),
        other => Err(format!("expected an integer, got {other}")),
    }
}

/// `VecMap<String, String>`: `{"contents": [{"key": .., "value": ..}]}`,
/// each entry possibly wrapped in `fields`.
fn parse_headers(value: &Value) -> Vec<(String, String)> {
    fields_of(value)
        .get("contents")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .map(fields_of)
                .filter_map(|entry| {
                    let key = entry.get("key")?.as_str()?;
                    let value = entry.get("value")?.as_str()?;
                    Some((key.to_string(), value.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_range(value: &Value) -> Result<ByteRange, String> {
    let fields = fields_of(value);
    let bound = |key: &str| fields.get(key).map_or(Ok(None), parse_u64);
    Ok(ByteRange {
        start: bound("start")?,
        end: bound("end")?,
    })
}
