//! JSON-RPC Chain Reader
//!
//! `ChainReader` over the ledger's public JSON-RPC API:
//! `sui_getObject`, `suix_getDynamicFields` and `suix_getDynamicFieldObject`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::NetworkConfig;
use crate::domain::ports::{
    ChainReader, DynamicFieldInfo, DynamicFieldName, DynamicFieldPage, ObjectData,
    ObjectErrorCode, ObjectOptions, ObjectResponse, RpcError,
};
use crate::domain::value_objects::ObjectId;

/// Page size requested from `suix_getDynamicFields`.
const DYNAMIC_FIELD_PAGE_LIMIT: u32 = 50;

pub struct SuiRpcChainReader {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl SuiRpcChainReader {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn from_config(config: &NetworkConfig) -> Self {
        Self::new(config.rpc_url.clone())
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "rpc call");

        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| self.transport(e))?;
        let envelope: Envelope<T> = response.json().await.map_err(|e| self.transport(e))?;

        match (envelope.result, envelope.error) {
            (_, Some(error)) => Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Err(RpcError::Decode(format!(
                "{method} returned neither result nor error"
            ))),
        }
    }

    fn transport(&self, error: reqwest::Error) -> RpcError {
        RpcError::Transport {
            url: self.url.clone(),
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl ChainReader for SuiRpcChainReader {
    async fn get_object(
        &self,
        id: &ObjectId,
        options: ObjectOptions,
    ) -> Result<ObjectResponse, RpcError> {
        let wire: WireObjectResponse = self
            .call("sui_getObject", json!([id.to_string(), options_json(options)]))
            .await?;
        wire.into_response()
    }

    async fn dynamic_fields(
        &self,
        parent: &ObjectId,
        cursor: Option<String>,
    ) -> Result<DynamicFieldPage, RpcError> {
        let wire: WireFieldPage = self
            .call(
                "suix_getDynamicFields",
                json!([parent.to_string(), cursor, DYNAMIC_FIELD_PAGE_LIMIT]),
            )
            .await?;
        wire.into_page()
    }

    async fn dynamic_field_object(
        &self,
        parent: &ObjectId,
        name: &DynamicFieldName,
    ) -> Result<ObjectResponse, RpcError> {
        let wire: WireObjectResponse = self
            .call("suix_getDynamicFieldObject", json!([parent.to_string(), name]))
            .await?;
        wire.into_response()
    }
}

fn options_json(options: ObjectOptions) -> Value {
    json!({
        "showType": options.show_type,
        "showDisplay": options.show_display,
        "showContent": options.show_content,
        "showBcs": options.show_bcs,
    })
}

fn parse_id(raw: &str) -> Result<ObjectId, RpcError> {
    ObjectId::parse(raw).map_err(|e| RpcError::Decode(e.to_string()))
}

#[derive(Deserialize)]
struct Envelope<T> {
    result: Option<T>,
    error: Option<EnvelopeError>,
}

#[derive(Deserialize)]
struct EnvelopeError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct WireObjectResponse {
    data: Option<WireObjectData>,
    error: Option<WireObjectError>,
}

#[derive(Deserialize)]
struct WireObjectError {
    code: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireObjectData {
    object_id: String,
    #[serde(rename = "type")]
    object_type: Option<String>,
    display: Option<WireDisplay>,
    content: Option<Value>,
    bcs: Option<WireBcs>,
}

#[derive(Deserialize)]
struct WireDisplay {
    data: Option<BTreeMap<String, Value>>,
    error: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBcs {
    bcs_bytes: Option<String>,
}

impl WireObjectResponse {
    fn into_response(self) -> Result<ObjectResponse, RpcError> {
        if let Some(error) = self.error {
            return Ok(ObjectResponse::failed(ObjectErrorCode::from_code(&error.code)));
        }
        let Some(data) = self.data else {
            return Ok(ObjectResponse::default());
        };
        if data
            .display
            .as_ref()
            .is_some_and(|display| display.error.as_ref().is_some_and(|e| !e.is_null()))
        {
            return Ok(ObjectResponse::failed(ObjectErrorCode::DisplayError));
        }

        let display = data.display.and_then(|d| d.data).map(|fields| {
            fields
                .into_iter()
                .map(|(key, value)| {
                    let value = match value {
                        Value::String(s) => s,
                        Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    (key, value)
                })
                .collect()
        });
        let content = data
            .content
            .map(|content| content.get("fields").cloned().unwrap_or(content));
        let bcs = data
            .bcs
            .and_then(|bcs| bcs.bcs_bytes)
            .map(|encoded| {
                STANDARD
                    .decode(encoded)
                    .map_err(|e| RpcError::Decode(format!("bcs bytes: {e}")))
            })
            .transpose()?;

        Ok(ObjectResponse::found(ObjectData {
            object_id: Some(parse_id(&data.object_id)?),
            object_type: data.object_type,
            display,
            content,
            bcs,
        }))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFieldPage {
    data: Vec<WireFieldInfo>,
    next_cursor: Option<String>,
    has_next_page: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFieldInfo {
    name: DynamicFieldName,
    object_id: String,
    object_type: String,
}

impl WireFieldPage {
    fn into_page(self) -> Result<DynamicFieldPage, RpcError> {
        let data = self
            .data
            .into_iter()
            .map(|field| {
                Ok(DynamicFieldInfo {
                    name: field.name,
                    object_id: parse_id(&field.object_id)?,
                    object_type: field.object_type,
                })
            })
            .collect::<Result<_, RpcError>>()?;
        Ok(DynamicFieldPage {
            data,
            next_cursor: self.next_cursor,
            has_next_page: self.has_next_page,
        })
    }
}
