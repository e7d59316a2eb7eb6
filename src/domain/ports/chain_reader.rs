//! Chain Reader Port
//!
//! Read-only access to ledger objects and their dynamic fields. The shapes
//! here follow the ledger's JSON-RPC projections closely enough that an
//! adapter is a thin translation layer.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::value_objects::ObjectId;

/// Transport-level failure talking to the ledger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("unexpected rpc response: {0}")]
    Decode(String),
}

/// Which projections of an object to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectOptions {
    pub show_type: bool,
    pub show_display: bool,
    pub show_content: bool,
    pub show_bcs: bool,
}

impl ObjectOptions {
    pub fn display_and_content() -> Self {
        Self {
            show_type: true,
            show_display: true,
            show_content: true,
            show_bcs: false,
        }
    }

    pub fn content() -> Self {
        Self {
            show_type: true,
            show_content: true,
            ..Self::default()
        }
    }

    pub fn bcs() -> Self {
        Self {
            show_type: true,
            show_bcs: true,
            ..Self::default()
        }
    }
}

/// Object-level error codes reported instead of object data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectErrorCode {
    Deleted,
    NotExists,
    DisplayError,
    DynamicFieldNotFound,
    Other(String),
}

impl ObjectErrorCode {
    pub fn from_code(code: &str) -> Self {
        match code {
            "deleted" => ObjectErrorCode::Deleted,
            "notExists" => ObjectErrorCode::NotExists,
            "displayError" => ObjectErrorCode::DisplayError,
            "dynamicFieldNotFound" => ObjectErrorCode::DynamicFieldNotFound,
            other => ObjectErrorCode::Other(other.to_string()),
        }
    }
}

/// Object projections as returned by the ledger
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectData {
    pub object_id: Option<ObjectId>,
    pub object_type: Option<String>,
    /// Rendered display fields
    pub display: Option<BTreeMap<String, String>>,
    /// Move struct fields as JSON (`{"field": value, ...}`)
    pub content: Option<serde_json::Value>,
    /// Raw canonical bytes of the object
    pub bcs: Option<Vec<u8>>,
}

/// Object fetch result: data, an error code, or both absent
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectResponse {
    pub data: Option<ObjectData>,
    pub error: Option<ObjectErrorCode>,
}

impl ObjectResponse {
    pub fn found(data: ObjectData) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(code: ObjectErrorCode) -> Self {
        Self {
            data: None,
            error: Some(code),
        }
    }
}

/// Typed name of a dynamic field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicFieldName {
    #[serde(rename = "type")]
    pub type_tag: String,
    pub value: serde_json::Value,
}

impl DynamicFieldName {
    /// A `vector<u8>` name.
    pub fn bytes(name: &[u8]) -> Self {
        Self {
            type_tag: "vector<u8>".to_string(),
            value: serde_json::Value::Array(name.iter().map(|b| (*b).into()).collect()),
        }
    }
}

/// One entry of an object's child index
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicFieldInfo {
    pub name: DynamicFieldName,
    pub object_id: ObjectId,
    pub object_type: String,
}

/// One page of dynamic fields
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DynamicFieldPage {
    pub data: Vec<DynamicFieldInfo>,
    pub next_cursor: Option<String>,
    pub has_next_page: bool,
}

/// Read access to ledger state
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Fetch one object with the requested projections.
    async fn get_object(
        &self,
        id: &ObjectId,
        options: ObjectOptions,
    ) -> Result<ObjectResponse, RpcError>;

    /// Fetch one page of an object's dynamic fields.
    async fn dynamic_fields(
        &self,
        parent: &ObjectId,
        cursor: Option<String>,
    ) -> Result<DynamicFieldPage, RpcError>;

    /// Fetch a dynamic field object by name.
    async fn dynamic_field_object(
        &self,
        parent: &ObjectId,
        name: &DynamicFieldName,
    ) -> Result<ObjectResponse, RpcError>;
}
