//! Operation building service
//!
//! Translates a `SiteManifestDiff` into the ordered list of site-contract
//! calls for one ledger transaction. Pure: calls are only appended to a
//! `SiteTransaction`; nothing is submitted here.
//!
//! Every call is safe to re-issue: removals are "if exists", and updates
//! only appear for dimensions the diff marked as changed.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::domain::entities::{
    ByteRange, FieldUpdate, Metadata, Resource, ResourceOp, SiteManifestDiff,
};
use crate::domain::value_objects::{patch_id, Address, ObjectId, PatchId, U256};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("cannot create a new site without {}", .missing.join(" and "))]
    InvalidCreation { missing: Vec<&'static str> },

    #[error("resource '{path}' has no usable content locator ('{locator}')")]
    UnresolvedLocator { path: String, locator: String },
}

/// Input of a call: a ledger object, or the result of an earlier call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Argument {
    Object(ObjectId),
    Result(usize),
}

/// One site-contract call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum SiteCall {
    NewMetadata {
        metadata: Metadata,
    },
    NewSite {
        name: String,
        metadata: Argument,
    },
    UpdateMetadata {
        site: Argument,
        metadata: Argument,
    },
    UpdateName {
        site: Argument,
        name: String,
    },
    RemoveResourceIfExists {
        site: Argument,
        path: String,
    },
    NewRangeOption {
        start: Option<u64>,
        end: Option<u64>,
    },
    NewResource {
        path: String,
        blob_id: U256,
        blob_hash: U256,
        range: Option<Argument>,
    },
    AddHeader {
        resource: Argument,
        name: String,
        value: String,
    },
    AddResource {
        site: Argument,
        resource: Argument,
    },
    RemoveAllRoutesIfExist {
        site: Argument,
    },
    CreateRoutes {
        site: Argument,
    },
    InsertRoute {
        site: Argument,
        route: String,
        target: String,
    },
    TransferObjects {
        objects: Vec<Argument>,
        recipient: Address,
    },
}

impl SiteCall {
    /// `module::function` of the contract entry point.
    pub fn target(&self) -> &'static str {
        match self {
            SiteCall::NewMetadata { .. } => "metadata::new_metadata",
            SiteCall::NewSite { .. } => "site::new_site",
            SiteCall::UpdateMetadata { .. } => "site::update_metadata",
            SiteCall::UpdateName { .. } => "site::update_name",
            SiteCall::RemoveResourceIfExists { .. } => "site::remove_resource_if_exists",
            SiteCall::NewRangeOption { .. } => "site::new_range_option",
            SiteCall::NewResource { .. } => "site::new_resource",
            SiteCall::AddHeader { .. } => "site::add_header",
            SiteCall::AddResource { .. } => "site::add_resource",
            SiteCall::RemoveAllRoutesIfExist { .. } => "site::remove_all_routes_if_exist",
            SiteCall::CreateRoutes { .. } => "site::create_routes",
            SiteCall::InsertRoute { .. } => "site::insert_route",
            SiteCall::TransferObjects { .. } => "transfer_objects",
        }
    }
}

impl fmt::Display for SiteCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteCall::RemoveResourceIfExists { path, .. }
            | SiteCall::NewResource { path, .. } => write!(f, "{} {}", self.target(), path),
            SiteCall::AddHeader { name, value, .. } => {
                write!(f, "{} {}: {}", self.target(), name, value)
            }
            SiteCall::InsertRoute { route, target, .. } => {
                write!(f, "{} {} -> {}", self.target(), route, target)
            }
            SiteCall::UpdateName { name, .. } | SiteCall::NewSite { name, .. } => {
                write!(f, "{} \"{}\"", self.target(), name)
            }
            SiteCall::TransferObjects { recipient, .. } => {
                write!(f, "{} to {}", self.target(), recipient)
            }
            _ => f.write_str(self.target()),
        }
    }
}

/// Ordered calls against one contract package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteTransaction {
    pub package: ObjectId,
    pub calls: Vec<SiteCall>,
}

impl SiteTransaction {
    pub fn new(package: ObjectId) -> Self {
        Self {
            package,
            calls: Vec::new(),
        }
    }

    /// Append a call and return a handle to its result.
    pub fn push(&mut self, call: SiteCall) -> Argument {
        self.calls.push(call);
        Argument::Result(self.calls.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn targets(&self) -> Vec<&'static str> {
        self.calls.iter().map(SiteCall::target).collect()
    }
}

/// Builds site transactions from diffs
#[derive(Debug, Clone, Copy)]
pub struct OperationBuilder {
    package: ObjectId,
    allow_pending: bool,
}

impl OperationBuilder {
    pub fn new(package: ObjectId) -> Self {
        Self {
            package,
            allow_pending: false,
        }
    }

    /// Plan with not-yet-uploaded content, recording a zero blob id for it.
    /// Only useful for previews; such a transaction must never be submitted.
    pub fn allow_pending(mut self, allow: bool) -> Self {
        self.allow_pending = allow;
        self
    }

    /// Build the calls that move the published site to the diff's target.
    ///
    /// With no `site_id` this creates a site, which requires both metadata
    /// and name to be updates, and ends by transferring it to `owner`.
    pub fn build(
        &self,
        site_id: Option<ObjectId>,
        diff: &SiteManifestDiff,
        owner: Address,
    ) -> Result<SiteTransaction, BuildError> {
        let mut tx = SiteTransaction::new(self.package);

        let site = match site_id {
            Some(id) => {
                let site = Argument::Object(id);
                if let FieldUpdate::Update(metadata) = &diff.metadata {
                    let metadata = tx.push(SiteCall::NewMetadata {
                        metadata: metadata.clone(),
                    });
                    tx.push(SiteCall::UpdateMetadata { site, metadata });
                }
                if let FieldUpdate::Update(name) = &diff.site_name {
                    tx.push(SiteCall::UpdateName {
                        site,
                        name: name.clone(),
                    });
                }
                site
            }
            None => {
                let (metadata, name) = match (&diff.metadata, &diff.site_name) {
                    (FieldUpdate::Update(metadata), FieldUpdate::Update(name)) => (metadata, name),
                    (metadata, name) => {
                        let mut missing = Vec::new();
                        if !metadata.is_update() {
                            missing.push("metadata");
                        }
                        if !name.is_update() {
                            missing.push("a name");
                        }
                        return Err(BuildError::InvalidCreation { missing });
                    }
                };
                let metadata = tx.push(SiteCall::NewMetadata {
                    metadata: metadata.clone(),
                });
                tx.push(SiteCall::NewSite {
                    name: name.clone(),
                    metadata,
                })
            }
        };

        for op in &diff.resources {
            match op {
                ResourceOp::Deleted(resource) => {
                    tx.push(SiteCall::RemoveResourceIfExists {
                        site,
                        path: resource.path.clone(),
                    });
                }
                ResourceOp::Created(resource) => {
                    let blob_id = if self.allow_pending && resource.is_pending() {
                        U256::ZERO
                    } else {
                        blob_id_of(resource)?
                    };
                    add_resource(&mut tx, site, resource, blob_id);
                }
                ResourceOp::Unchanged(_) => {}
            }
        }

        if let FieldUpdate::Update(routes) = &diff.routes {
            tx.push(SiteCall::RemoveAllRoutesIfExist { site });
            if !routes.is_empty() {
                tx.push(SiteCall::CreateRoutes { site });
                for route in routes {
                    tx.push(SiteCall::InsertRoute {
                        site,
                        route: route.route.clone(),
                        target: route.target.clone(),
                    });
                }
            }
        }

        if site_id.is_none() {
            tx.push(SiteCall::TransferObjects {
                objects: vec![site],
                recipient: owner,
            });
        }

        Ok(tx)
    }
}

fn add_resource(
    tx: &mut SiteTransaction,
    site: Argument,
    resource: &Resource,
    blob_id: U256,
) {
    let range = resource
        .range
        .map(|ByteRange { start, end }| tx.push(SiteCall::NewRangeOption { start, end }));

    let handle = tx.push(SiteCall::NewResource {
        path: resource.path.clone(),
        blob_id,
        blob_hash: resource.content_hash,
        range,
    });
    for (name, value) in &resource.headers {
        tx.push(SiteCall::AddHeader {
            resource: handle,
            name: name.clone(),
            value: value.clone(),
        });
    }
    tx.push(SiteCall::AddResource {
        site,
        resource: handle,
    });
}

/// Blob id the contract records for a resource: the bundle id of a patch
/// identifier, or a plain blob id.
fn blob_id_of(resource: &Resource) -> Result<U256, BuildError> {
    PatchId::parse(&resource.content_locator)
        .map(|id| id.blob_id_u256())
        .or_else(|_| patch_id::decode_blob_id(&resource.content_locator))
        .map_err(|_| BuildError::UnresolvedLocator {
            path: resource.path.clone(),
            locator: resource.content_locator.clone(),
        })
}
