//! In-memory stand-in for the ledger and the blob network.
//!
//! Site transactions are interpreted call by call against a small object
//! store, so what one deployment writes is what the next one reads back.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use siteforge::application::deploy::{DeployClients, SITE_TYPE_SUFFIX};
use siteforge::domain::entities::{ByteRange, EncodedUpload, Metadata, Route};
use siteforge::domain::ports::{
    BlobError, BlobNetwork, CertifiedFile, ChainReader, DynamicFieldInfo, DynamicFieldName,
    DynamicFieldPage, LedgerClient, LedgerError, LookupError, ObjectChange,
    ObjectData, ObjectErrorCode, ObjectOptions, ObjectResponse, PatchLookup, QuiltPatch,
    RpcError, Signature, Signer, SignerError, TransactionEffects, TransactionPayload,
    TransactionResponse, UnsignedTransaction, UploadFile,
};
use siteforge::domain::services::routes_codec::encode_routes_field;
use siteforge::domain::services::{Argument, SiteCall, SiteTransaction};
use siteforge::domain::value_objects::{patch_id, Address, ObjectId, PatchId, U256};

pub const PACKAGE: ObjectId = ObjectId::new([0xaa; 32]);
pub const OWNER: Address = ObjectId::new([0x0e; 32]);

/// First quilt number handed out by `encode`
const FIRST_QUILT: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResource {
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub blob_id: U256,
    pub blob_hash: U256,
    pub range: Option<ByteRange>,
}

#[derive(Debug, Clone, Default)]
pub struct StoredSite {
    pub name: String,
    pub metadata: Option<Metadata>,
    pub owner: Option<Address>,
    pub resources: BTreeMap<String, StoredResource>,
    pub routes: Option<Vec<Route>>,
}

#[derive(Default)]
struct Store {
    sites: HashMap<ObjectId, StoredSite>,
    next_site: u8,
    /// quilt number -> uploaded paths
    quilts: HashMap<u64, Vec<String>>,
    next_quilt: u64,
    executed: Vec<String>,
    deleted_blobs: Vec<String>,
}

/// Ledger, signer, blob network and aggregator in one place.
#[derive(Default)]
pub struct InMemoryNetwork {
    store: Mutex<Store>,
    pub fail_pushes: AtomicUsize,
    pub fail_certifies: AtomicUsize,
    pub encodes: AtomicUsize,
    pub registers: AtomicUsize,
}

impl InMemoryNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn clients(self: &Arc<Self>) -> DeployClients {
        DeployClients {
            chain: self.clone(),
            ledger: self.clone(),
            signer: self.clone(),
            blobs: self.clone(),
            patches: self.clone(),
        }
    }

    pub fn site(&self, id: &ObjectId) -> Option<StoredSite> {
        self.store.lock().unwrap().sites.get(id).cloned()
    }

    pub fn executed(&self) -> Vec<String> {
        self.store.lock().unwrap().executed.clone()
    }

    pub fn deleted_blobs(&self) -> Vec<String> {
        self.store.lock().unwrap().deleted_blobs.clone()
    }

    fn field_id(site: &ObjectId, path: &str) -> ObjectId {
        let mut seed = site.as_bytes().to_vec();
        seed.extend_from_slice(path.as_bytes());
        ObjectId::new(U256::sha256_of(&seed).to_le_bytes())
    }

    fn find_field(&self, id: &ObjectId) -> Option<StoredResource> {
        let store = self.store.lock().unwrap();
        store.sites.iter().find_map(|(site_id, site)| {
            site.resources
                .values()
                .find(|r| Self::field_id(site_id, &r.path) == *id)
                .cloned()
        })
    }
}

fn take_failure(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

fn site_object(id: ObjectId, site: &StoredSite) -> ObjectData {
    let metadata = site.metadata.clone().unwrap_or_default();
    let display: BTreeMap<String, String> = [
        ("link", metadata.link),
        ("image_url", metadata.image_url),
        ("description", metadata.description),
        ("project_url", metadata.project_url),
        ("creator", metadata.creator),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.unwrap_or_default()))
    .collect();

    ObjectData {
        object_id: Some(id),
        object_type: Some(format!("{PACKAGE}{SITE_TYPE_SUFFIX}")),
        display: Some(display),
        content: Some(json!({ "id": {"id": id.to_string()}, "name": site.name })),
        bcs: None,
    }
}

fn resource_object(id: ObjectId, resource: &StoredResource) -> ObjectData {
    let headers: Vec<Value> = resource
        .headers
        .iter()
        .map(|(key, value)| json!({"fields": {"key": key, "value": value}}))
        .collect();
    let range = resource
        .range
        .map(|r| json!({"fields": {"start": r.start.map(|s| s.to_string()), "end": r.end.map(|e| e.to_string())}}))
        .unwrap_or(Value::Null);

    ObjectData {
        object_id: Some(id),
        object_type: Some(format!("{PACKAGE}::site::Resource")),
        display: None,
        content: Some(json!({
            "name": {"fields": {"path": resource.path}},
            "value": {"fields": {
                "path": resource.path,
                "headers": {"fields": {"contents": headers}},
                "blob_id": resource.blob_id.to_decimal(),
                "blob_hash": resource.blob_hash.to_decimal(),
                "range": range,
            }},
        })),
        bcs: None,
    }
}

#[async_trait]
impl ChainReader for InMemoryNetwork {
    async fn get_object(
        &self,
        id: &ObjectId,
        _options: ObjectOptions,
    ) -> Result<ObjectResponse, RpcError> {
        if let Some(site) = self.site(id) {
            return Ok(ObjectResponse::found(site_object(*id, &site)));
        }
        Ok(match self.find_field(id) {
            Some(resource) => ObjectResponse::found(resource_object(*id, &resource)),
            None => ObjectResponse::failed(ObjectErrorCode::NotExists),
        })
    }

    async fn dynamic_fields(
        &self,
        parent: &ObjectId,
        cursor: Option<String>,
    ) -> Result<DynamicFieldPage, RpcError> {
        // Two fields per page so larger sites exercise pagination.
        const PAGE: usize = 2;
        let site = self.site(parent).unwrap_or_default();
        let mut fields: Vec<DynamicFieldInfo> = site
            .resources
            .values()
            .map(|r| DynamicFieldInfo {
                name: DynamicFieldName {
                    type_tag: format!("{PACKAGE}::site::ResourcePath"),
                    value: json!({"path": r.path}),
                },
                object_id: Self::field_id(parent, &r.path),
                object_type: format!("0x2::dynamic_field::Field<{PACKAGE}::site::ResourcePath, {PACKAGE}::site::Resource>"),
            })
            .collect();
        if site.routes.is_some() {
            fields.push(DynamicFieldInfo {
                name: DynamicFieldName::bytes(b"routes"),
                object_id: ObjectId::new([0xee; 32]),
                object_type: "0x2::dynamic_field::Field<vector<u8>, Routes>".into(),
            });
        }

        let start: usize = cursor.map_or(0, |c| c.parse().unwrap());
        let data: Vec<_> = fields.iter().skip(start).take(PAGE).cloned().collect();
        let has_next_page = start + PAGE < fields.len();
        Ok(DynamicFieldPage {
            data,
            next_cursor: has_next_page.then(|| (start + PAGE).to_string()),
            has_next_page,
        })
    }

    async fn dynamic_field_object(
        &self,
        parent: &ObjectId,
        _name: &DynamicFieldName,
    ) -> Result<ObjectResponse, RpcError> {
        let routes = self.site(parent).and_then(|site| site.routes);
        Ok(match routes {
            Some(routes) => ObjectResponse::found(ObjectData {
                object_id: Some(ObjectId::new([0xee; 32])),
                bcs: Some(encode_routes_field([0xee; 32], &routes)),
                ..Default::default()
            }),
            None => ObjectResponse::failed(ObjectErrorCode::DynamicFieldNotFound),
        })
    }
}

/// Result of an earlier call inside one transaction
#[derive(Clone)]
enum Slot {
    Metadata(Metadata),
    Site(ObjectId),
    Range(ByteRange),
    Resource(StoredResource),
    Unit,
}

fn site_arg(arg: &Argument, slots: &[Slot]) -> ObjectId {
    match arg {
        Argument::Object(id) => *id,
        Argument::Result(i) => match &slots[*i] {
            Slot::Site(id) => *id,
            _ => panic!("argument {i} is not a site"),
        },
    }
}

fn apply(store: &mut Store, tx: &SiteTransaction) -> (Vec<ObjectChange>, Vec<ObjectChange>) {
    let mut slots: Vec<Slot> = Vec::new();
    let mut created = Vec::new();
    let mut touched: Vec<ObjectId> = Vec::new();

    for call in &tx.calls {
        let slot = match call {
            SiteCall::NewMetadata { metadata } => Slot::Metadata(metadata.clone()),
            SiteCall::NewSite { name, metadata } => {
                store.next_site += 1;
                let id = ObjectId::new([0x50 + store.next_site; 32]);
                let metadata = match metadata {
                    Argument::Result(i) => match &slots[*i] {
                        Slot::Metadata(m) => Some(m.clone()).filter(|m| !m.is_empty()),
                        _ => None,
                    },
                    Argument::Object(_) => None,
                };
                store.sites.insert(
                    id,
                    StoredSite {
                        name: name.clone(),
                        metadata,
                        ..Default::default()
                    },
                );
                created.push(id);
                Slot::Site(id)
            }
            SiteCall::UpdateMetadata { site, metadata } => {
                let id = site_arg(site, &slots);
                let metadata = match metadata {
                    Argument::Result(i) => match &slots[*i] {
                        Slot::Metadata(m) => Some(m.clone()).filter(|m| !m.is_empty()),
                        _ => None,
                    },
                    Argument::Object(_) => None,
                };
                store.sites.get_mut(&id).unwrap().metadata = metadata;
                touched.push(id);
                Slot::Unit
            }
            SiteCall::UpdateName { site, name } => {
                let id = site_arg(site, &slots);
                store.sites.get_mut(&id).unwrap().name = name.clone();
                touched.push(id);
                Slot::Unit
            }
            SiteCall::RemoveResourceIfExists { site, path } => {
                let id = site_arg(site, &slots);
                store.sites.get_mut(&id).unwrap().resources.remove(path);
                touched.push(id);
                Slot::Unit
            }
            SiteCall::NewRangeOption { start, end } => Slot::Range(ByteRange {
                start: *start,
                end: *end,
            }),
            SiteCall::NewResource {
                path,
                blob_id,
                blob_hash,
                range,
            } => Slot::Resource(StoredResource {
                path: path.clone(),
                headers: Vec::new(),
                blob_id: *blob_id,
                blob_hash: *blob_hash,
                range: range.and_then(|arg| match arg {
                    Argument::Result(i) => match &slots[i] {
                        Slot::Range(r) => Some(*r),
                        _ => None,
                    },
                    Argument::Object(_) => None,
                }),
            }),
            SiteCall::AddHeader {
                resource,
                name,
                value,
            } => {
                let Argument::Result(i) = resource else {
                    panic!("headers are added to fresh resources");
                };
                if let Slot::Resource(r) = &mut slots[*i] {
                    r.headers.push((name.clone(), value.clone()));
                }
                Slot::Unit
            }
            SiteCall::AddResource { site, resource } => {
                let id = site_arg(site, &slots);
                let Argument::Result(i) = resource else {
                    panic!("resources are added from fresh results");
                };
                let Slot::Resource(r) = slots[*i].clone() else {
                    panic!("argument {i} is not a resource");
                };
                store
                    .sites
                    .get_mut(&id)
                    .unwrap()
                    .resources
                    .insert(r.path.clone(), r);
                touched.push(id);
                Slot::Unit
            }
            SiteCall::RemoveAllRoutesIfExist { site } => {
                let id = site_arg(site, &slots);
                store.sites.get_mut(&id).unwrap().routes = None;
                touched.push(id);
                Slot::Unit
            }
            SiteCall::CreateRoutes { site } => {
                let id = site_arg(site, &slots);
                store.sites.get_mut(&id).unwrap().routes = Some(Vec::new());
                touched.push(id);
                Slot::Unit
            }
            SiteCall::InsertRoute {
                site,
                route,
                target,
            } => {
                let id = site_arg(site, &slots);
                store
                    .sites
                    .get_mut(&id)
                    .unwrap()
                    .routes
                    .get_or_insert_with(Vec::new)
                    .push(Route::new(route.clone(), target.clone()));
                touched.push(id);
                Slot::Unit
            }
            SiteCall::TransferObjects { objects, recipient } => {
                for object in objects {
                    let id = site_arg(object, &slots);
                    store.sites.get_mut(&id).unwrap().owner = Some(*recipient);
                }
                Slot::Unit
            }
        };
        slots.push(slot);
    }

    let change = |store: &Store, id: ObjectId| ObjectChange {
        object_id: id,
        object_type: format!("{PACKAGE}{SITE_TYPE_SUFFIX}"),
        owner: store.sites.get(&id).and_then(|s| s.owner).or(Some(OWNER)),
    };
    let created_changes = created.iter().map(|id| change(store, *id)).collect();
    touched.retain(|id| !created.contains(id));
    touched.dedup();
    let mutated_changes = touched.iter().map(|id| change(store, *id)).collect();
    (created_changes, mutated_changes)
}

#[async_trait]
impl LedgerClient for InMemoryNetwork {
    async fn execute(
        &self,
        tx: &UnsignedTransaction,
        _signature: &Signature,
    ) -> Result<TransactionResponse, LedgerError> {
        let mut store = self.store.lock().unwrap();
        store.executed.push(tx.description.clone());
        let digest = format!("digest-{}", store.executed.len());

        let mut effects = TransactionEffects::success();
        if let TransactionPayload::Site(site_tx) = &tx.payload {
            let (created, mutated) = apply(&mut store, site_tx);
            effects.created = created;
            effects.mutated = mutated;
        }
        Ok(TransactionResponse { digest, effects })
    }
}

#[async_trait]
impl Signer for InMemoryNetwork {
    async fn sign(&self, _tx: &UnsignedTransaction) -> Result<Signature, SignerError> {
        Ok(Signature(vec![0x5e]))
    }
}

fn quilt_number(handle: &str) -> u64 {
    handle
        .trim_start_matches("quilt-")
        .parse()
        .unwrap_or(FIRST_QUILT)
}

#[async_trait]
impl BlobNetwork for InMemoryNetwork {
    async fn encode(&self, files: &[UploadFile]) -> Result<EncodedUpload, BlobError> {
        self.encodes.fetch_add(1, Ordering::SeqCst);
        let mut store = self.store.lock().unwrap();
        let number = FIRST_QUILT + store.next_quilt;
        store.next_quilt += 1;
        let paths: Vec<String> = files.iter().map(|f| f.path.clone()).collect();
        store.quilts.insert(number, paths.clone());
        Ok(EncodedUpload {
            handle: format!("quilt-{number}"),
            paths,
            encoded_size: files.iter().map(|f| f.bytes.len() as u64).sum(),
        })
    }

    async fn register(
        &self,
        upload: &EncodedUpload,
        epochs: siteforge::Epochs,
        deletable: bool,
    ) -> Result<UnsignedTransaction, BlobError> {
        self.registers.fetch_add(1, Ordering::SeqCst);
        Ok(UnsignedTransaction::prebuilt(
            format!(
                "register {} for {epochs} epochs (deletable: {deletable})",
                upload.handle
            ),
            vec![0],
        ))
    }

    async fn push(&self, _upload: &EncodedUpload) -> Result<(), BlobError> {
        if take_failure(&self.fail_pushes) {
            return Err(BlobError::Upload("storage node unreachable".into()));
        }
        Ok(())
    }

    async fn certify(&self, upload: &EncodedUpload) -> Result<UnsignedTransaction, BlobError> {
        if take_failure(&self.fail_certifies) {
            return Err(BlobError::Network("not enough confirmations".into()));
        }
        Ok(UnsignedTransaction::prebuilt(
            format!("certify {}", upload.handle),
            vec![1],
        ))
    }

    async fn certified_files(
        &self,
        upload: &EncodedUpload,
    ) -> Result<Vec<CertifiedFile>, BlobError> {
        let blob_id = patch_id::encode_blob_id(&U256::from(quilt_number(&upload.handle)));
        Ok(upload
            .paths
            .iter()
            .map(|path| CertifiedFile {
                path: path.clone(),
                blob_id: blob_id.clone(),
                blob_object: None,
            })
            .collect())
    }

    async fn delete(&self, blob_id: &str) -> Result<UnsignedTransaction, BlobError> {
        self.store
            .lock()
            .unwrap()
            .deleted_blobs
            .push(blob_id.to_string());
        Ok(UnsignedTransaction::prebuilt(
            format!("delete blob {blob_id}"),
            vec![2],
        ))
    }
}

/// Patch id of the `index`-th file of quilt `number`
pub fn patch_of(number: u64, index: u16) -> PatchId {
    let start = index.to_le_bytes();
    let end = (index + 1).to_le_bytes();
    PatchId::new(
        U256::from(number).to_le_bytes(),
        [1, start[0], start[1], end[0], end[1]],
    )
}

#[async_trait]
impl PatchLookup for InMemoryNetwork {
    async fn patches(&self, blob_id: &str) -> Result<Vec<QuiltPatch>, LookupError> {
        let store = self.store.lock().unwrap();
        let quilt = store.quilts.iter().find(|(number, _)| {
            patch_id::encode_blob_id(&U256::from(**number)) == blob_id
        });
        let Some((number, paths)) = quilt else {
            return Err(LookupError::Status {
                blob_id: blob_id.to_string(),
                status: 404,
            });
        };
        Ok(paths
            .iter()
            .enumerate()
            .map(|(i, path)| QuiltPatch {
                identifier: path.trim_start_matches('/').to_string(),
                patch_id: patch_of(*number, i as u16).to_string(),
                tags: Default::default(),
            })
            .collect())
    }
}
