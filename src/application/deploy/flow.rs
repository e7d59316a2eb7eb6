//! Deployment Flow
//!
//! Drives one deployment attempt through its phases:
//!
//! ```text
//! Idle -> Preparing -> Prepared -> Uploading -> Uploaded
//!      -> Certifying -> Certified -> Deploying -> Deployed
//! ```
//!
//! Each phase is a separate call so the caller decides when to move on and
//! when to retry. A failed phase falls back to the stable phase it started
//! from; confirmed transactions are never rolled back.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError};

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::options::DeployRequest;
use super::result::{FlowError, PhaseError, PrepareOutcome, WriteOutcome};
use crate::application::site_reader::ChainSiteReader;
use crate::domain::entities::{
    normalize_path, CertifiedBlob, DeployPhase, DeploymentState, EncodedUpload, SiteManifestDiff,
    TransactionRecord,
};
use crate::domain::ports::{
    BlobNetwork, ChainReader, ExecutionStatus, FlowEvent, FlowEventSink, LedgerClient,
    PatchLookup, PhaseStatus, Signer, TransactionResponse, UnsignedTransaction, UploadFile,
};
use crate::domain::services::{ManifestBuilder, ManifestDiffer, OperationBuilder};
use crate::domain::value_objects::{patch_id, Epochs, ObjectId, PatchId, PATCH_INTERNAL_ID_HEADER};

/// Type suffix of site objects in transaction effects.
pub const SITE_TYPE_SUFFIX: &str = "::site::Site";

/// External capabilities a deployment needs
#[derive(Clone)]
pub struct DeployClients {
    pub chain: Arc<dyn ChainReader>,
    pub ledger: Arc<dyn LedgerClient>,
    pub signer: Arc<dyn Signer>,
    pub blobs: Arc<dyn BlobNetwork>,
    pub patches: Arc<dyn PatchLookup>,
}

/// State machine for one deployment attempt
pub struct DeploymentFlow {
    clients: DeployClients,
    reader: ChainSiteReader,
    package: ObjectId,
    request: DeployRequest,
    state: Mutex<DeploymentState>,
    /// Copy of `state` as of the last transition, for observers
    observed: std::sync::Mutex<DeploymentState>,
    sinks: Vec<Arc<dyn FlowEventSink>>,
}

impl DeploymentFlow {
    /// `package` is the site contract package the write phase calls into.
    pub fn new(clients: DeployClients, package: ObjectId, request: DeployRequest) -> Self {
        let reader = ChainSiteReader::new(clients.chain.clone());
        Self {
            clients,
            reader,
            package,
            request,
            state: Mutex::new(DeploymentState::new()),
            observed: std::sync::Mutex::new(DeploymentState::new()),
            sinks: Vec::new(),
        }
    }

    /// Add an observer for progress and transaction events.
    pub fn with_event_sink(mut self, sink: Arc<dyn FlowEventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Current phase. Never waits for, or blocks, a phase in flight.
    pub fn phase(&self) -> DeployPhase {
        self.observed().phase
    }

    /// Every transaction submitted so far, in submission order.
    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.observed().transactions.clone()
    }

    /// State as of the last phase transition or submitted transaction.
    pub fn snapshot(&self) -> DeploymentState {
        self.observed().clone()
    }

    fn observed(&self) -> std::sync::MutexGuard<'_, DeploymentState> {
        self.observed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &DeploymentState) {
        *self.observed() = state.clone();
    }

    /// Build the desired manifest, read the published one and diff them.
    ///
    /// When nothing changed the flow stays `Idle` and reports `UpToDate`.
    /// Otherwise the bodies of created resources are encoded for upload.
    pub async fn prepare(&self) -> Result<PrepareOutcome, FlowError> {
        let mut state = self.lock()?;
        self.begin(&mut state, "prepare", DeployPhase::Idle, DeployPhase::Preparing)?;

        match self.run_prepare(&mut state).await {
            Ok(outcome) => Ok(outcome),
            Err(source) => {
                state.reset();
                Err(self.fail(&mut state, DeployPhase::Preparing, DeployPhase::Idle, source))
            }
        }
    }

    /// Register the encoded content for `epochs` and push it to storage.
    ///
    /// `permanent` content cannot be deleted later. A retry after the
    /// register transaction landed only pushes.
    pub async fn upload(&self, epochs: Epochs, permanent: bool) -> Result<(), FlowError> {
        let mut state = self.lock()?;
        self.begin(&mut state, "upload", DeployPhase::Prepared, DeployPhase::Uploading)?;

        match self.run_upload(&mut state, epochs, permanent).await {
            Ok(()) => {
                self.complete(&mut state, DeployPhase::Uploaded, "content uploaded");
                Ok(())
            }
            Err(source) => Err(self.fail(
                &mut state,
                DeployPhase::Uploading,
                DeployPhase::Prepared,
                source,
            )),
        }
    }

    /// `upload` with the storage terms carried by the request.
    pub async fn upload_requested(&self) -> Result<(), FlowError> {
        self.upload(self.request.epochs, self.request.permanent).await
    }

    /// Certify the upload and write patch locators back into the manifest.
    pub async fn certify(&self) -> Result<(), FlowError> {
        let mut state = self.lock()?;
        self.begin(&mut state, "certify", DeployPhase::Uploaded, DeployPhase::Certifying)?;

        match self.run_certify(&mut state).await {
            Ok(()) => {
                self.complete(&mut state, DeployPhase::Certified, "content certified");
                Ok(())
            }
            Err(source) => Err(self.fail(
                &mut state,
                DeployPhase::Certifying,
                DeployPhase::Uploaded,
                source,
            )),
        }
    }

    /// Submit the site transaction and record the site id.
    pub async fn write_site(&self) -> Result<WriteOutcome, FlowError> {
        let mut state = self.lock()?;
        self.begin(&mut state, "write the site", DeployPhase::Certified, DeployPhase::Deploying)?;

        match self.run_write(&mut state).await {
            Ok(outcome) => {
                let message = format!("site {} deployed", outcome.site_id);
                self.complete(&mut state, DeployPhase::Deployed, message);
                Ok(outcome)
            }
            Err(source) => Err(self.fail(
                &mut state,
                DeployPhase::Deploying,
                DeployPhase::Certified,
                source,
            )),
        }
    }

    /// Delete the blobs of resources the diff removed, one transaction each.
    ///
    /// Allowed once content is certified. A blob that resources staying on
    /// the site still use is kept, and each blob is deleted at most once.
    /// Old versions of replaced resources stop pinning their blob once the
    /// site is deployed, so cleanup can be called again after `write_site`.
    /// Paths already cleaned are skipped on a retry. Returns the
    /// transactions submitted by this call.
    pub async fn cleanup(&self) -> Result<Vec<TransactionRecord>, FlowError> {
        let mut state = self.lock()?;
        if state.phase < DeployPhase::Certified {
            return Err(FlowError::InvalidPhase {
                operation: "clean up",
                phase: state.phase,
            });
        }

        let deleted: Vec<_> = state
            .diff
            .as_ref()
            .map(|diff| diff.deleted().cloned().collect())
            .unwrap_or_default();
        let live = live_blob_ids(&state);
        let mut removed: HashSet<String> = deleted
            .iter()
            .filter(|r| state.cleaned_paths.contains(&r.path))
            .filter_map(|r| blob_id_of_locator(&r.content_locator).ok())
            .collect();

        let mut submitted = Vec::new();
        for resource in deleted {
            if state.cleaned_paths.contains(&resource.path) {
                continue;
            }
            let blob_id = match blob_id_of_locator(&resource.content_locator) {
                Ok(blob_id) => blob_id,
                Err(source) => {
                    self.publish(&state);
                    return Err(FlowError::CleanupFailed {
                        path: resource.path,
                        source,
                    });
                }
            };
            if removed.contains(&blob_id) {
                debug!(path = %resource.path, blob_id = %blob_id, "blob already deleted");
                state.cleaned_paths.push(resource.path);
                continue;
            }
            // not recorded as cleaned: a later cleanup may find the blob unused
            if live.contains(&blob_id) {
                warn!(
                    path = %resource.path,
                    blob_id = %blob_id,
                    "blob is shared with resources that stay, keeping it"
                );
                continue;
            }
            match self.delete_blob(&mut state, &blob_id).await {
                Ok(record) => {
                    removed.insert(blob_id);
                    state.cleaned_paths.push(resource.path.clone());
                    submitted.push(record);
                }
                Err(source) => {
                    warn!(path = %resource.path, error = %source, "cleanup failed");
                    self.publish(&state);
                    return Err(FlowError::CleanupFailed {
                        path: resource.path,
                        source,
                    });
                }
            }
        }
        self.publish(&state);

        info!(deleted = submitted.len(), "cleanup finished");
        Ok(submitted)
    }

    async fn delete_blob(
        &self,
        state: &mut DeploymentState,
        blob_id: &str,
    ) -> Result<TransactionRecord, PhaseError> {
        let tx = self.clients.blobs.delete(blob_id).await?;
        let (record, _) = self.submit(state, tx).await?;
        Ok(record)
    }

    fn lock(&self) -> Result<MutexGuard<'_, DeploymentState>, FlowError> {
        self.state
            .try_lock()
            .map_err(|_| FlowError::ConcurrentOperation)
    }

    /// Enter `running` from `from`, or resume a `running` phase that was
    /// abandoned mid-way.
    fn begin(
        &self,
        state: &mut DeploymentState,
        operation: &'static str,
        from: DeployPhase,
        running: DeployPhase,
    ) -> Result<(), FlowError> {
        if state.phase != from && state.phase != running {
            return Err(FlowError::InvalidPhase {
                operation,
                phase: state.phase,
            });
        }
        state.phase = running;
        self.publish(state);
        debug!(phase = %running, "phase started");
        self.emit(FlowEvent::progress(running, PhaseStatus::Started, operation));
        Ok(())
    }

    fn complete(&self, state: &mut DeploymentState, phase: DeployPhase, message: impl Into<String>) {
        let message = message.into();
        state.phase = phase;
        self.publish(state);
        info!(phase = %phase, "{}", message);
        self.emit(FlowEvent::progress(phase, PhaseStatus::Completed, message));
    }

    fn fail(
        &self,
        state: &mut DeploymentState,
        phase: DeployPhase,
        fallback: DeployPhase,
        source: PhaseError,
    ) -> FlowError {
        state.phase = fallback;
        self.publish(state);
        warn!(phase = %phase, fallback = %fallback, error = %source, "phase failed");
        self.emit(FlowEvent::progress(
            phase,
            PhaseStatus::Failed {
                error: source.to_string(),
            },
            format!("{phase} failed, back to {fallback}"),
        ));
        FlowError::PhaseFailed { phase, source }
    }

    fn emit(&self, event: FlowEvent) {
        for sink in &self.sinks {
            if event.is_detail() && !sink.wants_detailed_events() {
                continue;
            }
            sink.on_event(event.clone());
        }
    }

    /// Sign, execute and record one transaction. A transaction that executed
    /// but failed on chain is recorded before the error is returned.
    async fn submit(
        &self,
        state: &mut DeploymentState,
        tx: UnsignedTransaction,
    ) -> Result<(TransactionRecord, TransactionResponse), PhaseError> {
        debug!(description = %tx.description, "signing transaction");
        let signature = self.clients.signer.sign(&tx).await?;
        let response = self.clients.ledger.execute(&tx, &signature).await?;

        let record = TransactionRecord::new(response.digest.clone(), tx.description.clone());
        state.record(record.clone());
        self.publish(state);
        self.emit(FlowEvent::TransactionRecorded(record.clone()));

        if let ExecutionStatus::Failure { error } = &response.effects.status {
            return Err(PhaseError::TransactionFailed {
                digest: response.digest.clone(),
                error: error.clone(),
            });
        }
        info!(digest = %response.digest, description = %tx.description, "transaction confirmed");
        Ok((record, response))
    }

    async fn run_prepare(&self, state: &mut DeploymentState) -> Result<PrepareOutcome, PhaseError> {
        let manifest = ManifestBuilder::new().build(&self.request.assets, &self.request.settings)?;
        let current = self
            .reader
            .fetch_current(self.request.site_id.as_ref())
            .await?;
        let diff = ManifestDiffer::new().diff(&manifest, &current);

        if !diff.has_update() {
            state.reset();
            self.publish(state);
            info!("published site is up to date");
            self.emit(FlowEvent::progress(
                DeployPhase::Idle,
                PhaseStatus::UpToDate,
                "site is up to date",
            ));
            return Ok(PrepareOutcome::UpToDate);
        }

        let files = self.upload_files(&diff)?;
        let pending_upload = if files.is_empty() {
            debug!("no resource bodies to upload");
            None
        } else {
            let upload = self.clients.blobs.encode(&files).await?;
            debug!(
                files = upload.paths.len(),
                encoded_size = upload.encoded_size,
                "encoded resource bodies"
            );
            Some(upload)
        };

        let summary = diff.summary();
        state.manifest = Some(manifest);
        state.current = Some(current);
        state.diff = Some(diff);
        state.pending_upload = pending_upload;
        state.upload_registered = false;
        state.upload_certified = false;
        state.site_id = self.request.site_id;
        self.complete(state, DeployPhase::Prepared, summary.to_string());

        Ok(PrepareOutcome::Prepared { summary })
    }

    fn upload_files(&self, diff: &SiteManifestDiff) -> Result<Vec<UploadFile>, PhaseError> {
        diff.created()
            .map(|resource| {
                self.request
                    .asset(&resource.path)
                    .map(|asset| UploadFile {
                        path: asset.path.clone(),
                        bytes: asset.bytes.clone(),
                    })
                    .ok_or_else(|| PhaseError::MissingAsset(resource.path.clone()))
            })
            .collect()
    }

    async fn run_upload(
        &self,
        state: &mut DeploymentState,
        epochs: Epochs,
        permanent: bool,
    ) -> Result<(), PhaseError> {
        let Some(upload) = state.pending_upload.clone() else {
            debug!("nothing to upload");
            return Ok(());
        };

        if state.upload_registered {
            debug!(handle = %upload.handle, "upload already registered, pushing only");
        } else {
            let tx = self
                .clients
                .blobs
                .register(&upload, epochs, !permanent)
                .await?;
            self.submit(state, tx).await?;
            state.upload_registered = true;
        }

        self.clients.blobs.push(&upload).await?;
        Ok(())
    }

    async fn run_certify(&self, state: &mut DeploymentState) -> Result<(), PhaseError> {
        let Some(upload) = state.pending_upload.clone() else {
            debug!("nothing to certify");
            return Ok(());
        };

        if !state.upload_certified {
            let tx = self.clients.blobs.certify(&upload).await?;
            self.submit(state, tx).await?;
            state.upload_certified = true;
        }

        let blobs = self.certified_blobs(&upload).await?;
        for blob in &blobs {
            self.apply_patches(state, blob).await?;
        }
        state.certified_blobs = blobs;

        let unresolved: Vec<String> = state
            .diff
            .as_ref()
            .map(|diff| {
                diff.created()
                    .filter(|r| r.is_pending())
                    .map(|r| r.path.clone())
                    .collect()
            })
            .unwrap_or_default();
        if !unresolved.is_empty() {
            return Err(PhaseError::UnresolvedResources(unresolved));
        }
        Ok(())
    }

    /// Group certified files by the blob that stores them.
    async fn certified_blobs(&self, upload: &EncodedUpload) -> Result<Vec<CertifiedBlob>, PhaseError> {
        let files = self.clients.blobs.certified_files(upload).await?;
        let mut blobs: Vec<CertifiedBlob> = Vec::new();
        for file in files {
            match blobs.iter_mut().find(|b| b.blob_id == file.blob_id) {
                Some(blob) => blob.paths.push(file.path),
                None => blobs.push(CertifiedBlob {
                    blob_id: file.blob_id,
                    blob_object: file.blob_object,
                    paths: vec![file.path],
                }),
            }
        }
        Ok(blobs)
    }

    /// Resolve a blob's patches and set locator and internal-id header on
    /// matching resources in both the manifest and the diff.
    async fn apply_patches(
        &self,
        state: &mut DeploymentState,
        blob: &CertifiedBlob,
    ) -> Result<(), PhaseError> {
        let patches = self.clients.patches.patches(&blob.blob_id).await?;
        debug!(blob_id = %blob.blob_id, patches = patches.len(), "looked up patches");

        for patch in patches {
            let path = normalize_path(&patch.identifier);
            let Some(resource) = state
                .manifest
                .as_mut()
                .and_then(|manifest| manifest.resource_mut(&path))
            else {
                warn!(
                    identifier = %patch.identifier,
                    blob_id = %blob.blob_id,
                    "patch has no matching resource, skipping"
                );
                continue;
            };

            let internal_id = patch_id::decode(&patch.patch_id)?;
            resource.content_locator = patch.patch_id.clone();
            resource.set_header(PATCH_INTERNAL_ID_HEADER, internal_id.clone());

            if let Some(diff) = state.diff.as_mut() {
                for resource in diff.created_mut().filter(|r| r.path == path) {
                    resource.content_locator = patch.patch_id.clone();
                    resource.set_header(PATCH_INTERNAL_ID_HEADER, internal_id.clone());
                }
            }
        }
        Ok(())
    }

    async fn run_write(&self, state: &mut DeploymentState) -> Result<WriteOutcome, PhaseError> {
        let diff = state.diff.clone().unwrap_or_default();
        let existing = state.site_id;
        let site_tx =
            OperationBuilder::new(self.package).build(existing, &diff, self.request.owner)?;
        let description = match existing {
            Some(id) => format!("update site {id} ({} calls)", site_tx.len()),
            None => format!("create site ({} calls)", site_tx.len()),
        };

        let (_, response) = self
            .submit(state, UnsignedTransaction::site(description, site_tx))
            .await?;

        let site_id = response
            .effects
            .changed_objects()
            .find(|change| {
                change.owner == Some(self.request.owner)
                    && change.object_type.ends_with(SITE_TYPE_SUFFIX)
            })
            .map(|change| change.object_id)
            .or(existing)
            .ok_or_else(|| PhaseError::MissingSiteObject(response.digest.clone()))?;

        state.site_id = Some(site_id);
        Ok(WriteOutcome {
            site_id,
            digest: response.digest,
        })
    }
}

/// Blobs that resources staying on the site still point at: everything
/// published and not deleted, plus the content certified for this deploy.
/// Until the site transaction lands, replaced resources still count.
fn live_blob_ids(state: &DeploymentState) -> HashSet<String> {
    let Some(diff) = state.diff.as_ref() else {
        return HashSet::new();
    };
    let mut gone: HashSet<&str> = diff.deleted().map(|r| r.path.as_str()).collect();
    if state.phase == DeployPhase::Deployed {
        gone.extend(diff.created().map(|r| r.path.as_str()));
    }
    let kept = state
        .current
        .iter()
        .flat_map(|current| current.resources.iter())
        .filter(|r| !gone.contains(r.path.as_str()));
    kept.chain(diff.created())
        .filter(|r| !r.is_pending())
        .filter_map(|r| blob_id_of_locator(&r.content_locator).ok())
        .collect()
}

/// Blob to delete for a resource: the bundle of a patch, or the plain blob.
fn blob_id_of_locator(locator: &str) -> Result<String, PhaseError> {
    match PatchId::parse(locator) {
        Ok(patch) => Ok(patch.blob_id_string()),
        Err(_) => {
            patch_id::decode_blob_id(locator)?;
            Ok(locator.to_string())
        }
    }
}
