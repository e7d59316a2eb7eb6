//! Deploy Event Port
//!
//! Provides an observable interface for deployment phases.
//! Enables progress reporting, JSON event streams, and debugging.

use serde::Serialize;

use crate::domain::entities::{DeployPhase, TransactionRecord};

/// How a phase progressed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PhaseStatus {
    Started,
    Completed,
    Failed { error: String },
    /// Prepare found nothing to deploy
    UpToDate,
}

/// Progress of one phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub phase: DeployPhase,
    #[serde(flatten)]
    pub status: PhaseStatus,
    pub message: String,
}

/// Event emitted by the deployment flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FlowEvent {
    /// Phase started, completed or failed
    Progress(ProgressEvent),

    /// A transaction was submitted and confirmed
    TransactionRecorded(TransactionRecord),
}

impl FlowEvent {
    pub fn progress(phase: DeployPhase, status: PhaseStatus, message: impl Into<String>) -> Self {
        FlowEvent::Progress(ProgressEvent {
            phase,
            status,
            message: message.into(),
        })
    }

    /// Per-step detail rather than a phase boundary
    pub fn is_detail(&self) -> bool {
        matches!(self, FlowEvent::TransactionRecorded(_))
    }
}

/// Trait for receiving flow events
///
/// Implementations can be:
/// - JsonEventSink: NDJSON event stream for CI
/// - ChannelEventSink: queue drained by a UI task
/// - TracingEventSink: forwards to the log
/// - NoopEventSink: Silent operation
pub trait FlowEventSink: Send + Sync {
    /// Handle a flow event
    fn on_event(&self, event: FlowEvent);

    /// Check if this sink wants detailed events (e.g., per-transaction)
    ///
    /// Some sinks (like CI) may only want phase boundaries.
    fn wants_detailed_events(&self) -> bool {
        true
    }
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl FlowEventSink for NoopEventSink {
    fn on_event(&self, _event: FlowEvent) {
        // Do nothing
    }

    fn wants_detailed_events(&self) -> bool {
        false
    }
}
