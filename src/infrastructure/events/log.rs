//! Tracing Event Sink

use tracing::{info, warn};

use crate::domain::ports::{FlowEvent, FlowEventSink, PhaseStatus};

/// Event sink that forwards flow events to the `tracing` log
pub struct TracingEventSink;

impl FlowEventSink for TracingEventSink {
    fn on_event(&self, event: FlowEvent) {
        match event {
            FlowEvent::Progress(progress) => match progress.status {
                PhaseStatus::Failed { error } => warn!(
                    phase = %progress.phase,
                    error = %error,
                    "{}",
                    progress.message
                ),
                status => info!(
                    phase = %progress.phase,
                    status = ?status,
                    "{}",
                    progress.message
                ),
            },
            FlowEvent::TransactionRecorded(record) => info!(
                digest = %record.digest,
                "{}",
                record.description
            ),
        }
    }
}
