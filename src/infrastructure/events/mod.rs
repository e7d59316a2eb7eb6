//! Event Sink Implementations
//!
//! Provides concrete implementations of FlowEventSink:
//! - JsonEventSink: NDJSON output for CI/automation
//! - ChannelEventSink: Unbounded queue drained by the caller
//! - TracingEventSink: Forwards events to the `tracing` log

mod channel;
mod json;
mod log;

pub use channel::ChannelEventSink;
pub use json::JsonEventSink;
pub use log::TracingEventSink;
