//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `rpc` - JSON-RPC `ChainReader`
//! - `aggregator` - HTTP `PatchLookup`
//! - `assets` - Site directory loading
//! - `events/` - Event sinks (NDJSON, channel, tracing)

pub mod aggregator;
pub mod assets;
pub mod events;
pub mod rpc;

// Re-export for convenience
pub use aggregator::HttpPatchLookup;
pub use assets::{AssetError, FsAssetSource, SiteSource};
pub use events::{ChannelEventSink, JsonEventSink, TracingEventSink};
pub use rpc::SuiRpcChainReader;
