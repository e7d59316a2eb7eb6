//! Common test utilities for Siteforge scenario and property tests.
//!
//! This module provides:
//! - `InMemoryNetwork`: ledger, signer, blob network and aggregator backed by
//!   one in-memory store
//! - Fixtures: site directories on disk and ready-made requests

#![allow(dead_code)]

pub mod fixtures;
pub mod network;

pub use fixtures::*;
pub use network::*;
