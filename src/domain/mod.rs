//! Domain Layer
//!
//! This is the core of siteforge - pure site reconciliation logic without
//! I/O dependencies.
//!
//! ## Structure
//!
//! - `value_objects/` - Immutable value types (U256, ObjectId, PatchId, Epochs)
//! - `entities/` - Core domain entities (SiteManifest, SiteManifestDiff, DeploymentState)
//! - `services/` - Domain services (ManifestBuilder, ManifestDiffer, OperationBuilder)
//! - `ports/` - Interface definitions for infrastructure
//!
//! Nothing here performs I/O. Reading the chain, signing, executing and
//! storing blobs happen behind the traits in `ports/`, so the differ and the
//! operation builder can run in previews and property tests unchanged.

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
