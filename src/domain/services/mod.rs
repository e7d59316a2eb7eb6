//! Domain Services
//!
//! Pure business logic services that operate on domain entities.
//! These services have no I/O dependencies and are easily testable.

pub mod content_type;
mod differ;
mod manifest_builder;
mod operation_builder;
pub mod routes_codec;

pub use content_type::content_type_for;
pub use differ::ManifestDiffer;
pub use manifest_builder::{default_headers, ManifestBuilder, ManifestError};
pub use operation_builder::{Argument, BuildError, OperationBuilder, SiteCall, SiteTransaction};
pub use routes_codec::RoutesDecodeError;
