//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod epochs;
mod object_id;
pub mod patch_id;
mod u256;

pub use epochs::Epochs;
pub use object_id::{Address, ObjectId, ObjectIdError, OBJECT_ID_LENGTH};
pub use patch_id::{PatchId, PatchIdError, PATCH_INTERNAL_ID_HEADER};
pub use u256::{U256Error, U256};
