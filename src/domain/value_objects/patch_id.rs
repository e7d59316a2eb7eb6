//! Patch identifier codec
//!
//! A patch identifier locates one file inside a bundled storage blob. Its
//! textual form is URL-safe base64 without padding over
//! `blob_id (32 bytes) || suffix (5 bytes)`. The suffix starts with a
//! version tag; version 1 continues with little-endian `u16` start and end
//! sliver indices. The on-chain record keeps the suffix as `0x` + hex.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use thiserror::Error;

use super::U256;

/// Size of the storage blob id prefix.
pub const BLOB_ID_SIZE: usize = 32;

/// Size of the patch suffix, version tag included.
pub const PATCH_SUFFIX_SIZE: usize = 5;

/// The only suffix layout we understand.
pub const PATCH_VERSION_1: u8 = 1;

/// Header under which the decoded suffix is stored on each resource.
pub const PATCH_INTERNAL_ID_HEADER: &str = "x-wal-quilt-patch-internal-id";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchIdError {
    #[error("patch identifier '{locator}' is not url-safe base64: {reason}")]
    Encoding { locator: String, reason: String },

    #[error("patch identifier decodes to {actual} bytes, expected {expected}")]
    Length { expected: usize, actual: usize },

    #[error("unsupported patch identifier version {0}")]
    UnsupportedVersion(u8),

    #[error("patch internal id '{0}' is not 0x-prefixed hex of 5 bytes")]
    InternalId(String),
}

/// Decoded patch identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchId {
    blob_id: [u8; BLOB_ID_SIZE],
    suffix: [u8; PATCH_SUFFIX_SIZE],
}

impl PatchId {
    pub fn new(blob_id: [u8; BLOB_ID_SIZE], suffix: [u8; PATCH_SUFFIX_SIZE]) -> Self {
        Self { blob_id, suffix }
    }

    /// Decode a locator. Fails without partial output on any format problem.
    pub fn parse(locator: &str) -> Result<Self, PatchIdError> {
        let raw = URL_SAFE_NO_PAD
            .decode(locator)
            .map_err(|e| PatchIdError::Encoding {
                locator: locator.to_string(),
                reason: e.to_string(),
            })?;

        let expected = BLOB_ID_SIZE + PATCH_SUFFIX_SIZE;
        if raw.len() != expected {
            return Err(PatchIdError::Length {
                expected,
                actual: raw.len(),
            });
        }

        let version = raw[BLOB_ID_SIZE];
        if version != PATCH_VERSION_1 {
            return Err(PatchIdError::UnsupportedVersion(version));
        }

        let mut blob_id = [0u8; BLOB_ID_SIZE];
        blob_id.copy_from_slice(&raw[..BLOB_ID_SIZE]);
        let mut suffix = [0u8; PATCH_SUFFIX_SIZE];
        suffix.copy_from_slice(&raw[BLOB_ID_SIZE..]);
        Ok(Self { blob_id, suffix })
    }

    /// Rebuild from a blob id and an on-chain internal id (`0x` + 10 hex chars).
    pub fn from_internal_id(
        blob_id: [u8; BLOB_ID_SIZE],
        internal_id: &str,
    ) -> Result<Self, PatchIdError> {
        let digits = internal_id
            .strip_prefix("0x")
            .ok_or_else(|| PatchIdError::InternalId(internal_id.to_string()))?;
        let mut suffix = [0u8; PATCH_SUFFIX_SIZE];
        hex::decode_to_slice(digits, &mut suffix)
            .map_err(|_| PatchIdError::InternalId(internal_id.to_string()))?;
        Ok(Self { blob_id, suffix })
    }

    pub fn version(&self) -> u8 {
        self.suffix[0]
    }

    pub fn start_index(&self) -> u16 {
        u16::from_le_bytes([self.suffix[1], self.suffix[2]])
    }

    pub fn end_index(&self) -> u16 {
        u16::from_le_bytes([self.suffix[3], self.suffix[4]])
    }

    pub fn blob_id(&self) -> [u8; BLOB_ID_SIZE] {
        self.blob_id
    }

    /// The bundle's blob id in its own textual form.
    pub fn blob_id_string(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.blob_id)
    }

    /// The bundle's blob id as the contract's `u256`.
    pub fn blob_id_u256(&self) -> U256 {
        U256::from_le_bytes(self.blob_id)
    }

    /// `0x` followed by 10 lowercase hex chars.
    pub fn internal_id(&self) -> String {
        format!("0x{}", hex::encode(self.suffix))
    }
}

/// Decode a locator straight to its on-chain internal id.
pub fn decode(locator: &str) -> Result<String, PatchIdError> {
    PatchId::parse(locator).map(|id| id.internal_id())
}

/// Decode a plain (non-patch) blob id into its `u256` form.
pub fn decode_blob_id(blob_id: &str) -> Result<U256, PatchIdError> {
    let raw = URL_SAFE_NO_PAD
        .decode(blob_id)
        .map_err(|e| PatchIdError::Encoding {
            locator: blob_id.to_string(),
            reason: e.to_string(),
        })?;
    let bytes: [u8; BLOB_ID_SIZE] = raw.as_slice().try_into().map_err(|_| PatchIdError::Length {
        expected: BLOB_ID_SIZE,
        actual: raw.len(),
    })?;
    Ok(U256::from_le_bytes(bytes))
}

/// Encode a `u256` blob id back into its textual form.
pub fn encode_blob_id(blob_id: &U256) -> String {
    URL_SAFE_NO_PAD.encode(blob_id.as_le_bytes())
}

impl fmt::Display for PatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut raw = Vec::with_capacity(BLOB_ID_SIZE + PATCH_SUFFIX_SIZE);
        raw.extend_from_slice(&self.blob_id);
        raw.extend_from_slice(&self.suffix);
        f.write_str(&URL_SAFE_NO_PAD.encode(raw))
    }
}

impl fmt::Debug for PatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PatchId({})", self)
    }
}

impl FromStr for PatchId {
    type Err = PatchIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
