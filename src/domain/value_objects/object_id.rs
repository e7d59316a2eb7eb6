//! Ledger object id / account address value object
//!
//! Both are 32-byte values rendered as `0x`-prefixed lowercase hex.
//! Short forms such as `0x2` are left-padded with zeros.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const OBJECT_ID_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectIdError {
    #[error("object id '{0}' is missing the 0x prefix")]
    MissingPrefix(String),

    #[error("object id '{0}' is longer than 32 bytes")]
    TooLong(String),

    #[error("object id '{input}' is not valid hex: {reason}")]
    InvalidHex { input: String, reason: String },
}

/// 32-byte ledger identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; OBJECT_ID_LENGTH]);

/// Account addresses share the object id encoding.
pub type Address = ObjectId;

impl ObjectId {
    pub const fn new(bytes: [u8; OBJECT_ID_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; OBJECT_ID_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse `0x`-prefixed hex, accepting short forms.
    pub fn parse(input: &str) -> Result<Self, ObjectIdError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| ObjectIdError::MissingPrefix(input.to_string()))?;

        if digits.len() > OBJECT_ID_LENGTH * 2 {
            return Err(ObjectIdError::TooLong(input.to_string()));
        }

        let padded = format!("{:0>width$}", digits, width = OBJECT_ID_LENGTH * 2);
        let mut bytes = [0u8; OBJECT_ID_LENGTH];
        hex::decode_to_slice(&padded, &mut bytes).map_err(|e| ObjectIdError::InvalidHex {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
