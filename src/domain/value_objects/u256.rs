//! 256-bit unsigned integer value object
//!
//! The site contract stores content hashes and blob ids as `u256`. Locally
//! we keep the raw 32 bytes in little-endian order, which is exactly how a
//! SHA-256 digest or a blob id is reinterpreted on-chain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors produced when parsing a decimal `u256`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum U256Error {
    #[error("empty u256 literal")]
    Empty,

    #[error("invalid digit '{0}' in u256 literal")]
    InvalidDigit(char),

    #[error("u256 literal overflows 256 bits")]
    Overflow,
}

/// Little-endian 256-bit unsigned integer
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct U256([u8; 32]);

impl U256 {
    pub const ZERO: U256 = U256([0; 32]);

    /// Wrap raw little-endian bytes.
    pub const fn from_le_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// SHA-256 of `content`, digest bytes read as a little-endian integer.
    pub fn sha256_of(content: &[u8]) -> Self {
        let digest = Sha256::digest(content);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn to_le_bytes(self) -> [u8; 32] {
        self.0
    }

    pub fn as_le_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Parse a base-10 literal, the form the JSON-RPC API returns.
    pub fn from_decimal(s: &str) -> Result<Self, U256Error> {
        let s = s.trim();
        if s.is_empty() {
            return Err(U256Error::Empty);
        }

        let mut bytes = [0u8; 32];
        for c in s.chars() {
            let digit = c.to_digit(10).ok_or(U256Error::InvalidDigit(c))?;
            let mut carry = digit;
            for byte in bytes.iter_mut() {
                let v = u32::from(*byte) * 10 + carry;
                *byte = (v & 0xff) as u8;
                carry = v >> 8;
            }
            if carry != 0 {
                return Err(U256Error::Overflow);
            }
        }
        Ok(Self(bytes))
    }

    /// Render as a base-10 literal.
    pub fn to_decimal(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }

        let mut work = self.0;
        let mut digits = Vec::with_capacity(78);
        while work.iter().any(|b| *b != 0) {
            let mut rem = 0u32;
            for byte in work.iter_mut().rev() {
                let v = (rem << 8) | u32::from(*byte);
                *byte = (v / 10) as u8;
                rem = v % 10;
            }
            digits.push(char::from(b'0' + rem as u8));
        }
        digits.iter().rev().collect()
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal())
    }
}

impl fmt::Debug for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U256({})", self.to_decimal())
    }
}

impl FromStr for U256 {
    type Err = U256Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal(s)
    }
}

impl From<u64> for U256 {
    fn from(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&value.to_le_bytes());
        Self(bytes)
    }
}

impl Serialize for U256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for U256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_decimal(&s).map_err(serde::de::Error::custom)
    }
}
