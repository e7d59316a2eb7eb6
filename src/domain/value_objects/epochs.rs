//! Storage retention period

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// How long uploaded content is paid for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Epochs {
    /// A fixed number of storage epochs
    Count(u32),
    /// The longest retention the network accepts
    Max,
}

impl Default for Epochs {
    fn default() -> Self {
        Epochs::Count(1)
    }
}

impl fmt::Display for Epochs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Epochs::Count(n) => write!(f, "{}", n),
            Epochs::Max => f.write_str("max"),
        }
    }
}

impl FromStr for Epochs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("max") {
            return Ok(Epochs::Max);
        }
        match s.parse::<u32>() {
            Ok(0) => Err("epochs must be at least 1".to_string()),
            Ok(n) => Ok(Epochs::Count(n)),
            Err(_) => Err(format!("invalid epochs '{}': expected a number or 'max'", s)),
        }
    }
}

impl Serialize for Epochs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Epochs::Count(n) => serializer.serialize_u32(*n),
            Epochs::Max => serializer.serialize_str("max"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EpochsDe {
    Count(u32),
    Text(String),
}

impl<'de> Deserialize<'de> for Epochs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match EpochsDe::deserialize(deserializer)? {
            EpochsDe::Count(0) => Err(serde::de::Error::custom("epochs must be at least 1")),
            EpochsDe::Count(n) => Ok(Epochs::Count(n)),
            EpochsDe::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}
