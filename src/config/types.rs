//! Configuration type definitions

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Address, Epochs, ObjectId};

use super::loader::{self, ConfigError, ConfigWarning};

pub const DEFAULT_RPC_URL: &str = "https://fullnode.testnet.sui.io:443";
pub const DEFAULT_AGGREGATOR_URL: &str = "https://aggregator.walrus-testnet.walrus.space";

/// Ledger and storage endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    #[serde(default = "default_aggregator_url")]
    pub aggregator_url: String,

    /// Package that defines the site contract
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_id: Option<ObjectId>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            aggregator_url: default_aggregator_url(),
            package_id: None,
        }
    }
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}

fn default_aggregator_url() -> String {
    DEFAULT_AGGREGATOR_URL.to_string()
}

/// Deploy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default)]
    pub epochs: Epochs,

    #[serde(default = "default_true")]
    pub deletable: bool,

    /// Address that will own the site object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Address>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            epochs: Epochs::default(),
            deletable: true,
            owner: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "plain" | "text" => Some(LogFormat::Plain),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl Verbosity {
    /// Default `tracing` filter directive for this level
    pub fn filter_directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
            Verbosity::Debug => "trace",
        }
    }

    /// Raise the level by the number of `-v` flags given.
    pub fn raised_by(self, count: u8) -> Self {
        let steps = [
            Verbosity::Quiet,
            Verbosity::Normal,
            Verbosity::Verbose,
            Verbosity::Debug,
        ];
        let current = steps.iter().position(|v| *v == self).unwrap_or(1);
        steps[(current + usize::from(count)).min(steps.len() - 1)]
    }
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default)]
    pub verbosity: Verbosity,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub deploy: DeployConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        loader::load_with_warnings(path)
    }

    /// Load from project config, user config, or defaults
    pub fn load_or_default(
        project_root: Option<&Path>,
    ) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        loader::load_or_default(project_root)
    }

    /// Apply environment variable overrides (SITEFORGE_* prefix)
    pub fn with_env_overrides(self) -> (Self, Vec<ConfigWarning>) {
        loader::with_env_overrides(self, |name| std::env::var(name).ok())
    }
}
