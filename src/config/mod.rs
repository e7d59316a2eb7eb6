//! Configuration module for Siteforge
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (SITEFORGE_*)
//! 3. Project config (siteforge.toml)
//! 4. User config ($CONFIG_DIR/siteforge/config.toml)
//! 5. Built-in defaults (lowest priority)
//!
//! Site-level settings live in `ws-resources.json` next to the site and are
//! handled by `SiteSettings`, not here.

mod loader;
mod types;

pub use loader::{user_config_path, ConfigError, ConfigWarning, WarningKind, PROJECT_CONFIG_FILE};
pub use types::{
    Config, DeployConfig, LogFormat, NetworkConfig, OutputConfig, Verbosity,
    DEFAULT_AGGREGATOR_URL, DEFAULT_RPC_URL,
};
