//! Command implementations for the `siteforge` binary.
//!
//! Every command is read-only: signing and uploading need clients that are
//! supplied by an embedding program, not by this CLI.

mod diff;
mod manifest;
mod output;
mod show;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use siteforge::config::{Config, ConfigWarning};
use siteforge::infrastructure::SuiRpcChainReader;
use siteforge::{ChainSiteReader, ObjectId, SiteforgeError};

pub use diff::{cmd_diff, DiffArgs};
pub use manifest::cmd_manifest;
pub use show::cmd_show;

/// Configuration from an explicit file, or the usual search order.
pub fn load_config(explicit: Option<&Path>) -> Result<(Config, Vec<ConfigWarning>)> {
    match explicit {
        Some(path) => {
            let (config, mut warnings) = Config::load_with_warnings(path)?;
            let (config, env_warnings) = config.with_env_overrides();
            warnings.extend(env_warnings);
            Ok((config, warnings))
        }
        None => {
            let cwd = std::env::current_dir()?;
            Ok(Config::load_or_default(Some(&cwd))?)
        }
    }
}

fn site_reader(config: &Config) -> ChainSiteReader {
    ChainSiteReader::new(Arc::new(SuiRpcChainReader::from_config(&config.network)))
}

fn package_id(config: &Config) -> Result<ObjectId, SiteforgeError> {
    config
        .network
        .package_id
        .ok_or(SiteforgeError::MissingConfig {
            key: "network.package_id",
            env: "SITEFORGE_PACKAGE_ID",
        })
}
