//! Deploy Options
//!
//! Inputs of one deployment attempt.

use crate::config::DeployConfig;
use crate::domain::entities::{Asset, SiteSettings};
use crate::domain::value_objects::{Address, Epochs, ObjectId};

/// What to deploy and where
#[derive(Debug, Clone)]
pub struct DeployRequest {
    /// Local files, hashed once at load time
    pub assets: Vec<Asset>,
    /// Headers, routes, metadata and name from the site directory
    pub settings: SiteSettings,
    /// Published site to update; `None` creates a new one
    pub site_id: Option<ObjectId>,
    /// Receives a newly created site and pays for transactions
    pub owner: Address,
    /// Storage duration of uploaded content
    pub epochs: Epochs,
    /// Register blobs as non-deletable
    pub permanent: bool,
}

impl DeployRequest {
    pub fn new(assets: Vec<Asset>, settings: SiteSettings, owner: Address) -> Self {
        let site_id = settings.object_id;
        Self {
            assets,
            settings,
            site_id,
            owner,
            epochs: Epochs::default(),
            permanent: false,
        }
    }

    pub fn with_storage(mut self, epochs: Epochs, permanent: bool) -> Self {
        self.epochs = epochs;
        self.permanent = permanent;
        self
    }

    /// Take storage terms from the `[deploy]` config section.
    pub fn with_deploy_config(self, config: &DeployConfig) -> Self {
        self.with_storage(config.epochs, !config.deletable)
    }

    /// Override the site id found in the settings.
    pub fn with_site_id(mut self, site_id: Option<ObjectId>) -> Self {
        if site_id.is_some() {
            self.site_id = site_id;
        }
        self
    }

    pub fn asset(&self, path: &str) -> Option<&Asset> {
        self.assets.iter().find(|asset| asset.path == path)
    }
}
