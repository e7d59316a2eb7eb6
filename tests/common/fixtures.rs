//! Site fixtures

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use siteforge::infrastructure::FsAssetSource;
use siteforge::DeployRequest;

use super::OWNER;

pub const SETTINGS_JSON: &str = r#"{
    "site_name": "Demo Site",
    "metadata": {
        "description": "A demo",
        "creator": "siteforge tests"
    },
    "routes": {
        "/blog/*": "/blog/index.html",
        "/*": "/index.html"
    },
    "headers": {
        "/index.html": {
            "Content-Type": "text/html; charset=utf-8",
            "Cache-Control": "no-cache"
        }
    },
    "ignore": ["/drafts/*"]
}"#;

/// A site directory with a handful of files and settings.
pub struct SiteDir {
    pub dir: TempDir,
}

impl SiteDir {
    pub fn new() -> Self {
        let site = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        site.write("index.html", "<h1>home</h1>");
        site.write("blog/index.html", "<h1>blog</h1>");
        site.write("css/site.css", "body { margin: 0 }");
        site.write("drafts/wip.html", "not yet");
        site.write("ws-resources.json", SETTINGS_JSON);
        site
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.dir.path().join(rel)).unwrap();
    }

    /// Load the directory into a deploy request owned by `OWNER`.
    pub fn request(&self) -> DeployRequest {
        let source = FsAssetSource::new().load(self.path()).unwrap();
        DeployRequest::new(source.assets, source.settings, OWNER)
    }
}
