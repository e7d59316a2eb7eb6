use std::path::{Path, PathBuf};

use anyhow::Result;
use siteforge::infrastructure::FsAssetSource;
use siteforge::{ManifestBuilder, SiteManifest};

use super::output;

pub fn cmd_manifest(dir: &Path, settings: Option<PathBuf>, json: bool) -> Result<()> {
    let source = FsAssetSource::new().with_settings_path(settings).load(dir)?;
    let manifest = ManifestBuilder::new().build(&source.assets, &source.settings)?;

    if json {
        output::emit(serde_json::json!({
            "event": "complete",
            "command": "manifest",
            "dir": dir.display().to_string(),
            "manifest": manifest,
        }))?;
        return Ok(());
    }

    print_manifest(&manifest);
    Ok(())
}

pub(super) fn print_manifest(manifest: &SiteManifest) {
    if let Some(name) = &manifest.site_name {
        println!("Site: {}", name);
    }
    for resource in &manifest.resources {
        let content_type = resource.header("content-type").unwrap_or("-");
        println!("  {}  ({})", resource.path, content_type);
    }
    for route in manifest.routes_or_empty() {
        println!("  route {} -> {}", route.route, route.target);
    }
    println!(
        "{} resources, {} routes",
        manifest.resources.len(),
        manifest.routes_or_empty().len()
    );
}
