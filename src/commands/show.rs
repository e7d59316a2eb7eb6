use anyhow::Result;
use siteforge::config::Config;
use siteforge::ObjectId;
use tracing::info;

use super::manifest::print_manifest;
use super::{output, site_reader};

pub async fn cmd_show(config: &Config, site_id: ObjectId, json: bool) -> Result<()> {
    info!(site = %site_id, rpc = %config.network.rpc_url, "reading published site");
    let manifest = site_reader(config).fetch_current(Some(&site_id)).await?;

    if json {
        output::emit(serde_json::json!({
            "event": "complete",
            "command": "show",
            "site_id": site_id,
            "manifest": manifest,
        }))?;
        return Ok(());
    }

    println!("Site object: {}", site_id);
    print_manifest(&manifest);
    Ok(())
}
