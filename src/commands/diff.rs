use std::path::{Path, PathBuf};

use anyhow::Result;
use siteforge::config::Config;
use siteforge::domain::entities::ResourceOp;
use siteforge::infrastructure::FsAssetSource;
use siteforge::{ObjectId, Preview, PreviewUseCase, SiteforgeError};

use super::{output, package_id, site_reader};

pub struct DiffArgs<'a> {
    pub dir: &'a Path,
    pub site_id: Option<ObjectId>,
    pub settings: Option<PathBuf>,
    pub all: bool,
}

pub async fn cmd_diff(config: &Config, args: DiffArgs<'_>, json: bool) -> Result<()> {
    let package = package_id(config)?;
    let owner = config.deploy.owner.ok_or(SiteforgeError::MissingConfig {
        key: "deploy.owner",
        env: "SITEFORGE_OWNER",
    })?;

    let source = FsAssetSource::new()
        .with_settings_path(args.settings)
        .load(args.dir)?;
    let site_id = args.site_id.or(source.settings.object_id);

    let preview = PreviewUseCase::new(site_reader(config), package)
        .with_unchanged(args.all)
        .execute(&source.assets, &source.settings, site_id.as_ref(), owner)
        .await
        .map_err(SiteforgeError::from)?;

    if json {
        emit_json(&preview, site_id, config)?;
    } else {
        print_preview(&preview, site_id, config);
    }
    Ok(())
}

fn emit_json(preview: &Preview, site_id: Option<ObjectId>, config: &Config) -> Result<()> {
    let plan = match &preview.plan {
        Ok(tx) => serde_json::json!({
            "calls": tx.calls.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
        }),
        Err(e) => serde_json::json!({ "error": e.to_string() }),
    };
    output::emit(serde_json::json!({
        "event": "complete",
        "command": "diff",
        "site_id": site_id,
        "up_to_date": preview.is_up_to_date(),
        "summary": preview.summary(),
        "diff": preview.diff,
        "plan": plan,
        "storage": {
            "epochs": config.deploy.epochs,
            "deletable": config.deploy.deletable,
        },
    }))?;
    Ok(())
}

fn print_preview(preview: &Preview, site_id: Option<ObjectId>, config: &Config) {
    match site_id {
        Some(id) => println!("Comparing with site {}", id),
        None => println!("No published site; everything is new"),
    }

    if preview.is_up_to_date() {
        println!("Site is up to date.");
        return;
    }

    for op in &preview.diff.resources {
        let marker = match op {
            ResourceOp::Created(_) => "+",
            ResourceOp::Deleted(_) => "-",
            ResourceOp::Unchanged(_) => " ",
        };
        println!("  {} {}", marker, op.path());
    }
    println!("{}", preview.summary());
    println!(
        "Content would be stored for {} epochs ({})",
        config.deploy.epochs,
        if config.deploy.deletable { "deletable" } else { "permanent" }
    );

    match &preview.plan {
        Ok(tx) => {
            println!("\nPlanned calls ({}):", tx.len());
            for call in &tx.calls {
                println!("  {}", call);
            }
        }
        Err(e) => println!("\nCannot plan the site transaction: {}", e),
    }
}
