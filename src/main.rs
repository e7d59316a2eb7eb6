//! Siteforge CLI - static site reconciliation
//!
//! Usage: siteforge <COMMAND>
//!
//! Commands:
//!   manifest  Build the manifest of a local site directory
//!   show      Show the published manifest of a site
//!   diff      Compare a local site with its published version

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing::warn;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, warnings) = commands::load_config(cli.config.as_deref())?;
    siteforge::telemetry::init(
        config.output.log_format,
        config.output.verbosity.raised_by(cli.verbose),
    );
    for warning in &warnings {
        warn!("{}", warning);
    }

    match cli.command {
        Commands::Manifest { dir, settings } => commands::cmd_manifest(&dir, settings, cli.json),
        Commands::Show { site_id } => commands::cmd_show(&config, site_id, cli.json).await,
        Commands::Diff {
            dir,
            site_id,
            settings,
            all,
        } => {
            let args = commands::DiffArgs {
                dir: &dir,
                site_id,
                settings,
                all,
            };
            commands::cmd_diff(&config, args, cli.json).await
        }
    }
}
