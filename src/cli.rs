use std::path::PathBuf;

use clap::{Parser, Subcommand};
use siteforge::ObjectId;

/// Siteforge - reconcile and deploy static sites
#[derive(Parser, Debug)]
#[command(name = "siteforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Machine-readable output (NDJSON)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to ./siteforge.toml, then the user config)
    #[arg(long, global = true, env = "SITEFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the manifest of a local site directory
    Manifest {
        /// Site directory
        dir: PathBuf,

        /// Settings file (defaults to <dir>/ws-resources.json)
        #[arg(long)]
        settings: Option<PathBuf>,
    },

    /// Show the published manifest of a site
    Show {
        /// Object id of the site
        site_id: ObjectId,
    },

    /// Compare a local site directory with its published version
    Diff {
        /// Site directory
        dir: PathBuf,

        /// Published site to compare against (defaults to the settings' object_id)
        #[arg(long)]
        site_id: Option<ObjectId>,

        /// Settings file (defaults to <dir>/ws-resources.json)
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Also list unchanged resources
        #[arg(long)]
        all: bool,
    },
}
