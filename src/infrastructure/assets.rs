//! File System Asset Source
//!
//! Walks a site directory and turns every publishable file into an `Asset`.
//! Site settings are read from `ws-resources.json` at the directory root.

use std::fs;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::WalkBuilder;
use thiserror::Error;
use tracing::{debug, trace};

use crate::domain::entities::{Asset, SiteSettings, SETTINGS_FILE_NAME};

/// Maximum number of ignore patterns accepted from the settings file
const MAX_PATTERNS: usize = 1000;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("site directory not found: {0}")]
    NotADirectory(PathBuf),

    #[error("failed to parse {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid ignore pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("too many ignore patterns ({count}, limit {limit})")]
    TooManyPatterns { count: usize, limit: usize },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk site directory: {0}")]
    Walk(String),
}

/// Local files of a site plus the settings that shape them
#[derive(Debug, Clone)]
pub struct SiteSource {
    pub root: PathBuf,
    pub assets: Vec<Asset>,
    pub settings: SiteSettings,
}

/// Loads a site directory from disk
#[derive(Debug, Default)]
pub struct FsAssetSource {
    settings_path: Option<PathBuf>,
}

impl FsAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read settings from `path` instead of `<root>/ws-resources.json`.
    pub fn with_settings_path(mut self, path: Option<PathBuf>) -> Self {
        self.settings_path = path;
        self
    }

    pub fn load(&self, root: &Path) -> Result<SiteSource, AssetError> {
        if !root.is_dir() {
            return Err(AssetError::NotADirectory(root.to_path_buf()));
        }

        let settings = self.load_settings(root)?;
        let ignore = ignore_matcher(root, &settings.ignore)?;
        let assets = walk_assets(root, &ignore)?;
        debug!(
            root = %root.display(),
            assets = assets.len(),
            ignore_patterns = settings.ignore.len(),
            "loaded site directory"
        );

        Ok(SiteSource {
            root: root.to_path_buf(),
            assets,
            settings,
        })
    }

    fn load_settings(&self, root: &Path) -> Result<SiteSettings, AssetError> {
        let path = self
            .settings_path
            .clone()
            .unwrap_or_else(|| root.join(SETTINGS_FILE_NAME));
        if !path.exists() {
            // An explicitly requested file has to be there.
            if self.settings_path.is_some() {
                return Err(AssetError::Io {
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                    path,
                });
            }
            return Ok(SiteSettings::default());
        }

        let content = fs::read_to_string(&path).map_err(|source| AssetError::Io {
            path: path.clone(),
            source,
        })?;
        SiteSettings::from_json(&content).map_err(|source| AssetError::Settings { path, source })
    }
}

fn ignore_matcher(root: &Path, patterns: &[String]) -> Result<Gitignore, AssetError> {
    if patterns.len() > MAX_PATTERNS {
        return Err(AssetError::TooManyPatterns {
            count: patterns.len(),
            limit: MAX_PATTERNS,
        });
    }

    let mut builder = GitignoreBuilder::new(root);
    for pattern in patterns {
        let trimmed = pattern.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        // A leading "/" anchors the pattern at the site root.
        builder
            .add_line(None, trimmed)
            .map_err(|e| AssetError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
    }
    builder.build().map_err(|e| AssetError::InvalidPattern {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })
}

fn walk_assets(root: &Path, ignore: &Gitignore) -> Result<Vec<Asset>, AssetError> {
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .ignore(false)
        .parents(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut assets = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| AssetError::Walk(e.to_string()))?;
        let Some(file_type) = entry.file_type() else {
            continue;
        };
        if !file_type.is_file() {
            continue;
        }

        let path = entry.path();
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        if relative == Path::new(SETTINGS_FILE_NAME) {
            continue;
        }
        if ignore.matched_path_or_any_parents(relative, false).is_ignore() {
            trace!(path = %relative.display(), "ignored");
            continue;
        }

        let bytes = fs::read(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        assets.push(Asset::new(resource_path(relative), bytes));
    }
    Ok(assets)
}

/// `a/b.html` -> `/a/b.html`, with forward slashes on every platform
fn resource_path(relative: &Path) -> String {
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{joined}")
}
