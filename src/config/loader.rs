//! Configuration loading

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::types::{Config, LogFormat};
use crate::domain::value_objects::{Epochs, ObjectId};

/// Project-level configuration file name
pub const PROJECT_CONFIG_FILE: &str = "siteforge.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    UnknownKey,
    InvalidValue { value: String },
}

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub kind: WarningKind,
    /// Config file the key came from; `None` for environment variables
    pub file: Option<PathBuf>,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            WarningKind::UnknownKey => write!(f, "unknown config key '{}'", self.key)?,
            WarningKind::InvalidValue { value } => {
                write!(f, "ignoring invalid {} value '{}'", self.key, value)?
            }
        }
        if let Some(file) = &self.file {
            write!(f, " in {}", file.display())?;
            if let Some(line) = self.line {
                write!(f, ":{}", line)?;
            }
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> Result<(Config, Vec<ConfigWarning>), ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_with_warnings(&content, path)
}

pub(crate) fn parse_with_warnings(
    content: &str,
    path: &Path,
) -> Result<(Config, Vec<ConfigWarning>), ConfigError> {
    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                line: find_line_number(content, &key),
                suggestion: suggest_key(&key),
                key,
                kind: WarningKind::UnknownKey,
                file: Some(path.to_path_buf()),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load from project config, user config, or defaults, then apply the
/// environment on top.
pub fn load_or_default(
    project_root: Option<&Path>,
) -> Result<(Config, Vec<ConfigWarning>), ConfigError> {
    let candidates = project_root
        .map(|root| root.join(PROJECT_CONFIG_FILE))
        .into_iter()
        .chain(user_config_path());

    let (config, mut warnings) = match candidates.into_iter().find(|path| path.exists()) {
        Some(path) => load_with_warnings(&path)?,
        None => (Config::default(), Vec::new()),
    };

    let (config, env_warnings) = with_env_overrides(config, |name| std::env::var(name).ok());
    warnings.extend(env_warnings);
    Ok((config, warnings))
}

/// `$CONFIG_DIR/siteforge/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("siteforge").join("config.toml"))
}

/// Apply environment variable overrides (SITEFORGE_* prefix).
///
/// Invalid values leave the configured value in place and produce a warning.
pub fn with_env_overrides<F>(mut config: Config, lookup: F) -> (Config, Vec<ConfigWarning>)
where
    F: Fn(&str) -> Option<String>,
{
    let mut warnings = Vec::new();
    let mut invalid = |key: &str, value: String, suggestion: Option<&str>| {
        warnings.push(ConfigWarning {
            key: key.to_string(),
            kind: WarningKind::InvalidValue { value },
            file: None,
            line: None,
            suggestion: suggestion.map(str::to_string),
        });
    };

    if let Some(url) = lookup("SITEFORGE_RPC_URL") {
        config.network.rpc_url = url;
    }

    if let Some(url) = lookup("SITEFORGE_AGGREGATOR_URL") {
        config.network.aggregator_url = url;
    }

    if let Some(value) = lookup("SITEFORGE_PACKAGE_ID") {
        match ObjectId::parse(&value) {
            Ok(id) => config.network.package_id = Some(id),
            Err(_) => invalid("SITEFORGE_PACKAGE_ID", value, None),
        }
    }

    if let Some(value) = lookup("SITEFORGE_OWNER") {
        match ObjectId::parse(&value) {
            Ok(owner) => config.deploy.owner = Some(owner),
            Err(_) => invalid("SITEFORGE_OWNER", value, None),
        }
    }

    if let Some(value) = lookup("SITEFORGE_EPOCHS") {
        match value.parse::<Epochs>() {
            Ok(epochs) => config.deploy.epochs = epochs,
            Err(_) => invalid("SITEFORGE_EPOCHS", value, Some("max")),
        }
    }

    if let Some(value) = lookup("SITEFORGE_LOG_FORMAT") {
        match LogFormat::parse(&value) {
            Some(format) => config.output.log_format = format,
            None => {
                let suggestion = closest(&value.to_lowercase(), &["plain", "json"]);
                invalid("SITEFORGE_LOG_FORMAT", value, suggestion)
            }
        }
    }

    (config, warnings)
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "network",
        "rpc_url",
        "aggregator_url",
        "package_id",
        "deploy",
        "epochs",
        "deletable",
        "owner",
        "output",
        "log_format",
        "verbosity",
    ];
    closest(unknown, CANDIDATES).map(str::to_string)
}

/// Closest candidate within two edits
fn closest<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let mut best: Option<(&'a str, usize)> = None;
    for &candidate in candidates {
        let dist = levenshtein(input, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
