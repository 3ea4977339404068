//! `orderdesk.toml` loading.
//!
//! Precedence, lowest to highest: file, `ORDERDESK_*` environment
//! variables, command-line flags.

use std::path::{Path, PathBuf};

use orderdesk_core::{Collections, DEFAULT_MAX_ATTEMPTS};
use orderdesk_rest::{RestConfig, DEFAULT_ENDPOINT};
use serde::Deserialize;

/// Settings file read when `--config` is not given. Its absence is not an
/// error.
pub(crate) const DEFAULT_SETTINGS_FILE: &str = "orderdesk.toml";

#[derive(Debug, thiserror::Error)]
pub(crate) enum SettingsError {
    #[error("cannot read settings file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("missing required setting '{key}' (set it in orderdesk.toml or via {env})")]
    Missing {
        key: &'static str,
        env: &'static str,
    },
    #[error("invalid value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

// ── File layout ──────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SettingsFile {
    store: StoreSection,
    collections: CollectionsSection,
    writes: WritesSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StoreSection {
    endpoint: Option<String>,
    project_id: Option<String>,
    database_id: Option<String>,
    api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CollectionsSection {
    orders: Option<String>,
    config: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct WritesSection {
    max_attempts: Option<usize>,
}

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub(crate) struct Overrides {
    pub endpoint: Option<String>,
    pub project_id: Option<String>,
    pub database_id: Option<String>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Settings {
    pub rest: RestConfig,
    pub collections: Collections,
    pub max_attempts: usize,
}

impl Settings {
    /// Load settings from `path` (or the default file if present), the
    /// process environment and `overrides`.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self, SettingsError> {
        let file = match path {
            Some(path) => read_file(path)?,
            None => {
                let default = Path::new(DEFAULT_SETTINGS_FILE);
                if default.exists() {
                    read_file(default)?
                } else {
                    SettingsFile::default()
                }
            }
        };
        Self::resolve(file, |key| std::env::var(key).ok(), overrides)
    }

    /// Parse settings from TOML text, without touching the environment.
    #[cfg(test)]
    fn from_toml(text: &str, overrides: &Overrides) -> Result<Self, SettingsError> {
        let file: SettingsFile = toml::from_str(text).map_err(|source| SettingsError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        Self::resolve(file, |_| None, overrides)
    }

    fn resolve(
        file: SettingsFile,
        env: impl Fn(&str) -> Option<String>,
        overrides: &Overrides,
    ) -> Result<Self, SettingsError> {
        let pick = |flag: &Option<String>, var: &str, from_file: Option<String>| {
            flag.clone()
                .or_else(|| env(var).filter(|v| !v.is_empty()))
                .or(from_file)
        };

        let endpoint = pick(&overrides.endpoint, "ORDERDESK_ENDPOINT", file.store.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let project_id = pick(
            &overrides.project_id,
            "ORDERDESK_PROJECT_ID",
            file.store.project_id,
        )
        .ok_or(SettingsError::Missing {
            key: "store.project_id",
            env: "ORDERDESK_PROJECT_ID",
        })?;
        let database_id = pick(
            &overrides.database_id,
            "ORDERDESK_DATABASE_ID",
            file.store.database_id,
        )
        .ok_or(SettingsError::Missing {
            key: "store.database_id",
            env: "ORDERDESK_DATABASE_ID",
        })?;
        let api_key = pick(&None, "ORDERDESK_API_KEY", file.store.api_key);

        let max_attempts = file.writes.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(SettingsError::Invalid {
                key: "writes.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }

        let defaults = Collections::default();
        Ok(Settings {
            rest: RestConfig {
                endpoint: endpoint.trim_end_matches('/').to_string(),
                project_id,
                database_id,
                api_key,
            },
            collections: Collections {
                orders: file.collections.orders.unwrap_or(defaults.orders),
                config: file.collections.config.unwrap_or(defaults.config),
            },
            max_attempts,
        })
    }
}

fn read_file(path: &Path) -> Result<SettingsFile, SettingsError> {
    let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
