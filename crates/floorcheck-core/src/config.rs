//! Session configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use floorcheck_logic::catalog::EventCatalog;

use crate::persistence::RecordFormat;

/// Prefix shared by every event namespace written by this tool.
pub const NAMESPACE_PREFIX: &str = "convene_floor";

/// How completion is tracked while viewing "All Days".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllDaysPolicy {
    /// Read from the per-day flags; writes fan out to every day carrying
    /// the item.
    #[default]
    Projection,
    /// `all` is an independent slot, unrelated to any concrete day.
    SeparateSlot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageKind {
    /// Nothing survives the process.
    #[default]
    Memory,
    File { dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Key of the persisted record. Must be unique per event.
    pub namespace: String,
    pub storage: StorageKind,
    pub format: RecordFormat,
    pub all_days: AllDaysPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            namespace: NAMESPACE_PREFIX.to_string(),
            storage: StorageKind::default(),
            format: RecordFormat::default(),
            all_days: AllDaysPolicy::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Default config with a namespace derived from the event name, so two
    /// events sharing one store never see each other's checks.
    pub fn for_event(catalog: &EventCatalog) -> Self {
        Self {
            namespace: format!("{NAMESPACE_PREFIX}_{}", slug(&catalog.event().name)),
            ..Self::default()
        }
    }
}

fn slug(name: &str) -> String {
    let mut out = String::new();
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Session configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Namespace blank.
    EmptyNamespace,
    /// Namespace would escape the storage directory.
    InvalidNamespace(String),
    /// File storage without a directory.
    EmptyStorageDir,
}

/// Validate a session configuration, returning all errors found.
pub fn validate_config(config: &SessionConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    let ns = config.namespace.trim();
    if ns.is_empty() {
        errors.push(ConfigError::EmptyNamespace);
    } else if ns.contains(['/', '\\']) || ns.starts_with('.') {
        errors.push(ConfigError::InvalidNamespace(config.namespace.clone()));
    }

    if let StorageKind::File { dir } = &config.storage {
        if dir.as_os_str().is_empty() {
            errors.push(ConfigError::EmptyStorageDir);
        }
    }

    errors
}
