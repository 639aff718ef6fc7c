// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Configuration persistence for k8pick
//!
//! Stores user preferences like the last selected account in a config
//! file. All k8pick data is stored under ~/.k8pick/:
//! - ~/.k8pick/config.json - user configuration
//! - ~/.k8pick/log/ - log files

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Get the base k8pick directory (~/.k8pick/)
pub fn base_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|p| p.join(".k8pick"))
        .context("Could not determine home directory")
}

/// Atomically write content to a file using tempfile + rename
///
/// Creates a temporary file in the same directory, writes content, then
/// renames it to the final path, so other processes see either the old or
/// the new content, never a partial write.
fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new_in(path.parent().unwrap_or_else(|| Path::new(".")))
        .context("Failed to create temp file")?;

    std::fs::write(temp_file.path(), content)
        .with_context(|| format!("Failed to write temp file {:?}", temp_file.path()))?;

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to persist file to {:?}", path))?;

    Ok(())
}

/// k8pick configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Account selected in the last editing session
    #[serde(default)]
    pub last_account: Option<String>,
    /// Namespace selected in the last editing session
    #[serde(default)]
    pub last_namespace: Option<String>,
}

impl Config {
    /// Load config from disk, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        atomic_write(&path, content.as_bytes())
    }

    fn config_path() -> Result<PathBuf> {
        Ok(base_dir()?.join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_empty() {
        let config = Config::default();
        assert_eq!(config.last_account, None);
        assert_eq!(config.last_namespace, None);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = Config {
            last_account: Some("prod".to_string()),
            last_namespace: Some("default".to_string()),
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.last_account.as_deref(), Some("prod"));
        assert_eq!(back.last_namespace.as_deref(), Some("default"));
    }

    #[test]
    fn test_config_tolerates_missing_fields() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.last_account, None);
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        atomic_write(&path, b"first").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");

        atomic_write(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }
}
