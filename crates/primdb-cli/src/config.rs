//! Configuration file support for the CLI.
//!
//! Loads and saves CLI configuration from TOML files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use primdb_common::config::DatabaseConfig;

use crate::formatter::OutputFormat;

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Keep everything in memory instead of on disk.
    #[serde(skip)]
    pub in_memory: bool,

    /// Default output format.
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Enable timing by default.
    #[serde(default)]
    pub timing: bool,

    /// Ask before `delete` and `drop_table` in interactive mode.
    #[serde(default = "default_confirm")]
    pub confirm_destructive: bool,

    /// History file path.
    #[serde(default)]
    pub history_file: Option<PathBuf>,

    /// Maximum history size.
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

fn default_confirm() -> bool {
    true
}

fn default_history_size() -> usize {
    1000
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            in_memory: false,
            output_format: OutputFormat::default(),
            timing: false,
            confirm_destructive: default_confirm(),
            history_file: None,
            history_size: default_history_size(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Saves configuration to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("cannot write config file {}", path.display()))?;
        Ok(())
    }

    /// Loads the default configuration file.
    ///
    /// Looks in the following locations:
    /// 1. `<config dir>/primdb/config.toml` (`~/.config` on Linux)
    /// 2. `~/.primdb/config.toml`
    /// 3. Returns default if not found
    pub fn load_default() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Returns the config file locations searched by
    /// [`load_default`](Self::load_default), in order.
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("primdb").join("config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".primdb").join("config.toml"));
        }
        paths
    }

    /// Returns the history file, falling back to the platform data dir.
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file
            .clone()
            .or_else(|| dirs::data_local_dir().map(|dir| dir.join("primdb").join("history")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.database.data_dir, PathBuf::from("./data"));
        assert_eq!(config.output_format, OutputFormat::Table);
        assert!(config.confirm_destructive);
        assert!(!config.timing);
        assert_eq!(config.history_size, 1000);
    }

    #[test]
    fn test_history_path() {
        let config = CliConfig {
            history_file: Some(PathBuf::from("/tmp/db/history")),
            ..CliConfig::default()
        };
        assert_eq!(config.history_path(), Some(PathBuf::from("/tmp/db/history")));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = CliConfig {
            database: DatabaseConfig::with_data_dir("/srv/primdb"),
            output_format: OutputFormat::Csv,
            in_memory: true,
            ..CliConfig::default()
        };

        config.save(&path).unwrap();

        // `in_memory` only comes from the command line.
        let loaded = CliConfig::from_file(&path).unwrap();
        assert_eq!(loaded, CliConfig { in_memory: false, ..config });
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            output_format = "json"
            timing = true
            confirm_destructive = false

            [database]
            data_dir = "/var/lib/primdb"
            cache_enabled = false
        "#;

        let config: CliConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.output_format, OutputFormat::Json);
        assert!(config.timing);
        assert!(!config.confirm_destructive);
        assert_eq!(config.database.data_dir, PathBuf::from("/var/lib/primdb"));
        assert_eq!(
            config.database.metadata_path(),
            PathBuf::from("/var/lib/primdb/db_meta.json")
        );
        assert!(!config.database.cache_enabled);
    }

    #[test]
    fn test_bad_file_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "timing = \"sometimes\"").unwrap();

        let err = CliConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
