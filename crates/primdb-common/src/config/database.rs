//! Database configuration structures.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{DEFAULT_DATA_DIR, DEFAULT_METADATA_FILE, TABLES_DIR};
use crate::error::{DbError, DbResult};

/// Main database configuration.
///
/// # Example
///
/// ```rust
/// use primdb_common::config::DatabaseConfig;
///
/// let config = DatabaseConfig::with_data_dir("/var/lib/primdb");
/// assert!(config.metadata_path().ends_with("db_meta.json"));
/// assert!(config.cache_enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Directory holding the catalog and the per-table row files.
    pub data_dir: PathBuf,

    /// Catalog file name. Relative paths resolve against `data_dir`.
    pub metadata_file: PathBuf,

    /// Whether `select` results are memoized between writes.
    pub cache_enabled: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            metadata_file: PathBuf::from(DEFAULT_METADATA_FILE),
            cache_enabled: true,
        }
    }
}

impl DatabaseConfig {
    /// Creates a new configuration with the specified data directory.
    #[must_use]
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Returns the full path of the catalog file.
    #[must_use]
    pub fn metadata_path(&self) -> PathBuf {
        if self.metadata_file.is_absolute() {
            self.metadata_file.clone()
        } else {
            self.data_dir.join(&self.metadata_file)
        }
    }

    /// Returns the directory holding per-table row files.
    #[must_use]
    pub fn tables_dir(&self) -> PathBuf {
        self.data_dir.join(TABLES_DIR)
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> DbResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(invalid("data_dir must not be empty"));
        }

        if self.metadata_file.as_os_str().is_empty() {
            return Err(invalid("metadata_file must not be empty"));
        }

        if self.metadata_path().parent() == Some(self.tables_dir().as_path()) {
            return Err(invalid("metadata_file must not live inside the tables directory"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> DbError {
    DbError::InvalidConfig {
        message: message.to_string(),
    }
}
