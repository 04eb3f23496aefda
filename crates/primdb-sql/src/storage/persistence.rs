//! Persistence gateway.
//!
//! The session loads and saves state only through [`Persistence`]. Two
//! implementations are provided:
//!
//! - [`JsonFileStore`] keeps the catalog in one JSON file and each table's
//!   rows in `tables/<name>.json` under the data directory
//! - [`MemoryStore`] keeps everything in memory, for tests and throwaway
//!   sessions
//!
//! # On-disk layout
//!
//! ```text
//! data/
//! ├── db_meta.json        {"tables": {"users": {"structure": [{"name": "ID", "type": "int"}, ...]}}}
//! └── tables/
//!     └── users.json      [{"ID": 1, "name": "Ann", "active": true}, ...]
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;

use primdb_common::config::DatabaseConfig;
use primdb_common::constants::TABLE_FILE_EXTENSION;
use primdb_common::error::{DbResult, StorageError};

use super::catalog::Catalog;
use super::table::RowSet;

/// Durable storage for the catalog and row sets.
pub trait Persistence {
    /// Loads the catalog; an empty catalog if nothing was saved yet.
    fn load_metadata(&self) -> DbResult<Catalog>;

    /// Saves the catalog.
    fn save_metadata(&self, catalog: &Catalog) -> DbResult<()>;

    /// Loads a table's rows; empty if nothing was saved yet.
    fn load_rows(&self, table: &str) -> DbResult<RowSet>;

    /// Saves a table's rows.
    fn save_rows(&self, table: &str, rows: &RowSet) -> DbResult<()>;

    /// Forgets a table's rows. Missing rows are not an error.
    fn drop_rows(&self, table: &str) -> DbResult<()>;
}

/// JSON files under a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    metadata_path: PathBuf,
    tables_dir: PathBuf,
}

impl JsonFileStore {
    /// Creates a store for the configured data directory.
    ///
    /// Nothing is touched on disk until the first save.
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            metadata_path: config.metadata_path(),
            tables_dir: config.tables_dir(),
        }
    }

    /// Returns the path of the catalog file.
    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    /// Returns the path of a table's row file.
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.tables_dir
            .join(format!("{table}.{TABLE_FILE_EXTENSION}"))
    }

    fn read_json<T: DeserializeOwned + Default>(path: &Path) -> DbResult<T> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: path.to_path_buf(),
                    source,
                }
                .into())
            }
        };

        serde_json::from_str(&text).map_err(|source| {
            StorageError::Serialization {
                path: path.to_path_buf(),
                source,
            }
            .into()
        })
    }

    fn write_json<T: Serialize>(path: &Path, value: &T) -> DbResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let text = serde_json::to_string_pretty(value).map_err(|source| {
            StorageError::Serialization {
                path: path.to_path_buf(),
                source,
            }
        })?;

        fs::write(path, text).map_err(|source| {
            StorageError::Io {
                path: path.to_path_buf(),
                source,
            }
            .into()
        })
    }
}

impl Persistence for JsonFileStore {
    fn load_metadata(&self) -> DbResult<Catalog> {
        Self::read_json(&self.metadata_path)
    }

    fn save_metadata(&self, catalog: &Catalog) -> DbResult<()> {
        Self::write_json(&self.metadata_path, catalog)
    }

    fn load_rows(&self, table: &str) -> DbResult<RowSet> {
        Self::read_json(&self.table_path(table))
    }

    fn save_rows(&self, table: &str, rows: &RowSet) -> DbResult<()> {
        Self::write_json(&self.table_path(table), rows)
    }

    fn drop_rows(&self, table: &str) -> DbResult<()> {
        let path = self.table_path(table);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }.into()),
        }
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    catalog: RwLock<Catalog>,
    rows: RwLock<HashMap<String, RowSet>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persistence for MemoryStore {
    fn load_metadata(&self) -> DbResult<Catalog> {
        Ok(self.catalog.read().clone())
    }

    fn save_metadata(&self, catalog: &Catalog) -> DbResult<()> {
        *self.catalog.write() = catalog.clone();
        Ok(())
    }

    fn load_rows(&self, table: &str) -> DbResult<RowSet> {
        Ok(self.rows.read().get(table).cloned().unwrap_or_default())
    }

    fn save_rows(&self, table: &str, rows: &RowSet) -> DbResult<()> {
        self.rows.write().insert(table.to_string(), rows.clone());
        Ok(())
    }

    fn drop_rows(&self, table: &str) -> DbResult<()> {
        self.rows.write().remove(table);
        Ok(())
    }
}
