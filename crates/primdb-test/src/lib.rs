//! # primdb-test
//!
//! Integration tests for primdb.
//!
//! This crate contains:
//! - End-to-end tests driving a [`Session`] through the command language
//! - Helpers for opening throwaway databases on disk

#![warn(missing_docs)]
#![warn(clippy::all)]

use tempfile::TempDir;

use primdb_common::config::DatabaseConfig;
use primdb_common::error::DbResult;
use primdb_common::types::Row;
use primdb_sql::storage::{JsonFileStore, Persistence};
use primdb_sql::{Session, StatementResult};

/// A database in a temporary directory, removed on drop.
pub struct TestDb {
    dir: TempDir,
}

impl TestDb {
    /// Creates an empty database directory.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    /// Returns the database configuration.
    pub fn config(&self) -> DatabaseConfig {
        DatabaseConfig::with_data_dir(self.dir.path())
    }

    /// Opens a session on the directory. Several sessions may be opened in
    /// turn to check what survives a restart.
    pub fn open(&self) -> DbResult<Session<JsonFileStore>> {
        Session::open_dir(&self.config())
    }
}

/// Runs every line in order, failing on the first error.
pub fn run_all<P: Persistence>(
    session: &mut Session<P>,
    lines: &[&str],
) -> DbResult<Vec<StatementResult>> {
    lines.iter().map(|line| session.execute(line)).collect()
}

/// Runs a `select` and returns its rows.
///
/// # Panics
///
/// Panics if the line is not a `select` or fails.
pub fn select<P: Persistence>(session: &mut Session<P>, line: &str) -> Vec<Row> {
    match session.execute(line) {
        Ok(StatementResult::Query(result)) => result.rows.as_ref().clone(),
        Ok(other) => panic!("{line:?} did not return rows: {other:?}"),
        Err(e) => panic!("{line:?} failed: {e}"),
    }
}
