//! Session management.
//!
//! A [`Session`] is one user's run of the database: it owns the catalog,
//! the persistence gateway, and the query result cache, and turns each
//! command into engine calls.
//!
//! Every command runs to completion before the next one starts. A command
//! that fails leaves the catalog and all rows as they were: writes are
//! computed on a copy and only committed after they have been saved. A new
//! table starts from an empty row file, so rows left behind by an earlier
//! table of the same name never come back.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use primdb_cache::{CacheKey, CacheStats, QueryCache};
use primdb_common::config::DatabaseConfig;
use primdb_common::error::DbResult;
use primdb_common::types::{Assignments, Filter, Row, Value};

use crate::parser::{Command, Parser};
use crate::result::{QueryResult, StatementResult};
use crate::storage::{
    engine, Catalog, CreateOutcome, DropOutcome, JsonFileStore, MemoryStore, Persistence, RowSet,
};

/// Help text listing every command.
pub const HELP_TEXT: &str = "\
Commands:
  create_table <table> <col:type> ...                 create a table (types: int, str, bool)
  list_tables                                         list all tables
  drop_table <table>                                  drop a table
  insert into <table> values (<v1>, <v2>, ...)        add a row
  select from <table> [where <col> = <value>]         show rows
  update <table> set <col>=<v>[, ...] where <col>=<v> change rows
  delete from <table> where <col> = <value>           remove rows
  info <table>                                        describe a table
  help                                                show this help
  exit                                                leave the program

Strings must be quoted: \"Ann\" or 'Ann'. Booleans are true/false.";

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Whether `select` results are memoized between writes.
    pub cache_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
        }
    }
}

impl From<&DatabaseConfig> for SessionConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            cache_enabled: config.cache_enabled,
        }
    }
}

/// A database session.
pub struct Session<P: Persistence> {
    /// Persistence gateway.
    store: P,
    /// In-memory catalog, saved after every change.
    catalog: Catalog,
    /// Memoized `select` results.
    cache: QueryCache<Vec<Row>>,
    /// Configuration.
    config: SessionConfig,
    /// Statement counter.
    statement_count: u64,
}

impl Session<JsonFileStore> {
    /// Opens a session on JSON files under `config.data_dir`.
    pub fn open_dir(config: &DatabaseConfig) -> DbResult<Self> {
        config.validate()?;
        Self::open(JsonFileStore::new(config), SessionConfig::from(config))
    }

    /// Opens a session on JSON files under `data_dir` with default settings.
    pub fn open_path(data_dir: impl AsRef<Path>) -> DbResult<Self> {
        Self::open_dir(&DatabaseConfig::with_data_dir(data_dir.as_ref()))
    }
}

impl Session<MemoryStore> {
    /// Opens a session that keeps everything in memory.
    pub fn in_memory() -> Self {
        Self {
            store: MemoryStore::new(),
            catalog: Catalog::new(),
            cache: QueryCache::new(),
            config: SessionConfig::default(),
            statement_count: 0,
        }
    }
}

impl<P: Persistence> Session<P> {
    /// Opens a session, loading the catalog from `store`.
    pub fn open(store: P, config: SessionConfig) -> DbResult<Self> {
        let catalog = store.load_metadata()?;
        debug!(tables = catalog.len(), "catalog loaded");

        Ok(Self {
            store,
            catalog,
            cache: QueryCache::new(),
            config,
            statement_count: 0,
        })
    }

    /// Returns the catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the persistence gateway.
    pub fn store(&self) -> &P {
        &self.store
    }

    /// Returns query cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Returns the number of commands executed, failed ones included.
    pub fn statement_count(&self) -> u64 {
        self.statement_count
    }

    /// Parses and executes one command line.
    pub fn execute(&mut self, line: &str) -> DbResult<StatementResult> {
        let command = Parser::parse(line)?;
        self.execute_command(command)
    }

    /// Executes a parsed command.
    pub fn execute_command(&mut self, command: Command) -> DbResult<StatementResult> {
        self.statement_count += 1;
        let start = Instant::now();
        let name = command.name();
        debug!(command = ?command, "executing");

        let result = match command {
            Command::CreateTable { table, columns } => self.execute_create_table(table, &columns),
            Command::DropTable { table } => self.execute_drop_table(table),
            Command::ListTables => Ok(StatementResult::Tables(self.catalog.list_tables())),
            Command::Info { table } => self.execute_info(table),
            Command::Insert { table, values } => self.execute_insert(table, values),
            Command::Select { table, filter } => self.execute_select(table, filter),
            Command::Update {
                table,
                assignments,
                filter,
            } => self.execute_update(table, &assignments, filter),
            Command::Delete { table, filter } => self.execute_delete(table, filter),
            Command::Help => Ok(StatementResult::Help(HELP_TEXT)),
            Command::Exit => Ok(StatementResult::Exit),
        };

        let elapsed = start.elapsed();
        match &result {
            Ok(_) => debug!(command = name, ?elapsed, "command finished"),
            Err(e) => debug!(command = name, ?elapsed, error = %e, "command failed"),
        }
        result
    }

    fn execute_create_table(
        &mut self,
        table: String,
        columns: &[String],
    ) -> DbResult<StatementResult> {
        let mut catalog = self.catalog.clone();
        match catalog.create_table(&table, columns)? {
            CreateOutcome::Created(schema) => {
                self.store.save_rows(&table, &RowSet::new())?;
                self.store.save_metadata(&catalog)?;
                self.catalog = catalog;
                info!(table = %table, columns = %schema, "table created");
                Ok(StatementResult::Created { table, schema })
            }
            CreateOutcome::AlreadyExists => {
                warn!(table = %table, "table already exists");
                Ok(StatementResult::AlreadyExists { table })
            }
        }
    }

    fn execute_drop_table(&mut self, table: String) -> DbResult<StatementResult> {
        let mut catalog = self.catalog.clone();
        match catalog.drop_table(&table) {
            DropOutcome::Dropped(_) => {
                self.store.drop_rows(&table)?;
                self.cache.invalidate();
                self.store.save_metadata(&catalog)?;
                self.catalog = catalog;
                info!(table = %table, "table dropped");
                Ok(StatementResult::Dropped { table })
            }
            DropOutcome::NotFound => {
                warn!(table = %table, "drop of missing table");
                Ok(StatementResult::NotFound { table })
            }
        }
    }

    fn execute_info(&self, table: String) -> DbResult<StatementResult> {
        let schema = self.catalog.schema(&table)?.clone();
        let row_count = self.store.load_rows(&table)?.len();
        Ok(StatementResult::Info {
            table,
            schema,
            row_count,
        })
    }

    fn execute_insert(&mut self, table: String, values: Vec<Value>) -> DbResult<StatementResult> {
        let mut rows = self.store.load_rows(&table)?;
        let id = engine::insert(&self.catalog, &table, &mut rows, values)?
            .id()
            .unwrap_or_default();

        self.store.save_rows(&table, &rows)?;
        self.cache.invalidate();
        debug!(table = %table, id, "row inserted");
        Ok(StatementResult::Inserted { table, id })
    }

    fn execute_select(
        &self,
        table: String,
        filter: Option<Filter>,
    ) -> DbResult<StatementResult> {
        let schema = self.catalog.schema(&table)?.clone();

        let load = || -> DbResult<Vec<Row>> {
            let rows = self.store.load_rows(&table)?;
            Ok(engine::select(&rows, filter.as_ref()))
        };
        let rows = if self.config.cache_enabled {
            let key = CacheKey::new(table.as_str(), filter.as_ref());
            self.cache.try_get_or_compute(key, load)?
        } else {
            Arc::new(load()?)
        };

        debug!(table = %table, rows = rows.len(), "rows selected");
        Ok(StatementResult::Query(QueryResult {
            table,
            schema,
            rows,
        }))
    }

    fn execute_update(
        &mut self,
        table: String,
        assignments: &Assignments,
        filter: Filter,
    ) -> DbResult<StatementResult> {
        self.catalog.schema(&table)?;
        let mut rows = self.store.load_rows(&table)?;
        let count = engine::update(&self.catalog, &table, &mut rows, assignments, &filter)?;

        self.store.save_rows(&table, &rows)?;
        self.cache.invalidate();
        debug!(table = %table, count, "rows updated");
        Ok(StatementResult::Updated {
            table,
            count,
            filter,
        })
    }

    fn execute_delete(&mut self, table: String, filter: Filter) -> DbResult<StatementResult> {
        self.catalog.schema(&table)?;
        let mut rows = self.store.load_rows(&table)?;
        let count = engine::delete(&mut rows, &filter);

        self.store.save_rows(&table, &rows)?;
        self.cache.invalidate();
        debug!(table = %table, count, "rows deleted");
        Ok(StatementResult::Deleted {
            table,
            count,
            filter,
        })
    }
}

impl<P: Persistence> std::fmt::Debug for Session<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("tables", &self.catalog.len())
            .field("cached_queries", &self.cache.len())
            .field("config", &self.config)
            .field("statement_count", &self.statement_count)
            .finish()
    }
}
