//! Command execution results.

use std::fmt;
use std::sync::Arc;

use primdb_common::constants::ID_COLUMN;
use primdb_common::types::{Filter, Row, Value};

use crate::storage::TableSchema;

/// Result of executing a command.
#[derive(Debug, Clone)]
pub enum StatementResult {
    /// Table created.
    Created {
        /// Table name.
        table: String,
        /// The registered schema, `ID` first.
        schema: TableSchema,
    },
    /// `create_table` on a name that is taken; nothing changed.
    AlreadyExists {
        /// Table name.
        table: String,
    },
    /// Table dropped.
    Dropped {
        /// Table name.
        table: String,
    },
    /// `drop_table` on a missing table; nothing changed.
    NotFound {
        /// Table name.
        table: String,
    },
    /// Table names in creation order.
    Tables(Vec<String>),
    /// Table description.
    Info {
        /// Table name.
        table: String,
        /// Table schema.
        schema: TableSchema,
        /// Number of stored rows.
        row_count: usize,
    },
    /// Row inserted.
    Inserted {
        /// Table name.
        table: String,
        /// `ID` of the new row.
        id: i64,
    },
    /// `select` result.
    Query(QueryResult),
    /// Rows updated.
    Updated {
        /// Table name.
        table: String,
        /// Rows touched.
        count: usize,
        /// Filter the update was applied with.
        filter: Filter,
    },
    /// Rows deleted.
    Deleted {
        /// Table name.
        table: String,
        /// Rows removed.
        count: usize,
        /// Filter the delete was applied with.
        filter: Filter,
    },
    /// Help text.
    Help(&'static str),
    /// End of session requested.
    Exit,
}

impl StatementResult {
    /// Returns the number of rows affected, if applicable.
    pub fn rows_affected(&self) -> Option<usize> {
        match self {
            StatementResult::Inserted { .. } => Some(1),
            StatementResult::Updated { count, .. } | StatementResult::Deleted { count, .. } => {
                Some(*count)
            }
            StatementResult::Query(result) => Some(result.len()),
            _ => None,
        }
    }

    /// Returns the query result if this is a `select`.
    pub fn as_query(&self) -> Option<&QueryResult> {
        match self {
            StatementResult::Query(result) => Some(result),
            _ => None,
        }
    }

    /// Returns true for [`StatementResult::Exit`].
    pub fn is_exit(&self) -> bool {
        matches!(self, StatementResult::Exit)
    }

    /// Returns true if the command was a tolerated no-op.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StatementResult::AlreadyExists { .. } | StatementResult::NotFound { .. }
        )
    }

    /// Human-readable confirmation of what happened.
    ///
    /// Query results are summarized by their row count; rendering the rows
    /// themselves is up to the caller.
    pub fn message(&self) -> String {
        match self {
            StatementResult::Created { table, schema } => {
                format!("Table \"{table}\" created with columns: {schema}.")
            }
            StatementResult::AlreadyExists { table } => {
                format!("Table \"{table}\" already exists.")
            }
            StatementResult::Dropped { table } => format!("Table \"{table}\" dropped."),
            StatementResult::NotFound { table } => format!("Table \"{table}\" does not exist."),
            StatementResult::Tables(names) => format!("tables - {}", names.join(", ")),
            StatementResult::Info {
                table,
                schema,
                row_count,
            } => format!("Table: {table}\nColumns: {schema}\nRows: {row_count}"),
            StatementResult::Inserted { table, id } => {
                format!("Record with ID={id} added to table \"{table}\".")
            }
            StatementResult::Query(result) if result.is_empty() => {
                "No rows match the query.".to_string()
            }
            StatementResult::Query(result) => format!("Rows: {}.", result.len()),
            StatementResult::Updated {
                table,
                count,
                filter,
            } => match single_id(*count, filter) {
                Some(id) => format!("Record with ID={id} in table \"{table}\" updated."),
                None => format!("Rows updated: {count}."),
            },
            StatementResult::Deleted {
                table,
                count,
                filter,
            } => match single_id(*count, filter) {
                Some(id) => format!("Record with ID={id} deleted from table \"{table}\"."),
                None => format!("Rows deleted: {count}."),
            },
            StatementResult::Help(text) => (*text).to_string(),
            StatementResult::Exit => "Bye.".to_string(),
        }
    }
}

impl fmt::Display for StatementResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// The `ID` in `filter` when exactly one row was touched through it.
fn single_id(count: usize, filter: &Filter) -> Option<&Value> {
    if count == 1 {
        filter.get(ID_COLUMN)
    } else {
        None
    }
}

/// Result of a `select`.
///
/// Rows are shared with the query cache, so repeated identical selects hand
/// out the same allocation.
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// Table queried.
    pub table: String,
    /// Table schema, giving column order.
    pub schema: TableSchema,
    /// Matching rows, in row order.
    pub rows: Arc<Vec<Row>>,
}

impl QueryResult {
    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no rows matched.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the column names in schema order.
    pub fn column_names(&self) -> Vec<&str> {
        self.schema.column_names()
    }

    /// Returns the first row if exists.
    pub fn first_row(&self) -> Option<&Row> {
        self.rows.first()
    }
}
