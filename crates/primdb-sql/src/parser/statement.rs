//! Parsed commands.

use primdb_common::types::{Assignments, Filter, Value};

/// A command, as produced by the parser.
///
/// This is the closed set of things a session can be asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `insert into <table> values (<v1>, <v2>, ...)`
    Insert {
        /// Target table.
        table: String,
        /// Values for every non-`ID` column, in schema order.
        values: Vec<Value>,
    },
    /// `select from <table> [where <col> = <value>]`
    Select {
        /// Source table.
        table: String,
        /// Optional filter; `None` selects every row.
        filter: Option<Filter>,
    },
    /// `update <table> set <col>=<v>[, ...] where <col>=<value>`
    Update {
        /// Target table.
        table: String,
        /// Column assignments.
        assignments: Assignments,
        /// Rows to update.
        filter: Filter,
    },
    /// `delete from <table> where <col> = <value>`
    Delete {
        /// Target table.
        table: String,
        /// Rows to delete.
        filter: Filter,
    },
    /// `info <table>`
    Info {
        /// Table to describe.
        table: String,
    },
    /// `list_tables`
    ListTables,
    /// `create_table <table> <col:type> ...`
    CreateTable {
        /// Table to create.
        table: String,
        /// Raw `name:type` specs, validated by the engine.
        columns: Vec<String>,
    },
    /// `drop_table <table>`
    DropTable {
        /// Table to drop.
        table: String,
    },
    /// `help`
    Help,
    /// `exit`
    Exit,
}

impl Command {
    /// Returns the command keyword.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Insert { .. } => "insert",
            Command::Select { .. } => "select",
            Command::Update { .. } => "update",
            Command::Delete { .. } => "delete",
            Command::Info { .. } => "info",
            Command::ListTables => "list_tables",
            Command::CreateTable { .. } => "create_table",
            Command::DropTable { .. } => "drop_table",
            Command::Help => "help",
            Command::Exit => "exit",
        }
    }

    /// Returns the table the command operates on, if any.
    pub fn table(&self) -> Option<&str> {
        match self {
            Command::Insert { table, .. }
            | Command::Select { table, .. }
            | Command::Update { table, .. }
            | Command::Delete { table, .. }
            | Command::Info { table }
            | Command::CreateTable { table, .. }
            | Command::DropTable { table } => Some(table),
            Command::ListTables | Command::Help | Command::Exit => None,
        }
    }

    /// Returns true if the command changes rows and so invalidates cached
    /// query results.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Command::Insert { .. }
                | Command::Update { .. }
                | Command::Delete { .. }
                | Command::DropTable { .. }
        )
    }

    /// Returns true if the command destroys data and warrants a
    /// confirmation prompt in interactive use.
    pub fn is_destructive(&self) -> bool {
        matches!(self, Command::Delete { .. } | Command::DropTable { .. })
    }
}
