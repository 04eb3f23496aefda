//! Command parser for primdb.
//!
//! Turns one line of text into exactly one [`Command`]. Parsing is pure: it
//! never looks at the catalog or at any rows, so `insert into nope values (1)`
//! parses fine and only fails later in the engine.
//!
//! # Grammar
//!
//! Keywords are case-insensitive, identifiers are `[A-Za-z0-9_]+` and
//! case-sensitive. Values use the literal syntax of
//! [`parse_literal`](primdb_common::types::parse_literal).
//!
//! ```text
//! insert into <table> values (<v1>, <v2>, ...)
//! select from <table> [where <col> = <value>]
//! update <table> set <col1>=<v1>[, <col2>=<v2>, ...] where <col>=<value>
//! delete from <table> where <col> = <value>
//! info <table>
//! list_tables
//! create_table <table> <col:type> [<col:type> ...]
//! drop_table <table>
//! help
//! exit
//! ```
//!
//! The leading keyword selects the command shape. A line whose first word
//! is not a command keyword is a [`ParseError::UnrecognizedCommand`]; a line
//! that starts like a command but does not finish like one is a
//! [`ParseError::Malformed`] naming the offending segment.
//!
//! # Usage
//!
//! ```
//! use primdb_sql::parser::{Command, Parser};
//! use primdb_common::types::{Filter, Value};
//!
//! let command = Parser::parse("select from users where name = \"Ann\"").unwrap();
//! assert_eq!(
//!     command,
//!     Command::Select {
//!         table: "users".to_string(),
//!         filter: Some(Filter::equals("name", "Ann")),
//!     }
//! );
//! ```

mod scanner;
mod statement;

pub use statement::Command;

pub(crate) use scanner::is_identifier;

use primdb_common::error::{DbResult, ParseError};
use primdb_common::types::{parse_literal, Assignments, Filter, Value};

use scanner::{split_at_keyword, split_outside_quotes, Cursor};

/// Command parser for primdb.
pub struct Parser;

impl Parser {
    /// Parses one line into a command.
    pub fn parse(line: &str) -> DbResult<Command> {
        let mut cursor = Cursor::new(line);

        if cursor.eat_keyword("insert") {
            Self::parse_insert(&mut cursor)
        } else if cursor.eat_keyword("select") {
            Self::parse_select(&mut cursor)
        } else if cursor.eat_keyword("update") {
            Self::parse_update(&mut cursor)
        } else if cursor.eat_keyword("delete") {
            Self::parse_delete(&mut cursor)
        } else if cursor.eat_keyword("info") {
            let table = Self::table_name(&mut cursor, "info")?;
            Self::expect_end(&cursor, "info")?;
            Ok(Command::Info { table })
        } else if cursor.eat_keyword("list_tables") {
            Self::expect_end(&cursor, "list_tables")?;
            Ok(Command::ListTables)
        } else if cursor.eat_keyword("create_table") {
            Self::parse_create_table(&cursor)
        } else if cursor.eat_keyword("drop_table") {
            Self::parse_drop_table(&cursor)
        } else if cursor.eat_keyword("help") {
            Self::expect_end(&cursor, "help")?;
            Ok(Command::Help)
        } else if cursor.eat_keyword("exit") {
            Self::expect_end(&cursor, "exit")?;
            Ok(Command::Exit)
        } else {
            Err(ParseError::UnrecognizedCommand(line.trim().to_string()).into())
        }
    }

    fn parse_insert(cursor: &mut Cursor<'_>) -> DbResult<Command> {
        if !cursor.eat_keyword("into") {
            return Err(ParseError::malformed("insert", "expected `into <table>`").into());
        }
        let table = Self::table_name(cursor, "insert")?;
        if !cursor.eat_keyword("values") {
            return Err(ParseError::malformed("insert", "expected `values (...)`").into());
        }

        let values = Self::parse_values_list(cursor.rest())?;
        Ok(Command::Insert { table, values })
    }

    fn parse_select(cursor: &mut Cursor<'_>) -> DbResult<Command> {
        if !cursor.eat_keyword("from") {
            return Err(ParseError::malformed("select", "expected `from <table>`").into());
        }
        let table = Self::table_name(cursor, "select")?;

        if cursor.is_at_end() {
            return Ok(Command::Select {
                table,
                filter: None,
            });
        }
        if !cursor.eat_keyword("where") {
            return Err(ParseError::malformed(
                "select",
                format!("unexpected `{}`", cursor.rest().trim()),
            )
            .into());
        }

        let filter = Self::parse_where(cursor.rest())?;
        Ok(Command::Select {
            table,
            filter: Some(filter),
        })
    }

    fn parse_update(cursor: &mut Cursor<'_>) -> DbResult<Command> {
        let table = Self::table_name(cursor, "update")?;
        if !cursor.eat_keyword("set") {
            return Err(ParseError::malformed("update", "expected `set <col>=<value>`").into());
        }

        let (set_segment, where_segment) = split_at_keyword(cursor.rest(), "where")
            .ok_or_else(|| ParseError::malformed("update", "missing where clause"))?;

        let assignments = Self::parse_set(set_segment)?;
        let filter = Self::parse_where(where_segment)?;
        Ok(Command::Update {
            table,
            assignments,
            filter,
        })
    }

    fn parse_delete(cursor: &mut Cursor<'_>) -> DbResult<Command> {
        if !cursor.eat_keyword("from") {
            return Err(ParseError::malformed("delete", "expected `from <table>`").into());
        }
        let table = Self::table_name(cursor, "delete")?;
        if !cursor.eat_keyword("where") {
            return Err(ParseError::malformed("delete", "missing where clause").into());
        }

        let filter = Self::parse_where(cursor.rest())?;
        Ok(Command::Delete { table, filter })
    }

    fn parse_create_table(cursor: &Cursor<'_>) -> DbResult<Command> {
        let mut words = cursor.rest().split_whitespace();
        let table = words
            .next()
            .ok_or_else(|| ParseError::malformed("create_table", "expected a table name"))?;
        Self::check_identifier(table, "create_table")?;

        let columns: Vec<String> = words.map(str::to_string).collect();
        if columns.is_empty() {
            return Err(ParseError::malformed(
                "create_table",
                "expected at least one <column>:<type>",
            )
            .into());
        }

        Ok(Command::CreateTable {
            table: table.to_string(),
            columns,
        })
    }

    fn parse_drop_table(cursor: &Cursor<'_>) -> DbResult<Command> {
        let words: Vec<&str> = cursor.rest().split_whitespace().collect();
        match words.as_slice() {
            [table] => {
                Self::check_identifier(table, "drop_table")?;
                Ok(Command::DropTable {
                    table: table.to_string(),
                })
            }
            _ => Err(ParseError::malformed("drop_table", "expected exactly one table name").into()),
        }
    }

    /// Parses `(<v1>, <v2>, ...)`.
    fn parse_values_list(segment: &str) -> DbResult<Vec<Value>> {
        let s = segment.trim();
        let inner = s
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(|| {
                ParseError::malformed("values list", "expected values in parentheses: (v1, v2, ...)")
            })?;

        if inner.trim().is_empty() {
            return Err(ParseError::malformed("values list", "no values given").into());
        }

        split_outside_quotes(inner, ',')
            .into_iter()
            .map(|token| -> DbResult<Value> {
                if token.is_empty() {
                    return Err(ParseError::malformed("values list", "empty value").into());
                }
                Ok(parse_literal(token)?)
            })
            .collect()
    }

    /// Parses `<col> = <value>`.
    fn parse_where(segment: &str) -> DbResult<Filter> {
        let (column, value) = Self::parse_pair(segment).ok_or_else(|| {
            ParseError::malformed(
                "where clause",
                format!("expected <column> = <value>, got `{}`", segment.trim()),
            )
        })?;
        Ok(Filter::equals(column, parse_literal(value)?))
    }

    /// Parses `<col1>=<v1>[, <col2>=<v2>, ...]`.
    fn parse_set(segment: &str) -> DbResult<Assignments> {
        let mut assignments = Assignments::new();
        for part in split_outside_quotes(segment, ',') {
            let (column, value) = Self::parse_pair(part).ok_or_else(|| {
                ParseError::malformed("set clause", format!("invalid assignment `{part}`"))
            })?;
            assignments.insert(column.to_string(), parse_literal(value)?);
        }
        Ok(assignments)
    }

    /// Splits `<ident> = <rest>` into its parts; `rest` is non-empty.
    fn parse_pair(segment: &str) -> Option<(&str, &str)> {
        let mut cursor = Cursor::new(segment);
        let column = cursor.ident()?;
        if !cursor.eat_char('=') {
            return None;
        }
        let value = cursor.rest().trim();
        (!value.is_empty()).then_some((column, value))
    }

    fn table_name(cursor: &mut Cursor<'_>, command: &'static str) -> DbResult<String> {
        cursor
            .ident()
            .map(str::to_string)
            .ok_or_else(|| ParseError::malformed(command, "expected a table name").into())
    }

    fn check_identifier(name: &str, command: &'static str) -> DbResult<()> {
        if is_identifier(name) {
            Ok(())
        } else {
            Err(ParseError::malformed(command, format!("invalid table name `{name}`")).into())
        }
    }

    fn expect_end(cursor: &Cursor<'_>, command: &'static str) -> DbResult<()> {
        if cursor.is_at_end() {
            Ok(())
        } else {
            Err(ParseError::malformed(
                command,
                format!("unexpected `{}`", cursor.rest().trim()),
            )
            .into())
        }
    }
}
