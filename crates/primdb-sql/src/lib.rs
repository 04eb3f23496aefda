//! # primdb-sql
//!
//! Command language, schema and row engine, and sessions for primdb.
//!
//! This crate implements:
//! - Command parsing (a small SQL-like dialect)
//! - Table schemas and row-level CRUD
//! - Persistence of the catalog and rows
//! - Sessions that dispatch commands and cache `select` results
//!
//! ## Example
//!
//! ```rust
//! use primdb_sql::{Session, StatementResult};
//!
//! let mut session = Session::in_memory();
//! session.execute("create_table users name:str active:bool").unwrap();
//! session.execute("insert into users values (\"Ann\", true)").unwrap();
//!
//! match session.execute("select from users where name = \"Ann\"").unwrap() {
//!     StatementResult::Query(result) => assert_eq!(result.first_row().unwrap().id(), Some(1)),
//!     other => panic!("unexpected result: {other}"),
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Command parser
pub mod parser;

/// Schema and row engine
pub mod storage;

/// Command execution results
pub mod result;

/// Sessions
pub mod session;

pub use parser::{Command, Parser};
pub use result::{QueryResult, StatementResult};
pub use session::{Session, SessionConfig, HELP_TEXT};
