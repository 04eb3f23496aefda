//! # primdb-common
//!
//! Common types, errors, and configuration for primdb.
//!
//! This crate provides the foundational pieces used across all primdb
//! components:
//!
//! - **Types**: the closed scalar type system (`ScalarType`, `Value`),
//!   literal parsing and validation, `Row`, and `Filter`
//! - **Errors**: the unified error taxonomy rooted at `DbError`
//! - **Config**: database configuration (`DatabaseConfig`)
//! - **Constants**: reserved names and file layout defaults
//!
//! ## Example
//!
//! ```rust
//! use primdb_common::types::{parse_literal, validate, ScalarType, Value};
//! use primdb_common::error::DbResult;
//!
//! fn example() -> DbResult<()> {
//!     let value = parse_literal("\"hello\"")?;
//!     assert_eq!(value, Value::Text("hello".to_string()));
//!     validate(&value, ScalarType::Text)?;
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items at the crate root
pub use constants::*;
pub use error::{DbError, DbResult};
pub use types::{Filter, Row, ScalarType, Value};
