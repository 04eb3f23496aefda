//! Error handling for primdb.
//!
//! This module provides the error taxonomy and the result alias used
//! across all primdb components.

mod database;

pub use database::{DbError, ErrorCode, ParseError, SchemaError, StorageError, ValidationError};

/// Result type alias for primdb operations.
pub type DbResult<T> = std::result::Result<T, DbError>;
