//! Database error types.
//!
//! Errors are grouped the way the command pipeline fails: the parser
//! rejects text it cannot read, the engine rejects commands that do not fit
//! the catalog, validation rejects values that do not fit a column, and the
//! persistence layer reports I/O trouble. Every one of them aborts only the
//! command that raised it.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::ScalarType;

/// Error codes for categorizing errors.
///
/// These codes can be used for programmatic error handling and
/// are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Unknown or unspecified error.
    Unknown = 0x0000,
    /// Invalid configuration.
    InvalidConfig = 0x0001,

    // Parse errors (0x0100 - 0x01FF)
    /// The line matches no command shape.
    UnrecognizedCommand = 0x0100,
    /// A command shape matched but one of its segments is malformed.
    MalformedCommand = 0x0101,

    // Schema errors (0x0200 - 0x02FF)
    /// Table is not in the catalog.
    UnknownTable = 0x0200,
    /// Column spec is not `name:type`.
    InvalidColumnSpec = 0x0201,
    /// Column type is not one of the scalar types.
    UnknownType = 0x0202,
    /// Attempt to assign to the `ID` column.
    ImmutableColumn = 0x0203,
    /// Column is not part of the table schema.
    UnknownColumn = 0x0204,
    /// Column name appears twice in a schema.
    DuplicateColumn = 0x0205,

    // Validation errors (0x0300 - 0x03FF)
    /// Wrong number of values.
    ArityMismatch = 0x0300,
    /// Value type does not match the column type.
    TypeMismatch = 0x0301,
    /// Token is not a valid literal.
    InvalidLiteral = 0x0302,
    /// No `ID` is left above the largest stored one.
    IdOverflow = 0x0303,

    // Storage errors (0x0400 - 0x04FF)
    /// Persistence I/O failure.
    Io = 0x0400,
    /// Persisted data could not be encoded or decoded.
    Serialization = 0x0401,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "Parse",
            0x02 => "Schema",
            0x03 => "Validation",
            0x04 => "Storage",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The command text could not be turned into a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line matches none of the known command shapes.
    #[error("unrecognized command: {0}")]
    UnrecognizedCommand(String),

    /// A command shape matched, but one of its parts is malformed.
    #[error("malformed {segment}: {message}")]
    Malformed {
        /// Which part of the command was malformed (e.g. "where clause").
        segment: &'static str,
        /// What was wrong with it.
        message: String,
    },
}

impl ParseError {
    /// Creates a malformed-segment error.
    pub fn malformed(segment: &'static str, message: impl Into<String>) -> Self {
        ParseError::Malformed {
            segment,
            message: message.into(),
        }
    }
}

/// The command does not fit the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Table does not exist.
    #[error("table \"{0}\" does not exist")]
    UnknownTable(String),

    /// Column spec is malformed.
    #[error("invalid column spec \"{spec}\": {reason}")]
    InvalidColumnSpec {
        /// The offending spec as written.
        spec: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Column type is not one of `int`, `str`, `bool`.
    #[error("unknown column type \"{0}\" (expected int, str or bool)")]
    UnknownType(String),

    /// Column may not be assigned to.
    #[error("column \"{0}\" cannot be modified")]
    ImmutableColumn(String),

    /// Column is not in the table.
    #[error("unknown column \"{column}\" in table \"{table}\"")]
    UnknownColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// Column name used twice in one schema.
    #[error("duplicate column \"{0}\"")]
    DuplicateColumn(String),
}

/// A value does not fit where it is used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Wrong number of values for the table.
    #[error("expected {expected} values, got {found}")]
    ArityMismatch {
        /// Number of non-`ID` columns.
        expected: usize,
        /// Number of values supplied.
        found: usize,
    },

    /// Value type differs from the column type.
    #[error("type mismatch{}: expected {expected}, got {found}", column_suffix(.column))]
    TypeMismatch {
        /// Column being written, when known.
        column: Option<String>,
        /// Column type.
        expected: ScalarType,
        /// Type of the supplied value.
        found: ScalarType,
    },

    /// Token is not a literal.
    #[error("invalid value {token}: {reason}")]
    InvalidLiteral {
        /// The token as written.
        token: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The largest stored `ID` has no successor.
    #[error("cannot assign an ID after {max}")]
    IdOverflow {
        /// The largest `ID` in the table.
        max: i64,
    },
}

impl ValidationError {
    /// Attaches a column name to a type mismatch.
    #[must_use]
    pub fn in_column(self, name: &str) -> Self {
        match self {
            ValidationError::TypeMismatch {
                expected, found, ..
            } => ValidationError::TypeMismatch {
                column: Some(name.to_string()),
                expected,
                found,
            },
            other => other,
        }
    }
}

fn column_suffix(column: &Option<String>) -> String {
    column
        .as_ref()
        .map(|c| format!(" in column \"{c}\""))
        .unwrap_or_default()
}

/// Persistence failed.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File system error.
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding or decoding error.
    #[error("cannot (de)serialize '{}': {source}", .path.display())]
    Serialization {
        /// File involved.
        path: PathBuf,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

/// The main error type for primdb.
#[derive(Debug, Error)]
pub enum DbError {
    /// Command text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Command does not fit the catalog.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Value does not fit a column.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Persistence failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },
}

impl DbError {
    /// Returns the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Parse(ParseError::UnrecognizedCommand(_)) => ErrorCode::UnrecognizedCommand,
            Self::Parse(ParseError::Malformed { .. }) => ErrorCode::MalformedCommand,
            Self::Schema(e) => match e {
                SchemaError::UnknownTable(_) => ErrorCode::UnknownTable,
                SchemaError::InvalidColumnSpec { .. } => ErrorCode::InvalidColumnSpec,
                SchemaError::UnknownType(_) => ErrorCode::UnknownType,
                SchemaError::ImmutableColumn(_) => ErrorCode::ImmutableColumn,
                SchemaError::UnknownColumn { .. } => ErrorCode::UnknownColumn,
                SchemaError::DuplicateColumn(_) => ErrorCode::DuplicateColumn,
            },
            Self::Validation(e) => match e {
                ValidationError::ArityMismatch { .. } => ErrorCode::ArityMismatch,
                ValidationError::TypeMismatch { .. } => ErrorCode::TypeMismatch,
                ValidationError::InvalidLiteral { .. } => ErrorCode::InvalidLiteral,
                ValidationError::IdOverflow { .. } => ErrorCode::IdOverflow,
            },
            Self::Storage(StorageError::Io { .. }) => ErrorCode::Io,
            Self::Storage(StorageError::Serialization { .. }) => ErrorCode::Serialization,
            Self::InvalidConfig { .. } => ErrorCode::InvalidConfig,
        }
    }

    /// Returns true if the session can carry on after this error.
    ///
    /// Only configuration errors, which happen before a session exists,
    /// are not recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidConfig { .. })
    }
}
