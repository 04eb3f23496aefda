//! System-wide constants for primdb.

// =============================================================================
// Schema Constants
// =============================================================================

/// Name of the implicit identity column present in every table.
///
/// It is always the first column of a schema, always typed `int`, and is
/// assigned by the engine rather than supplied by callers.
pub const ID_COLUMN: &str = "ID";

/// Separator between a column name and its type in `create_table` specs.
pub const COLUMN_SPEC_SEPARATOR: char = ':';

// =============================================================================
// Persistence Layout
// =============================================================================

/// Default data directory.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Default file name of the persisted catalog.
pub const DEFAULT_METADATA_FILE: &str = "db_meta.json";

/// Subdirectory of the data directory holding one row file per table.
pub const TABLES_DIR: &str = "tables";

/// File extension of per-table row files.
pub const TABLE_FILE_EXTENSION: &str = "json";
