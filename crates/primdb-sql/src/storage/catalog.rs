//! Table catalog for metadata management.
//!
//! The catalog maps table names to their schemas. It is the only metadata
//! primdb keeps: a schema is an ordered list of typed columns, always headed
//! by `ID:int`.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use primdb_common::constants::{COLUMN_SPEC_SEPARATOR, ID_COLUMN};
use primdb_common::error::{DbResult, SchemaError};
use primdb_common::types::ScalarType;

use crate::parser::is_identifier;

/// A column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Column type.
    #[serde(rename = "type")]
    pub data_type: ScalarType,
}

impl ColumnDef {
    /// Creates a new column definition.
    pub fn new(name: impl Into<String>, data_type: ScalarType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    /// Returns true if this is the `ID` column.
    pub fn is_id(&self) -> bool {
        self.name == ID_COLUMN
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, COLUMN_SPEC_SEPARATOR, self.data_type)
    }
}

/// The schema of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    #[serde(rename = "structure")]
    columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Creates a schema with `ID:int` followed by `columns`.
    fn with_id(columns: Vec<ColumnDef>) -> Self {
        let mut all = Vec::with_capacity(columns.len() + 1);
        all.push(ColumnDef::new(ID_COLUMN, ScalarType::Integer));
        all.extend(columns);
        Self { columns: all }
    }

    /// Returns all columns, `ID` first.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Returns the columns a caller supplies values for.
    pub fn data_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| !c.is_id())
    }

    /// Finds a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Returns the number of columns, including `ID`.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl fmt::Display for TableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{column}")?;
        }
        Ok(())
    }
}

/// Outcome of [`Catalog::create_table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The table was registered with this schema.
    Created(TableSchema),
    /// A table with that name already exists; nothing changed.
    AlreadyExists,
}

/// Outcome of [`Catalog::drop_table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The table was removed; this was its schema.
    Dropped(TableSchema),
    /// No such table; nothing changed.
    NotFound,
}

/// Table catalog.
///
/// Tables keep their creation order, which is also the order
/// [`list_tables`](Self::list_tables) reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    tables: IndexMap<String, TableSchema>,
}

impl Catalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table from raw `name:type` specs.
    ///
    /// An existing table is left untouched and reported as
    /// [`CreateOutcome::AlreadyExists`]. Every spec is checked before the
    /// catalog changes.
    pub fn create_table(&mut self, name: &str, specs: &[String]) -> DbResult<CreateOutcome> {
        if self.tables.contains_key(name) {
            return Ok(CreateOutcome::AlreadyExists);
        }

        let parsed = specs
            .iter()
            .map(|spec| split_spec(spec))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::with_capacity(parsed.len());
        let mut columns = Vec::with_capacity(parsed.len());
        for (column, type_name) in parsed {
            let data_type: ScalarType = type_name.parse()?;
            if !seen.insert(column) {
                return Err(SchemaError::DuplicateColumn(column.to_string()).into());
            }
            columns.push(ColumnDef::new(column, data_type));
        }

        let schema = TableSchema::with_id(columns);
        self.tables.insert(name.to_string(), schema.clone());
        Ok(CreateOutcome::Created(schema))
    }

    /// Removes a table.
    pub fn drop_table(&mut self, name: &str) -> DropOutcome {
        match self.tables.shift_remove(name) {
            Some(schema) => DropOutcome::Dropped(schema),
            None => DropOutcome::NotFound,
        }
    }

    /// Returns table names in creation order.
    pub fn list_tables(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Returns a table's schema.
    pub fn schema(&self, name: &str) -> DbResult<&TableSchema> {
        self.tables
            .get(name)
            .ok_or_else(|| SchemaError::UnknownTable(name.to_string()).into())
    }

    /// Returns true if the table exists.
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Returns the number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if there are no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Splits `name:type` into its trimmed halves.
fn split_spec(spec: &str) -> Result<(&str, &str), SchemaError> {
    let invalid = |reason| SchemaError::InvalidColumnSpec {
        spec: spec.to_string(),
        reason,
    };

    let (name, type_name) = spec
        .split_once(COLUMN_SPEC_SEPARATOR)
        .ok_or_else(|| invalid("expected <name>:<type>"))?;
    let (name, type_name) = (name.trim(), type_name.trim());

    if name.is_empty() || type_name.is_empty() {
        return Err(invalid("name and type must not be empty"));
    }
    if name == ID_COLUMN {
        return Err(invalid("the ID column is added automatically"));
    }
    if !is_identifier(name) {
        return Err(invalid("column names may only contain letters, digits and _"));
    }
    Ok((name, type_name))
}
