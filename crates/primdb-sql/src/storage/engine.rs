//! Row-level operations.
//!
//! These functions are the only way rows change. Each write operation takes
//! exclusive access to one table's [`RowSet`] for the duration of the call
//! and validates everything it needs before it touches a row, so a failed
//! call leaves the row set exactly as it found it.

use primdb_common::constants::ID_COLUMN;
use primdb_common::error::{DbResult, SchemaError, ValidationError};
use primdb_common::types::{validate, Assignments, Filter, Row, Value};

use super::catalog::Catalog;
use super::table::RowSet;

/// Appends a row built from `values` and returns it.
///
/// `values` must line up with the table's non-`ID` columns. The new row
/// gets the next free `ID`; when there is none the row set is unchanged.
pub fn insert<'r>(
    catalog: &Catalog,
    table: &str,
    rows: &'r mut RowSet,
    values: Vec<Value>,
) -> DbResult<&'r Row> {
    let schema = catalog.schema(table)?;

    let expected = schema.data_columns().count();
    if values.len() != expected {
        return Err(ValidationError::ArityMismatch {
            expected,
            found: values.len(),
        }
        .into());
    }

    for (column, value) in schema.data_columns().zip(&values) {
        validate(value, column.data_type).map_err(|e| e.in_column(&column.name))?;
    }

    let mut row = Row::with_id(rows.next_id()?);
    for (column, value) in schema.data_columns().zip(values) {
        row.set(column.name.as_str(), value);
    }

    Ok(rows.push(row))
}

/// Returns copies of the rows matching `filter`, in row order.
///
/// No filter returns every row.
pub fn select(rows: &RowSet, filter: Option<&Filter>) -> Vec<Row> {
    match filter {
        Some(filter) => rows.iter().filter(|row| row.matches(filter)).cloned().collect(),
        None => rows.as_slice().to_vec(),
    }
}

/// Applies `assignments` to every row matching `filter`.
///
/// Returns the number of rows touched; zero matches is not an error.
pub fn update(
    catalog: &Catalog,
    table: &str,
    rows: &mut RowSet,
    assignments: &Assignments,
    filter: &Filter,
) -> DbResult<usize> {
    let schema = catalog.schema(table)?;

    if assignments.contains_key(ID_COLUMN) {
        return Err(SchemaError::ImmutableColumn(ID_COLUMN.to_string()).into());
    }
    for (name, value) in assignments {
        let column = schema
            .column(name)
            .ok_or_else(|| SchemaError::UnknownColumn {
                table: table.to_string(),
                column: name.clone(),
            })?;
        validate(value, column.data_type).map_err(|e| e.in_column(name))?;
    }

    let mut count = 0;
    for row in rows.iter_mut().filter(|row| row.matches(filter)) {
        for (name, value) in assignments {
            row.set(name.as_str(), value.clone());
        }
        count += 1;
    }
    Ok(count)
}

/// Removes every row matching `filter`, keeping the rest in order.
///
/// Returns the number of rows removed.
pub fn delete(rows: &mut RowSet, filter: &Filter) -> usize {
    let before = rows.len();
    rows.retain(|row| !row.matches(filter));
    before - rows.len()
}
