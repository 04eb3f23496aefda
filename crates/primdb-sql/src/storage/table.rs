//! Per-table row storage.

use serde::{Deserialize, Serialize};

use primdb_common::error::ValidationError;
use primdb_common::types::Row;

/// The ordered rows of one table.
///
/// Rows are only added, changed, and removed through the engine operations,
/// which keep every row valid against the table schema and keep `ID`s
/// unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowSet {
    rows: Vec<Row>,
}

impl RowSet {
    /// Creates an empty row set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over rows in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Returns the rows as a slice.
    pub fn as_slice(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the `ID` the next inserted row gets: one more than the
    /// largest existing `ID`, or 1 when empty.
    ///
    /// Fails when the largest `ID` is `i64::MAX`.
    pub fn next_id(&self) -> Result<i64, ValidationError> {
        match self.rows.iter().filter_map(Row::id).max() {
            None => Ok(1),
            Some(max) => max.checked_add(1).ok_or(ValidationError::IdOverflow { max }),
        }
    }

    pub(crate) fn push(&mut self, row: Row) -> &Row {
        self.rows.push(row);
        &self.rows[self.rows.len() - 1]
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Row> {
        self.rows.iter_mut()
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&Row) -> bool) {
        self.rows.retain(keep);
    }
}

impl<'a> IntoIterator for &'a RowSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
impl FromIterator<Row> for RowSet {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id() {
        assert_eq!(RowSet::new().next_id().unwrap(), 1);

        let rows: RowSet = [Row::with_id(3), Row::with_id(7), Row::with_id(5)]
            .into_iter()
            .collect();
        assert_eq!(rows.next_id().unwrap(), 8);
    }

    #[test]
    fn test_ids_not_reused_after_removing_lower_rows() {
        let mut rows: RowSet = [Row::with_id(1), Row::with_id(2)].into_iter().collect();
        rows.retain(|row| row.id() != Some(1));
        assert_eq!(rows.next_id().unwrap(), 3);
    }

    #[test]
    fn test_next_id_at_max() {
        let rows: RowSet = [Row::with_id(i64::MAX)].into_iter().collect();
        assert_eq!(
            rows.next_id(),
            Err(ValidationError::IdOverflow { max: i64::MAX })
        );
    }
}
