//! Columnar Table Implementation

use crate::error::TableError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Timestamp-keyed columnar table of named numeric channels.
///
/// Every column has exactly `len` rows; missing samples are `None`.
/// Pipeline stages mutate the table column-additively and never remove
/// rows. Ordering is positional until [`crate::TimeIndexer`] re-keys the
/// table by its timestamp column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSeriesTable {
    len: usize,
    /// Raw timestamp strings as delivered by the acquisition layer
    time_column: Option<Vec<String>>,
    /// Parsed index in epoch milliseconds, set by the indexer
    index_ms: Option<Vec<i64>>,
    /// Whether `index_ms` came from real timestamps or a positional fallback
    time_indexed: bool,
    columns: HashMap<String, Vec<Option<f64>>>,
}

impl TimeSeriesTable {
    /// Create an empty table with a fixed row count
    pub fn new(rows: usize) -> Self {
        Self {
            len: rows,
            ..Self::default()
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Attach the raw timestamp column
    pub fn set_time_column(&mut self, values: Vec<String>) -> Result<(), TableError> {
        if values.len() != self.len {
            return Err(TableError::TimeLengthMismatch {
                expected: self.len,
                actual: values.len(),
            });
        }
        self.time_column = Some(values);
        Ok(())
    }

    /// Raw timestamp strings, if the acquisition layer provided them
    pub fn time_column(&self) -> Option<&[String]> {
        self.time_column.as_deref()
    }

    /// Insert or replace a named column
    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<(), TableError> {
        let name = name.into();
        if values.len() != self.len {
            return Err(TableError::LengthMismatch {
                column: name,
                expected: self.len,
                actual: values.len(),
            });
        }
        self.columns.insert(name, values);
        Ok(())
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Check whether a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Number of columns currently in the table
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Count of missing samples in a column
    pub fn missing_count(&self, name: &str) -> Option<usize> {
        self.columns
            .get(name)
            .map(|col| col.iter().filter(|v| v.is_none()).count())
    }

    /// Parsed millisecond index, if the table has been indexed
    pub fn index_ms(&self) -> Option<&[i64]> {
        self.index_ms.as_deref()
    }

    /// Whether the index came from real timestamps (false = positional fallback)
    pub fn is_time_indexed(&self) -> bool {
        self.time_indexed
    }

    pub(crate) fn set_index(&mut self, index: Vec<i64>, time_indexed: bool) {
        debug_assert_eq!(index.len(), self.len);
        self.index_ms = Some(index);
        self.time_indexed = time_indexed;
    }

    /// Reorder all rows so that new row `k` is old row `perm[k]`
    pub(crate) fn reorder_rows(&mut self, perm: &[usize]) {
        debug_assert_eq!(perm.len(), self.len);
        if let Some(time) = &mut self.time_column {
            let reordered: Vec<String> = perm.iter().map(|&i| time[i].clone()).collect();
            *time = reordered;
        }
        if let Some(index) = &mut self.index_ms {
            let reordered: Vec<i64> = perm.iter().map(|&i| index[i]).collect();
            *index = reordered;
        }
        for col in self.columns.values_mut() {
            let reordered: Vec<Option<f64>> = perm.iter().map(|&i| col[i]).collect();
            *col = reordered;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_read_column() {
        let mut table = TimeSeriesTable::new(3);
        table
            .insert_column("temp", vec![Some(1.0), None, Some(3.0)])
            .unwrap();

        assert!(table.has_column("temp"));
        assert_eq!(table.column("temp").unwrap()[0], Some(1.0));
        assert_eq!(table.missing_count("temp"), Some(1));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut table = TimeSeriesTable::new(3);
        let err = table.insert_column("temp", vec![Some(1.0)]).unwrap_err();
        assert!(matches!(err, TableError::LengthMismatch { expected: 3, actual: 1, .. }));
    }

    #[test]
    fn test_reorder_rows() {
        let mut table = TimeSeriesTable::new(3);
        table
            .insert_column("v", vec![Some(10.0), Some(20.0), Some(30.0)])
            .unwrap();
        table.reorder_rows(&[2, 0, 1]);

        let col = table.column("v").unwrap();
        assert_eq!(col, &[Some(30.0), Some(10.0), Some(20.0)]);
    }
}
