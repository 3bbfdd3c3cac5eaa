//! In-memory datasets.

use serde::{Deserialize, Serialize};

use crate::error::{JoinsightError, Result};
use crate::input::DataTable;

use super::column::Column;
use super::profile::{ColumnProfile, DatasetProfile};

/// An ordered collection of equally long, named columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    name: String,
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Create a dataset from columns.
    ///
    /// Fails when columns differ in length or a column name repeats.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let name = name.into();
        let row_count = columns.first().map(Column::len).unwrap_or(0);

        if let Some(bad) = columns.iter().find(|c| c.len() != row_count) {
            return Err(JoinsightError::InvalidDataset(format!(
                "column '{}' in '{}' has {} rows, expected {}",
                bad.name,
                name,
                bad.len(),
                row_count
            )));
        }

        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(JoinsightError::InvalidDataset(format!(
                    "duplicate column '{}' in '{}'",
                    column.name, name
                )));
            }
        }

        Ok(Self {
            name,
            columns,
            row_count,
        })
    }

    /// Build a typed dataset from a parsed text table.
    pub fn from_table(name: impl Into<String>, table: &DataTable) -> Result<Self> {
        let columns = table
            .headers
            .iter()
            .enumerate()
            .map(|(index, header)| Column::from_raw(header.clone(), table.column_values(index)))
            .collect();
        Self::new(name, columns)
    }

    /// Dataset identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The same dataset under another identifier.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// All columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Summarize the dataset for an external mapping-suggestion service.
    pub fn profile(&self, sample_rows: usize) -> DatasetProfile {
        let columns = self
            .columns
            .iter()
            .map(|column| ColumnProfile {
                name: column.name.clone(),
                column_type: column.column_type,
                null_count: column.null_count(),
                distinct_count: column.distinct_keys().len(),
                sample_values: column.values.iter().take(sample_rows).cloned().collect(),
            })
            .collect();

        DatasetProfile {
            name: self.name.clone(),
            row_count: self.row_count,
            columns,
        }
    }
}
