//! Dataset metadata handed to mapping-suggestion services.

use serde::{Deserialize, Serialize};

use super::column::ColumnType;
use super::value::Value;

/// Per-column summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub column_type: ColumnType,
    pub null_count: usize,
    /// Number of distinct non-missing values.
    pub distinct_count: usize,
    /// Leading values of the column, missing ones included.
    pub sample_values: Vec<Value>,
}

/// Summary of a whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    pub name: String,
    pub row_count: usize,
    pub columns: Vec<ColumnProfile>,
}
