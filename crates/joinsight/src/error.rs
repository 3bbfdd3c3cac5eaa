//! Error types for the joinsight library.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::ColumnType;
use crate::mapping::Role;

/// Main error type for joinsight operations.
#[derive(Debug, Error)]
pub enum JoinsightError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Columns of unequal length or repeated names.
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// Invalid candidate mapping.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Date column could not be normalized.
    #[error(transparent)]
    DateParse(#[from] DateParseFailure),

    /// Combined join simulation could not be evaluated.
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for joinsight operations.
pub type Result<T> = std::result::Result<T, JoinsightError>;

/// A candidate mapping that violates its structural invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("Candidate mapping is missing the required '{0}' field")]
    MissingRole(Role),

    #[error("Role '{0}' appears more than once in the candidate mapping")]
    DuplicateRole(Role),

    #[error("Both columns of the '{role}' mapping belong to dataset '{dataset}'")]
    SameDataset { role: Role, dataset: String },
}

/// A column that cannot serve as a monthly join key.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateParseFailure {
    #[error("Date column '{column}' not found")]
    ColumnNotFound { column: String },

    #[error("Column '{column}' holds {column_type} values and cannot be a date column")]
    NumericColumn {
        column: String,
        column_type: ColumnType,
    },

    #[error("Column '{column}' has a numeric-role suffix '{suffix}' and is not treated as a date")]
    NumericRoleName { column: String, suffix: String },

    #[error(
        "Column '{column}' is not a date column: {failed} of {total} values ({rate:.1}%) could not be parsed, e.g. {offending:?}",
        rate = .failure_rate * 100.0
    )]
    TooManyFailures {
        column: String,
        failed: usize,
        total: usize,
        failure_rate: f64,
        /// First non-missing values of the column.
        samples: Vec<String>,
        /// Values that failed to parse.
        offending: Vec<String>,
    },
}

impl DateParseFailure {
    /// Name of the column that failed.
    pub fn column(&self) -> &str {
        match self {
            DateParseFailure::ColumnNotFound { column }
            | DateParseFailure::NumericColumn { column, .. }
            | DateParseFailure::NumericRoleName { column, .. }
            | DateParseFailure::TooManyFailures { column, .. } => column,
        }
    }
}

/// Why a combined-mapping join could not be simulated.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulationError {
    #[error("Candidate mapping has no usable field mappings")]
    EmptyMapping,

    #[error("Column '{column}' not found in dataset '{dataset}'")]
    ColumnNotFound { dataset: String, column: String },

    #[error("Date normalization failed for dataset '{dataset}': {failure}")]
    DateParse {
        dataset: String,
        failure: DateParseFailure,
    },
}
