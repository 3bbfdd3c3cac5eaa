//! Hash-based simulation of an inner equi-join on a full candidate mapping.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dataset::{Dataset, Value, ValueKey};
use crate::dates::DateNormalizer;
use crate::error::SimulationError;
use crate::mapping::{CandidateMapping, ColumnRef};

/// Outcome of joining both datasets on every mapped column at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinSimulation {
    /// Rows the inner join would produce.
    pub matching_records: usize,
    pub total_records_table1: usize,
    pub total_records_table2: usize,
    /// Coverage of the smaller side: `min(100, 100 × matching / min(t1, t2))`.
    pub overlap_percentage: f64,
    /// Row explosion against the larger side: `matching / max(t1, t2)`.
    pub multiplication_factor: f64,
    /// The join produces more rows than the larger input.
    pub has_duplicates: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl JoinSimulation {
    fn from_counts(matching: usize, total1: usize, total2: usize) -> Self {
        let smaller = total1.min(total2);
        let larger = total1.max(total2);

        let overlap_percentage = if smaller == 0 {
            0.0
        } else {
            (100.0 * matching as f64 / smaller as f64).min(100.0)
        };
        let multiplication_factor = if larger == 0 {
            0.0
        } else {
            matching as f64 / larger as f64
        };
        let has_duplicates = multiplication_factor > 1.0;

        let warning = has_duplicates.then(|| {
            format!(
                "Join produces {} rows, {} more than the larger table (multiplication factor {:.2}); \
                 mapped keys are not unique",
                matching,
                matching - larger,
                multiplication_factor
            )
        });

        Self {
            matching_records: matching,
            total_records_table1: total1,
            total_records_table2: total2,
            overlap_percentage,
            multiplication_factor,
            has_duplicates,
            warning,
        }
    }
}

/// Simulate the inner join of `table1` and `table2` on every field of `candidate`.
///
/// Date fields join on monthly periods, other fields on raw values. A row with
/// any missing key component never matches.
pub fn simulate_join(
    candidate: &CandidateMapping,
    table1: &Dataset,
    table2: &Dataset,
    normalizer: &DateNormalizer,
) -> Result<JoinSimulation, SimulationError> {
    if candidate.is_empty() {
        return Err(SimulationError::EmptyMapping);
    }

    let mut keys1 = Vec::with_capacity(candidate.len());
    let mut keys2 = Vec::with_capacity(candidate.len());
    for field in candidate.fields() {
        keys1.push(key_column(table1, &field.left, field.is_date(), normalizer)?);
        keys2.push(key_column(table2, &field.right, field.is_date(), normalizer)?);
    }

    let mut index: HashMap<Vec<ValueKey>, usize> = HashMap::new();
    for row in 0..table2.row_count() {
        if let Some(tuple) = row_tuple(&keys2, row) {
            *index.entry(tuple).or_insert(0) += 1;
        }
    }

    let matching: usize = (0..table1.row_count())
        .filter_map(|row| row_tuple(&keys1, row))
        .map(|tuple| index.get(&tuple).copied().unwrap_or(0))
        .sum();

    let simulation = JoinSimulation::from_counts(matching, table1.row_count(), table2.row_count());

    if simulation.has_duplicates {
        warn!(
            table1 = table1.name(),
            table2 = table2.name(),
            matching,
            factor = simulation.multiplication_factor,
            "join fans out"
        );
    } else {
        debug!(
            table1 = table1.name(),
            table2 = table2.name(),
            matching,
            overlap = simulation.overlap_percentage,
            "simulated join"
        );
    }

    Ok(simulation)
}

/// Per-row join keys for one mapped column.
fn key_column(
    dataset: &Dataset,
    field: &ColumnRef,
    is_date: bool,
    normalizer: &DateNormalizer,
) -> Result<Vec<Option<ValueKey>>, SimulationError> {
    let not_found = || SimulationError::ColumnNotFound {
        dataset: dataset.name().to_string(),
        column: field.column.clone(),
    };

    if field.dataset != dataset.name() {
        return Err(not_found());
    }
    let column = dataset.column(&field.column).ok_or_else(not_found)?;

    if is_date {
        let normalized = normalizer
            .normalize(dataset, &field.column)
            .map_err(|failure| SimulationError::DateParse {
                dataset: dataset.name().to_string(),
                failure,
            })?;
        return Ok((0..dataset.row_count()).map(|row| normalized.key(row)).collect());
    }

    Ok(column.values.iter().map(Value::key).collect())
}

fn row_tuple(columns: &[Vec<Option<ValueKey>>], row: usize) -> Option<Vec<ValueKey>> {
    columns.iter().map(|keys| keys[row].clone()).collect()
}
