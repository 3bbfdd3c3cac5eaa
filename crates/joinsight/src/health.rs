//! 0-100 health scores per field pair.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::overlap::VerificationResult;
use crate::validation::FieldChecks;

/// Weights of the overall health score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthWeights {
    pub uniqueness: f64,
    pub overlap: f64,
    /// Applied to `100 - null_impact`.
    pub completeness: f64,
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            uniqueness: 0.4,
            overlap: 0.4,
            completeness: 0.2,
        }
    }
}

/// Health of one field pair. Every value is in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    /// `100 - mean duplication rate`.
    pub uniqueness_score: f64,
    /// Distinct-value overlap percentage.
    pub overlap_score: f64,
    /// Mean null percentage of the two columns.
    pub null_impact: f64,
    pub overall_health: f64,
}

#[derive(Debug, Clone, Default)]
pub struct HealthAggregator {
    weights: HealthWeights,
}

impl HealthAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: HealthWeights) -> Self {
        Self { weights }
    }

    /// Score one field pair. A pair with a column missing on either side
    /// scores 0 with full null impact.
    pub fn score(&self, checks: &FieldChecks) -> HealthMetrics {
        if !checks.uniqueness.table1.column_found || !checks.uniqueness.table2.column_found {
            return HealthMetrics {
                uniqueness_score: 0.0,
                overlap_score: 0.0,
                null_impact: 100.0,
                overall_health: 0.0,
            };
        }

        let duplication = (checks.uniqueness.table1.duplication_rate
            + checks.uniqueness.table2.duplication_rate)
            / 2.0;
        let uniqueness_score = clamp(100.0 - duplication);
        let overlap_score = clamp(checks.value_overlap.overlap_percentage);
        let null_impact = clamp(
            (checks.null_analysis.table1.null_percentage
                + checks.null_analysis.table2.null_percentage)
                / 2.0,
        );

        let w = &self.weights;
        let overall_health = clamp(
            w.uniqueness * uniqueness_score
                + w.overlap * overlap_score
                + w.completeness * (100.0 - null_impact),
        );

        HealthMetrics {
            uniqueness_score,
            overlap_score,
            null_impact,
            overall_health,
        }
    }

    /// Score every field pair of a verification, keyed like its fields.
    pub fn score_all(&self, verification: &VerificationResult) -> IndexMap<String, HealthMetrics> {
        verification
            .fields
            .iter()
            .map(|(key, field)| (key.clone(), self.score(&field.checks)))
            .collect()
    }
}

fn clamp(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, Dataset, Value};
    use crate::mapping::ColumnRef;
    use crate::validation::FieldValidator;

    fn checks(left: Vec<Value>, right: Vec<Value>) -> FieldChecks {
        checks_for(left, right, "c")
    }

    fn checks_for(left: Vec<Value>, right: Vec<Value>, right_column: &str) -> FieldChecks {
        let t1 = Dataset::new("t1", vec![Column::new("c", left)]).unwrap();
        let t2 = Dataset::new("t2", vec![Column::new("c", right)]).unwrap();
        FieldValidator::new(&t1, &t2).run_all_checks(
            &ColumnRef::new("t1", "c"),
            &ColumnRef::new("t2", right_column),
            false,
        )
    }

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|v| Value::Integer(*v)).collect()
    }

    #[test]
    fn test_uniqueness_score_from_duplicates() {
        let metrics = HealthAggregator::new().score(&checks(ints(&[1, 1, 2]), ints(&[1, 2, 3])));
        assert!((metrics.uniqueness_score - 83.333).abs() < 0.01);
        assert!((metrics.overlap_score - 66.666).abs() < 0.01);
        assert_eq!(metrics.null_impact, 0.0);

        let expected = 0.4 * metrics.uniqueness_score + 0.4 * metrics.overlap_score + 0.2 * 100.0;
        assert!((metrics.overall_health - expected).abs() < 1e-9);
    }

    #[test]
    fn test_perfect_pair_scores_full() {
        let metrics = HealthAggregator::new().score(&checks(ints(&[1, 2, 3]), ints(&[3, 2, 1])));
        assert_eq!(metrics.overall_health, 100.0);
    }

    #[test]
    fn test_nulls_lower_health() {
        let left = vec![Value::Integer(1), Value::Null];
        let metrics = HealthAggregator::new().score(&checks(left, ints(&[1, 2])));
        assert_eq!(metrics.null_impact, 25.0);
        assert!(metrics.overall_health < 100.0);
    }

    #[test]
    fn test_custom_weights_stay_in_range() {
        let weights = HealthWeights {
            uniqueness: 1.0,
            overlap: 1.0,
            completeness: 1.0,
        };
        let metrics = HealthAggregator::with_weights(weights)
            .score(&checks(ints(&[1, 2]), ints(&[1, 2])));
        assert_eq!(metrics.overall_health, 100.0);
    }

    #[test]
    fn test_missing_column_scores_zero() {
        let metrics =
            HealthAggregator::new().score(&checks_for(ints(&[1, 2, 3]), ints(&[1, 2, 3]), "nope"));
        assert_eq!(metrics.uniqueness_score, 0.0);
        assert_eq!(metrics.overlap_score, 0.0);
        assert_eq!(metrics.null_impact, 100.0);
        assert_eq!(metrics.overall_health, 0.0);
    }
}
