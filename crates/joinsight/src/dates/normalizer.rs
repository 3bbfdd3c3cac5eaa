//! Monthly normalization of date-like columns.

use std::collections::HashSet;
use std::fmt;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::parse::parse_value;
use crate::dataset::{Dataset, ValueKey};
use crate::error::DateParseFailure;

/// Column-name suffix tokens that mark identifiers and quantities.
const NUMERIC_ROLE_SUFFIXES: &[&str] = &[
    "id", "key", "qty", "quantity", "amount", "amt", "count", "cnt", "price", "total", "num",
    "number", "no",
];

/// A calendar month, the join granularity for date keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
        }
    }

    /// Join key for this period.
    pub fn key(&self) -> ValueKey {
        ValueKey::Period(self.year, self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A date column truncated to months, row-aligned with its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDates {
    pub column: String,
    /// One entry per row; `None` for missing or unparseable cells.
    pub periods: Vec<Option<YearMonth>>,
    /// Non-missing cells that parsed.
    pub parsed: usize,
    /// Non-missing cells that did not parse.
    pub failed: usize,
}

impl NormalizedDates {
    /// Join key for a row.
    pub fn key(&self, row: usize) -> Option<ValueKey> {
        self.periods.get(row).copied().flatten().map(|p| p.key())
    }

    /// Distinct periods as join keys.
    pub fn distinct_keys(&self) -> HashSet<ValueKey> {
        self.periods.iter().flatten().map(YearMonth::key).collect()
    }

    /// Earliest and latest period, if any parsed.
    pub fn range(&self) -> Option<(YearMonth, YearMonth)> {
        let min = self.periods.iter().flatten().min()?;
        let max = self.periods.iter().flatten().max()?;
        Some((*min, *max))
    }
}

/// Normalizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Highest tolerated share (0.0-1.0) of unparseable non-missing values.
    pub max_failure_rate: f64,
    /// How many sample and offending values a failure carries.
    pub sample_size: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_failure_rate: 0.20,
            sample_size: 5,
        }
    }
}

/// Converts heterogeneous date-like columns into monthly periods.
#[derive(Debug, Clone, Default)]
pub struct DateNormalizer {
    config: NormalizerConfig,
}

impl DateNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Normalize `column` of `dataset` to year-month periods.
    pub fn normalize(
        &self,
        dataset: &Dataset,
        column: &str,
    ) -> Result<NormalizedDates, DateParseFailure> {
        let col = dataset
            .column(column)
            .ok_or_else(|| DateParseFailure::ColumnNotFound {
                column: column.to_string(),
            })?;

        if col.column_type.is_numeric() {
            warn!(dataset = dataset.name(), column, column_type = %col.column_type, "numeric column rejected as date");
            return Err(DateParseFailure::NumericColumn {
                column: column.to_string(),
                column_type: col.column_type,
            });
        }

        if let Some(suffix) = numeric_role_suffix(column) {
            warn!(dataset = dataset.name(), column, suffix = %suffix, "column name suggests a numeric role");
            return Err(DateParseFailure::NumericRoleName {
                column: column.to_string(),
                suffix,
            });
        }

        let mut periods = Vec::with_capacity(col.len());
        let mut samples = Vec::new();
        let mut offending = Vec::new();
        let mut parsed = 0;
        let mut failed = 0;

        for value in &col.values {
            if value.is_missing() {
                periods.push(None);
                continue;
            }

            if samples.len() < self.config.sample_size {
                samples.push(value.to_string());
            }

            match parse_value(value) {
                Some(dt) => {
                    parsed += 1;
                    periods.push(Some(YearMonth::from_datetime(&dt)));
                }
                None => {
                    failed += 1;
                    if offending.len() < self.config.sample_size {
                        offending.push(value.to_string());
                    }
                    periods.push(None);
                }
            }
        }

        let total = parsed + failed;
        let failure_rate = if total == 0 {
            0.0
        } else {
            failed as f64 / total as f64
        };

        if failure_rate > self.config.max_failure_rate {
            warn!(
                dataset = dataset.name(),
                column,
                failed,
                total,
                "too many unparseable values for a date column"
            );
            return Err(DateParseFailure::TooManyFailures {
                column: column.to_string(),
                failed,
                total,
                failure_rate,
                samples,
                offending,
            });
        }

        debug!(dataset = dataset.name(), column, parsed, failed, "normalized date column");

        Ok(NormalizedDates {
            column: column.to_string(),
            periods,
            parsed,
            failed,
        })
    }
}

/// The name's last token, when it marks an identifier or quantity.
///
/// Tokens split on non-alphanumerics and lower-to-upper case changes.
fn numeric_role_suffix(name: &str) -> Option<String> {
    let chars: Vec<char> = name.trim().chars().collect();
    let mut start = 0;
    for i in 0..chars.len() {
        if !chars[i].is_alphanumeric() {
            start = i + 1;
        } else if i > 0 && chars[i].is_uppercase() && chars[i - 1].is_lowercase() {
            start = i;
        }
    }

    let token: String = chars[start.min(chars.len())..]
        .iter()
        .collect::<String>()
        .to_lowercase();

    if NUMERIC_ROLE_SUFFIXES.contains(&token.as_str()) {
        Some(token)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, Value};

    fn dataset_with(column: Column) -> Dataset {
        Dataset::new("t", vec![column]).unwrap()
    }

    #[test]
    fn test_normalize_mixed_formats() {
        let dataset = dataset_with(Column::from_raw(
            "order_date",
            ["2023-01-15", "02/03/2023", "Mar 9 2023", "", "2023-04"],
        ));
        let normalized = DateNormalizer::new().normalize(&dataset, "order_date").unwrap();

        let rendered: Vec<Option<String>> = normalized
            .periods
            .iter()
            .map(|p| p.map(|p| p.to_string()))
            .collect();
        assert_eq!(
            rendered,
            vec![
                Some("2023-01".to_string()),
                Some("2023-02".to_string()),
                Some("2023-03".to_string()),
                None,
                Some("2023-04".to_string()),
            ]
        );
        assert_eq!(normalized.parsed, 4);
        assert_eq!(normalized.failed, 0);
    }

    #[test]
    fn test_failure_rate_above_threshold() {
        let dataset = dataset_with(Column::new(
            "date",
            vec![
                Value::from("N/A"),
                Value::from("1/15/23"),
                Value::from("not a date"),
            ],
        ));

        let err = DateNormalizer::new().normalize(&dataset, "date").unwrap_err();
        match err {
            DateParseFailure::TooManyFailures {
                failed,
                total,
                failure_rate,
                samples,
                offending,
                ..
            } => {
                assert_eq!((failed, total), (2, 3));
                assert!(failure_rate > 0.66 && failure_rate < 0.67);
                assert_eq!(samples, vec!["N/A", "1/15/23", "not a date"]);
                assert_eq!(offending, vec!["N/A", "not a date"]);
            }
            other => panic!("unexpected failure {other:?}"),
        }
    }

    #[test]
    fn test_failure_rate_within_threshold() {
        let mut raw = vec!["2023-01-01"; 9];
        raw.push("garbage");
        let dataset = dataset_with(Column::from_raw("day", raw));

        let normalized = DateNormalizer::new().normalize(&dataset, "day").unwrap();
        assert_eq!(normalized.failed, 1);
        assert_eq!(normalized.periods[9], None);
    }

    #[test]
    fn test_numeric_column_rejected() {
        let dataset = dataset_with(Column::from_raw("period", ["202301", "202302"]));
        let err = DateNormalizer::new().normalize(&dataset, "period").unwrap_err();
        assert!(matches!(err, DateParseFailure::NumericColumn { .. }));
    }

    #[test]
    fn test_numeric_role_name_rejected() {
        let dataset = dataset_with(Column::from_raw("order_id", ["2023-01-01"]));
        let err = DateNormalizer::new().normalize(&dataset, "order_id").unwrap_err();
        assert_eq!(
            err,
            DateParseFailure::NumericRoleName {
                column: "order_id".to_string(),
                suffix: "id".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_column() {
        let dataset = dataset_with(Column::from_raw("a", ["2023-01-01"]));
        let err = DateNormalizer::new().normalize(&dataset, "b").unwrap_err();
        assert!(matches!(err, DateParseFailure::ColumnNotFound { .. }));
    }

    #[test]
    fn test_all_missing_column_normalizes_to_nothing() {
        let dataset = dataset_with(Column::from_raw("d", ["", "NA"]));
        let normalized = DateNormalizer::new().normalize(&dataset, "d").unwrap();
        assert_eq!(normalized.periods, vec![None, None]);
        assert!(normalized.range().is_none());
    }

    #[test]
    fn test_numeric_role_suffix() {
        assert_eq!(numeric_role_suffix("customer_id").as_deref(), Some("id"));
        assert_eq!(numeric_role_suffix("CustomerID").as_deref(), Some("id"));
        assert_eq!(numeric_role_suffix("orderAmount").as_deref(), Some("amount"));
        assert_eq!(numeric_role_suffix("invoice-no").as_deref(), Some("no"));
        assert_eq!(numeric_role_suffix("order_date"), None);
        assert_eq!(numeric_role_suffix("period"), None);
        assert_eq!(numeric_role_suffix("paid_on"), None);
    }

    #[test]
    fn test_range() {
        let dataset = dataset_with(Column::from_raw("m", ["2023-03", "2023-01", "2023-02"]));
        let normalized = DateNormalizer::new().normalize(&dataset, "m").unwrap();
        assert_eq!(
            normalized.range(),
            Some((YearMonth::new(2023, 1), YearMonth::new(2023, 3)))
        );
    }
}
