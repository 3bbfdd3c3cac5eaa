//! Diagnostic checks on one candidate column pair.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::diagnostic::{
    CardinalityCheck, CharacterType, DateCompatibilityCheck, Diagnostic, Granularity,
    NullAnalysisCheck, NullDistribution, PatternMatchCheck, Relationship, SideDates, SideNulls,
    SidePattern, SideUniqueness, UniquenessCheck, ValueOverlapCheck,
};
use super::stats::FrequencySummary;
use crate::dataset::{Column, Dataset};
use crate::dates::parse_value;
use crate::mapping::ColumnRef;

static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());
static ALPHABETIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

const DAYS_PER_YEAR: f64 = 365.25;

/// Validator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Maximum non-missing values inspected by the pattern check.
    pub pattern_sample_size: usize,
    /// Rows per window in the null distribution.
    pub null_window: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            pattern_sample_size: 1000,
            null_window: 100,
        }
    }
}

/// All checks for one field pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChecks {
    pub uniqueness: UniquenessCheck,
    pub pattern_match: PatternMatchCheck,
    pub null_analysis: NullAnalysisCheck,
    pub cardinality: CardinalityCheck,
    pub value_overlap: ValueOverlapCheck,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_compatibility: Option<DateCompatibilityCheck>,
}

impl FieldChecks {
    /// The checks as a flat list of diagnostics.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics = vec![
            Diagnostic::Uniqueness(self.uniqueness.clone()),
            Diagnostic::PatternMatch(self.pattern_match.clone()),
            Diagnostic::NullAnalysis(self.null_analysis.clone()),
            Diagnostic::Cardinality(self.cardinality.clone()),
            Diagnostic::ValueOverlap(self.value_overlap.clone()),
        ];
        if let Some(dates) = &self.date_compatibility {
            diagnostics.push(Diagnostic::DateCompatibility(dates.clone()));
        }
        diagnostics
    }
}

/// Runs join-field checks between two datasets.
///
/// Absent columns never raise: every check degrades to zeroed metrics.
pub struct FieldValidator<'a> {
    table1: &'a Dataset,
    table2: &'a Dataset,
    config: ValidatorConfig,
}

impl<'a> FieldValidator<'a> {
    pub fn new(table1: &'a Dataset, table2: &'a Dataset) -> Self {
        Self::with_config(table1, table2, ValidatorConfig::default())
    }

    pub fn with_config(table1: &'a Dataset, table2: &'a Dataset, config: ValidatorConfig) -> Self {
        Self {
            table1,
            table2,
            config,
        }
    }

    /// Run every check on a column pair; date compatibility only when `is_date`.
    pub fn run_all_checks(&self, field1: &ColumnRef, field2: &ColumnRef, is_date: bool) -> FieldChecks {
        debug!(
            field1 = %field1,
            field2 = %field2,
            found1 = resolve(self.table1, field1).is_some(),
            found2 = resolve(self.table2, field2).is_some(),
            is_date,
            "running field checks"
        );

        FieldChecks {
            uniqueness: self.uniqueness_check(field1, field2),
            pattern_match: self.pattern_match_check(field1, field2),
            null_analysis: self.null_analysis(field1, field2),
            cardinality: self.cardinality_check(field1, field2),
            value_overlap: self.value_overlap_check(field1, field2),
            date_compatibility: is_date.then(|| self.date_compatibility_check(field1, field2)),
        }
    }

    pub fn uniqueness_check(&self, field1: &ColumnRef, field2: &ColumnRef) -> UniquenessCheck {
        UniquenessCheck {
            table1: side_uniqueness(
                &field1.column,
                resolve(self.table1, field1),
                self.table1.row_count(),
            ),
            table2: side_uniqueness(
                &field2.column,
                resolve(self.table2, field2),
                self.table2.row_count(),
            ),
        }
    }

    pub fn pattern_match_check(&self, field1: &ColumnRef, field2: &ColumnRef) -> PatternMatchCheck {
        let size = self.config.pattern_sample_size;
        pattern_match(
            side_pattern(&field1.column, resolve(self.table1, field1), size),
            side_pattern(&field2.column, resolve(self.table2, field2), size),
        )
    }

    pub fn null_analysis(&self, field1: &ColumnRef, field2: &ColumnRef) -> NullAnalysisCheck {
        let window = self.config.null_window;
        NullAnalysisCheck {
            table1: side_nulls(&field1.column, resolve(self.table1, field1), window),
            table2: side_nulls(&field2.column, resolve(self.table2, field2), window),
        }
    }

    pub fn cardinality_check(&self, field1: &ColumnRef, field2: &ColumnRef) -> CardinalityCheck {
        cardinality(resolve(self.table1, field1), resolve(self.table2, field2))
    }

    pub fn value_overlap_check(&self, field1: &ColumnRef, field2: &ColumnRef) -> ValueOverlapCheck {
        value_overlap(resolve(self.table1, field1), resolve(self.table2, field2))
    }

    pub fn date_compatibility_check(
        &self,
        field1: &ColumnRef,
        field2: &ColumnRef,
    ) -> DateCompatibilityCheck {
        date_compatibility(
            side_dates(&field1.column, resolve(self.table1, field1)),
            side_dates(&field2.column, resolve(self.table2, field2)),
        )
    }
}

/// Look up a referenced column; a reference to another dataset resolves to nothing.
fn resolve<'d>(dataset: &'d Dataset, field: &ColumnRef) -> Option<&'d Column> {
    if field.dataset != dataset.name() {
        return None;
    }
    dataset.column(&field.column)
}

fn side_uniqueness(name: &str, column: Option<&Column>, total_records: usize) -> SideUniqueness {
    let unique_values = column.map(|c| c.distinct_keys().len()).unwrap_or(0);
    let duplication_rate = match column {
        Some(_) if total_records > 0 => {
            100.0 * (1.0 - unique_values as f64 / total_records as f64)
        }
        _ => 0.0,
    };

    SideUniqueness {
        column: name.to_string(),
        column_found: column.is_some(),
        total_records,
        unique_values,
        duplication_rate,
    }
}

fn side_pattern(name: &str, column: Option<&Column>, sample_size: usize) -> SidePattern {
    let sample: Vec<String> = column
        .map(|c| c.text_values().take(sample_size).collect())
        .unwrap_or_default();

    let Some(first) = sample.first() else {
        return SidePattern {
            column: name.to_string(),
            column_found: column.is_some(),
            sample_size: 0,
            pattern: None,
            format_consistency: false,
            length_match: false,
            character_type: None,
        };
    };

    let pattern = shape(first);
    let format_consistency = sample.iter().all(|v| shape(v) == pattern);
    let first_len = first.chars().count();
    let length_match = sample.iter().all(|v| v.chars().count() == first_len);

    let character_type = if sample.iter().all(|v| NUMERIC.is_match(v)) {
        CharacterType::Numeric
    } else if sample.iter().all(|v| ALPHABETIC.is_match(v)) {
        CharacterType::Alphabetic
    } else {
        CharacterType::Alphanumeric
    };

    SidePattern {
        column: name.to_string(),
        column_found: true,
        sample_size: sample.len(),
        pattern: Some(pattern),
        format_consistency,
        length_match,
        character_type: Some(character_type),
    }
}

/// Character-class shape of a value: digits become `9`, letters `A`.
fn shape(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_digit() {
                '9'
            } else if c.is_alphabetic() {
                'A'
            } else {
                c
            }
        })
        .collect()
}

fn pattern_match(table1: SidePattern, table2: SidePattern) -> PatternMatchCheck {
    let same_pattern = matches!(
        (&table1.pattern, &table2.pattern),
        (Some(a), Some(b)) if a == b
    );
    let same_character_type = matches!(
        (table1.character_type, table2.character_type),
        (Some(a), Some(b)) if a == b
    );
    PatternMatchCheck {
        table1,
        table2,
        same_pattern,
        same_character_type,
    }
}

fn side_nulls(name: &str, column: Option<&Column>, window: usize) -> SideNulls {
    let Some(column) = column else {
        return SideNulls {
            column: name.to_string(),
            column_found: false,
            null_count: 0,
            null_percentage: 0.0,
            distribution: NullDistribution::default(),
        };
    };

    let missing: Vec<bool> = column.values.iter().map(|v| v.is_missing()).collect();
    let len = missing.len();
    let null_count = missing.iter().filter(|m| **m).count();

    let start_end = window.min(len);
    let mid_start = (len / 2).saturating_sub(window / 2);
    let mid_end = (mid_start + window).min(len);

    SideNulls {
        column: name.to_string(),
        column_found: true,
        null_count,
        null_percentage: percentage(null_count, len),
        distribution: NullDistribution {
            start: null_rate(&missing[..start_end]),
            middle: null_rate(&missing[mid_start..mid_end]),
            end: null_rate(&missing[len - start_end..]),
        },
    }
}

fn null_rate(window: &[bool]) -> f64 {
    percentage(window.iter().filter(|m| **m).count(), window.len())
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

fn cardinality(col1: Option<&Column>, col2: Option<&Column>) -> CardinalityCheck {
    let counts1: Vec<usize> = col1
        .map(|c| c.value_counts().into_values().collect())
        .unwrap_or_default();
    let counts2: Vec<usize> = col2
        .map(|c| c.value_counts().into_values().collect())
        .unwrap_or_default();

    let max1 = counts1.iter().copied().max();
    let max2 = counts2.iter().copied().max();

    let relationship = match (max1, max2) {
        (Some(a), Some(b)) if a <= 1 && b <= 1 => Relationship::OneToOne,
        (Some(a), Some(_)) if a <= 1 => Relationship::OneToMany,
        (Some(_), Some(b)) if b <= 1 => Relationship::ManyToOne,
        (Some(_), Some(_)) => Relationship::ManyToMany,
        _ => Relationship::Unknown,
    };

    CardinalityCheck {
        relationship,
        max_fan_out: max1.unwrap_or(0).max(max2.unwrap_or(0)),
        table1_distribution: FrequencySummary::from_counts(counts1),
        table2_distribution: FrequencySummary::from_counts(counts2),
    }
}

pub(crate) fn value_overlap(col1: Option<&Column>, col2: Option<&Column>) -> ValueOverlapCheck {
    let set1 = col1.map(Column::distinct_keys).unwrap_or_default();
    let set2 = col2.map(Column::distinct_keys).unwrap_or_default();
    super::overlap_of_sets(&set1, &set2)
}

fn side_dates(name: &str, column: Option<&Column>) -> SideDates {
    let parsed: Vec<Option<chrono::NaiveDateTime>> = column
        .map(|c| c.values.iter().map(parse_value).collect())
        .unwrap_or_default();

    let dates: Vec<chrono::NaiveDateTime> = parsed.iter().flatten().copied().collect();
    let earliest = dates.iter().min().copied();
    let latest = dates.iter().max().copied();

    let range_years = match (earliest, latest) {
        (Some(min), Some(max)) => (max - min).num_days() as f64 / DAYS_PER_YEAR,
        _ => 0.0,
    };

    let granularity = if dates.is_empty() {
        Granularity::Unknown
    } else if dates.iter().any(|d| d.time() != chrono::NaiveTime::MIN) {
        Granularity::Timestamp
    } else {
        Granularity::Date
    };

    SideDates {
        column: name.to_string(),
        column_found: column.is_some(),
        format_match: !parsed.is_empty() && parsed.iter().all(Option::is_some),
        range_years,
        earliest,
        latest,
        granularity,
    }
}

fn date_compatibility(table1: SideDates, table2: SideDates) -> DateCompatibilityCheck {
    let ranges_overlap = match (table1.earliest, table1.latest, table2.earliest, table2.latest) {
        (Some(min1), Some(max1), Some(min2), Some(max2)) => min1 <= max2 && min2 <= max1,
        _ => false,
    };
    DateCompatibilityCheck {
        table1,
        table2,
        ranges_overlap,
    }
}
