//! Typed columns and type inference from raw text.

use std::collections::HashSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::value::{Value, ValueKey};

// Prefix shapes that are typed as dates at ingestion. Anything looser stays
// text and is left to the date normalizer.
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap(), // ISO date
        Regex::new(r"^\d{2}/\d{2}/\d{4}").unwrap(), // US date
        Regex::new(r"^\d{4}/\d{2}/\d{2}").unwrap(), // Alt ISO
    ]
});

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

/// Inferred storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Whole numbers (no decimal point).
    Integer,
    /// Floating-point numbers.
    Float,
    /// Boolean values (true/false).
    Boolean,
    /// Date only (no time component).
    Date,
    /// Date and time values.
    DateTime,
    /// Text, or a mix of types.
    String,
    /// No non-missing values to infer from.
    #[default]
    Unknown,
}

impl ColumnType {
    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    /// Returns true if this type is temporal.
    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnType::DateTime | ColumnType::Date)
    }

    fn of(value: &Value) -> Option<ColumnType> {
        match value {
            v if v.is_missing() => None,
            Value::Integer(_) => Some(ColumnType::Integer),
            Value::Float(_) => Some(ColumnType::Float),
            Value::Boolean(_) => Some(ColumnType::Boolean),
            Value::Date(_) => Some(ColumnType::Date),
            Value::DateTime(_) => Some(ColumnType::DateTime),
            Value::Text(_) | Value::Null => Some(ColumnType::String),
        }
    }

    /// Unify two observed types into the narrowest type holding both.
    fn unify(self, other: ColumnType) -> ColumnType {
        use ColumnType::{Date, DateTime, Float, Integer, String, Unknown};
        match (self, other) {
            (a, b) if a == b => a,
            (Unknown, b) => b,
            (a, Unknown) => a,
            (Integer, Float) | (Float, Integer) => Float,
            (Date, DateTime) | (DateTime, Date) => DateTime,
            _ => String,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::String => "text",
            ColumnType::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// A named column of values sharing one inferred type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub values: Vec<Value>,
}

impl Column {
    /// Build a column from typed values, inferring the column type.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        let column_type = infer_column_type(&values);
        Self {
            name: name.into(),
            column_type,
            values,
        }
    }

    /// Build a column from raw text cells, detecting nulls and value types.
    pub fn from_raw<'a>(name: impl Into<String>, raw: impl IntoIterator<Item = &'a str>) -> Self {
        let raw: Vec<&str> = raw.into_iter().collect();

        let detected: Vec<Option<ColumnType>> = raw
            .iter()
            .map(|v| {
                if is_null_value(v) {
                    None
                } else {
                    Some(detect_value_type(v))
                }
            })
            .collect();

        let column_type = detected
            .iter()
            .flatten()
            .fold(ColumnType::Unknown, |acc, t| acc.unify(*t));

        let mut values: Vec<Value> = raw
            .iter()
            .map(|v| {
                if is_null_value(v) {
                    Value::Null
                } else {
                    convert(v.trim(), column_type)
                }
            })
            .collect();

        // A date pattern that chrono rejects (e.g. 02/30/2024) demotes the column to text.
        let column_type = if column_type.is_temporal()
            && values.iter().any(|v| matches!(v, Value::Text(_)))
        {
            values = raw
                .iter()
                .map(|v| {
                    if is_null_value(v) {
                        Value::Null
                    } else {
                        Value::Text(v.trim().to_string())
                    }
                })
                .collect();
            ColumnType::String
        } else {
            column_type
        };

        Self {
            name: name.into(),
            column_type,
            values,
        }
    }

    /// Number of cells, including missing ones.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of missing cells.
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// Distinct non-missing values.
    pub fn distinct_keys(&self) -> HashSet<ValueKey> {
        self.values.iter().filter_map(Value::key).collect()
    }

    /// Per-value repetition counts over non-missing values, in first-seen order.
    pub fn value_counts(&self) -> IndexMap<ValueKey, usize> {
        let mut counts: IndexMap<ValueKey, usize> = IndexMap::new();
        for key in self.values.iter().filter_map(Value::key) {
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
    }

    /// Text rendering of every non-missing value, in row order.
    pub fn text_values(&self) -> impl Iterator<Item = String> + '_ {
        self.values.iter().filter_map(Value::to_text)
    }
}

/// Check if a raw cell represents a missing/null value.
pub fn is_null_value(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("nil")
        || trimmed == "."
        || trimmed == "-"
}

fn infer_column_type(values: &[Value]) -> ColumnType {
    values
        .iter()
        .filter_map(ColumnType::of)
        .fold(ColumnType::Unknown, ColumnType::unify)
}

/// Detect the type of a single raw value.
fn detect_value_type(value: &str) -> ColumnType {
    let trimmed = value.trim();

    // Only clear boolean words; 0/1 stay integers.
    if matches!(
        trimmed.to_lowercase().as_str(),
        "true" | "false" | "yes" | "no"
    ) {
        return ColumnType::Boolean;
    }

    if trimmed.parse::<i64>().is_ok() {
        return ColumnType::Integer;
    }

    if trimmed.parse::<f64>().is_ok() {
        return ColumnType::Float;
    }

    if DATE_PATTERNS.iter().any(|pattern| pattern.is_match(trimmed)) {
        if trimmed.contains(':') || trimmed.contains('T') {
            return ColumnType::DateTime;
        }
        return ColumnType::Date;
    }

    ColumnType::String
}

/// Convert a trimmed, non-null raw value into the column's type.
///
/// Values that do not fit the type are kept as text.
fn convert(value: &str, column_type: ColumnType) -> Value {
    match column_type {
        ColumnType::Integer => value
            .parse::<i64>()
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::Text(value.to_string())),
        ColumnType::Float => value
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::Text(value.to_string())),
        ColumnType::Boolean => match value.to_lowercase().as_str() {
            "true" | "yes" => Value::Boolean(true),
            "false" | "no" => Value::Boolean(false),
            _ => Value::Text(value.to_string()),
        },
        ColumnType::Date => DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
            .map(Value::Date)
            .unwrap_or_else(|| Value::Text(value.to_string())),
        ColumnType::DateTime => DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
            .map(Value::DateTime)
            .or_else(|| {
                DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(Value::DateTime)
            })
            .unwrap_or_else(|| Value::Text(value.to_string())),
        ColumnType::String | ColumnType::Unknown => Value::Text(value.to_string()),
    }
}
