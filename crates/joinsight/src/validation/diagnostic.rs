//! Typed results of the join-field checks.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::stats::FrequencySummary;

/// Kind of check that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckType {
    Uniqueness,
    PatternMatch,
    NullAnalysis,
    Cardinality,
    ValueOverlap,
    DateCompatibility,
}

impl CheckType {
    pub fn description(&self) -> &'static str {
        match self {
            CheckType::Uniqueness => "Whether the proposed join fields identify records uniquely",
            CheckType::PatternMatch => "Whether values follow the same pattern in both tables",
            CheckType::NullAnalysis => "How missing values are spread through the join fields",
            CheckType::Cardinality => "Relationship type and fan-out between the tables",
            CheckType::ValueOverlap => "How many distinct values appear in both tables",
            CheckType::DateCompatibility => "Whether the date fields parse, and over which range",
        }
    }
}

/// One check's outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check_type", content = "metrics", rename_all = "snake_case")]
pub enum Diagnostic {
    Uniqueness(UniquenessCheck),
    PatternMatch(PatternMatchCheck),
    NullAnalysis(NullAnalysisCheck),
    Cardinality(CardinalityCheck),
    ValueOverlap(ValueOverlapCheck),
    DateCompatibility(DateCompatibilityCheck),
}

impl Diagnostic {
    pub fn check_type(&self) -> CheckType {
        match self {
            Diagnostic::Uniqueness(_) => CheckType::Uniqueness,
            Diagnostic::PatternMatch(_) => CheckType::PatternMatch,
            Diagnostic::NullAnalysis(_) => CheckType::NullAnalysis,
            Diagnostic::Cardinality(_) => CheckType::Cardinality,
            Diagnostic::ValueOverlap(_) => CheckType::ValueOverlap,
            Diagnostic::DateCompatibility(_) => CheckType::DateCompatibility,
        }
    }

    pub fn description(&self) -> &'static str {
        self.check_type().description()
    }
}

/// Duplication on one side of a field pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideUniqueness {
    pub column: String,
    pub column_found: bool,
    pub total_records: usize,
    /// Distinct non-missing values.
    pub unique_values: usize,
    /// `100 × (1 − unique/total)`; 0 for an empty or absent column.
    pub duplication_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniquenessCheck {
    pub table1: SideUniqueness,
    pub table2: SideUniqueness,
}

/// Character composition of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterType {
    Numeric,
    Alphabetic,
    Alphanumeric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SidePattern {
    pub column: String,
    pub column_found: bool,
    pub sample_size: usize,
    /// Shape of the first sampled value: digits as `9`, letters as `A`, others literal.
    ///
    /// Shapes compare character classes, so `A-001` and `B-002` match even
    /// though neither is a prefix of the other.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Every sampled value has the first value's shape, not its literal text.
    pub format_consistency: bool,
    /// Every sampled value has the same length.
    pub length_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_type: Option<CharacterType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatchCheck {
    pub table1: SidePattern,
    pub table2: SidePattern,
    /// Both sides have a pattern and the leading shapes agree.
    pub same_pattern: bool,
    /// Both sides share a character type.
    pub same_character_type: bool,
}

/// Null percentage over leading, middle and trailing row windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NullDistribution {
    pub start: f64,
    pub middle: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideNulls {
    pub column: String,
    pub column_found: bool,
    pub null_count: usize,
    pub null_percentage: f64,
    pub distribution: NullDistribution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullAnalysisCheck {
    pub table1: SideNulls,
    pub table2: SideNulls,
}

/// Join relationship implied by per-value repetition on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relationship {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
    /// One side has no usable values.
    Unknown,
}

impl Relationship {
    pub fn label(&self) -> &'static str {
        match self {
            Relationship::OneToOne => "one-to-one",
            Relationship::OneToMany => "one-to-many",
            Relationship::ManyToOne => "many-to-one",
            Relationship::ManyToMany => "many-to-many",
            Relationship::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardinalityCheck {
    pub relationship: Relationship,
    /// Highest repetition of any single value on either side.
    pub max_fan_out: usize,
    pub table1_distribution: FrequencySummary,
    pub table2_distribution: FrequencySummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueOverlapCheck {
    /// `100 × |A ∩ B| / max(|A|, |B|)` over distinct non-missing values.
    pub overlap_percentage: f64,
    pub overlap_count: usize,
    pub unique_to_table1: usize,
    pub unique_to_table2: usize,
    pub table1_distinct: usize,
    pub table2_distinct: usize,
}

/// Date or timestamp resolution of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Date,
    Timestamp,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideDates {
    pub column: String,
    pub column_found: bool,
    /// Every value is present and parses as a date.
    pub format_match: bool,
    /// Span between earliest and latest date, in years.
    pub range_years: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earliest: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<NaiveDateTime>,
    pub granularity: Granularity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateCompatibilityCheck {
    pub table1: SideDates,
    pub table2: SideDates,
    /// The two date ranges intersect.
    pub ranges_overlap: bool,
}
