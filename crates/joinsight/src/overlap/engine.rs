//! Verification of a candidate mapping: per-field checks and combined overlap.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::simulation::{JoinSimulation, simulate_join};
use crate::dataset::{Column, Dataset};
use crate::dates::{DateNormalizer, NormalizerConfig};
use crate::error::SimulationError;
use crate::mapping::{CandidateMapping, ColumnRef, FieldMapping, Role};
use crate::validation::{
    FieldChecks, FieldValidator, ValidatorConfig, ValueOverlapCheck, overlap_of_sets,
};

/// Values a per-field overlap was computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapBasis {
    Raw,
    MonthlyPeriod,
}

/// Role-aware distinct-value overlap of one field pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOverlap {
    #[serde(flatten)]
    pub overlap: ValueOverlapCheck,
    pub basis: OverlapBasis,
}

/// Everything verified about one field pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldVerification {
    pub role: Role,
    pub left_column: String,
    pub right_column: String,
    pub checks: FieldChecks,
    /// Absent when either column is missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap: Option<FieldOverlap>,
}

/// Combined-mapping overlap, or why it could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CombinedOverlap {
    Computed(JoinSimulation),
    Failed { error: SimulationError },
}

/// Verification of one candidate mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub left_dataset: String,
    pub right_dataset: String,
    /// Keyed by field-pair key, in mapping order.
    pub fields: IndexMap<String, FieldVerification>,
    /// Absent for an empty mapping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined_overlap: Option<CombinedOverlap>,
}

impl VerificationResult {
    /// The join simulation, when it was computed.
    pub fn simulation(&self) -> Option<&JoinSimulation> {
        match &self.combined_overlap {
            Some(CombinedOverlap::Computed(sim)) => Some(sim),
            _ => None,
        }
    }

    /// The reason the combined overlap failed, if it did.
    pub fn combined_error(&self) -> Option<&SimulationError> {
        match &self.combined_overlap {
            Some(CombinedOverlap::Failed { error }) => Some(error),
            _ => None,
        }
    }

    /// Verification for a role, if mapped.
    pub fn field_for(&self, role: Role) -> Option<&FieldVerification> {
        self.fields.values().find(|f| f.role == role)
    }
}

/// Runs field checks and overlap analysis for candidate mappings.
#[derive(Debug, Clone, Default)]
pub struct OverlapEngine {
    validator: ValidatorConfig,
    normalizer: DateNormalizer,
}

impl OverlapEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(validator: ValidatorConfig, normalizer: NormalizerConfig) -> Self {
        Self {
            validator,
            normalizer: DateNormalizer::with_config(normalizer),
        }
    }

    /// Verify every field of `candidate` and simulate the combined join.
    ///
    /// Never fails: missing columns degrade their checks, and combined
    /// failures are reported inside the result.
    pub fn verify_mapping(
        &self,
        candidate: &CandidateMapping,
        table1: &Dataset,
        table2: &Dataset,
    ) -> VerificationResult {
        let validator = FieldValidator::with_config(table1, table2, self.validator.clone());

        let fields = candidate
            .fields()
            .iter()
            .map(|field| {
                let checks = validator.run_all_checks(&field.left, &field.right, field.is_date());
                let verification = FieldVerification {
                    role: field.role,
                    left_column: field.left.column.clone(),
                    right_column: field.right.column.clone(),
                    checks,
                    overlap: self.field_overlap(field, table1, table2),
                };
                (field.key(), verification)
            })
            .collect();

        let combined_overlap = (!candidate.is_empty()).then(|| {
            match simulate_join(candidate, table1, table2, &self.normalizer) {
                Ok(sim) => CombinedOverlap::Computed(sim),
                Err(error) => {
                    info!(error = %error, "combined overlap unavailable");
                    CombinedOverlap::Failed { error }
                }
            }
        });

        VerificationResult {
            left_dataset: table1.name().to_string(),
            right_dataset: table2.name().to_string(),
            fields,
            combined_overlap,
        }
    }

    /// Simulate the combined join of a candidate.
    pub fn simulate_join(
        &self,
        candidate: &CandidateMapping,
        table1: &Dataset,
        table2: &Dataset,
    ) -> Result<JoinSimulation, SimulationError> {
        simulate_join(candidate, table1, table2, &self.normalizer)
    }

    fn field_overlap(
        &self,
        field: &FieldMapping,
        table1: &Dataset,
        table2: &Dataset,
    ) -> Option<FieldOverlap> {
        let col1 = resolve(table1, &field.left)?;
        let col2 = resolve(table2, &field.right)?;

        if field.is_date() {
            let periods = self
                .normalizer
                .normalize(table1, &col1.name)
                .and_then(|n1| Ok((n1, self.normalizer.normalize(table2, &col2.name)?)));
            match periods {
                Ok((n1, n2)) => {
                    return Some(FieldOverlap {
                        overlap: overlap_of_sets(&n1.distinct_keys(), &n2.distinct_keys()),
                        basis: OverlapBasis::MonthlyPeriod,
                    });
                }
                Err(failure) => {
                    debug!(field = %field.key(), error = %failure, "date overlap on raw values");
                }
            }
        }

        Some(FieldOverlap {
            overlap: overlap_of_sets(&col1.distinct_keys(), &col2.distinct_keys()),
            basis: OverlapBasis::Raw,
        })
    }
}

fn resolve<'d>(dataset: &'d Dataset, field: &ColumnRef) -> Option<&'d Column> {
    if field.dataset != dataset.name() {
        return None;
    }
    dataset.column(&field.column)
}
