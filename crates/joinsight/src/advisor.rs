//! Main `JoinAdvisor` struct and public API.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dataset::Dataset;
use crate::dates::NormalizerConfig;
use crate::error::{JoinsightError, MappingError, Result};
use crate::health::{HealthAggregator, HealthMetrics, HealthWeights};
use crate::input::{Parser, ParserConfig, SourceMetadata};
use crate::mapping::{CandidateMapping, MappingDocument};
use crate::overlap::{OverlapEngine, VerificationResult};
use crate::validation::ValidatorConfig;

/// Health at or above which a candidate is reported as a good join.
const GOOD_HEALTH: f64 = 80.0;
/// Health below which a candidate is reported as a poor join.
const POOR_HEALTH: f64 = 50.0;

/// Configuration for join evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub parser: ParserConfig,
    pub validator: ValidatorConfig,
    pub normalizer: NormalizerConfig,
    pub weights: HealthWeights,
}

impl AdvisorConfig {
    /// Load a configuration from a JSON file. Missing keys take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| JoinsightError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = serde_json::from_str(&text)?;
        Ok(config)
    }
}

/// Evaluation of one candidate mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinReport {
    pub verification: VerificationResult,
    /// Health per field-pair key.
    pub health: IndexMap<String, HealthMetrics>,
    /// Mean overall health over all field pairs; 0 with no fields.
    pub mean_health: f64,
    /// Human-readable recommendation.
    pub recommendation: String,
}

/// Verifies candidate join mappings between two datasets.
pub struct JoinAdvisor {
    parser: Parser,
    engine: OverlapEngine,
    health: HealthAggregator,
}

impl JoinAdvisor {
    /// Create an advisor with default configuration.
    pub fn new() -> Self {
        Self::with_config(AdvisorConfig::default())
    }

    pub fn with_config(config: AdvisorConfig) -> Self {
        Self {
            parser: Parser::with_config(config.parser),
            engine: OverlapEngine::with_config(config.validator, config.normalizer),
            health: HealthAggregator::with_weights(config.weights),
        }
    }

    /// Load a delimited file as a dataset named after its file stem.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        self.parser.load_dataset(path)
    }

    /// Verify one candidate and score every field pair.
    pub fn evaluate(
        &self,
        candidate: &CandidateMapping,
        table1: &Dataset,
        table2: &Dataset,
    ) -> JoinReport {
        let verification = self.engine.verify_mapping(candidate, table1, table2);
        let health = self.health.score_all(&verification);

        let mean_health = if health.is_empty() {
            0.0
        } else {
            health.values().map(|h| h.overall_health).sum::<f64>() / health.len() as f64
        };

        let recommendation = recommend(&verification, mean_health);
        debug!(
            table1 = table1.name(),
            table2 = table2.name(),
            fields = health.len(),
            mean_health,
            "evaluated candidate"
        );

        JoinReport {
            verification,
            health,
            mean_health,
            recommendation,
        }
    }

    /// Evaluate suggestion documents in order, one entry per document.
    ///
    /// A document that does not form a valid candidate yields its error
    /// without affecting the others.
    pub fn evaluate_batch(
        &self,
        documents: &[MappingDocument],
        table1: &Dataset,
        table2: &Dataset,
    ) -> Vec<std::result::Result<JoinReport, MappingError>> {
        documents
            .iter()
            .enumerate()
            .map(|(index, document)| {
                let candidate = document
                    .clone()
                    .into_candidate(table1.name(), table2.name())
                    .inspect_err(|e| warn!(index, error = %e, "skipping invalid candidate"))?;
                Ok(self.evaluate(&candidate, table1, table2))
            })
            .collect()
    }
}

impl Default for JoinAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

fn recommend(verification: &VerificationResult, mean_health: f64) -> String {
    if let Some(error) = verification.combined_error() {
        return format!("Combined join could not be evaluated: {error}");
    }
    if let Some(warning) = verification.simulation().and_then(|s| s.warning.as_ref()) {
        return format!("Review join keys before merging. {warning}");
    }
    if mean_health >= GOOD_HEALTH {
        format!("Join looks healthy (score: {mean_health:.0}).")
    } else if mean_health >= POOR_HEALTH {
        format!("Join is usable but weak (score: {mean_health:.0}). Review low-scoring fields.")
    } else {
        format!("Join is unlikely to be reliable (score: {mean_health:.0}).")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::SuggestedPair;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn pair(left: &str, right: &str) -> Option<SuggestedPair> {
        Some(SuggestedPair {
            table1_field: left.to_string(),
            table2_field: right.to_string(),
        })
    }

    fn load_pair() -> (Dataset, Dataset) {
        let orders = create_test_file(
            "customer_id,order_date\n1,2023-01-04\n2,2023-01-19\n3,2023-02-07\n",
        );
        let accounts = create_test_file("cust,period\n1,2023-01\n2,2023-01\n3,2023-02\n");
        let advisor = JoinAdvisor::new();
        let (orders, _) = advisor.load(orders.path()).unwrap();
        let (accounts, _) = advisor.load(accounts.path()).unwrap();
        (orders, accounts)
    }

    #[test]
    fn test_evaluate_loaded_files() {
        let (orders, accounts) = load_pair();
        let candidate = CandidateMapping::between(
            orders.name(),
            accounts.name(),
            ("customer_id", "cust"),
            ("order_date", "period"),
            None,
        )
        .unwrap();

        let report = JoinAdvisor::new().evaluate(&candidate, &orders, &accounts);
        assert_eq!(report.health.len(), 2);
        assert_eq!(report.health["customer_id_cust"].overall_health, 100.0);
        // field checks compare raw date cells, so the date pair scores lower
        assert!(report.health["order_date_period"].overall_health < 60.0);
        assert!(report.mean_health > 50.0 && report.mean_health < 80.0);
        assert!(report.recommendation.starts_with("Join is usable"));
        assert_eq!(report.verification.simulation().unwrap().matching_records, 3);
    }

    #[test]
    fn test_batch_isolates_invalid_documents() {
        let (orders, accounts) = load_pair();
        let documents = vec![
            MappingDocument {
                customer_mapping: pair("customer_id", "cust"),
                date_mapping: None,
                product_mapping: None,
            },
            MappingDocument {
                customer_mapping: pair("customer_id", "cust"),
                date_mapping: pair("order_date", "period"),
                product_mapping: None,
            },
        ];

        let reports = JoinAdvisor::new().evaluate_batch(&documents, &orders, &accounts);
        assert_eq!(reports.len(), 2);
        assert!(reports[0].is_err());
        assert_eq!(reports[1].as_ref().unwrap().health.len(), 2);
    }

    #[test]
    fn test_config_from_json_uses_defaults() {
        let file = create_test_file(r#"{"normalizer": {"max_failure_rate": 0.5}}"#);
        let config = AdvisorConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.normalizer.max_failure_rate, 0.5);
        assert_eq!(config.normalizer.sample_size, 5);
        assert_eq!(config.validator.null_window, 100);
        assert_eq!(config.weights, HealthWeights::default());
    }

    #[test]
    fn test_date_failure_drives_recommendation() {
        let (orders, accounts) = load_pair();
        let candidate = CandidateMapping::between(
            orders.name(),
            accounts.name(),
            ("customer_id", "cust"),
            ("customer_id", "period"),
            None,
        )
        .unwrap();
        let report = JoinAdvisor::new().evaluate(&candidate, &orders, &accounts);
        assert!(report.recommendation.starts_with("Combined join could not be evaluated"));
    }
}
