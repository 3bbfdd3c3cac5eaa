//! Joinsight: join-compatibility validation for pairs of tabular datasets.
//!
//! Given two datasets and a candidate mapping of customer, date and
//! (optionally) product columns between them, joinsight measures whether the
//! mapping would produce a trustworthy join before anyone runs it.
//!
//! # Core Principles
//!
//! - **Read-only**: datasets are never modified
//! - **Fail soft**: a missing column degrades its checks instead of aborting
//! - **Explicit failures**: date columns that cannot be normalized are
//!   reported with the offending values, never silently treated as no match
//!
//! # Example
//!
//! ```no_run
//! use joinsight::{CandidateMapping, JoinAdvisor};
//!
//! let advisor = JoinAdvisor::new();
//! let (sales, _) = advisor.load("sales.csv").unwrap();
//! let (accounts, _) = advisor.load("accounts.csv").unwrap();
//!
//! let candidate = CandidateMapping::between(
//!     sales.name(),
//!     accounts.name(),
//!     ("customer_id", "cust"),
//!     ("order_date", "period"),
//!     None,
//! )
//! .unwrap();
//!
//! let report = advisor.evaluate(&candidate, &sales, &accounts);
//! println!("Mean health: {:.1}", report.mean_health);
//! ```

pub mod dataset;
pub mod dates;
pub mod error;
pub mod health;
pub mod input;
pub mod mapping;
pub mod overlap;
pub mod validation;

mod advisor;

pub use crate::advisor::{AdvisorConfig, JoinAdvisor, JoinReport};
pub use dataset::{Column, ColumnType, Dataset, DatasetProfile, Value};
pub use dates::{DateNormalizer, NormalizedDates, YearMonth};
pub use error::{DateParseFailure, JoinsightError, MappingError, Result, SimulationError};
pub use health::{HealthAggregator, HealthMetrics, HealthWeights};
pub use input::{DataTable, Parser, SourceMetadata};
pub use mapping::{CandidateMapping, ColumnRef, FieldMapping, MappingDocument, Role};
pub use overlap::{CombinedOverlap, JoinSimulation, OverlapEngine, VerificationResult};
pub use validation::{CheckType, Diagnostic, FieldChecks, FieldValidator};
