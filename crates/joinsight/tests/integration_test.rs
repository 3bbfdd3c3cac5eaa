//! Integration tests for joinsight.

use std::io::Write;
use tempfile::NamedTempFile;

use joinsight::overlap::OverlapBasis;
use joinsight::{
    CandidateMapping, Column, ColumnType, CombinedOverlap, DateParseFailure, Dataset, JoinAdvisor,
    MappingDocument, Role, SimulationError, Value,
};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|v| Value::Integer(*v)).collect()
}

fn month_of(customer: i64) -> i64 {
    (customer - 1) % 6 + 1
}

/// 100 orders from customers 1-100, spread over January to June 2023.
fn orders() -> Dataset {
    let customers: Vec<Value> = (1..=100).map(Value::Integer).collect();
    let dates: Vec<Value> = (1..=100)
        .map(|c| Value::from(format!("2023-{:02}-15", month_of(c))))
        .collect();
    Dataset::new(
        "orders",
        vec![
            Column::new("customer_id", customers),
            Column::new("order_date", dates),
        ],
    )
    .expect("valid dataset")
}

/// 50 monthly account rows for customers 51-100.
fn accounts() -> Dataset {
    let customers: Vec<Value> = (51..=100).map(Value::Integer).collect();
    let periods: Vec<Value> = (51..=100)
        .map(|c| Value::from(format!("2023-{:02}", month_of(c))))
        .collect();
    Dataset::new(
        "accounts",
        vec![Column::new("cust", customers), Column::new("period", periods)],
    )
    .expect("valid dataset")
}

fn orders_to_accounts() -> CandidateMapping {
    CandidateMapping::between(
        "orders",
        "accounts",
        ("customer_id", "cust"),
        ("order_date", "period"),
        None,
    )
    .expect("valid candidate")
}

// =============================================================================
// End-to-end Scenarios
// =============================================================================

#[test]
fn test_partial_customer_overlap_with_monthly_dates() {
    let report = JoinAdvisor::new().evaluate(&orders_to_accounts(), &orders(), &accounts());
    let verification = &report.verification;

    let customer = verification.field_for(Role::Customer).unwrap();
    let overlap = customer.overlap.as_ref().unwrap();
    assert_eq!(overlap.overlap.overlap_percentage, 50.0);
    assert_eq!(overlap.overlap.unique_to_table1, 50);
    assert_eq!(overlap.overlap.unique_to_table2, 0);

    let date = verification.field_for(Role::Date).unwrap();
    let overlap = date.overlap.as_ref().unwrap();
    assert_eq!(overlap.basis, OverlapBasis::MonthlyPeriod);
    assert_eq!(overlap.overlap.overlap_percentage, 100.0);

    let sim = verification.simulation().expect("combined overlap computed");
    assert_eq!(sim.matching_records, 50);
    assert_eq!(sim.total_records_table1, 100);
    assert_eq!(sim.total_records_table2, 50);
    assert_eq!(sim.overlap_percentage, 100.0);
    assert_eq!(sim.multiplication_factor, 0.5);
    assert!(!sim.has_duplicates);
    assert!(sim.warning.is_none());
}

#[test]
fn test_uniqueness_score_for_duplicated_key() {
    let t1 = Dataset::new(
        "t1",
        vec![
            Column::new("c", ints(&[1, 1, 2])),
            Column::from_raw("d", ["2023-01-01", "2023-01-02", "2023-01-03"]),
        ],
    )
    .unwrap();
    let t2 = Dataset::new(
        "t2",
        vec![
            Column::new("c", ints(&[1, 2, 3])),
            Column::from_raw("d", ["2023-01", "2023-01", "2023-01"]),
        ],
    )
    .unwrap();
    let candidate = CandidateMapping::between("t1", "t2", ("c", "c"), ("d", "d"), None).unwrap();

    let report = JoinAdvisor::new().evaluate(&candidate, &t1, &t2);
    let health = &report.health["c_c"];
    assert!((health.uniqueness_score - 83.35).abs() < 0.05);
    assert!(health.overall_health <= 100.0 && health.overall_health >= 0.0);
}

#[test]
fn test_unparseable_date_column_reports_failure() {
    let t1 = Dataset::new(
        "t1",
        vec![
            Column::new("customer", ints(&[1, 2, 3])),
            Column::new(
                "date",
                vec!["N/A".into(), "1/15/23".into(), "not a date".into()],
            ),
        ],
    )
    .unwrap();
    let t2 = Dataset::new(
        "t2",
        vec![
            Column::new("customer", ints(&[1, 2, 3])),
            Column::from_raw("date", ["2023-01", "2023-01", "2023-02"]),
        ],
    )
    .unwrap();
    let candidate = CandidateMapping::between(
        "t1",
        "t2",
        ("customer", "customer"),
        ("date", "date"),
        None,
    )
    .unwrap();

    let report = JoinAdvisor::new().evaluate(&candidate, &t1, &t2);

    // The failure is an explicit error entry, not zero matches.
    assert!(report.verification.simulation().is_none());
    match report.verification.combined_error() {
        Some(SimulationError::DateParse { dataset, failure }) => {
            assert_eq!(dataset, "t1");
            match failure {
                DateParseFailure::TooManyFailures {
                    failure_rate,
                    samples,
                    ..
                } => {
                    assert!(*failure_rate > 0.66 && *failure_rate < 0.67);
                    assert_eq!(samples, &vec!["N/A", "1/15/23", "not a date"]);
                }
                other => panic!("unexpected failure {other:?}"),
            }
        }
        other => panic!("expected a date parse failure, got {other:?}"),
    }

    // Field checks still ran, and the date overlap fell back to raw values.
    let date = report.verification.field_for(Role::Date).unwrap();
    assert_eq!(date.overlap.as_ref().unwrap().basis, OverlapBasis::Raw);
    assert!(date.checks.date_compatibility.is_some());
}

#[test]
fn test_duplicate_keys_fan_out() {
    let t1 = Dataset::new(
        "t1",
        vec![
            Column::new("id", ints(&[1, 1, 2])),
            Column::from_raw("month", ["2023-01", "2023-01", "2023-01"]),
        ],
    )
    .unwrap();
    let t2 = Dataset::new(
        "t2",
        vec![
            Column::new("customer", ints(&[1, 1, 1])),
            Column::from_raw("period", ["2023-01", "2023-01", "2023-01"]),
        ],
    )
    .unwrap();
    let candidate =
        CandidateMapping::between("t1", "t2", ("id", "customer"), ("month", "period"), None)
            .unwrap();

    let report = JoinAdvisor::new().evaluate(&candidate, &t1, &t2);
    let sim = report.verification.simulation().unwrap();

    assert_eq!(sim.matching_records, 6);
    assert_eq!(sim.multiplication_factor, 2.0);
    assert!(sim.has_duplicates);
    assert!(sim.warning.as_deref().unwrap_or_default().contains("multiplication factor"));
    assert!(report.recommendation.starts_with("Review join keys"));
}

#[test]
fn test_missing_column_degrades_without_error() {
    let candidate = CandidateMapping::between(
        "orders",
        "accounts",
        ("customer_id", "no_such_column"),
        ("order_date", "period"),
        None,
    )
    .unwrap();

    let report = JoinAdvisor::new().evaluate(&candidate, &orders(), &accounts());
    let customer = report.verification.field_for(Role::Customer).unwrap();

    assert!(customer.overlap.is_none());
    assert!(!customer.checks.uniqueness.table2.column_found);

    // An absent column cannot lift the candidate's mean health.
    let missing = &report.health["customer_id_no_such_column"];
    assert_eq!(missing.overall_health, 0.0);
    let date_health = report.health["order_date_period"].overall_health;
    assert!((report.mean_health - date_health / 2.0).abs() < 1e-9);

    assert!(matches!(
        report.verification.combined_error(),
        Some(SimulationError::ColumnNotFound { .. })
    ));
}

// =============================================================================
// File-based Tests
// =============================================================================

#[test]
fn test_files_and_mapping_documents() {
    let sales = create_test_file(
        "customer_id\torder_date\tsku\n\
         101\t2024-01-03\tA-1\n\
         102\t01/17/2024\tA-2\n\
         103\tFeb 2 2024\tA-1\n",
    );
    let ledger = create_test_file(
        "cust,period,product\n\
         101,2024-01,A-1\n\
         102,2024-01,A-2\n\
         104,2024-02,A-3\n",
    );

    let advisor = JoinAdvisor::new();
    let (sales, source) = advisor.load(sales.path()).unwrap();
    let (ledger, _) = advisor.load(ledger.path()).unwrap();
    assert_eq!(source.row_count, 3);
    assert_eq!(sales.column("customer_id").unwrap().column_type, ColumnType::Integer);

    let documents: Vec<MappingDocument> = serde_json::from_str(
        r#"[
            {
                "customer_mapping": {"table1_field": "customer_id", "table2_field": "cust"},
                "date_mapping": {"table1_field": "order_date", "table2_field": "period"},
                "product_mapping": {"table1_field": "sku", "table2_field": "product"}
            },
            {
                "customer_mapping": {"table1_field": "customer_id", "table2_field": "cust"}
            }
        ]"#,
    )
    .unwrap();

    let results = advisor.evaluate_batch(&documents, &sales, &ledger);
    assert_eq!(results.len(), 2);

    let report = results[0].as_ref().expect("first candidate is complete");
    assert_eq!(report.health.len(), 3);
    let sim = report.verification.simulation().unwrap();
    assert_eq!(sim.matching_records, 2);

    assert!(results[1].is_err());
}

#[test]
fn test_report_serializes_to_json() {
    let report = JoinAdvisor::new().evaluate(&orders_to_accounts(), &orders(), &accounts());
    let json = serde_json::to_value(&report).unwrap();

    let field = &json["verification"]["fields"]["customer_id_cust"];
    assert_eq!(field["role"], "customer");
    assert_eq!(field["checks"]["cardinality"]["relationship"], "one-to-one");
    assert_eq!(json["verification"]["combined_overlap"]["status"], "computed");

    let reparsed: joinsight::JoinReport = serde_json::from_value(json).unwrap();
    assert!(matches!(
        reparsed.verification.combined_overlap,
        Some(CombinedOverlap::Computed(_))
    ));
}

#[test]
fn test_profile_for_suggestion_service() {
    let file = create_test_file("id,city\n1,Oslo\n2,\n3,Oslo\n");
    let (dataset, _) = JoinAdvisor::new().load(file.path()).unwrap();

    let profile = dataset.profile(2);
    assert_eq!(profile.row_count, 3);
    let city = &profile.columns[1];
    assert_eq!(city.null_count, 1);
    assert_eq!(city.distinct_count, 1);
    assert_eq!(city.sample_values.len(), 2);
}
