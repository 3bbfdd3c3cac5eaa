//! Check command - verify candidate mappings between two files.

use std::path::PathBuf;

use colored::Colorize;
use joinsight::overlap::FieldVerification;
use joinsight::{AdvisorConfig, CombinedOverlap, JoinAdvisor, JoinReport, MappingDocument};
use serde::Deserialize;

/// A mapping file holds one suggestion document or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum MappingInput {
    Many(Vec<MappingDocument>),
    One(MappingDocument),
}

pub fn run(
    left: PathBuf,
    right: PathBuf,
    mapping: PathBuf,
    json_output: bool,
    config: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    for path in [&left, &right, &mapping] {
        if !path.exists() {
            return Err(format!("File not found: {}", path.display()).into());
        }
    }

    let config = match config {
        Some(path) => AdvisorConfig::from_json_file(path)?,
        None => AdvisorConfig::default(),
    };
    let advisor = JoinAdvisor::with_config(config);

    let (table1, _) = advisor.load(&left)?;
    let (table2, _) = advisor.load(&right)?;

    // Identically named files would make every mapping a same-dataset pair.
    let (table1, table2) = if table1.name() == table2.name() {
        let name = table1.name().to_string();
        (
            table1.with_name(format!("{name}_left")),
            table2.with_name(format!("{name}_right")),
        )
    } else {
        (table1, table2)
    };

    let input: MappingInput = serde_json::from_str(&std::fs::read_to_string(&mapping)?)?;
    let documents = match input {
        MappingInput::Many(documents) => documents,
        MappingInput::One(document) => vec![document],
    };
    tracing::debug!(candidates = documents.len(), "loaded mapping file");

    let results = advisor.evaluate_batch(&documents, &table1, &table2);

    if json_output {
        let entries: Vec<serde_json::Value> = results
            .iter()
            .map(|result| match result {
                Ok(report) => serde_json::to_value(report),
                Err(e) => Ok(serde_json::json!({ "error": e.to_string() })),
            })
            .collect::<Result<_, _>>()?;
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!(
        "{} {} {} {}",
        "Checking".cyan().bold(),
        table1.name().white(),
        "against".cyan().bold(),
        table2.name().white()
    );
    println!(
        "  {} rows x {} rows, {} candidate(s)",
        table1.row_count(),
        table2.row_count(),
        documents.len()
    );

    for (index, result) in results.iter().enumerate() {
        println!();
        println!("{}", format!("Candidate {}", index + 1).yellow().bold());
        match result {
            Ok(report) => print_report(report),
            Err(e) => println!("  {} {}", "Invalid:".red().bold(), e),
        }
    }

    Ok(())
}

fn print_report(report: &JoinReport) {
    for (key, field) in &report.verification.fields {
        let health = report.health.get(key).map(|h| h.overall_health).unwrap_or(0.0);
        println!(
            "  {:8} {} {}",
            field.role.label(),
            key.white().bold(),
            format_health(health)
        );
        print_field(field);
    }

    match &report.verification.combined_overlap {
        Some(CombinedOverlap::Computed(sim)) => {
            println!(
                "  {} {} matching rows, {:.1}% overlap, factor {:.2}",
                "Combined:".cyan(),
                sim.matching_records.to_string().white().bold(),
                sim.overlap_percentage,
                sim.multiplication_factor
            );
            if let Some(warning) = &sim.warning {
                println!("  {} {}", "Warning:".yellow().bold(), warning);
            }
        }
        Some(CombinedOverlap::Failed { error }) => {
            println!("  {} {}", "Combined:".cyan(), error.to_string().red());
        }
        None => {}
    }

    println!("  {}", report.recommendation);
}

fn print_field(field: &FieldVerification) {
    let checks = &field.checks;
    println!(
        "           duplicates {:.1}% / {:.1}%, nulls {:.1}% / {:.1}%, {}",
        checks.uniqueness.table1.duplication_rate,
        checks.uniqueness.table2.duplication_rate,
        checks.null_analysis.table1.null_percentage,
        checks.null_analysis.table2.null_percentage,
        checks.cardinality.relationship.label()
    );

    match &field.overlap {
        Some(overlap) => println!(
            "           overlap {:.1}% ({} shared, {:?} values)",
            overlap.overlap.overlap_percentage, overlap.overlap.overlap_count, overlap.basis
        ),
        None => println!("           {}", "column missing, overlap skipped".red()),
    }
}

fn format_health(health: f64) -> String {
    let text = format!("{health:.1}");
    if health >= 80.0 {
        text.green().to_string()
    } else if health >= 50.0 {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}
