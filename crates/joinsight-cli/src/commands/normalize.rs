//! Normalize command - show the monthly periods of a date column.

use std::path::PathBuf;

use colored::Colorize;
use indexmap::IndexMap;
use joinsight::{DateNormalizer, Parser};

pub fn run(file: PathBuf, column: String) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let (dataset, _) = Parser::new().load_dataset(&file)?;
    let normalized = DateNormalizer::new().normalize(&dataset, &column)?;

    println!(
        "{} {} {}",
        "Normalized".cyan().bold(),
        column.white().bold(),
        format!("({} parsed, {} unparseable)", normalized.parsed, normalized.failed).dimmed()
    );

    if let Some((first, last)) = normalized.range() {
        println!("Range: {} to {}", first, last);
    }

    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for period in normalized.periods.iter().flatten() {
        *counts.entry(period.to_string()).or_insert(0) += 1;
    }
    counts.sort_keys();

    println!();
    for (period, count) in &counts {
        println!("  {}  {}", period.white(), count);
    }

    let missing = normalized.periods.iter().filter(|p| p.is_none()).count();
    if missing > 0 {
        println!("  {}  {}", "(none)".yellow(), missing);
    }

    Ok(())
}
