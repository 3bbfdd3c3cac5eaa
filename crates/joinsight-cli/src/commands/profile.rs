//! Profile command - print a dataset profile for mapping suggestion.

use std::path::PathBuf;

use joinsight::Parser;

pub fn run(file: PathBuf, sample_rows: usize) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let (dataset, source) = Parser::new().load_dataset(&file)?;
    tracing::debug!(file = %source.file, hash = %source.hash, "profiling dataset");

    let profile = dataset.profile(sample_rows);
    println!("{}", serde_json::to_string_pretty(&profile)?);

    Ok(())
}
