use std::path::Path;

use multiconv::harness::{parse_suite, run_suite};

use super::OutputFormat;

pub fn run(
    path: &Path,
    threads: Option<usize>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let suite = parse_suite(path)?;
    tracing::info!(path = %path.display(), runs = suite.runs.len(), "loaded suite");

    let reports = super::install(threads, || run_suite(&suite))??;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&reports)?;
            println!("{json}");
        }
        OutputFormat::Text => {
            for (i, report) in reports.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                super::print_text(report)?;
            }
            let suspect = reports.iter().filter(|r| !r.equivalence.is_acceptable()).count();
            println!();
            println!("Runs: {}, suspect: {suspect}", reports.len());
        }
    }

    Ok(())
}
