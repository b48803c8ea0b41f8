//! The `titlematch compare` command.

use std::path::PathBuf;

use anyhow::Result;

use titlematch_core::report::{GradeReport, OutputFormat};

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    let format: OutputFormat = format.parse()?;
    anyhow::ensure!(
        (0.0..=1.0).contains(&threshold),
        "threshold must be between 0.0 and 1.0"
    );

    let baseline = GradeReport::load_json(&baseline_path)?;
    let current = GradeReport::load_json(&current_path)?;

    let report = current.compare(&baseline, threshold);

    match format {
        OutputFormat::Markdown => {
            println!("{}", report.to_markdown());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!(
                "Comparison: {} regressions, {} improvements, {} unchanged",
                report.regressions.len(),
                report.improvements.len(),
                report.unchanged
            );

            if !report.regressions.is_empty() {
                println!("\nRegressions:");
                for r in &report.regressions {
                    println!(
                        "  {} {:.1}% -> {:.1}% ({:+.1}%)",
                        r.case_id,
                        r.baseline_accuracy * 100.0,
                        r.current_accuracy * 100.0,
                        r.delta * 100.0
                    );
                }
            }

            if !report.improvements.is_empty() {
                println!("\nImprovements:");
                for i in &report.improvements {
                    println!(
                        "  {} {:.1}% -> {:.1}% (+{:.1}%)",
                        i.case_id,
                        i.baseline_accuracy * 100.0,
                        i.current_accuracy * 100.0,
                        i.delta * 100.0
                    );
                }
            }

            if !report.newly_failing.is_empty() {
                println!("\nNewly failing guesses:");
                for f in &report.newly_failing {
                    println!(
                        "  {} :: \"{}\" (expected {}): {}",
                        f.case_id, f.guess, f.expected, f.current_reason
                    );
                }
            }

            if !report.newly_passing.is_empty() {
                println!("\n{} guess(es) now judged correctly", report.newly_passing.len());
            }
            if report.new_cases > 0 {
                println!("\n{} new case(s)", report.new_cases);
            }
            if report.removed_cases > 0 {
                println!("{} removed case(s)", report.removed_cases);
            }
        }
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}
