//! The `titlematch grade` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use titlematch_core::config::load_config_from;
use titlematch_core::engine::{GradeResult, GradingEngine, GradingEngineConfig, ProgressReporter};
use titlematch_core::parser;
use titlematch_core::report::{GradeReport, OutputFormat};

/// Console progress reporter. Only disagreements are worth a line each.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_case_start(&self, case_id: &str, guesses: usize) {
        tracing::debug!("grading {case_id} ({guesses} guesses)");
    }

    fn on_guess_graded(&self, result: &GradeResult) {
        if !result.correct {
            eprintln!(
                "  MISMATCH: {} :: \"{}\" expected {}, got {} ({})",
                result.case_id,
                result.guess,
                result.expected,
                result.actual(),
                result.decision.reason
            );
        }
    }

    fn on_set_complete(&self, total: usize, mismatches: usize, elapsed: Duration) {
        eprintln!(
            "Graded {total} guesses, {mismatches} mismatch(es) ({:.1}ms)",
            elapsed.as_secs_f64() * 1000.0
        );
    }
}

pub async fn execute(
    judge_set_path: PathBuf,
    parallelism: Option<usize>,
    output: Option<PathBuf>,
    format: String,
    filter: Option<String>,
    config_path: Option<PathBuf>,
    fail_on_mismatch: bool,
) -> Result<()> {
    let format: OutputFormat = format.parse()?;
    anyhow::ensure!(
        format != OutputFormat::Markdown,
        "grade supports text or json output"
    );

    let config = load_config_from(config_path.as_deref())?;
    let parallelism = parallelism.unwrap_or(config.parallelism);
    let output = output.unwrap_or_else(|| config.output_dir.clone());
    let fail_on_mismatch = fail_on_mismatch || config.fail_on_mismatch;

    let engine = GradingEngine::new(GradingEngineConfig { parallelism })?;

    let mut judge_sets = parser::load_judge_sets(&judge_set_path)?;
    anyhow::ensure!(
        !judge_sets.is_empty(),
        "no judge sets found at {}",
        judge_set_path.display()
    );

    if let Some(filter_tags) = &filter {
        let tags: Vec<String> = filter_tags
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        judge_sets = judge_sets.iter().map(|set| set.filter_tags(&tags)).collect();
    }

    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
    let reporter = ConsoleReporter;
    let mut total_mismatches = 0usize;

    for judge_set in &judge_sets {
        eprintln!(
            "titlematch v{}: grading {} ({} cases, {} guesses)",
            env!("CARGO_PKG_VERSION"),
            judge_set.name,
            judge_set.cases.len(),
            judge_set.guess_count()
        );

        let report = engine.run(judge_set, &reporter).await?;
        total_mismatches += report.aggregate.total - report.aggregate.correct;

        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            _ => print_summary(&report),
        }

        let path = output.join(format!("report-{timestamp}-{}.json", judge_set.id));
        report.save_json(&path)?;
        eprintln!("Results saved to: {}", path.display());
    }

    if fail_on_mismatch && total_mismatches > 0 {
        anyhow::bail!("{total_mismatches} judgement(s) did not match expectations");
    }

    Ok(())
}

fn print_summary(report: &GradeReport) {
    use comfy_table::{Cell, Table};

    let stats = &report.aggregate;
    let mut table = Table::new();
    table.set_header(vec![
        "Judge set",
        "Guesses",
        "Correct",
        "Accuracy",
        "False accepts",
        "False rejects",
        "Precision",
        "Recall",
    ]);
    table.add_row(vec![
        Cell::new(&report.judge_set.name),
        Cell::new(stats.total),
        Cell::new(stats.correct),
        Cell::new(format!("{:.1}%", stats.accuracy * 100.0)),
        Cell::new(stats.false_accepts),
        Cell::new(stats.false_rejects),
        Cell::new(format!("{:.1}%", stats.precision * 100.0)),
        Cell::new(format!("{:.1}%", stats.recall * 100.0)),
    ]);
    println!("{table}");

    let mut phases = Table::new();
    phases.set_header(vec!["Alias", "Guard rails", "Fuzzy", "Mean time"]);
    phases.add_row(vec![
        Cell::new(stats.per_phase.alias),
        Cell::new(stats.per_phase.guard_rails),
        Cell::new(stats.per_phase.fuzzy),
        Cell::new(format!("{}us", stats.mean_duration_us)),
    ]);
    println!("{phases}");

    let mismatches: Vec<_> = report.mismatches().collect();
    if !mismatches.is_empty() {
        println!("\nMismatches:");
        for r in mismatches {
            println!(
                "  {} :: \"{}\" expected {} ({})",
                r.case_id, r.guess, r.expected, r.decision.reason
            );
        }
    }
}
