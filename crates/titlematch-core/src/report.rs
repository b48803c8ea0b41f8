//! Grade report types with JSON persistence and regression detection.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::GradeResult;
use crate::error::TitlematchError;
use crate::model::Expectation;
use crate::statistics::AggregateStats;

/// A complete grading report for one judge set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the judge set.
    pub judge_set: JudgeSetSummary,
    /// Individual results in fixture order.
    pub results: Vec<GradeResult>,
    /// Aggregate statistics.
    pub aggregate: AggregateStats,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Summary of a judge set (without the full case definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeSetSummary {
    pub id: String,
    pub name: String,
    pub case_count: usize,
}

/// Output formats understood by the reporting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = TitlematchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(TitlematchError::UnknownFormat(other.to_string())),
        }
    }
}

impl GradeReport {
    /// Results whose decision did not match the expectation.
    pub fn mismatches(&self) -> impl Iterator<Item = &GradeResult> {
        self.results.iter().filter(|r| !r.correct)
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradeReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against a baseline to detect regressions.
    ///
    /// Case accuracy changes beyond `threshold` are reported per case; any
    /// guess that went from correct to incorrect is a regression regardless
    /// of the threshold.
    pub fn compare(&self, baseline: &GradeReport, threshold: f64) -> RegressionReport {
        let case_accuracy = |report: &GradeReport| -> BTreeMap<String, f64> {
            let mut counts: BTreeMap<String, (usize, usize)> = BTreeMap::new();
            for r in &report.results {
                let entry = counts.entry(r.case_id.clone()).or_default();
                entry.0 += 1;
                if r.correct {
                    entry.1 += 1;
                }
            }
            counts
                .into_iter()
                .map(|(id, (total, correct))| (id, correct as f64 / total as f64))
                .collect()
        };

        let baseline_cases = case_accuracy(baseline);
        let current_cases = case_accuracy(self);

        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_cases = 0usize;

        for (case_id, &current) in &current_cases {
            let Some(&baseline_accuracy) = baseline_cases.get(case_id) else {
                new_cases += 1;
                continue;
            };
            let delta = current - baseline_accuracy;
            let entry = CaseDelta {
                case_id: case_id.clone(),
                baseline_accuracy,
                current_accuracy: current,
                delta,
            };
            if delta < -threshold {
                regressions.push(entry);
            } else if delta > threshold {
                improvements.push(entry);
            } else {
                unchanged += 1;
            }
        }

        let removed_cases = baseline_cases
            .keys()
            .filter(|k| !current_cases.contains_key(*k))
            .count();

        let baseline_guesses = guess_outcomes(baseline);
        let mut newly_failing = Vec::new();
        let mut newly_passing = Vec::new();
        for (key, current) in guess_outcomes(self) {
            let Some(previous) = baseline_guesses.get(&key) else {
                continue;
            };
            if previous.correct == current.correct {
                continue;
            }
            let flip = FlippedGuess {
                case_id: key.0,
                guess: key.1,
                expected: current.expected,
                baseline_reason: previous.decision.reason.clone(),
                current_reason: current.decision.reason.clone(),
            };
            if current.correct {
                newly_passing.push(flip);
            } else {
                newly_failing.push(flip);
            }
        }

        RegressionReport {
            regressions,
            improvements,
            newly_failing,
            newly_passing,
            unchanged,
            new_cases,
            removed_cases,
        }
    }
}

fn guess_outcomes(report: &GradeReport) -> BTreeMap<(String, String), &GradeResult> {
    report
        .results
        .iter()
        .map(|r| ((r.case_id.clone(), r.guess.clone()), r))
        .collect()
}

/// Result of comparing two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionReport {
    /// Cases where accuracy went down by more than the threshold.
    pub regressions: Vec<CaseDelta>,
    /// Cases where accuracy went up by more than the threshold.
    pub improvements: Vec<CaseDelta>,
    /// Guesses judged correctly in the baseline but not now.
    pub newly_failing: Vec<FlippedGuess>,
    /// Guesses judged incorrectly in the baseline but correctly now.
    pub newly_passing: Vec<FlippedGuess>,
    /// Cases with no significant change.
    pub unchanged: usize,
    /// Cases in current but not baseline.
    pub new_cases: usize,
    /// Cases in baseline but not current.
    pub removed_cases: usize,
}

/// Accuracy change of one case between two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseDelta {
    pub case_id: String,
    pub baseline_accuracy: f64,
    pub current_accuracy: f64,
    pub delta: f64,
}

/// A guess whose correctness changed between two reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlippedGuess {
    pub case_id: String,
    pub guess: String,
    pub expected: Expectation,
    pub baseline_reason: String,
    pub current_reason: String,
}

impl RegressionReport {
    /// Format the regression report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        ));

        if !self.regressions.is_empty() {
            md.push_str("### Regressions\n\n");
            md.push_str("| Case | Baseline | Current | Delta |\n");
            md.push_str("|------|----------|---------|-------|\n");
            for r in &self.regressions {
                md.push_str(&format!(
                    "| {} | {:.1}% | {:.1}% | {:.1}% |\n",
                    r.case_id,
                    r.baseline_accuracy * 100.0,
                    r.current_accuracy * 100.0,
                    r.delta * 100.0
                ));
            }
            md.push('\n');
        }

        if !self.improvements.is_empty() {
            md.push_str("### Improvements\n\n");
            md.push_str("| Case | Baseline | Current | Delta |\n");
            md.push_str("|------|----------|---------|-------|\n");
            for i in &self.improvements {
                md.push_str(&format!(
                    "| {} | {:.1}% | {:.1}% | +{:.1}% |\n",
                    i.case_id,
                    i.baseline_accuracy * 100.0,
                    i.current_accuracy * 100.0,
                    i.delta * 100.0
                ));
            }
            md.push('\n');
        }

        if !self.newly_failing.is_empty() {
            md.push_str("### Newly failing guesses\n\n");
            md.push_str("| Case | Guess | Expected | Now |\n");
            md.push_str("|------|-------|----------|-----|\n");
            for f in &self.newly_failing {
                md.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    f.case_id, f.guess, f.expected, f.current_reason
                ));
            }
        }

        md
    }

    /// Returns true if any case or guess got worse.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty() || !self.newly_failing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::grade_case;
    use crate::model::{GuessCase, JudgeCase};
    use crate::statistics::compute_aggregate_stats;

    fn make_report(case_id: &str, answer: &str, guesses: &[(&str, Expectation)]) -> GradeReport {
        let results = grade_case(&JudgeCase {
            id: case_id.to_string(),
            answer: answer.to_string(),
            aliases: vec![],
            tags: vec![],
            guesses: guesses
                .iter()
                .map(|(text, expect)| GuessCase {
                    text: text.to_string(),
                    expect: *expect,
                })
                .collect(),
        });

        GradeReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            judge_set: JudgeSetSummary {
                id: "test".into(),
                name: "Test".into(),
                case_count: 1,
            },
            aggregate: compute_aggregate_stats(&results),
            results,
            duration_ms: 0,
        }
    }

    use Expectation::{Accept, Reject};

    #[test]
    fn compare_identical_reports() {
        let baseline = make_report("jupiter", "Jupiter", &[("Jupitor", Accept)]);
        let current = make_report("jupiter", "Jupiter", &[("Jupitor", Accept)]);

        let report = current.compare(&baseline, 0.05);
        assert!(report.regressions.is_empty());
        assert!(report.improvements.is_empty());
        assert!(report.newly_failing.is_empty());
        assert_eq!(report.unchanged, 1);
        assert!(!report.has_regressions());
    }

    #[test]
    fn compare_with_regression() {
        let baseline = make_report("jupiter", "Jupiter", &[("Jupitor", Accept)]);
        // Same guess, flipped expectation: now judged wrong.
        let current = make_report("jupiter", "Jupiter", &[("Jupitor", Reject)]);

        let report = current.compare(&baseline, 0.05);
        assert_eq!(report.regressions.len(), 1);
        assert_eq!(report.regressions[0].case_id, "jupiter");
        assert_eq!(report.regressions[0].delta, -1.0);
        assert_eq!(report.newly_failing.len(), 1);
        assert_eq!(report.newly_failing[0].guess, "Jupitor");
        assert!(report.has_regressions());

        let reverse = baseline.compare(&current, 0.05);
        assert_eq!(reverse.improvements.len(), 1);
        assert_eq!(reverse.newly_passing.len(), 1);
        assert!(!reverse.has_regressions());
    }

    #[test]
    fn flipped_guess_below_threshold_still_regresses() {
        let many: Vec<(&str, Expectation)> = vec![
            ("Jupitor", Accept),
            ("Jupiter", Accept),
            ("jupiter", Accept),
            ("JUPITER", Accept),
        ];
        let mut flipped = many.clone();
        flipped[0].1 = Reject;
        let baseline = make_report("jupiter", "Jupiter", &many);
        let current = make_report("jupiter", "Jupiter", &flipped);

        let report = current.compare(&baseline, 0.5);
        assert!(report.regressions.is_empty());
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.newly_failing.len(), 1);
        assert!(report.has_regressions());
    }

    #[test]
    fn compare_with_new_and_removed() {
        let baseline = make_report("mars", "Mars", &[("Mars", Accept)]);
        let current = make_report("saturn", "Saturn", &[("Saturn", Accept)]);

        let report = current.compare(&baseline, 0.05);
        assert_eq!(report.new_cases, 1);
        assert_eq!(report.removed_cases, 1);
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report("mars", "Mars", &[("Mras", Reject)]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = GradeReport::load_json(&path).unwrap();

        assert_eq!(loaded.judge_set.id, "test");
        assert_eq!(loaded.results.len(), 1);
        assert_eq!(loaded.results[0].guess, "Mras");
        assert_eq!(loaded.results[0].decision.phase(), crate::decision::Phase::Fuzzy);
        assert_eq!(loaded.aggregate.per_phase, report.aggregate.per_phase);
    }

    #[test]
    fn markdown_output() {
        let baseline = make_report("jupiter", "Jupiter", &[("Jupitor", Accept)]);
        let current = make_report("jupiter", "Jupiter", &[("Jupitor", Reject)]);

        let md = current.compare(&baseline, 0.05).to_markdown();
        assert!(md.contains("### Regressions"));
        assert!(md.contains("| jupiter | 100.0% | 0.0% | -100.0% |"));
        assert!(md.contains("Newly failing"));
        assert!(md.contains("Fuzzy match passed (mid-length rule)"));
    }

    #[test]
    fn output_format_parse() {
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::Text.to_string(), "text");
        assert!(matches!(
            "xml".parse::<OutputFormat>(),
            Err(TitlematchError::UnknownFormat(_))
        ));
    }
}
