//! Aggregate statistics over grading results.
//!
//! "Positive" means the judge accepted the guess, so a false accept is a
//! wrong guess that got through and a false reject is a right guess that
//! was turned away.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::decision::Phase;
use crate::engine::GradeResult;

/// How many decisions each phase resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseCounts {
    pub alias: usize,
    pub guard_rails: usize,
    pub fuzzy: usize,
}

impl PhaseCounts {
    fn record(&mut self, phase: Phase) {
        match phase {
            Phase::Alias => self.alias += 1,
            Phase::GuardRails => self.guard_rails += 1,
            Phase::Fuzzy => self.fuzzy += 1,
        }
    }
}

/// Statistics for a single case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseStats {
    pub case_id: String,
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
}

/// Aggregate statistics across all results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total: usize,
    pub correct: usize,
    /// `correct / total`, 1.0 for an empty run.
    pub accuracy: f64,
    /// Expected reject, judged accept.
    pub false_accepts: usize,
    /// Expected accept, judged reject.
    pub false_rejects: usize,
    pub precision: f64,
    pub recall: f64,
    pub per_phase: PhaseCounts,
    /// Mean time per guess in microseconds.
    pub mean_duration_us: u64,
    /// Per-case statistics.
    pub per_case: BTreeMap<String, CaseStats>,
}

/// `numerator / denominator`, or 1.0 when there was nothing to get wrong.
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        1.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Compute aggregate statistics from all results.
pub fn compute_aggregate_stats(results: &[GradeResult]) -> AggregateStats {
    let mut per_phase = PhaseCounts::default();
    let mut true_accepts = 0usize;
    let mut false_accepts = 0usize;
    let mut false_rejects = 0usize;

    for r in results {
        per_phase.record(r.decision.phase());
        match (r.expected.is_accept(), r.decision.accepted) {
            (true, true) => true_accepts += 1,
            (false, true) => false_accepts += 1,
            (true, false) => false_rejects += 1,
            (false, false) => {}
        }
    }

    let total = results.len();
    let correct = results.iter().filter(|r| r.correct).count();

    let mean_duration_us =
        results.iter().map(|r| r.duration_us).sum::<u64>() / total.max(1) as u64;

    let mut grouped: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for r in results {
        let entry = grouped.entry(r.case_id.as_str()).or_default();
        entry.0 += 1;
        if r.correct {
            entry.1 += 1;
        }
    }
    let per_case = grouped
        .into_iter()
        .map(|(case_id, (total, correct))| {
            (
                case_id.to_string(),
                CaseStats {
                    case_id: case_id.to_string(),
                    total,
                    correct,
                    accuracy: ratio(correct, total),
                },
            )
        })
        .collect();

    AggregateStats {
        total,
        correct,
        accuracy: ratio(correct, total),
        false_accepts,
        false_rejects,
        precision: ratio(true_accepts, true_accepts + false_accepts),
        recall: ratio(true_accepts, true_accepts + false_rejects),
        per_phase,
        mean_duration_us,
        per_case,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::decide;
    use crate::model::Expectation;

    fn result(case_id: &str, answer: &str, guess: &str, expected: Expectation) -> GradeResult {
        let decision = decide(answer, guess, &[] as &[&str]);
        GradeResult {
            case_id: case_id.into(),
            answer: answer.into(),
            guess: guess.into(),
            expected,
            correct: decision.accepted == expected.is_accept(),
            decision,
            duration_us: 10,
        }
    }

    #[test]
    fn empty_results() {
        let stats = compute_aggregate_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.accuracy, 1.0);
        assert_eq!(stats.precision, 1.0);
        assert_eq!(stats.recall, 1.0);
        assert_eq!(stats.mean_duration_us, 0);
        assert!(stats.per_case.is_empty());
    }

    #[test]
    fn counts_errors_by_direction() {
        let results = vec![
            // accepted, expected accept
            result("apollo", "Apollo 13", "Apollo Thirteen", Expectation::Accept),
            // rejected by guard rails, expected accept: false reject
            result("apollo", "Apollo 13", "April 13", Expectation::Accept),
            // accepted by fuzzy, expected reject: false accept
            result("jupiter", "Jupiter", "Jupitor", Expectation::Reject),
            // rejected, expected reject
            result("mars", "Mars", "Mras", Expectation::Reject),
        ];
        let stats = compute_aggregate_stats(&results);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.correct, 2);
        assert_eq!(stats.accuracy, 0.5);
        assert_eq!(stats.false_accepts, 1);
        assert_eq!(stats.false_rejects, 1);
        assert_eq!(stats.precision, 0.5);
        assert_eq!(stats.recall, 0.5);
        assert_eq!(
            stats.per_phase,
            PhaseCounts {
                alias: 1,
                guard_rails: 1,
                fuzzy: 2
            }
        );
        assert_eq!(stats.mean_duration_us, 10);

        let apollo = &stats.per_case["apollo"];
        assert_eq!((apollo.total, apollo.correct), (2, 1));
        assert_eq!(apollo.accuracy, 0.5);
        assert_eq!(stats.per_case["mars"].accuracy, 1.0);
        let ids: Vec<_> = stats.per_case.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["apollo", "jupiter", "mars"]);
    }
}
