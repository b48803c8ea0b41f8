//! Batch grading engine.
//!
//! Judges every guess of a judge set against its expectation. Judging is
//! CPU-bound, so each case runs on the blocking pool, bounded by a
//! semaphore; results are put back into fixture order before reporting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::decision::Decision;
use crate::error::TitlematchError;
use crate::model::{Expectation, JudgeCase, JudgeSet};
use crate::report::{GradeReport, JudgeSetSummary};
use crate::statistics::compute_aggregate_stats;

/// Configuration for the grading engine.
#[derive(Debug, Clone)]
pub struct GradingEngineConfig {
    /// Maximum cases judged concurrently.
    pub parallelism: usize,
}

impl Default for GradingEngineConfig {
    fn default() -> Self {
        Self { parallelism: 4 }
    }
}

/// Outcome of judging one guess of a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeResult {
    pub case_id: String,
    pub answer: String,
    pub guess: String,
    pub expected: Expectation,
    pub decision: Decision,
    /// Whether the decision matched the expectation.
    pub correct: bool,
    /// Wall-clock time spent in `decide`, in microseconds.
    pub duration_us: u64,
}

impl GradeResult {
    pub fn actual(&self) -> Expectation {
        Expectation::from_accepted(self.decision.accepted)
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_case_start(&self, case_id: &str, guesses: usize);
    fn on_guess_graded(&self, result: &GradeResult);
    fn on_set_complete(&self, total: usize, mismatches: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_case_start(&self, _: &str, _: usize) {}
    fn on_guess_graded(&self, _: &GradeResult) {}
    fn on_set_complete(&self, _: usize, _: usize, _: Duration) {}
}

/// Judge every guess of a case, in fixture order.
pub fn grade_case(case: &JudgeCase) -> Vec<GradeResult> {
    let answer = case.answer_spec();
    case.guesses
        .iter()
        .map(|g| {
            let start = Instant::now();
            let decision = answer.judge(&g.text);
            let duration_us = start.elapsed().as_micros() as u64;
            let correct = decision.accepted == g.expect.is_accept();
            if !correct {
                tracing::debug!(
                    case = %case.id,
                    guess = %g.text,
                    expected = %g.expect,
                    reason = %decision.reason,
                    "judgement does not match expectation"
                );
            }
            GradeResult {
                case_id: case.id.clone(),
                answer: case.answer.clone(),
                guess: g.text.clone(),
                expected: g.expect,
                decision,
                correct,
                duration_us,
            }
        })
        .collect()
}

/// The batch grading engine.
pub struct GradingEngine {
    config: GradingEngineConfig,
}

impl GradingEngine {
    pub fn new(config: GradingEngineConfig) -> Result<Self, TitlematchError> {
        if config.parallelism == 0 {
            return Err(TitlematchError::InvalidParallelism(config.parallelism));
        }
        Ok(Self { config })
    }

    /// Grade every case of a judge set.
    pub async fn run(
        &self,
        judge_set: &JudgeSet,
        progress: &dyn ProgressReporter,
    ) -> Result<GradeReport> {
        let start = Instant::now();
        let run_id = Uuid::new_v4();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism));

        let mut futures = FuturesUnordered::new();

        for (index, case) in judge_set.cases.iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let case = case.clone();
            progress.on_case_start(&case.id, case.guesses.len());

            futures.push(async move {
                let case_id = case.id.clone();
                let inner = async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|_| TitlematchError::SemaphoreClosed)?;

                    tokio::task::spawn_blocking(move || grade_case(&case))
                        .await
                        .map_err(|e| TitlematchError::TaskFailed {
                            case_id: case_id.clone(),
                            message: e.to_string(),
                        })
                };
                (index, inner.await)
            });
        }

        let mut graded: Vec<(usize, Vec<GradeResult>)> = Vec::with_capacity(futures.len());

        while let Some((index, outcome)) = futures.next().await {
            match outcome {
                Ok(results) => {
                    for r in &results {
                        progress.on_guess_graded(r);
                    }
                    graded.push((index, results));
                }
                Err(e) => {
                    tracing::error!("grading failed: {e}");
                    return Err(e.into());
                }
            }
        }

        graded.sort_by_key(|(index, _)| *index);
        let results: Vec<GradeResult> = graded.into_iter().flat_map(|(_, r)| r).collect();

        let elapsed = start.elapsed();
        let mismatches = results.iter().filter(|r| !r.correct).count();
        progress.on_set_complete(results.len(), mismatches, elapsed);

        let aggregate = compute_aggregate_stats(&results);

        Ok(GradeReport {
            id: run_id,
            created_at: chrono::Utc::now(),
            judge_set: JudgeSetSummary {
                id: judge_set.id.clone(),
                name: judge_set.name.clone(),
                case_count: judge_set.cases.len(),
            },
            results,
            aggregate,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}
