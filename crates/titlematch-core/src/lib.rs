//! titlematch-core: answer judging for title-guessing games.
//!
//! Decides whether a free-text guess names the same thing as a canonical
//! title, using lexical normalization, numeric guard rails and blended
//! string similarity. Around the judge sit TOML judge-set fixtures, a batch
//! grading engine and report comparison for catching regressions.

pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod guard;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod report;
pub mod similarity;
pub mod statistics;

pub use decision::{decide, Decision, FuzzyRule, FuzzyScores, FuzzyTrigger, Phase, PhaseDetails};
pub use error::TitlematchError;
pub use guard::{evaluate_guard_rails, GuardRailReason, GuardRailResult};
pub use model::AnswerSpec;
pub use normalize::{fold_number_words, normalize, normalize_default, NormalizedText};
pub use similarity::{best_token_similarity, damerau_levenshtein, jaccard, jaro_winkler};
