//! The answer judge: alias match, guard rails, then fuzzy scoring.
//!
//! [`decide`] is the single entry point the rest of an application should
//! call. Each phase either resolves the decision or hands over to the next;
//! the first phase that resolves is recorded in the result.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::guard::{evaluate_normalized, GuardRailReason};
use crate::normalize::{canonicalize, NormalizedText};
use crate::similarity::{damerau_levenshtein, jaccard, jaro_winkler};

const JARO_WINKLER_WEIGHT: f64 = 0.6;
const JACCARD_WEIGHT: f64 = 0.4;

const SHORT_TITLE_MAX_LEN: usize = 5;
const MID_LENGTH_MAX_LEN: usize = 10;

const ALIAS_MATCH_REASON: &str = "Exact match after normalization (or alias)";
const FUZZY_REJECT_REASON: &str = "Fuzzy similarity below threshold";

/// Point at which a decision was finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Alias,
    GuardRails,
    Fuzzy,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Alias => write!(f, "alias"),
            Phase::GuardRails => write!(f, "guard_rails"),
            Phase::Fuzzy => write!(f, "fuzzy"),
        }
    }
}

/// Length bucket used by the fuzzy phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuzzyRule {
    #[serde(rename = "short-title rule")]
    ShortTitle,
    #[serde(rename = "mid-length rule")]
    MidLength,
    #[serde(rename = "long-title rule")]
    LongTitle,
}

impl FuzzyRule {
    fn for_length(longest: usize) -> Self {
        if longest <= SHORT_TITLE_MAX_LEN {
            FuzzyRule::ShortTitle
        } else if longest <= MID_LENGTH_MAX_LEN {
            FuzzyRule::MidLength
        } else {
            FuzzyRule::LongTitle
        }
    }
}

impl fmt::Display for FuzzyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuzzyRule::ShortTitle => write!(f, "short-title rule"),
            FuzzyRule::MidLength => write!(f, "mid-length rule"),
            FuzzyRule::LongTitle => write!(f, "long-title rule"),
        }
    }
}

/// The sub-condition of a fuzzy rule that accepted the guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuzzyTrigger {
    /// Edit distance within one and token sets nearly identical.
    EditDistanceWithTokenOverlap,
    JaroWinkler,
    EditDistance,
    CombinedScore,
}

/// Diagnostics of the fuzzy phase, reported whether or not it accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyScores {
    pub answer_normalized: String,
    pub guess_normalized: String,
    pub jaro_winkler: f64,
    pub damerau_levenshtein: usize,
    pub token_jaccard: f64,
    /// `0.6 * jaro_winkler + 0.4 * token_jaccard`.
    pub combined_score: f64,
    pub applied_rule: FuzzyRule,
    /// `None` when the guess was rejected.
    pub trigger: Option<FuzzyTrigger>,
}

/// Phase-specific payload of a [`Decision`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PhaseDetails {
    Alias,
    GuardRails {
        reasons: Vec<GuardRailReason>,
        normalized_answer: NormalizedText,
        normalized_guess: NormalizedText,
    },
    Fuzzy(FuzzyScores),
}

/// Verdict on a single guess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub accepted: bool,
    /// Human-readable explanation.
    pub reason: String,
    pub details: PhaseDetails,
}

impl Decision {
    pub fn phase(&self) -> Phase {
        match self.details {
            PhaseDetails::Alias => Phase::Alias,
            PhaseDetails::GuardRails { .. } => Phase::GuardRails,
            PhaseDetails::Fuzzy(_) => Phase::Fuzzy,
        }
    }

    /// Guard rail vetoes, empty unless the guard rails resolved the decision.
    pub fn guard_rail_reasons(&self) -> &[GuardRailReason] {
        match &self.details {
            PhaseDetails::GuardRails { reasons, .. } => reasons,
            _ => &[],
        }
    }

    pub fn fuzzy_scores(&self) -> Option<&FuzzyScores> {
        match &self.details {
            PhaseDetails::Fuzzy(scores) => Some(scores),
            _ => None,
        }
    }
}

/// Judge `guess_raw` against an answer title and its aliases.
///
/// Never fails: every input, including empty strings, yields a decision.
pub fn decide<S: AsRef<str>>(answer_raw: &str, guess_raw: &str, aliases: &[S]) -> Decision {
    let answer = canonicalize(answer_raw);
    let guess = canonicalize(guess_raw);

    let alias_match = answer.normalized == guess.normalized
        || aliases
            .iter()
            .any(|alias| canonicalize(alias.as_ref()).normalized == guess.normalized);
    if alias_match {
        tracing::debug!(answer = answer_raw, guess = guess_raw, "accepted by alias match");
        return Decision {
            accepted: true,
            reason: ALIAS_MATCH_REASON.to_string(),
            details: PhaseDetails::Alias,
        };
    }

    let guard = evaluate_normalized(guess_raw, answer, guess);
    if !guard.passed {
        let reason = guard.summary();
        tracing::debug!(answer = answer_raw, guess = guess_raw, %reason, "vetoed by guard rails");
        return Decision {
            accepted: false,
            reason,
            details: PhaseDetails::GuardRails {
                reasons: guard.reasons,
                normalized_answer: guard.normalized_answer,
                normalized_guess: guard.normalized_guess,
            },
        };
    }

    let scores = fuzzy_scores(&guard.normalized_answer, &guard.normalized_guess);
    let accepted = scores.trigger.is_some();
    tracing::debug!(
        answer = answer_raw,
        guess = guess_raw,
        accepted,
        rule = %scores.applied_rule,
        jaro_winkler = scores.jaro_winkler,
        combined = scores.combined_score,
        "fuzzy phase resolved"
    );

    Decision {
        accepted,
        reason: if accepted {
            format!("Fuzzy match passed ({})", scores.applied_rule)
        } else {
            FUZZY_REJECT_REASON.to_string()
        },
        details: PhaseDetails::Fuzzy(scores),
    }
}

/// Score two canonical texts and apply the length-bucketed acceptance rules.
fn fuzzy_scores(answer: &NormalizedText, guess: &NormalizedText) -> FuzzyScores {
    let jw = jaro_winkler(&answer.normalized, &guess.normalized);
    let distance = damerau_levenshtein(&answer.normalized, &guess.normalized);
    let token_jaccard = jaccard(&answer.token_set, &guess.token_set);
    let combined = JARO_WINKLER_WEIGHT * jw + JACCARD_WEIGHT * token_jaccard;

    let longest = answer
        .normalized
        .chars()
        .count()
        .max(guess.normalized.chars().count());
    // Only read by the long-title branch, where it is always 0.89.
    let long_title_jaro_threshold = if longest <= MID_LENGTH_MAX_LEN { 0.93 } else { 0.89 };

    let applied_rule = FuzzyRule::for_length(longest);
    let trigger = match applied_rule {
        FuzzyRule::ShortTitle => {
            if distance <= 1 && token_jaccard >= 0.85 {
                Some(FuzzyTrigger::EditDistanceWithTokenOverlap)
            } else if jw >= 0.95 {
                Some(FuzzyTrigger::JaroWinkler)
            } else {
                None
            }
        }
        FuzzyRule::MidLength => {
            if jw >= 0.91 {
                Some(FuzzyTrigger::JaroWinkler)
            } else if distance <= 2 {
                Some(FuzzyTrigger::EditDistance)
            } else if combined >= 0.91 {
                Some(FuzzyTrigger::CombinedScore)
            } else {
                None
            }
        }
        FuzzyRule::LongTitle => {
            if jw >= long_title_jaro_threshold {
                Some(FuzzyTrigger::JaroWinkler)
            } else if combined >= 0.89 {
                Some(FuzzyTrigger::CombinedScore)
            } else {
                None
            }
        }
    };

    FuzzyScores {
        answer_normalized: answer.normalized.clone(),
        guess_normalized: guess.normalized.clone(),
        jaro_winkler: jw,
        damerau_levenshtein: distance,
        token_jaccard,
        combined_score: combined,
        applied_rule,
        trigger,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_ALIASES: &[&str] = &[];

    #[test]
    fn monarch_numeral_swap_rejected_by_guard_rails() {
        let d = decide("Henry VI", "Henry VIII", NO_ALIASES);
        assert!(!d.accepted);
        assert_eq!(d.phase(), Phase::GuardRails);
        assert!(d
            .guard_rail_reasons()
            .contains(&GuardRailReason::MonarchNumeralMismatch));
    }

    #[test]
    fn apollo_is_not_april() {
        let d = decide("Apollo 13", "April 13", NO_ALIASES);
        assert!(!d.accepted);
        assert_eq!(d.phase(), Phase::GuardRails);
    }

    #[test]
    fn number_words_match_numerals() {
        let d = decide("Henry V", "Henry Five", &["Henry the Fifth"]);
        assert!(d.accepted);
        assert_ne!(d.phase(), Phase::GuardRails);
    }

    #[test]
    fn area_fifty_one() {
        let d = decide("Area 51", "Area Fifty One", NO_ALIASES);
        assert!(d.accepted);
        assert_eq!(d.phase(), Phase::Alias);
    }

    #[test]
    fn moscow_years_differ() {
        let d = decide("Moscow 1980", "Moscow 1990", NO_ALIASES);
        assert!(!d.accepted);
        assert_eq!(d.phase(), Phase::GuardRails);
        assert!(d
            .guard_rail_reasons()
            .contains(&GuardRailReason::NumericMismatch));
        assert_eq!(d.reason, "Numeric tokens differ (e.g., 1984 vs 1990)");
    }

    #[test]
    fn alias_match_short_circuits() {
        let d = decide("Louis XIV", "Sun King", &["Sun King", "Louis the Fourteenth"]);
        assert!(d.accepted);
        assert_eq!(d.phase(), Phase::Alias);
        assert_eq!(d.reason, ALIAS_MATCH_REASON);
        assert!(d.fuzzy_scores().is_none());
    }

    #[test]
    fn self_match_including_empty() {
        for answer in ["Pokémon", "", "The Beatles", "Henry VIII"] {
            let d = decide(answer, answer, NO_ALIASES);
            assert!(d.accepted, "{answer:?} should match itself");
            assert_eq!(d.phase(), Phase::Alias);
        }
    }

    #[test]
    fn long_title_transposition_accepted() {
        let d = decide("Battle of Hastings", "Battle of Hastigns", NO_ALIASES);
        assert!(d.accepted);
        let scores = d.fuzzy_scores().unwrap();
        assert_eq!(scores.applied_rule, FuzzyRule::LongTitle);
        assert_eq!(scores.trigger, Some(FuzzyTrigger::JaroWinkler));
        assert_eq!(scores.damerau_levenshtein, 1);
        assert_eq!(d.reason, "Fuzzy match passed (long-title rule)");
    }

    #[test]
    fn long_title_different_battle_rejected() {
        let d = decide("Battle of Hastings", "Battle of Waterloo", NO_ALIASES);
        assert!(!d.accepted);
        assert_eq!(d.phase(), Phase::Fuzzy);
        let scores = d.fuzzy_scores().unwrap();
        assert!(scores.jaro_winkler < 0.89);
        assert!((scores.token_jaccard - 1.0 / 3.0).abs() < 1e-9);
        assert!(scores.trigger.is_none());
        assert_eq!(d.reason, FUZZY_REJECT_REASON);
    }

    #[test]
    fn mid_length_typo_accepted() {
        let d = decide("Jupiter", "Jupitor", NO_ALIASES);
        assert!(d.accepted);
        let scores = d.fuzzy_scores().unwrap();
        assert_eq!(scores.applied_rule, FuzzyRule::MidLength);
        assert!(scores.trigger.is_some());
        assert_eq!(scores.damerau_levenshtein, 1);
    }

    #[test]
    fn short_title_is_strict() {
        let d = decide("Mars", "Mras", NO_ALIASES);
        assert!(!d.accepted);
        let scores = d.fuzzy_scores().unwrap();
        assert_eq!(scores.applied_rule, FuzzyRule::ShortTitle);
        assert_eq!(scores.damerau_levenshtein, 1);
        assert_eq!(scores.token_jaccard, 0.0);
    }

    #[test]
    fn short_title_accepts_on_jaro_winkler() {
        // jw("thor", "thorr") = 0.96, token sets disjoint.
        let d = decide("Thor", "Thorr", NO_ALIASES);
        assert!(d.accepted);
        let scores = d.fuzzy_scores().unwrap();
        assert_eq!(scores.applied_rule, FuzzyRule::ShortTitle);
        assert_eq!(scores.trigger, Some(FuzzyTrigger::JaroWinkler));
        assert_eq!(scores.token_jaccard, 0.0);
        assert!(scores.jaro_winkler >= 0.95 && scores.jaro_winkler < 0.97);

        // jw("mars", "marz") is about 0.883.
        assert!(!decide("Mars", "Marz", NO_ALIASES).accepted);
    }

    #[test]
    fn short_title_accepts_on_edit_distance_with_token_overlap() {
        // Both token sets are empty (stopwords only), so jaccard is 1.
        let d = decide("Of", "On", NO_ALIASES);
        assert!(d.accepted);
        let scores = d.fuzzy_scores().unwrap();
        assert_eq!(scores.trigger, Some(FuzzyTrigger::EditDistanceWithTokenOverlap));
        assert_eq!(scores.damerau_levenshtein, 1);
        assert!(scores.jaro_winkler < 0.95);
    }

    #[test]
    fn mid_length_accepts_on_combined_score() {
        // "ice at sea" vs "ice sea": jw ~0.897, dl 3, jaccard 1, combined ~0.938.
        let d = decide("Ice at Sea", "Ice Sea", NO_ALIASES);
        assert!(d.accepted);
        let scores = d.fuzzy_scores().unwrap();
        assert_eq!(scores.applied_rule, FuzzyRule::MidLength);
        assert_eq!(scores.trigger, Some(FuzzyTrigger::CombinedScore));
        assert_eq!(scores.damerau_levenshtein, 3);
        assert!(scores.jaro_winkler < 0.91);
        assert!(scores.combined_score >= 0.91 && scores.combined_score < 0.95);
    }

    #[test]
    fn long_title_jaro_threshold_is_089() {
        // jw ~0.918: accepted at 0.89, would fail at 0.93.
        let d = decide("Pride and Prejudice", "Pride Prejudice", NO_ALIASES);
        assert!(d.accepted);
        let scores = d.fuzzy_scores().unwrap();
        assert_eq!(scores.applied_rule, FuzzyRule::LongTitle);
        assert_eq!(scores.trigger, Some(FuzzyTrigger::JaroWinkler));
        assert!(scores.jaro_winkler >= 0.89 && scores.jaro_winkler < 0.93);
    }

    #[test]
    fn long_title_accepts_on_combined_score() {
        // "fox and hound" vs "fox hound": jw ~0.883, combined ~0.930.
        let d = decide("The Fox and the Hound", "Fox Hound", NO_ALIASES);
        assert!(d.accepted);
        let scores = d.fuzzy_scores().unwrap();
        assert_eq!(scores.applied_rule, FuzzyRule::LongTitle);
        assert_eq!(scores.trigger, Some(FuzzyTrigger::CombinedScore));
        assert!(scores.jaro_winkler < 0.89);
        assert!(scores.combined_score >= 0.89 && scores.combined_score < 0.95);
    }

    #[test]
    fn empty_guess_is_rejected_not_an_error() {
        let d = decide("Apollo 13", "", NO_ALIASES);
        assert!(!d.accepted);
        let d = decide("Saturn", "", NO_ALIASES);
        assert!(!d.accepted);
        assert_eq!(d.phase(), Phase::Fuzzy);
    }

    #[test]
    fn combined_weights() {
        let d = decide("Battle of Hastings", "Battle of Waterloo", NO_ALIASES);
        let s = d.fuzzy_scores().unwrap();
        let expected = 0.6 * s.jaro_winkler + 0.4 * s.token_jaccard;
        assert_eq!(s.combined_score, expected);
    }

    #[test]
    fn decision_serializes_with_phase_tag() {
        let d = decide("Moscow 1980", "Moscow 1990", NO_ALIASES);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["details"]["phase"], "guard_rails");
        assert_eq!(json["details"]["reasons"][0], "numeric_mismatch");

        let d = decide("Jupiter", "Jupitor", NO_ALIASES);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["details"]["phase"], "fuzzy");
        assert_eq!(json["details"]["applied_rule"], "mid-length rule");

        let back: Decision = serde_json::from_value(json).unwrap();
        assert_eq!(back, d);
    }
}
