//! Guard rails: hard veto rules applied before fuzzy scoring.
//!
//! They reject guesses that are lexically close to the answer but wrong for
//! domain reasons, almost always because of numbers ("Henry VI" is not
//! "Henry VIII", "April 13" is not "Apollo 13").

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::normalize::{canonicalize, strip_diacritics, NormalizedText};
use crate::similarity::best_token_similarity;

/// First names for which a trailing ordinal identifies a different person.
pub const MONARCH_FIRST_NAMES: &[&str] = &[
    "henry",
    "louis",
    "edward",
    "philip",
    "charles",
    "john",
    "george",
    "james",
    "william",
    "richard",
    "mary",
    "elizabeth",
    "victoria",
];

/// Minimum best-token similarity when only the numbers line up.
const SHARED_NUMBER_TOKEN_SIMILARITY: f64 = 0.93;
/// Minimum head-word similarity for "word + number" answers.
const HEAD_WORD_SIMILARITY: f64 = 0.90;

/// Why a guard rail vetoed a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardRailReason {
    /// Monarch name with a different regnal number.
    MonarchNumeralMismatch,
    /// Both sides carry numbers and they differ.
    NumericMismatch,
    /// Numbers agree but no word is shared or close.
    NumericOnlyOverlap,
    /// The single head word of a "word + number" answer is not matched.
    HeadWordMismatch,
}

impl GuardRailReason {
    pub fn message(&self) -> &'static str {
        match self {
            GuardRailReason::MonarchNumeralMismatch => "Monarch numeral mismatch (e.g., VI vs VIII)",
            GuardRailReason::NumericMismatch => "Numeric tokens differ (e.g., 1984 vs 1990)",
            GuardRailReason::NumericOnlyOverlap => {
                "Needs a matching non-numeric term; numeric match alone is insufficient"
            }
            GuardRailReason::HeadWordMismatch => "Head word too different",
        }
    }
}

impl fmt::Display for GuardRailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of running every guard rail over an answer/guess pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardRailResult {
    /// `true` iff `reasons` is empty.
    pub passed: bool,
    /// Vetoes in the order the checks ran.
    pub reasons: Vec<GuardRailReason>,
    pub normalized_answer: NormalizedText,
    pub normalized_guess: NormalizedText,
}

impl GuardRailResult {
    /// Reasons rendered as messages and joined with `"; "`.
    pub fn summary(&self) -> String {
        self.reasons
            .iter()
            .map(GuardRailReason::message)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Run the guard rails over raw answer and guess strings.
pub fn evaluate_guard_rails(answer_raw: &str, guess_raw: &str) -> GuardRailResult {
    evaluate_normalized(guess_raw, canonicalize(answer_raw), canonicalize(guess_raw))
}

/// Guard rails over already-canonicalized texts.
///
/// The raw guess is still needed for the monarch check, which looks at the
/// first word before any number folding.
pub(crate) fn evaluate_normalized(
    guess_raw: &str,
    answer: NormalizedText,
    guess: NormalizedText,
) -> GuardRailResult {
    let reasons = collect_reasons(guess_raw, &answer, &guess);
    GuardRailResult {
        passed: reasons.is_empty(),
        reasons,
        normalized_answer: answer,
        normalized_guess: guess,
    }
}

fn collect_reasons(
    guess_raw: &str,
    answer: &NormalizedText,
    guess: &NormalizedText,
) -> Vec<GuardRailReason> {
    let mut reasons = Vec::new();

    let answer_numbers = answer.numeric_set();
    let guess_numbers = guess.numeric_set();

    if starts_with_monarch_name(guess_raw)
        && (!answer_numbers.is_empty() || !guess_numbers.is_empty())
        && answer_numbers != guess_numbers
    {
        reasons.push(GuardRailReason::MonarchNumeralMismatch);
    }

    if !answer_numbers.is_empty() && !guess_numbers.is_empty() {
        if answer_numbers != guess_numbers {
            reasons.push(GuardRailReason::NumericMismatch);
        } else {
            let shared = answer
                .non_numeric_tokens
                .iter()
                .any(|token| guess.non_numeric_tokens.contains(token));
            let best =
                best_token_similarity(&answer.non_numeric_tokens, &guess.non_numeric_tokens);
            if !shared && best < SHARED_NUMBER_TOKEN_SIMILARITY {
                reasons.push(GuardRailReason::NumericOnlyOverlap);
            }
        }
    }

    if answer.non_numeric_tokens.len() == 1 && answer.numeric_tokens.len() == 1 {
        let best = best_token_similarity(&answer.non_numeric_tokens, &guess.non_numeric_tokens);
        if best < HEAD_WORD_SIMILARITY {
            reasons.push(GuardRailReason::HeadWordMismatch);
        }
    }

    reasons
}

/// Whether the guess's first raw word is a monarch first name.
fn starts_with_monarch_name(guess_raw: &str) -> bool {
    let lowered = strip_diacritics(guess_raw).to_lowercase();
    let first = lowered.split_whitespace().next().unwrap_or("");
    MONARCH_FIRST_NAMES.contains(&first)
}
