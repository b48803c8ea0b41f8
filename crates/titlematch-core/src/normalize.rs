//! Lexical normalization of titles and guesses.
//!
//! Produces a canonical, lowercase, diacritic-free token form in which every
//! spelling of a number ("5", "five", "fifth", "5th", "V") becomes the same
//! tagged numeric token. Number-word folding is a separate first stage
//! ([`fold_number_words`]) because it has to look at multi-token windows
//! ("fifty one") before the general tokenizer runs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};

/// Prefix of every numeric token in normalized output (`num_13`).
///
/// The tag is part of the normalized string, so it counts toward string
/// length and similarity scores downstream.
pub const NUMERIC_TAG_PREFIX: &str = "num_";

const ARTICLES: &[&str] = &["the", "a", "an"];

/// Words ignored when building token sets.
pub const STOPWORDS: &[&str] = &[
    "of", "and", "for", "to", "in", "on", "at", "by", "with", "from",
];

const UNITS: &[(&str, u32)] = &[
    ("zero", 0),
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
];

const TENS: &[(&str, u32)] = &[
    ("twenty", 20),
    ("thirty", 30),
    ("forty", 40),
    ("fifty", 50),
    ("sixty", 60),
    ("seventy", 70),
    ("eighty", 80),
    ("ninety", 90),
];

const ORDINAL_UNITS: &[(&str, u32)] = &[
    ("first", 1),
    ("second", 2),
    ("third", 3),
    ("fourth", 4),
    ("fifth", 5),
    ("sixth", 6),
    ("seventh", 7),
    ("eighth", 8),
    ("ninth", 9),
    ("tenth", 10),
    ("eleventh", 11),
    ("twelfth", 12),
    ("thirteenth", 13),
    ("fourteenth", 14),
    ("fifteenth", 15),
    ("sixteenth", 16),
    ("seventeenth", 17),
    ("eighteenth", 18),
    ("nineteenth", 19),
];

const ORDINAL_TENS: &[(&str, u32)] = &[
    ("twentieth", 20),
    ("thirtieth", 30),
    ("fortieth", 40),
    ("fiftieth", 50),
    ("sixtieth", 60),
    ("seventieth", 70),
    ("eightieth", 80),
    ("ninetieth", 90),
];

const HUNDRED: (&str, u32) = ("hundred", 100);

const ORDINAL_SUFFIXES: &[&str] = &["st", "nd", "rd", "th"];

/// Canonical token form of a phrase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedText {
    /// Emitted tokens joined by single spaces.
    pub normalized: String,
    /// Emitted tokens in source order, numeric tags included.
    pub tokens: Vec<String>,
    /// Deduplicated tokens with stopwords removed.
    pub token_set: BTreeSet<String>,
    /// Numeric tags in source order.
    pub numeric_tokens: Vec<String>,
    /// Tokens that are neither numeric tags nor stopwords, in source order.
    pub non_numeric_tokens: Vec<String>,
}

impl NormalizedText {
    /// Deduplicated, sorted numeric tags.
    pub fn numeric_set(&self) -> BTreeSet<&str> {
        self.numeric_tokens.iter().map(String::as_str).collect()
    }

    pub fn has_numbers(&self) -> bool {
        !self.numeric_tokens.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A number recognized at some token position.
struct NumberSpan {
    value: u32,
    consumed: usize,
}

fn lookup(table: &[(&str, u32)], word: &str) -> Option<u32> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == word)
        .map(|(_, value)| *value)
}

/// Recognize a spelled-out cardinal or ordinal starting at `index`.
///
/// Tens may absorb a following unit of the same kind ("twenty one",
/// "twentieth first"); everything else consumes a single token.
fn number_window(words: &[&str], index: usize) -> Option<NumberSpan> {
    let word = words[index];
    let next = words.get(index + 1).copied();

    if let Some(value) = lookup(UNITS, word) {
        return Some(NumberSpan { value, consumed: 1 });
    }

    if let Some(tens) = lookup(TENS, word) {
        return Some(match next.and_then(|n| lookup(UNITS, n)) {
            Some(unit) => NumberSpan {
                value: tens + unit,
                consumed: 2,
            },
            None => NumberSpan {
                value: tens,
                consumed: 1,
            },
        });
    }

    if let Some(value) = lookup(ORDINAL_UNITS, word) {
        return Some(NumberSpan { value, consumed: 1 });
    }

    if let Some(tens) = lookup(ORDINAL_TENS, word) {
        return Some(match next.and_then(|n| lookup(ORDINAL_UNITS, n)) {
            Some(unit) => NumberSpan {
                value: tens + unit,
                consumed: 2,
            },
            None => NumberSpan {
                value: tens,
                consumed: 1,
            },
        });
    }

    None
}

/// Canonical decimal form of an ASCII digit run ("007" -> "7").
fn canonical_digits(digits: &str) -> Option<String> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let trimmed = digits.trim_start_matches('0');
    Some(if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    })
}

fn ordinal_digits(word: &str) -> Option<String> {
    ORDINAL_SUFFIXES
        .iter()
        .find_map(|suffix| word.strip_suffix(*suffix))
        .and_then(canonical_digits)
}

/// Parse a Roman numeral with the right-to-left subtractive rule.
///
/// Any token made only of `mdclxvi` qualifies, English words included
/// ("mix" is 1009).
fn roman_value(word: &str) -> Option<i64> {
    if word.is_empty() {
        return None;
    }
    let mut total: i64 = 0;
    let mut previous: i64 = 0;
    for c in word.chars().rev() {
        let current = match c {
            'm' => 1000,
            'd' => 500,
            'c' => 100,
            'l' => 50,
            'x' => 10,
            'v' => 5,
            'i' => 1,
            _ => return None,
        };
        if current < previous {
            total -= current;
        } else {
            total += current;
        }
        previous = current;
    }
    Some(total)
}

fn number_word_value(word: &str) -> Option<u32> {
    lookup(UNITS, word)
        .or_else(|| lookup(TENS, word))
        .or_else(|| (word == HUNDRED.0).then_some(HUNDRED.1))
}

/// Numeric value at `index` and how many source tokens it covers.
///
/// Rules are tried in a fixed order and the first match wins.
fn numeric_at(words: &[&str], index: usize) -> Option<(String, usize)> {
    if let Some(span) = number_window(words, index) {
        return Some((span.value.to_string(), span.consumed));
    }
    let word = words[index];
    if let Some(value) = ordinal_digits(word) {
        return Some((value, 1));
    }
    if let Some(value) = canonical_digits(word) {
        return Some((value, 1));
    }
    if let Some(value) = roman_value(word) {
        return Some((value.to_string(), 1));
    }
    number_word_value(word).map(|value| (value.to_string(), 1))
}

/// Decompose to NFD and drop non-spacing marks ("café" -> "cafe").
///
/// Spacing and enclosing marks (category Mc, Me) are kept.
pub fn strip_diacritics(raw: &str) -> String {
    raw.nfd()
        .filter(|c| c.general_category() != GeneralCategory::NonspacingMark)
        .collect()
}

/// Diacritic-strip, lowercase, rewrite punctuation and collapse whitespace.
fn clean(raw: &str, expand_ampersand: bool) -> String {
    let lowered = strip_diacritics(raw).to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        match c {
            '&' if expand_ampersand => out.push_str(" and "),
            '\'' | '\u{2019}' | '`' => {}
            '(' | ')' | '-' | '_' | ':' | '.' | ',' | '/' => out.push(' '),
            _ => out.push(c),
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Replace spelled-out numbers and ordinals with digit strings.
///
/// `"Area Fifty-One"` becomes `"area 51"`, `"Henry the Fifth"` becomes
/// `"henry the 5"`. Apply before [`normalize`] when number words should be
/// recognized.
pub fn fold_number_words(raw: &str) -> String {
    let cleaned = clean(raw, false);
    let words: Vec<&str> = cleaned.split_whitespace().collect();

    let mut output = Vec::with_capacity(words.len());
    let mut index = 0;
    while index < words.len() {
        match number_window(&words, index) {
            Some(span) => {
                output.push(span.value.to_string());
                index += span.consumed;
            }
            None => {
                output.push(words[index].to_string());
                index += 1;
            }
        }
    }
    output.join(" ")
}

/// Normalize raw text into its canonical token form.
pub fn normalize(raw: &str, drop_articles: bool) -> NormalizedText {
    let cleaned = clean(raw, true);
    let words: Vec<&str> = cleaned.split_whitespace().collect();

    let mut tokens = Vec::with_capacity(words.len());
    let mut numeric_tokens = Vec::new();
    let mut non_numeric_tokens = Vec::new();

    let mut index = 0;
    while index < words.len() {
        let word = words[index];
        if drop_articles && ARTICLES.contains(&word) {
            index += 1;
            continue;
        }

        match numeric_at(&words, index) {
            Some((value, consumed)) => {
                let tag = format!("{NUMERIC_TAG_PREFIX}{value}");
                numeric_tokens.push(tag.clone());
                tokens.push(tag);
                index += consumed;
            }
            None => {
                if !is_stopword(word) {
                    non_numeric_tokens.push(word.to_string());
                }
                tokens.push(word.to_string());
                index += 1;
            }
        }
    }

    let token_set = tokens
        .iter()
        .filter(|t| !is_stopword(t))
        .cloned()
        .collect();

    NormalizedText {
        normalized: tokens.join(" "),
        tokens,
        token_set,
        numeric_tokens,
        non_numeric_tokens,
    }
}

/// [`normalize`] with articles dropped.
pub fn normalize_default(raw: &str) -> NormalizedText {
    normalize(raw, true)
}

/// The comparison form used by the judge: fold number words, then normalize
/// with articles dropped.
pub fn canonicalize(raw: &str) -> NormalizedText {
    normalize(&fold_number_words(raw), true)
}
