//! String and token-set similarity metrics.
//!
//! All functions are pure and operate on Unicode scalar values. Degenerate
//! inputs (empty strings, empty sets) have fixed, documented results instead
//! of dividing by zero.
//!
//! Jaro-Winkler is computed here rather than with `strsim`: the prefix boost
//! applies at every Jaro score and two empty strings score 0.

use std::collections::BTreeSet;

const WINKLER_SCALING: f64 = 0.1;
const WINKLER_MAX_PREFIX: usize = 4;

/// Jaro-Winkler similarity in `[0, 1]`.
///
/// Returns 0 if either side is empty and exactly 1 for equal non-empty
/// strings.
pub fn jaro_winkler(left: &str, right: &str) -> f64 {
    let left: Vec<char> = left.chars().collect();
    let right: Vec<char> = right.chars().collect();

    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    if left == right {
        return 1.0;
    }

    // Strings of length 1 get no window; unequal ones then never match.
    let match_distance = (left.len().max(right.len()) / 2).saturating_sub(1);
    let mut left_matches = vec![false; left.len()];
    let mut right_matches = vec![false; right.len()];

    let mut matches = 0usize;
    for (i, lc) in left.iter().enumerate() {
        let start = i.saturating_sub(match_distance);
        let end = (i + match_distance + 1).min(right.len());
        for j in start..end {
            if right_matches[j] || *lc != right[j] {
                continue;
            }
            left_matches[i] = true;
            right_matches[j] = true;
            matches += 1;
            break;
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let mut transpositions = 0usize;
    let mut k = 0usize;
    for (i, lc) in left.iter().enumerate() {
        if !left_matches[i] {
            continue;
        }
        while !right_matches[k] {
            k += 1;
        }
        if *lc != right[k] {
            transpositions += 1;
        }
        k += 1;
    }

    let m = matches as f64;
    let half_transpositions = transpositions as f64 / 2.0;
    let jaro = (m / left.len() as f64 + m / right.len() as f64 + (m - half_transpositions) / m)
        / 3.0;

    let prefix = left
        .iter()
        .zip(right.iter())
        .take(WINKLER_MAX_PREFIX)
        .take_while(|(a, b)| a == b)
        .count();

    jaro + prefix as f64 * WINKLER_SCALING * (1.0 - jaro)
}

/// Unrestricted Damerau-Levenshtein distance over chars.
///
/// Insertions, deletions, substitutions and adjacent transpositions each
/// cost 1, and transposed characters may be edited again afterwards.
pub fn damerau_levenshtein(left: &str, right: &str) -> usize {
    strsim::damerau_levenshtein(left, right)
}

/// Jaccard index `|A ∩ B| / |A ∪ B|`; two empty sets are identical (1.0).
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        1.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Highest Jaro-Winkler score over every pair drawn from the two sequences.
///
/// 0 when either side is empty.
pub fn best_token_similarity<A, B>(left: &[A], right: &[B]) -> f64
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let mut best = 0.0f64;
    for a in left {
        for b in right {
            best = best.max(jaro_winkler(a.as_ref(), b.as_ref()));
        }
    }
    best
}
