//! Data model for answers and judge-set fixtures.
//!
//! A judge set is a list of cases, each pairing an answer (title plus
//! aliases) with guesses that are expected to be accepted or rejected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decision::{decide, Decision};
use crate::error::TitlematchError;

/// The canonical title a guess is judged against, with its known aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSpec {
    pub title: String,
    /// Alternative accepted titles. Duplicates are harmless.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl AnswerSpec {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            aliases: Vec::new(),
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Judge a guess against this answer.
    pub fn judge(&self, guess: &str) -> Decision {
        decide(&self.title, guess, &self.aliases)
    }
}

/// What a fixture expects the judge to do with a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expectation {
    Accept,
    Reject,
}

impl Expectation {
    pub fn from_accepted(accepted: bool) -> Self {
        if accepted {
            Expectation::Accept
        } else {
            Expectation::Reject
        }
    }

    pub fn is_accept(self) -> bool {
        self == Expectation::Accept
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Accept => write!(f, "accept"),
            Expectation::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for Expectation {
    type Err = TitlematchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "accept" | "accepted" | "yes" => Ok(Expectation::Accept),
            "reject" | "rejected" | "no" => Ok(Expectation::Reject),
            other => Err(TitlematchError::UnknownExpectation(other.to_string())),
        }
    }
}

/// A guess together with the expected verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessCase {
    pub text: String,
    pub expect: Expectation,
}

/// One answer and the guesses graded against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeCase {
    /// Unique identifier within the set.
    pub id: String,
    /// The canonical title.
    pub answer: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Tags for filtering cases.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub guesses: Vec<GuessCase>,
}

impl JudgeCase {
    pub fn answer_spec(&self) -> AnswerSpec {
        AnswerSpec::new(self.answer.clone()).with_aliases(self.aliases.iter().cloned())
    }

    pub fn expected(&self, expect: Expectation) -> impl Iterator<Item = &GuessCase> {
        self.guesses.iter().filter(move |g| g.expect == expect)
    }
}

/// A collection of judge cases loaded from one fixture file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeSet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cases: Vec<JudgeCase>,
}

impl JudgeSet {
    /// Keep only cases carrying at least one of `tags`. An empty filter keeps everything.
    pub fn filter_tags(&self, tags: &[String]) -> JudgeSet {
        let cases = if tags.is_empty() {
            self.cases.clone()
        } else {
            self.cases
                .iter()
                .filter(|c| c.tags.iter().any(|t| tags.contains(t)))
                .cloned()
                .collect()
        };
        JudgeSet {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            cases,
        }
    }

    /// Total number of guesses across all cases.
    pub fn guess_count(&self) -> usize {
        self.cases.iter().map(|c| c.guesses.len()).sum()
    }
}
