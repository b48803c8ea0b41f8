//! TOML judge-set parser.
//!
//! Loads judge sets from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Expectation, GuessCase, JudgeCase, JudgeSet};
use crate::normalize::canonicalize;

/// Intermediate TOML structure for parsing judge set files.
#[derive(Debug, Deserialize)]
struct TomlJudgeFile {
    judge_set: TomlJudgeSetHeader,
    #[serde(default)]
    cases: Vec<TomlJudgeCase>,
}

#[derive(Debug, Deserialize)]
struct TomlJudgeSetHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlJudgeCase {
    id: String,
    answer: String,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    accept: Vec<String>,
    #[serde(default)]
    reject: Vec<String>,
    /// Long form: `[[cases.guesses]]` tables with an explicit expectation.
    #[serde(default)]
    guesses: Vec<TomlGuess>,
}

#[derive(Debug, Deserialize)]
struct TomlGuess {
    text: String,
    expect: String,
}

/// Parse a single TOML file into a `JudgeSet`.
pub fn parse_judge_set(path: &Path) -> Result<JudgeSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read judge set file: {}", path.display()))?;

    parse_judge_set_str(&content, path)
}

/// Parse a TOML string into a `JudgeSet` (useful for testing).
pub fn parse_judge_set_str(content: &str, source_path: &Path) -> Result<JudgeSet> {
    let parsed: TomlJudgeFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let cases = parsed
        .cases
        .into_iter()
        .map(|c| {
            let mut guesses: Vec<GuessCase> = c
                .accept
                .into_iter()
                .map(|text| GuessCase {
                    text,
                    expect: Expectation::Accept,
                })
                .chain(c.reject.into_iter().map(|text| GuessCase {
                    text,
                    expect: Expectation::Reject,
                }))
                .collect();

            for g in c.guesses {
                let expect: Expectation = g
                    .expect
                    .parse()
                    .with_context(|| format!("case '{}', guess '{}'", c.id, g.text))?;
                guesses.push(GuessCase {
                    text: g.text,
                    expect,
                });
            }

            Ok(JudgeCase {
                id: c.id,
                answer: c.answer,
                aliases: c.aliases,
                tags: c.tags,
                guesses,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(JudgeSet {
        id: parsed.judge_set.id,
        name: parsed.judge_set.name,
        description: parsed.judge_set.description,
        cases,
    })
}

/// Recursively load all `.toml` judge set files from a directory.
///
/// Files are visited in path order so the result is stable across runs.
pub fn load_judge_directory(dir: &Path) -> Result<Vec<JudgeSet>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            sets.extend(load_judge_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_judge_set(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(sets)
}

/// Load a judge set file, or every judge set under a directory.
pub fn load_judge_sets(path: &Path) -> Result<Vec<JudgeSet>> {
    if path.is_dir() {
        load_judge_directory(path)
    } else {
        Ok(vec![parse_judge_set(path)?])
    }
}

/// A warning from judge set validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The case ID (if applicable).
    pub case_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a judge set for common authoring mistakes.
pub fn validate_judge_set(set: &JudgeSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if set.cases.is_empty() {
        warnings.push(ValidationWarning {
            case_id: None,
            message: "judge set has no cases".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for case in &set.cases {
        if !seen_ids.insert(&case.id) {
            warnings.push(ValidationWarning {
                case_id: Some(case.id.clone()),
                message: format!("duplicate case ID: {}", case.id),
            });
        }
    }

    for case in &set.cases {
        let warn = |message: String| ValidationWarning {
            case_id: Some(case.id.clone()),
            message,
        };

        if case.answer.trim().is_empty() {
            warnings.push(warn("answer is empty".into()));
        }

        if case.guesses.is_empty() {
            warnings.push(warn("case has no guesses".into()));
        }

        let accepted: HashSet<&str> = case
            .expected(Expectation::Accept)
            .map(|g| g.text.as_str())
            .collect();
        for g in case.expected(Expectation::Reject) {
            if accepted.contains(g.text.as_str()) {
                warnings.push(warn(format!(
                    "guess '{}' is listed as both accept and reject",
                    g.text
                )));
            }
        }

        // A rejected guess that normalizes to an alias can never be rejected.
        let aliases: HashSet<String> = std::iter::once(&case.answer)
            .chain(&case.aliases)
            .map(|a| canonicalize(a).normalized)
            .collect();
        for g in case.expected(Expectation::Reject) {
            if aliases.contains(&canonicalize(&g.text).normalized) {
                warnings.push(warn(format!(
                    "rejected guess '{}' normalizes to the answer or an alias",
                    g.text
                )));
            }
        }
    }

    warnings
}
