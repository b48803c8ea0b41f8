//! The `titlematch judge` command.

use anyhow::Result;
use serde_json::json;

use titlematch_core::normalize::canonicalize;
use titlematch_core::report::OutputFormat;
use titlematch_core::{AnswerSpec, Decision, NormalizedText, PhaseDetails};

pub fn execute(
    answer: String,
    guess: String,
    aliases: Vec<String>,
    format: String,
    debug: bool,
) -> Result<()> {
    let format: OutputFormat = format.parse()?;
    let spec = AnswerSpec::new(answer).with_aliases(aliases);
    let decision = spec.judge(&guess);

    match format {
        OutputFormat::Json => {
            let value = if debug {
                json!({
                    "decision": decision,
                    "normalized_answer": canonicalize(&spec.title),
                    "normalized_guess": canonicalize(&guess),
                })
            } else {
                serde_json::to_value(&decision)?
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => print_text(&spec, &guess, &decision, debug),
        OutputFormat::Markdown => anyhow::bail!("judge does not support markdown output"),
    }

    Ok(())
}

fn print_text(spec: &AnswerSpec, guess: &str, decision: &Decision, debug: bool) {
    let verdict = if decision.accepted {
        "ACCEPTED"
    } else {
        "REJECTED"
    };
    println!("{verdict}: {}", decision.reason);
    println!("  phase: {}", decision.phase());

    match &decision.details {
        PhaseDetails::Alias => {}
        PhaseDetails::GuardRails { reasons, .. } => {
            for reason in reasons {
                println!("  guard rail: {reason}");
            }
        }
        PhaseDetails::Fuzzy(scores) => {
            println!("  rule: {}", scores.applied_rule);
            println!("  jaro-winkler: {:.4}", scores.jaro_winkler);
            println!("  damerau-levenshtein: {}", scores.damerau_levenshtein);
            println!("  token jaccard: {:.4}", scores.token_jaccard);
            println!("  combined: {:.4}", scores.combined_score);
        }
    }

    if debug {
        print_normalized("answer", &canonicalize(&spec.title));
        for alias in &spec.aliases {
            print_normalized("alias", &canonicalize(alias));
        }
        print_normalized("guess", &canonicalize(guess));
    }
}

fn print_normalized(label: &str, text: &NormalizedText) {
    println!("  {label}: \"{}\"", text.normalized);
    println!("    numeric: [{}]", text.numeric_tokens.join(", "));
    println!("    words: [{}]", text.non_numeric_tokens.join(", "));
}
