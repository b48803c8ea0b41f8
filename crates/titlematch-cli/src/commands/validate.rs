//! The `titlematch validate` command.

use std::path::PathBuf;

use anyhow::Result;

use titlematch_core::parser::{load_judge_sets, validate_judge_set};

pub fn execute(judge_set_path: PathBuf) -> Result<()> {
    let sets = load_judge_sets(&judge_set_path)?;

    let mut total_warnings = 0;

    for set in &sets {
        println!(
            "Judge set: {} ({} cases, {} guesses)",
            set.name,
            set.cases.len(),
            set.guess_count()
        );

        let warnings = validate_judge_set(set);
        for w in &warnings {
            let prefix = w
                .case_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All judge sets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
