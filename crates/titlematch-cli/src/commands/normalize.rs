//! The `titlematch normalize` command.

use anyhow::Result;

use titlematch_core::report::OutputFormat;
use titlematch_core::{fold_number_words, normalize};

pub fn execute(text: String, keep_articles: bool, format: String) -> Result<()> {
    let format: OutputFormat = format.parse()?;
    let normalized = normalize(&fold_number_words(&text), !keep_articles);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&normalized)?),
        OutputFormat::Text => {
            println!("{}", normalized.normalized);
            println!("  tokens: [{}]", normalized.tokens.join(", "));
            println!("  numeric: [{}]", normalized.numeric_tokens.join(", "));
            println!(
                "  token set: [{}]",
                normalized
                    .token_set
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        OutputFormat::Markdown => anyhow::bail!("normalize does not support markdown output"),
    }

    Ok(())
}
