//! The `titlematch init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    if Path::new("titlematch.toml").exists() {
        println!("titlematch.toml already exists, skipping.");
    } else {
        std::fs::write("titlematch.toml", SAMPLE_CONFIG)
            .context("failed to write titlematch.toml")?;
        println!("Created titlematch.toml");
    }

    std::fs::create_dir_all("judge-sets").context("failed to create judge-sets/")?;
    let example_path = Path::new("judge-sets/example.toml");
    if example_path.exists() {
        println!("judge-sets/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_JUDGE_SET)
            .context("failed to write judge-sets/example.toml")?;
        println!("Created judge-sets/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: titlematch validate --judge-set judge-sets/example.toml");
    println!("  2. Run: titlematch grade --judge-set judge-sets/example.toml");
    println!("  3. Try: titlematch judge --answer \"Apollo 13\" --guess \"Apollo Thirteen\"");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# titlematch configuration

parallelism = 4
output_dir = "./titlematch-results"
judge_set_dir = "./judge-sets"
fail_on_mismatch = false
"#;

const EXAMPLE_JUDGE_SET: &str = r#"[judge_set]
id = "example"
name = "Example Judge Set"
description = "A small judge set to get started"

[[cases]]
id = "apollo-13"
answer = "Apollo 13"
aliases = ["Apollo Thirteen"]
tags = ["numbers"]
accept = ["apollo XIII", "Apollo Thirteen"]
reject = ["April 13", "Apollo 11"]

[[cases]]
id = "beatles"
answer = "The Beatles"
tags = ["articles"]
accept = ["Beatles", "the beatles"]
reject = ["The Beach Boys"]
"#;
