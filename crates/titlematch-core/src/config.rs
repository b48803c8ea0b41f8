//! Grading configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level titlematch configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitlematchConfig {
    /// Max cases graded concurrently.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Output directory for grade reports. `${VAR}` references are expanded.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Directory searched when no judge set path is given.
    #[serde(default = "default_judge_set_dir")]
    pub judge_set_dir: PathBuf,
    /// Exit non-zero when any judgement disagrees with its fixture.
    #[serde(default)]
    pub fail_on_mismatch: bool,
}

fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./titlematch-results")
}
fn default_judge_set_dir() -> PathBuf {
    PathBuf::from("./judge-sets")
}

impl Default for TitlematchConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
            judge_set_dir: default_judge_set_dir(),
            fail_on_mismatch: false,
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `titlematch.toml` in the current directory
/// 2. `~/.config/titlematch/config.toml`
///
/// Environment variable overrides: `TITLEMATCH_PARALLELISM`, `TITLEMATCH_OUTPUT_DIR`.
pub fn load_config_from(path: Option<&Path>) -> Result<TitlematchConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("titlematch.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<TitlematchConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => TitlematchConfig::default(),
    };

    apply_env_overrides(config, |name| std::env::var(name).ok())
}

/// Apply `TITLEMATCH_*` overrides and expand `${VAR}` in the output directory.
fn apply_env_overrides<F>(mut config: TitlematchConfig, lookup: F) -> Result<TitlematchConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("TITLEMATCH_PARALLELISM") {
        config.parallelism = value
            .trim()
            .parse()
            .with_context(|| format!("invalid TITLEMATCH_PARALLELISM: '{value}'"))?;
    }

    if let Some(dir) = lookup("TITLEMATCH_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }

    let output_dir = expand_env_vars(&config.output_dir.to_string_lossy(), &lookup);
    config.output_dir = PathBuf::from(output_dir);

    Ok(config)
}

/// Expand `${VAR}` references through `lookup`.
///
/// Unset variables expand to the empty string; an unterminated `${` is left as
/// is. Substituted values are not expanded again.
fn expand_env_vars<F>(s: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        result.push_str(&lookup(&rest[start + 2..start + end]).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("titlematch"))
}
