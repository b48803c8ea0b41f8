//! titlematch CLI: judge guesses and grade judge-set fixtures.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "titlematch",
    version,
    about = "Deterministic answer judging for title-guessing games"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Judge a single guess against an answer
    Judge {
        /// Canonical answer title
        #[arg(long)]
        answer: String,

        /// The guess to judge
        #[arg(long)]
        guess: String,

        /// Accepted alias (repeatable)
        #[arg(long = "alias")]
        aliases: Vec<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Also print the normalized form of both sides
        #[arg(long)]
        debug: bool,
    },

    /// Show how a string is normalized
    Normalize {
        /// Text to normalize
        text: String,

        /// Keep leading articles ("the", "a", "an")
        #[arg(long)]
        keep_articles: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Grade judge-set fixtures
    Grade {
        /// Path to .toml judge set or directory
        #[arg(long)]
        judge_set: PathBuf,

        /// Max cases graded concurrently
        #[arg(long)]
        parallelism: Option<usize>,

        /// Output directory for reports
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Filter by tags (comma-separated)
        #[arg(long)]
        filter: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Exit code 1 if any judgement disagrees with its fixture
        #[arg(long)]
        fail_on_mismatch: bool,
    },

    /// Validate judge-set TOML files
    Validate {
        /// Path to judge set file or directory
        #[arg(long)]
        judge_set: PathBuf,
    },

    /// Compare two grade reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Regression threshold on per-case accuracy
        #[arg(long, default_value = "0.05")]
        threshold: f64,

        /// Exit code 1 if regressions found
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create starter config and example judge set
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("titlematch=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Judge {
            answer,
            guess,
            aliases,
            format,
            debug,
        } => commands::judge::execute(answer, guess, aliases, format, debug),
        Commands::Normalize {
            text,
            keep_articles,
            format,
        } => commands::normalize::execute(text, keep_articles, format),
        Commands::Grade {
            judge_set,
            parallelism,
            output,
            format,
            filter,
            config,
            fail_on_mismatch,
        } => {
            commands::grade::execute(
                judge_set,
                parallelism,
                output,
                format,
                filter,
                config,
                fail_on_mismatch,
            )
            .await
        }
        Commands::Validate { judge_set } => commands::validate::execute(judge_set),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
