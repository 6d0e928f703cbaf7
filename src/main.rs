//! # Dealterms CLI
//!
//! The `dealterms` binary analyzes purchase-contract text files and prints
//! the extracted deal terms as JSON.
//!
//! ## Usage
//!
//! ```bash
//! dealterms --config ./config/dealterms.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dealterms analyze <file>` | Run the full model-backed extraction pipeline |
//! | `dealterms fallback <file>` | Offline pattern-scan only, no model call |
//! | `dealterms prompt <file>` | Print the rendered prompt for inspection |
//!
//! ## Examples
//!
//! ```bash
//! # Full analysis (requires OPENAI_API_KEY)
//! dealterms analyze contract.txt
//!
//! # Compact output for piping
//! dealterms analyze contract.txt --compact > terms.json
//!
//! # No network: see what the pattern scanner alone recovers
//! dealterms fallback contract.txt
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use dealterms::analyze::{analyze, AnalysisOutcome, AnalysisReport};
use dealterms::config::load_config;
use dealterms::fallback::synthesize_fallback;
use dealterms::model::OpenAiClient;
use dealterms::prompt::build_prompt;
use dealterms::validate::validate_document;

/// Dealterms CLI — structured contract-term extraction with graceful
/// degradation.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file; when the file does not exist, built-in defaults apply.
#[derive(Parser)]
#[command(
    name = "dealterms",
    about = "Dealterms — turns unreliable LLM contract-analysis responses into structured deal terms",
    version,
    long_about = "Dealterms sends purchase-contract text to a language model with a \
    structured-extraction prompt, repairs and parses the near-JSON that comes back, merges it \
    into a canonical document shape, and validates the result. Parsing failures degrade to a \
    pattern-scan fallback instead of erroring."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/dealterms.toml`. Model and analysis settings
    /// are read from this file; defaults apply when it is absent.
    #[arg(long, global = true, default_value = "./config/dealterms.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Analyze a contract text file with the configured model.
    ///
    /// Reads the file, runs the full extraction pipeline, and prints the
    /// resulting document as JSON plus any validation warnings on stderr.
    /// Requires `OPENAI_API_KEY` unless the provider is `disabled`.
    Analyze {
        /// Path to a plain-text contract file.
        file: PathBuf,

        /// Print compact JSON instead of pretty-printed.
        #[arg(long)]
        compact: bool,
    },

    /// Pattern-scan a contract without calling the model.
    ///
    /// Produces the same document the pipeline would fall back to on model
    /// failure. Useful offline and for testing fixture contracts.
    Fallback {
        /// Path to a plain-text contract file.
        file: PathBuf,

        /// Print compact JSON instead of pretty-printed.
        #[arg(long)]
        compact: bool,
    },

    /// Print the rendered model prompt for a contract file.
    ///
    /// Shows exactly what would be sent to the model, including any
    /// truncation marker. No network call is made.
    Prompt {
        /// Path to a plain-text contract file.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Analyze { file, compact } => {
            let text = read_contract(&file)?;
            if config.model.provider == "disabled" {
                anyhow::bail!("model provider is disabled; use `dealterms fallback` instead");
            }
            let client = OpenAiClient::new(&config.model)
                .map_err(|e| anyhow::anyhow!("{}", e))
                .context("model client configuration")?;
            let report = analyze(&client, &config.analysis, &text).await;
            print_report(&report, compact)?;
        }
        Commands::Fallback { file, compact } => {
            let text = read_contract(&file)?;
            let document = synthesize_fallback(&text);
            let validation = validate_document(&document);
            let report = AnalysisReport {
                document,
                fully_valid: validation.fully_valid,
                warnings: validation.warnings,
                outcome: AnalysisOutcome::Fallback,
            };
            print_report(&report, compact)?;
        }
        Commands::Prompt { file } => {
            let text = read_contract(&file)?;
            print!("{}", build_prompt(&text, config.analysis.max_contract_chars));
        }
    }

    Ok(())
}

fn read_contract(path: &PathBuf) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read contract file: {}", path.display()))?;
    if text.trim().is_empty() {
        anyhow::bail!("Contract file is empty: {}", path.display());
    }
    Ok(text)
}

fn print_report(report: &AnalysisReport, compact: bool) -> Result<()> {
    let json = if compact {
        serde_json::to_string(&report.document)?
    } else {
        serde_json::to_string_pretty(&report.document)?
    };
    println!("{}", json);

    if report.outcome == AnalysisOutcome::Fallback {
        eprintln!("note: fallback document (model extraction unavailable)");
    }
    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }

    Ok(())
}
