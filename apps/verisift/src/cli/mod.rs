//! # Verisift CLI Module
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `analyze` - Analyse text, a text file, an article URL, an image or a recording
//! - `verify` - Look for a claim in the official documents
//! - `catalog` - List the official documents

mod commands;

use crate::config::{DEFAULT_CONFIG_PATH, Settings};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use verisift_core::VerisiftError;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Verisift - misinformation triage
///
/// Classifies a claim, asks a language model when the classifier is unsure,
/// gathers social evidence and cites official documents.
#[derive(Parser, Debug)]
#[command(name = "verisift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the TOML configuration file
    #[arg(short = 'c', long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },

    /// Analyse a claim
    Analyze(AnalyzeInput),

    /// Look for a claim in the official documents
    Verify {
        /// The claim or question (at least 10 characters)
        #[arg(short = 'Q', long)]
        query: String,
    },

    /// List the official documents and fallback suggestions
    Catalog,
}

/// Exactly one input to analyse.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct AnalyzeInput {
    /// Text to analyse
    #[arg(short, long)]
    pub text: Option<String>,

    /// File containing the text to analyse
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Article URL whose paragraphs are analysed
    #[arg(short, long)]
    pub url: Option<String>,

    /// Image whose text is recognised by the OCR service, then analysed
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Recording transcribed by the speech service, then analysed
    #[arg(long)]
    pub voice: Option<PathBuf>,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), VerisiftError> {
    let settings = Settings::load(&cli.config)?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(&settings, &host, port).await,
        Some(Commands::Analyze(input)) => cmd_analyze(&settings, json_mode, input).await,
        Some(Commands::Verify { query }) => cmd_verify(&settings, json_mode, &query).await,
        Some(Commands::Catalog) | None => cmd_catalog(&settings, json_mode),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn analyze_requires_one_input() {
        assert!(Cli::try_parse_from(["verisift", "analyze"]).is_err());
        assert!(
            Cli::try_parse_from(["verisift", "analyze", "--text", "a", "--url", "https://x"])
                .is_err()
        );
    }

    #[test]
    fn analyze_accepts_an_image() {
        let cli = Cli::try_parse_from(["verisift", "analyze", "--image", "claim.png"])
            .expect("parse");
        match cli.command {
            Some(Commands::Analyze(input)) => {
                assert_eq!(input.image, Some(PathBuf::from("claim.png")));
                assert!(input.voice.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(
            Cli::try_parse_from(["verisift", "analyze", "--image", "a.png", "--voice", "b.wav"])
                .is_err()
        );
    }

    #[test]
    fn server_defaults() {
        let cli = Cli::try_parse_from(["verisift", "server"]).expect("parse");
        match cli.command {
            Some(Commands::Server { host, port }) => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 8000);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.config, PathBuf::from("verisift.toml"));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "verisift",
            "verify",
            "-Q",
            "free laptop scheme",
            "--json-mode",
        ])
        .expect("parse");
        assert!(cli.json_mode);
    }
}
