//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// phaply-rs: Vietnamese legal research agent.
///
/// Classifies a question against the supported legal domain, fans out
/// grounded web searches, and synthesizes a cited answer.
#[derive(Parser, Debug)]
#[command(name = "phaply-rs")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a legal question and print the cited answer.
    #[command(after_help = r#"Examples:
  phaply-rs ask "Thủ tục sang tên xe máy thế nào?"
  phaply-rs ask "Phí công chứng nhà đất?" --queries 5
  phaply-rs ask "Luật Đất đai 2024 có gì mới?" --reasoning-model gemini-2.5-pro
  phaply-rs --format json ask "Sang tên sổ đỏ mất bao lâu?" | jq '.sources'
"#)]
    Ask {
        /// The question to research.
        question: String,

        /// Number of search queries to generate.
        #[arg(short = 'q', long)]
        queries: Option<usize>,

        /// Model for answer finalization (overrides configuration).
        #[arg(long)]
        reasoning_model: Option<String>,

        /// Model for query generation and web research.
        #[arg(long)]
        query_model: Option<String>,

        /// Maximum concurrent research calls.
        #[arg(long)]
        concurrency: Option<usize>,

        /// Directory containing prompt template overrides.
        #[arg(long, env = "PHAPLY_PROMPT_DIR")]
        prompt_dir: Option<PathBuf>,

        /// API key (defaults to the GEMINI_API_KEY environment variable).
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Prompt template operations (init, path).
    #[command(subcommand)]
    Prompts(PromptCommands),
}

/// Prompt template commands.
#[derive(Subcommand, Debug)]
pub enum PromptCommands {
    /// Write the default prompt templates to a directory for editing.
    ///
    /// Existing files are not overwritten.
    Init {
        /// Target directory (defaults to ~/.config/phaply-rs/prompts).
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Print the default prompt template directory.
    Path,
}
