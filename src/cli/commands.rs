//! CLI command implementations.
//!
//! Contains the business logic for each CLI command. Commands return
//! their output as a string; the binary entry point handles printing.

use std::sync::Arc;

use crate::agent::client::create_provider;
use crate::agent::config::AgentConfig;
use crate::agent::message::user_message;
use crate::agent::orchestrator::{Orchestrator, RunOverrides};
use crate::agent::prompt::PromptSet;
use crate::cli::output::{OutputFormat, format_run_result};
use crate::cli::parser::{Cli, Commands, PromptCommands};
use crate::error::{CommandError, Result};

/// Parameters for the ask command.
#[derive(Debug, Clone, Default)]
pub struct AskParams<'a> {
    /// The question to research.
    pub question: &'a str,
    /// Number of search queries to generate.
    pub queries: Option<usize>,
    /// Model for answer finalization.
    pub reasoning_model: Option<&'a str>,
    /// Model for query generation and web research.
    pub query_model: Option<&'a str>,
    /// Maximum concurrent research calls.
    pub concurrency: Option<usize>,
    /// Directory containing prompt template overrides.
    pub prompt_dir: Option<&'a std::path::Path>,
    /// API key override.
    pub api_key: Option<&'a str>,
    /// Verbose output.
    pub verbose: bool,
}

/// Executes the parsed CLI command.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Ask {
            question,
            queries,
            reasoning_model,
            query_model,
            concurrency,
            prompt_dir,
            api_key,
        } => {
            let params = AskParams {
                question,
                queries: *queries,
                reasoning_model: reasoning_model.as_deref(),
                query_model: query_model.as_deref(),
                concurrency: *concurrency,
                prompt_dir: prompt_dir.as_deref(),
                api_key: api_key.as_deref(),
                verbose: cli.verbose,
            };
            cmd_ask(&params, format)
        }
        Commands::Prompts(PromptCommands::Init { dir }) => cmd_prompts_init(dir.as_deref()),
        Commands::Prompts(PromptCommands::Path) => cmd_prompts_path(),
    }
}

/// Runs the research workflow for one question.
fn cmd_ask(params: &AskParams<'_>, format: OutputFormat) -> Result<String> {
    // Build agent configuration from env + CLI overrides
    let mut builder = AgentConfig::builder().from_env();
    if let Some(key) = params.api_key {
        builder = builder.api_key(key);
    }
    if let Some(model) = params.query_model {
        builder = builder.query_generator_model(model);
    }
    if let Some(n) = params.concurrency {
        builder = builder.max_concurrency(n);
    }
    if let Some(dir) = params.prompt_dir {
        builder = builder.prompt_dir(dir);
    }

    let config = builder
        .build()
        .map_err(|e| CommandError::ExecutionFailed(format!("Agent configuration error: {e}")))?;

    let provider = create_provider(&config)
        .map_err(|e| CommandError::ExecutionFailed(format!("Provider creation failed: {e}")))?;

    let orchestrator = Orchestrator::new(Arc::from(provider), config);

    let overrides = RunOverrides {
        initial_search_query_count: params.queries,
        reasoning_model: params.reasoning_model.map(String::from),
    };

    // Create tokio runtime as sync/async bridge
    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}"))
    })?;

    let messages = vec![user_message(params.question)];
    let result = rt.block_on(async { orchestrator.run(messages, Some(overrides)).await })?;

    format_run_result(&result, format, params.verbose)
}

/// Scaffolds the default prompt templates for editing.
fn cmd_prompts_init(dir: Option<&std::path::Path>) -> Result<String> {
    let target = dir
        .map(std::path::PathBuf::from)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| {
            CommandError::ExecutionFailed("Cannot determine prompt directory".to_string())
        })?;

    let written = PromptSet::write_defaults(&target)?;
    if written.is_empty() {
        Ok(format!(
            "All prompt templates already exist in {}",
            target.display()
        ))
    } else {
        let names: Vec<String> = written
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        Ok(format!(
            "Wrote {} template(s) to {}: {}",
            written.len(),
            target.display(),
            names.join(", ")
        ))
    }
}

/// Prints the default prompt template directory.
fn cmd_prompts_path() -> Result<String> {
    PromptSet::default_dir()
        .map(|p| p.display().to_string())
        .ok_or_else(|| {
            CommandError::ExecutionFailed("Cannot determine prompt directory".to_string())
        })
}
