//! Tallybot CLI: entry point.
//!
//! # Commands
//!
//! - `tallybot agent [-m MESSAGE]`: chat (single-shot or REPL)
//! - `tallybot demo`: run the sample questions in one conversation
//! - `tallybot tools`: list the built-in tools
//! - `tallybot status`: show configuration and provider status
//! - `tallybot init`: write the default config file

mod helpers;
mod init;
mod repl;
mod status;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use tallybot_agent::tools::builtin_registry;
use tallybot_agent::AgentLoop;
use tallybot_core::config::{load_config, Config};
use tallybot_core::types::{LlmResponse, Message, ToolDefinition};
use tallybot_core::utils::truncate_string;
use tallybot_providers::{create_provider, LlmProvider, LlmRequestConfig, ProviderError};

/// Questions asked by `tallybot demo`.
const DEMO_QUESTIONS: &[&str] = &[
    "What's 17% of 420?",
    "Convert 100°F to Celsius.",
    "How many seconds are there in 3.5 days?",
    "What is the capital of France?",
];

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Tallybot: a tool-using LLM assistant for quick calculations and conversions
#[derive(Parser)]
#[command(name = "tallybot", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the agent (single-shot or interactive REPL)
    Agent {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Ask the sample questions in one conversation
    Demo {
        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// List the tools the agent can call
    Tools,

    /// Show configuration and provider status
    Status,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing config file
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Agent { message, logs } => {
            init_logging(logs);
            run_agent(message).await
        }
        Commands::Demo { logs } => {
            init_logging(logs);
            run_demo().await
        }
        Commands::Tools => {
            init_logging(false);
            list_tools()
        }
        Commands::Status => status::run(),
        Commands::Init { force } => init::run(force),
    }
}

// ─────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────

async fn run_agent(message: Option<String>) -> Result<()> {
    let config = load_config(None);
    let mut agent = build_agent_loop(&config)?;

    match message {
        Some(msg) => {
            info!(model = agent.model(), "processing single message");
            match agent.handle_user_message(&msg).await {
                Ok(answer) => helpers::print_response(&answer),
                Err(e) => anyhow::bail!(e.user_message()),
            }
        }
        None => repl::run(&mut agent).await?,
    }

    Ok(())
}

async fn run_demo() -> Result<()> {
    let config = load_config(None);
    let mut agent = build_agent_loop(&config)?;

    for question in DEMO_QUESTIONS {
        println!("{} {question}", "You:".bold());
        match agent.handle_user_message(question).await {
            Ok(answer) => helpers::print_response(&answer),
            Err(e) => helpers::print_error(&e.user_message()),
        }
    }
    Ok(())
}

fn list_tools() -> Result<()> {
    let config = load_config(None);
    let provider = Arc::new(Unconfigured);
    let tools = builtin_registry(provider, &config.tools).context("failed to build tool registry")?;

    println!();
    for def in tools.describe_all() {
        let function = &def.function;
        let required: Vec<String> = function.parameters["required"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|v| v.as_str().map(String::from))
            .collect();
        println!(
            "  {:<24} {}",
            function.name.cyan().bold(),
            truncate_string(&function.description, 70)
        );
        println!("  {:<24} {}", "", format!("requires: {}", required.join(", ")).dimmed());
    }
    println!();
    Ok(())
}

/// Build an `AgentLoop` from the loaded configuration.
///
/// Fails before any LLM call when no API key can be found.
pub fn build_agent_loop(config: &Config) -> Result<AgentLoop> {
    let provider = create_provider(&config.agent.model, &config.provider)
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to create LLM provider")?;
    info!(provider = provider.display_name(), model = %config.agent.model, "provider ready");

    AgentLoop::from_config(Arc::new(provider), config).context("failed to register tools")
}

/// Stand-in provider for commands that only inspect tool declarations.
struct Unconfigured;

#[async_trait]
impl LlmProvider for Unconfigured {
    async fn chat(
        &self,
        _messages: &[Message],
        _tools: Option<&[ToolDefinition]>,
        _model: &str,
        _config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError> {
        Err(ProviderError::Network("no provider configured".into()))
    }

    fn default_model(&self) -> &str {
        ""
    }

    fn display_name(&self) -> &str {
        "unconfigured"
    }
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("tallybot=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
