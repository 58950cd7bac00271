//! Binary entry point for graphrecall.
//!
//! This binary provides a CLI over the graphrecall retrievers.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow unnecessary_wraps for consistent command function signatures
#![allow(clippy::unnecessary_wraps)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context as _, anyhow};
use clap::{Parser, Subcommand};
use graphrecall::config::GraphRecallConfig;
use graphrecall::llm::OpenAiClient;
use graphrecall::observability;
use graphrecall::rendering::PromptStore;
use graphrecall::retrieval::{
    CompletionGenerator, CypherSearchRetriever, LlmCompletionGenerator, Retriever,
};
use graphrecall::storage::ConfiguredGraphProvider;
use graphrecall::{Context, SearchService, SearchType};
use secrecy::ExposeSecret;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

/// graphrecall - capability-checked retrieval over knowledge graphs.
#[derive(Parser)]
#[command(name = "graphrecall")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "GRAPHRECALL_CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run a Cypher query and print the raw context.
    Context {
        /// The Cypher query.
        query: String,
    },

    /// Produce a completion for a Cypher query.
    Completion {
        /// The Cypher query.
        query: String,

        /// Pre-computed context as JSON; skips the backend entirely.
        #[arg(long)]
        context: Option<String>,

        /// Synthesize the completion with the configured LLM.
        #[arg(long)]
        generate: bool,
    },

    /// Dispatch a query through the search service.
    Search {
        /// The query.
        query: String,

        /// Search type.
        #[arg(short, long, default_value = "cypher")]
        search_type: String,

        /// Synthesize the completion with the configured LLM.
        #[arg(long)]
        generate: bool,
    },

    /// Show the effective configuration.
    Config,
}

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is not an error.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_settings(&config.logging, cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
async fn run_command(command: Commands, config: GraphRecallConfig) -> anyhow::Result<()> {
    match command {
        Commands::Context { query } => cmd_context(&config, &query).await,
        Commands::Completion {
            query,
            context,
            generate,
        } => cmd_completion(&config, &query, context, generate).await,
        Commands::Search {
            query,
            search_type,
            generate,
        } => cmd_search(&config, &query, &search_type, generate).await,
        Commands::Config => cmd_config(&config),
    }
}

/// Loads configuration from an explicit path or the default location.
fn load_config(path: Option<&Path>) -> anyhow::Result<GraphRecallConfig> {
    match path {
        Some(path) => GraphRecallConfig::load_from_file(path)
            .with_context(|| format!("reading {}", path.display())),
        None => Ok(GraphRecallConfig::load_default()),
    }
}

/// Builds the LLM-backed completion generator.
fn completion_generator(config: &GraphRecallConfig) -> Arc<dyn CompletionGenerator> {
    let llm = Arc::new(OpenAiClient::from_config(&config.llm));
    Arc::new(LlmCompletionGenerator::new(
        llm,
        PromptStore::new(config.retrieval.prompts_dir.clone()),
    ))
}

/// Builds the Cypher retriever described by the configuration.
fn cypher_retriever(config: &GraphRecallConfig, generate: bool) -> CypherSearchRetriever {
    let provider = Arc::new(ConfiguredGraphProvider::new(config.graph.clone()));
    let retriever = CypherSearchRetriever::new(provider).with_prompt_paths(
        config.retrieval.user_prompt_path.clone(),
        config.retrieval.system_prompt_path.clone(),
    );
    if generate {
        retriever.with_completion_generator(completion_generator(config))
    } else {
        retriever
    }
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Context command.
async fn cmd_context(config: &GraphRecallConfig, query: &str) -> anyhow::Result<()> {
    let retriever = cypher_retriever(config, false);
    let context = retriever.get_context(query).await?;
    print_json(&context)
}

/// Completion command.
async fn cmd_completion(
    config: &GraphRecallConfig,
    query: &str,
    context: Option<String>,
    generate: bool,
) -> anyhow::Result<()> {
    let context: Option<Context> = context
        .map(|raw| serde_json::from_str(&raw).context("--context must be valid JSON"))
        .transpose()?;

    let retriever = cypher_retriever(config, generate);
    let completion = retriever.get_completion(query, context).await?;
    print_json(&completion)
}

/// Search command.
async fn cmd_search(
    config: &GraphRecallConfig,
    query: &str,
    search_type: &str,
    generate: bool,
) -> anyhow::Result<()> {
    let search_type = SearchType::parse(search_type)
        .ok_or_else(|| anyhow!("unknown search type: {search_type}"))?;

    let generator = generate.then(|| completion_generator(config));
    let service = SearchService::from_config(config, generator);
    let completion = service.search(search_type, query).await?;
    print_json(&completion)
}

/// Config command.
fn cmd_config(config: &GraphRecallConfig) -> anyhow::Result<()> {
    let neo4j = &config.graph.neo4j;
    println!("Current Configuration");
    println!("=====================");
    println!();
    println!("Graph:");
    println!("  Provider: {}", config.graph.provider);
    println!("  Neo4j URL: {}", neo4j.url);
    println!("  Neo4j Database: {}", neo4j.database);
    println!(
        "  Neo4j Username: {}",
        neo4j.username.as_deref().unwrap_or("(none)")
    );
    println!("  Neo4j Password: {}", redacted(neo4j.password.as_ref()));
    println!();
    println!("Retrieval:");
    println!("  Prompts Directory: {}", config.retrieval.prompts_dir.display());
    println!("  User Prompt: {}", config.retrieval.user_prompt_path);
    println!("  System Prompt: {}", config.retrieval.system_prompt_path);
    println!();
    println!("LLM Configuration:");
    println!(
        "  Model: {}",
        config.llm.model.as_deref().unwrap_or("(default)")
    );
    println!(
        "  Base URL: {}",
        config.llm.base_url.as_deref().unwrap_or("(default)")
    );
    println!("  API Key: {}", redacted(config.llm.api_key.as_ref()));
    Ok(())
}

fn redacted(secret: Option<&secrecy::SecretString>) -> &'static str {
    match secret {
        Some(s) if !s.expose_secret().is_empty() => "(set)",
        _ => "(not set)",
    }
}
