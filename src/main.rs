//! Discord Fact-Checker Bot - main entry point
//!
//! Runs the Discord bot, or performs one-shot checks from the terminal.

use std::net::SocketAddr;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use factcheck_bot::config::Config;
use factcheck_bot::factcheck::FactChecker;
use factcheck_bot::integrations::GeminiClient;
use factcheck_bot::{bot, metrics};

#[derive(Parser)]
#[command(name = "factcheck_bot")]
#[command(about = "Discord Fact-Checker Bot powered by Gemini", long_about = None)]
#[command(version)]
struct Cli {
    /// Address to expose Prometheus metrics (e.g., 0.0.0.0:9898)
    #[arg(long, env = "METRICS_ADDR")]
    metrics_addr: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Discord bot (default)
    Run,

    /// Fact-check a claim from the terminal
    Check {
        /// The claim to analyze
        #[arg(required = true)]
        claim: Vec<String>,
    },

    /// Debunk or validate a claim from the terminal
    Expose {
        /// The claim to analyze
        #[arg(required = true)]
        claim: Vec<String>,
    },

    /// Print the validated configuration summary
    Config,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Run => "run",
            Commands::Check { .. } => "check",
            Commands::Expose { .. } => "expose",
            Commands::Config => "config",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for local development
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("factcheck_bot=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load();

    let metrics_addr = cli
        .metrics_addr
        .clone()
        .or_else(|| config.features.metrics.then(|| "0.0.0.0:9898".to_string()));
    if let Some(addr) = metrics_addr.as_deref() {
        match addr.parse::<SocketAddr>() {
            Ok(socket) => metrics::spawn_metrics_server(socket),
            Err(err) => warn!(%addr, "Invalid metrics address: {}", err),
        }
    }

    let command = cli.command.unwrap_or(Commands::Run);
    let command_name = command.name();
    metrics::record_check_start(command_name);
    let start = Instant::now();

    let result = execute_command(command, config).await;

    metrics::record_check_result(command_name, start.elapsed(), result.is_ok());

    result
}

async fn execute_command(command: Commands, config: Config) -> anyhow::Result<()> {
    match command {
        Commands::Run => {
            bot::run(config).await?;
        }
        Commands::Check { claim } => {
            let claim = claim.join(" ");
            config.ensure_valid()?;
            let checker = one_shot_checker(&config)?;

            let result = checker.check_claim(&claim).await?;

            println!("Claim:       {}", claim);
            println!("Assessment:  {}", result.accuracy.label());
            println!("Confidence:  {}%", result.confidence);
            if !result.explanation.is_empty() {
                println!("Explanation: {}", result.explanation);
            }
            if !result.sources.is_empty() {
                println!("Sources:");
                for source in &result.sources {
                    println!("  - {}", source);
                }
            }
        }
        Commands::Expose { claim } => {
            let claim = claim.join(" ");
            config.ensure_valid()?;
            let checker = one_shot_checker(&config)?;

            let result = checker.expose_claim(&claim).await?;

            println!("Claim:      {}", claim);
            println!("Result:     {}", result.expose_type.label());
            println!("Confidence: {}%", result.confidence);
            if !result.analysis.is_empty() {
                println!("Analysis:   {}", result.analysis);
            }
            if !result.evidence.is_empty() {
                println!("Evidence:");
                for item in &result.evidence {
                    println!("  - {}", item);
                }
            }
        }
        Commands::Config => {
            let errors = config.validate();
            println!("{}", serde_yaml::to_string(&config.summary())?);
            if errors.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration errors found:");
                for error in &errors {
                    println!("  - {}", error);
                }
                anyhow::bail!("invalid configuration");
            }
        }
    }

    Ok(())
}

fn one_shot_checker(config: &Config) -> anyhow::Result<FactChecker> {
    let client = GeminiClient::from_env(&config.gemini)?;
    Ok(FactChecker::new(client, config))
}
