use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use coven_e2e::{config, gateway, jail, report};

#[derive(Parser)]
#[command(name = "coven-e2e")]
#[command(version = "0.1.0")]
#[command(about = "End-to-end test runner for the coven agent stack", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the jail server protocol suite
    Jail {
        /// WebSocket URL of the jail server (overrides JAIL_URL)
        #[arg(long)]
        url: Option<String>,

        /// Workspace directory referenced by query frames
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Write the run results JSON to this path
        #[arg(short, long)]
        results: Option<PathBuf>,
    },

    /// Run the gateway suite against every registered agent
    Gateway {
        /// Base URL of the gateway (overrides GATEWAY_URL)
        #[arg(long)]
        url: Option<String>,

        /// Agent that must be registered before scenarios start. Can be specified multiple times.
        #[arg(short = 'e', long = "expect-agent")]
        expect_agent: Vec<String>,

        /// Write the run results JSON to this path instead of the default
        #[arg(short, long)]
        results: Option<PathBuf>,
    },

    /// Generate report from a results file
    Report {
        /// Path to run results JSON
        results: PathBuf,

        /// Output format (json, junit)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Jail {
            url,
            workspace,
            results,
        } => {
            let mut cfg = config::JailConfig::from_env();
            if let Some(url) = url {
                cfg.url = url;
            }
            if let Some(workspace) = workspace {
                cfg.workspace = workspace;
            }

            println!(
                "{} Running jail suite against: {}",
                "▶".green().bold(),
                cfg.url.cyan()
            );

            let report = jail::run(&cfg, results.as_deref()).await?;
            if !report.all_passed() {
                std::process::exit(1);
            }
        }

        Commands::Gateway {
            url,
            expect_agent,
            results,
        } => {
            let mut cfg = config::GatewayConfig::from_env();
            if let Some(url) = url {
                cfg.base_url = url;
            }
            if let Some(results) = results {
                cfg.results_path = results;
            }

            println!(
                "{} Running gateway suite against: {}",
                "▶".green().bold(),
                cfg.base_url.cyan()
            );
            if !expect_agent.is_empty() {
                println!("  Expecting agents: {}", expect_agent.join(", ").cyan());
            }

            let report = gateway::run(&cfg, &expect_agent).await?;
            if !report.all_passed() {
                std::process::exit(1);
            }
        }

        Commands::Report {
            results,
            format,
            output,
        } => {
            println!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                results.display()
            );
            report::generate_report(&results, &format, output.as_deref()).await?;
        }
    }

    Ok(())
}
