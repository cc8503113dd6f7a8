mod console;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use console::{ConsoleObserver, render_report};
use genai_client::{ClientConfig, GeminiClient};
use orchestrator::{
    Orchestrator, OrchestratorSettings, ProgressObserver, RunError, RunReport, SilentObserver,
};
use pipeline::GatePolicy;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const DEFAULT_QUERY: &str = "I want dark 90s sci-fi movies like Blade Runner with neon aesthetics.";

const EXIT_APPROVED: u8 = 0;
/// Exit status when the critic turns the draft down.
const EXIT_REJECTED: u8 = 2;
const EXIT_FAILURE: u8 = 1;

/// NaiWatches - multi-agent movie and series recommendation grid
#[derive(Parser, Debug)]
#[command(name = "naiwatches")]
#[command(about = "Profile, research, curate and critique recommendations with a generative model", long_about = None)]
struct Cli {
    /// Free-text description of what you want to watch
    #[arg(default_value = DEFAULT_QUERY)]
    query: String,

    /// Model identifier (overrides NAIWATCHES_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// API key (overrides GEMINI_API_KEY / API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Service root URL (overrides NAIWATCHES_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Per-stage timeout in seconds (overrides NAIWATCHES_TIMEOUT_SECS)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    /// Approval gate: "substring" or "strict"
    #[arg(long, default_value_t = GatePolicy::Substring)]
    gate: GatePolicy,

    /// Ask the curator for JSON recommendations and print them as cards
    #[arg(long)]
    structured: bool,

    /// Ground the researcher in live web search
    #[arg(long)]
    grounded: bool,

    /// Print the full run state as JSON after the report
    #[arg(long)]
    dump_state: bool,

    /// Only print the final report
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing; progress goes through the console observer, so
    // logs stay at warn unless RUST_LOG asks for more.
    let default_level = if cli.quiet { "error" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run(&cli).await;
    if let Err(err) = &result {
        eprintln!("{}", failure_report(err));
    }
    ExitCode::from(exit_status(&result))
}

/// 0 when approved, 2 when rejected, 1 when the run never reached the gate.
fn exit_status(result: &Result<RunReport>) -> u8 {
    match result {
        Ok(report) if report.outcome.is_approved() => EXIT_APPROVED,
        Ok(_) => EXIT_REJECTED,
        Err(_) => EXIT_FAILURE,
    }
}

/// One-line failure report with the whole context chain.
fn failure_report(err: &anyhow::Error) -> String {
    format!("{} {:#}", "✗ Grid failure:".red().bold(), err)
}

/// Resolve configuration, run the grid once and print the report.
async fn run(cli: &Cli) -> Result<RunReport> {
    let config = client_config(cli).context("Failed to resolve client configuration")?;
    let stage_timeout = config.timeout;
    info!(?config, "Client configured");

    let client = GeminiClient::new(config).context("Failed to build generation client")?;

    let settings = OrchestratorSettings {
        stage_timeout,
        gate: cli.gate,
        structured_draft: cli.structured,
        grounded_research: cli.grounded,
    };
    let observer: Arc<dyn ProgressObserver> = if cli.quiet {
        Arc::new(SilentObserver)
    } else {
        Arc::new(ConsoleObserver)
    };
    let orchestrator = Orchestrator::new(Arc::new(client), settings).with_observer(observer);

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let report = match orchestrator.run_with_cancel(&cli.query, cancel).await {
        Ok(report) => report,
        Err(err) => {
            if cli.dump_state {
                dump_partial_state(&err)?;
            }
            return Err(err).context("Recommendation run did not complete");
        }
    };

    println!("{}", render_report(&report));
    if cli.dump_state {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize run report")?
        );
    }

    Ok(report)
}

fn client_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env(cli.api_key.clone())?;

    if let Some(model) = &cli.model {
        config = config.with_model(model.as_str());
    }
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.as_str());
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    Ok(config)
}

/// Cancel the run on Ctrl-C; in-flight stages stop at their next await.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling run");
            cancel.cancel();
        }
    });
}

fn dump_partial_state(err: &RunError) -> Result<()> {
    if let Some(state) = err.partial_state() {
        eprintln!(
            "{}",
            serde_json::to_string_pretty(state).context("Failed to serialize partial state")?
        );
    }
    Ok(())
}
