use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use assessor::cli::Cli;
use assessor::{
    AssessmentPlan, ConsoleReporter, GatewayConfig, HtmlExporter, JsonExporter, McpHttpGateway,
    Orchestrator,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let gateway_config = GatewayConfig::load(&cli.config)
        .with_context(|| format!("Failed to load gateway config {}", cli.config))?;
    let gateway = McpHttpGateway::new(&gateway_config)?;

    let mut orchestrator =
        Orchestrator::new(gateway).with_tool_timeout(cli.tool_timeout.map(Duration::from_secs));

    let plan = AssessmentPlan::load(&cli.plan)
        .with_context(|| "Failed to initialize with assessment plan")?;
    orchestrator
        .initialize(plan)
        .with_context(|| "Failed to initialize with assessment plan")?;

    let report = match cli.phase {
        Some(phase) => orchestrator.run_phase(phase.into()).await?,
        None => orchestrator.run_full().await?,
    };

    let reporter = ConsoleReporter::new();
    reporter.print_phases(&report);
    reporter.print_errors(&report);
    if let Some(summary) = &report.summary {
        reporter.print_summary(summary);
    }

    // Save failures are reported but do not fail the assessment.
    match JsonExporter::export(&report, &cli.output) {
        Ok(()) => info!(path = %cli.output, "results saved"),
        Err(e) => error!(error = %e, "error saving results"),
    }

    if let Some(html) = &cli.html {
        match HtmlExporter::export(&report, html) {
            Ok(()) => info!(path = %html, "HTML report written"),
            Err(e) => warn!(error = %e, "error writing HTML report"),
        }
    }

    Ok(())
}
