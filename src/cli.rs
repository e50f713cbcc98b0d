use clap::{Parser, ValueEnum};

use crate::models::Phase;

#[derive(Parser, Debug)]
#[command(name = "assessor")]
#[command(version, about = "Phased security assessment over MCP tool servers")]
pub struct Cli {
    /// Path to the assessment plan (YAML or JSON)
    pub plan: String,

    #[arg(short, long, default_value = "assessment_results.json")]
    pub output: String,

    /// Run only this phase
    #[arg(short, long, value_enum)]
    pub phase: Option<PhaseArg>,

    /// Tool gateway configuration
    #[arg(short, long, default_value = "mcp-config.yaml")]
    pub config: String,

    /// Also render an HTML report to this path
    #[arg(long)]
    pub html: Option<String>,

    /// Per-tool-call timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub tool_timeout: Option<u64>,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum PhaseArg {
    Reconnaissance,
    VulnerabilityScanning,
    VulnerabilityAnalysis,
    Exploitation,
}

impl From<PhaseArg> for Phase {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::Reconnaissance => Phase::Reconnaissance,
            PhaseArg::VulnerabilityScanning => Phase::VulnerabilityScanning,
            PhaseArg::VulnerabilityAnalysis => Phase::VulnerabilityAnalysis,
            PhaseArg::Exploitation => Phase::Exploitation,
        }
    }
}
