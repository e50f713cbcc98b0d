use colored::Colorize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Rows},
};

use crate::models::{AssessmentReport, PhaseRecord, Summary};

pub struct ConsoleReporter;

#[derive(Tabled)]
struct PhaseRow {
    #[tabled(rename = "Phase")]
    phase: String,
    #[tabled(rename = "Tools")]
    tools: String,
    #[tabled(rename = "Findings")]
    findings: usize,
    #[tabled(rename = "Status")]
    status: String,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn print_phases(&self, report: &AssessmentReport) {
        if report.results.is_empty() {
            return;
        }

        let rows: Vec<PhaseRow> = report.results.iter().map(Self::phase_row).collect();

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .to_string();

        println!("\n{}", table);
    }

    pub fn print_summary(&self, summary: &Summary) {
        println!("\n{}", "Summary".bold().underline());
        println!("  Target: {}", summary.target.white().bold());

        let tools: Vec<_> = summary.tools_used.iter().map(|t| t.to_string()).collect();
        println!(
            "  Tools: {}",
            if tools.is_empty() {
                "none".dimmed().to_string()
            } else {
                tools.join(", ")
            }
        );

        println!(
            "  {}: {}",
            "Vulnerabilities".yellow(),
            summary.vulnerabilities_found
        );
        if summary.high_risk_vulnerabilities > 0 {
            println!(
                "  {}: {}",
                "HIGH RISK".red().bold(),
                summary.high_risk_vulnerabilities
            );
        }
        println!("  {}: {}", "Exploits".cyan(), summary.exploits_available);
        println!();
    }

    pub fn print_errors(&self, report: &AssessmentReport) {
        let failed: Vec<_> = report.results.iter().filter(|r| r.is_error()).collect();
        if failed.is_empty() {
            return;
        }

        println!("\n{}", "Errors".bold().underline());
        for record in failed {
            println!(
                "  {} {}",
                format!("[{}]", record.phase).red(),
                record.error.as_deref().unwrap_or_default()
            );
        }
    }

    fn phase_row(record: &PhaseRecord) -> PhaseRow {
        let tools = if record.tools_used.is_empty() {
            "-".to_string()
        } else {
            record
                .tools_used
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };

        PhaseRow {
            phase: record.phase.to_string(),
            tools,
            findings: record.findings.len(),
            status: if record.is_error() {
                "ERROR".red().to_string()
            } else {
                "OK".green().to_string()
            },
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}
