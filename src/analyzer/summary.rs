use chrono::Utc;
use std::collections::BTreeSet;

use super::payload;
use crate::models::{Phase, PhaseRecord, Summary, Tool};

pub fn generate_summary(target: &str, results: &[PhaseRecord]) -> Summary {
    let mut summary = Summary {
        target: target.to_string(),
        assessment_date: Utc::now(),
        phases_completed: results.iter().map(|r| r.phase).collect(),
        tools_used: results
            .iter()
            .flat_map(|r| r.tools_used.iter().copied())
            .collect::<BTreeSet<_>>(),
        vulnerabilities_found: 0,
        high_risk_vulnerabilities: 0,
        exploits_available: 0,
    };

    for record in results {
        match record.phase {
            Phase::VulnerabilityScanning => {
                for finding in &record.findings {
                    match finding.tool {
                        Tool::Nikto => {
                            summary.vulnerabilities_found +=
                                payload::vulnerabilities(&finding.result).len();
                        }
                        Tool::Zap => {
                            for alert in payload::alerts(&finding.result) {
                                summary.vulnerabilities_found += 1;
                                if alert.is_high_risk() {
                                    summary.high_risk_vulnerabilities += 1;
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            Phase::VulnerabilityAnalysis => {
                summary.exploits_available += record
                    .findings_from(Tool::ExploitDb)
                    .map(|f| payload::exploits(&f.result).len())
                    .sum::<usize>();
            }
            _ => {}
        }
    }

    summary
}
