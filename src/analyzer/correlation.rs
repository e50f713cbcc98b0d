//! Extraction of correlation keys from a prior phase's findings.
//!
//! All functions are pure, accept an absent phase and keep the order in which items appear
//! in the source findings. Capping is applied after filtering so that the first usable
//! candidates are the ones kept.

use std::collections::HashSet;

use super::payload;
use crate::models::{PhaseRecord, Tool};

pub const MAX_EXPLOIT_SEARCHES: usize = 10;
pub const MAX_EXPLOIT_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCandidate {
    pub name: String,
    pub version: String,
}

pub fn service_candidates(recon: Option<&PhaseRecord>) -> Vec<ServiceCandidate> {
    let Some(record) = recon else {
        return Vec::new();
    };

    record
        .findings_from(Tool::Nmap)
        .flat_map(|f| payload::services(&f.result))
        .filter_map(|s| {
            s.pair().map(|(name, version)| ServiceCandidate {
                name: name.to_string(),
                version: version.to_string(),
            })
        })
        .collect()
}

/// Vulnerability identifiers from nikto findings and High/Critical ZAP alerts, deduplicated,
/// in discovery order.
pub fn vulnerability_candidates(scanning: Option<&PhaseRecord>) -> Vec<String> {
    let Some(record) = scanning else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for finding in &record.findings {
        let names: Vec<String> = match finding.tool {
            Tool::Nikto => payload::vulnerabilities(&finding.result)
                .iter()
                .filter_map(|v| v.identifier().map(str::to_string))
                .collect(),
            Tool::Zap => payload::alerts(&finding.result)
                .into_iter()
                .filter(|a| a.is_high_risk())
                .filter_map(|a| a.identifier().map(str::to_string))
                .collect(),
            _ => continue,
        };

        for name in names {
            if seen.insert(name.clone()) {
                candidates.push(name);
            }
        }
    }

    candidates
}

pub fn exploit_candidates(analysis: Option<&PhaseRecord>) -> Vec<String> {
    let Some(record) = analysis else {
        return Vec::new();
    };

    record
        .findings_from(Tool::ExploitDb)
        .flat_map(|f| payload::exploits(&f.result))
        .filter_map(|e| e.descriptor().map(str::to_string))
        .collect()
}

pub fn exploit_search_targets(scanning: Option<&PhaseRecord>) -> Vec<String> {
    let mut candidates = vulnerability_candidates(scanning);
    candidates.truncate(MAX_EXPLOIT_SEARCHES);
    candidates
}

pub fn exploitation_targets(analysis: Option<&PhaseRecord>) -> Vec<String> {
    let mut candidates = exploit_candidates(analysis);
    candidates.truncate(MAX_EXPLOIT_ATTEMPTS);
    candidates
}
