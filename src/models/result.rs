use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Phase, Tool};

/// Output of one tool call, tagged with the tool and the correlation key it was issued for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub tool: Tool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vulnerability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exploit: Option<String>,
    pub result: serde_json::Value,
}

impl Finding {
    pub fn new(tool: Tool, result: serde_json::Value) -> Self {
        Self {
            tool,
            service: None,
            version: None,
            vulnerability: None,
            exploit: None,
            result,
        }
    }

    pub fn with_service(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.service = Some(name.into());
        self.version = Some(version.into());
        self
    }

    pub fn with_vulnerability(mut self, name: impl Into<String>) -> Self {
        self.vulnerability = Some(name.into());
        self
    }

    pub fn with_exploit(mut self, exploit: impl Into<String>) -> Self {
        self.exploit = Some(exploit.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub phase: Phase,
    pub timestamp: DateTime<Utc>,
    pub tools_used: Vec<Tool>,
    pub findings: Vec<Finding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PhaseRecord {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            timestamp: Utc::now(),
            tools_used: Vec::new(),
            findings: Vec::new(),
            error: None,
        }
    }

    pub fn findings_from(&self, tool: Tool) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.tool == tool)
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_finding_omits_absent_keys() {
        let finding = Finding::new(Tool::Nmap, json!({"services": []}));
        let value = serde_json::to_value(&finding).unwrap();
        assert_eq!(value["tool"], "nmap");
        assert!(value.get("service").is_none());
        assert!(value.get("exploit").is_none());
    }

    #[test]
    fn test_finding_keeps_correlation_keys() {
        let finding = Finding::new(Tool::Cve, json!({})).with_service("http", "2.4.1");
        let value = serde_json::to_value(&finding).unwrap();
        assert_eq!(value["service"], "http");
        assert_eq!(value["version"], "2.4.1");
    }

    #[test]
    fn test_findings_from_filters_by_tool() {
        let mut record = PhaseRecord::new(Phase::VulnerabilityScanning);
        record.findings.push(Finding::new(Tool::Nikto, json!({})));
        record.findings.push(Finding::new(Tool::Zap, json!({})));
        record.findings.push(Finding::new(Tool::Zap, json!({})));
        assert_eq!(record.findings_from(Tool::Zap).count(), 2);
        assert!(!record.is_error());
    }
}
