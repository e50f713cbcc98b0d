//! Typed views over raw tool payloads.
//!
//! Every accessor fails closed: a missing or ill-typed field yields an empty list or `None`,
//! never an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntry {
    pub name: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VulnerabilityEntry {
    pub name: Option<String>,
    pub plugin_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEntry {
    pub name: Option<String>,
    pub plugin_id: Option<String>,
    pub risk: Option<Risk>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploitEntry {
    pub id: Option<String>,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Risk {
    Informational,
    Low,
    Medium,
    High,
    Critical,
}

impl Risk {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "informational" | "info" => Some(Risk::Informational),
            "low" => Some(Risk::Low),
            "medium" => Some(Risk::Medium),
            "high" => Some(Risk::High),
            "critical" => Some(Risk::Critical),
            _ => None,
        }
    }

    /// ZAP numeric risk codes. ZAP has no code above High.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0" => Some(Risk::Informational),
            "1" => Some(Risk::Low),
            "2" => Some(Risk::Medium),
            "3" => Some(Risk::High),
            _ => None,
        }
    }

    pub fn is_high(&self) -> bool {
        matches!(self, Risk::High | Risk::Critical)
    }
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Risk::Informational => "Informational",
            Risk::Low => "Low",
            Risk::Medium => "Medium",
            Risk::High => "High",
            Risk::Critical => "Critical",
        };
        write!(f, "{}", s)
    }
}

impl ServiceEntry {
    pub fn pair(&self) -> Option<(&str, &str)> {
        Some((self.name.as_deref()?, self.version.as_deref()?))
    }
}

impl VulnerabilityEntry {
    pub fn identifier(&self) -> Option<&str> {
        self.name.as_deref().or(self.plugin_id.as_deref())
    }
}

impl AlertEntry {
    pub fn is_high_risk(&self) -> bool {
        self.risk.is_some_and(|r| r.is_high())
    }

    pub fn identifier(&self) -> Option<&str> {
        self.name.as_deref().or(self.plugin_id.as_deref())
    }
}

impl ExploitEntry {
    /// The path when present, otherwise the bare id.
    pub fn descriptor(&self) -> Option<&str> {
        self.path.as_deref().or(self.id.as_deref())
    }
}

pub fn services(result: &Value) -> Vec<ServiceEntry> {
    entries(result, "services")
        .map(|s| ServiceEntry {
            name: text_field(s, "name"),
            version: text_field(s, "version"),
        })
        .collect()
}

pub fn vulnerabilities(result: &Value) -> Vec<VulnerabilityEntry> {
    entries(result, "vulnerabilities")
        .map(|v| VulnerabilityEntry {
            name: text_field(v, "name"),
            plugin_id: text_field(v, "pluginid"),
        })
        .collect()
}

pub fn alerts(result: &Value) -> Vec<AlertEntry> {
    entries(result, "alerts")
        .map(|a| AlertEntry {
            name: text_field(a, "name"),
            plugin_id: text_field(a, "pluginid"),
            risk: text_field(a, "risk")
                .and_then(|r| Risk::parse(&r))
                .or_else(|| text_field(a, "riskcode").and_then(|c| Risk::from_code(&c))),
        })
        .collect()
}

pub fn exploits(result: &Value) -> Vec<ExploitEntry> {
    entries(result, "results")
        .map(|e| ExploitEntry {
            id: text_field(e, "id"),
            path: text_field(e, "path"),
        })
        .collect()
}

fn entries<'a>(result: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    result
        .get(key)
        .and_then(Value::as_array)
        .map(|arr| arr.iter())
        .into_iter()
        .flatten()
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_services_tolerate_missing_fields() {
        let result = json!({"services": [
            {"name": "http", "version": "2.4.49"},
            {"name": "ssh"},
            "garbage",
            {"version": "1.0"}
        ]});
        let services = services(&result);
        assert_eq!(services.len(), 4);
        assert_eq!(services[0].pair(), Some(("http", "2.4.49")));
        assert_eq!(services[1].pair(), None);
        assert_eq!(services[2].pair(), None);
        assert_eq!(services[3].pair(), None);
    }

    #[test]
    fn test_missing_array_is_empty() {
        assert!(services(&json!({})).is_empty());
        assert!(alerts(&json!({"alerts": "not a list"})).is_empty());
        assert!(exploits(&Value::Null).is_empty());
    }

    #[test]
    fn test_alert_risk_parsing() {
        let result = json!({"alerts": [
            {"name": "SQL Injection", "risk": "High"},
            {"name": "XSS", "risk": "critical"},
            {"pluginid": 10020, "risk": "Low"},
            {"name": "Legacy", "riskcode": "3"}
        ]});
        let alerts = alerts(&result);
        assert!(alerts[0].is_high_risk());
        assert!(alerts[1].is_high_risk());
        assert!(!alerts[2].is_high_risk());
        assert_eq!(alerts[2].identifier(), Some("10020"));
        assert_eq!(alerts[3].risk, Some(Risk::High));
    }

    #[test]
    fn test_exploit_descriptor_prefers_path() {
        let result = json!({"results": [
            {"id": 50383, "path": "exploits/multiple/webapps/50383.sh"},
            {"id": "EDB-1"},
            {"path": ""}
        ]});
        let exploits = exploits(&result);
        assert_eq!(
            exploits[0].descriptor(),
            Some("exploits/multiple/webapps/50383.sh")
        );
        assert_eq!(exploits[1].descriptor(), Some("EDB-1"));
        assert_eq!(exploits[2].descriptor(), None);
    }

    #[test]
    fn test_vulnerability_identifier_falls_back_to_plugin_id() {
        let result = json!({"vulnerabilities": [
            {"name": "Server leaks inodes", "pluginid": "999990"},
            {"pluginid": "999966"},
            {"pluginid": 7}
        ]});
        let vulns = vulnerabilities(&result);
        assert_eq!(vulns[0].identifier(), Some("Server leaks inodes"));
        assert_eq!(vulns[1].identifier(), Some("999966"));
        assert_eq!(vulns[2].identifier(), Some("7"));
    }
}
