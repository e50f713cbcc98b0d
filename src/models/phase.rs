use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Reconnaissance,
    VulnerabilityScanning,
    VulnerabilityAnalysis,
    Exploitation,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Reconnaissance,
        Phase::VulnerabilityScanning,
        Phase::VulnerabilityAnalysis,
        Phase::Exploitation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Reconnaissance => "reconnaissance",
            Phase::VulnerabilityScanning => "vulnerability_scanning",
            Phase::VulnerabilityAnalysis => "vulnerability_analysis",
            Phase::Exploitation => "exploitation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "reconnaissance" => Some(Phase::Reconnaissance),
            "vulnerability_scanning" => Some(Phase::VulnerabilityScanning),
            "vulnerability_analysis" => Some(Phase::VulnerabilityAnalysis),
            "exploitation" => Some(Phase::Exploitation),
            _ => None,
        }
    }

    /// The phase whose findings parameterize this one.
    pub fn predecessor(&self) -> Option<Phase> {
        match self {
            Phase::Reconnaissance => None,
            Phase::VulnerabilityScanning => Some(Phase::Reconnaissance),
            Phase::VulnerabilityAnalysis => Some(Phase::VulnerabilityScanning),
            Phase::Exploitation => Some(Phase::VulnerabilityAnalysis),
        }
    }

    pub fn tools(&self) -> &'static [Tool] {
        match self {
            Phase::Reconnaissance => &[Tool::Nmap, Tool::Masscan],
            Phase::VulnerabilityScanning => &[Tool::Nikto, Tool::Zap],
            Phase::VulnerabilityAnalysis => &[Tool::Cve, Tool::ExploitDb],
            Phase::Exploitation => &[Tool::Metasploit],
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Nmap,
    Masscan,
    Nikto,
    Zap,
    Cve,
    ExploitDb,
    Metasploit,
}

impl Tool {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::Nmap => "nmap",
            Tool::Masscan => "masscan",
            Tool::Nikto => "nikto",
            Tool::Zap => "zap",
            Tool::Cve => "cve",
            Tool::ExploitDb => "exploitdb",
            Tool::Metasploit => "metasploit",
        }
    }

    pub fn server_id(&self) -> &'static str {
        match self {
            Tool::Nmap => "nmap-mcp",
            Tool::Masscan => "masscan-mcp",
            Tool::Nikto => "nikto-mcp",
            Tool::Zap => "zap-mcp",
            Tool::Cve => "cve-mcp",
            Tool::ExploitDb => "exploitdb-mcp",
            Tool::Metasploit => "metasploit-mcp",
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Tool::Nmap | Tool::Masscan | Tool::Nikto | Tool::Zap => "scan",
            Tool::Cve | Tool::ExploitDb => "search",
            Tool::Metasploit => "exploit",
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Tool::Nmap | Tool::Masscan => Phase::Reconnaissance,
            Tool::Nikto | Tool::Zap => Phase::VulnerabilityScanning,
            Tool::Cve | Tool::ExploitDb => Phase::VulnerabilityAnalysis,
            Tool::Metasploit => Phase::Exploitation,
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
