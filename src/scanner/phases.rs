use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::Session;
use super::target::extract_host;
use crate::analyzer::{exploit_search_targets, exploitation_targets, service_candidates};
use crate::error::Result;
use crate::gateway::{GatewayError, ToolGateway};
use crate::models::{Finding, Phase, PhaseRecord, Tool};

const NMAP_OPTIONS: &str = "-sS -sV -O -A -T4";
const FULL_PORT_RANGE: &str = "1-65535";
const MASSCAN_RATE: &str = "1000";
const NIKTO_OPTIONS: &str = "-Tuning 9";
const ZAP_SCAN_TYPE: &str = "active";

/// Runs a single phase against the gateway, reading the target and prior results from the
/// session.
pub struct PhaseRunner<'a, G: ToolGateway + ?Sized> {
    gateway: &'a G,
    session: &'a Session,
    tool_timeout: Option<Duration>,
    exploitation_enabled: bool,
}

impl<'a, G: ToolGateway + ?Sized> PhaseRunner<'a, G> {
    pub fn new(gateway: &'a G, session: &'a Session) -> Self {
        Self {
            gateway,
            session,
            tool_timeout: None,
            exploitation_enabled: true,
        }
    }

    pub fn with_tool_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn with_exploitation(mut self, enabled: bool) -> Self {
        self.exploitation_enabled = enabled;
        self
    }

    /// Runs the phase to completion. A failed tool call stops the phase; the findings
    /// collected so far are kept and the failure is recorded in `error`.
    pub async fn run(&self, phase: Phase) -> PhaseRecord {
        info!(%phase, url = self.session.target(), "starting phase");
        debug!(%phase, tools = ?phase.tools(), "candidate tools");
        if let Some(prev) = phase.predecessor() {
            if self.session.get(prev).is_none() {
                debug!(%phase, prerequisite = %prev, "no prior results to correlate");
            }
        }
        let mut record = PhaseRecord::new(phase);

        let outcome = match phase {
            Phase::Reconnaissance => self.reconnaissance(&mut record).await,
            Phase::VulnerabilityScanning => self.vulnerability_scanning(&mut record).await,
            Phase::VulnerabilityAnalysis => self.vulnerability_analysis(&mut record).await,
            Phase::Exploitation => self.exploitation(&mut record).await,
        };

        match outcome {
            Ok(()) => info!(
                %phase,
                findings = record.findings.len(),
                "phase completed"
            ),
            Err(e) => {
                warn!(%phase, error = %e, "phase aborted");
                record.error = Some(e.to_string());
            }
        }

        record
    }

    async fn reconnaissance(&self, record: &mut PhaseRecord) -> Result<()> {
        let host = extract_host(self.session.target());

        if self.available(Tool::Nmap) {
            let params = json!({
                "target": host,
                "ports": FULL_PORT_RANGE,
                "options": NMAP_OPTIONS,
            });
            let result = self.call(record, Tool::Nmap, params).await?;
            record.findings.push(Finding::new(Tool::Nmap, result));
        }

        if self.available(Tool::Masscan) {
            let params = json!({
                "target": host,
                "ports": FULL_PORT_RANGE,
                "rate": MASSCAN_RATE,
            });
            let result = self.call(record, Tool::Masscan, params).await?;
            record.findings.push(Finding::new(Tool::Masscan, result));
        }

        Ok(())
    }

    async fn vulnerability_scanning(&self, record: &mut PhaseRecord) -> Result<()> {
        let target = self.session.target();

        if self.available(Tool::Nikto) {
            let params = json!({ "target": target, "options": NIKTO_OPTIONS });
            let result = self.call(record, Tool::Nikto, params).await?;
            record.findings.push(Finding::new(Tool::Nikto, result));
        }

        if self.available(Tool::Zap) {
            let params = json!({ "target": target, "scan_type": ZAP_SCAN_TYPE });
            let result = self.call(record, Tool::Zap, params).await?;
            record.findings.push(Finding::new(Tool::Zap, result));
        }

        Ok(())
    }

    async fn vulnerability_analysis(&self, record: &mut PhaseRecord) -> Result<()> {
        if self.available(Tool::Cve) {
            record.tools_used.push(Tool::Cve);
            let services = service_candidates(self.session.get(Phase::Reconnaissance));
            debug!(count = services.len(), "services to look up");

            for service in services {
                let params = json!({ "service": service.name, "version": service.version });
                let result = self.invoke(Tool::Cve, params).await?;
                record.findings.push(
                    Finding::new(Tool::Cve, result).with_service(service.name, service.version),
                );
            }
        }

        if self.available(Tool::ExploitDb) {
            record.tools_used.push(Tool::ExploitDb);
            let vulnerabilities =
                exploit_search_targets(self.session.get(Phase::VulnerabilityScanning));
            debug!(count = vulnerabilities.len(), "vulnerabilities to search");

            for name in vulnerabilities {
                let params = json!({ "search_term": name });
                let result = self.invoke(Tool::ExploitDb, params).await?;
                record
                    .findings
                    .push(Finding::new(Tool::ExploitDb, result).with_vulnerability(name));
            }
        }

        Ok(())
    }

    async fn exploitation(&self, record: &mut PhaseRecord) -> Result<()> {
        if !self.exploitation_enabled {
            warn!("exploitation disabled by plan, no exploits will be executed");
            return Ok(());
        }

        if self.available(Tool::Metasploit) {
            record.tools_used.push(Tool::Metasploit);
            let exploits = exploitation_targets(self.session.get(Phase::VulnerabilityAnalysis));
            debug!(count = exploits.len(), "exploits to attempt");

            for exploit in exploits {
                let params = json!({
                    "exploit": exploit,
                    "target": self.session.target(),
                    "options": {},
                });
                let result = self.invoke(Tool::Metasploit, params).await?;
                record
                    .findings
                    .push(Finding::new(Tool::Metasploit, result).with_exploit(exploit));
            }
        }

        Ok(())
    }

    /// Whether the tool's server is connected. Unavailable tools are skipped, not failed.
    fn available(&self, tool: Tool) -> bool {
        let server = tool.server_id();
        if self.gateway.is_connected(server) {
            return true;
        }
        if self.gateway.is_configured(server) {
            warn!(%tool, server, "server configured but not connected, skipping");
        } else {
            debug!(%tool, server, "server not configured, skipping");
        }
        false
    }

    async fn call(
        &self,
        record: &mut PhaseRecord,
        tool: Tool,
        params: Value,
    ) -> std::result::Result<Value, GatewayError> {
        record.tools_used.push(tool);
        self.invoke(tool, params).await
    }

    async fn invoke(&self, tool: Tool, params: Value) -> std::result::Result<Value, GatewayError> {
        let server = tool.server_id();
        info!(%tool, "running");
        debug!(%tool, %params, "tool parameters");

        let call = self.gateway.call_tool(server, tool.action(), params);
        match self.tool_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                GatewayError::Timeout {
                    server: server.to_string(),
                    after: limit,
                }
            })?,
            None => call.await,
        }
    }
}
