use std::time::Duration;
use tracing::{error, info};

use super::{PhaseRunner, Session};
use crate::analyzer::generate_summary;
use crate::error::{AssessmentError, Result};
use crate::gateway::ToolGateway;
use crate::models::{AssessmentPlan, AssessmentReport, Phase, Summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Uninitialized,
    Initialized,
    Running(Phase),
    Completed,
}

/// Sequences assessment phases over a tool gateway and owns the session they feed.
pub struct Orchestrator<G: ToolGateway> {
    gateway: G,
    state: OrchestratorState,
    plan: Option<AssessmentPlan>,
    session: Option<Session>,
    summary: Option<Summary>,
    tool_timeout: Option<Duration>,
}

impl<G: ToolGateway> Orchestrator<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            state: OrchestratorState::Uninitialized,
            plan: None,
            session: None,
            summary: None,
            tool_timeout: None,
        }
    }

    pub fn with_tool_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tool_timeout = timeout;
        self
    }

    /// Binds the orchestrator to a plan. The plan must name a non-empty target.
    pub fn initialize(&mut self, plan: AssessmentPlan) -> Result<()> {
        let target = plan.target_url();
        if target.trim().is_empty() {
            error!("no target found in assessment plan");
            return Err(AssessmentError::config("assessment plan has no target.url"));
        }

        info!(url = target, "initialized with assessment plan");
        self.session = Some(Session::new(target));
        self.plan = Some(plan);
        self.summary = None;
        self.state = OrchestratorState::Initialized;
        Ok(())
    }

    /// Runs every phase in order. A phase that fails is recorded and the next one still
    /// runs on whatever inputs are available.
    pub async fn run_full(&mut self) -> Result<AssessmentReport> {
        info!("starting full security assessment");
        self.execute(&Phase::ALL).await?;

        let session = self.session()?;
        let summary = generate_summary(session.target(), session.results());
        info!(
            vulnerabilities = summary.vulnerabilities_found,
            high_risk = summary.high_risk_vulnerabilities,
            exploits = summary.exploits_available,
            "full security assessment completed"
        );
        self.summary = Some(summary);
        Ok(self.report())
    }

    pub async fn run_phase(&mut self, phase: Phase) -> Result<AssessmentReport> {
        self.execute(&[phase]).await?;
        Ok(self.report())
    }

    async fn execute(&mut self, phases: &[Phase]) -> Result<()> {
        self.session()?;

        if let Err(e) = self.gateway.connect_all().await {
            self.gateway.close_all().await;
            return Err(e.into());
        }
        info!(servers = ?self.gateway.connected(), "tool gateway connected");

        let exploitation_enabled = self
            .plan
            .as_ref()
            .is_none_or(|p| p.exploitation.enabled);

        for &phase in phases {
            self.state = OrchestratorState::Running(phase);
            let Some(session) = self.session.as_mut() else {
                break;
            };
            session.set_current_phase(Some(phase));

            let record = PhaseRunner::new(&self.gateway, session)
                .with_tool_timeout(self.tool_timeout)
                .with_exploitation(exploitation_enabled)
                .run(phase)
                .await;

            if let Some(session) = self.session.as_mut() {
                session.record(record);
                session.set_current_phase(None);
            }
        }

        self.gateway.close_all().await;
        self.state = OrchestratorState::Completed;
        Ok(())
    }

    fn session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| AssessmentError::config("orchestrator is not initialized"))
    }

    pub fn report(&self) -> AssessmentReport {
        self.session
            .as_ref()
            .map(|s| s.to_report(self.summary.clone()))
            .unwrap_or_default()
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayError;
    use crate::gateway::testing::ScriptedGateway;
    use crate::models::Tool;
    use serde_json::json;

    fn orchestrator(gateway: ScriptedGateway, target: &str) -> Orchestrator<ScriptedGateway> {
        let mut orch = Orchestrator::new(gateway);
        orch.initialize(AssessmentPlan::for_target(target)).unwrap();
        orch
    }

    #[test]
    fn test_initialize_keeps_target_verbatim() {
        let orch = orchestrator(ScriptedGateway::new(), "HTTPS://Example.com/App?x=1");
        assert_eq!(orch.state(), OrchestratorState::Initialized);
        assert_eq!(
            orch.current_session().unwrap().target(),
            "HTTPS://Example.com/App?x=1"
        );
    }

    #[test]
    fn test_initialize_rejects_missing_target() {
        let mut orch = Orchestrator::new(ScriptedGateway::new());
        let err = orch.initialize(AssessmentPlan::default()).unwrap_err();
        assert!(err.is_config());
        assert_eq!(orch.state(), OrchestratorState::Uninitialized);
    }

    #[tokio::test]
    async fn test_no_phase_runs_uninitialized() {
        let mut orch = Orchestrator::new(ScriptedGateway::new().with_server("nmap-mcp", json!({})));
        assert!(orch.run_full().await.unwrap_err().is_config());
        assert!(orch.run_phase(Phase::Reconnaissance).await.is_err());
        assert!(orch.gateway().calls_to("nmap-mcp").is_empty());
        assert_eq!(orch.gateway().closed, 0);
    }

    #[tokio::test]
    async fn test_full_run_continues_after_failure() {
        let gateway = ScriptedGateway::new()
            .with_failure(
                "nmap-mcp",
                GatewayError::Transport {
                    server: "nmap-mcp".to_string(),
                    message: "reset by peer".to_string(),
                },
            )
            .with_server(
                "zap-mcp",
                json!({"alerts": [
                    {"name": "RCE", "risk": "Critical"},
                    {"name": "Banner", "risk": "Low"}
                ]}),
            );
        let mut orch = orchestrator(gateway, "https://example.com/app");

        let report = orch.run_full().await.unwrap();

        let phases: Vec<_> = report.results.iter().map(|r| r.phase).collect();
        assert_eq!(phases, Phase::ALL.to_vec());

        let recon = report.get(Phase::Reconnaissance).unwrap();
        assert!(recon.is_error());
        assert_eq!(recon.findings_from(Tool::Nmap).count(), 0);

        let scanning = report.get(Phase::VulnerabilityScanning).unwrap();
        assert_eq!(scanning.findings.len(), 1);

        let summary = report.summary.unwrap();
        assert_eq!(summary.vulnerabilities_found, 2);
        assert_eq!(summary.high_risk_vulnerabilities, 1);
        assert_eq!(summary.phases_completed, Phase::ALL.to_vec());

        assert_eq!(orch.state(), OrchestratorState::Completed);
        assert_eq!(orch.gateway().closed, 1);
        assert!(!orch.gateway().connected);
        assert_eq!(orch.current_session().unwrap().current_phase(), None);
    }

    #[tokio::test]
    async fn test_findings_thread_between_phases() {
        let gateway = ScriptedGateway::new()
            .with_server(
                "nmap-mcp",
                json!({"services": [{"name": "http", "version": "2.4.49"}]}),
            )
            .with_server("nikto-mcp", json!({"vulnerabilities": [{"name": "CVE-2021-41773"}]}))
            .with_server("cve-mcp", json!({"cves": ["CVE-2021-41773"]}))
            .with_server(
                "exploitdb-mcp",
                json!({"results": [{"id": 50383, "path": "exploits/50383.sh"}]}),
            )
            .with_server("metasploit-mcp", json!({"status": "completed"}));
        let mut orch = orchestrator(gateway, "https://example.com");

        let report = orch.run_full().await.unwrap();

        assert_eq!(
            orch.gateway().calls_to("exploitdb-mcp"),
            vec![json!({"search_term": "CVE-2021-41773"})]
        );
        assert_eq!(
            orch.gateway().calls_to("metasploit-mcp")[0]["exploit"],
            "exploits/50383.sh"
        );
        let summary = report.summary.unwrap();
        assert_eq!(summary.vulnerabilities_found, 1);
        assert_eq!(summary.exploits_available, 1);
        assert_eq!(summary.tools_used.len(), 5);
    }

    #[tokio::test]
    async fn test_single_phase_has_no_summary() {
        let gateway = ScriptedGateway::new().with_server("exploitdb-mcp", json!({}));
        let mut orch = orchestrator(gateway, "https://example.com");

        let report = orch.run_phase(Phase::VulnerabilityAnalysis).await.unwrap();

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].phase, Phase::VulnerabilityAnalysis);
        assert!(report.summary.is_none());
        assert!(orch.gateway().calls_to("exploitdb-mcp").is_empty());
        assert_eq!(orch.gateway().closed, 1);
    }

    #[tokio::test]
    async fn test_gateway_closed_when_connect_fails() {
        let gateway = ScriptedGateway::new()
            .with_server("nmap-mcp", json!({}))
            .with_connect_failure(GatewayError::Transport {
                server: "gateway".to_string(),
                message: "handshake failed".to_string(),
            });
        let mut orch = orchestrator(gateway, "https://example.com");

        let err = orch.run_full().await.unwrap_err();

        assert!(matches!(err, AssessmentError::ToolCall(_)));
        assert_eq!(orch.gateway().closed, 1);
        assert!(orch.gateway().calls_to("nmap-mcp").is_empty());
        assert!(orch.summary().is_none());
        assert!(orch.current_session().unwrap().results().is_empty());
    }

    #[tokio::test]
    async fn test_tool_timeout_recorded_and_run_continues() {
        let gateway = ScriptedGateway::new()
            .with_server("nmap-mcp", json!({"services": []}))
            .with_delay(Duration::from_secs(5));
        let mut orch = orchestrator(gateway, "https://example.com")
            .with_tool_timeout(Some(Duration::from_millis(20)));

        let report = orch.run_full().await.unwrap();

        let recon = report.get(Phase::Reconnaissance).unwrap();
        assert!(recon.error.as_deref().unwrap().contains("timed out"));
        assert!(recon.findings.is_empty());
        assert_eq!(report.results.len(), Phase::ALL.len());
        assert_eq!(orch.gateway().closed, 1);
    }

    #[tokio::test]
    async fn test_plan_can_disable_exploitation() {
        let gateway = ScriptedGateway::new().with_server("metasploit-mcp", json!({}));
        let mut plan = AssessmentPlan::for_target("https://example.com");
        plan.exploitation.enabled = false;
        let mut orch = Orchestrator::new(gateway);
        orch.initialize(plan).unwrap();

        let report = orch.run_phase(Phase::Exploitation).await.unwrap();
        assert!(report.results[0].tools_used.is_empty());
    }
}
