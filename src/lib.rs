pub mod analyzer;
pub mod cli;
pub mod error;
pub mod gateway;
pub mod models;
pub mod reporter;
pub mod scanner;

pub use error::{AssessmentError, Result};
pub use gateway::{GatewayConfig, GatewayError, McpHttpGateway, ToolGateway};
pub use models::{
    AssessmentPlan, AssessmentReport, Finding, Phase, PhaseRecord, Summary, Tool,
};
pub use reporter::{ConsoleReporter, HtmlExporter, JsonExporter};
pub use scanner::{Orchestrator, OrchestratorState, PhaseRunner, Session};
