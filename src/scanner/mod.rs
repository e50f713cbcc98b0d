mod engine;
mod phases;
mod session;
pub mod target;

pub use engine::{Orchestrator, OrchestratorState};
pub use phases::PhaseRunner;
pub use session::Session;
pub use target::extract_host;
