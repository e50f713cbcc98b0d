mod phase;
mod plan;
mod result;
mod summary;

pub use phase::{Phase, Tool};
pub use plan::{AssessmentPlan, ExploitationPolicy, TargetSpec};
pub(crate) use plan::is_json;
pub use result::{Finding, PhaseRecord};
pub use summary::{AssessmentReport, Summary};
