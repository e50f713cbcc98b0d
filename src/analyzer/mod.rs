pub mod correlation;
pub mod payload;
mod summary;

pub use correlation::{
    MAX_EXPLOIT_ATTEMPTS, MAX_EXPLOIT_SEARCHES, ServiceCandidate, exploit_candidates,
    exploit_search_targets, exploitation_targets, service_candidates, vulnerability_candidates,
};
pub use payload::Risk;
pub use summary::generate_summary;
