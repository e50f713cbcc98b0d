use crate::models::{AssessmentReport, Phase, PhaseRecord, Summary};

/// Mutable state of one assessment: the target, the phase in flight and the records of the
/// phases run so far, in execution order.
#[derive(Debug, Clone)]
pub struct Session {
    target: String,
    current_phase: Option<Phase>,
    results: Vec<PhaseRecord>,
}

impl Session {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            current_phase: None,
            results: Vec::new(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn current_phase(&self) -> Option<Phase> {
        self.current_phase
    }

    pub(crate) fn set_current_phase(&mut self, phase: Option<Phase>) {
        self.current_phase = phase;
    }

    pub fn results(&self) -> &[PhaseRecord] {
        &self.results
    }

    pub fn get(&self, phase: Phase) -> Option<&PhaseRecord> {
        self.results.iter().find(|r| r.phase == phase)
    }

    /// Stores a phase record. A rerun of a phase replaces its record in place.
    pub fn record(&mut self, record: PhaseRecord) {
        match self.results.iter_mut().find(|r| r.phase == record.phase) {
            Some(existing) => *existing = record,
            None => self.results.push(record),
        }
    }

    pub fn to_report(&self, summary: Option<Summary>) -> AssessmentReport {
        AssessmentReport::new(self.results.clone(), summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_execution_order() {
        let mut session = Session::new("https://example.com");
        session.record(PhaseRecord::new(Phase::VulnerabilityAnalysis));
        session.record(PhaseRecord::new(Phase::Reconnaissance));
        let phases: Vec<_> = session.results().iter().map(|r| r.phase).collect();
        assert_eq!(
            phases,
            vec![Phase::VulnerabilityAnalysis, Phase::Reconnaissance]
        );
    }

    #[test]
    fn test_rerun_replaces_record() {
        let mut session = Session::new("t");
        session.record(PhaseRecord::new(Phase::Reconnaissance));
        let mut rerun = PhaseRecord::new(Phase::Reconnaissance);
        rerun.error = Some("boom".to_string());
        session.record(rerun);
        assert_eq!(session.results().len(), 1);
        assert!(session.get(Phase::Reconnaissance).unwrap().is_error());
    }
}
