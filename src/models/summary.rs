use chrono::{DateTime, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

use super::{Phase, PhaseRecord, Tool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub target: String,
    pub assessment_date: DateTime<Utc>,
    pub phases_completed: Vec<Phase>,
    pub tools_used: BTreeSet<Tool>,
    pub vulnerabilities_found: usize,
    pub high_risk_vulnerabilities: usize,
    pub exploits_available: usize,
}

/// Phase records in execution order plus the summary of a full run.
///
/// Serialized as a single object keyed by phase name, with the summary under `"summary"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssessmentReport {
    pub results: Vec<PhaseRecord>,
    pub summary: Option<Summary>,
}

impl AssessmentReport {
    pub fn new(results: Vec<PhaseRecord>, summary: Option<Summary>) -> Self {
        Self { results, summary }
    }

    pub fn get(&self, phase: Phase) -> Option<&PhaseRecord> {
        self.results.iter().find(|r| r.phase == phase)
    }
}

const SUMMARY_KEY: &str = "summary";

impl Serialize for AssessmentReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.results.len() + usize::from(self.summary.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        for record in &self.results {
            map.serialize_entry(record.phase.as_str(), record)?;
        }
        if let Some(summary) = &self.summary {
            map.serialize_entry(SUMMARY_KEY, summary)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AssessmentReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ReportVisitor)
    }
}

struct ReportVisitor;

impl<'de> Visitor<'de> for ReportVisitor {
    type Value = AssessmentReport;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a map of phase names to phase records")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut report = AssessmentReport::default();

        while let Some(key) = access.next_key::<String>()? {
            if key == SUMMARY_KEY {
                if report.summary.is_some() {
                    return Err(de::Error::duplicate_field(SUMMARY_KEY));
                }
                report.summary = Some(access.next_value()?);
                continue;
            }

            let phase = Phase::parse(&key)
                .ok_or_else(|| de::Error::custom(format!("unknown phase '{}'", key)))?;
            if report.get(phase).is_some() {
                return Err(de::Error::duplicate_field(phase.as_str()));
            }
            let record: PhaseRecord = access.next_value()?;
            if record.phase != phase {
                return Err(de::Error::custom(format!(
                    "record under '{}' is for phase '{}'",
                    key, record.phase
                )));
            }
            report.results.push(record);
        }

        Ok(report)
    }
}
