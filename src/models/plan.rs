use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AssessmentError, Result};

/// Assessment plan as written by the operator. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssessmentPlan {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target: TargetSpec,
    #[serde(default)]
    pub exploitation: ExploitationPolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetSpec {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExploitationPolicy {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ExploitationPolicy {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

impl AssessmentPlan {
    pub fn for_target(url: impl Into<String>) -> Self {
        Self {
            target: TargetSpec { url: url.into() },
            ..Default::default()
        }
    }

    /// Loads a plan from YAML, or JSON when the file has a `.json` extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AssessmentError::config(format!("cannot read plan {}: {}", path.display(), e))
        })?;
        Self::parse(&content, is_json(path))
            .map_err(|e| AssessmentError::config(format!("invalid plan {}: {}", path.display(), e)))
    }

    pub fn parse(content: &str, json: bool) -> Result<Self> {
        if json {
            Ok(serde_json::from_str(content)?)
        } else {
            // An empty YAML document deserializes as unit, not as an empty map.
            if content.trim().is_empty() {
                return Ok(Self::default());
            }
            Ok(serde_yaml::from_str(content)?)
        }
    }

    pub fn target_url(&self) -> &str {
        &self.target.url
    }
}

pub(crate) fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
