use thiserror::Error;

use crate::gateway::GatewayError;

pub type Result<T> = std::result::Result<T, AssessmentError>;

#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tool call failed: {0}")]
    ToolCall(#[from] GatewayError),

    #[error("Failed to persist results to {path}: {reason}")]
    Persistence { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl AssessmentError {
    pub fn config(msg: impl Into<String>) -> Self {
        AssessmentError::Config(msg.into())
    }

    pub fn persistence(path: impl Into<String>, reason: impl ToString) -> Self {
        AssessmentError::Persistence {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, AssessmentError::Config(_))
    }
}
