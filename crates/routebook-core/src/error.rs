//! Error types shared by the server and the client.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single field-level violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Path to the offending field, e.g. `["from", "lat"]`. Empty for the body itself.
    pub path: Vec<String>,
    pub message: String,
}

impl Issue {
    pub fn new(path: &[&str], message: impl Into<String>) -> Self {
        Self {
            path: path.iter().map(|s| s.to_string()).collect(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(body): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path.join("."), self.message)
        }
    }
}

/// Route input rejected with every violation found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid route input: {}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

fn join_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failures of the local history store.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("history could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("history store lock poisoned")]
    Poisoned,
}
