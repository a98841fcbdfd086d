pub mod linter;
pub mod reachability;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub use linter::{validate_tree, SCORE_BALANCE_TOLERANCE};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl Display for ValidationIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub tree_id: Option<String>,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn issues(&self) -> impl Iterator<Item = (Severity, &ValidationIssue)> {
        self.errors
            .iter()
            .map(|issue| (Severity::Error, issue))
            .chain(self.warnings.iter().map(|issue| (Severity::Warning, issue)))
    }

    pub fn summary(&self) -> String {
        let name = self.tree_id.as_deref().unwrap_or("<unnamed>");
        if self.is_valid() {
            format!("{name}: valid ({} warnings)", self.warnings.len())
        } else {
            format!(
                "{name}: {} errors, {} warnings",
                self.errors.len(),
                self.warnings.len()
            )
        }
    }
}
