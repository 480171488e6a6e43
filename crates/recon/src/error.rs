use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Run-scoped failures. Any of these aborts the run before outputs exist.
#[derive(Debug, Error)]
pub enum ReconError {
    /// The canonical roster is absent, unreadable, or has no usable sheet.
    #[error("canonical roster unavailable ({path}): {reason}")]
    MissingSource { path: String, reason: String },
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty roster path, clashing output names, ...).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
}

/// Row-scoped failures. Recorded, counted, and never interrupt a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowError {
    /// Name text could not be turned into a `(last, first)` key.
    #[error("invalid name {raw:?}")]
    InvalidName { raw: String },
    /// Fewer columns than the row shape requires.
    #[error("malformed row: expected at least {expected} columns, found {found}")]
    MalformedRow { expected: usize, found: usize },
}

/// Which input a row issue came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueScope {
    Pdf,
    Docx,
    Sheet(String),
}

impl fmt::Display for IssueScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Docx => write!(f, "docx"),
            Self::Sheet(name) => write!(f, "sheet '{name}'"),
        }
    }
}

/// A skipped row, kept for the aggregate data-quality report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    pub scope: IssueScope,
    /// 0-based index of the row within its input.
    pub row_index: usize,
    pub error: RowError,
}

impl RowIssue {
    pub fn new(scope: IssueScope, row_index: usize, error: RowError) -> Self {
        Self { scope, row_index, error }
    }

    pub fn is_invalid_name(&self) -> bool {
        matches!(self.error, RowError::InvalidName { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self.error, RowError::MalformedRow { .. })
    }
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} row {}: {}", self.scope, self.row_index + 1, self.error)
    }
}
