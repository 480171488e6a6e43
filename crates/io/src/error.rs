use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures reading inputs or writing outputs.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot open {}: {reason}", path.display())]
    Open { path: PathBuf, reason: String },

    #[error("{tool} not installed")]
    ToolMissing { tool: &'static str },

    #[error("cannot extract {}: {reason}", path.display())]
    Extraction { path: PathBuf, reason: String },

    #[error("cannot write {}: {reason}", path.display())]
    Output { path: PathBuf, reason: String },
}

impl IoError {
    pub fn open(path: &Path, reason: impl ToString) -> Self {
        Self::Open { path: path.to_path_buf(), reason: reason.to_string() }
    }

    pub fn extraction(path: &Path, reason: impl ToString) -> Self {
        Self::Extraction { path: path.to_path_buf(), reason: reason.to_string() }
    }

    pub fn output(path: &Path, reason: impl ToString) -> Self {
        Self::Output { path: path.to_path_buf(), reason: reason.to_string() }
    }

    /// Install hint shown under the error, when one applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ToolMissing { tool: "pdftotext" } => {
                Some("Install with: apt install poppler-utils / brew install poppler")
            }
            _ => None,
        }
    }
}
