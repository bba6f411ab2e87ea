//! Error types for project analysis.
//!
//! Structured errors using thiserror. Any error that renders a single file's
//! symbols unreliable is recovered by dropping that file and continuing;
//! errors that would leave the graph inconsistent abort the operation.

use crate::types::QualifiedId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Root-files list empty, or a referenced file missing. Fatal.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The parser failed on a file. Recoverable: the file is skipped, a
    /// diagnostic is recorded, analysis continues.
    #[error("Parser failed on '{path}': {reason}")]
    CheckerError { path: PathBuf, reason: String },

    /// `insert_file` called while a symbol id already exists. Callers must
    /// remove a file before reinserting it; this is a programming error.
    #[error("Symbol '{id}' already exists in the table")]
    DuplicateSymbol { id: QualifiedId },

    /// An entry-point id has no matching symbol. Non-fatal; recorded in the
    /// result so reports can flag it.
    #[error("Entry point '{id}' does not resolve to any symbol")]
    MissingEntryPoint { id: String },

    /// Strict mode and the parser reported errors. Fatal.
    #[error("Analysis aborted: {count} compiler diagnostic(s) in strict mode")]
    HasDiagnostics { count: usize },

    /// Cooperative cancellation signal tripped.
    #[error("Operation cancelled")]
    Cancelled,
}

impl AnalysisError {
    /// True when the caller can drop the affected file and keep going.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CheckerError { .. } | Self::MissingEntryPoint { .. }
        )
    }

    /// Get recovery suggestions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::InvalidInput { .. } => vec![
                "Pass at least one root file to the analyzer",
                "Check that every root path exists and is readable",
            ],
            Self::CheckerError { .. } => vec![
                "The file was skipped; fix its syntax and re-run",
                "Run with strict mode off to analyze the remaining files",
            ],
            Self::DuplicateSymbol { .. } => vec![
                "Call remove_file before re-inserting a file's symbols",
            ],
            Self::MissingEntryPoint { .. } => vec![
                "Entry points use the form <file_key>:<name>",
                "Check the exported name and file key spelling",
            ],
            Self::HasDiagnostics { .. } => vec![
                "Fix the reported compiler errors, or disable strict mode",
            ],
            Self::Cancelled => vec![],
        }
    }
}

/// Result type alias for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checker_error_is_recoverable() {
        let err = AnalysisError::CheckerError {
            path: PathBuf::from("broken.ts"),
            reason: "syntax error".to_string(),
        };
        assert!(err.is_recoverable());
        assert!(!err.recovery_suggestions().is_empty());
    }

    #[test]
    fn test_duplicate_symbol_is_fatal() {
        let err = AnalysisError::DuplicateSymbol {
            id: QualifiedId::parse("a:f").unwrap(),
        };
        assert!(!err.is_recoverable());
        assert_eq!(err.to_string(), "Symbol 'a:f' already exists in the table");
    }
}
