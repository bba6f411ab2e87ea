//! Project analysis driver.
//!
//! Runs extraction over every root source file, merges the per-file records
//! into the symbol table, and collects diagnostics and statistics. Distinct
//! files may be extracted on worker threads; table insertion is always
//! serialized, so a single analysis run owns the table exclusively.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::extractor::SymbolExtractor;
use crate::graph::ProjectSymbolTable;
use crate::parsing::typescript::{TypeScriptParser, syntax_errors};
use crate::parsing::{file_key_of, is_declaration_file};
use crate::symbol::FileSymbols;
use crate::types::{CancellationToken, QualifiedId, SourceLocation};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;

/// One already-loaded root file. The core performs no file I/O.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// A compiler diagnostic surfaced to the caller. Errors only.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub message: String,
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectStatistics {
    pub total_files: usize,
    pub total_symbols: usize,
    pub exported_symbols: usize,
    pub internal_symbols: usize,
    pub total_imports: usize,
    pub total_edges: usize,
    pub symbols_per_file: IndexMap<Box<str>, usize>,
}

#[derive(Debug)]
pub struct ProjectAnalysisResult {
    pub symbol_table: ProjectSymbolTable,
    pub root_files: Vec<PathBuf>,
    pub options: AnalysisConfig,
    pub diagnostics: Vec<Diagnostic>,
    pub statistics: ProjectStatistics,
}

pub struct ProjectAnalyzer {
    options: AnalysisConfig,
    token: CancellationToken,
}

impl ProjectAnalyzer {
    pub fn new(options: AnalysisConfig) -> Self {
        Self {
            options,
            token: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Analyze the whole root set and assemble the project graph.
    pub fn analyze(&self, sources: &[SourceFile]) -> AnalysisResult<ProjectAnalysisResult> {
        if sources.is_empty() {
            return Err(AnalysisError::InvalidInput {
                reason: "root-files list is empty".to_string(),
            });
        }

        let eligible: Vec<&SourceFile> = sources
            .iter()
            .filter(|s| !is_declaration_file(&s.path))
            .collect();
        for source in &eligible {
            let key = file_key_of(&source.path);
            if QualifiedId::new(&key, "_").is_none() {
                return Err(AnalysisError::InvalidInput {
                    reason: format!("file key '{key}' is empty or contains ':'"),
                });
            }
        }

        let extracted = if self.options.parallel && eligible.len() > 1 {
            eligible
                .par_iter()
                .map(|source| self.extract_source(source))
                .collect::<Vec<_>>()
        } else {
            eligible
                .iter()
                .map(|source| {
                    if self.token.is_cancelled() {
                        return Err(AnalysisError::Cancelled);
                    }
                    self.extract_source(source)
                })
                .collect()
        };

        let mut files: Vec<FileSymbols> = Vec::with_capacity(extracted.len());
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        for (source, outcome) in eligible.iter().zip(extracted) {
            match outcome {
                Ok((file, mut file_diagnostics)) => {
                    diagnostics.append(&mut file_diagnostics);
                    files.push(file);
                }
                Err(err @ AnalysisError::CheckerError { .. }) => {
                    // Recoverable: drop this file, keep the rest.
                    tracing::warn!("[analyzer] skipping '{}': {err}", source.path.display());
                    diagnostics.push(Diagnostic {
                        path: source.path.clone(),
                        message: err.to_string(),
                        location: None,
                    });
                }
                Err(err) => return Err(err),
            }
        }

        if self.options.strict && !diagnostics.is_empty() {
            return Err(AnalysisError::HasDiagnostics {
                count: diagnostics.len(),
            });
        }

        let mut table = ProjectSymbolTable::new();
        for file in files {
            table.insert_file(file)?;
        }
        table.populate_dependents();

        let statistics = Self::statistics_of(&table);
        tracing::info!(
            "[analyzer] {} files, {} symbols, {} edges",
            statistics.total_files,
            statistics.total_symbols,
            statistics.total_edges
        );

        Ok(ProjectAnalysisResult {
            symbol_table: table,
            root_files: sources.iter().map(|s| s.path.clone()).collect(),
            options: self.options.clone(),
            diagnostics,
            statistics,
        })
    }

    /// Atomic per-file refresh: extract first, then swap the file's symbols
    /// in the table. An extraction error leaves the table untouched.
    pub fn reanalyze_file(
        &self,
        table: &mut ProjectSymbolTable,
        source: &SourceFile,
    ) -> AnalysisResult<Vec<Diagnostic>> {
        let (file, diagnostics) = self.extract_source(source)?;
        if self.options.strict && !diagnostics.is_empty() {
            return Err(AnalysisError::HasDiagnostics {
                count: diagnostics.len(),
            });
        }
        table.remove_file(&file.file_key);
        table.insert_file(file)?;
        table.populate_dependents();
        Ok(diagnostics)
    }

    fn extract_source(
        &self,
        source: &SourceFile,
    ) -> AnalysisResult<(FileSymbols, Vec<Diagnostic>)> {
        if self.token.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }
        let mut parser = TypeScriptParser::new().map_err(|reason| AnalysisError::CheckerError {
            path: source.path.clone(),
            reason,
        })?;
        let tree = parser.parse(&source.text, &source.path)?;

        let diagnostics = syntax_errors(&tree, 25)
            .into_iter()
            .map(|location| Diagnostic {
                path: source.path.clone(),
                message: "syntax error".to_string(),
                location: Some(location),
            })
            .collect();

        let extractor = SymbolExtractor::new(&source.text, &source.path, &self.options);
        let file = extractor.extract(&tree);
        tracing::debug!(
            "[analyzer] extracted {} symbols from '{}'",
            file.symbol_count(),
            file.file_key
        );
        Ok((file, diagnostics))
    }

    fn statistics_of(table: &ProjectSymbolTable) -> ProjectStatistics {
        let mut stats = ProjectStatistics::default();
        for file in table.all_files() {
            stats.total_files += 1;
            stats.exported_symbols += file.exports.len();
            stats.internal_symbols += file.internal.len();
            stats.total_imports += file.imports.len();
            stats
                .symbols_per_file
                .insert(file.file_key.clone(), file.symbol_count());
        }
        stats.total_symbols = table.symbol_count();
        stats.total_edges = table.edge_count();
        stats
    }
}
