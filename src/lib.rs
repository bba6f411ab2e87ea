pub mod analyzer;
pub mod config;
pub mod error;
pub mod extractor;
pub mod graph;
pub mod logging;
pub mod parsing;
pub mod report;
pub mod shake;
pub mod symbol;
pub mod types;

pub mod cli;

pub use analyzer::{Diagnostic, ProjectAnalysisResult, ProjectAnalyzer, ProjectStatistics};
pub use error::{AnalysisError, AnalysisResult};
pub use extractor::SymbolExtractor;
pub use graph::ProjectSymbolTable;
pub use report::Reporter;
pub use shake::{TreeShaker, TreeShakingResult};
pub use symbol::{FileSymbols, Import, ReExport, Symbol};
pub use types::*;
