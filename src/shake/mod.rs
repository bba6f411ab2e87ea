//! Tree shaking.
//!
//! Given an analyzed project and a set of entry points, the shaker computes
//! the forward closure (the live set), its complement (symbols safe to
//! remove), and per-file groupings.

use crate::analyzer::ProjectAnalysisResult;
use crate::types::QualifiedId;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, Serialize)]
pub struct ShakeStatistics {
    pub total_symbols: usize,
    pub included_count: usize,
    pub unused_count: usize,
    /// Percentage of symbols that are safe to remove, rounded to two
    /// decimal places. 0 when the project has no symbols.
    pub removal_rate: f64,
}

#[derive(Debug)]
pub struct TreeShakingResult<'a> {
    pub analysis: &'a ProjectAnalysisResult,
    /// Entry points exactly as given by the caller.
    pub entry_points: Vec<String>,
    /// Entries that do not resolve to any symbol. Retained in the closure
    /// and reported; never fatal.
    pub missing_entry_points: Vec<String>,
    pub included: BTreeSet<QualifiedId>,
    pub unused: BTreeSet<QualifiedId>,
    pub included_by_file: BTreeMap<Box<str>, Vec<QualifiedId>>,
    pub unused_by_file: BTreeMap<Box<str>, Vec<QualifiedId>>,
    pub statistics: ShakeStatistics,
}

pub struct TreeShaker<'a> {
    analysis: &'a ProjectAnalysisResult,
}

impl<'a> TreeShaker<'a> {
    pub fn new(analysis: &'a ProjectAnalysisResult) -> Self {
        Self { analysis }
    }

    /// Compute the live set from entry points formatted `<file_key>:<name>`.
    pub fn shake(&self, entry_points: &[String]) -> TreeShakingResult<'a> {
        let table = &self.analysis.symbol_table;

        let mut roots: Vec<QualifiedId> = Vec::new();
        let mut missing: Vec<String> = Vec::new();
        for entry in entry_points {
            match QualifiedId::parse(entry) {
                Some(id) => {
                    if !table.contains(&id) {
                        missing.push(entry.clone());
                    }
                    roots.push(id);
                }
                None => missing.push(entry.clone()),
            }
        }

        let included = table.forward_closure(&roots);
        let unused = table.find_unused(&included);

        let statistics = Self::statistics(table.symbol_count(), included.len(), unused.len());
        tracing::info!(
            "[shake] {} entries -> {} included, {} unused ({}%)",
            entry_points.len(),
            statistics.included_count,
            statistics.unused_count,
            statistics.removal_rate
        );

        TreeShakingResult {
            analysis: self.analysis,
            entry_points: entry_points.to_vec(),
            missing_entry_points: missing,
            included_by_file: group_by_file(&included),
            unused_by_file: group_by_file(&unused),
            included,
            unused,
            statistics,
        }
    }

    fn statistics(total: usize, included: usize, unused: usize) -> ShakeStatistics {
        let removal_rate = if total == 0 {
            0.0
        } else {
            (100.0 * unused as f64 / total as f64 * 100.0).round() / 100.0
        };
        ShakeStatistics {
            total_symbols: total,
            included_count: included,
            unused_count: unused,
            removal_rate,
        }
    }
}

/// Group ids by the file-key portion; ids inside each group stay sorted.
fn group_by_file(ids: &BTreeSet<QualifiedId>) -> BTreeMap<Box<str>, Vec<QualifiedId>> {
    let mut grouped: BTreeMap<Box<str>, Vec<QualifiedId>> = BTreeMap::new();
    for id in ids {
        grouped
            .entry(id.file_key().into())
            .or_default()
            .push(id.clone());
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{ProjectAnalyzer, SourceFile};
    use crate::config::AnalysisConfig;

    fn analyzed() -> ProjectAnalysisResult {
        let sources = vec![
            SourceFile::new(
                "utils.ts",
                "export function used() { return 1; }\nexport function dangling() { return 2; }",
            ),
            SourceFile::new(
                "app.ts",
                "import { used } from './utils';\nexport function main() { return used(); }",
            ),
        ];
        ProjectAnalyzer::new(AnalysisConfig {
            parallel: false,
            ..AnalysisConfig::default()
        })
        .analyze(&sources)
        .unwrap()
    }

    #[test]
    fn test_shake_partitions_symbols() {
        let analysis = analyzed();
        let result = TreeShaker::new(&analysis).shake(&["app:main".to_string()]);

        assert!(result.included.contains(&QualifiedId::parse("app:main").unwrap()));
        assert!(result.included.contains(&QualifiedId::parse("utils:used").unwrap()));
        assert!(result.unused.contains(&QualifiedId::parse("utils:dangling").unwrap()));
        assert!(result.included.intersection(&result.unused).next().is_none());
        assert_eq!(
            result.included.len() + result.unused.len(),
            analysis.symbol_table.symbol_count()
        );
    }

    #[test]
    fn test_removal_rate_rounding() {
        let analysis = analyzed();
        let result = TreeShaker::new(&analysis).shake(&["app:main".to_string()]);
        // 1 of 3 symbols unused.
        assert_eq!(result.statistics.removal_rate, 33.33);
    }

    #[test]
    fn test_missing_entry_retained_and_reported() {
        let analysis = analyzed();
        let result = TreeShaker::new(&analysis).shake(&[
            "app:main".to_string(),
            "ghost:entry".to_string(),
            "not-an-id".to_string(),
        ]);
        assert_eq!(
            result.missing_entry_points,
            vec!["ghost:entry".to_string(), "not-an-id".to_string()]
        );
        assert!(result.included.contains(&QualifiedId::parse("ghost:entry").unwrap()));
    }

    #[test]
    fn test_grouping_by_file_key() {
        let analysis = analyzed();
        let result = TreeShaker::new(&analysis).shake(&["app:main".to_string()]);
        assert_eq!(result.included_by_file["app"].len(), 1);
        assert_eq!(result.included_by_file["utils"].len(), 1);
        assert_eq!(result.unused_by_file["utils"].len(), 1);
        assert!(!result.unused_by_file.contains_key("app"));
    }

    #[test]
    fn test_empty_entry_list_marks_everything_unused() {
        let analysis = analyzed();
        let result = TreeShaker::new(&analysis).shake(&[]);
        assert!(result.included.is_empty());
        assert_eq!(result.unused.len(), 3);
        assert_eq!(result.statistics.removal_rate, 100.0);
    }
}
