//! Report generation.
//!
//! Converts a tree-shaking result into text, JSON, Markdown, DOT, and
//! adjacency-list renderings, plus the auxiliary analyses (circular
//! dependencies, impact, largest symbols). All reports are pure functions
//! of the result: collections are emitted in sorted or insertion order and
//! the JSON timestamp is injectable, so identical runs produce identical
//! bytes.

use crate::analyzer::ProjectAnalysisResult;
use crate::config::ReportConfig;
use crate::shake::TreeShakingResult;
use crate::types::QualifiedId;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::fmt::Write;

pub struct Reporter<'a> {
    result: &'a TreeShakingResult<'a>,
    options: ReportConfig,
    timestamp: Option<DateTime<Utc>>,
}

impl<'a> Reporter<'a> {
    pub fn new(result: &'a TreeShakingResult<'a>) -> Self {
        Self {
            result,
            options: ReportConfig::default(),
            timestamp: None,
        }
    }

    pub fn with_options(mut self, options: ReportConfig) -> Self {
        self.options = options;
        self
    }

    /// Pin the report timestamp. Unpinned reports stamp the current time.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// One-paragraph totals.
    pub fn summary(&self) -> String {
        let stats = &self.result.statistics;
        let mut out = String::new();
        let _ = writeln!(out, "Tree-shake summary");
        let _ = writeln!(out, "  Entry points:  {}", self.result.entry_points.len());
        let _ = writeln!(out, "  Total symbols: {}", stats.total_symbols);
        let _ = writeln!(out, "  Included:      {}", stats.included_count);
        let _ = writeln!(out, "  Unused:        {}", stats.unused_count);
        let _ = writeln!(out, "  Removal rate:  {}%", stats.removal_rate);
        out
    }

    /// Summary, entry points, then included and unused symbols grouped by
    /// file, each with its type text if known.
    pub fn detailed(&self) -> String {
        let mut out = self.summary();
        let _ = writeln!(out);

        let _ = writeln!(out, "Entry points:");
        for entry in &self.result.entry_points {
            let _ = writeln!(out, "  {entry}");
        }
        if !self.result.missing_entry_points.is_empty() {
            let _ = writeln!(out, "Missing entry points:");
            for entry in &self.result.missing_entry_points {
                let _ = writeln!(out, "  {entry} (no matching symbol)");
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Included symbols:");
        self.write_grouped(&mut out, &self.result.included_by_file);
        let _ = writeln!(out);
        let _ = writeln!(out, "Unused symbols:");
        self.write_grouped(&mut out, &self.result.unused_by_file);

        let table = &self.result.analysis.symbol_table;
        if table.all_files().any(|f| !f.reexports.is_empty()) {
            let _ = writeln!(out);
            let _ = writeln!(out, "Re-exports:");
            for file in table.all_files() {
                for reexport in &file.reexports {
                    let _ = writeln!(
                        out,
                        "  {}: {} as {} from '{}'",
                        file.file_key,
                        reexport.original_name,
                        reexport.exported_name,
                        reexport.from_module
                    );
                }
            }
        }
        out
    }

    fn write_grouped(
        &self,
        out: &mut String,
        grouped: &std::collections::BTreeMap<Box<str>, Vec<QualifiedId>>,
    ) {
        if grouped.is_empty() {
            let _ = writeln!(out, "  (none)");
            return;
        }
        let table = &self.result.analysis.symbol_table;
        for (file_key, ids) in grouped {
            let _ = writeln!(out, "  {file_key}:");
            for id in ids {
                match table.get(id) {
                    Some(symbol) => {
                        let _ = write!(out, "    {} [{}]", symbol.name, symbol.classified_kind());
                        if let Some(type_text) = &symbol.type_text {
                            let _ = write!(out, " {type_text}");
                        }
                        let _ = writeln!(out);
                    }
                    None => {
                        let _ = writeln!(out, "    {} (missing)", id.name());
                    }
                }
            }
        }
    }

    /// The stable JSON layout: `timestamp`, `entry_points`, `statistics`,
    /// `includedSymbols`, `unusedSymbols`, `fileAnalysis`. Additive only.
    pub fn json_value(&self) -> Value {
        let stats = &self.result.statistics;
        let timestamp = self
            .timestamp
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut file_analysis = serde_json::Map::new();
        for file in self.result.analysis.symbol_table.all_files() {
            let total = file.symbol_count();
            let included = self
                .result
                .included_by_file
                .get(&file.file_key)
                .map_or(0, |ids| ids.len());
            let unused = self
                .result
                .unused_by_file
                .get(&file.file_key)
                .map_or(0, |ids| ids.len());
            let removal_rate = if total == 0 {
                0.0
            } else {
                (100.0 * unused as f64 / total as f64 * 100.0).round() / 100.0
            };
            file_analysis.insert(
                file.file_key.to_string(),
                json!({
                    "totalSymbols": total,
                    "includedSymbols": included,
                    "unusedSymbols": unused,
                    "removalRate": removal_rate,
                }),
            );
        }

        json!({
            "timestamp": timestamp,
            "entry_points": self.result.entry_points,
            "missingEntryPoints": self.result.missing_entry_points,
            "statistics": {
                "totalSymbols": stats.total_symbols,
                "includedSymbols": stats.included_count,
                "unusedSymbols": stats.unused_count,
                "removalRate": stats.removal_rate,
            },
            "includedSymbols": sorted_strings(&self.result.included),
            "unusedSymbols": sorted_strings(&self.result.unused),
            "fileAnalysis": Value::Object(file_analysis),
        })
    }

    pub fn json(&self) -> String {
        // Object keys serialize sorted, so identical inputs give identical
        // bytes once the timestamp is pinned.
        serde_json::to_string_pretty(&self.json_value()).unwrap_or_else(|_| "{}".to_string())
    }

    /// The detailed report rendered as headings and tables.
    pub fn markdown(&self) -> String {
        let stats = &self.result.statistics;
        let mut out = String::new();
        let _ = writeln!(out, "# Tree-Shaking Report\n");

        let _ = writeln!(out, "## Summary\n");
        let _ = writeln!(out, "| Metric | Value |");
        let _ = writeln!(out, "| --- | ---: |");
        let _ = writeln!(out, "| Entry points | {} |", self.result.entry_points.len());
        let _ = writeln!(out, "| Total symbols | {} |", stats.total_symbols);
        let _ = writeln!(out, "| Included | {} |", stats.included_count);
        let _ = writeln!(out, "| Unused | {} |", stats.unused_count);
        let _ = writeln!(out, "| Removal rate | {}% |", stats.removal_rate);
        let _ = writeln!(out);

        let _ = writeln!(out, "## Entry Points\n");
        for entry in &self.result.entry_points {
            let _ = writeln!(out, "- `{entry}`");
        }
        for missing in &self.result.missing_entry_points {
            let _ = writeln!(out, "- `{missing}` *(no matching symbol)*");
        }
        let _ = writeln!(out);

        self.markdown_group(&mut out, "## Included Symbols", &self.result.included_by_file);
        self.markdown_group(&mut out, "## Unused Symbols", &self.result.unused_by_file);
        out
    }

    fn markdown_group(
        &self,
        out: &mut String,
        heading: &str,
        grouped: &std::collections::BTreeMap<Box<str>, Vec<QualifiedId>>,
    ) {
        let _ = writeln!(out, "{heading}\n");
        if grouped.is_empty() {
            let _ = writeln!(out, "_(none)_\n");
            return;
        }
        let table = &self.result.analysis.symbol_table;
        for (file_key, ids) in grouped {
            let _ = writeln!(out, "### `{file_key}`\n");
            let _ = writeln!(out, "| Symbol | Kind | Type |");
            let _ = writeln!(out, "| --- | --- | --- |");
            for id in ids {
                match table.get(id) {
                    Some(symbol) => {
                        let type_text = symbol.type_text.as_deref().unwrap_or("");
                        let _ = writeln!(
                            out,
                            "| `{}` | {} | `{}` |",
                            symbol.name,
                            symbol.classified_kind(),
                            type_text
                        );
                    }
                    None => {
                        let _ = writeln!(out, "| `{}` | missing | |", id.name());
                    }
                }
            }
            let _ = writeln!(out);
        }
    }

    /// Directed graph in DOT form, nodes colored by liveness, bounded by
    /// the configured node cap.
    pub fn dot(&self) -> String {
        let table = &self.result.analysis.symbol_table;

        let mut displayed: Vec<&QualifiedId> = Vec::new();
        for id in &self.result.included {
            if displayed.len() >= self.options.max_nodes {
                break;
            }
            displayed.push(id);
        }
        if !self.options.included_only {
            for id in &self.result.unused {
                if displayed.len() >= self.options.max_nodes {
                    break;
                }
                displayed.push(id);
            }
        }
        let shown: BTreeSet<&QualifiedId> = displayed.iter().copied().collect();

        let mut out = String::new();
        let _ = writeln!(out, "digraph Dependencies {{");
        let _ = writeln!(out, "  rankdir=LR;");
        let _ = writeln!(out, "  node [shape=box, style=filled];");
        for id in &displayed {
            let color = if self.result.included.contains(*id) {
                "lightgreen"
            } else {
                "lightcoral"
            };
            let _ = writeln!(
                out,
                "  \"{}\" [label=\"{}\", fillcolor={}];",
                escape_label(id.as_str()),
                escape_label(id.name()),
                color
            );
        }
        for id in &displayed {
            for dep in table.dependencies(id) {
                if shown.contains(&dep) {
                    let _ = writeln!(
                        out,
                        "  \"{}\" -> \"{}\";",
                        escape_label(id.as_str()),
                        escape_label(dep.as_str())
                    );
                }
            }
        }
        let _ = writeln!(out, "}}");
        out
    }

    /// One block per symbol in included plus unused, sorted by local name,
    /// each followed by its sorted dependencies or `(none)`.
    pub fn adjacency_list(&self) -> String {
        let table = &self.result.analysis.symbol_table;

        let mut symbols: Vec<&QualifiedId> = self
            .result
            .included
            .iter()
            .chain(self.result.unused.iter())
            .filter(|id| table.contains(id))
            .collect();
        symbols.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.cmp(b)));

        let mut out = String::new();
        for id in symbols {
            match table.get(id) {
                Some(symbol) if self.options.show_location => {
                    let _ = writeln!(
                        out,
                        "{} ({}:{})",
                        symbol.name,
                        symbol.file_key(),
                        symbol.location.line
                    );
                }
                Some(symbol) => {
                    let _ = writeln!(out, "{} [{}]", symbol.name, id);
                }
                None => continue,
            }
            let deps = table.dependencies(id);
            if deps.is_empty() {
                let _ = writeln!(out, "  (none)");
            } else {
                for dep in deps {
                    let _ = writeln!(out, "  {dep}");
                }
            }
        }
        out
    }
}

/// Cycle enumeration with rotations canonicalized: each cycle is rotated to
/// start at its minimal id and duplicates are dropped.
pub fn find_circular_dependencies(analysis: &ProjectAnalysisResult) -> Vec<Vec<QualifiedId>> {
    let mut seen: BTreeSet<Vec<QualifiedId>> = BTreeSet::new();
    let mut cycles = Vec::new();
    for cycle in analysis.symbol_table.find_cycles() {
        let canonical = canonicalize_cycle(cycle);
        if seen.insert(canonical.clone()) {
            cycles.push(canonical);
        }
    }
    cycles
}

fn canonicalize_cycle(cycle: Vec<QualifiedId>) -> Vec<QualifiedId> {
    let Some(min_index) = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, id)| *id)
        .map(|(i, _)| i)
    else {
        return cycle;
    };
    let mut rotated = cycle;
    rotated.rotate_left(min_index);
    rotated
}

/// Who is affected when a symbol changes.
#[derive(Debug, Clone)]
pub struct ImpactReport {
    pub target: QualifiedId,
    pub direct_dependents: Vec<QualifiedId>,
    pub all_dependents: Vec<QualifiedId>,
    pub count: usize,
}

pub fn impact_analysis(analysis: &ProjectAnalysisResult, target: &QualifiedId) -> ImpactReport {
    let table = &analysis.symbol_table;
    let direct: Vec<QualifiedId> = table.dependents(target).into_iter().collect();
    let mut all: Vec<QualifiedId> = table
        .reverse_closure(std::slice::from_ref(target))
        .into_iter()
        .filter(|id| id != target)
        .collect();
    all.sort();
    ImpactReport {
        target: target.clone(),
        count: all.len(),
        direct_dependents: direct,
        all_dependents: all,
    }
}

/// Top-k symbols ranked by dependency count, ties broken by id.
pub fn find_largest_symbols(
    analysis: &ProjectAnalysisResult,
    k: usize,
) -> Vec<(QualifiedId, usize)> {
    let table = &analysis.symbol_table;
    let mut ranked: Vec<(QualifiedId, usize)> = table
        .all_ids()
        .map(|id| (id.clone(), table.dependencies(id).len()))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(k);
    ranked
}

fn sorted_strings(ids: &BTreeSet<QualifiedId>) -> Vec<String> {
    ids.iter().map(|id| id.as_str().to_string()).collect()
}

fn escape_label(s: &str) -> String {
    s.replace('"', "\\\"")
}
