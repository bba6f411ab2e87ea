//! Command implementations.
//!
//! All file I/O lives here: sources are loaded from disk, handed to the
//! analyzer as in-memory records, and reports are printed to stdout.

pub mod args;

pub use args::{Cli, Commands, OutputFormat};

use crate::analyzer::{ProjectAnalysisResult, ProjectAnalyzer, SourceFile};
use crate::config::{ReportConfig, Settings};
use crate::parsing::is_supported_source;
use crate::report::{self, Reporter};
use crate::shake::TreeShaker;
use crate::types::QualifiedId;
use anyhow::{Context, bail};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = Settings::load().context("failed to load configuration")?;
    apply_overrides(&mut settings, &cli);

    match &cli.command {
        Commands::Analyze { paths, json } => {
            let analysis = analyze(paths, &settings)?;
            print_diagnostics(&analysis);
            if *json {
                println!("{}", serde_json::to_string_pretty(&analysis.statistics)?);
            } else {
                let stats = &analysis.statistics;
                println!("Files:    {}", stats.total_files);
                println!(
                    "Symbols:  {} ({} exported, {} internal)",
                    stats.total_symbols, stats.exported_symbols, stats.internal_symbols
                );
                println!("Imports:  {}", stats.total_imports);
                println!("Edges:    {}", stats.total_edges);
            }
        }
        Commands::Shake {
            entries,
            paths,
            format,
            max_nodes,
            included_only,
            show_location,
        } => {
            let analysis = analyze(paths, &settings)?;
            print_diagnostics(&analysis);
            let result = TreeShaker::new(&analysis).shake(entries);
            let options = ReportConfig {
                max_nodes: *max_nodes,
                included_only: *included_only,
                show_location: *show_location,
            };
            let reporter = Reporter::new(&result).with_options(options);
            let rendered = match format {
                OutputFormat::Text => reporter.summary(),
                OutputFormat::Detailed => reporter.detailed(),
                OutputFormat::Json => reporter.json(),
                OutputFormat::Markdown => reporter.markdown(),
                OutputFormat::Dot => reporter.dot(),
                OutputFormat::Adjacency => reporter.adjacency_list(),
            };
            print!("{rendered}");
        }
        Commands::Cycles { paths } => {
            let analysis = analyze(paths, &settings)?;
            let cycles = report::find_circular_dependencies(&analysis);
            if cycles.is_empty() {
                println!("No circular dependencies.");
            } else {
                for cycle in cycles {
                    let ids: Vec<&str> = cycle.iter().map(|id| id.as_str()).collect();
                    println!("{} -> {}", ids.join(" -> "), ids[0]);
                }
            }
        }
        Commands::Impact { target, paths } => {
            let Some(id) = QualifiedId::parse(target) else {
                bail!("target '{target}' is not a <file_key>:<name> id");
            };
            let analysis = analyze(paths, &settings)?;
            let impact = report::impact_analysis(&analysis, &id);
            println!("Impact of {}: {} dependent(s)", impact.target, impact.count);
            for dependent in &impact.all_dependents {
                let marker = if impact.direct_dependents.contains(dependent) {
                    "direct"
                } else {
                    "transitive"
                };
                println!("  {dependent} ({marker})");
            }
        }
        Commands::Largest { count, paths } => {
            let analysis = analyze(paths, &settings)?;
            for (id, dependency_count) in report::find_largest_symbols(&analysis, *count) {
                println!("{dependency_count:>5}  {id}");
            }
        }
    }
    Ok(())
}

fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    if cli.strict {
        settings.analysis.strict = true;
    }
    if cli.include_node_modules {
        settings.analysis.include_node_modules = true;
    }
    if cli.include_system {
        settings.analysis.include_system_symbols = true;
    }
    if cli.follow_types {
        settings.analysis.follow_type_only_imports = true;
    }
    if cli.sequential {
        settings.analysis.parallel = false;
    }
}

fn analyze(paths: &[PathBuf], settings: &Settings) -> anyhow::Result<ProjectAnalysisResult> {
    let sources = load_sources(paths)?;
    let analysis = ProjectAnalyzer::new(settings.analysis.clone())
        .analyze(&sources)
        .map_err(|err| {
            let suggestions = err
                .recovery_suggestions()
                .iter()
                .map(|s| format!("\n  hint: {s}"))
                .collect::<String>();
            anyhow::anyhow!("{err}{suggestions}")
        })?;
    Ok(analysis)
}

/// Collect root files: explicit files as given, directories walked for
/// TypeScript sources, skipping node_modules and declaration files.
fn load_sources(paths: &[PathBuf]) -> anyhow::Result<Vec<SourceFile>> {
    let mut sources = Vec::new();
    for path in paths {
        if !path.exists() {
            bail!("path '{}' does not exist", path.display());
        }
        if path.is_file() {
            sources.push(read_source(path)?);
            continue;
        }
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != "node_modules")
        {
            let entry = entry.with_context(|| format!("walking '{}'", path.display()))?;
            if entry.file_type().is_file() && is_supported_source(entry.path()) {
                sources.push(read_source(entry.path())?);
            }
        }
    }
    Ok(sources)
}

fn read_source(path: &Path) -> anyhow::Result<SourceFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    Ok(SourceFile::new(path, text))
}

fn print_diagnostics(analysis: &ProjectAnalysisResult) {
    for diagnostic in &analysis.diagnostics {
        match &diagnostic.location {
            Some(location) => eprintln!(
                "warning: {}:{}:{}: {}",
                diagnostic.path.display(),
                location.line,
                location.column,
                diagnostic.message
            ),
            None => eprintln!("warning: {}: {}", diagnostic.path.display(), diagnostic.message),
        }
    }
}
