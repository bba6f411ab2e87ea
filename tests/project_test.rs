//! Multi-file analysis: cross-file identity, closures, cycles, refresh.

use std::collections::BTreeSet;
use symshake::analyzer::{ProjectAnalysisResult, ProjectAnalyzer, SourceFile};
use symshake::config::AnalysisConfig;
use symshake::shake::TreeShaker;
use symshake::types::QualifiedId;

fn id(s: &str) -> QualifiedId {
    QualifiedId::parse(s).unwrap()
}

fn fixture_sources() -> Vec<SourceFile> {
    vec![
        SourceFile::new(
            "src/types.ts",
            "export type UserRole = 'admin' | 'user';\n\
             export interface User { id: number; name: string; role: UserRole }\n\
             export interface ApiResponse { ok: boolean; data: User }\n",
        ),
        SourceFile::new(
            "src/utils.ts",
            "import { UserRole } from './types';\n\
             export function validateRole(role: UserRole): boolean { return role === 'admin' || role === 'user'; }\n\
             export function formatUserName(name: string): string { return name.trim(); }\n",
        ),
        SourceFile::new(
            "src/api.ts",
            "import { User, ApiResponse } from './types';\n\
             import { validateRole, formatUserName } from './utils';\n\
             export function fetchUser(userId: number): ApiResponse {\n\
               const name = formatUserName('user-' + userId);\n\
               return { ok: true, data: { id: userId, name, role: 'user' } };\n\
             }\n\
             export function processUser(user: User): User {\n\
               if (!validateRole(user.role)) { throw new Error('bad role'); }\n\
               return { ...user, name: formatUserName(user.name) };\n\
             }\n",
        ),
        SourceFile::new(
            "src/index.ts",
            "import { fetchUser, processUser } from './api';\n\
             export function main() {\n\
               const response = fetchUser(1);\n\
               return processUser(response.data);\n\
             }\n",
        ),
    ]
}

fn analyze(options: AnalysisConfig) -> ProjectAnalysisResult {
    ProjectAnalyzer::new(options)
        .analyze(&fixture_sources())
        .unwrap()
}

fn follow_types_options() -> AnalysisConfig {
    AnalysisConfig {
        follow_type_only_imports: true,
        parallel: false,
        ..AnalysisConfig::default()
    }
}

#[test]
fn tree_shake_across_files_covers_the_transitive_closure() {
    let analysis = analyze(follow_types_options());
    let result = TreeShaker::new(&analysis).shake(&["index:main".to_string()]);

    for expected in [
        "index:main",
        "api:fetchUser",
        "api:processUser",
        "utils:validateRole",
        "utils:formatUserName",
        "types:User",
        "types:ApiResponse",
    ] {
        assert!(
            result.included.contains(&id(expected)),
            "{expected} missing from closure: {:?}",
            result.included
        );
    }
    assert!(result.included.len() >= 7);
    assert!(result.missing_entry_points.is_empty());
}

#[test]
fn default_policy_excludes_type_only_targets() {
    let analysis = analyze(AnalysisConfig {
        parallel: false,
        ..AnalysisConfig::default()
    });
    let result = TreeShaker::new(&analysis).shake(&["index:main".to_string()]);

    assert!(result.included.contains(&id("utils:formatUserName")));
    assert!(result.included.contains(&id("utils:validateRole")));
    assert!(!result.included.contains(&id("types:User")));
    assert!(result.unused.contains(&id("types:ApiResponse")));
}

#[test]
fn edge_consistency_holds_across_the_project() {
    let analysis = analyze(follow_types_options());
    let table = &analysis.symbol_table;

    for symbol in table.all_symbols() {
        // The per-symbol record and the table agree in both directions.
        assert_eq!(symbol.dependencies, table.dependencies(&symbol.id));
        assert_eq!(symbol.dependents, table.dependents(&symbol.id));
        for dep in &symbol.dependencies {
            assert_ne!(dep, &symbol.id, "self-loop on {}", symbol.id);
            assert!(
                table.dependents(dep).contains(&symbol.id),
                "reverse edge missing for {} -> {dep}",
                symbol.id
            );
        }
        for dependent in &symbol.dependents {
            assert!(table.dependencies(dependent).contains(&symbol.id));
        }
    }
}

#[test]
fn unused_partition_is_exact() {
    let analysis = analyze(follow_types_options());
    let result = TreeShaker::new(&analysis).shake(&["index:main".to_string()]);

    assert!(result.included.intersection(&result.unused).next().is_none());
    let mut union: BTreeSet<QualifiedId> = result.included.clone();
    union.extend(result.unused.iter().cloned());
    let all: BTreeSet<QualifiedId> = analysis.symbol_table.all_ids().cloned().collect();
    assert_eq!(union, all);
}

#[test]
fn cycle_between_two_files_is_found() {
    let sources = vec![
        SourceFile::new(
            "a.ts",
            "import { b } from './b';\nexport function a() { return b(); }",
        ),
        SourceFile::new(
            "b.ts",
            "import { a } from './a';\nexport function b() { return a(); }",
        ),
    ];
    let analysis = ProjectAnalyzer::new(AnalysisConfig {
        parallel: false,
        ..AnalysisConfig::default()
    })
    .analyze(&sources)
    .unwrap();

    let cycles = analysis.symbol_table.find_cycles();
    assert!(!cycles.is_empty());
    let found = cycles.iter().any(|cycle| {
        let vertices: BTreeSet<&str> = cycle.iter().map(|v| v.as_str()).collect();
        vertices == ["a:a", "b:b"].into_iter().collect()
    });
    assert!(found, "no cycle with vertex set {{a:a, b:b}} in {cycles:?}");

    // Soundness: consecutive edges of every reported cycle exist.
    for cycle in &cycles {
        for i in 0..cycle.len() {
            let from = &cycle[i];
            let to = &cycle[(i + 1) % cycle.len()];
            assert!(analysis.symbol_table.dependencies(from).contains(to));
        }
    }
}

#[test]
fn import_records_translate_local_names() {
    let analysis = analyze(follow_types_options());
    let api = analysis.symbol_table.file("api").unwrap();
    assert_eq!(api.imports.len(), 4);
    let validate = &api.imports["validateRole"];
    assert_eq!(validate.normalized_module.as_ref(), "utils");
    assert_eq!(validate.original_name.as_ref(), "validateRole");
    assert_eq!(analysis.statistics.total_imports, 7);
}

#[test]
fn statistics_count_files_symbols_and_edges() {
    let analysis = analyze(follow_types_options());
    let stats = &analysis.statistics;
    assert_eq!(stats.total_files, 4);
    assert_eq!(stats.total_symbols, 8);
    assert_eq!(stats.symbols_per_file["api"], 2);
    assert_eq!(
        stats.total_edges,
        analysis.symbol_table.edge_count()
    );
    assert!(stats.total_edges >= 7);
}

#[test]
fn refresh_replaces_one_file_atomically() {
    let options = follow_types_options();
    let analyzer = ProjectAnalyzer::new(options);
    let mut analysis = analyzer.analyze(&fixture_sources()).unwrap();

    let updated = SourceFile::new(
        "src/utils.ts",
        "export function formatUserName(name: string): string { return name.toUpperCase(); }",
    );
    analyzer
        .reanalyze_file(&mut analysis.symbol_table, &updated)
        .unwrap();

    assert!(analysis.symbol_table.get(&id("utils:validateRole")).is_none());
    let kept = analysis.symbol_table.get(&id("utils:formatUserName")).unwrap();
    assert!(kept.type_text.is_some());
}

#[test]
fn impact_walks_reverse_edges_transitively() {
    let analysis = analyze(follow_types_options());
    let impact = symshake::report::impact_analysis(&analysis, &id("utils:formatUserName"));
    let all: BTreeSet<&str> = impact.all_dependents.iter().map(|d| d.as_str()).collect();
    assert!(all.contains("api:fetchUser"));
    assert!(all.contains("api:processUser"));
    assert!(all.contains("index:main"));
    assert!(impact.direct_dependents.contains(&id("api:fetchUser")));
}
