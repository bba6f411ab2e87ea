//! Per-file symbol extraction.
//!
//! Two passes over one parsed source file. Pass 1 walks only the top-level
//! statement list, classifying declarations into symbols and building the
//! import translation table. Pass 2 walks each symbol's declaration subtree
//! to compute its dependency set (see [`resolver`]).

pub mod resolver;

use crate::config::AnalysisConfig;
use crate::parsing::typescript::{
    annotation_text, callable_signature, is_function_literal, jsdoc_for, location_of, node_text,
};
use crate::parsing::{FileScope, file_key_of, normalize_specifier};
use crate::symbol::{FileSymbols, Import, ReExport, Symbol};
use crate::types::{ImportStyle, QualifiedId, Span, SymbolKind};
use indexmap::IndexMap;
use resolver::DependencyResolver;
use std::collections::HashSet;
use std::path::Path;
use tree_sitter::{Node, Tree};

pub struct SymbolExtractor<'a> {
    code: &'a str,
    path: &'a Path,
    file_key: Box<str>,
    options: &'a AnalysisConfig,
}

/// A symbol collected in pass 1, paired with the declaration node pass 2
/// will scan. For a function-valued variable the node is the function
/// literal itself, so its parameter list and body are in scope.
struct Pending<'t> {
    symbol: Symbol,
    decl: Node<'t>,
}

impl<'a> SymbolExtractor<'a> {
    pub fn new(code: &'a str, path: &'a Path, options: &'a AnalysisConfig) -> Self {
        Self {
            code,
            path,
            file_key: file_key_of(path).into(),
            options,
        }
    }

    pub fn file_key(&self) -> &str {
        &self.file_key
    }

    /// Produce the file's symbols. Declarations without a resolvable name
    /// (anonymous default exports) are skipped silently.
    pub fn extract(&self, tree: &Tree) -> FileSymbols {
        let root = tree.root_node();

        let mut pending: Vec<Pending> = Vec::new();
        let mut imports: IndexMap<Box<str>, Import> = IndexMap::new();
        let mut reexports: Vec<ReExport> = Vec::new();
        let mut exported_marks: HashSet<String> = HashSet::new();

        // Pass 1: top-level statements only.
        let mut cursor = root.walk();
        for statement in root.named_children(&mut cursor) {
            match statement.kind() {
                "import_statement" => self.collect_imports(statement, &mut imports),
                "export_statement" => self.collect_export(
                    statement,
                    &mut pending,
                    &mut reexports,
                    &mut exported_marks,
                ),
                _ => self.collect_declaration(statement, statement, false, &mut pending),
            }
        }

        for entry in &mut pending {
            if exported_marks.contains(entry.symbol.name.as_ref()) {
                entry.symbol.is_exported = true;
            }
        }

        // Pass 2: dependency discovery per symbol.
        let top_level: Vec<(Box<str>, SymbolKind)> = pending
            .iter()
            .map(|p| (p.symbol.name.clone(), p.symbol.classified_kind()))
            .collect();
        let scope = FileScope::new(
            &self.file_key,
            top_level.iter().map(|(n, k)| (n.as_ref(), *k)),
            &imports,
        );
        let walker = DependencyResolver::new(self.code, &scope, self.options);
        let dependency_sets: Vec<_> = pending
            .iter()
            .map(|p| walker.dependencies_of(&p.symbol.id, p.decl))
            .collect();

        let mut file = FileSymbols::new(self.file_key.clone());
        file.imports = imports;
        file.reexports = reexports;
        for (mut entry, deps) in pending.into_iter().zip(dependency_sets) {
            for dep in deps {
                entry.symbol.add_dependency(dep);
            }
            file.insert_symbol(entry.symbol);
        }
        file
    }

    /// Classify one top-level declaration statement. `doc_host` is the
    /// outermost statement node (the export wrapper when present), where a
    /// preceding JSDoc block attaches.
    fn collect_declaration<'t>(
        &self,
        node: Node<'t>,
        doc_host: Node<'t>,
        exported: bool,
        pending: &mut Vec<Pending<'t>>,
    ) {
        match node.kind() {
            "function_declaration" | "generator_function_declaration" => {
                self.push_named(node, doc_host, exported, SymbolKind::Function, pending);
            }
            "class_declaration" | "abstract_class_declaration" => {
                self.push_named(node, doc_host, exported, SymbolKind::Class, pending);
            }
            "interface_declaration" => {
                self.push_named(node, doc_host, exported, SymbolKind::Interface, pending);
            }
            "type_alias_declaration" => {
                self.push_named(node, doc_host, exported, SymbolKind::TypeAlias, pending);
            }
            "enum_declaration" => {
                self.push_named(node, doc_host, exported, SymbolKind::Enum, pending);
            }
            "lexical_declaration" | "variable_declaration" => {
                self.collect_variables(node, doc_host, exported, pending);
            }
            "module" | "internal_module" => {
                self.push_named(node, doc_host, exported, SymbolKind::ModuleBlock, pending);
            }
            "ambient_declaration" | "expression_statement" => {
                // `declare namespace X {}` and bare `namespace X {}` both
                // reach the statement list wrapped one level deep.
                if let Some(inner) = node.named_child(0) {
                    if matches!(inner.kind(), "module" | "internal_module") {
                        self.push_named(inner, doc_host, exported, SymbolKind::ModuleBlock, pending);
                    }
                }
            }
            _ => {}
        }
    }

    /// Declarations with a `name` field produce exactly one symbol.
    fn push_named<'t>(
        &self,
        node: Node<'t>,
        doc_host: Node<'t>,
        exported: bool,
        kind: SymbolKind,
        pending: &mut Vec<Pending<'t>>,
    ) {
        let Some(name_node) = node.child_by_field_name("name") else {
            tracing::debug!(
                "[extractor] skipping anonymous {} in '{}'",
                node.kind(),
                self.file_key
            );
            return;
        };
        let name = node_text(name_node, self.code).trim_matches(['\'', '"']).to_string();
        let Some(id) = QualifiedId::new(&self.file_key, &name) else {
            return;
        };

        let type_text = match kind {
            SymbolKind::TypeAlias => node
                .child_by_field_name("value")
                .map(|v| node_text(v, self.code).to_string()),
            _ => Some(callable_signature(node, self.code)),
        };

        let mut symbol = Symbol::new(id, kind, location_of(node), span_of(node)).exported(exported);
        if let Some(text) = type_text.filter(|t| !t.is_empty()) {
            symbol = symbol.with_type_text(text);
        }
        if let Some(doc) = jsdoc_for(doc_host, self.code) {
            symbol = symbol.with_doc(doc);
        }
        pending.push(Pending { symbol, decl: node });
    }

    /// One symbol per declared identifier. The storage kind follows the
    /// keyword; a declarator whose initializer is a function literal hangs
    /// on to the literal as its declaration node.
    fn collect_variables<'t>(
        &self,
        statement: Node<'t>,
        doc_host: Node<'t>,
        exported: bool,
        pending: &mut Vec<Pending<'t>>,
    ) {
        let kind = match statement.child_by_field_name("kind") {
            Some(k) => match node_text(k, self.code) {
                "const" => SymbolKind::Const,
                "let" => SymbolKind::Let,
                _ => SymbolKind::Var,
            },
            None => SymbolKind::Var,
        };

        let mut cursor = statement.walk();
        for declarator in statement.named_children(&mut cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name_node) = declarator.child_by_field_name("name") else {
                continue;
            };
            let value = declarator.child_by_field_name("value");
            let function_value = value.filter(|v| is_function_literal(*v));

            if name_node.kind() == "identifier" {
                let name = node_text(name_node, self.code);
                let Some(id) = QualifiedId::new(&self.file_key, name) else {
                    continue;
                };
                let decl = function_value.unwrap_or(declarator);
                let mut symbol = Symbol::new(id, kind, location_of(declarator), span_of(decl))
                    .exported(exported)
                    .function_valued(function_value.is_some());
                let type_text = annotation_text(declarator, self.code)
                    .or_else(|| function_value.map(|f| callable_signature(f, self.code)));
                if let Some(text) = type_text {
                    symbol = symbol.with_type_text(text);
                }
                if let Some(doc) = jsdoc_for(doc_host, self.code) {
                    symbol = symbol.with_doc(doc);
                }
                pending.push(Pending { symbol, decl });
            } else {
                // Destructuring: one symbol per bound identifier, each
                // scanning the whole declarator.
                for bound in pattern_identifiers(name_node, self.code) {
                    let Some(id) = QualifiedId::new(&self.file_key, &bound) else {
                        continue;
                    };
                    let symbol =
                        Symbol::new(id, kind, location_of(declarator), span_of(declarator))
                            .exported(exported);
                    pending.push(Pending {
                        symbol,
                        decl: declarator,
                    });
                }
            }
        }
    }

    fn collect_export<'t>(
        &self,
        statement: Node<'t>,
        pending: &mut Vec<Pending<'t>>,
        reexports: &mut Vec<ReExport>,
        exported_marks: &mut HashSet<String>,
    ) {
        let source = statement
            .child_by_field_name("source")
            .map(|s| string_value(s, self.code));

        // `export { … } from '…'` and `export * from '…'` are recorded but
        // produce no new symbol.
        if let Some(from_module) = source {
            let mut found_clause = false;
            let mut cursor = statement.walk();
            for child in statement.named_children(&mut cursor) {
                if child.kind() == "export_clause" {
                    found_clause = true;
                    let mut spec_cursor = child.walk();
                    for spec in child.named_children(&mut spec_cursor) {
                        if spec.kind() != "export_specifier" {
                            continue;
                        }
                        let Some(name) = spec.child_by_field_name("name") else {
                            continue;
                        };
                        let original = node_text(name, self.code).to_string();
                        let exported_name = spec
                            .child_by_field_name("alias")
                            .map(|a| node_text(a, self.code).to_string())
                            .unwrap_or_else(|| original.clone());
                        reexports.push(ReExport {
                            exported_name: exported_name.into(),
                            original_name: original.into(),
                            from_module: from_module.clone().into(),
                        });
                    }
                }
            }
            if !found_clause {
                reexports.push(ReExport {
                    exported_name: "*".into(),
                    original_name: "*".into(),
                    from_module: from_module.into(),
                });
            }
            return;
        }

        if let Some(declaration) = statement.child_by_field_name("declaration") {
            self.collect_declaration(declaration, statement, true, pending);
            return;
        }

        // `export default <identifier>` and `export { a, b as c }` mark
        // already-collected symbols as exported.
        let mut cursor = statement.walk();
        let children: Vec<Node> = statement.children(&mut cursor).collect();
        for (i, child) in children.iter().enumerate() {
            if child.kind() == "default" {
                if let Some(next) = children.get(i + 1) {
                    if next.kind() == "identifier" {
                        exported_marks.insert(node_text(*next, self.code).to_string());
                    }
                    // Anonymous default export of a literal: skipped.
                }
            }
            if child.kind() == "export_clause" {
                let mut spec_cursor = child.walk();
                for spec in child.named_children(&mut spec_cursor) {
                    if spec.kind() == "export_specifier" {
                        if let Some(name) = spec.child_by_field_name("name") {
                            exported_marks.insert(node_text(name, self.code).to_string());
                        }
                    }
                }
            }
        }
    }

    fn collect_imports(&self, statement: Node, imports: &mut IndexMap<Box<str>, Import>) {
        let Some(source_node) = statement.child_by_field_name("source") else {
            return;
        };
        let from_module = string_value(source_node, self.code);
        let normalized = normalize_specifier(self.path, &from_module);

        let mut push = |local: String, style: ImportStyle, original: String| {
            imports.insert(
                local.clone().into(),
                Import {
                    local_name: local.into(),
                    from_module: from_module.clone().into(),
                    normalized_module: normalized.clone().into(),
                    style,
                    original_name: original.into(),
                },
            );
        };

        let mut cursor = statement.walk();
        for child in statement.named_children(&mut cursor) {
            if child.kind() != "import_clause" {
                continue;
            }
            let mut clause_cursor = child.walk();
            for part in child.named_children(&mut clause_cursor) {
                match part.kind() {
                    "identifier" => {
                        let local = node_text(part, self.code).to_string();
                        push(local, ImportStyle::Default, "default".to_string());
                    }
                    "namespace_import" => {
                        if let Some(alias) = first_identifier(part) {
                            let local = node_text(alias, self.code).to_string();
                            push(local, ImportStyle::Namespace, "*".to_string());
                        }
                    }
                    "named_imports" => {
                        let mut spec_cursor = part.walk();
                        for spec in part.named_children(&mut spec_cursor) {
                            if spec.kind() != "import_specifier" {
                                continue;
                            }
                            let Some(name) = spec.child_by_field_name("name") else {
                                continue;
                            };
                            let original = node_text(name, self.code).to_string();
                            let local = spec
                                .child_by_field_name("alias")
                                .map(|a| node_text(a, self.code).to_string())
                                .unwrap_or_else(|| original.clone());
                            push(local, ImportStyle::Named, original);
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}

fn span_of(node: Node) -> Span {
    Span::new(node.start_byte() as u32, node.end_byte() as u32)
}

/// Unquoted text of a string literal node.
fn string_value(node: Node, code: &str) -> String {
    node_text(node, code).trim_matches(['\'', '"', '`']).to_string()
}

fn first_identifier<'t>(node: Node<'t>) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .find(|c| c.kind() == "identifier")
}

/// All identifiers bound by a destructuring pattern.
fn pattern_identifiers(pattern: Node, code: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut stack = vec![pattern];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => {
                names.push(node_text(node, code).to_string());
                continue;
            }
            // The key position of `{ key: binding }` is not a binding.
            "pair_pattern" => {
                if let Some(value) = node.child_by_field_name("value") {
                    stack.push(value);
                }
                continue;
            }
            _ => {}
        }
        for i in (0..node.named_child_count()).rev() {
            if let Some(child) = node.named_child(i as u32) {
                stack.push(child);
            }
        }
    }
    names.reverse();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::TypeScriptParser;

    fn extract(code: &str) -> FileSymbols {
        let options = AnalysisConfig::default();
        let path = Path::new("sample.ts");
        let mut parser = TypeScriptParser::new().unwrap();
        let tree = parser.parse(code, path).unwrap();
        SymbolExtractor::new(code, path, &options).extract(&tree)
    }

    #[test]
    fn test_export_modifier_routes_symbols() {
        let file = extract("export function api() {}\nfunction helper() {}");
        assert!(file.exports.contains_key("api"));
        assert!(file.internal.contains_key("helper"));
    }

    #[test]
    fn test_variable_storage_kind_follows_keyword() {
        let file = extract("export const add = (x, y) => x + y;\nlet counter = 0;\nvar legacy = 1;");
        let add = file.symbol("add").unwrap();
        assert_eq!(add.kind, SymbolKind::Const);
        assert!(add.function_valued);
        assert_eq!(add.classified_kind(), SymbolKind::Function);
        assert_eq!(file.symbol("counter").unwrap().kind, SymbolKind::Let);
        assert_eq!(file.symbol("legacy").unwrap().kind, SymbolKind::Var);
    }

    #[test]
    fn test_function_valued_variable_pins_literal_span() {
        let code = "export const add = (x, y) => x + y;";
        let file = extract(code);
        let add = file.symbol("add").unwrap();
        let literal = &code[add.decl_span.start as usize..add.decl_span.end as usize];
        assert_eq!(literal, "(x, y) => x + y");
    }

    #[test]
    fn test_import_table_shapes() {
        let code = "import Def from './def';\nimport { a, b as c } from './named';\nimport * as ns from 'pkg';\n";
        let file = extract(code);
        assert_eq!(file.imports.len(), 4);

        let def = &file.imports["Def"];
        assert_eq!(def.style, ImportStyle::Default);
        assert_eq!(def.original_name.as_ref(), "default");
        assert_eq!(def.normalized_module.as_ref(), "def");

        let a = &file.imports["a"];
        assert_eq!(a.style, ImportStyle::Named);
        assert_eq!(a.original_name.as_ref(), "a");

        let c = &file.imports["c"];
        assert_eq!(c.original_name.as_ref(), "b");
        assert_eq!(c.normalized_module.as_ref(), "named");

        let ns = &file.imports["ns"];
        assert_eq!(ns.style, ImportStyle::Namespace);
        assert_eq!(ns.original_name.as_ref(), "*");
        assert_eq!(ns.normalized_module.as_ref(), "pkg");
    }

    #[test]
    fn test_reexport_produces_no_symbol() {
        let file = extract("export { helper, format as fmt } from './utils';\nexport * from './types';");
        assert_eq!(file.symbol_count(), 0);
        assert_eq!(file.reexports.len(), 3);
        assert_eq!(file.reexports[1].exported_name.as_ref(), "fmt");
        assert_eq!(file.reexports[1].original_name.as_ref(), "format");
        assert_eq!(file.reexports[2].exported_name.as_ref(), "*");
    }

    #[test]
    fn test_export_clause_marks_existing_symbols() {
        let file = extract("function run() {}\nconst VERSION = '1';\nexport { run, VERSION };");
        assert!(file.exports.contains_key("run"));
        assert!(file.exports.contains_key("VERSION"));
        assert!(file.internal.is_empty());
    }

    #[test]
    fn test_export_default_identifier_marks_symbol() {
        let file = extract("class App {}\nexport default App;");
        assert!(file.exports.contains_key("App"));
    }

    #[test]
    fn test_anonymous_default_export_skipped() {
        let file = extract("export default function () { return 1; }");
        assert_eq!(file.symbol_count(), 0);
    }

    #[test]
    fn test_interface_enum_alias_namespace_kinds() {
        let code = "export interface User { id: number }\nexport type Role = 'admin' | 'user';\nexport enum Color { Red }\nnamespace Config { export const x = 1; }";
        let file = extract(code);
        assert_eq!(file.symbol("User").unwrap().kind, SymbolKind::Interface);
        let role = file.symbol("Role").unwrap();
        assert_eq!(role.kind, SymbolKind::TypeAlias);
        assert_eq!(role.type_text.as_deref(), Some("'admin' | 'user'"));
        assert_eq!(file.symbol("Color").unwrap().kind, SymbolKind::Enum);
        assert_eq!(file.symbol("Config").unwrap().kind, SymbolKind::ModuleBlock);
    }

    #[test]
    fn test_destructured_variables_bind_each_identifier() {
        let file = extract("export const { host, port: boundPort } = loadConfig();");
        assert!(file.exports.contains_key("host"));
        assert!(file.exports.contains_key("boundPort"));
        assert!(!file.exports.contains_key("port"));
    }

    #[test]
    fn test_documentation_attaches_through_export_wrapper() {
        let file = extract("/** Fetches one user. */\nexport function fetchUser() {}");
        let symbol = file.symbol("fetchUser").unwrap();
        assert_eq!(symbol.documentation.as_ref(), "Fetches one user.");
    }
}
