//! Dependency discovery.
//!
//! Walks one symbol's declaration subtree and classifies every identifier
//! occurrence: member accesses and locals are skipped, references that
//! resolve to other symbols emit fully-qualified dependency ids. Walker
//! state (visited set, local-name sets) is explicit and scoped to one
//! symbol's analysis.

use crate::config::AnalysisConfig;
use crate::parsing::check_recursion_depth;
use crate::parsing::resolution::{FileScope, Resolution};
use crate::parsing::typescript::{is_property_position, is_type_position, node_text};
use crate::types::{ImportStyle, QualifiedId, SymbolKind, SymbolOrigin};
use std::collections::{BTreeSet, HashSet};
use tree_sitter::Node;

pub struct DependencyResolver<'a, 's> {
    code: &'a str,
    scope: &'a FileScope<'s>,
    options: &'a AnalysisConfig,
}

struct WalkState<'a> {
    symbol_id: &'a QualifiedId,
    symbol_name: &'a str,
    /// Names that shadow any outer reference within this subtree.
    local_functions: HashSet<String>,
    local_variables: HashSet<String>,
    visited: HashSet<usize>,
    deps: BTreeSet<QualifiedId>,
}

impl<'a, 's> DependencyResolver<'a, 's> {
    pub fn new(code: &'a str, scope: &'a FileScope<'s>, options: &'a AnalysisConfig) -> Self {
        Self {
            code,
            scope,
            options,
        }
    }

    /// Compute the dependency set for one symbol's declaration subtree.
    pub fn dependencies_of(&self, symbol_id: &QualifiedId, decl: Node) -> BTreeSet<QualifiedId> {
        let (local_functions, local_variables) = self.collect_local_names(decl);
        let mut state = WalkState {
            symbol_id,
            symbol_name: symbol_id.name(),
            local_functions,
            local_variables,
            visited: HashSet::new(),
            deps: BTreeSet::new(),
        };
        self.scan(decl, 0, &mut state);
        tracing::trace!(
            "[resolver] {} -> {} dependencies",
            symbol_id,
            state.deps.len()
        );
        state.deps
    }

    /// Local scope names: parameters of enclosing function-likes, variable
    /// declarations within the subtree, and inner function declaration
    /// names, kept as two disjoint sets.
    fn collect_local_names(&self, root: Node) -> (HashSet<String>, HashSet<String>) {
        let mut functions = HashSet::new();
        let mut variables = HashSet::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match node.kind() {
                "function_declaration" | "generator_function_declaration"
                    if node.id() != root.id() =>
                {
                    if let Some(name) = node.child_by_field_name("name") {
                        functions.insert(node_text(name, self.code).to_string());
                    }
                }
                "variable_declarator" if node.id() != root.id() => {
                    if let Some(name) = node.child_by_field_name("name") {
                        variables.extend(super::pattern_identifiers(name, self.code));
                    }
                }
                "required_parameter" | "optional_parameter" => {
                    if let Some(pattern) = node.child_by_field_name("pattern") {
                        variables.extend(super::pattern_identifiers(pattern, self.code));
                    }
                }
                "arrow_function" => {
                    // Single unparenthesized parameter: `x => …`
                    if let Some(parameter) = node.child_by_field_name("parameter") {
                        variables.extend(super::pattern_identifiers(parameter, self.code));
                    }
                }
                "catch_clause" => {
                    if let Some(parameter) = node.child_by_field_name("parameter") {
                        variables.extend(super::pattern_identifiers(parameter, self.code));
                    }
                }
                // `for (const x of …)` binds without a declarator node.
                "for_in_statement" => {
                    if let Some(left) = node.child_by_field_name("left") {
                        variables.extend(super::pattern_identifiers(left, self.code));
                    }
                }
                _ => {}
            }
            for i in 0..node.named_child_count() {
                if let Some(child) = node.named_child(i as u32) {
                    stack.push(child);
                }
            }
        }
        (functions, variables)
    }

    fn scan(&self, node: Node, depth: usize, state: &mut WalkState) {
        if !check_recursion_depth(depth, node) {
            return;
        }
        if !state.visited.insert(node.id()) {
            return;
        }
        if matches!(
            node.kind(),
            "identifier" | "type_identifier" | "shorthand_property_identifier"
        ) {
            self.classify_reference(node, state);
            return;
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.scan(child, depth + 1, state);
        }
    }

    fn classify_reference(&self, node: Node, state: &mut WalkState) {
        // The property position of a member access never names a top-level
        // symbol.
        if is_property_position(node) {
            return;
        }
        let name = node_text(node, self.code);

        // Parameters and locals shadow any outer reference.
        if state.local_functions.contains(name) || state.local_variables.contains(name) {
            return;
        }

        let Some(resolution) = self.scope.resolve(name) else {
            return;
        };

        // Self-reference through any ancestor chain.
        if matches!(resolution, Resolution::TopLevel { .. }) && name == state.symbol_name {
            return;
        }

        // Declarations used purely as types carry no runtime cost; drop the
        // edge unless the policy says to follow them. Type references from
        // value positions (`new C()`, `C.member`) pass through.
        if !self.options.follow_type_only_imports && is_type_position(node) {
            match resolution {
                Resolution::TopLevel { kind }
                    if matches!(
                        kind,
                        SymbolKind::Interface | SymbolKind::TypeAlias | SymbolKind::Class
                    ) =>
                {
                    return;
                }
                // The importing file cannot see the remote declaration's
                // kind; a type-position site is treated as type-only.
                Resolution::Imported(_) => return,
                _ => {}
            }
        }

        match self.scope.origin(resolution) {
            SymbolOrigin::System if !self.options.include_system_symbols => return,
            SymbolOrigin::ThirdParty if !self.options.include_node_modules => return,
            _ => {}
        }

        let namespace_member = match resolution {
            Resolution::Imported(import) if import.style == ImportStyle::Namespace => {
                self.member_read_through(node)
            }
            _ => None,
        };

        let Some(id) =
            self.scope
                .dependency_id(name, resolution, namespace_member.as_deref())
        else {
            return;
        };
        if id != *state.symbol_id {
            state.deps.insert(id);
        }
    }

    /// For `ns.member` where `node` is the object position, the member
    /// names the export being read.
    fn member_read_through(&self, node: Node) -> Option<String> {
        let parent = node.parent()?;
        if parent.kind() != "member_expression" {
            return None;
        }
        let object = parent.child_by_field_name("object")?;
        if object.id() != node.id() {
            return None;
        }
        let property = parent.child_by_field_name("property")?;
        Some(node_text(property, self.code).to_string())
    }
}
