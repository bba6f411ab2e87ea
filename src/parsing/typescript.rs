//! TypeScript parser wrapper.
//!
//! Wraps the tree-sitter TypeScript grammar and exposes the operations the
//! extraction core needs: parsing, node predicates, source locations,
//! display type text, and JSDoc extraction.
//!
//! The grammar already separates the identifier classes the resolver cares
//! about: value references parse as `identifier`, type references as
//! `type_identifier`, and member accesses as `property_identifier`.

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::SourceLocation;
use std::path::Path;
use tree_sitter::{Language, Node, Parser, Tree};

pub struct TypeScriptParser {
    parser: Parser,
}

impl TypeScriptParser {
    pub fn new() -> Result<Self, String> {
        let mut parser = Parser::new();
        let language: Language = tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into();
        parser
            .set_language(&language)
            .map_err(|e| format!("Failed to set TypeScript language: {e}"))?;
        Ok(Self { parser })
    }

    /// Parse one source file. A parser-level failure is fatal for this file
    /// only; syntax errors inside an otherwise parsed tree are surfaced as
    /// diagnostics by the analyzer instead.
    pub fn parse(&mut self, code: &str, path: &Path) -> AnalysisResult<Tree> {
        self.parser
            .parse(code, None)
            .ok_or_else(|| AnalysisError::CheckerError {
                path: path.to_path_buf(),
                reason: "parser returned no tree".to_string(),
            })
    }
}

/// Slice the source text of a node.
#[inline]
pub fn node_text<'a>(node: Node, code: &'a str) -> &'a str {
    &code[node.byte_range()]
}

pub fn location_of(node: Node) -> SourceLocation {
    let start = node.start_position();
    SourceLocation::new(
        node.start_byte() as u32,
        node.end_byte() as u32,
        start.row as u32 + 1,
        start.column as u16,
    )
}

pub fn is_function_like(node: Node) -> bool {
    matches!(
        node.kind(),
        "function_declaration"
            | "generator_function_declaration"
            | "function_expression"
            | "function"
            | "generator_function"
            | "arrow_function"
            | "method_definition"
    )
}

pub fn is_function_literal(node: Node) -> bool {
    matches!(
        node.kind(),
        "arrow_function" | "function_expression" | "function" | "generator_function"
    )
}

/// True when `node` sits in a syntactic location where only a type
/// expression is legal.
///
/// Named type references parse as `type_identifier`, which decides most
/// cases directly. A `typeof X` query names a value even though it appears
/// inside a type, so the ancestor scan stops there.
pub fn is_type_position(node: Node) -> bool {
    if node.kind() == "type_identifier" {
        return true;
    }
    let mut current = node;
    while let Some(parent) = current.parent() {
        match parent.kind() {
            "type_query" => return false,
            "type_annotation"
            | "type_arguments"
            | "type_parameters"
            | "constraint"
            | "default_type"
            | "extends_type_clause"
            | "implements_clause" => return true,
            // Statement and expression boundaries end the scan.
            "statement_block" | "program" | "expression_statement" => return false,
            _ => current = parent,
        }
    }
    false
}

/// True when `node` is the property position of a member access
/// (the right of `.`), which never names a top-level symbol.
pub fn is_property_position(node: Node) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    match parent.kind() {
        "member_expression" => parent
            .child_by_field_name("property")
            .is_some_and(|p| p.id() == node.id()),
        // In `A.B` type paths only the leftmost segment is a reference.
        "nested_identifier" | "nested_type_identifier" => parent
            .child(0)
            .is_none_or(|first| first.id() != node.id()),
        _ => false,
    }
}

/// Text of a declared type annotation, without the leading `:`.
pub fn annotation_text(node: Node, code: &str) -> Option<String> {
    let annotation = node.child_by_field_name("type")?;
    let text = node_text(annotation, code);
    Some(text.trim_start_matches(':').trim().to_string())
}

/// Display signature for a callable: the header up to the body.
pub fn callable_signature(node: Node, code: &str) -> String {
    let end = node
        .child_by_field_name("body")
        .map(|b| b.start_byte())
        .unwrap_or_else(|| node.end_byte());
    let raw = &code[node.start_byte()..end];
    collapse_whitespace(raw.trim().trim_end_matches("=>").trim_end())
}

/// JSDoc block immediately preceding a statement, cleaned of markers.
pub fn jsdoc_for(node: Node, code: &str) -> Option<String> {
    let prev = node.prev_named_sibling()?;
    if prev.kind() != "comment" {
        return None;
    }
    let raw = node_text(prev, code);
    if !raw.starts_with("/**") {
        return None;
    }
    Some(clean_jsdoc(raw))
}

/// Collect syntax-error locations from a parsed tree, capped so a badly
/// broken file cannot flood diagnostics.
pub fn syntax_errors(tree: &Tree, max: usize) -> Vec<SourceLocation> {
    let mut errors = Vec::new();
    let mut stack = vec![tree.root_node()];
    while let Some(node) = stack.pop() {
        if errors.len() >= max {
            break;
        }
        if node.is_error() || node.is_missing() {
            errors.push(location_of(node));
            continue;
        }
        if !node.has_error() {
            continue;
        }
        for i in (0..node.child_count()).rev() {
            if let Some(child) = node.child(i as u32) {
                stack.push(child);
            }
        }
    }
    errors
}

fn clean_jsdoc(raw: &str) -> String {
    let body = raw
        .trim_start_matches("/**")
        .trim_end_matches("*/")
        .trim();
    body.lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
