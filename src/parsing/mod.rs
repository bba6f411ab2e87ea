//! Parser boundary.
//!
//! The core consumes a typed syntax tree through this module: a tree-sitter
//! TypeScript wrapper, node predicates, path/file-key normalization, and the
//! file-scope binder that resolves identifiers to their declarations.

pub mod paths;
pub mod resolution;
pub mod typescript;

pub use paths::{file_key_of, is_declaration_file, is_supported_source, normalize_specifier};
pub use resolution::{FileScope, Resolution};
pub use typescript::TypeScriptParser;

use tree_sitter::Node;

/// Maximum recursion depth for tree traversal.
///
/// Protects against pathologically nested sources (large array initializers,
/// deeply chained calls). When the limit is reached the subtree is skipped.
pub const MAX_AST_DEPTH: usize = 500;

/// Check whether it is safe to recurse further.
#[inline]
pub fn check_recursion_depth(depth: usize, node: Node) -> bool {
    if depth > MAX_AST_DEPTH {
        tracing::warn!(
            "maximum tree depth ({}) exceeded at {}:{}, skipping subtree",
            MAX_AST_DEPTH,
            node.start_position().row + 1,
            node.start_position().column + 1
        );
        return false;
    }
    true
}
