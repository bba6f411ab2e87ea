use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Canonical identity of a symbol across the project: `file_key ":" name`.
///
/// The file-key portion must not contain `:`, so the first colon always
/// separates the two parts. Construction enforces this; ids read back from
/// serialized reports are trusted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualifiedId(Box<str>);

impl QualifiedId {
    pub fn new(file_key: &str, name: &str) -> Option<Self> {
        if file_key.is_empty() || name.is_empty() || file_key.contains(':') {
            return None;
        }
        Some(Self(format!("{file_key}:{name}").into()))
    }

    /// Parse an id in `file_key:name` form, splitting at the first colon.
    pub fn parse(id: &str) -> Option<Self> {
        let (file_key, name) = id.split_once(':')?;
        Self::new(file_key, name)
    }

    pub fn file_key(&self) -> &str {
        // Constructor guarantees the colon is present.
        self.0.split_once(':').map(|(f, _)| f).unwrap_or(&self.0)
    }

    pub fn name(&self) -> &str {
        self.0.split_once(':').map(|(_, n)| n).unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QualifiedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Byte span of a node in the parsed tree. Used as the opaque declaration
/// handle: the dependency walk re-locates the node from this span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub start_byte: u32,
    pub end_byte: u32,
    pub line: u32,
    pub column: u16,
}

impl SourceLocation {
    pub fn new(start_byte: u32, end_byte: u32, line: u32, column: u16) -> Self {
        Self {
            start_byte,
            end_byte,
            line,
            column,
        }
    }
}

/// Storage kind of a top-level declaration.
///
/// Variables keep the declaring keyword as their storage kind; a variable
/// whose initializer is a function literal is reported as a function by
/// [`crate::Symbol::classified_kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymbolKind {
    TypeAlias,
    Interface,
    Class,
    Enum,
    Function,
    Const,
    Let,
    Var,
    ModuleBlock,
}

impl SymbolKind {
    /// True for declarations that exist purely in type space.
    pub fn is_type_like(self) -> bool {
        matches!(self, Self::TypeAlias | Self::Interface)
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TypeAlias => "type-alias",
            Self::Interface => "interface",
            Self::Class => "class",
            Self::Enum => "enum",
            Self::Function => "function",
            Self::Const => "const",
            Self::Let => "let",
            Self::Var => "var",
            Self::ModuleBlock => "module-block",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStyle {
    Default,
    Named,
    Namespace,
}

impl fmt::Display for ImportStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Default => "default",
            Self::Named => "named",
            Self::Namespace => "namespace",
        };
        f.write_str(s)
    }
}

/// Where a resolved declaration lives, per the compiler roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolOrigin {
    /// Under the standard-library root (ambient globals).
    System,
    /// Under the external-dependency root (bare module specifiers).
    ThirdParty,
    /// Everything else.
    Project,
}

/// Cooperative cancellation signal, checked between files and between
/// DFS roots. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_id_parts() {
        let id = QualifiedId::new("utils", "formatUserName").unwrap();
        assert_eq!(id.file_key(), "utils");
        assert_eq!(id.name(), "formatUserName");
        assert_eq!(id.as_str(), "utils:formatUserName");
    }

    #[test]
    fn test_qualified_id_rejects_colon_in_file_key() {
        assert!(QualifiedId::new("a:b", "x").is_none());
        assert!(QualifiedId::new("", "x").is_none());
        assert!(QualifiedId::new("a", "").is_none());
    }

    #[test]
    fn test_qualified_id_parse_splits_at_first_colon() {
        let id = QualifiedId::parse("utils:helper").unwrap();
        assert_eq!(id.file_key(), "utils");
        assert_eq!(id.name(), "helper");
        assert!(QualifiedId::parse("no-colon").is_none());
    }

    #[test]
    fn test_qualified_id_ordering_is_lexicographic() {
        let a = QualifiedId::parse("a:z").unwrap();
        let b = QualifiedId::parse("b:a").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_symbol_kind_display() {
        assert_eq!(SymbolKind::TypeAlias.to_string(), "type-alias");
        assert_eq!(SymbolKind::ModuleBlock.to_string(), "module-block");
        assert_eq!(SymbolKind::Const.to_string(), "const");
    }

    #[test]
    fn test_cancellation_token_is_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
