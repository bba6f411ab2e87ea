use crate::types::{ImportStyle, QualifiedId, SourceLocation, Span, SymbolKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A top-level named declaration.
///
/// Symbols are created during extraction of their owning file and never
/// mutated afterward, except that `dependencies` is filled by the dependency
/// walk and `dependents` is populated once during graph assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: QualifiedId,
    pub name: Box<str>,
    pub kind: SymbolKind,
    /// Variable whose initializer is a function or arrow literal.
    pub function_valued: bool,
    pub type_text: Option<Box<str>>,
    pub documentation: Box<str>,
    pub is_exported: bool,
    pub location: SourceLocation,
    /// Byte span of the declaration node the dependency walk scans. For a
    /// function-valued variable this is the function literal itself.
    pub decl_span: Span,
    pub dependencies: BTreeSet<QualifiedId>,
    pub dependents: BTreeSet<QualifiedId>,
}

impl Symbol {
    pub fn new(id: QualifiedId, kind: SymbolKind, location: SourceLocation, decl_span: Span) -> Self {
        let name = id.name().into();
        Self {
            id,
            name,
            kind,
            function_valued: false,
            type_text: None,
            documentation: "".into(),
            is_exported: false,
            location,
            decl_span,
            dependencies: BTreeSet::new(),
            dependents: BTreeSet::new(),
        }
    }

    pub fn with_type_text(mut self, type_text: impl Into<Box<str>>) -> Self {
        self.type_text = Some(type_text.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<Box<str>>) -> Self {
        self.documentation = doc.into();
        self
    }

    pub fn exported(mut self, is_exported: bool) -> Self {
        self.is_exported = is_exported;
        self
    }

    pub fn function_valued(mut self, function_valued: bool) -> Self {
        self.function_valued = function_valued;
        self
    }

    pub fn file_key(&self) -> &str {
        self.id.file_key()
    }

    /// Kind reported by downstream categorization: a function-valued
    /// variable reads as a function, storage kind stays the keyword.
    pub fn classified_kind(&self) -> SymbolKind {
        if self.function_valued {
            SymbolKind::Function
        } else {
            self.kind
        }
    }

    /// Record a dependency edge. Self-references are dropped here as the
    /// final guard; the resolver also skips them during the walk.
    pub fn add_dependency(&mut self, dep: QualifiedId) {
        if dep != self.id {
            self.dependencies.insert(dep);
        }
    }
}

/// One local name introduced by an import statement. Imports are not
/// symbols; they translate a local identifier to the exporting module and
/// its original name (`default` for default imports, `*` for namespace).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub local_name: Box<str>,
    /// Module specifier as written in the source.
    pub from_module: Box<str>,
    /// File-key form of the specifier (relative specifiers reduced, bare
    /// specifiers passed through).
    pub normalized_module: Box<str>,
    pub style: ImportStyle,
    pub original_name: Box<str>,
}

/// A re-export (`export { x } from 'm'`): recorded for reporting, produces
/// no symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReExport {
    pub exported_name: Box<str>,
    pub original_name: Box<str>,
    pub from_module: Box<str>,
}

/// Per-file extraction result. Map insertion order is observable: report
/// output over these maps is emitted in the order declarations appear.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileSymbols {
    pub file_key: Box<str>,
    pub exports: IndexMap<Box<str>, Symbol>,
    pub internal: IndexMap<Box<str>, Symbol>,
    pub imports: IndexMap<Box<str>, Import>,
    pub reexports: Vec<ReExport>,
}

impl FileSymbols {
    pub fn new(file_key: impl Into<Box<str>>) -> Self {
        Self {
            file_key: file_key.into(),
            ..Self::default()
        }
    }

    /// Route a symbol into `exports` or `internal` by its export flag.
    pub fn insert_symbol(&mut self, symbol: Symbol) {
        let name = symbol.name.clone();
        if symbol.is_exported {
            self.exports.insert(name, symbol);
        } else {
            self.internal.insert(name, symbol);
        }
    }

    pub fn insert_import(&mut self, import: Import) {
        self.imports.insert(import.local_name.clone(), import);
    }

    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.exports.get(name).or_else(|| self.internal.get(name))
    }

    pub fn symbol_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        if let Some(symbol) = self.exports.get_mut(name) {
            return Some(symbol);
        }
        self.internal.get_mut(name)
    }

    /// All symbols the file owns, exports first, each in insertion order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.exports.values().chain(self.internal.values())
    }

    pub fn symbols_mut(&mut self) -> impl Iterator<Item = &mut Symbol> {
        self.exports.values_mut().chain(self.internal.values_mut())
    }

    pub fn symbol_count(&self) -> usize {
        self.exports.len() + self.internal.len()
    }
}
