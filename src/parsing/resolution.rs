//! File-scope name resolution.
//!
//! Resolution order for an identifier that survived the local-scope checks:
//! imported names, then the file's own top-level declarations, then ambient
//! globals. Names that resolve nowhere are skipped by the dependency walk.

use crate::symbol::Import;
use crate::types::{QualifiedId, SymbolKind, SymbolOrigin};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Ambient globals standing in for the standard-library root. References to
/// these classify as system symbols and are rejected unless
/// `include_system_symbols` is set.
const AMBIENT_GLOBALS: &[&str] = &[
    "console", "Math", "JSON", "Object", "Array", "String", "Number", "Boolean", "Date", "RegExp",
    "Error", "TypeError", "RangeError", "SyntaxError", "Promise", "Map", "Set", "WeakMap",
    "WeakSet", "Symbol", "Reflect", "Proxy", "Intl", "globalThis", "undefined", "NaN", "Infinity",
    "parseInt", "parseFloat", "isNaN", "isFinite", "encodeURIComponent", "decodeURIComponent",
    "structuredClone", "setTimeout", "clearTimeout", "setInterval", "clearInterval",
    "queueMicrotask", "fetch", "URL", "URLSearchParams", "TextEncoder", "TextDecoder",
    "AbortController", "AbortSignal", "Buffer", "process", "require", "module", "__dirname",
    "__filename",
];

/// What a name resolved to within one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// A top-level declaration of the current file.
    TopLevel { kind: SymbolKind },
    /// A name introduced by an import statement.
    Imported(&'a Import),
    /// An ambient standard-library global.
    Ambient,
}

/// Per-file resolution context: the file's top-level declarations plus its
/// import translation table.
pub struct FileScope<'a> {
    file_key: &'a str,
    top_level: HashMap<&'a str, SymbolKind>,
    imports: &'a IndexMap<Box<str>, Import>,
}

impl<'a> FileScope<'a> {
    pub fn new(
        file_key: &'a str,
        top_level: impl IntoIterator<Item = (&'a str, SymbolKind)>,
        imports: &'a IndexMap<Box<str>, Import>,
    ) -> Self {
        Self {
            file_key,
            top_level: top_level.into_iter().collect(),
            imports,
        }
    }

    pub fn file_key(&self) -> &str {
        self.file_key
    }

    pub fn resolve(&self, name: &str) -> Option<Resolution<'a>> {
        if let Some(import) = self.imports.get(name) {
            return Some(Resolution::Imported(import));
        }
        if let Some(&kind) = self.top_level.get(name) {
            return Some(Resolution::TopLevel { kind });
        }
        if AMBIENT_GLOBALS.contains(&name) {
            return Some(Resolution::Ambient);
        }
        None
    }

    /// Classify a resolution by owning root: standard library, external
    /// dependency, or project.
    pub fn origin(&self, resolution: Resolution<'_>) -> SymbolOrigin {
        match resolution {
            Resolution::Ambient => SymbolOrigin::System,
            Resolution::TopLevel { .. } => SymbolOrigin::Project,
            Resolution::Imported(import) => {
                if is_bare_specifier(&import.from_module) {
                    SymbolOrigin::ThirdParty
                } else {
                    SymbolOrigin::Project
                }
            }
        }
    }

    /// Compute the dependency id for a resolved reference.
    ///
    /// Imported names map to `<normalized module>:<original name>`, which
    /// preserves cross-file identity even before the owning file has been
    /// extracted. A member read through a namespace import names the member
    /// itself; a bare namespace reference stands for the whole module (`*`).
    pub fn dependency_id(
        &self,
        name: &str,
        resolution: Resolution<'_>,
        namespace_member: Option<&str>,
    ) -> Option<QualifiedId> {
        match resolution {
            // Ambient declarations live under the standard-library root.
            Resolution::Ambient => QualifiedId::new("lib", name),
            Resolution::TopLevel { .. } => QualifiedId::new(self.file_key, name),
            Resolution::Imported(import) => {
                let exported: &str = match (import.style, namespace_member) {
                    (crate::types::ImportStyle::Namespace, Some(member)) => member,
                    _ => &import.original_name,
                };
                QualifiedId::new(&import.normalized_module, exported)
            }
        }
    }
}

/// Bare specifiers (no leading `.` or `/`) resolve under the
/// external-dependency root.
pub fn is_bare_specifier(specifier: &str) -> bool {
    !specifier.starts_with('.') && !specifier.starts_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImportStyle;

    fn import(local: &str, module: &str, style: ImportStyle, original: &str) -> Import {
        Import {
            local_name: local.into(),
            from_module: module.into(),
            normalized_module: module.trim_start_matches("./").into(),
            style,
            original_name: original.into(),
        }
    }

    fn imports_of(entries: Vec<Import>) -> IndexMap<Box<str>, Import> {
        entries
            .into_iter()
            .map(|i| (i.local_name.clone(), i))
            .collect()
    }

    #[test]
    fn test_resolution_order_imports_before_ambient() {
        let imports = imports_of(vec![import(
            "console",
            "./logger",
            ImportStyle::Named,
            "console",
        )]);
        let scope = FileScope::new("app", [], &imports);
        match scope.resolve("console") {
            Some(Resolution::Imported(i)) => assert_eq!(i.from_module.as_ref(), "./logger"),
            other => panic!("expected import resolution, got {other:?}"),
        }
    }

    #[test]
    fn test_top_level_resolution_and_id() {
        let imports = IndexMap::new();
        let scope = FileScope::new("utils", [("helper", SymbolKind::Function)], &imports);
        let res = scope.resolve("helper").unwrap();
        assert_eq!(scope.origin(res), SymbolOrigin::Project);
        let id = scope.dependency_id("helper", res, None).unwrap();
        assert_eq!(id.as_str(), "utils:helper");
    }

    #[test]
    fn test_named_import_uses_original_name() {
        let imports = imports_of(vec![import("c", "./m", ImportStyle::Named, "b")]);
        let scope = FileScope::new("app", [], &imports);
        let res = scope.resolve("c").unwrap();
        let id = scope.dependency_id("c", res, None).unwrap();
        assert_eq!(id.as_str(), "m:b");
    }

    #[test]
    fn test_namespace_member_names_the_export() {
        let imports = imports_of(vec![import("ns", "./m", ImportStyle::Namespace, "*")]);
        let scope = FileScope::new("app", [], &imports);
        let res = scope.resolve("ns").unwrap();
        assert_eq!(
            scope.dependency_id("ns", res, Some("member")).unwrap().as_str(),
            "m:member"
        );
        assert_eq!(scope.dependency_id("ns", res, None).unwrap().as_str(), "m:*");
    }

    #[test]
    fn test_bare_import_is_third_party() {
        let imports = imports_of(vec![import("useState", "react", ImportStyle::Named, "useState")]);
        let scope = FileScope::new("app", [], &imports);
        let res = scope.resolve("useState").unwrap();
        assert_eq!(scope.origin(res), SymbolOrigin::ThirdParty);
    }

    #[test]
    fn test_ambient_global_is_system() {
        let imports = IndexMap::new();
        let scope = FileScope::new("app", [], &imports);
        let res = scope.resolve("console").unwrap();
        assert_eq!(scope.origin(res), SymbolOrigin::System);
        assert_eq!(
            scope.dependency_id("console", res, None).unwrap().as_str(),
            "lib:console"
        );
    }

    #[test]
    fn test_unknown_name_does_not_resolve() {
        let imports = IndexMap::new();
        let scope = FileScope::new("app", [], &imports);
        assert!(scope.resolve("mystery").is_none());
    }
}
