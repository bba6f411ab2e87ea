//! Path normalization for file keys and module specifiers.

use std::path::{Component, Path};

const SOURCE_EXTENSIONS: &[&str] = &[".tsx", ".ts", ".jsx", ".js"];

/// Derive the file key for a project file: the basename without its source
/// extension. `src/api/user.ts` and `user.tsx` both key as `user`.
///
/// Known weakness: two files with the same basename in different directories
/// collide. The id grammar (`file_key ":" name`) is preserved so a
/// project-relative upgrade stays additive.
pub fn file_key_of(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    strip_source_extension(&name)
}

/// Normalize a module specifier as written in an import statement.
///
/// Relative specifiers are joined onto the importing file's directory and
/// reduced to their final path component, with the source extension
/// stripped; absolute and bare specifiers pass through unchanged. This is
/// the sole cross-file linkage mechanism.
pub fn normalize_specifier(importing_file: &Path, specifier: &str) -> String {
    if !specifier.starts_with('.') {
        return specifier.to_string();
    }

    let dir = importing_file.parent().unwrap_or_else(|| Path::new(""));
    let joined = dir.join(specifier);

    // Logical normalization only: pop on `..`, no filesystem access.
    let mut parts: Vec<String> = Vec::new();
    for component in joined.components() {
        match component {
            Component::Normal(c) => parts.push(c.to_string_lossy().into_owned()),
            Component::ParentDir => {
                parts.pop();
            }
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => parts.clear(),
        }
    }

    match parts.last() {
        Some(last) => strip_source_extension(last),
        None => specifier.to_string(),
    }
}

/// True for declaration-only files (`.d.ts`), which the analyzer skips.
pub fn is_declaration_file(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".d.ts")
}

/// True for files the walker should feed to the analyzer.
pub fn is_supported_source(path: &Path) -> bool {
    if is_declaration_file(path) {
        return false;
    }
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("ts" | "tsx")
    )
}

fn strip_source_extension(name: &str) -> String {
    let base = name.strip_suffix(".d.ts").unwrap_or(name);
    for ext in SOURCE_EXTENSIONS {
        if let Some(stripped) = base.strip_suffix(ext) {
            return stripped.to_string();
        }
    }
    base.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_key_strips_extension() {
        assert_eq!(file_key_of(Path::new("src/api/user.ts")), "user");
        assert_eq!(file_key_of(Path::new("button.tsx")), "button");
        assert_eq!(file_key_of(Path::new("lib/global.d.ts")), "global");
    }

    #[test]
    fn test_normalize_relative_specifier() {
        let from = Path::new("src/api/index.ts");
        assert_eq!(normalize_specifier(from, "./types"), "types");
        assert_eq!(normalize_specifier(from, "../utils/format.ts"), "format");
        assert_eq!(normalize_specifier(from, "./nested/deep/helper"), "helper");
    }

    #[test]
    fn test_bare_specifier_passes_through() {
        let from = Path::new("src/index.ts");
        assert_eq!(normalize_specifier(from, "react"), "react");
        assert_eq!(normalize_specifier(from, "@scope/pkg"), "@scope/pkg");
    }

    #[test]
    fn test_declaration_files_detected() {
        assert!(is_declaration_file(Path::new("types/global.d.ts")));
        assert!(!is_declaration_file(Path::new("types/global.ts")));
    }

    #[test]
    fn test_supported_sources() {
        assert!(is_supported_source(Path::new("a.ts")));
        assert!(is_supported_source(Path::new("a.tsx")));
        assert!(!is_supported_source(Path::new("a.d.ts")));
        assert!(!is_supported_source(Path::new("a.rs")));
    }
}
