//! Programming language definitions and detection.
//!
//! Maps file extensions to the tree-sitter grammars bundled with the enhancer.

use std::path::Path;

use tree_sitter::Language as Grammar;

/// Languages with a bundled tree-sitter grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    TypeScript,
    TypeScriptReact,
    Python,
    Go,
    Rust,
    Java,
    C,
    Cpp,
    Ruby,
}

impl Language {
    /// Detect the language of a path from its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        Self::from_extension(&ext)
    }

    /// Detect the language from an extension, with or without the leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let lang = match ext.trim_start_matches('.') {
            "js" | "jsx" | "es6" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "mts" | "cts" => Language::TypeScript,
            "tsx" => Language::TypeScriptReact,
            "py" | "pyi" => Language::Python,
            "go" => Language::Go,
            "rs" => Language::Rust,
            "java" => Language::Java,
            "c" | "h" => Language::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hh" => Language::Cpp,
            "rb" => Language::Ruby,
            _ => return None,
        };
        Some(lang)
    }

    /// The tree-sitter grammar for this language.
    pub fn grammar(&self) -> Grammar {
        match self {
            Language::JavaScript => tree_sitter_javascript::language(),
            Language::TypeScript => tree_sitter_typescript::language_typescript(),
            Language::TypeScriptReact => tree_sitter_typescript::language_tsx(),
            Language::Python => tree_sitter_python::language(),
            Language::Go => tree_sitter_go::language(),
            Language::Rust => tree_sitter_rust::language(),
            Language::Java => tree_sitter_java::language(),
            Language::C => tree_sitter_c::language(),
            Language::Cpp => tree_sitter_cpp::language(),
            Language::Ruby => tree_sitter_ruby::language(),
        }
    }

    /// Get a string representation of the language.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::TypeScriptReact => "tsx",
            Language::Python => "python",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Ruby => "ruby",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_from_path() {
        assert_eq!(Language::from_path(Path::new("lib/app.es6")), Some(Language::JavaScript));
        assert_eq!(Language::from_path(Path::new("src/main.RS")), Some(Language::Rust));
        assert_eq!(Language::from_path(Path::new("ui/View.tsx")), Some(Language::TypeScriptReact));
        assert_eq!(Language::from_path(Path::new("README.md")), None);
        assert_eq!(Language::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_extension_with_dot() {
        assert_eq!(Language::from_extension(".py"), Some(Language::Python));
        assert_eq!(Language::from_extension("hpp"), Some(Language::Cpp));
    }
}
