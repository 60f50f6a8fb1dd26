//! Grammar resolution and loading.
//!
//! A grammar is a compiled tree-sitter language definition. Grammars are
//! resolved from module identifiers (typically shared-library paths) through
//! a [`GrammarProvider`]: either real `dlopen`-style loading via
//! [`SharedLibraryGrammars`], or the statically linked [`BuiltinGrammars`]
//! table, which accepts the same identifiers without touching the
//! filesystem.

use std::collections::HashMap;
use std::path::Path;

use libloading::Library;
use thiserror::Error;
use tree_sitter::{ffi, Language};

/// Errors that can occur while resolving a grammar. All of them abort
/// construction of the lexer that requested the grammar.
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("Cannot open parser: {0}")]
    Load(String),

    #[error("Cannot find parser symbol: {0}")]
    MissingSymbol(String),

    #[error("Cannot use parser: {0}")]
    Incompatible(String),
}

/// An owned grammar handle.
///
/// For dynamically loaded grammars this also owns the originating shared
/// library, keeping it mapped for as long as the language handle is alive.
pub struct Grammar {
    language: Language,
    _module: Option<Library>,
}

impl Grammar {
    /// Wraps an already-linked language.
    pub fn from_language(language: Language) -> Self {
        Self {
            language,
            _module: None,
        }
    }

    pub fn language(&self) -> &Language {
        &self.language
    }
}

/// Resolves a module identifier to a loaded grammar.
pub trait GrammarProvider {
    fn resolve(&self, path: &str) -> Result<Grammar, GrammarError>;
}

/// Derives the factory symbol name for a parser module path: the file stem,
/// with an optional leading `lib` stripped and `-` replaced by `_`.
///
/// `/usr/lib/libtree-sitter-c.so` and `tree-sitter-c` both yield
/// `tree_sitter_c`.
pub fn symbol_name(path: &str) -> String {
    let stem = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path);
    let stem = stem.strip_prefix("lib").unwrap_or(stem);
    stem.replace('-', "_")
}

type LanguageFactory = unsafe extern "C" fn() -> *const ffi::TSLanguage;

/// Loads grammars from shared libraries.
///
/// Each module must export a zero-argument factory named after its
/// normalized stem (see [`symbol_name`]) that returns a `TSLanguage`
/// pointer, the convention tree-sitter parser builds follow.
#[derive(Debug, Default)]
pub struct SharedLibraryGrammars;

impl GrammarProvider for SharedLibraryGrammars {
    fn resolve(&self, path: &str) -> Result<Grammar, GrammarError> {
        // Loading a module runs its initializers; looking up and calling the
        // factory executes arbitrary code from that module. Callers vouch for
        // the path list they hand to the lexer.
        let module =
            unsafe { Library::new(path) }.map_err(|_| GrammarError::Load(path.to_string()))?;
        let name = symbol_name(path);
        let language = unsafe {
            let factory = module
                .get::<LanguageFactory>(name.as_bytes())
                .map_err(|_| GrammarError::MissingSymbol(name.clone()))?;
            Language::from_raw(factory())
        };
        Ok(Grammar {
            language,
            _module: Some(module),
        })
    }
}

/// Statically linked grammars, keyed by factory symbol name.
///
/// This is the plugin-registry twin of [`SharedLibraryGrammars`]: the same
/// path identifiers resolve through the same name derivation, so
/// `"tree-sitter-rust"` and `"/lib/libtree-sitter-rust.so"` both map to
/// `tree_sitter_rust`, except the language comes from a grammar crate
/// compiled into the binary.
pub struct BuiltinGrammars {
    languages: HashMap<&'static str, Language>,
}

impl BuiltinGrammars {
    pub fn new() -> Self {
        let mut languages = HashMap::new();
        languages.insert("tree_sitter_rust", tree_sitter_rust::LANGUAGE.into());
        languages.insert("tree_sitter_c", tree_sitter_c::LANGUAGE.into());
        languages.insert("tree_sitter_cpp", tree_sitter_cpp::LANGUAGE.into());
        languages.insert(
            "tree_sitter_javascript",
            tree_sitter_javascript::LANGUAGE.into(),
        );
        languages.insert("tree_sitter_json", tree_sitter_json::LANGUAGE.into());
        Self { languages }
    }
}

impl Default for BuiltinGrammars {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarProvider for BuiltinGrammars {
    fn resolve(&self, path: &str) -> Result<Grammar, GrammarError> {
        let name = symbol_name(path);
        self.languages
            .get(name.as_str())
            .cloned()
            .map(Grammar::from_language)
            .ok_or(GrammarError::MissingSymbol(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_name_strips_lib_prefix_and_extension() {
        assert_eq!(symbol_name("/usr/lib/libtree-sitter-c.so"), "tree_sitter_c");
        assert_eq!(symbol_name("libtree-sitter-cpp.dll"), "tree_sitter_cpp");
    }

    #[test]
    fn test_symbol_name_without_lib_prefix() {
        assert_eq!(symbol_name("tree-sitter-rust.so"), "tree_sitter_rust");
        assert_eq!(symbol_name("tree-sitter-rust"), "tree_sitter_rust");
    }

    #[test]
    fn test_symbol_name_lib_only_in_prefix_position() {
        // "lib" inside the name must survive.
        assert_eq!(symbol_name("my-liberal-parser.so"), "my_liberal_parser");
    }

    #[test]
    fn test_builtin_resolves_known_grammars() {
        let grammars = BuiltinGrammars::new();
        for path in [
            "tree-sitter-rust",
            "/opt/parsers/libtree-sitter-c.so",
            "tree-sitter-json",
        ] {
            assert!(grammars.resolve(path).is_ok(), "should resolve '{}'", path);
        }
    }

    #[test]
    fn test_builtin_unknown_grammar_reports_symbol() {
        let grammars = BuiltinGrammars::new();
        let err = grammars
            .resolve("libtree-sitter-klingon.so")
            .err()
            .expect("resolution should fail");
        assert_eq!(
            err.to_string(),
            "Cannot find parser symbol: tree_sitter_klingon"
        );
    }

    #[test]
    fn test_shared_library_load_failure_reports_path() {
        let err = SharedLibraryGrammars
            .resolve("/nonexistent/libtree-sitter-c.so")
            .err()
            .expect("resolution should fail");
        assert_eq!(
            err.to_string(),
            "Cannot open parser: /nonexistent/libtree-sitter-c.so"
        );
    }
}
