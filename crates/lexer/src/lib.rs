//! Query-driven syntax lexing over tree-sitter grammars.
//!
//! A [`TreeSitterLexer`] is configured with a `;`-separated list of parser
//! module paths, one highlight query per resulting language slot, and an
//! optional capture-name-to-style mapping. Each lexing pass re-parses the
//! buffer with every slot's grammar, runs the slot's query, and merges the
//! captures into sorted, non-overlapping style runs written through the
//! [`tslexia_buffer::Document`] sink.
//!
//! ```no_run
//! use tslexia_buffer::StyledBuffer;
//! use tslexia_lexer::TreeSitterLexer;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut lexer = TreeSitterLexer::new("/usr/lib/libtree-sitter-c.so")?;
//! lexer.set_query(0, "(primitive_type) @keyword (number_literal) @number")?;
//!
//! let mut buffer = StyledBuffer::new("int x = 42;");
//! let length = buffer.text().len();
//! lexer.lex(0, length, &mut buffer);
//! # Ok(())
//! # }
//! ```

mod grammar;
mod lexer;
mod predicate;
mod query;
mod registry;
mod styles;

pub use grammar::{
    symbol_name, BuiltinGrammars, Grammar, GrammarError, GrammarProvider, SharedLibraryGrammars,
};
pub use lexer::{TreeSitterLexer, LEXER_ERROR_KEY, NO_RELEX};
pub use query::{QueryErrorClass, QuerySetError};
pub use styles::CaptureStyles;

/// Name this lexer registers under.
pub const LEXER_NAME: &str = "tree-sitter";

/// Namespace the lexer's styles are published under.
pub const NAMESPACE: &str = "tree-sitter";

/// Number of lexers this library provides.
pub fn lexer_count() -> usize {
    1
}

/// Name of the lexer at `index`, if any.
pub fn lexer_name(index: usize) -> Option<&'static str> {
    (index == 0).then_some(LEXER_NAME)
}

/// Creates the lexer by name-independent factory convention: `paths` is the
/// `;`-separated parser module list.
pub fn create_lexer(paths: &str) -> Result<TreeSitterLexer, GrammarError> {
    TreeSitterLexer::new(paths)
}
