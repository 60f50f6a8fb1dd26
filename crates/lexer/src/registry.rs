//! Language slot registry.
//!
//! The lexer owns one slot per registered grammar: the grammar handle, a
//! parser bound to it, and the slot's compiled query (unset until assigned).
//! Slots keep their registration order, which is the layering order during
//! lexing.

use tree_sitter::Parser;

use crate::grammar::{Grammar, GrammarError, GrammarProvider};
use crate::query::CompiledQuery;

pub(crate) struct LanguageSlot {
    pub(crate) grammar: Grammar,
    pub(crate) parser: Parser,
    pub(crate) query: Option<CompiledQuery>,
}

impl LanguageSlot {
    fn new(grammar: Grammar) -> Result<Self, GrammarError> {
        let mut parser = Parser::new();
        parser
            .set_language(grammar.language())
            .map_err(|e| GrammarError::Incompatible(e.to_string()))?;
        Ok(Self {
            grammar,
            parser,
            query: None,
        })
    }
}

/// Builds the ordered slot list from a `;`-separated module path list.
///
/// Empty segments are skipped. The first resolution failure aborts the
/// whole registry; slots built so far are released as the partial list is
/// dropped.
pub(crate) fn build_slots(
    paths: &str,
    provider: &dyn GrammarProvider,
) -> Result<Vec<LanguageSlot>, GrammarError> {
    let mut slots = Vec::new();
    for path in paths.split(';').filter(|p| !p.is_empty()) {
        let grammar = provider.resolve(path)?;
        slots.push(LanguageSlot::new(grammar)?);
    }
    Ok(slots)
}
