//! The tree-sitter lexer.
//!
//! One [`TreeSitterLexer`] drives each registered slot's query over a fresh
//! parse of the buffer and merges the resulting capture styling into one
//! ordered, non-overlapping run stream.
//!
//! ## Layering
//!
//! Slots are walked in registration order and bytes are claimed first come,
//! first served: within a layer a per-slot watermark suppresses captures the
//! layer already covered, and across layers a claim set rejects any run that
//! touches a byte an earlier layer styled. A rejected run is dropped whole,
//! never clipped, so the final per-byte styling is reproducible for
//! identical (buffer, query set, style map) inputs.

use std::collections::HashMap;
use std::path::Path;

use streaming_iterator::StreamingIterator;
use tree_sitter::{QueryCursor, Tree};
use tslexia_buffer::{style, Document, StyleRun};

use crate::grammar::{GrammarError, GrammarProvider, SharedLibraryGrammars};
use crate::predicate;
use crate::query::{CompiledQuery, QuerySetError};
use crate::registry::{build_slots, LanguageSlot};
use crate::styles::CaptureStyles;

/// Property key carrying the most recent diagnostic; empty when clean.
pub const LEXER_ERROR_KEY: &str = "lexer.ts.error";

/// Sentinel returned by [`TreeSitterLexer::property_set`]: the document does
/// not need to be re-lexed for the change to take effect.
pub const NO_RELEX: i64 = -1;

/// A query-driven lexer over one or more tree-sitter grammars.
///
/// Each instance owns its slots, capture-style map, and property table, so
/// independent documents can run independent lexers without interference.
/// An instance is single-threaded: the host serializes all calls to it, and
/// buffer bytes are only borrowed for the duration of one call.
pub struct TreeSitterLexer {
    slots: Vec<LanguageSlot>,
    styles: CaptureStyles,
    props: HashMap<String, String>,
}

impl TreeSitterLexer {
    /// Creates a lexer for a `;`-separated list of parser module paths,
    /// loading each module as a shared library.
    ///
    /// Any module that fails to load or export its factory symbol aborts the
    /// whole construction; there is no partially usable lexer.
    pub fn new(paths: &str) -> Result<Self, GrammarError> {
        Self::with_provider(paths, &SharedLibraryGrammars)
    }

    /// Creates a lexer resolving grammar paths through `provider` instead of
    /// the shared-library loader.
    pub fn with_provider(
        paths: &str,
        provider: &dyn GrammarProvider,
    ) -> Result<Self, GrammarError> {
        Ok(Self {
            slots: build_slots(paths, provider)?,
            styles: CaptureStyles::default(),
            props: HashMap::new(),
        })
    }

    /// Number of registered language layers.
    pub fn layer_count(&self) -> usize {
        self.slots.len()
    }

    /// Reads the query file at `path` and assigns it to slot `n`.
    ///
    /// An unreadable file discards the slot's current query, records the
    /// failure in the `lexer.ts.error` property, and leaves every other
    /// slot untouched.
    pub fn set_query_file(
        &mut self,
        n: usize,
        path: impl AsRef<Path>,
    ) -> Result<(), QuerySetError> {
        if n >= self.slots.len() {
            return Err(QuerySetError::InvalidSlot(n));
        }
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(source) => self.set_query(n, &source),
            Err(source) => {
                self.slots[n].query = None;
                let err = QuerySetError::Io {
                    path: path.to_path_buf(),
                    source,
                };
                self.props.insert(LEXER_ERROR_KEY.into(), err.to_string());
                Err(err)
            }
        }
    }

    /// Compiles `source` against slot `n`'s grammar and installs it,
    /// replacing any previous query.
    ///
    /// On success the `lexer.ts.error` property is cleared. On a compile
    /// failure the slot is left without a query (it contributes no captures
    /// until a valid one is set) and the classified error is formatted into
    /// the property. An out-of-range `n` fails without mutating anything.
    pub fn set_query(&mut self, n: usize, source: &str) -> Result<(), QuerySetError> {
        let Some(slot) = self.slots.get_mut(n) else {
            return Err(QuerySetError::InvalidSlot(n));
        };
        slot.query = None;
        match CompiledQuery::new(slot.grammar.language(), source) {
            Ok(query) => {
                slot.query = Some(query);
                self.props.insert(LEXER_ERROR_KEY.into(), String::new());
                Ok(())
            }
            Err(err) => {
                self.props.insert(LEXER_ERROR_KEY.into(), err.to_string());
                Err(err)
            }
        }
    }

    /// Assigns capture name `name` to style number `style`, taking effect on
    /// the next lexing pass. Style numbers above 255 are rejected as a
    /// no-op.
    pub fn set_identifiers(&mut self, style: u32, name: &str) {
        self.styles.set(style, name);
    }

    /// Stores a property. Always succeeds and always reports that no re-lex
    /// is required (returns [`NO_RELEX`]).
    pub fn property_set(&mut self, key: &str, value: &str) -> i64 {
        self.props.insert(key.to_string(), value.to_string());
        NO_RELEX
    }

    /// Returns the stored property value, or the empty string if unset.
    pub fn property_get(&self, key: &str) -> &str {
        self.props.get(key).map(String::as_str).unwrap_or("")
    }

    /// Styles `[start, start + length)` of `doc`.
    ///
    /// The requested range is first set to [`style::DEFAULT`], then the
    /// merged capture runs are written through the sink. Runs claimed near
    /// the range boundary may extend past it; the requested range itself is
    /// always fully covered.
    pub fn lex<D: Document>(&mut self, start: usize, length: usize, doc: &mut D) {
        let runs = self.style_runs(start, length, doc.bytes());
        doc.start_styling(start);
        doc.set_style_for(length, style::DEFAULT);
        for run in &runs {
            doc.start_styling(run.start);
            doc.set_style_for(run.len(), run.style);
        }
    }

    /// Computes the merged style runs for one pass over `text`: sorted by
    /// start offset, pairwise non-overlapping, identical across repeated
    /// calls with unchanged inputs.
    ///
    /// Every slot re-parses the full buffer from scratch; slots without a
    /// query (never set, or whose last compile failed) contribute nothing.
    pub fn style_runs(&mut self, start: usize, length: usize, text: &[u8]) -> Vec<StyleRun> {
        let end = start.saturating_add(length);
        let mut claimed = ClaimSet::new();
        for slot in &mut self.slots {
            let Some(query) = slot.query.as_ref() else {
                continue;
            };
            let Some(tree) = slot.parser.parse(text, None) else {
                continue;
            };
            lex_layer(query, &tree, text, &self.styles, start, end, &mut claimed);
        }
        claimed.into_runs()
    }

    /// Folding is out of scope for this lexer; the host keeps whatever fold
    /// state it already has.
    pub fn fold<D: Document>(&mut self, _start: usize, _length: usize, _doc: &mut D) {}
}

/// Walks one compiled query over one tree, claiming style runs.
///
/// Captures arrive in query execution order: ascending start byte, outermost
/// node first on ties. `watermark` tracks the end of the last byte this
/// layer styled; captures ending at or before it are already covered and are
/// skipped before any predicate work. A capture that fails its predicates or
/// resolves to no style does not advance the watermark, so it cannot shadow
/// a later, larger capture over the same region.
fn lex_layer(
    query: &CompiledQuery,
    tree: &Tree,
    text: &[u8],
    styles: &CaptureStyles,
    start: usize,
    end: usize,
    claimed: &mut ClaimSet,
) {
    let mut cursor = QueryCursor::new();
    let mut captures = cursor.captures(&query.query, tree.root_node(), text);
    let mut watermark = start;
    while let Some((m, capture_idx)) = captures.next() {
        let capture = &m.captures[*capture_idx];
        let range = capture.node.byte_range();
        if range.is_empty() || range.end <= watermark {
            continue;
        }
        if !predicate::match_satisfies(query.pattern_predicates(m.pattern_index), m, text) {
            continue;
        }
        let Some(name) = query.query.capture_names().get(capture.index as usize) else {
            continue;
        };
        let Some(style) = styles.resolve(name) else {
            continue;
        };
        if claimed.claim(range.start, range.end, style) {
            watermark = range.end;
            if watermark >= end {
                break;
            }
        }
    }
}

/// Byte ranges already claimed by emitted runs, across all layers of one
/// pass, kept sorted and non-overlapping. A claim takes its whole range or
/// nothing; partial overlaps are never clipped.
struct ClaimSet {
    runs: Vec<StyleRun>,
}

impl ClaimSet {
    fn new() -> Self {
        Self { runs: Vec::new() }
    }

    fn claim(&mut self, start: usize, end: usize, style: u8) -> bool {
        let i = self.runs.partition_point(|r| r.end <= start);
        if self.runs.get(i).is_some_and(|r| r.start < end) {
            return false;
        }
        self.runs.insert(i, StyleRun::new(start, end, style));
        true
    }

    fn into_runs(self) -> Vec<StyleRun> {
        self.runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_set_rejects_overlap() {
        let mut claimed = ClaimSet::new();
        assert!(claimed.claim(10, 20, style::KEYWORD));

        // Touching either edge from outside is fine.
        assert!(claimed.claim(0, 10, style::STRING));
        assert!(claimed.claim(20, 25, style::NUMBER));

        // Any shared byte rejects the whole candidate.
        assert!(!claimed.claim(19, 30, style::COMMENT));
        assert!(!claimed.claim(5, 11, style::COMMENT));
        assert!(!claimed.claim(12, 15, style::COMMENT));
        assert!(!claimed.claim(0, 30, style::COMMENT));

        let runs = claimed.into_runs();
        assert_eq!(
            runs,
            vec![
                StyleRun::new(0, 10, style::STRING),
                StyleRun::new(10, 20, style::KEYWORD),
                StyleRun::new(20, 25, style::NUMBER),
            ]
        );
    }

    #[test]
    fn test_claim_set_stays_sorted_regardless_of_insertion_order() {
        let mut claimed = ClaimSet::new();
        assert!(claimed.claim(40, 50, style::TYPE));
        assert!(claimed.claim(0, 5, style::KEYWORD));
        assert!(claimed.claim(20, 30, style::NUMBER));

        let runs = claimed.into_runs();
        let starts: Vec<usize> = runs.iter().map(|r| r.start).collect();
        assert_eq!(starts, vec![0, 20, 40]);
    }
}
