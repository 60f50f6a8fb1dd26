//! Query compilation and storage.
//!
//! A slot's query is compiled from pattern-query source text against the
//! slot's grammar. Compilation failures are classified and carry the byte
//! offset in the source where the compiler stopped, formatted the way the
//! `lexer.ts.error` property reports them ("Query syntax error at 12").
//!
//! The binding's `QueryCursor` would otherwise enforce the standard text
//! predicates itself, with regex search semantics and a hard compile
//! failure on a bad regex. The lexer needs full-string matching and
//! fail-closed handling instead, so those operator spellings are rewritten
//! to crate-local names before compilation; they then reach the
//! general-predicate list and are evaluated by [`crate::predicate`].

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use tree_sitter::{Language, Query, QueryErrorKind};

use crate::predicate::Predicate;

/// Failure class for query compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorClass {
    Syntax,
    NodeType,
    Field,
    Capture,
    Structure,
    Language,
    Unknown,
}

impl fmt::Display for QueryErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Syntax => "syntax",
            Self::NodeType => "node type",
            Self::Field => "field",
            Self::Capture => "capture",
            Self::Structure => "structure",
            Self::Language => "language",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

impl From<QueryErrorKind> for QueryErrorClass {
    fn from(kind: QueryErrorKind) -> Self {
        match kind {
            QueryErrorKind::Syntax => Self::Syntax,
            QueryErrorKind::NodeType => Self::NodeType,
            QueryErrorKind::Field => Self::Field,
            QueryErrorKind::Capture => Self::Capture,
            QueryErrorKind::Structure => Self::Structure,
            QueryErrorKind::Language => Self::Language,
            // Only the binding's structural forms (`#is?`, `#set!`) can
            // still fail as predicates at compile time; there is no
            // dedicated class for those.
            QueryErrorKind::Predicate => Self::Unknown,
        }
    }
}

/// Errors from assigning a query to a slot. All of them are scoped to the
/// one slot named in the call; other slots and later calls are unaffected.
#[derive(Error, Debug)]
pub enum QuerySetError {
    /// The index does not name a registered language slot.
    #[error("no language slot {0}")]
    InvalidSlot(usize),

    /// The query source file could not be read.
    #[error("Cannot read query file: {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The query source failed to compile.
    #[error("Query {class} error at {offset}")]
    Compile {
        class: QueryErrorClass,
        offset: usize,
    },
}

/// Operator spellings the binding would enforce itself while iterating
/// captures. Rewriting them keeps their evaluation in this crate.
const TEXT_PREDICATE_OPS: &[&str] = &[
    "eq?",
    "not-eq?",
    "any-eq?",
    "any-not-eq?",
    "match?",
    "not-match?",
    "any-match?",
    "any-not-match?",
    "any-of?",
    "not-any-of?",
];

/// Prefix prepended to rewritten operator names. [`crate::predicate`]
/// strips it again when parsing.
pub(crate) const REWRITE_PREFIX: &str = "tslx-";

/// Prefixes every reserved text-predicate operator outside string literals
/// and `;` comments. Returns the rewritten source plus the byte positions
/// (in rewritten coordinates) where a prefix was inserted, for mapping
/// compile-error offsets back to the caller's source.
fn rewrite_text_predicates(source: &str) -> (String, Vec<usize>) {
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len() + REWRITE_PREFIX.len());
    let mut insertions = Vec::new();
    let mut copied = 0;
    let mut in_string = false;
    let mut in_comment = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if in_string => {
                i += 2;
                continue;
            }
            b'"' if !in_comment => in_string = !in_string,
            b'\n' => in_comment = false,
            b';' if !in_string => in_comment = true,
            b'#' if !in_string && !in_comment => {
                let rest = &source[i + 1..];
                if let Some(op) = TEXT_PREDICATE_OPS.iter().find(|op| rest.starts_with(**op)) {
                    out.push_str(&source[copied..=i]);
                    insertions.push(out.len());
                    out.push_str(REWRITE_PREFIX);
                    copied = i + 1;
                    i += 1 + op.len();
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }
    out.push_str(&source[copied..]);
    (out, insertions)
}

/// Maps an error offset in the rewritten source back to the original.
fn original_offset(offset: usize, insertions: &[usize]) -> usize {
    let shifted = insertions.iter().take_while(|&&p| p < offset).count() * REWRITE_PREFIX.len();
    offset.saturating_sub(shifted)
}

/// A compiled pattern query plus its per-pattern general predicates.
///
/// The predicate lists are parsed once here so lexing never re-parses
/// operator strings or recompiles regexes per match.
pub struct CompiledQuery {
    pub(crate) query: Query,
    predicates: Vec<Vec<Predicate>>,
}

impl CompiledQuery {
    pub(crate) fn new(language: &Language, source: &str) -> Result<Self, QuerySetError> {
        let (rewritten, insertions) = rewrite_text_predicates(source);
        let query = Query::new(language, &rewritten).map_err(|e| QuerySetError::Compile {
            class: e.kind.into(),
            offset: original_offset(e.offset, &insertions),
        })?;
        let predicates = (0..query.pattern_count())
            .map(|i| {
                query
                    .general_predicates(i)
                    .iter()
                    .map(Predicate::parse)
                    .collect()
            })
            .collect();
        Ok(Self { query, predicates })
    }

    pub(crate) fn pattern_predicates(&self, pattern: usize) -> &[Predicate] {
        &self.predicates[pattern]
    }
}
