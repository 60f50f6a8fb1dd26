//! Textual predicate evaluation.
//!
//! Compilation rewrites the reserved text-predicate spellings to
//! crate-local names (see [`crate::query`]), so every predicate a pattern
//! carries arrives here as a general predicate and is evaluated per match
//! against the referenced capture's text. `#match?` regexes must cover the
//! whole captured text, a regex that fails to compile never holds, and
//! anything unknown or malformed never holds either, so a broken predicate
//! suppresses styling instead of letting it through.

use regex::bytes::Regex;
use tree_sitter::{QueryMatch, QueryPredicate, QueryPredicateArg};

use crate::query::REWRITE_PREFIX;

/// One parsed predicate from a pattern's general-predicate list.
pub(crate) enum Predicate {
    /// `eq?` / `not-eq?`: captured text compared to a literal.
    Eq {
        capture: u32,
        value: Box<[u8]>,
        negate: bool,
    },
    /// `match?` / `not-match?`: captured text matched, in full, against a
    /// regular expression. `None` means the regex failed to compile and the
    /// predicate can never hold.
    Match {
        capture: u32,
        regex: Option<Regex>,
        negate: bool,
    },
    /// Unknown operator or malformed operand shape; never holds.
    Unsupported,
}

impl Predicate {
    /// Parses one general predicate. The accepted shape is
    /// (operator, capture-reference, string-literal); anything else is
    /// [`Predicate::Unsupported`].
    pub(crate) fn parse(pred: &QueryPredicate) -> Self {
        let operator = pred
            .operator
            .strip_prefix(REWRITE_PREFIX)
            .unwrap_or(&pred.operator);
        let (capture, value) = match &*pred.args {
            [QueryPredicateArg::Capture(c), QueryPredicateArg::String(s)] => (*c, s),
            _ => {
                log::warn!(
                    "predicate {:?} has malformed operands; it will never match",
                    operator
                );
                return Self::Unsupported;
            }
        };
        let negate = operator.starts_with("not-");
        match operator {
            "eq?" | "not-eq?" => Self::Eq {
                capture,
                value: value.as_bytes().into(),
                negate,
            },
            "match?" | "not-match?" => {
                // Full-string match, not a search.
                let regex = Regex::new(&format!("^(?:{value})$"))
                    .map_err(|e| log::warn!("bad predicate regex {value:?}: {e}"))
                    .ok();
                Self::Match {
                    capture,
                    regex,
                    negate,
                }
            }
            op => {
                log::warn!("unsupported query predicate {op:?}; it will never match");
                Self::Unsupported
            }
        }
    }

    /// Index of the referenced capture, if the predicate is well-formed.
    fn capture_index(&self) -> Option<u32> {
        match self {
            Self::Eq { capture, .. } | Self::Match { capture, .. } => Some(*capture),
            Self::Unsupported => None,
        }
    }

    /// Evaluates against the text of the referenced capture. `None` means
    /// the capture did not participate in the match, which fails closed.
    fn holds_for(&self, text: Option<&[u8]>) -> bool {
        let Some(text) = text else { return false };
        match self {
            Self::Eq { value, negate, .. } => (text == &**value) != *negate,
            Self::Match { regex, negate, .. } => match regex {
                Some(regex) => regex.is_match(text) != *negate,
                None => false,
            },
            Self::Unsupported => false,
        }
    }
}

/// Returns true when every predicate attached to the match's pattern holds.
/// Evaluation short-circuits on the first failure.
pub(crate) fn match_satisfies(
    predicates: &[Predicate],
    m: &QueryMatch,
    text: &[u8],
) -> bool {
    predicates.iter().all(|pred| {
        let captured = pred
            .capture_index()
            .and_then(|index| capture_text(m, index, text));
        pred.holds_for(captured)
    })
}

fn capture_text<'a>(m: &QueryMatch, index: u32, text: &'a [u8]) -> Option<&'a [u8]> {
    m.captures
        .iter()
        .find(|c| c.index == index)
        .map(|c| &text[c.node.byte_range()])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predicate(operator: &str, literal: &str) -> Predicate {
        Predicate::parse(&QueryPredicate {
            operator: operator.into(),
            args: vec![
                QueryPredicateArg::Capture(0),
                QueryPredicateArg::String(literal.into()),
            ]
            .into(),
        })
    }

    #[test]
    fn test_eq_holds_only_on_exact_text() {
        let pred = predicate("eq?", "foo");
        assert!(pred.holds_for(Some(b"foo")));
        assert!(!pred.holds_for(Some(b"bar")));
        assert!(!pred.holds_for(Some(b"foo ")));
    }

    #[test]
    fn test_not_eq_is_the_inverse() {
        let pred = predicate("not-eq?", "foo");
        assert!(!pred.holds_for(Some(b"foo")));
        assert!(pred.holds_for(Some(b"bar")));
    }

    #[test]
    fn test_match_is_full_string() {
        let pred = predicate("match?", "[A-Z_]+");
        assert!(pred.holds_for(Some(b"MAX_SIZE")));
        // A substring hit is not enough.
        assert!(!pred.holds_for(Some(b"maxSIZE")));
        assert!(!pred.holds_for(Some(b"maxSize")));
    }

    #[test]
    fn test_anchored_match_pattern() {
        let pred = predicate("match?", "^[A-Z_]+$");
        assert!(pred.holds_for(Some(b"MAX_SIZE")));
        assert!(!pred.holds_for(Some(b"maxSize")));
    }

    #[test]
    fn test_not_match_inverts() {
        let pred = predicate("not-match?", "[0-9]+");
        assert!(pred.holds_for(Some(b"abc")));
        assert!(!pred.holds_for(Some(b"123")));
    }

    #[test]
    fn test_bad_regex_fails_closed() {
        let pred = predicate("match?", "[unclosed");
        assert!(!pred.holds_for(Some(b"anything")));
        // And its negation does not accidentally hold everything.
        let pred = predicate("not-match?", "[unclosed");
        assert!(!pred.holds_for(Some(b"anything")));
    }

    #[test]
    fn test_rewritten_spellings_are_recognized() {
        let pred = predicate(&format!("{REWRITE_PREFIX}eq?"), "foo");
        assert!(pred.holds_for(Some(b"foo")));
        assert!(!pred.holds_for(Some(b"bar")));

        let pred = predicate(&format!("{REWRITE_PREFIX}match?"), "[a-z]+");
        assert!(pred.holds_for(Some(b"foo")));
    }

    #[test]
    fn test_any_variants_fail_closed() {
        for op in ["any-eq?", "any-match?", "any-of?"] {
            let pred = predicate(op, "x");
            assert!(matches!(pred, Predicate::Unsupported), "{}", op);
        }
    }

    #[test]
    fn test_unknown_operator_never_holds() {
        let pred = predicate("lua-match?", "x");
        assert!(matches!(pred, Predicate::Unsupported));
        assert!(!pred.holds_for(Some(b"x")));
    }

    #[test]
    fn test_malformed_operand_shape_never_holds() {
        // Two string literals, no capture reference.
        let pred = Predicate::parse(&QueryPredicate {
            operator: "eq?".into(),
            args: vec![
                QueryPredicateArg::String("a".into()),
                QueryPredicateArg::String("a".into()),
            ]
            .into(),
        });
        assert!(matches!(pred, Predicate::Unsupported));
    }

    #[test]
    fn test_absent_capture_fails_closed() {
        let pred = predicate("eq?", "foo");
        assert!(!pred.holds_for(None));
        let pred = predicate("not-eq?", "foo");
        assert!(!pred.holds_for(None));
    }
}
