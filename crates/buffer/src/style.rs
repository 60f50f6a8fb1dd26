//! Numeric style identifiers.
//!
//! The named constants below are a stable contract: hosts configure their
//! visual styles against these exact numbers, in this exact order.

/// Style for language keywords.
pub const KEYWORD: u8 = 0;
/// Style for operators and delimiters.
pub const OPERATOR: u8 = 1;
/// Style for string literals.
pub const STRING: u8 = 2;
/// Style for named constants.
pub const CONSTANT: u8 = 3;
/// Style for numeric literals.
pub const NUMBER: u8 = 4;
/// Style for function names.
pub const FUNCTION: u8 = 5;
/// Style for properties and fields.
pub const PROPERTY: u8 = 6;
/// Style for labels.
pub const LABEL: u8 = 7;
/// Style for type names.
pub const TYPE: u8 = 8;
/// Style for variables.
pub const VARIABLE: u8 = 9;
/// Style for comments.
pub const COMMENT: u8 = 10;

/// Number of named styles.
pub const STYLE_COUNT: u8 = 11;

/// Baseline style for bytes no capture claimed. Matches Scintilla's
/// `STYLE_DEFAULT` so hosts built on that numbering need no translation.
pub const DEFAULT: u8 = 32;

/// Highest style number a capture name may be assigned to.
pub const STYLE_MAX: u32 = 255;

/// A half-open byte range `[start, end)` assigned a single style number.
///
/// One lexing pass produces runs that are pairwise non-overlapping and
/// sorted by start offset; gaps between runs keep the [`DEFAULT`] style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleRun {
    /// First byte of the run.
    pub start: usize,
    /// One past the last byte of the run.
    pub end: usize,
    /// Style number for every byte in the run.
    pub style: u8,
}

impl StyleRun {
    pub fn new(start: usize, end: usize, style: u8) -> Self {
        Self { start, end, style }
    }

    /// Length of the run in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_numbers_are_contractual() {
        // Hosts depend on these exact values; a renumbering is a breaking
        // change even though it compiles.
        assert_eq!(
            [
                KEYWORD, OPERATOR, STRING, CONSTANT, NUMBER, FUNCTION, PROPERTY, LABEL, TYPE,
                VARIABLE, COMMENT,
            ],
            [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]
        );
        assert_eq!(STYLE_COUNT, 11);
    }

    #[test]
    fn test_default_style_is_outside_named_range() {
        assert!(DEFAULT >= STYLE_COUNT);
    }

    #[test]
    fn test_style_run_len() {
        let run = StyleRun::new(3, 10, KEYWORD);
        assert_eq!(run.len(), 7);
        assert!(!run.is_empty());
        assert!(StyleRun::new(4, 4, KEYWORD).is_empty());
    }
}
