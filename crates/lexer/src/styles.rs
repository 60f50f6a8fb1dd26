//! Capture-name to style-number mapping.

use std::collections::HashMap;

use tslexia_buffer::style;

/// Default capture table. `delimiter` shares the operator style and
/// `function.special` the function style, matching the names the stock
/// highlight queries use.
const DEFAULT_STYLES: &[(&str, u8)] = &[
    ("keyword", style::KEYWORD),
    ("operator", style::OPERATOR),
    ("delimiter", style::OPERATOR),
    ("string", style::STRING),
    ("constant", style::CONSTANT),
    ("number", style::NUMBER),
    ("function", style::FUNCTION),
    ("function.special", style::FUNCTION),
    ("property", style::PROPERTY),
    ("label", style::LABEL),
    ("type", style::TYPE),
    ("variable", style::VARIABLE),
    ("comment", style::COMMENT),
];

/// Mapping from capture names to style numbers.
///
/// Seeded with [`DEFAULT_STYLES`]; individual names can be re-pointed at
/// any style number at runtime. Capture names with no entry style nothing.
pub struct CaptureStyles {
    map: HashMap<String, u8>,
}

impl Default for CaptureStyles {
    fn default() -> Self {
        Self {
            map: DEFAULT_STYLES
                .iter()
                .map(|(name, s)| (name.to_string(), *s))
                .collect(),
        }
    }
}

impl CaptureStyles {
    /// Looks up the style for a capture name.
    pub fn resolve(&self, name: &str) -> Option<u8> {
        self.map.get(name).copied()
    }

    /// Inserts or overwrites a mapping, effective on the next lexing pass.
    /// Style numbers above [`style::STYLE_MAX`] are not representable and
    /// are dropped with a warning.
    pub fn set(&mut self, style: u32, name: &str) {
        if style > style::STYLE_MAX {
            log::warn!(
                "style {style} for capture {name:?} exceeds {}; ignored",
                style::STYLE_MAX
            );
            return;
        }
        self.map.insert(name.to_string(), style as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_entries() {
        let styles = CaptureStyles::default();
        assert_eq!(styles.resolve("keyword"), Some(style::KEYWORD));
        assert_eq!(styles.resolve("string"), Some(style::STRING));
        assert_eq!(styles.resolve("comment"), Some(style::COMMENT));
    }

    #[test]
    fn test_aliased_capture_names() {
        let styles = CaptureStyles::default();
        assert_eq!(styles.resolve("delimiter"), Some(style::OPERATOR));
        assert_eq!(styles.resolve("function.special"), Some(style::FUNCTION));
    }

    #[test]
    fn test_unknown_capture_styles_nothing() {
        let styles = CaptureStyles::default();
        assert_eq!(styles.resolve("punctuation.bracket"), None);
        assert_eq!(styles.resolve(""), None);
    }

    #[test]
    fn test_override_and_new_mapping() {
        let mut styles = CaptureStyles::default();
        styles.set(style::TYPE as u32, "keyword");
        assert_eq!(styles.resolve("keyword"), Some(style::TYPE));

        styles.set(200, "punctuation.bracket");
        assert_eq!(styles.resolve("punctuation.bracket"), Some(200));
    }

    #[test]
    fn test_out_of_range_style_is_rejected() {
        let mut styles = CaptureStyles::default();
        styles.set(256, "keyword");
        assert_eq!(styles.resolve("keyword"), Some(style::KEYWORD));
        styles.set(1000, "brand-new");
        assert_eq!(styles.resolve("brand-new"), None);
    }

    #[test]
    fn test_style_255_is_accepted() {
        let mut styles = CaptureStyles::default();
        styles.set(255, "keyword");
        assert_eq!(styles.resolve("keyword"), Some(255));
    }
}
