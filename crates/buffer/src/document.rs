//! The document interface between the lexer and its host.

use crate::style;

/// Read access to a text buffer plus a cursor-based styling sink.
///
/// The lexer borrows the buffer bytes for the duration of one lexing pass
/// and never retains them. Styling is written through a cursor: a call to
/// [`start_styling`](Document::start_styling) positions it, and each
/// [`set_style_for`](Document::set_style_for) styles a contiguous run and
/// advances it.
pub trait Document {
    /// Returns the complete buffer contents.
    fn bytes(&self) -> &[u8];

    /// Positions the styling cursor at byte `pos`.
    fn start_styling(&mut self, pos: usize);

    /// Assigns `style` to the next `length` bytes and advances the cursor
    /// past them.
    fn set_style_for(&mut self, length: usize, style: u8);
}

/// An in-memory [`Document`] that records one style byte per text byte.
///
/// Useful for hosts that have no style storage of their own, and for tests
/// that assert on the styling a lexing pass produced.
#[derive(Debug, Clone)]
pub struct StyledBuffer {
    text: String,
    styles: Vec<u8>,
    cursor: usize,
}

impl StyledBuffer {
    /// Creates a buffer over `text` with every byte styled [`style::DEFAULT`].
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let styles = vec![style::DEFAULT; text.len()];
        Self {
            text,
            styles,
            cursor: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Style of the byte at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is past the end of the text.
    pub fn style_at(&self, pos: usize) -> u8 {
        self.styles[pos]
    }

    /// One style byte per text byte.
    pub fn styles(&self) -> &[u8] {
        &self.styles
    }
}

impl Document for StyledBuffer {
    fn bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    fn start_styling(&mut self, pos: usize) {
        self.cursor = pos.min(self.styles.len());
    }

    fn set_style_for(&mut self, length: usize, style: u8) {
        let end = self.cursor.saturating_add(length).min(self.styles.len());
        for slot in &mut self.styles[self.cursor..end] {
            *slot = style;
        }
        self.cursor = end;
    }
}
