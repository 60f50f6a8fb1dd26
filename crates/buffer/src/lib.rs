//! tslexia-buffer: document and styling types for the tslexia lexer.
//!
//! This crate defines the boundary between the lexing engine and the host
//! that owns the text: the engine reads buffer bytes through [`Document`]
//! and writes styling back through the same trait, one contiguous run at a
//! time. The numeric style identifiers live in the [`style`] module.
//!
//! # Overview
//!
//! The main items are:
//!
//! - [`Document`]: read access to buffer bytes plus a cursor-based styling
//!   sink (`start_styling` / `set_style_for`).
//!
//! - [`StyleRun`]: a half-open byte range assigned a single style number,
//!   the unit of output from one lexing pass.
//!
//! - [`StyledBuffer`]: an in-memory [`Document`] that records per-byte
//!   styles, for hosts without their own style storage and for tests.
//!
//! # Example
//!
//! ```
//! use tslexia_buffer::{style, Document, StyledBuffer};
//!
//! let mut doc = StyledBuffer::new("int x = 42;");
//! doc.start_styling(0);
//! doc.set_style_for(3, style::KEYWORD);
//! assert_eq!(doc.style_at(0), style::KEYWORD);
//! assert_eq!(doc.style_at(3), style::DEFAULT);
//! ```

mod document;
pub mod style;

pub use document::{Document, StyledBuffer};
pub use style::StyleRun;
