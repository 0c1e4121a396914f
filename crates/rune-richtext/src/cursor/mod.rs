//! Cursor navigation and hit-testing.
//!
//! A [`CursorController`] moves [`CursorPosition`]s across grapheme and
//! word boundaries of a text and maps points to positions (and back to
//! carets) against a [`LayoutResult`](crate::LayoutResult) built from
//! that text.

pub mod controller;
pub mod position;

pub use controller::CursorController;
pub use position::{Caret, CursorAffinity, CursorPosition};
