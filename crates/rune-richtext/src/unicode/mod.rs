//! Boundary iteration and script properties.
//!
//! The layout builder and the cursor controller never segment text
//! themselves; they ask a [`Segmenter`] for boundary offsets. The default
//! [`UnicodeSegmenter`] follows UAX-29 (graphemes, words) and UAX-14 (line
//! breaks) through `unicode-segmentation` and `unicode-linebreak`.

pub mod script;
pub mod segmenter;

pub use script::{ScriptRun, resolve_script};
pub use segmenter::UnicodeSegmenter;

use crate::error::Result;

/// Which boundaries a [`Segmenter`] should report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    /// Extended grapheme cluster boundaries.
    Character,
    /// Word boundaries (every UAX-29 word segment edge).
    Word,
    /// Soft and mandatory line break opportunities.
    Line,
    /// Ends of paragraphs, directly after each hard line break.
    Paragraph,
}

/// Boundary service.
///
/// `boundaries` clears `out` and fills it with strictly increasing byte
/// offsets in `(0, text.len()]`. For non-empty text the last entry is always
/// `text.len()`. Offset 0 is implicit and never reported.
pub trait Segmenter {
    fn boundaries(&self, text: &str, kind: BoundaryKind, out: &mut Vec<usize>) -> Result<()>;
}

impl<S: Segmenter + ?Sized> Segmenter for &S {
    fn boundaries(&self, text: &str, kind: BoundaryKind, out: &mut Vec<usize>) -> Result<()> {
        (**self).boundaries(text, kind, out)
    }
}

/// Characters that end a paragraph.
pub fn is_paragraph_separator(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

/// Length in bytes of the run of paragraph separators ending `text`.
pub fn trailing_separator_len(text: &str) -> usize {
    text.chars()
        .rev()
        .take_while(|&ch| is_paragraph_separator(ch))
        .map(char::len_utf8)
        .sum()
}
