/// Which side of a boundary the cursor belongs to.
///
/// At a line wrap or a bidi run boundary one offset has two visual
/// locations; `Upstream` sticks to the text before the offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum CursorAffinity {
    /// Attached to the character before the offset.
    Upstream,
    /// Attached to the character after the offset.
    #[default]
    Downstream,
}

/// A cursor location in the source text.
///
/// Ordered by offset, then `Upstream` before `Downstream`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CursorPosition {
    /// Byte offset; always on a grapheme boundary when produced by the
    /// controller.
    pub offset: usize,
    pub affinity: CursorAffinity,
}

impl CursorPosition {
    pub fn new(offset: usize) -> Self {
        Self {
            offset,
            affinity: CursorAffinity::default(),
        }
    }

    pub fn with_affinity(offset: usize, affinity: CursorAffinity) -> Self {
        Self { offset, affinity }
    }
}

/// Caret geometry for a cursor position, relative to the text area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Caret {
    pub x: f32,
    /// Top of the caret's line.
    pub y: f32,
    pub height: f32,
    pub line: usize,
}
