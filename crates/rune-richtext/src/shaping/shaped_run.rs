use core::ops::Range;

use unicode_script::Script;

use crate::font::Font;

/// OpenType styling overlays applied while shaping a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextStyle {
    pub smallcaps: bool,
    pub subscript: bool,
    pub superscript: bool,
}

/// One logical run handed to a [`Shaper`](super::Shaper).
#[derive(Debug, Clone)]
pub struct ShapeRequest<'a> {
    /// The whole source text, available as shaping context.
    pub text: &'a str,
    /// Byte range of the run within `text`.
    pub range: Range<usize>,
    pub font: Font,
    pub script: Script,
    /// Odd bidi level: the run is shaped right-to-left.
    pub rtl: bool,
    /// Shape along the vertical axis.
    pub vertical: bool,
    pub style: TextStyle,
}

impl ShapeRequest<'_> {
    /// The run's text.
    pub fn run_text(&self) -> &str {
        &self.text[self.range.clone()]
    }
}

/// Parallel glyph arrays in logical order.
///
/// Advances and offsets are 26.6 fixed point. Advances are measured along
/// the primary axis (horizontal, or vertical when shaping vertically).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphBuffer {
    pub glyphs: Vec<u32>,
    /// Absolute byte offset of the cluster each glyph belongs to.
    pub clusters: Vec<usize>,
    pub advances: Vec<i32>,
    pub x_offsets: Vec<i32>,
    pub y_offsets: Vec<i32>,
}

impl GlyphBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn clear(&mut self) {
        self.glyphs.clear();
        self.clusters.clear();
        self.advances.clear();
        self.x_offsets.clear();
        self.y_offsets.clear();
    }

    pub fn push(&mut self, glyph: u32, cluster: usize, advance: i32, x_offset: i32, y_offset: i32) {
        self.glyphs.push(glyph);
        self.clusters.push(cluster);
        self.advances.push(advance);
        self.x_offsets.push(x_offset);
        self.y_offsets.push(y_offset);
    }

    /// Reverse the glyphs in `range`, turning visual right-to-left output
    /// into logical order.
    pub fn reverse(&mut self, range: Range<usize>) {
        self.glyphs[range.clone()].reverse();
        self.clusters[range.clone()].reverse();
        self.advances[range.clone()].reverse();
        self.x_offsets[range.clone()].reverse();
        self.y_offsets[range].reverse();
    }

    /// Sum of the advances in `range`.
    pub fn advance_sum(&self, range: Range<usize>) -> i32 {
        self.advances[range].iter().sum()
    }

    /// Whether the glyphs in `range` honor the shaper contract for `text`.
    pub(crate) fn is_valid_run(&self, range: Range<usize>, text: Range<usize>) -> bool {
        let clusters = &self.clusters[range];
        clusters.first().is_none_or(|&first| first == text.start)
            && clusters.windows(2).all(|pair| pair[0] <= pair[1])
            && clusters.iter().all(|cluster| text.contains(cluster))
    }
}
