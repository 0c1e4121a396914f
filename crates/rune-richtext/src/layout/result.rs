use core::ops::Range;

use crate::bidi::is_rtl;
use crate::error::{LayoutError, Result};
use crate::fixed;
use crate::font::Font;
use crate::layout::params::{XAlignment, align_offset};
use crate::shaping::TextStyle;

/// A run of glyphs sharing font, style and bidi level, in its final
/// position within the line.
///
/// Glyphs are stored in logical order; a right-to-left run is drawn from
/// its last glyph to its first.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualRun {
    pub font: Font,
    pub style: TextStyle,
    /// Bidi embedding level.
    pub level: u8,
    /// Byte range of the run in the source text.
    pub text_range: Range<usize>,
    /// Range into the layout's glyph arrays.
    pub glyph_range: Range<usize>,
    /// Sum of the run's advances in 26.6.
    pub advance: i32,
}

impl VisualRun {
    pub fn is_rtl(&self) -> bool {
        is_rtl(self.level)
    }

    /// Run width in pixels.
    pub fn width(&self) -> f32 {
        fixed::to_f32(self.advance)
    }
}

/// A single line of laid out text.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Range into the layout's visual runs, left to right.
    pub run_range: Range<usize>,
    /// Range into the layout's glyph arrays.
    pub glyph_range: Range<usize>,
    /// Source bytes covered, including a trailing paragraph separator when
    /// the line ends its paragraph.
    pub text_range: Range<usize>,
    /// Visual width in pixels.
    pub width: f32,
    /// Maximum ascent in this line (pixels above baseline).
    pub ascent: f32,
    /// Maximum descent in this line (pixels below baseline).
    pub descent: f32,
    /// Total height of the line in pixels.
    pub height: f32,
    /// Top of the line relative to the first line's top.
    pub top: f32,
    /// The paragraph's base direction is right-to-left.
    pub rtl: bool,
}

impl Line {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Baseline position relative to the first line's top.
    pub fn baseline(&self) -> f32 {
        self.top + self.ascent
    }

    pub fn glyph_count(&self) -> usize {
        self.glyph_range.len()
    }

    /// A line created by a width callback that left no room.
    pub fn is_degenerate(&self) -> bool {
        self.run_range.is_empty() && self.text_range.is_empty()
    }
}

/// A glyph with its absolute position, as handed to a renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedGlyph {
    pub glyph_id: u32,
    pub font: Font,
    /// Pen x of the glyph origin, offset applied.
    pub x: f32,
    /// Baseline y, offset applied.
    pub y: f32,
    /// Source byte offset of the glyph's cluster.
    pub char_index: usize,
    pub line_index: usize,
}

/// The output of a layout build: lines top to bottom, each an ordered
/// sequence of visual runs, plus the flattened char-index table.
///
/// Built by [`LayoutBuilder`](crate::LayoutBuilder); callers only read it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    pub(crate) lines: Vec<Line>,
    pub(crate) runs: Vec<VisualRun>,
    pub(crate) glyphs: Vec<u32>,
    pub(crate) char_indices: Vec<usize>,
    pub(crate) advances: Vec<i32>,
    pub(crate) x_offsets: Vec<i32>,
    pub(crate) y_offsets: Vec<i32>,
    pub(crate) text_start_y: f32,
    pub(crate) consumed: usize,
}

impl LayoutResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn clear(&mut self) {
        self.lines.clear();
        self.runs.clear();
        self.glyphs.clear();
        self.char_indices.clear();
        self.advances.clear();
        self.x_offsets.clear();
        self.y_offsets.clear();
        self.text_start_y = 0.0;
        self.consumed = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Result<&Line> {
        self.lines
            .get(index)
            .ok_or_else(|| LayoutError::out_of_range(index, self.lines.len()))
    }

    pub fn line_width(&self, index: usize) -> Result<f32> {
        self.line(index).map(|line| line.width)
    }

    pub fn line_height(&self, index: usize) -> Result<f32> {
        self.line(index).map(|line| line.height)
    }

    pub fn line_ascent(&self, index: usize) -> Result<f32> {
        self.line(index).map(|line| line.ascent)
    }

    pub fn line_descent(&self, index: usize) -> Result<f32> {
        self.line(index).map(|line| line.descent)
    }

    /// Widest line in pixels.
    pub fn max_line_width(&self) -> f32 {
        self.lines.iter().map(|line| line.width).fold(0.0, f32::max)
    }

    /// Sum of all line heights.
    pub fn text_height(&self) -> f32 {
        self.lines.last().map(Line::bottom).unwrap_or(0.0)
    }

    /// Vertical offset of the first line from the top of the text area,
    /// from the build's vertical alignment.
    pub fn text_start_y(&self) -> f32 {
        self.text_start_y
    }

    /// Number of source bytes laid out, counted from the start of the
    /// text. Less than the text length when truncation or a degenerate
    /// line stopped the build early.
    pub fn consumed_len(&self) -> usize {
        self.consumed
    }

    /// All visual runs of `line`, left to right.
    pub fn runs(&self, line: &Line) -> &[VisualRun] {
        &self.runs[line.run_range.clone()]
    }

    pub fn glyph_ids(&self, run: &VisualRun) -> &[u32] {
        &self.glyphs[run.glyph_range.clone()]
    }

    /// 26.6 advances of a run's glyphs, in logical order.
    pub fn advances(&self, run: &VisualRun) -> &[i32] {
        &self.advances[run.glyph_range.clone()]
    }

    /// 26.6 x offsets of a run's glyphs, in logical order.
    pub fn x_offsets(&self, run: &VisualRun) -> &[i32] {
        &self.x_offsets[run.glyph_range.clone()]
    }

    /// 26.6 y offsets of a run's glyphs, in logical order.
    pub fn y_offsets(&self, run: &VisualRun) -> &[i32] {
        &self.y_offsets[run.glyph_range.clone()]
    }

    /// Source byte offsets of a run's glyph clusters, in logical order.
    pub fn run_char_indices(&self, run: &VisualRun) -> &[usize] {
        &self.char_indices[run.glyph_range.clone()]
    }

    /// Length of the flattened char-index table (one entry per glyph).
    pub fn char_index_count(&self) -> usize {
        self.char_indices.len()
    }

    /// Source byte offset of glyph `index` in the flattened table.
    pub fn char_index(&self, index: usize) -> Result<usize> {
        self.char_indices
            .get(index)
            .copied()
            .ok_or_else(|| LayoutError::out_of_range(index, self.char_indices.len()))
    }

    /// Number of char-index entries in a line.
    pub fn line_char_index_count(&self, line_index: usize) -> Result<usize> {
        self.line(line_index).map(Line::glyph_count)
    }

    /// Source byte offset of the `index`th glyph of a line, in storage
    /// order (visual run order, logical order within a run).
    pub fn line_char_index(&self, line_index: usize, index: usize) -> Result<usize> {
        let line = self.line(line_index)?;
        if index >= line.glyph_count() {
            return Err(LayoutError::out_of_range(index, line.glyph_count()));
        }
        Ok(self.char_indices[line.glyph_range.start + index])
    }

    /// Horizontal start of a line aligned within `area_width`.
    pub fn line_x_start(
        &self,
        line_index: usize,
        area_width: f32,
        x_alignment: XAlignment,
    ) -> Result<f32> {
        self.line(line_index)
            .map(|line| align_offset(area_width, line.width, x_alignment.factor()))
    }

    /// Line whose vertical span contains `y` (relative to the first line's
    /// top), clamped to the first and last lines.
    pub fn line_at_height(&self, y: f32) -> Option<usize> {
        if self.lines.is_empty() {
            return None;
        }
        let index = self.lines.partition_point(|line| line.bottom() <= y);
        Some(index.min(self.lines.len() - 1))
    }

    /// Every glyph with its absolute pen position, lines top to bottom and
    /// glyphs left to right.
    pub fn positioned_glyphs(
        &self,
        origin_x: f32,
        origin_y: f32,
        area_width: f32,
        x_alignment: XAlignment,
    ) -> impl Iterator<Item = PositionedGlyph> + '_ {
        self.lines.iter().enumerate().flat_map(move |(line_index, line)| {
            let line_x = origin_x + align_offset(area_width, line.width, x_alignment.factor());
            let baseline = origin_y + self.text_start_y + line.baseline();
            line.run_range.clone().flat_map(move |run_index| {
                let run = &self.runs[run_index];
                let mut pen: i32 = self.runs[line.run_range.start..run_index]
                    .iter()
                    .map(|previous| previous.advance)
                    .sum();
                let glyphs = run.glyph_range.clone();
                let rtl = run.is_rtl();
                (0..glyphs.len()).map(move |visual| {
                    let index = if rtl {
                        glyphs.end - 1 - visual
                    } else {
                        glyphs.start + visual
                    };
                    let glyph = PositionedGlyph {
                        glyph_id: self.glyphs[index],
                        font: run.font,
                        x: line_x + fixed::to_f32(pen + self.x_offsets[index]),
                        y: baseline + fixed::to_f32(self.y_offsets[index]),
                        char_index: self.char_indices[index],
                        line_index,
                    };
                    pen += self.advances[index];
                    glyph
                })
            })
        })
    }
}
