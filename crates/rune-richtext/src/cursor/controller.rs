use core::fmt;
use core::ops::Range;

use crate::callback::LineOffsetFn;
use crate::error::Result;
use crate::fixed;
use crate::layout::{LayoutResult, Line, VisualRun, XAlignment};
use crate::unicode::{BoundaryKind, Segmenter, UnicodeSegmenter};

use super::{Caret, CursorAffinity, CursorPosition};

/// A glyph cluster of a run in logical order.
#[derive(Debug, Clone)]
struct ClusterSpan {
    text: Range<usize>,
    advance: f32,
}

/// Cursor movement and hit-testing over a text and its layout.
///
/// Holds a borrowed view of the text. The layouts passed to the query
/// methods must have been built from that same text; a mismatch is not
/// detected and yields meaningless positions.
pub struct CursorController<'t> {
    text: &'t str,
    segmenter: Box<dyn Segmenter + 't>,
    /// Grapheme boundaries including 0, built on first use.
    graphemes: Option<Vec<usize>>,
    /// Word boundaries including 0, built on first use.
    words: Option<Vec<usize>>,
    spans: Vec<ClusterSpan>,
}

impl fmt::Debug for CursorController<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorController")
            .field("text_len", &self.text.len())
            .field("graphemes", &self.graphemes.as_ref().map(Vec::len))
            .field("words", &self.words.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}

impl<'t> CursorController<'t> {
    pub fn new(text: &'t str) -> Self {
        Self::with_segmenter(text, UnicodeSegmenter)
    }

    pub fn with_segmenter(text: &'t str, segmenter: impl Segmenter + 't) -> Self {
        Self {
            text,
            segmenter: Box::new(segmenter),
            graphemes: None,
            words: None,
            spans: Vec::new(),
        }
    }

    pub fn text(&self) -> &'t str {
        self.text
    }

    /// Rebind the controller; boundary tables are dropped when the text
    /// actually changes.
    pub fn set_text(&mut self, text: &'t str) {
        if core::ptr::eq(text, self.text) {
            return;
        }
        self.text = text;
        self.graphemes = None;
        self.words = None;
    }

    fn boundaries(&mut self, kind: BoundaryKind) -> Result<&[usize]> {
        let table = match kind {
            BoundaryKind::Word => &mut self.words,
            _ => &mut self.graphemes,
        };
        if table.is_none() {
            let mut boundaries = Vec::new();
            self.segmenter.boundaries(self.text, kind, &mut boundaries)?;
            boundaries.insert(0, 0);
            *table = Some(boundaries);
        }
        Ok(table.as_deref().unwrap_or(&[]))
    }

    fn next_boundary(&mut self, kind: BoundaryKind, position: CursorPosition) -> Result<CursorPosition> {
        let len = self.text.len();
        let offset = position.offset.min(len);
        let table = self.boundaries(kind)?;
        let next = table
            .get(table.partition_point(|&b| b <= offset))
            .copied()
            .unwrap_or(len);
        Ok(CursorPosition::new(next.max(offset)))
    }

    fn prev_boundary(&mut self, kind: BoundaryKind, position: CursorPosition) -> Result<CursorPosition> {
        let offset = position.offset.min(self.text.len());
        let table = self.boundaries(kind)?;
        let index = table.partition_point(|&b| b < offset);
        let prev = index.checked_sub(1).map_or(0, |i| table[i]);
        Ok(CursorPosition::new(prev))
    }

    /// Next grapheme boundary; stays put at the end of the text.
    pub fn next_character(&mut self, position: CursorPosition) -> Result<CursorPosition> {
        self.next_boundary(BoundaryKind::Character, position)
    }

    /// Previous grapheme boundary; stays put at 0.
    pub fn prev_character(&mut self, position: CursorPosition) -> Result<CursorPosition> {
        self.prev_boundary(BoundaryKind::Character, position)
    }

    /// Next word boundary. Boundaries are structural: the space between two
    /// words is a segment of its own.
    pub fn next_word(&mut self, position: CursorPosition) -> Result<CursorPosition> {
        self.next_boundary(BoundaryKind::Word, position)
    }

    pub fn prev_word(&mut self, position: CursorPosition) -> Result<CursorPosition> {
        self.prev_boundary(BoundaryKind::Word, position)
    }

    /// Position under `x` on line `line_index`, `x` being relative to the
    /// text area's left edge.
    ///
    /// The cluster under the pointer decides: its left half maps to its
    /// left edge, its right half to its right edge. In a right-to-left run
    /// the left edge is the cluster's logical end. A point exactly on an
    /// edge belongs to the cluster on its right. The result is `Upstream`
    /// when it is the logical end of the run that was hit.
    pub fn closest_in_line(
        &mut self,
        layout: &LayoutResult,
        area_width: f32,
        x_alignment: XAlignment,
        line_index: usize,
        x: f32,
    ) -> Result<CursorPosition> {
        let line = layout.line(line_index)?;
        let x = x - layout.line_x_start(line_index, area_width, x_alignment)?;
        let runs = layout.runs(line);
        if runs.is_empty() {
            return Ok(CursorPosition::new(line.text_range.start));
        }

        let mut index = 0;
        let mut pen = 0.0;
        while index + 1 < runs.len() && x >= pen + runs[index].width() {
            pen += runs[index].width();
            index += 1;
        }
        self.hit_run(layout, &runs[index], x - pen)
    }

    /// Position under the point `(x, y)` relative to the text area.
    pub fn closest_to_position(
        &mut self,
        layout: &LayoutResult,
        area_width: f32,
        x_alignment: XAlignment,
        x: f32,
        y: f32,
    ) -> Result<CursorPosition> {
        self.closest_with(layout, area_width, x_alignment, x, y, None)
    }

    /// Like [`closest_to_position`](Self::closest_to_position) for layouts
    /// whose lines were shifted horizontally, e.g. around an obstacle.
    /// `line_offset(line)` is subtracted from `x` before the line is
    /// searched.
    pub fn closest_to_position_with_offsets<F>(
        &mut self,
        layout: &LayoutResult,
        area_width: f32,
        x_alignment: XAlignment,
        x: f32,
        y: f32,
        mut line_offset: F,
    ) -> Result<CursorPosition>
    where
        F: FnMut(usize) -> f32,
    {
        let offsets = LineOffsetFn::new(&mut line_offset);
        self.closest_with(layout, area_width, x_alignment, x, y, Some(offsets))
    }

    fn closest_with(
        &mut self,
        layout: &LayoutResult,
        area_width: f32,
        x_alignment: XAlignment,
        x: f32,
        y: f32,
        offsets: Option<LineOffsetFn<'_>>,
    ) -> Result<CursorPosition> {
        let Some(line) = layout.line_at_height(y - layout.text_start_y()) else {
            return Ok(CursorPosition::default());
        };
        let x = match offsets {
            Some(mut offsets) => x - offsets.call(line),
            None => x,
        };
        self.closest_in_line(layout, area_width, x_alignment, line, x)
    }

    /// Caret rectangle of `position`, relative to the text area.
    ///
    /// `Upstream` positions at a line wrap stay at the end of the earlier
    /// line; at a bidi run boundary they stick to the run that ends there.
    pub fn caret(
        &mut self,
        layout: &LayoutResult,
        area_width: f32,
        x_alignment: XAlignment,
        position: CursorPosition,
    ) -> Result<Caret> {
        let lines = layout.lines();
        if lines.is_empty() {
            return Ok(Caret {
                x: area_width * x_alignment.factor(),
                y: layout.text_start_y(),
                height: 0.0,
                line: 0,
            });
        }

        let line_index = caret_line(lines, position);
        let line = &lines[line_index];
        let line_x = layout.line_x_start(line_index, area_width, x_alignment)?;
        let upstream = position.affinity == CursorAffinity::Upstream;
        let offset = position.offset;

        let runs = layout.runs(line);
        let hit = runs
            .iter()
            .position(|run| upstream && run.text_range.end == offset)
            .or_else(|| runs.iter().position(|run| run.text_range.contains(&offset)))
            .or_else(|| runs.iter().position(|run| run.text_range.end == offset));

        let x = match hit {
            Some(index) => {
                let run = &runs[index];
                let pen: f32 = runs[..index].iter().map(VisualRun::width).sum();
                let before = self.advance_before(layout, run, offset)?;
                if run.is_rtl() {
                    pen + run.width() - before
                } else {
                    pen + before
                }
            }
            None if line.rtl => 0.0,
            None => line.width,
        };

        Ok(Caret {
            x: line_x + x,
            y: layout.text_start_y() + line.top,
            height: line.height,
            line: line_index,
        })
    }

    fn hit_run(&mut self, layout: &LayoutResult, run: &VisualRun, x: f32) -> Result<CursorPosition> {
        self.collect_spans(layout, run);
        let count = self.spans.len();
        if count == 0 {
            return Ok(CursorPosition::new(run.text_range.start));
        }
        let rtl = run.is_rtl();
        let logical = |visual: usize| if rtl { count - 1 - visual } else { visual };

        let mut visual = 0;
        let mut pen = 0.0;
        while visual + 1 < count && x >= pen + self.spans[logical(visual)].advance {
            pen += self.spans[logical(visual)].advance;
            visual += 1;
        }
        let span = self.spans[logical(visual)].clone();
        let offset = self.offset_in_span(&span, rtl, x - pen)?;

        let affinity = if offset == run.text_range.end && !run.text_range.is_empty() {
            CursorAffinity::Upstream
        } else {
            CursorAffinity::Downstream
        };
        Ok(CursorPosition::with_affinity(offset, affinity))
    }

    /// Logical offset for `x` inside a cluster. Clusters holding several
    /// graphemes (ligatures) are split evenly between them.
    fn offset_in_span(&mut self, span: &ClusterSpan, rtl: bool, x: f32) -> Result<usize> {
        let graphemes = self.boundaries(BoundaryKind::Character)?;
        let inner = inner_boundaries(graphemes, &span.text);
        let parts = inner.len() + 1;
        let part_width = span.advance / parts as f32;
        let visual = if part_width > 0.0 {
            ((x / part_width) as usize).min(parts - 1)
        } else {
            0
        };
        let part = if rtl { parts - 1 - visual } else { visual };
        let start = if part == 0 { span.text.start } else { inner[part - 1] };
        let end = if part + 1 == parts { span.text.end } else { inner[part] };

        let left_half = x - visual as f32 * part_width < part_width / 2.0;
        Ok(if left_half != rtl {
            snap_back(graphemes, start)
        } else {
            snap_forward(graphemes, end)
        })
    }

    /// Distance from the run's logical start to `offset`, along the run's
    /// direction.
    fn advance_before(&mut self, layout: &LayoutResult, run: &VisualRun, offset: usize) -> Result<f32> {
        self.collect_spans(layout, run);
        let mut total = 0.0;
        for index in 0..self.spans.len() {
            let span = &self.spans[index];
            if span.text.end <= offset {
                total += span.advance;
                continue;
            }
            if span.text.start < offset {
                let advance = span.advance;
                let text = span.text.clone();
                let graphemes = self.boundaries(BoundaryKind::Character)?;
                let inner = inner_boundaries(graphemes, &text);
                let before = inner.partition_point(|&b| b <= offset);
                total += advance * before as f32 / (inner.len() + 1) as f32;
            }
            break;
        }
        Ok(total)
    }

    fn collect_spans(&mut self, layout: &LayoutResult, run: &VisualRun) {
        self.spans.clear();
        let indices = layout.run_char_indices(run);
        let advances = layout.advances(run);
        let mut start = 0;
        while start < indices.len() {
            let offset = indices[start];
            let mut end = start;
            let mut advance = 0;
            while end < indices.len() && indices[end] == offset {
                advance += advances[end];
                end += 1;
            }
            let text_end = indices.get(end).copied().unwrap_or(run.text_range.end);
            self.spans.push(ClusterSpan {
                text: offset..text_end.max(offset),
                advance: fixed::to_f32(advance),
            });
            start = end;
        }
    }
}

/// Line holding the caret for `position`.
fn caret_line(lines: &[Line], position: CursorPosition) -> usize {
    let offset = position.offset;
    let index = lines.partition_point(|line| line.text_range.end <= offset);
    if position.affinity == CursorAffinity::Upstream
        && index > 0
        && lines[index - 1].text_range.end == offset
        && !lines[index - 1].is_degenerate()
    {
        return index - 1;
    }
    index.min(lines.len() - 1)
}

/// Grapheme boundaries strictly inside `range`.
fn inner_boundaries<'b>(graphemes: &'b [usize], range: &Range<usize>) -> &'b [usize] {
    let low = graphemes.partition_point(|&b| b <= range.start);
    let high = graphemes.partition_point(|&b| b < range.end);
    &graphemes[low..high.max(low)]
}

fn snap_back(graphemes: &[usize], offset: usize) -> usize {
    let index = graphemes.partition_point(|&b| b <= offset);
    index.checked_sub(1).map_or(offset, |i| graphemes[i])
}

fn snap_forward(graphemes: &[usize], offset: usize) -> usize {
    graphemes
        .get(graphemes.partition_point(|&b| b < offset))
        .copied()
        .unwrap_or(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LayoutError;
    use crate::font::{Font, LineMetrics};
    use crate::layout::{BuildParams, LayoutBuilder};
    use crate::shaping::{GlyphBuffer, ShapeRequest, Shaper};
    use crate::test_support::{FailingSegmenter, StubShaper, font_runs};

    fn layout(text: &str, width: f32) -> LayoutResult {
        LayoutBuilder::new(StubShaper)
            .build(text, &font_runs(text), &BuildParams::new(width, 0.0))
            .unwrap()
    }

    fn up(offset: usize) -> CursorPosition {
        CursorPosition::with_affinity(offset, CursorAffinity::Upstream)
    }

    fn down(offset: usize) -> CursorPosition {
        CursorPosition::new(offset)
    }

    #[test]
    fn character_moves_round_trip() {
        let text = "ae\u{301}b🇫🇷c";
        let mut cursor = CursorController::new(text);
        let mut boundaries = vec![0];
        let mut position = down(0);
        while position.offset < text.len() {
            position = cursor.next_character(position).unwrap();
            boundaries.push(position.offset);
        }
        assert_eq!(boundaries, vec![0, 1, 4, 5, 13, 14]);
        for &offset in &boundaries[1..boundaries.len() - 1] {
            let prev = cursor.prev_character(down(offset)).unwrap();
            assert_eq!(cursor.next_character(prev).unwrap(), down(offset));
        }
        assert_eq!(cursor.prev_character(down(0)).unwrap(), down(0));
        assert_eq!(cursor.next_character(down(text.len())).unwrap(), down(text.len()));
    }

    #[test]
    fn word_moves_walk_structural_boundaries() {
        let mut cursor = CursorController::new("one two, three");
        assert_eq!(cursor.next_word(down(0)).unwrap(), down(3));
        assert_eq!(cursor.next_word(down(3)).unwrap(), down(4));
        assert_eq!(cursor.next_word(down(4)).unwrap(), down(7));
        assert_eq!(cursor.prev_word(down(14)).unwrap(), down(9));
        assert_eq!(cursor.prev_word(down(5)).unwrap(), down(4));
        assert_eq!(cursor.prev_word(down(0)).unwrap(), down(0));
    }

    #[test]
    fn set_text_rebuilds_tables() {
        let first = String::from("abc");
        let second = String::from("a\u{301}");
        let mut cursor = CursorController::new(&first);
        assert_eq!(cursor.next_character(down(0)).unwrap(), down(1));
        cursor.set_text(&second);
        assert_eq!(cursor.text(), "a\u{301}");
        assert_eq!(cursor.next_character(down(0)).unwrap(), down(3));
    }

    #[test]
    fn segmenter_failure_propagates() {
        let mut cursor = CursorController::with_segmenter("abc", FailingSegmenter);
        assert!(matches!(
            cursor.next_character(down(0)),
            Err(LayoutError::Segmentation(_))
        ));
    }

    #[test]
    fn hit_test_tie_breaks_across_bidi_runs() {
        let text = "Hello שלום";
        let layout = layout(text, 0.0);
        let mut cursor = CursorController::new(text);
        let mut hit = |x| cursor.closest_in_line(&layout, 0.0, XAlignment::Left, 0, x).unwrap();
        assert_eq!(hit(-5.0), down(0));
        assert_eq!(hit(3.0), down(0));
        assert_eq!(hit(5.0), down(1));
        assert_eq!(hit(46.0), up(6));
        assert_eq!(hit(48.0), up(14));
        assert_eq!(hit(50.0), up(14));
        assert_eq!(hit(53.0), down(12));
        assert_eq!(hit(78.0), down(6));
        assert_eq!(hit(100.0), down(6));
    }

    #[test]
    fn carets_follow_affinity() {
        let text = "Hello שלום";
        let layout = layout(text, 0.0);
        let mut cursor = CursorController::new(text);
        let mut x = |position| {
            cursor
                .caret(&layout, 0.0, XAlignment::Left, position)
                .unwrap()
                .x
        };
        assert_eq!(x(down(0)), 0.0);
        assert_eq!(x(up(6)), 48.0);
        assert_eq!(x(down(6)), 80.0);
        assert_eq!(x(up(14)), 48.0);
        assert_eq!(x(down(12)), 56.0);
    }

    #[test]
    fn hits_and_carets_round_trip() {
        let text = "Hello שלום";
        let layout = layout(text, 0.0);
        let mut cursor = CursorController::new(text);
        for step in 0..40 {
            let x = step as f32 * 2.0 + 1.0;
            let position = cursor
                .closest_in_line(&layout, 0.0, XAlignment::Left, 0, x)
                .unwrap();
            let caret = cursor.caret(&layout, 0.0, XAlignment::Left, position).unwrap();
            assert!((caret.x - x).abs() <= 4.0, "x {x} -> {position:?} -> {}", caret.x);
        }
    }

    #[test]
    fn wrapped_lines_share_an_offset() {
        let text = "hello world";
        let layout = layout(text, 60.0);
        let mut cursor = CursorController::new(text);
        assert_eq!(
            cursor
                .closest_to_position(&layout, 60.0, XAlignment::Left, 0.0, 20.0)
                .unwrap(),
            down(6)
        );
        assert_eq!(
            cursor
                .closest_to_position(&layout, 60.0, XAlignment::Left, 200.0, 2.0)
                .unwrap(),
            up(6)
        );

        let upstream = cursor.caret(&layout, 60.0, XAlignment::Left, up(6)).unwrap();
        assert_eq!((upstream.line, upstream.x, upstream.y), (0, 48.0, 0.0));
        let downstream = cursor.caret(&layout, 60.0, XAlignment::Left, down(6)).unwrap();
        assert_eq!((downstream.line, downstream.x, downstream.y), (1, 0.0, 16.0));
        assert_eq!(downstream.height, 16.0);
    }

    #[test]
    fn alignment_and_line_offsets_shift_hits() {
        let text = "abcd";
        let layout = layout(text, 0.0);
        let mut cursor = CursorController::new(text);
        let right = cursor
            .closest_to_position(&layout, 100.0, XAlignment::Right, 77.0, 0.0)
            .unwrap();
        assert_eq!(right, down(1));
        let shifted = cursor
            .closest_to_position_with_offsets(&layout, 0.0, XAlignment::Left, 27.0, 0.0, |_| 20.0)
            .unwrap();
        assert_eq!(shifted, down(1));
        let caret = cursor.caret(&layout, 100.0, XAlignment::Right, down(1)).unwrap();
        assert_eq!(caret.x, 76.0);
    }

    #[test]
    fn empty_layouts_and_lines() {
        let mut cursor = CursorController::new("");
        let empty = LayoutResult::new();
        assert_eq!(
            cursor
                .closest_to_position(&empty, 0.0, XAlignment::Left, 10.0, 10.0)
                .unwrap(),
            down(0)
        );
        assert_eq!(cursor.caret(&empty, 0.0, XAlignment::Left, down(0)).unwrap().height, 0.0);

        let text = "a\n\nb";
        let layout = layout(text, 0.0);
        let mut cursor = CursorController::new(text);
        assert_eq!(
            cursor
                .closest_in_line(&layout, 0.0, XAlignment::Left, 1, 30.0)
                .unwrap(),
            down(2)
        );
        let caret = cursor.caret(&layout, 0.0, XAlignment::Left, down(2)).unwrap();
        assert_eq!((caret.line, caret.x, caret.y), (1, 0.0, 16.0));
        assert!(matches!(
            cursor.closest_in_line(&layout, 0.0, XAlignment::Left, 3, 0.0),
            Err(LayoutError::OutOfRange { index: 3, len: 3 })
        ));
    }

    /// Shapes a whole run into one glyph, like a ligature.
    struct LigatureShaper;

    impl Shaper for LigatureShaper {
        fn shape(&self, request: &ShapeRequest<'_>, out: &mut GlyphBuffer) -> Result<()> {
            let chars = request.run_text().chars().count() as i32;
            out.push(1, request.range.start, chars * 512, 0, 0);
            Ok(())
        }

        fn line_metrics(&self, font: &Font) -> Result<LineMetrics> {
            StubShaper.line_metrics(font)
        }
    }

    #[test]
    fn ligatures_split_between_graphemes() {
        let text = "abcd";
        let layout = LayoutBuilder::new(LigatureShaper)
            .build(text, &font_runs(text), &BuildParams::default())
            .unwrap();
        let mut cursor = CursorController::new(text);
        let position = cursor
            .closest_in_line(&layout, 0.0, XAlignment::Left, 0, 13.0)
            .unwrap();
        assert_eq!(position, down(2));
        let caret = cursor.caret(&layout, 0.0, XAlignment::Left, down(3)).unwrap();
        assert_eq!(caret.x, 24.0);
    }
}
