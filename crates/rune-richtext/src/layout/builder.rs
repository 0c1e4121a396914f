use core::fmt;
use core::ops::Range;

use hashbrown::HashMap;
use unicode_script::Script;

use crate::bidi::{BaseDirection, BidiEngine, UnicodeBidi, is_rtl};
use crate::callback::LineWidthFn;
use crate::error::{LayoutError, Result};
use crate::fixed;
use crate::font::{Font, FontId, LineMetrics};
use crate::layout::params::{BuildParams, LayoutFlags, align_offset};
use crate::layout::result::{LayoutResult, Line, VisualRun};
use crate::runs::{RunCursor, ValueRuns};
use crate::shaping::{GlyphBuffer, ShapeRequest, Shaper, TextStyle};
use crate::unicode::{BoundaryKind, ScriptRun, Segmenter, UnicodeSegmenter, trailing_separator_len};

/// Text sharing font, style, bidi level and script.
#[derive(Debug, Clone)]
struct LogicalRun {
    font: Font,
    style: TextStyle,
    level: u8,
    script: Script,
    text: Range<usize>,
    /// Range into the paragraph glyph buffer.
    glyphs: Range<usize>,
}

/// Glyphs sharing one source offset; the unit of line breaking.
#[derive(Debug, Clone)]
struct Cluster {
    glyphs: Range<usize>,
    offset: usize,
    advance: i32,
    whitespace: bool,
}

/// Per-line width limit in 26.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Limit {
    Unbounded,
    Width(i32),
    /// The width callback left no room at all.
    Exhausted,
}

/// Buffers reused across builds.
#[derive(Debug, Default)]
struct Scratch {
    paragraphs: Vec<usize>,
    breaks: Vec<usize>,
    levels: Vec<u8>,
    runs: Vec<LogicalRun>,
    glyphs: GlyphBuffer,
    clusters: Vec<Cluster>,
    pieces: Vec<LogicalRun>,
    piece_levels: Vec<u8>,
    order: Vec<usize>,
}

impl Scratch {
    fn clear(&mut self) {
        self.paragraphs.clear();
        self.breaks.clear();
        self.levels.clear();
        self.clear_paragraph();
    }

    fn clear_paragraph(&mut self) {
        self.runs.clear();
        self.glyphs.clear();
        self.clusters.clear();
        self.pieces.clear();
        self.piece_levels.clear();
        self.order.clear();
    }
}

/// Turns attributed text into a [`LayoutResult`].
///
/// Segmentation, bidi and shaping are delegated to injected services; the
/// builder itself only orchestrates them and owns scratch buffers that are
/// cleared and reused from one build to the next. The only state kept
/// across builds is a memo of the owned shaper's line metrics per font and
/// size, which never changes a result.
///
/// ```ignore
/// let mut builder = LayoutBuilder::new(HarfrustShaper::new(fonts));
/// let runs = ValueRuns::new(font, text.len());
/// let layout = builder.build(text, &runs, &BuildParams::new(320.0, 0.0))?;
/// ```
pub struct LayoutBuilder {
    segmenter: Box<dyn Segmenter>,
    bidi: Box<dyn BidiEngine>,
    shaper: Box<dyn Shaper>,
    metrics: HashMap<(FontId, u32), LineMetrics>,
    scratch: Scratch,
}

impl fmt::Debug for LayoutBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutBuilder")
            .field("cached_metrics", &self.metrics.len())
            .finish_non_exhaustive()
    }
}

impl LayoutBuilder {
    /// Builder using the Unicode segmenter and bidi engine.
    pub fn new(shaper: impl Shaper + 'static) -> Self {
        Self::with_services(UnicodeSegmenter, UnicodeBidi, shaper)
    }

    pub fn with_services(
        segmenter: impl Segmenter + 'static,
        bidi: impl BidiEngine + 'static,
        shaper: impl Shaper + 'static,
    ) -> Self {
        Self {
            segmenter: Box::new(segmenter),
            bidi: Box::new(bidi),
            shaper: Box::new(shaper),
            metrics: HashMap::new(),
            scratch: Scratch::default(),
        }
    }

    /// Scaled vertical metrics of `font`, cached per font and size.
    pub fn line_metrics(&mut self, font: Font) -> Result<LineMetrics> {
        cached_metrics(&*self.shaper, &mut self.metrics, font)
    }

    /// Lay out `text` with `fonts` assigning a font to every byte.
    pub fn build(
        &mut self,
        text: &str,
        fonts: &ValueRuns<Font>,
        params: &BuildParams<'_>,
    ) -> Result<LayoutResult> {
        let mut result = LayoutResult::new();
        self.run(text, fonts, params, None, &mut result)?;
        Ok(result)
    }

    /// Like [`build`](Self::build), with the width of each line supplied
    /// by `line_width(line_number, accumulated_height)`.
    ///
    /// A width of zero or less at the start of a line produces a
    /// degenerate empty line and ends the build; the caller resumes from
    /// [`LayoutResult::consumed_len`].
    pub fn build_with_line_widths<F>(
        &mut self,
        text: &str,
        fonts: &ValueRuns<Font>,
        params: &BuildParams<'_>,
        mut line_width: F,
    ) -> Result<LayoutResult>
    where
        F: FnMut(usize, f32) -> f32,
    {
        let mut result = LayoutResult::new();
        let widths = LineWidthFn::new(&mut line_width);
        self.run(text, fonts, params, Some(widths), &mut result)?;
        Ok(result)
    }

    /// Overwrite `result` in place, reusing its allocations. On error the
    /// result is left empty.
    pub fn build_into(
        &mut self,
        text: &str,
        fonts: &ValueRuns<Font>,
        params: &BuildParams<'_>,
        result: &mut LayoutResult,
    ) -> Result<()> {
        self.run(text, fonts, params, None, result)
    }

    pub fn build_into_with_line_widths<F>(
        &mut self,
        text: &str,
        fonts: &ValueRuns<Font>,
        params: &BuildParams<'_>,
        mut line_width: F,
        result: &mut LayoutResult,
    ) -> Result<()>
    where
        F: FnMut(usize, f32) -> f32,
    {
        let widths = LineWidthFn::new(&mut line_width);
        self.run(text, fonts, params, Some(widths), result)
    }

    fn run(
        &mut self,
        text: &str,
        fonts: &ValueRuns<Font>,
        params: &BuildParams<'_>,
        widths: Option<LineWidthFn<'_>>,
        result: &mut LayoutResult,
    ) -> Result<()> {
        result.clear();
        self.scratch.clear();
        let outcome = self.layout(text, fonts, params, widths, result);
        match &outcome {
            Ok(()) => log::debug!(
                "laid out {}/{} bytes into {} lines ({} glyphs)",
                result.consumed,
                text.len(),
                result.lines.len(),
                result.glyphs.len()
            ),
            Err(err) => {
                log::debug!("layout of {} bytes failed: {err}", text.len());
                result.clear();
            }
        }
        outcome
    }

    fn layout(
        &mut self,
        text: &str,
        fonts: &ValueRuns<Font>,
        params: &BuildParams<'_>,
        widths: Option<LineWidthFn<'_>>,
        result: &mut LayoutResult,
    ) -> Result<()> {
        check_coverage(fonts.len(), text.len())?;
        for overlay in [params.smallcaps, params.subscript, params.superscript]
            .into_iter()
            .flatten()
        {
            check_coverage(overlay.len(), text.len())?;
        }
        if text.is_empty() {
            return Ok(());
        }

        let Self {
            segmenter,
            bidi,
            shaper,
            metrics,
            scratch,
        } = self;
        let pass = Pass {
            text,
            fonts,
            params: *params,
            widths,
            segmenter: &**segmenter,
            bidi: &**bidi,
            shaper: &**shaper,
            metrics,
            scratch,
            result,
            stopped: false,
        };
        pass.run()
    }
}

fn check_coverage(runs: usize, text: usize) -> Result<()> {
    if runs == text {
        Ok(())
    } else {
        Err(LayoutError::RunLengthMismatch { runs, text })
    }
}

fn cached_metrics(
    shaper: &dyn Shaper,
    cache: &mut HashMap<(FontId, u32), LineMetrics>,
    font: Font,
) -> Result<LineMetrics> {
    let key = (font.id, font.size.to_bits());
    if let Some(metrics) = cache.get(&key) {
        return Ok(*metrics);
    }
    let metrics = shaper.line_metrics(&font)?;
    cache.insert(key, metrics);
    Ok(metrics)
}

/// Segmenter output must be strictly increasing, land on char boundaries
/// of `text` and end at its length.
fn check_boundaries(text: &str, boundaries: &[usize], kind: BoundaryKind) -> Result<()> {
    let len = text.len();
    let increasing = boundaries.windows(2).all(|pair| pair[0] < pair[1]);
    let ends = boundaries.last().copied() == Some(len) && boundaries[0] > 0;
    let aligned = boundaries.iter().all(|&offset| text.is_char_boundary(offset));
    if increasing && aligned && (ends || (len == 0 && boundaries.is_empty())) {
        return Ok(());
    }
    log::warn!("segmenter returned invalid {kind:?} boundaries {boundaries:?} for {len} bytes");
    Err(LayoutError::Segmentation(format!(
        "invalid {kind:?} boundaries for {len} bytes"
    )))
}

fn overlay_at(cursor: &mut Option<RunCursor<'_, bool>>, index: usize) -> Result<bool> {
    match cursor {
        Some(cursor) => cursor.value_at(index).copied(),
        None => Ok(false),
    }
}

/// State of one build.
struct Pass<'p, 'w> {
    text: &'p str,
    fonts: &'p ValueRuns<Font>,
    params: BuildParams<'p>,
    widths: Option<LineWidthFn<'w>>,
    segmenter: &'p dyn Segmenter,
    bidi: &'p dyn BidiEngine,
    shaper: &'p dyn Shaper,
    metrics: &'p mut HashMap<(FontId, u32), LineMetrics>,
    scratch: &'p mut Scratch,
    result: &'p mut LayoutResult,
    /// Set once truncation or a degenerate line ends the build early.
    stopped: bool,
}

impl Pass<'_, '_> {
    fn run(mut self) -> Result<()> {
        let text = self.text;
        self.segmenter
            .boundaries(text, BoundaryKind::Paragraph, &mut self.scratch.paragraphs)?;
        check_boundaries(text, &self.scratch.paragraphs, BoundaryKind::Paragraph)?;

        let mut start = 0;
        for index in 0..self.scratch.paragraphs.len() {
            let end = self.scratch.paragraphs[index];
            self.paragraph(start..end)?;
            if self.stopped {
                break;
            }
            start = end;
        }

        if self.params.area_height > 0.0 {
            self.result.text_start_y = align_offset(
                self.params.area_height,
                self.result.text_height(),
                self.params.y_alignment.factor(),
            );
        }
        Ok(())
    }

    fn paragraph(&mut self, range: Range<usize>) -> Result<()> {
        let content_end = range.end - trailing_separator_len(&self.text[range.clone()]);
        let content = &self.text[range.start..content_end];
        self.scratch.clear_paragraph();

        let base = BaseDirection::from_flags(
            self.params.flags.contains(LayoutFlags::RIGHT_TO_LEFT),
            self.params.flags.contains(LayoutFlags::OVERRIDE_DIRECTIONALITY),
        );
        let paragraph_level = self
            .bidi
            .paragraph_levels(content, base, &mut self.scratch.levels)?;
        if self.scratch.levels.len() != content.len() {
            log::warn!(
                "bidi engine returned {} levels for a {} byte paragraph",
                self.scratch.levels.len(),
                content.len()
            );
            return Err(LayoutError::Bidi(format!(
                "expected {} levels, got {}",
                content.len(),
                self.scratch.levels.len()
            )));
        }
        let rtl = is_rtl(paragraph_level);
        log::trace!("paragraph {range:?} at level {paragraph_level}");

        self.itemize(range.start..content_end)?;
        self.shape()?;
        self.expand_tabs()?;
        self.collect_clusters(content_end);

        if self.scratch.clusters.is_empty() {
            if self.line_limit() == Limit::Exhausted {
                self.degenerate_line(range.start);
                return Ok(());
            }
            let font = *self.fonts.value_at(range.start)?;
            return self.empty_line(range, font, rtl);
        }
        self.break_lines(range, content_end, rtl)
    }

    /// Split the paragraph into logical runs at every change of level,
    /// script, font or style.
    fn itemize(&mut self, range: Range<usize>) -> Result<()> {
        let mut fonts = self.fonts.cursor();
        let mut smallcaps = self.params.smallcaps.map(ValueRuns::cursor);
        let mut subscript = self.params.subscript.map(ValueRuns::cursor);
        let mut superscript = self.params.superscript.map(ValueRuns::cursor);
        let mut script = ScriptRun::default();
        let mut current: Option<LogicalRun> = None;
        let text = self.text;

        for (offset, ch) in text[range.clone()].char_indices() {
            let index = range.start + offset;
            let font = *fonts.value_at(index)?;
            let style = TextStyle {
                smallcaps: overlay_at(&mut smallcaps, index)?,
                subscript: overlay_at(&mut subscript, index)?,
                superscript: overlay_at(&mut superscript, index)?,
            };
            let level = self.scratch.levels[offset];
            let end = index + ch.len_utf8();

            match current.as_mut() {
                Some(run)
                    if run.font == font
                        && run.style == style
                        && run.level == level
                        && !script.breaks_before(ch) =>
                {
                    script.extend(ch);
                    run.script = script.script();
                    run.text.end = end;
                }
                _ => {
                    self.scratch.runs.extend(current.take());
                    script.restart(ch);
                    current = Some(LogicalRun {
                        font,
                        style,
                        level,
                        script: script.script(),
                        text: index..end,
                        glyphs: 0..0,
                    });
                }
            }
        }
        self.scratch.runs.extend(current);
        Ok(())
    }

    fn shape(&mut self) -> Result<()> {
        let vertical = self.params.flags.contains(LayoutFlags::VERTICAL);
        let scratch = &mut *self.scratch;
        for run in scratch.runs.iter_mut() {
            let first = scratch.glyphs.len();
            let request = ShapeRequest {
                text: self.text,
                range: run.text.clone(),
                font: run.font,
                script: run.script,
                rtl: is_rtl(run.level),
                vertical,
                style: run.style,
            };
            self.shaper.shape(&request, &mut scratch.glyphs)?;
            run.glyphs = first..scratch.glyphs.len();

            if !scratch.glyphs.is_valid_run(run.glyphs.clone(), run.text.clone()) {
                log::warn!(
                    "shaper returned clusters {:?} for run {:?}",
                    &scratch.glyphs.clusters[run.glyphs.clone()],
                    run.text
                );
                return Err(LayoutError::Shaping(format!(
                    "clusters out of logical order or outside run {:?}",
                    run.text
                )));
            }
        }
        Ok(())
    }

    /// Stretch tab glyphs to the next stop of a grid anchored at the
    /// paragraph start. The tab itself is drawn as the font's space glyph.
    fn expand_tabs(&mut self) -> Result<()> {
        let pixels = self.params.flags.contains(LayoutFlags::TAB_WIDTH_PIXELS);
        let scratch = &mut *self.scratch;
        let glyphs = &mut scratch.glyphs;
        let mut pen = 0i32;

        for run in &scratch.runs {
            for index in run.glyphs.clone() {
                let cluster = glyphs.clusters[index];
                if self.text.get(cluster..).is_some_and(|rest| rest.starts_with('\t')) {
                    let metrics = cached_metrics(self.shaper, self.metrics, run.font)?;
                    let unit = if pixels {
                        fixed::from_f32(self.params.tab_width)
                    } else {
                        (self.params.tab_width * metrics.space_advance as f32).round() as i32
                    };
                    if unit > 0 {
                        let stop = (pen.div_euclid(unit) + 1) * unit;
                        glyphs.glyphs[index] = metrics.space_glyph;
                        glyphs.advances[index] = stop - pen;
                        glyphs.x_offsets[index] = 0;
                        glyphs.y_offsets[index] = 0;
                    }
                }
                pen += glyphs.advances[index];
            }
        }
        Ok(())
    }

    fn collect_clusters(&mut self, content_end: usize) {
        let scratch = &mut *self.scratch;
        let glyphs = &scratch.glyphs;
        let mut start = 0;
        while start < glyphs.len() {
            let offset = glyphs.clusters[start];
            let mut end = start + 1;
            while end < glyphs.len() && glyphs.clusters[end] == offset {
                end += 1;
            }
            let text_end = glyphs.clusters.get(end).copied().unwrap_or(content_end);
            let whitespace = self
                .text
                .get(offset..text_end)
                .is_some_and(|text| text.chars().all(char::is_whitespace));
            scratch.clusters.push(Cluster {
                glyphs: start..end,
                offset,
                advance: glyphs.advance_sum(start..end),
                whitespace,
            });
            start = end;
        }
    }

    fn line_limit(&mut self) -> Limit {
        match self.widths.as_mut() {
            Some(widths) => {
                let width = widths.call(self.result.lines.len(), self.result.text_height());
                if width > 0.0 {
                    Limit::Width(fixed::from_f32(width))
                } else {
                    Limit::Exhausted
                }
            }
            None if self.params.area_width > 0.0 => {
                Limit::Width(fixed::from_f32(self.params.area_width))
            }
            None => Limit::Unbounded,
        }
    }

    fn break_lines(&mut self, range: Range<usize>, content_end: usize, rtl: bool) -> Result<()> {
        let content = &self.text[range.start..content_end];
        self.segmenter
            .boundaries(content, BoundaryKind::Line, &mut self.scratch.breaks)?;
        check_boundaries(content, &self.scratch.breaks, BoundaryKind::Line)?;

        let soft = !self.params.flags.contains(LayoutFlags::IGNORE_SOFT_BREAKS);
        let truncate = self.params.flags.contains(LayoutFlags::TRUNCATE);
        let count = self.scratch.clusters.len();
        let mut line_start = 0;
        let mut text_start = range.start;

        while line_start < count {
            let limit = self.line_limit();
            if limit == Limit::Exhausted {
                self.degenerate_line(text_start);
                return Ok(());
            }

            let mut pen = 0;
            let mut candidate = None;
            let mut cut = None;
            for index in line_start..count {
                let cluster = &self.scratch.clusters[index];
                if index > line_start
                    && self
                        .scratch
                        .breaks
                        .binary_search(&(cluster.offset - range.start))
                        .is_ok()
                {
                    candidate = Some(index);
                }
                if let Limit::Width(limit) = limit
                    && index > line_start
                    && !cluster.whitespace
                    && pen + cluster.advance > limit
                {
                    let at = candidate.filter(|_| soft).or(truncate.then_some(index));
                    if at.is_some() {
                        cut = at;
                        break;
                    }
                }
                pen += cluster.advance;
            }

            let line_end = cut.unwrap_or(count);
            let text_end = match self.scratch.clusters.get(line_end) {
                Some(cluster) => cluster.offset,
                None => range.end,
            };
            self.commit_line(line_start..line_end, text_start..text_end, content_end, rtl)?;
            if self.stopped {
                return Ok(());
            }
            line_start = line_end;
            text_start = text_end;
        }
        Ok(())
    }

    fn commit_line(
        &mut self,
        clusters: Range<usize>,
        text: Range<usize>,
        content_end: usize,
        rtl: bool,
    ) -> Result<()> {
        let scratch = &mut *self.scratch;
        let glyphs = scratch.clusters[clusters.start].glyphs.start
            ..scratch.clusters[clusters.end - 1].glyphs.end;
        let content = text.start..text.end.min(content_end);

        scratch.pieces.clear();
        scratch.piece_levels.clear();
        for run in &scratch.runs {
            let piece_glyphs = run.glyphs.start.max(glyphs.start)..run.glyphs.end.min(glyphs.end);
            if piece_glyphs.is_empty() {
                continue;
            }
            scratch.pieces.push(LogicalRun {
                text: run.text.start.max(content.start)..run.text.end.min(content.end),
                glyphs: piece_glyphs,
                ..run.clone()
            });
            scratch.piece_levels.push(run.level);
        }
        self.bidi.reorder(&scratch.piece_levels, &mut scratch.order);

        let (mut ascent, mut descent, mut height) = (0.0f32, 0.0f32, 0.0f32);
        for piece in &scratch.pieces {
            let metrics = cached_metrics(self.shaper, self.metrics, piece.font)?;
            ascent = ascent.max(metrics.ascent);
            descent = descent.max(metrics.descent);
            height = height.max(metrics.line_height());
        }

        let top = self.result.text_height();
        if self.params.clips_line(top + height) {
            log::trace!("line {text:?} exceeds the area height, stopping");
            self.stopped = true;
            return Ok(());
        }

        let result = &mut *self.result;
        let run_start = result.runs.len();
        let glyph_start = result.glyphs.len();
        let mut width = 0;
        for &index in &scratch.order {
            let piece = &scratch.pieces[index];
            let source = piece.glyphs.clone();
            let first = result.glyphs.len();
            result
                .glyphs
                .extend_from_slice(&scratch.glyphs.glyphs[source.clone()]);
            result
                .char_indices
                .extend_from_slice(&scratch.glyphs.clusters[source.clone()]);
            result
                .advances
                .extend_from_slice(&scratch.glyphs.advances[source.clone()]);
            result
                .x_offsets
                .extend_from_slice(&scratch.glyphs.x_offsets[source.clone()]);
            result
                .y_offsets
                .extend_from_slice(&scratch.glyphs.y_offsets[source.clone()]);
            let advance = scratch.glyphs.advance_sum(source);
            width += advance;
            result.runs.push(VisualRun {
                font: piece.font,
                style: piece.style,
                level: piece.level,
                text_range: piece.text.clone(),
                glyph_range: first..result.glyphs.len(),
                advance,
            });
        }

        log::trace!(
            "line {} {text:?}: {} runs, width {}",
            result.lines.len(),
            result.runs.len() - run_start,
            fixed::to_f32(width)
        );
        result.consumed = text.end;
        result.lines.push(Line {
            run_range: run_start..result.runs.len(),
            glyph_range: glyph_start..result.glyphs.len(),
            text_range: text,
            width: fixed::to_f32(width),
            ascent,
            descent,
            height,
            top,
            rtl,
        });
        Ok(())
    }

    /// A paragraph without glyphs still occupies one line of its font.
    fn empty_line(&mut self, text: Range<usize>, font: Font, rtl: bool) -> Result<()> {
        let metrics = cached_metrics(self.shaper, self.metrics, font)?;
        let top = self.result.text_height();
        if self.params.clips_line(top + metrics.line_height()) {
            self.stopped = true;
            return Ok(());
        }
        let runs = self.result.runs.len();
        let glyphs = self.result.glyphs.len();
        self.result.consumed = text.end;
        self.result.lines.push(Line {
            run_range: runs..runs,
            glyph_range: glyphs..glyphs,
            text_range: text,
            width: 0.0,
            ascent: metrics.ascent,
            descent: metrics.descent,
            height: metrics.line_height(),
            top,
            rtl,
        });
        Ok(())
    }

    fn degenerate_line(&mut self, at: usize) {
        log::debug!(
            "no width for line {} at byte {at}, ending build",
            self.result.lines.len()
        );
        let runs = self.result.runs.len();
        let glyphs = self.result.glyphs.len();
        let top = self.result.text_height();
        self.result.lines.push(Line {
            run_range: runs..runs,
            glyph_range: glyphs..glyphs,
            text_range: at..at,
            width: 0.0,
            ascent: 0.0,
            descent: 0.0,
            height: 0.0,
            top,
            rtl: false,
        });
        self.stopped = true;
    }
}
