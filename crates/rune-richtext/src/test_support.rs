//! Deterministic services for unit tests.

use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use crate::bidi::{BaseDirection, BidiEngine};
use crate::error::{LayoutError, Result};
use crate::fixed;
use crate::font::{Font, FontId, LineMetrics};
use crate::runs::ValueRuns;
use crate::shaping::{GlyphBuffer, ShapeRequest, Shaper, TextStyle};
use crate::unicode::{BoundaryKind, Segmenter};

/// Shapes one glyph per char with an advance of half the font size.
/// Glyph ids are the char's scalar value.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct StubShaper;

pub(crate) fn stub_advance(font: Font) -> i32 {
    fixed::from_f32(font.size / 2.0)
}

impl Shaper for StubShaper {
    fn shape(&self, request: &ShapeRequest<'_>, out: &mut GlyphBuffer) -> Result<()> {
        let advance = stub_advance(request.font);
        for (offset, ch) in request.run_text().char_indices() {
            out.push(ch as u32, request.range.start + offset, advance, 0, 0);
        }
        Ok(())
    }

    fn line_metrics(&self, font: &Font) -> Result<LineMetrics> {
        Ok(LineMetrics {
            ascent: font.size * 0.8,
            descent: font.size * 0.2,
            line_gap: 0.0,
            space_advance: stub_advance(*font),
            space_glyph: ' ' as u32,
        })
    }
}

/// [`StubShaper`] that keeps the range, orientation and style of every
/// request it sees.
#[derive(Debug, Default, Clone)]
pub(crate) struct RecordingShaper {
    pub(crate) requests: Rc<RefCell<Vec<(Range<usize>, bool, TextStyle)>>>,
}

impl Shaper for RecordingShaper {
    fn shape(&self, request: &ShapeRequest<'_>, out: &mut GlyphBuffer) -> Result<()> {
        self.requests
            .borrow_mut()
            .push((request.range.clone(), request.vertical, request.style));
        StubShaper.shape(request, out)
    }

    fn line_metrics(&self, font: &Font) -> Result<LineMetrics> {
        StubShaper.line_metrics(font)
    }
}

/// Emits clusters pointing outside the requested range.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct OutOfRangeShaper;

impl Shaper for OutOfRangeShaper {
    fn shape(&self, request: &ShapeRequest<'_>, out: &mut GlyphBuffer) -> Result<()> {
        out.push(1, request.range.start, 64, 0, 0);
        out.push(2, request.range.end + 1, 64, 0, 0);
        Ok(())
    }

    fn line_metrics(&self, font: &Font) -> Result<LineMetrics> {
        StubShaper.line_metrics(font)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct FailingShaper;

impl Shaper for FailingShaper {
    fn shape(&self, _request: &ShapeRequest<'_>, _out: &mut GlyphBuffer) -> Result<()> {
        Err(LayoutError::Shaping("stub failure".into()))
    }

    fn line_metrics(&self, font: &Font) -> Result<LineMetrics> {
        StubShaper.line_metrics(font)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct FailingBidi;

impl BidiEngine for FailingBidi {
    fn paragraph_levels(
        &self,
        _paragraph: &str,
        _base: BaseDirection,
        _levels: &mut Vec<u8>,
    ) -> Result<u8> {
        Err(LayoutError::Bidi("stub failure".into()))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct FailingSegmenter;

impl Segmenter for FailingSegmenter {
    fn boundaries(&self, _text: &str, _kind: BoundaryKind, _out: &mut Vec<usize>) -> Result<()> {
        Err(LayoutError::Segmentation("stub failure".into()))
    }
}

/// Reports a boundary after the first byte, whether or not it ends a char.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct FirstByteSegmenter;

impl Segmenter for FirstByteSegmenter {
    fn boundaries(&self, text: &str, _kind: BoundaryKind, out: &mut Vec<usize>) -> Result<()> {
        out.clear();
        if text.len() > 1 {
            out.push(1);
        }
        if !text.is_empty() {
            out.push(text.len());
        }
        Ok(())
    }
}

pub(crate) const FONT: Font = Font {
    id: FontId(0),
    size: 16.0,
};

/// The whole of `text` in [`FONT`]; 8px per char.
pub(crate) fn font_runs(text: &str) -> ValueRuns<Font> {
    ValueRuns::new(FONT, text.len())
}
