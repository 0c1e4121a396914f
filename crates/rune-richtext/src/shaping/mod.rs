//! Glyph shaping.
//!
//! The builder shapes one logical run at a time through a [`Shaper`]. The
//! default [`HarfrustShaper`] uses harfrust (a pure-Rust HarfBuzz port) over
//! faces registered in a [`FontCollection`](crate::font::FontCollection).

pub mod shaped_run;
pub mod shaper;

pub use shaped_run::{GlyphBuffer, ShapeRequest, TextStyle};
pub use shaper::HarfrustShaper;

use crate::error::Result;
use crate::font::{Font, LineMetrics};

/// Shaping service.
pub trait Shaper {
    /// Shape `request.range` of `request.text` and append the glyphs to
    /// `out` in logical order, whatever the run direction.
    ///
    /// Every appended cluster must be an absolute byte offset inside the
    /// requested range, and clusters must be non-decreasing. The first
    /// appended glyph must belong to the range start.
    fn shape(&self, request: &ShapeRequest<'_>, out: &mut GlyphBuffer) -> Result<()>;

    /// Vertical metrics and space advance of a sized font.
    fn line_metrics(&self, font: &Font) -> Result<LineMetrics>;
}

impl<S: Shaper + ?Sized> Shaper for &S {
    fn shape(&self, request: &ShapeRequest<'_>, out: &mut GlyphBuffer) -> Result<()> {
        (**self).shape(request, out)
    }

    fn line_metrics(&self, font: &Font) -> Result<LineMetrics> {
        (**self).line_metrics(font)
    }
}
