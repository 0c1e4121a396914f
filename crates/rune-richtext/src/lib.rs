//! rune-richtext: paragraph layout and cursor navigation.
//!
//! Styled text goes in as UTF-8 plus [`ValueRuns`] assigning a [`Font`] to
//! every byte; a [`LayoutBuilder`] turns it into a [`LayoutResult`] of lines
//! and visual glyph runs, and a [`CursorController`] maps between points
//! and text offsets on that result.
//!
//! - `runs`: run-length attribute tracks
//! - `unicode`, `bidi`, `shaping`: the injected text services and their
//!   default implementations (unicode-segmentation/linebreak, unicode-bidi,
//!   harfrust)
//! - `layout`: the builder and the result model
//! - `cursor`: movement, hit-testing and carets
//! - `flow`: wrapping around a rectangular obstacle

pub mod bidi;
pub mod callback;
pub mod config;
pub mod cursor;
pub mod error;
pub mod fixed;
pub mod flow;
pub mod font;
pub mod layout;
pub mod runs;
pub mod shaping;
pub mod unicode;

#[cfg(test)]
pub(crate) mod test_support;

pub use bidi::{BaseDirection, BidiEngine, UnicodeBidi};
pub use callback::{CallbackRef, LineOffsetFn, LineWidthFn};
pub use config::LayoutConfig;
pub use cursor::{Caret, CursorAffinity, CursorController, CursorPosition};
pub use error::{LayoutError, Result};
pub use flow::{FlowBlock, ObstacleFlow, Rect};
pub use font::{
    Font, FontCache, FontCollection, FontError, FontFace, FontId, FontMetrics, LineMetrics,
    ScaledFontMetrics,
};
pub use layout::{
    BuildParams, LayoutBuilder, LayoutFlags, LayoutResult, Line, PositionedGlyph, VisualRun,
    XAlignment, YAlignment,
};
pub use runs::ValueRuns;
pub use shaping::{GlyphBuffer, HarfrustShaper, ShapeRequest, Shaper, TextStyle};
pub use unicode::{BoundaryKind, Segmenter, UnicodeSegmenter};
