//! Paragraph layout.
//!
//! [`LayoutBuilder`] runs segmentation, bidi, shaping, tab expansion, line
//! breaking and visual reordering, producing a [`LayoutResult`] that a
//! renderer draws and a [`CursorController`](crate::CursorController)
//! queries.

pub mod builder;
pub mod params;
pub mod result;

pub use builder::LayoutBuilder;
pub use params::{BuildParams, LayoutFlags, XAlignment, YAlignment};
pub use result::{LayoutResult, Line, PositionedGlyph, VisualRun};
