//! Bidirectional (BiDi) text support.
//!
//! The builder asks a [`BidiEngine`] for per-byte embedding levels of each
//! paragraph and for the visual order of the level runs of each line. The
//! default [`UnicodeBidi`] engine is built on `unicode-bidi` (UAX-9).

pub mod levels;
pub mod reorder;

pub use levels::UnicodeBidi;
pub use reorder::reorder_levels;

use crate::error::Result;

/// Base direction request for paragraph analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseDirection {
    /// Detect from the first strong character, left-to-right if none.
    Auto,
    /// Detect from the first strong character, right-to-left if none.
    AutoRtl,
    /// Force overall left-to-right base direction.
    Ltr,
    /// Force overall right-to-left base direction.
    Rtl,
}

impl BaseDirection {
    /// Resolve the request from the layout's direction flags.
    pub fn from_flags(right_to_left: bool, override_directionality: bool) -> Self {
        match (right_to_left, override_directionality) {
            (false, false) => Self::Auto,
            (true, false) => Self::AutoRtl,
            (false, true) => Self::Ltr,
            (true, true) => Self::Rtl,
        }
    }
}

/// Bidi leveling service.
pub trait BidiEngine {
    /// Resolve embedding levels for one paragraph.
    ///
    /// Clears `levels` and fills it with one level per byte of `paragraph`
    /// (multi-byte characters repeat their level). Returns the paragraph
    /// embedding level.
    fn paragraph_levels(
        &self,
        paragraph: &str,
        base: BaseDirection,
        levels: &mut Vec<u8>,
    ) -> Result<u8>;

    /// Visual order of a line's runs given their levels in logical order.
    ///
    /// Clears `order` and fills it with logical run indices, leftmost first.
    fn reorder(&self, levels: &[u8], order: &mut Vec<usize>) {
        reorder_levels(levels, order);
    }
}

impl<B: BidiEngine + ?Sized> BidiEngine for &B {
    fn paragraph_levels(
        &self,
        paragraph: &str,
        base: BaseDirection,
        levels: &mut Vec<u8>,
    ) -> Result<u8> {
        (**self).paragraph_levels(paragraph, base, levels)
    }

    fn reorder(&self, levels: &[u8], order: &mut Vec<usize>) {
        (**self).reorder(levels, order)
    }
}

/// Whether an embedding level runs right-to-left.
pub fn is_rtl(level: u8) -> bool {
    level & 1 == 1
}
