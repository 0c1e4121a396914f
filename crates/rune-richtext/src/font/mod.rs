pub mod collection;
pub mod face;
pub mod metrics;

pub use collection::{FontCache, FontCollection};
pub use face::FontFace;
pub use metrics::{FontMetrics, LineMetrics, ScaledFontMetrics};

use thiserror::Error;

/// Errors that can occur while working with fonts.
#[derive(Error, Debug)]
pub enum FontError {
    #[error("font I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid font data")]
    InvalidFont,
}

/// Convenient result alias for font-related operations.
pub type Result<T> = std::result::Result<T, FontError>;

/// Index of a face within a [`FontCollection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(pub u32);

/// A face at a given pixel size; the value carried by font attribute runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub id: FontId,
    /// Pixels per em.
    pub size: f32,
}

impl Font {
    pub fn new(id: FontId, size: f32) -> Self {
        Self { id, size }
    }
}
