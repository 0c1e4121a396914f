//! Error types for layout building and cursor navigation.

use thiserror::Error;

use crate::font::{FontError, FontId};

/// Result type for rune-richtext operations.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors that can occur while building or querying a layout.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// An index query past the end of the queried sequence.
    #[error("index {index} out of range (length {len})")]
    OutOfRange { index: usize, len: usize },

    /// The attribute runs do not cover the text exactly.
    #[error("attribute runs cover {runs} bytes but the text is {text} bytes long")]
    RunLengthMismatch { runs: usize, text: usize },

    /// The boundary service failed.
    #[error("segmentation failed: {0}")]
    Segmentation(String),

    /// The bidi engine failed.
    #[error("bidi resolution failed: {0}")]
    Bidi(String),

    /// The shaper failed.
    #[error("shaping failed: {0}")]
    Shaping(String),

    /// A font id that was never registered with the shaper.
    #[error("unknown font id {0:?}")]
    UnknownFont(FontId),

    /// Font loading failed.
    #[error(transparent)]
    Font(#[from] FontError),

    /// Configuration could not be parsed.
    #[error("invalid layout config: {0}")]
    Config(#[from] toml::de::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LayoutError {
    pub(crate) fn out_of_range(index: usize, len: usize) -> Self {
        Self::OutOfRange { index, len }
    }
}
