use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::runs::ValueRuns;

bitflags! {
    /// Layout behaviour switches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct LayoutFlags: u8 {
        /// Default to right-to-left when a paragraph has no strongly
        /// directional characters. Leave unset to default to LTR.
        const RIGHT_TO_LEFT = 1;
        /// Force the configured direction as the paragraph base direction,
        /// regardless of the characters present.
        const OVERRIDE_DIRECTIONALITY = 1 << 1;
        /// The text is composed vertically.
        const VERTICAL = 1 << 2;
        /// `tab_width` is in pixels rather than space widths.
        const TAB_WIDTH_PIXELS = 1 << 3;
        /// Ignore soft line breaks even when a width limit exists.
        const IGNORE_SOFT_BREAKS = 1 << 4;
        /// Cut lines that do not fit and stop at the area height.
        const TRUNCATE = 1 << 5;
    }
}

/// Horizontal alignment of lines within the text area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XAlignment {
    #[default]
    Left,
    Center,
    Right,
}

impl XAlignment {
    /// Fraction of the free space placed before the line.
    pub fn factor(self) -> f32 {
        match self {
            XAlignment::Left => 0.0,
            XAlignment::Center => 0.5,
            XAlignment::Right => 1.0,
        }
    }
}

/// Vertical alignment of the whole text block within the text area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YAlignment {
    #[default]
    Top,
    Center,
    Bottom,
}

impl YAlignment {
    pub fn factor(self) -> f32 {
        match self {
            YAlignment::Top => 0.0,
            YAlignment::Center => 0.5,
            YAlignment::Bottom => 1.0,
        }
    }
}

/// Offset that aligns `content` within `area` by `factor`.
pub(crate) fn align_offset(area: f32, content: f32, factor: f32) -> f32 {
    (area - content) * factor
}

/// Parameters of a single layout build.
#[derive(Debug, Clone, Copy)]
pub struct BuildParams<'a> {
    /// Width used for soft line breaks and truncation; 0 disables both
    /// unless a per-line width callback is supplied.
    pub area_width: f32,
    /// Height bound for truncation and vertical alignment; 0 is unbounded.
    pub area_height: f32,
    /// Tab stop interval, in pixels or space widths per
    /// [`LayoutFlags::TAB_WIDTH_PIXELS`].
    pub tab_width: f32,
    pub flags: LayoutFlags,
    pub x_alignment: XAlignment,
    pub y_alignment: YAlignment,
    pub smallcaps: Option<&'a ValueRuns<bool>>,
    pub subscript: Option<&'a ValueRuns<bool>>,
    pub superscript: Option<&'a ValueRuns<bool>>,
}

impl Default for BuildParams<'_> {
    fn default() -> Self {
        Self {
            area_width: 0.0,
            area_height: 0.0,
            tab_width: 4.0,
            flags: LayoutFlags::empty(),
            x_alignment: XAlignment::Left,
            y_alignment: YAlignment::Top,
            smallcaps: None,
            subscript: None,
            superscript: None,
        }
    }
}

impl<'a> BuildParams<'a> {
    pub fn new(area_width: f32, area_height: f32) -> Self {
        Self {
            area_width,
            area_height,
            ..Self::default()
        }
    }

    pub fn with_flags(mut self, flags: LayoutFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_tab_width(mut self, tab_width: f32) -> Self {
        self.tab_width = tab_width;
        self
    }

    pub fn with_alignment(mut self, x_alignment: XAlignment, y_alignment: YAlignment) -> Self {
        self.x_alignment = x_alignment;
        self.y_alignment = y_alignment;
        self
    }

    pub fn with_smallcaps(mut self, runs: &'a ValueRuns<bool>) -> Self {
        self.smallcaps = Some(runs);
        self
    }

    pub fn with_subscript(mut self, runs: &'a ValueRuns<bool>) -> Self {
        self.subscript = Some(runs);
        self
    }

    pub fn with_superscript(mut self, runs: &'a ValueRuns<bool>) -> Self {
        self.superscript = Some(runs);
        self
    }

    /// Whether truncation drops a line ending at `bottom`.
    pub(crate) fn clips_line(&self, bottom: f32) -> bool {
        self.flags.contains(LayoutFlags::TRUNCATE)
            && self.area_height > 0.0
            && bottom > self.area_height
    }
}
