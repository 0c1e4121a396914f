/// Font-level metrics in font units.
#[derive(Debug, Clone, Copy)]
pub struct FontMetrics {
    /// Ascent above baseline (positive).
    pub ascent: f32,
    /// Descent below baseline (positive).
    pub descent: f32,
    /// Line gap (leading).
    pub line_gap: f32,
    /// Units per em.
    pub units_per_em: u16,
}

impl FontMetrics {
    /// Calculate line height (ascent + descent + line_gap).
    pub fn line_height(&self) -> f32 {
        self.ascent + self.descent + self.line_gap
    }

    /// Scale metrics to pixel size, where `font_size` is in logical pixels
    /// (px per em).
    pub fn scale_to_pixels(&self, font_size: f32) -> ScaledFontMetrics {
        let scale = if self.units_per_em != 0 {
            font_size / self.units_per_em as f32
        } else {
            1.0
        };
        ScaledFontMetrics {
            ascent: self.ascent * scale,
            descent: self.descent * scale,
            line_gap: self.line_gap * scale,
            font_size,
        }
    }
}

/// Scaled font metrics in pixels.
#[derive(Debug, Clone, Copy)]
pub struct ScaledFontMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
    pub font_size: f32,
}

/// Everything the layout builder needs to know about a sized font to stack
/// lines and expand tabs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    /// Pixels above the baseline.
    pub ascent: f32,
    /// Pixels below the baseline (positive).
    pub descent: f32,
    /// Extra spacing between lines in pixels.
    pub line_gap: f32,
    /// Advance of U+0020 in 26.6 fixed point.
    pub space_advance: i32,
    /// Glyph id that renders U+0020, substituted for expanded tabs.
    pub space_glyph: u32,
}

impl LineMetrics {
    pub fn line_height(&self) -> f32 {
        self.ascent + self.descent + self.line_gap
    }
}

impl From<ScaledFontMetrics> for LineMetrics {
    fn from(scaled: ScaledFontMetrics) -> Self {
        Self {
            ascent: scaled.ascent,
            descent: scaled.descent,
            line_gap: scaled.line_gap,
            space_advance: 0,
            space_glyph: 0,
        }
    }
}
