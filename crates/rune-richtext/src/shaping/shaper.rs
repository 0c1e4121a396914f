use harfrust::{
    Direction as HbDirection,
    Feature as HbFeature,
    FontRef as HbFontRef,
    Script as HbScript,
    ShaperData,
    ShaperInstance,
    Tag as HbTag,
    UnicodeBuffer as HbUnicodeBuffer,
};
use unicode_script::Script;

use crate::error::{LayoutError, Result};
use crate::fixed;
use crate::font::{Font, FontCollection, LineMetrics};

use super::{GlyphBuffer, ShapeRequest, Shaper, TextStyle};

/// Text shaper built on harfrust (pure-Rust HarfBuzz port).
///
/// Handles kerning, ligatures, mark positioning and complex scripts per
/// run; font fallback is left to whoever builds the font runs.
#[derive(Debug, Default, Clone)]
pub struct HarfrustShaper {
    fonts: FontCollection,
}

impl HarfrustShaper {
    pub fn new(fonts: FontCollection) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &FontCollection {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontCollection {
        &mut self.fonts
    }
}

impl Shaper for HarfrustShaper {
    fn shape(&self, request: &ShapeRequest<'_>, out: &mut GlyphBuffer) -> Result<()> {
        let face = self
            .fonts
            .get(request.font.id)
            .ok_or(LayoutError::UnknownFont(request.font.id))?;

        let font_ref = HbFontRef::from_index(face.data(), face.index())
            .map_err(|err| LayoutError::Shaping(format!("invalid font data: {err}")))?;

        // Shaper configuration with default (no variations) instance.
        let data = ShaperData::new(&font_ref);
        let instance =
            ShaperInstance::from_variations(&font_ref, core::iter::empty::<harfrust::Variation>());
        let shaper = data
            .shaper(&font_ref)
            .instance(Some(&instance))
            .point_size(None)
            .build();

        let mut buffer = HbUnicodeBuffer::new();
        buffer.push_str(request.run_text());
        buffer.set_direction(match (request.vertical, request.rtl) {
            (true, _) => HbDirection::TopToBottom,
            (false, true) => HbDirection::RightToLeft,
            (false, false) => HbDirection::LeftToRight,
        });
        if let Some(script) = harfrust_script(request.script) {
            buffer.set_script(script);
        }
        // Let harfrust fill in any remaining segment properties.
        buffer.guess_segment_properties();

        let features = style_features(request.style);
        let glyph_buffer = shaper.shape(buffer, &features);
        let infos = glyph_buffer.glyph_infos();
        let positions = glyph_buffer.glyph_positions();

        // harfrust uses design units; convert to pixels using the font's
        // units-per-em and requested size.
        let metrics = face.metrics();
        let scale = if metrics.units_per_em != 0 {
            request.font.size / metrics.units_per_em as f32
        } else {
            1.0
        };

        let start = out.len();
        for (info, pos) in infos.iter().zip(positions.iter()) {
            let advance = if request.vertical {
                -pos.y_advance
            } else {
                pos.x_advance
            };
            out.push(
                info.glyph_id,
                request.range.start + info.cluster as usize,
                fixed::from_f32(advance as f32 * scale),
                fixed::from_f32(pos.x_offset as f32 * scale),
                fixed::from_f32(-(pos.y_offset as f32) * scale),
            );
        }

        // HarfBuzz emits right-to-left runs in visual order.
        if request.rtl && !request.vertical {
            out.reverse(start..out.len());
        }

        log::trace!(
            "shaped {:?} ({:?}, rtl={}) into {} glyphs",
            request.range,
            request.script,
            request.rtl,
            out.len() - start
        );
        Ok(())
    }

    fn line_metrics(&self, font: &Font) -> Result<LineMetrics> {
        let face = self
            .fonts
            .get(font.id)
            .ok_or(LayoutError::UnknownFont(font.id))?;
        Ok(face.line_metrics(font.size))
    }
}

fn harfrust_script(script: Script) -> Option<HbScript> {
    let name: [u8; 4] = script.short_name().as_bytes().try_into().ok()?;
    HbScript::from_iso15924_tag(HbTag::new(&name))
}

fn style_features(style: TextStyle) -> Vec<HbFeature> {
    let mut features = Vec::new();
    if style.smallcaps {
        features.push(HbFeature::new(HbTag::new(b"smcp"), 1, ..));
    }
    if style.subscript {
        features.push(HbFeature::new(HbTag::new(b"subs"), 1, ..));
    }
    if style.superscript {
        features.push(HbFeature::new(HbTag::new(b"sups"), 1, ..));
    }
    features
}
