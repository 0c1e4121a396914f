use unicode_bidi::{BidiClass, BidiInfo, LTR_LEVEL, Level, RTL_LEVEL, bidi_class};

use crate::bidi::{BaseDirection, BidiEngine};
use crate::error::{LayoutError, Result};

/// Default bidi engine running UAX-9 through `unicode-bidi`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeBidi;

impl UnicodeBidi {
    pub fn new() -> Self {
        Self
    }
}

impl BidiEngine for UnicodeBidi {
    fn paragraph_levels(
        &self,
        paragraph: &str,
        base: BaseDirection,
        levels: &mut Vec<u8>,
    ) -> Result<u8> {
        levels.clear();

        let para_level = match base {
            BaseDirection::Auto => None,
            BaseDirection::AutoRtl => Some(match first_strong_is_rtl(paragraph) {
                Some(false) => LTR_LEVEL,
                _ => RTL_LEVEL,
            }),
            BaseDirection::Ltr => Some(LTR_LEVEL),
            BaseDirection::Rtl => Some(RTL_LEVEL),
        };

        if paragraph.is_empty() {
            return Ok(para_level.unwrap_or(LTR_LEVEL).number());
        }

        let info = BidiInfo::new(paragraph, para_level);
        if info.levels.len() != paragraph.len() {
            return Err(LayoutError::Bidi(format!(
                "expected {} levels, got {}",
                paragraph.len(),
                info.levels.len()
            )));
        }

        let resolved = info
            .paragraphs
            .first()
            .map(|para| para.level)
            .unwrap_or(LTR_LEVEL);
        levels.extend(info.levels.iter().map(Level::number));
        Ok(resolved.number())
    }
}

/// Direction of the first strong character (rule P2), if any.
fn first_strong_is_rtl(text: &str) -> Option<bool> {
    text.chars().find_map(|ch| match bidi_class(ch) {
        BidiClass::L => Some(false),
        BidiClass::R | BidiClass::AL => Some(true),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidi::is_rtl;

    fn levels(text: &str, base: BaseDirection) -> (u8, Vec<u8>) {
        let mut out = Vec::new();
        let para = UnicodeBidi.paragraph_levels(text, base, &mut out).unwrap();
        (para, out)
    }

    #[test]
    fn detects_paragraph_direction_auto() {
        let (para, _) = levels("אבג abc", BaseDirection::Auto);
        assert!(is_rtl(para));
        let (para, _) = levels("abc אבג", BaseDirection::Auto);
        assert!(!is_rtl(para));
    }

    #[test]
    fn base_direction_override_ltr() {
        let (para, _) = levels("אבג abc", BaseDirection::Ltr);
        assert_eq!(para, 0);
        let (para, _) = levels("abc", BaseDirection::Rtl);
        assert_eq!(para, 1);
    }

    #[test]
    fn auto_rtl_only_applies_without_strong_characters() {
        assert_eq!(levels("123 ...", BaseDirection::AutoRtl).0, 1);
        assert_eq!(levels("123 ...", BaseDirection::Auto).0, 0);
        assert_eq!(levels("abc", BaseDirection::AutoRtl).0, 0);
    }

    #[test]
    fn levels_cover_all_bytes() {
        let text = "a אב";
        let (_, out) = levels(text, BaseDirection::Auto);
        assert_eq!(out.len(), text.len());
    }

    #[test]
    fn mixed_ltr_with_rtl_segment_has_distinct_levels() {
        let text = "Hello שלום";
        let (_, out) = levels(text, BaseDirection::Auto);
        assert!(out[..6].iter().all(|&l| l == 0));
        assert!(out[6..].iter().all(|&l| l == 1));
    }

    #[test]
    fn empty_paragraph_reports_requested_level() {
        assert_eq!(levels("", BaseDirection::Rtl), (1, Vec::new()));
        assert_eq!(levels("", BaseDirection::Auto), (0, Vec::new()));
    }
}
