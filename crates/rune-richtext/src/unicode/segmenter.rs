use unicode_linebreak::{BreakOpportunity, linebreaks};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;
use crate::unicode::{BoundaryKind, Segmenter};

/// Default boundary service backed by `unicode-segmentation` (UAX-29)
/// and `unicode-linebreak` (UAX-14).
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeSegmenter;

impl UnicodeSegmenter {
    pub fn new() -> Self {
        Self
    }
}

impl Segmenter for UnicodeSegmenter {
    fn boundaries(&self, text: &str, kind: BoundaryKind, out: &mut Vec<usize>) -> Result<()> {
        out.clear();
        if text.is_empty() {
            return Ok(());
        }

        match kind {
            BoundaryKind::Character => {
                out.extend(
                    text.grapheme_indices(true)
                        .map(|(byte_idx, _)| byte_idx)
                        .filter(|&byte_idx| byte_idx > 0),
                );
                out.push(text.len());
            }
            BoundaryKind::Word => {
                out.extend(
                    text.split_word_bound_indices()
                        .map(|(byte_idx, _)| byte_idx)
                        .filter(|&byte_idx| byte_idx > 0),
                );
                out.push(text.len());
            }
            BoundaryKind::Line => {
                out.extend(linebreaks(text).map(|(offset, _)| offset));
            }
            BoundaryKind::Paragraph => {
                out.extend(
                    linebreaks(text)
                        .filter(|(_, opp)| *opp == BreakOpportunity::Mandatory)
                        .map(|(offset, _)| offset),
                );
            }
        }

        // UAX-14 always reports end-of-text; keep the contract explicit for
        // the other kinds as well.
        if out.last() != Some(&text.len()) {
            out.push(text.len());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str, kind: BoundaryKind) -> Vec<usize> {
        let mut out = vec![42];
        UnicodeSegmenter.boundaries(text, kind, &mut out).unwrap();
        out
    }

    #[test]
    fn empty_text_has_no_boundaries() {
        assert!(collect("", BoundaryKind::Character).is_empty());
        assert!(collect("", BoundaryKind::Paragraph).is_empty());
    }

    #[test]
    fn basic_ascii_graphemes() {
        assert_eq!(collect("abc", BoundaryKind::Character), vec![1, 2, 3]);
    }

    #[test]
    fn combining_mark_stays_with_base() {
        let text = "a\u{0301}b"; // a + COMBINING ACUTE
        assert_eq!(collect(text, BoundaryKind::Character), vec![3, 4]);
    }

    #[test]
    fn emoji_zwj_sequence_is_single_cluster() {
        let text = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
        assert_eq!(collect(text, BoundaryKind::Character), vec![text.len()]);
    }

    #[test]
    fn word_boundaries_include_punctuation_edges() {
        let text = "Hello, world";
        // "Hello" "," " " "world"
        assert_eq!(collect(text, BoundaryKind::Word), vec![5, 6, 7, 12]);
    }

    #[test]
    fn line_breaks_follow_spaces() {
        assert_eq!(collect("ab cd ef", BoundaryKind::Line), vec![3, 6, 8]);
    }

    #[test]
    fn paragraphs_end_after_hard_breaks() {
        assert_eq!(collect("a b\nc\r\nd", BoundaryKind::Paragraph), vec![4, 7, 8]);
        assert_eq!(collect("a\n", BoundaryKind::Paragraph), vec![2]);
        assert_eq!(collect("\n\n", BoundaryKind::Paragraph), vec![1, 2]);
    }
}
