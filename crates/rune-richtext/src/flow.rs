//! Wrapping text around a rectangular obstacle.
//!
//! [`ObstacleFlow`] drives [`LayoutBuilder::build_with_line_widths`] the
//! way a text box avoiding an image would: lines whose band overlaps the
//! obstacle are narrowed to the wider free side, and when no side is left
//! the remaining text is laid out again below the obstacle.

use core::ops::Range;

use crate::error::Result;
use crate::font::Font;
use crate::layout::{BuildParams, LayoutBuilder, LayoutFlags, LayoutResult, Line};
use crate::runs::ValueRuns;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Overlap with a non-empty area; touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// One uninterrupted build of a flow.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowBlock {
    /// Top of the block relative to the bounds.
    pub y: f32,
    /// Source bytes laid out by this block.
    pub text_range: Range<usize>,
    pub layout: LayoutResult,
    /// Horizontal shift of each line, relative to the bounds.
    pub line_offsets: Vec<f32>,
}

impl FlowBlock {
    pub fn line_offset(&self, line: usize) -> f32 {
        self.line_offsets.get(line).copied().unwrap_or(0.0)
    }
}

/// Single-font text flowing inside `bounds` around `obstacle`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleFlow {
    pub bounds: Rect,
    /// In the same coordinate space as `bounds`.
    pub obstacle: Option<Rect>,
    pub font: Font,
    pub tab_width: f32,
    pub flags: LayoutFlags,
}

impl ObstacleFlow {
    pub fn new(bounds: Rect, font: Font) -> Self {
        Self {
            bounds,
            obstacle: None,
            font,
            tab_width: 4.0,
            flags: LayoutFlags::empty(),
        }
    }

    pub fn with_obstacle(mut self, obstacle: Rect) -> Self {
        self.obstacle = Some(obstacle);
        self
    }

    fn params(&self, area_height: f32) -> BuildParams<'static> {
        BuildParams::new(self.bounds.width, area_height)
            .with_flags(self.flags | LayoutFlags::TRUNCATE)
            .with_tab_width(self.tab_width)
    }

    /// Lay out `text` into one or more blocks, top to bottom.
    pub fn layout(&self, builder: &mut LayoutBuilder, text: &str) -> Result<Vec<FlowBlock>> {
        let bounds = self.bounds;
        let obstacle = match self.obstacle {
            Some(obstacle) if obstacle.intersects(&bounds) => obstacle,
            _ => {
                let fonts = ValueRuns::new(self.font, text.len());
                let layout = builder.build(text, &fonts, &self.params(bounds.height))?;
                let lines = layout.line_count();
                return Ok(vec![FlowBlock {
                    y: 0.0,
                    text_range: 0..layout.consumed_len(),
                    layout,
                    line_offsets: vec![0.0; lines],
                }]);
            }
        };

        let line_height = builder.line_metrics(self.font)?.line_height();
        let top = obstacle.y - bounds.y;
        let bottom = obstacle.bottom() - bounds.y;
        let left = obstacle.x - bounds.x;
        let right = obstacle.right() - bounds.x;
        let (side_offset, side_width) = if left >= bounds.width - right {
            (0.0, left)
        } else {
            (right, bounds.width - right)
        };

        let mut blocks = Vec::new();
        let mut offset = 0;
        let mut y = 0.0f32;
        while offset < text.len() && (bounds.height <= 0.0 || y < bounds.height) {
            let rest = &text[offset..];
            let fonts = ValueRuns::new(self.font, rest.len());
            let height = if bounds.height > 0.0 { bounds.height - y } else { 0.0 };
            let block_y = y;
            let mut line_offsets = Vec::new();
            let layout = builder.build_with_line_widths(
                rest,
                &fonts,
                &self.params(height),
                |_, accumulated| {
                    let line_top = block_y + accumulated;
                    let overlaps = line_top < bottom && line_top + line_height > top;
                    let (x, width) = if overlaps {
                        (side_offset, side_width)
                    } else {
                        (0.0, bounds.width)
                    };
                    line_offsets.push(x);
                    width
                },
            )?;
            line_offsets.truncate(layout.line_count());

            let consumed = layout.consumed_len();
            let blocked = layout.lines().last().is_some_and(Line::is_degenerate);
            let next_y = if blocked {
                bottom.max(block_y + layout.text_height())
            } else {
                block_y + layout.text_height()
            };
            log::trace!(
                "flow block at {block_y}: {} lines, {consumed} bytes, blocked={blocked}",
                layout.line_count()
            );

            if layout.lines().iter().any(|line| !line.is_degenerate()) {
                blocks.push(FlowBlock {
                    y: block_y,
                    text_range: offset..offset + consumed,
                    layout,
                    line_offsets,
                });
            }
            offset += consumed;
            if !blocked || next_y <= block_y {
                break;
            }
            y = next_y;
        }
        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{CursorController, CursorPosition};
    use crate::layout::XAlignment;
    use crate::test_support::{FONT, StubShaper};

    const TEXT: &str = "aaaa bbbb cccc dddd eeee ffff gggg";

    fn line_texts<'t>(text: &'t str, block: &FlowBlock) -> Vec<&'t str> {
        let base = block.text_range.start;
        block
            .layout
            .lines()
            .iter()
            .filter(|line| !line.is_degenerate())
            .map(|line| &text[base + line.text_range.start..base + line.text_range.end])
            .collect()
    }

    #[test]
    fn rects_intersect_only_on_overlap() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(bounds.intersects(&Rect::new(90.0, 90.0, 20.0, 20.0)));
        assert!(!bounds.intersects(&Rect::new(100.0, 0.0, 20.0, 20.0)));
        assert!(!bounds.intersects(&Rect::new(0.0, -30.0, 50.0, 30.0)));
    }

    #[test]
    fn distant_obstacle_matches_plain_layout() {
        let bounds = Rect::new(10.0, 10.0, 100.0, 100.0);
        let flow = ObstacleFlow::new(bounds, FONT).with_obstacle(Rect::new(300.0, 0.0, 50.0, 50.0));
        let mut builder = LayoutBuilder::new(StubShaper);
        let blocks = flow.layout(&mut builder, TEXT).unwrap();
        assert_eq!(blocks.len(), 1);

        let params = BuildParams::new(100.0, 100.0).with_flags(LayoutFlags::TRUNCATE);
        let plain = builder
            .build(TEXT, &ValueRuns::new(FONT, TEXT.len()), &params)
            .unwrap();
        assert_eq!(blocks[0].layout, plain);
        assert_eq!(blocks[0].text_range, 0..TEXT.len());
    }

    #[test]
    fn lines_beside_obstacle_use_wider_side() {
        let flow = ObstacleFlow::new(Rect::new(0.0, 0.0, 100.0, 100.0), FONT)
            .with_obstacle(Rect::new(0.0, 16.0, 60.0, 16.0));
        let mut builder = LayoutBuilder::new(StubShaper);
        let blocks = flow.layout(&mut builder, TEXT).unwrap();
        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(
            line_texts(TEXT, block),
            vec!["aaaa bbbb ", "cccc ", "dddd eeee ", "ffff gggg"]
        );
        assert_eq!(block.line_offsets, vec![0.0, 60.0, 0.0, 0.0]);
        assert_eq!(block.line_offset(1), 60.0);
        assert_eq!(block.line_offset(9), 0.0);

        let mut cursor = CursorController::new(TEXT);
        let hit = cursor
            .closest_to_position_with_offsets(
                &block.layout,
                100.0,
                XAlignment::Left,
                61.0,
                20.0,
                |line| block.line_offset(line),
            )
            .unwrap();
        assert_eq!(hit, CursorPosition::new(10));
    }

    #[test]
    fn empty_paragraphs_keep_their_own_offsets() {
        let text = "aaaa\n\nbbbb";
        let flow = ObstacleFlow::new(Rect::new(0.0, 0.0, 100.0, 100.0), FONT)
            .with_obstacle(Rect::new(0.0, 32.0, 60.0, 16.0));
        let mut builder = LayoutBuilder::new(StubShaper);
        let blocks = flow.layout(&mut builder, text).unwrap();
        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(line_texts(text, block), vec!["aaaa\n", "\n", "bbbb"]);
        assert_eq!(block.layout.line(2).unwrap().top, 32.0);
        assert_eq!(block.line_offsets, vec![0.0, 0.0, 60.0]);
    }

    #[test]
    fn full_width_obstacle_splits_blocks() {
        let flow = ObstacleFlow::new(Rect::new(0.0, 0.0, 100.0, 100.0), FONT)
            .with_obstacle(Rect::new(-10.0, 16.0, 120.0, 24.0));
        let mut builder = LayoutBuilder::new(StubShaper);
        let blocks = flow.layout(&mut builder, TEXT).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].y, 0.0);
        assert_eq!(line_texts(TEXT, &blocks[0]), vec!["aaaa bbbb "]);
        assert_eq!(blocks[1].y, 40.0);
        assert_eq!(blocks[1].text_range, 10..TEXT.len());
        assert_eq!(
            line_texts(TEXT, &blocks[1]),
            vec!["cccc dddd ", "eeee ffff ", "gggg"]
        );
    }
}
