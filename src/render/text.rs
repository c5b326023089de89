//! The "next text" stager and glyph compositing.

use serde::{Deserialize, Serialize};

use super::framebuffer::{Color, Framebuffer};
use crate::store::{Font, FontId};

/// Default text color.
pub const DEFAULT_TEXT_COLOR: Color = 7;

/// Alignment of a text block against its anchor on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Align {
    /// Anchor at the left or top edge.
    #[default]
    Start,
    /// Anchor at the center.
    Center,
    /// Anchor at the right or bottom edge.
    End,
}

impl Align {
    /// Offset applied to an anchor for a block `extent` pixels long.
    #[must_use]
    pub const fn offset(self, extent: i32) -> i32 {
        match self {
            Self::Start => 0,
            Self::Center => -(extent / 2),
            Self::End => -extent,
        }
    }
}

/// Attributes of the next text to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStager {
    font: Option<FontId>,
    align: (Align, Align),
    color: Color,
}

impl Default for TextStager {
    fn default() -> Self {
        Self {
            font: None,
            align: (Align::Start, Align::Start),
            color: DEFAULT_TEXT_COLOR,
        }
    }
}

impl TextStager {
    /// Staged font.
    #[must_use]
    pub const fn font(&self) -> Option<FontId> {
        self.font
    }

    /// Staged horizontal and vertical alignment.
    #[must_use]
    pub const fn align(&self) -> (Align, Align) {
        self.align
    }

    /// Staged color.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }

    pub(crate) fn set_font(&mut self, font: FontId) {
        self.font = Some(font);
    }

    pub(crate) fn set_align(&mut self, x: Align, y: Align) {
        self.align = (x, y);
    }

    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

/// Draw `text` anchored at `(x, y)` in screen space. Returns pixels written.
pub(crate) fn draw_text(
    fb: &mut Framebuffer,
    font: &Font,
    text: &str,
    (x, y): (i32, i32),
    align: (Align, Align),
    color: Color,
) -> usize {
    let (width, height) = font.measure(text);
    let left = x.saturating_add(align.0.offset(width));
    let mut cursor_y = y.saturating_add(align.1.offset(height));
    let glyph_width = font.glyph_width();
    let mut written = 0;

    for line in text.split('\n') {
        let mut cursor_x = left;
        for ch in line.chars() {
            if let Some(glyph) = font.glyph(ch) {
                for gy in 0..font.glyph_height() {
                    for gx in 0..glyph_width {
                        if glyph.is_set(gx, gy, glyph_width)
                            && fb.set(
                                cursor_x.saturating_add(i32::from(gx)),
                                cursor_y.saturating_add(i32::from(gy)),
                                color,
                            )
                        {
                            written += 1;
                        }
                    }
                }
            }
            cursor_x = cursor_x.saturating_add(i32::from(font.advance()));
        }
        cursor_y = cursor_y.saturating_add(i32::from(font.line_height()));
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_offsets() {
        assert_eq!(Align::Start.offset(7), 0);
        assert_eq!(Align::Center.offset(7), -3);
        assert_eq!(Align::End.offset(7), -7);
    }

    #[test]
    fn test_draw_single_glyph() {
        let mut fb = Framebuffer::new(0);
        let font = Font::builtin();
        let written = draw_text(&mut fb, &font, "1", (10, 10), (Align::Start, Align::Start), 8);
        // '1' has 8 lit pixels in the built-in font.
        assert_eq!(written, 8);
        assert_eq!(fb.get(11, 10), Some(8));
        assert_eq!(fb.get(10, 10), Some(0));
        assert_eq!(fb.get(10, 14), Some(8));
    }

    #[test]
    fn test_newline_restarts_at_anchor() {
        let mut fb = Framebuffer::new(0);
        let font = Font::builtin();
        draw_text(&mut fb, &font, "-\n-", (0, 0), (Align::Start, Align::Start), 5);
        assert_eq!(fb.get(0, 2), Some(5));
        assert_eq!(fb.get(0, 8), Some(5));
        assert_eq!(fb.get(4, 8), Some(0));
    }

    #[test]
    fn test_end_alignment() {
        let mut fb = Framebuffer::new(0);
        let font = Font::builtin();
        draw_text(&mut fb, &font, "_", (20, 20), (Align::End, Align::End), 9);
        // Right-aligned 3-wide glyph ends just before x=20; bottom row at y=19.
        assert_eq!(fb.get(17, 19), Some(9));
        assert_eq!(fb.get(19, 19), Some(9));
        assert_eq!(fb.get(20, 19), Some(0));
    }

    #[test]
    fn test_stager_defaults() {
        let stager = TextStager::default();
        assert_eq!(stager.font(), None);
        assert_eq!(stager.color(), DEFAULT_TEXT_COLOR);
        assert_eq!(stager.align(), (Align::Start, Align::Start));
    }
}
