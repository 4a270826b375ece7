//! Dialog geometry, recomputed on every paint from the measured text.

use crate::types::{Rect, Size};

/// Horizontal gap between the text and the window edges
pub const TEXT_MARGIN_X: i32 = 50;
/// Vertical gap above and below the text
pub const TEXT_MARGIN_Y: i32 = 25;
/// Gap between the OK button and the bottom edge
pub const BUTTON_MARGIN_Y: i32 = 5;

pub const BUTTON_WIDTH: i32 = 60;
pub const BUTTON_HEIGHT: i32 = 25;

/// Positions of everything in the dialog.
///
/// `window` is in screen coordinates; `text` and `button` are client
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogLayout {
    pub content: Size,
    pub window: Rect,
    pub text: Rect,
    pub button: Rect,
}

impl DialogLayout {
    /// Lay out the dialog.
    ///
    /// * `text` - the text box as measured by `DT_CALCRECT`
    /// * `frame` - extra width/height added by the caption and borders
    /// * `screen` - primary display size
    pub fn compute(text: Size, frame: Size, screen: Size) -> Self {
        let text_w = text.width as i32;
        let text_h = text.height as i32;

        let content_w = (text_w + TEXT_MARGIN_X * 2).max(BUTTON_WIDTH + TEXT_MARGIN_X * 2);
        let content_h = text_h + TEXT_MARGIN_Y * 2 + BUTTON_HEIGHT + BUTTON_MARGIN_Y;

        let window_w = content_w + frame.width as i32;
        let window_h = content_h + frame.height as i32;
        let left = (screen.width as i32 - window_w) / 2;
        let top = (screen.height as i32 - window_h) / 2;

        let button = Rect::from_xywh(
            content_w - TEXT_MARGIN_X - BUTTON_WIDTH,
            content_h - BUTTON_MARGIN_Y - BUTTON_HEIGHT,
            BUTTON_WIDTH as u32,
            BUTTON_HEIGHT as u32,
        );

        Self {
            content: Size::new(content_w as u32, content_h as u32),
            window: Rect::from_xywh(left, top, window_w as u32, window_h as u32),
            text: Rect::new(
                TEXT_MARGIN_X,
                TEXT_MARGIN_Y,
                TEXT_MARGIN_X + text_w,
                TEXT_MARGIN_Y + text_h,
            ),
            button,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Size = Size::new(16, 39);
    const SCREEN: Size = Size::new(1920, 1080);

    #[test]
    fn content_wraps_text_with_margins() {
        let layout = DialogLayout::compute(Size::new(300, 48), FRAME, SCREEN);
        assert_eq!(layout.content, Size::new(400, 48 + 50 + 25 + 5));
        assert_eq!(layout.text, Rect::new(50, 25, 350, 73));
    }

    #[test]
    fn window_is_centred_on_screen() {
        let layout = DialogLayout::compute(Size::new(300, 48), FRAME, SCREEN);
        let w = layout.window.width() as i32;
        let h = layout.window.height() as i32;
        assert_eq!(w, 416);
        assert_eq!(layout.window.left, (1920 - w) / 2);
        assert_eq!(layout.window.top, (1080 - h) / 2);
    }

    #[test]
    fn button_sits_bottom_right() {
        let layout = DialogLayout::compute(Size::new(300, 48), FRAME, SCREEN);
        let content = layout.content;
        assert_eq!(layout.button.right, content.width as i32 - TEXT_MARGIN_X);
        assert_eq!(layout.button.bottom, content.height as i32 - BUTTON_MARGIN_Y);
        assert_eq!(layout.button.size(), Size::new(60, 25));
        assert!(layout.button.top >= layout.text.bottom);
    }

    #[test]
    fn empty_text_still_fits_button() {
        let layout = DialogLayout::compute(Size::new(0, 0), FRAME, SCREEN);
        assert!(layout.button.left >= TEXT_MARGIN_X);
        assert_eq!(layout.content.width as i32, BUTTON_WIDTH + TEXT_MARGIN_X * 2);
    }
}
