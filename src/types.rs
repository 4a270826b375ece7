//! Geometry primitives and constants shared by the surface, menu and dialog.
//!
//! Everything here is plain data so it can be used (and tested) on any host.

// ============================================================================
// Constants
// ============================================================================

/// Window class name for the main overlay surface
pub const SURFACE_CLASS_NAME: &str = "MascotHostSurface";

/// Window class name for the transient popup-menu owner window
pub const MENU_HOST_CLASS_NAME: &str = "MascotHostMenuOwner";

/// Window class name for the message dialog
pub const DIALOG_CLASS_NAME: &str = "MascotHostDialog";

/// `WS_EX_TRANSPARENT`: pointer events fall through to the windows below
pub const WS_EX_TRANSPARENT_BIT: u32 = 0x0000_0020;

/// Extended window style for DirectComposition (no redirection bitmap)
pub const WS_EX_NOREDIRECTIONBITMAP: u32 = 0x0020_0000;

/// `WM_APP`: first message id free for application use
const WM_APP: u32 = 0x8000;

/// Callback message the tray icon sends to the surface
pub const WM_TRAY_CALLBACK: u32 = WM_APP + 1;

/// Posted to the surface by the menu worker to reset the model position
pub const WM_RESET_POSITION: u32 = WM_APP + 2;

/// OS-reported wheel delta for one notch
pub const WHEEL_DELTA: i16 = 120;

/// Size returned when the client area cannot be queried (zero is invalid for GPU resources)
pub const SENTINEL_SIZE: Size = Size {
    width: 1,
    height: 1,
};

// ============================================================================
// Geometry Types
// ============================================================================

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True if either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Replace an empty size with the 1x1 sentinel
    pub fn or_sentinel(self) -> Self {
        if self.is_empty() {
            SENTINEL_SIZE
        } else {
            self
        }
    }
}

/// A point with integer coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Convert a top-left-origin point to bottom-left origin within a
    /// space `height` pixels tall.
    pub fn flip_y(self, height: i32) -> Self {
        Self {
            x: self.x,
            y: height - self.y,
        }
    }
}

/// Cursor position for the routine: screen coordinates with the origin at
/// the bottom-left of the primary screen, or the origin itself when the
/// cursor could not be queried.
pub fn cursor_to_bottom_left(cursor: Option<Point>, screen_height: i32) -> Point {
    cursor
        .map(|p| p.flip_y(screen_height))
        .unwrap_or_default()
}

/// A rectangle with integer coordinates.
///
/// Uses left/top/right/bottom format where right and bottom are exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Create a new rectangle from left, top, right, bottom coordinates
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from x, y, width, height
    pub fn from_xywh(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            left: x,
            top: y,
            right: x + width as i32,
            bottom: y + height as i32,
        }
    }

    /// Get the width of the rectangle
    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0) as u32
    }

    /// Get the height of the rectangle
    pub fn height(&self) -> u32 {
        (self.bottom - self.top).max(0) as u32
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }
}

/// Longest prefix of `s` that fits in `max_units` UTF-16 code units without
/// splitting a surrogate pair.
pub fn truncate_utf16(s: &str, max_units: usize) -> &str {
    let mut units = 0;
    for (index, ch) in s.char_indices() {
        units += ch.len_utf16();
        if units > max_units {
            return &s[..index];
        }
    }
    s
}

/// Null-terminated UTF-16 for Win32 wide-string parameters.
pub fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

#[cfg(windows)]
impl From<windows::Win32::Foundation::RECT> for Rect {
    fn from(r: windows::Win32::Foundation::RECT) -> Self {
        Rect::new(r.left, r.top, r.right, r.bottom)
    }
}

#[cfg(windows)]
impl From<Rect> for windows::Win32::Foundation::RECT {
    fn from(r: Rect) -> Self {
        windows::Win32::Foundation::RECT {
            left: r.left,
            top: r.top,
            right: r.right,
            bottom: r.bottom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_from_xywh() {
        let r = Rect::from_xywh(10, 20, 100, 50);
        assert_eq!(r, Rect::new(10, 20, 110, 70));
        assert_eq!(r.size(), Size::new(100, 50));
    }

    #[test]
    fn rect_inverted_has_zero_size() {
        let r = Rect::new(100, 100, 0, 0);
        assert_eq!(r.width(), 0);
        assert_eq!(r.height(), 0);
    }

    #[test]
    fn size_sentinel_replaces_zero() {
        assert_eq!(Size::new(0, 600).or_sentinel(), SENTINEL_SIZE);
        assert_eq!(Size::new(800, 0).or_sentinel(), SENTINEL_SIZE);
        assert_eq!(Size::new(800, 600).or_sentinel(), Size::new(800, 600));
    }

    #[test]
    fn point_flip_y() {
        let p = Point::new(40, 0).flip_y(1040);
        assert_eq!(p, Point::new(40, 1040));

        let p = Point::new(40, 1040).flip_y(1040);
        assert_eq!(p, Point::new(40, 0));
    }

    #[test]
    fn cursor_flips_against_screen_height() {
        // A top taskbar shifts the work area but not the cursor's screen space
        let p = cursor_to_bottom_left(Some(Point::new(300, 200)), 1080);
        assert_eq!(p, Point::new(300, 880));

        // Secondary monitor to the left of the primary one
        let p = cursor_to_bottom_left(Some(Point::new(-1280, 1079)), 1080);
        assert_eq!(p, Point::new(-1280, 1));
    }

    #[test]
    fn failed_cursor_query_reports_origin() {
        assert_eq!(cursor_to_bottom_left(None, 1080), Point::new(0, 0));
    }

    #[test]
    fn click_through_is_a_single_bit() {
        assert_eq!(WS_EX_TRANSPARENT_BIT.count_ones(), 1);
    }

    #[test]
    fn truncate_utf16_keeps_surrogate_pairs_whole() {
        let faces = "\u{1F600}".repeat(100);
        let cut = truncate_utf16(&faces, 127);
        assert_eq!(cut.encode_utf16().count(), 126);
        assert_eq!(cut.chars().count(), 63);

        assert_eq!(truncate_utf16("abc", 2), "ab");
        assert_eq!(truncate_utf16("abc", 10), "abc");
        assert_eq!(truncate_utf16("a\u{1F600}", 2), "a");
    }

    #[test]
    fn wide_strings_are_null_terminated() {
        assert_eq!(to_wide("OK"), vec![0x4F, 0x4B, 0]);
        assert_eq!(to_wide(""), vec![0]);
    }
}
