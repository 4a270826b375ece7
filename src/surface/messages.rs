//! Decoding of raw window messages into [`SurfaceEvent`]s.
//!
//! Message ids are spelled out as plain numbers so the decoding can be
//! tested off Windows.

use crate::router::{SurfaceEvent, TrayNotification};
use crate::types::{WM_RESET_POSITION, WM_TRAY_CALLBACK};

pub const WM_DESTROY: u32 = 0x0002;
pub const WM_CLOSE: u32 = 0x0010;
pub const WM_MOUSEMOVE: u32 = 0x0200;
pub const WM_LBUTTONDOWN: u32 = 0x0201;
pub const WM_RBUTTONDOWN: u32 = 0x0204;
pub const WM_MOUSEWHEEL: u32 = 0x020A;

/// `wParam` flag for a held primary button
pub const MK_LBUTTON: usize = 0x0001;

fn low_word(value: usize) -> u16 {
    (value & 0xFFFF) as u16
}

fn high_word(value: usize) -> u16 {
    ((value >> 16) & 0xFFFF) as u16
}

/// Map a message to the router's vocabulary.
pub fn decode_message(msg: u32, wparam: usize, lparam: isize) -> SurfaceEvent {
    match msg {
        WM_CLOSE | WM_DESTROY => SurfaceEvent::CloseRequested,
        WM_LBUTTONDOWN => SurfaceEvent::PrimaryButtonDown,
        WM_MOUSEMOVE => SurfaceEvent::PointerMoved {
            primary_held: wparam & MK_LBUTTON != 0,
        },
        WM_MOUSEWHEEL => SurfaceEvent::WheelScrolled {
            raw_delta: high_word(wparam) as i16,
        },
        WM_RBUTTONDOWN => SurfaceEvent::SecondaryButtonDown,
        WM_TRAY_CALLBACK => SurfaceEvent::Tray(match low_word(lparam as usize) as u32 {
            WM_LBUTTONDOWN => TrayNotification::LeftButtonDown,
            WM_RBUTTONDOWN => TrayNotification::RightButtonDown,
            other => TrayNotification::Other(other),
        }),
        WM_RESET_POSITION => SurfaceEvent::ResetPositionRequested,
        _ => SurfaceEvent::Unhandled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wheel_wparam(delta: i16, keys: u16) -> usize {
        ((delta as u16 as usize) << 16) | keys as usize
    }

    #[test]
    fn close_and_destroy_request_shutdown() {
        assert_eq!(decode_message(WM_CLOSE, 0, 0), SurfaceEvent::CloseRequested);
        assert_eq!(decode_message(WM_DESTROY, 0, 0), SurfaceEvent::CloseRequested);
    }

    #[test]
    fn mouse_move_reports_primary_button() {
        assert_eq!(
            decode_message(WM_MOUSEMOVE, MK_LBUTTON, 0x0010_0020),
            SurfaceEvent::PointerMoved { primary_held: true }
        );
        assert_eq!(
            decode_message(WM_MOUSEMOVE, 0x0002, 0),
            SurfaceEvent::PointerMoved {
                primary_held: false
            }
        );
    }

    #[test]
    fn wheel_delta_is_signed_high_word() {
        assert_eq!(
            decode_message(WM_MOUSEWHEEL, wheel_wparam(120, 0), 0),
            SurfaceEvent::WheelScrolled { raw_delta: 120 }
        );
        assert_eq!(
            decode_message(WM_MOUSEWHEEL, wheel_wparam(-240, MK_LBUTTON as u16), 0),
            SurfaceEvent::WheelScrolled { raw_delta: -240 }
        );
    }

    #[test]
    fn tray_sub_codes() {
        assert_eq!(
            decode_message(WM_TRAY_CALLBACK, 0, WM_LBUTTONDOWN as isize),
            SurfaceEvent::Tray(TrayNotification::LeftButtonDown)
        );
        assert_eq!(
            decode_message(WM_TRAY_CALLBACK, 0, WM_RBUTTONDOWN as isize),
            SurfaceEvent::Tray(TrayNotification::RightButtonDown)
        );
        assert_eq!(
            decode_message(WM_TRAY_CALLBACK, 0, WM_MOUSEMOVE as isize),
            SurfaceEvent::Tray(TrayNotification::Other(WM_MOUSEMOVE))
        );
    }

    #[test]
    fn tray_sub_code_ignores_high_word() {
        let lparam = (7isize << 16) | WM_RBUTTONDOWN as isize;
        assert_eq!(
            decode_message(WM_TRAY_CALLBACK, 0, lparam),
            SurfaceEvent::Tray(TrayNotification::RightButtonDown)
        );
    }

    #[test]
    fn reset_and_right_click() {
        assert_eq!(
            decode_message(WM_RESET_POSITION, 0, 0),
            SurfaceEvent::ResetPositionRequested
        );
        assert_eq!(
            decode_message(WM_RBUTTONDOWN, 0, 0),
            SurfaceEvent::SecondaryButtonDown
        );
    }

    #[test]
    fn other_messages_are_unhandled() {
        assert_eq!(decode_message(0x000F, 0, 0), SurfaceEvent::Unhandled);
    }
}
