//! Window procedure for the main surface.
//!
//! Decodes each message and hands it to the router stored in
//! `GWLP_USERDATA`. Messages that arrive before the router is attached (or
//! after it is detached) get default handling.

use std::sync::Arc;

use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    DefWindowProcW, GetWindowLongPtrW, PostQuitMessage, GWLP_USERDATA,
};

use super::messages::decode_message;
use crate::menu::{MenuSupervisor, Win32MenuHost};
use crate::router::{Disposition, EventRouter};

/// The router as wired up for the real surface.
pub type SurfaceRouter = EventRouter<Arc<MenuSupervisor<Win32MenuHost>>>;

/// Window procedure for the surface.
///
/// # Safety
/// Win32 callback; `GWLP_USERDATA` must be null or point at a live `SurfaceRouter`.
pub unsafe extern "system" fn surface_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let router_ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const SurfaceRouter;
    if router_ptr.is_null() {
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    }

    let event = decode_message(msg, wparam.0, lparam.0);
    match (*router_ptr).handle(event) {
        Disposition::Handled => LRESULT(0),
        Disposition::Quit => {
            PostQuitMessage(0);
            LRESULT(0)
        },
        Disposition::Default => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
