//! The main overlay window.

use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, Ordering};

use windows::core::PCWSTR;
use windows::Win32::Foundation::{HINSTANCE, HWND, POINT, RECT};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DestroyWindow, GetClientRect, GetCursorPos, GetSystemMetrics,
    GetWindowLongW, LoadCursorW, LoadIconW, RegisterClassW, SetWindowLongPtrW, ShowWindow,
    SystemParametersInfoW, UnregisterClassW, GWLP_USERDATA, GWL_EXSTYLE, IDC_ARROW,
    SM_CXSCREEN, SM_CYSCREEN, SPI_GETWORKAREA, SW_SHOWNORMAL, SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS,
    WINDOW_EX_STYLE, WNDCLASSW, WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW,
    WS_EX_TOPMOST, WS_EX_TRANSPARENT, WS_POPUP,
};

use super::wndproc::{surface_wnd_proc, SurfaceRouter};
use crate::error::{HostError, HostResult};
use crate::types::{
    cursor_to_bottom_left, to_wide, Point, Rect, Size, SENTINEL_SIZE, SURFACE_CLASS_NAME,
    WS_EX_NOREDIRECTIONBITMAP, WS_EX_TRANSPARENT_BIT,
};

/// Resource id of the application icon embedded in the executable
pub const APP_ICON_RESOURCE_ID: u16 = 1;

/// Track if the surface window class has been registered
static SURFACE_CLASS_REGISTERED: AtomicBool = AtomicBool::new(false);

/// Borderless, topmost, click-through window covering the work area.
///
/// The window has no redirection bitmap; everything visible comes from
/// the compositor binding.
pub struct MainSurface {
    hwnd: HWND,
    instance: HINSTANCE,
}

impl MainSurface {
    /// Register the class (once) and create the hidden surface window.
    pub fn create() -> HostResult<Self> {
        let instance: HINSTANCE = unsafe { GetModuleHandleW(None) }
            .map_err(|e| HostError::Window(format!("Failed to get module handle: {}", e)))?
            .into();

        register_surface_class(instance)?;

        let work_area = query_work_area();
        log::info!(
            "[surface] Work area: x={}, y={}, w={}, h={}",
            work_area.left,
            work_area.top,
            work_area.width(),
            work_area.height()
        );

        let class_name = to_wide(SURFACE_CLASS_NAME);
        let title = to_wide("mascot-host");
        let ex_style = WINDOW_EX_STYLE(
            WS_EX_NOREDIRECTIONBITMAP
                | WS_EX_TOPMOST.0
                | WS_EX_TOOLWINDOW.0
                | WS_EX_NOACTIVATE.0
                | WS_EX_LAYERED.0
                | WS_EX_TRANSPARENT.0,
        );

        let hwnd = unsafe {
            CreateWindowExW(
                ex_style,
                PCWSTR(class_name.as_ptr()),
                PCWSTR(title.as_ptr()),
                WS_POPUP,
                work_area.left,
                work_area.top,
                work_area.width() as i32,
                work_area.height() as i32,
                None,
                None,
                instance,
                None,
            )
        }
        .map_err(|e| HostError::Window(format!("Failed to create window: {}", e)))?;

        // Not shown yet: the routine has to finish init first
        Ok(Self { hwnd, instance })
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    /// Live client-area size, or 1x1 if it cannot be queried.
    pub fn logical_size(&self) -> Size {
        let mut rect = RECT::default();
        match unsafe { GetClientRect(self.hwnd, &mut rect) } {
            Ok(()) => Rect::from(rect).size().or_sentinel(),
            Err(e) => {
                log::warn!("[surface] GetClientRect failed: {}", e);
                SENTINEL_SIZE
            },
        }
    }

    /// Whether pointer input currently falls through the surface.
    pub fn is_click_through(&self) -> bool {
        let style = unsafe { GetWindowLongW(self.hwnd, GWL_EXSTYLE) } as u32;
        style & WS_EX_TRANSPARENT_BIT != 0
    }

    /// Route this window's messages to `router`.
    ///
    /// The router must stay at the same address until [`detach_router`] or drop.
    ///
    /// [`detach_router`]: Self::detach_router
    pub fn attach_router(&self, router: &SurfaceRouter) {
        let ptr = router as *const SurfaceRouter as *mut c_void;
        unsafe {
            SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, ptr as isize);
        }
    }

    pub fn detach_router(&self) {
        unsafe {
            SetWindowLongPtrW(self.hwnd, GWLP_USERDATA, 0);
        }
    }

    pub fn show(&self) {
        unsafe {
            let _ = ShowWindow(self.hwnd, SW_SHOWNORMAL);
        }
        log::info!("[surface] Surface shown");
    }
}

impl Drop for MainSurface {
    fn drop(&mut self) {
        self.detach_router();
        unsafe {
            let _ = DestroyWindow(self.hwnd);
        }
        unregister_surface_class(self.instance);
        log::debug!("[surface] Surface destroyed");
    }
}

/// Cursor position in screen coordinates, flipped against the primary
/// screen height. `(0, 0)` if the cursor cannot be queried.
pub fn cursor_position() -> Point {
    let mut pt = POINT::default();
    let cursor = match unsafe { GetCursorPos(&mut pt) } {
        Ok(()) => Some(Point::new(pt.x, pt.y)),
        Err(e) => {
            log::debug!("[surface] GetCursorPos failed: {}", e);
            None
        },
    };
    let screen_height = unsafe { GetSystemMetrics(SM_CYSCREEN) };
    cursor_to_bottom_left(cursor, screen_height)
}

fn register_surface_class(instance: HINSTANCE) -> HostResult<()> {
    if SURFACE_CLASS_REGISTERED.load(Ordering::SeqCst) {
        return Ok(());
    }

    let class_name = to_wide(SURFACE_CLASS_NAME);

    unsafe {
        let icon = LoadIconW(instance, PCWSTR(APP_ICON_RESOURCE_ID as usize as *const u16));
        if icon.is_err() {
            log::warn!("[surface] Failed to load application icon");
        }

        let wc = WNDCLASSW {
            lpfnWndProc: Some(surface_wnd_proc),
            hInstance: instance,
            lpszClassName: PCWSTR(class_name.as_ptr()),
            hIcon: icon.unwrap_or_default(),
            hCursor: LoadCursorW(None, IDC_ARROW)
                .map_err(|e| HostError::Window(format!("Failed to load cursor: {}", e)))?,
            ..Default::default()
        };

        if RegisterClassW(&wc) == 0 {
            return Err(HostError::Window(
                "Failed to register window class".to_string(),
            ));
        }
    }

    SURFACE_CLASS_REGISTERED.store(true, Ordering::SeqCst);
    Ok(())
}

fn unregister_surface_class(instance: HINSTANCE) {
    if !SURFACE_CLASS_REGISTERED.swap(false, Ordering::SeqCst) {
        return;
    }
    let class_name = to_wide(SURFACE_CLASS_NAME);
    unsafe {
        let _ = UnregisterClassW(PCWSTR(class_name.as_ptr()), instance);
    }
}

/// The desktop area not covered by the taskbar; the full primary screen if
/// the query fails.
fn query_work_area() -> Rect {
    let mut rect = RECT::default();
    let queried = unsafe {
        SystemParametersInfoW(
            SPI_GETWORKAREA,
            0,
            Some(&mut rect as *mut RECT as *mut c_void),
            SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
        )
    };

    match queried {
        Ok(()) if rect.right > rect.left && rect.bottom > rect.top => Rect::from(rect),
        _ => {
            log::warn!("[surface] SPI_GETWORKAREA failed, using primary screen");
            let (w, h) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
            Rect::from_xywh(0, 0, w.max(1) as u32, h.max(1) as u32)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_covers_work_area() {
        let surface = MainSurface::create().unwrap();
        assert_eq!(surface.logical_size(), query_work_area().size());
        assert!(surface.is_click_through());
    }
}
