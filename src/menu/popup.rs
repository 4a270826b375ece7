//! Win32 popup menu, run on the menu worker thread.
//!
//! `TrackPopupMenu` needs an owner window on the calling thread, so each
//! session registers a class, creates an invisible owner, and tears both
//! down again when the popup closes.

use std::ffi::c_void;

use windows::core::PCWSTR;
use windows::Win32::Foundation::{
    GetLastError, ERROR_CLASS_ALREADY_EXISTS, HINSTANCE, HWND, LPARAM, LRESULT, POINT, WPARAM,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreatePopupMenu, CreateWindowExW, DefWindowProcW, DestroyMenu, DestroyWindow,
    GetCursorPos, GetWindowLongW, PostMessageW, RegisterClassW, SetForegroundWindow,
    SetWindowLongW, TrackPopupMenu, UnregisterClassW, GWL_EXSTYLE, HMENU, MENU_ITEM_FLAGS,
    MF_CHECKED, MF_GRAYED, MF_SEPARATOR, MF_STRING, MF_UNCHECKED, TPM_NONOTIFY, TPM_RETURNCMD,
    TPM_RIGHTBUTTON,
    WM_CLOSE, WNDCLASSW, WS_EX_TOOLWINDOW, WS_POPUP,
};

use super::{
    MenuCommand, MenuHost, MenuItemState, ID_ENABLE_MOUSE, ID_QUIT, ID_RESET_POSITION,
    LABEL_ENABLE_MOUSE, LABEL_QUIT, LABEL_RESET_POSITION,
};
use crate::error::{HostError, HostResult};
use crate::router::RunFlag;
use crate::types::{to_wide, MENU_HOST_CLASS_NAME, WM_RESET_POSITION};

/// Menu host bound to the main surface.
///
/// Holds the surface handle as an integer so the host can cross to the
/// worker thread; it is only used for style access and `PostMessageW`.
pub struct Win32MenuHost {
    surface: isize,
    run: RunFlag,
}

impl Win32MenuHost {
    pub fn new(surface: HWND, run: RunFlag) -> Self {
        Self {
            surface: surface.0 as isize,
            run,
        }
    }

    fn surface(&self) -> HWND {
        HWND(self.surface as *mut c_void)
    }

    fn post(&self, msg: u32) -> windows::core::Result<()> {
        unsafe { PostMessageW(self.surface(), msg, WPARAM(0), LPARAM(0)) }
    }
}

impl MenuHost for Win32MenuHost {
    fn read_ex_style(&self) -> Option<u32> {
        // The surface always carries extended styles, so zero means the read failed
        let style = unsafe { GetWindowLongW(self.surface(), GWL_EXSTYLE) };
        (style != 0).then_some(style as u32)
    }

    fn write_ex_style(&self, ex_style: u32) -> HostResult<()> {
        let previous = unsafe { SetWindowLongW(self.surface(), GWL_EXSTYLE, ex_style as i32) };
        if previous == 0 {
            return Err(HostError::Menu("SetWindowLongW failed".to_string()));
        }
        Ok(())
    }

    fn surface_closing(&self) -> bool {
        // Once cleared the main thread may be blocked joining this worker,
        // and SetWindowLongW would wait on it forever
        !self.run.is_running()
    }

    fn show_popup(&self, enable_mouse: MenuItemState) -> HostResult<MenuCommand> {
        let owner = OwnerWindow::create()?;

        let mut cursor = POINT::default();
        unsafe { GetCursorPos(&mut cursor) }
            .map_err(|e| HostError::Menu(format!("GetCursorPos failed: {}", e)))?;

        let menu = PopupMenu::build(enable_mouse)?;

        let selected = unsafe {
            // Without this the popup does not dismiss on an outside click
            let _ = SetForegroundWindow(owner.hwnd);
            TrackPopupMenu(
                menu.0,
                TPM_RIGHTBUTTON | TPM_NONOTIFY | TPM_RETURNCMD,
                cursor.x,
                cursor.y,
                0,
                owner.hwnd,
                None,
            )
        };

        drop(owner);
        drop(menu);

        Ok(MenuCommand::from_id(selected.0 as u32))
    }

    fn request_reset(&self) {
        if let Err(e) = self.post(WM_RESET_POSITION) {
            log::warn!("[menu] Failed to post reset request: {}", e);
        }
    }

    fn request_quit(&self) {
        if let Err(e) = self.post(WM_CLOSE) {
            log::error!("[menu] Failed to post close request: {}", e);
        }
    }
}

unsafe extern "system" fn owner_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    DefWindowProcW(hwnd, msg, wparam, lparam)
}

/// Invisible window that owns the popup for one session.
struct OwnerWindow {
    hwnd: HWND,
    instance: HINSTANCE,
    class_name: Vec<u16>,
}

impl OwnerWindow {
    fn create() -> HostResult<Self> {
        let class_name = to_wide(MENU_HOST_CLASS_NAME);

        unsafe {
            let module = GetModuleHandleW(None)
                .map_err(|e| HostError::Menu(format!("GetModuleHandleW failed: {}", e)))?;
            let instance: HINSTANCE = module.into();

            let wc = WNDCLASSW {
                lpfnWndProc: Some(owner_wnd_proc),
                hInstance: instance,
                lpszClassName: PCWSTR(class_name.as_ptr()),
                ..Default::default()
            };

            if RegisterClassW(&wc) == 0 && GetLastError() != ERROR_CLASS_ALREADY_EXISTS {
                return Err(HostError::Menu("RegisterClassW failed".to_string()));
            }

            let created = CreateWindowExW(
                WS_EX_TOOLWINDOW,
                PCWSTR(class_name.as_ptr()),
                PCWSTR::null(),
                WS_POPUP,
                0,
                0,
                0,
                0,
                None,
                None,
                instance,
                None,
            );

            match created {
                Ok(hwnd) => Ok(Self {
                    hwnd,
                    instance,
                    class_name,
                }),
                Err(e) => {
                    let _ = UnregisterClassW(PCWSTR(class_name.as_ptr()), instance);
                    Err(HostError::Menu(format!("owner window: {}", e)))
                },
            }
        }
    }
}

impl Drop for OwnerWindow {
    fn drop(&mut self) {
        unsafe {
            let _ = DestroyWindow(self.hwnd);
            let _ = UnregisterClassW(PCWSTR(self.class_name.as_ptr()), self.instance);
        }
    }
}

/// Owned popup menu handle.
struct PopupMenu(HMENU);

impl PopupMenu {
    fn build(enable_mouse: MenuItemState) -> HostResult<Self> {
        let menu = unsafe { CreatePopupMenu() }
            .map(PopupMenu)
            .map_err(|e| HostError::Menu(format!("CreatePopupMenu failed: {}", e)))?;

        let enable_flags = match enable_mouse {
            MenuItemState::Checked => MF_STRING | MF_CHECKED,
            MenuItemState::Unchecked => MF_STRING | MF_UNCHECKED,
            MenuItemState::Disabled => MF_STRING | MF_GRAYED,
        };

        menu.append(enable_flags, ID_ENABLE_MOUSE, Some(LABEL_ENABLE_MOUSE))?;
        menu.append(MF_STRING, ID_RESET_POSITION, Some(LABEL_RESET_POSITION))?;
        menu.append(MF_SEPARATOR, 0, None)?;
        menu.append(MF_STRING, ID_QUIT, Some(LABEL_QUIT))?;

        Ok(menu)
    }

    fn append(&self, flags: MENU_ITEM_FLAGS, id: u32, label: Option<&str>) -> HostResult<()> {
        let wide = label.map(to_wide);
        let text = wide
            .as_ref()
            .map(|w| PCWSTR(w.as_ptr()))
            .unwrap_or(PCWSTR::null());

        unsafe { AppendMenuW(self.0, flags, id as usize, text) }
            .map_err(|e| HostError::Menu(format!("AppendMenuW failed: {}", e)))
    }
}

impl Drop for PopupMenu {
    fn drop(&mut self) {
        unsafe {
            let _ = DestroyMenu(self.0);
        }
    }
}
