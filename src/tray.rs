//! Notification-area icon.
//!
//! Clicking the icon is the only way to reach the context menu while the
//! surface is click-through. Its callback message is delivered to the
//! surface window as [`WM_TRAY_CALLBACK`](crate::types::WM_TRAY_CALLBACK).

use crate::types::truncate_utf16;

/// Capacity of `NOTIFYICONDATAW::szTip`, including the terminator
pub const TOOLTIP_CAPACITY: usize = 128;

/// Identifier of our icon among the surface window's icons
pub const TRAY_ICON_UID: u32 = 100;

/// Encode `tooltip` into the fixed tip buffer, truncating on a character
/// boundary if needed.
pub fn encode_tooltip(tooltip: &str) -> [u16; TOOLTIP_CAPACITY] {
    let mut buf = [0u16; TOOLTIP_CAPACITY];
    let kept = truncate_utf16(tooltip, TOOLTIP_CAPACITY - 1);
    for (slot, unit) in buf.iter_mut().zip(kept.encode_utf16()) {
        *slot = unit;
    }
    buf
}

#[cfg(windows)]
pub use win32::TrayIcon;

#[cfg(windows)]
mod win32 {
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::{HINSTANCE, HWND};
    use windows::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows::Win32::UI::Shell::{
        Shell_NotifyIconW, NIF_ICON, NIF_MESSAGE, NIF_SHOWTIP, NIF_TIP, NIM_ADD, NIM_DELETE,
        NOTIFYICONDATAW,
    };
    use windows::Win32::UI::WindowsAndMessaging::{
        DestroyIcon, GetSystemMetrics, LoadIconW, LoadImageW, HICON, IDI_APPLICATION, IMAGE_ICON,
        LR_DEFAULTCOLOR, SM_CXSMICON, SM_CYSMICON,
    };

    use super::{encode_tooltip, TRAY_ICON_UID};
    use crate::error::{HostError, HostResult};
    use crate::surface::window::APP_ICON_RESOURCE_ID;
    use crate::types::WM_TRAY_CALLBACK;

    /// Installed notification icon; removed on drop.
    pub struct TrayIcon {
        data: NOTIFYICONDATAW,
        /// Loaded from our resources (destroy on drop) or a shared system icon
        owns_icon: bool,
    }

    impl TrayIcon {
        pub fn install(hwnd: HWND, tooltip: &str) -> HostResult<Self> {
            let (icon, owns_icon) = load_icon()?;

            let data = NOTIFYICONDATAW {
                cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
                hWnd: hwnd,
                uID: TRAY_ICON_UID,
                uFlags: NIF_ICON | NIF_TIP | NIF_SHOWTIP | NIF_MESSAGE,
                uCallbackMessage: WM_TRAY_CALLBACK,
                hIcon: icon,
                szTip: encode_tooltip(tooltip),
                ..Default::default()
            };

            let added = unsafe { Shell_NotifyIconW(NIM_ADD, &data) };
            if !added.as_bool() {
                if owns_icon {
                    unsafe {
                        let _ = DestroyIcon(icon);
                    }
                }
                return Err(HostError::Tray("Shell_NotifyIconW(NIM_ADD) failed".to_string()));
            }

            log::info!("[tray] Notification icon installed");
            Ok(Self { data, owns_icon })
        }
    }

    impl Drop for TrayIcon {
        fn drop(&mut self) {
            unsafe {
                let _ = Shell_NotifyIconW(NIM_DELETE, &self.data);
                if self.owns_icon {
                    let _ = DestroyIcon(self.data.hIcon);
                }
            }
            log::debug!("[tray] Notification icon removed");
        }
    }

    /// The embedded application icon, or the stock application icon.
    fn load_icon() -> HostResult<(HICON, bool)> {
        let embedded = unsafe {
            GetModuleHandleW(None).and_then(|module| {
                LoadImageW(
                    HINSTANCE::from(module),
                    PCWSTR(APP_ICON_RESOURCE_ID as usize as *const u16),
                    IMAGE_ICON,
                    GetSystemMetrics(SM_CXSMICON),
                    GetSystemMetrics(SM_CYSMICON),
                    LR_DEFAULTCOLOR,
                )
            })
        };

        match embedded {
            Ok(handle) => Ok((HICON(handle.0), true)),
            Err(e) => {
                log::warn!(
                    "[tray] Failed to load icon ({}), falling back to the default application icon",
                    e
                );
                unsafe { LoadIconW(None, IDI_APPLICATION) }
                    .map(|icon| (icon, false))
                    .map_err(|e| HostError::Tray(format!("Icon fallback failed: {}", e)))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tooltip_is_null_terminated() {
        let buf = encode_tooltip("Desk Mascot");
        let len = "Desk Mascot".len();
        assert_eq!(String::from_utf16_lossy(&buf[..len]), "Desk Mascot");
        assert_eq!(buf[len], 0);
    }

    #[test]
    fn long_tooltip_is_truncated() {
        let long = "x".repeat(300);
        let buf = encode_tooltip(&long);
        assert!(buf[..TOOLTIP_CAPACITY - 1].iter().all(|&u| u == 'x' as u16));
        assert_eq!(buf[TOOLTIP_CAPACITY - 1], 0);
    }

    #[test]
    fn truncation_never_splits_a_surrogate_pair() {
        let faces = "\u{1F600}".repeat(100);
        let buf = encode_tooltip(&faces);
        let end = buf.iter().position(|&u| u == 0).unwrap();

        assert_eq!(end, 126);
        assert!(String::from_utf16(&buf[..end]).is_ok());
        assert!(buf[end..].iter().all(|&u| u == 0));
    }
}
