//! Win32 message dialog window.
//!
//! A small fixed-size window with the text and an OK button. It runs its own
//! nested message loop, so it works both before the frame loop starts and
//! after it has stopped.

use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, Ordering};

use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{BOOL, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, DrawTextW, EndPaint, GetStockObject, GetSysColorBrush, SelectObject, COLOR_WINDOW,
    DT_CALCRECT, DT_LEFT, OEM_FIXED_FONT, PAINTSTRUCT,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    AdjustWindowRect, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
    GetMessageW, GetSystemMetrics, GetWindowLongPtrW, IsDialogMessageW, IsWindow, LoadCursorW,
    LoadIconW, MoveWindow, RegisterClassW, SetForegroundWindow, SetWindowLongPtrW, ShowWindow,
    TranslateMessage, UnregisterClassW, BS_DEFPUSHBUTTON, CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT,
    GWLP_USERDATA, HMENU, IDC_ARROW, IDI_WARNING, MSG, SM_CXSCREEN, SM_CYSCREEN, SW_SHOWDEFAULT,
    WINDOW_EX_STYLE, WINDOW_STYLE, WM_COMMAND, WM_DESTROY, WM_PAINT, WNDCLASSW, WS_CAPTION,
    WS_CHILD, WS_DLGFRAME, WS_SYSMENU, WS_TABSTOP, WS_VISIBLE,
};

use super::layout::{DialogLayout, BUTTON_HEIGHT, BUTTON_WIDTH};
use super::{DialogHost, DIALOG_TITLE};
use crate::error::{HostError, HostResult};
use crate::types::{to_wide, Rect, Size, DIALOG_CLASS_NAME};

/// Control id of the OK button
const OK_BUTTON_ID: usize = 100;

/// Fixed frame: caption and close box, no resizing
const DIALOG_STYLE: WINDOW_STYLE =
    WINDOW_STYLE(WS_CAPTION.0 | WS_SYSMENU.0 | WS_TABSTOP.0 | WS_DLGFRAME.0);

/// Per-window state, reached through `GWLP_USERDATA`.
struct DialogState {
    /// Message text without terminator
    text: Vec<u16>,
    button: HWND,
    showing: *const AtomicBool,
}

#[derive(Debug, Default)]
pub struct Win32DialogHost;

fn instance() -> HostResult<HINSTANCE> {
    unsafe { GetModuleHandleW(None) }
        .map(Into::into)
        .map_err(|e| HostError::Dialog(format!("GetModuleHandleW failed: {}", e)))
}

impl DialogHost for Win32DialogHost {
    fn init(&self) -> HostResult<()> {
        let class_name = to_wide(DIALOG_CLASS_NAME);
        let instance = instance()?;

        unsafe {
            let wc = WNDCLASSW {
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(dialog_wnd_proc),
                hInstance: instance,
                hIcon: LoadIconW(None, IDI_WARNING).unwrap_or_default(),
                hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
                hbrBackground: GetSysColorBrush(COLOR_WINDOW),
                lpszClassName: PCWSTR(class_name.as_ptr()),
                ..Default::default()
            };

            if RegisterClassW(&wc) == 0 {
                return Err(HostError::Dialog("RegisterClassW failed".to_string()));
            }
        }
        Ok(())
    }

    fn present(&self, text: &str, showing: &AtomicBool) -> HostResult<()> {
        let class_name = to_wide(DIALOG_CLASS_NAME);
        let title = to_wide(DIALOG_TITLE);
        let instance = instance()?;

        let mut state = Box::new(DialogState {
            text: text.encode_utf16().collect(),
            button: HWND::default(),
            showing: showing as *const AtomicBool,
        });

        unsafe {
            let hwnd = CreateWindowExW(
                WINDOW_EX_STYLE(0),
                PCWSTR(class_name.as_ptr()),
                PCWSTR(title.as_ptr()),
                DIALOG_STYLE,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                None,
                None,
                instance,
                None,
            )
            .map_err(|e| HostError::Dialog(format!("Failed to create dialog: {}", e)))?;

            let state_ptr = &mut *state as *mut DialogState;
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, state_ptr as isize);

            match CreateWindowExW(
                WINDOW_EX_STYLE(0),
                w!("BUTTON"),
                w!("OK"),
                WINDOW_STYLE(WS_CHILD.0 | WS_VISIBLE.0 | WS_TABSTOP.0 | BS_DEFPUSHBUTTON as u32),
                0,
                0,
                BUTTON_WIDTH,
                BUTTON_HEIGHT,
                hwnd,
                HMENU(OK_BUTTON_ID as *mut c_void),
                instance,
                None,
            ) {
                Ok(button) => state.button = button,
                Err(e) => log::warn!("[dialog] Failed to create OK button: {}", e),
            }

            let _ = ShowWindow(hwnd, SW_SHOWDEFAULT);
            let _ = SetForegroundWindow(hwnd);

            let mut msg = MSG::default();
            while showing.load(Ordering::SeqCst) {
                let got = GetMessageW(&mut msg, HWND::default(), 0, 0);
                if got.0 <= 0 {
                    log::warn!("[dialog] Message loop ended before dismissal");
                    break;
                }
                if !IsDialogMessageW(hwnd, &msg).as_bool() {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            }

            if IsWindow(hwnd).as_bool() {
                SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
                let _ = DestroyWindow(hwnd);
            }
        }

        showing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn terminate(&self) {
        let class_name = to_wide(DIALOG_CLASS_NAME);
        if let Ok(instance) = instance() {
            unsafe {
                let _ = UnregisterClassW(PCWSTR(class_name.as_ptr()), instance);
            }
        }
    }
}

unsafe extern "system" fn dialog_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let state_ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut DialogState;

    match msg {
        WM_PAINT if !state_ptr.is_null() => {
            paint(hwnd, &mut *state_ptr);
            LRESULT(0)
        },
        WM_COMMAND if (wparam.0 & 0xFFFF) == OK_BUTTON_ID => {
            let _ = DestroyWindow(hwnd);
            LRESULT(0)
        },
        WM_DESTROY => {
            if !state_ptr.is_null() {
                let state = &mut *state_ptr;
                (*state.showing).store(false, Ordering::SeqCst);
                state.button = HWND::default();
            }
            LRESULT(0)
        },
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

/// Measure the text, lay the window out around it, then draw it.
unsafe fn paint(hwnd: HWND, state: &mut DialogState) {
    let mut ps = PAINTSTRUCT::default();
    let hdc = BeginPaint(hwnd, &mut ps);
    let previous_font = SelectObject(hdc, GetStockObject(OEM_FIXED_FONT));

    let mut measured = RECT::default();
    DrawTextW(hdc, &mut state.text, &mut measured, DT_CALCRECT);

    let mut frame = RECT::default();
    let _ = AdjustWindowRect(&mut frame, DIALOG_STYLE, BOOL::from(false));

    let screen = Size::new(
        GetSystemMetrics(SM_CXSCREEN).max(0) as u32,
        GetSystemMetrics(SM_CYSCREEN).max(0) as u32,
    );
    let layout = DialogLayout::compute(
        Rect::from(measured).size(),
        Rect::from(frame).size(),
        screen,
    );

    let window = layout.window;
    let _ = MoveWindow(
        hwnd,
        window.left,
        window.top,
        window.width() as i32,
        window.height() as i32,
        BOOL::from(false),
    );

    if !state.button.is_invalid() {
        let button = layout.button;
        let _ = MoveWindow(
            state.button,
            button.left,
            button.top,
            button.width() as i32,
            button.height() as i32,
            BOOL::from(false),
        );
    }

    let mut text_rect: RECT = layout.text.into();
    DrawTextW(hdc, &mut state.text, &mut text_rect, DT_LEFT);

    SelectObject(hdc, previous_font);
    let _ = EndPaint(hwnd, &ps);
}
