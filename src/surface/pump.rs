//! Non-blocking message pump for the frame loop.

use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, PeekMessageW, TranslateMessage, MSG, PM_REMOVE, WM_QUIT,
};

use crate::frame_loop::MessagePump;
use crate::router::RunFlag;

/// Drains every queued message on the calling thread.
pub struct Win32Pump {
    run: RunFlag,
}

impl Win32Pump {
    pub fn new(run: RunFlag) -> Self {
        Self { run }
    }
}

impl MessagePump for Win32Pump {
    fn drain(&mut self) -> usize {
        let mut msg = MSG::default();
        let mut count = 0;

        unsafe {
            while PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE).as_bool() {
                count += 1;
                if msg.message == WM_QUIT {
                    log::debug!("[surface] WM_QUIT received");
                    self.run.stop();
                    continue;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }

        count
    }
}
