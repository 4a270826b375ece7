//! Modal message dialog for fatal errors.
//!
//! `show_message` may be called from anywhere in the process. It is a no-op
//! before [`init`] and while another message is already showing, so an error
//! raised from inside the dialog's own loop never stacks a second window.

pub mod layout;
#[cfg(windows)]
pub mod win32;

use std::sync::atomic::{AtomicBool, Ordering};

use lazy_static::lazy_static;

use crate::error::HostResult;

pub use layout::DialogLayout;

/// Caption of the dialog window
pub const DIALOG_TITLE: &str = "mascot-host Error";

/// Platform side of the dialog.
pub trait DialogHost: Send + Sync {
    /// Register whatever the dialog needs (window class, font).
    fn init(&self) -> HostResult<()>;

    /// Show `text` and block until `showing` is cleared by the user
    /// dismissing the dialog.
    fn present(&self, text: &str, showing: &AtomicBool) -> HostResult<()>;

    fn terminate(&self);
}

/// Guards the host so at most one dialog is visible at a time.
pub struct MessageDialog<H: DialogHost> {
    host: H,
    initialized: AtomicBool,
    showing: AtomicBool,
}

impl<H: DialogHost> MessageDialog<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            initialized: AtomicBool::new(false),
            showing: AtomicBool::new(false),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn init(&self) {
        if self.initialized.load(Ordering::SeqCst) {
            return;
        }
        match self.host.init() {
            Ok(()) => self.initialized.store(true, Ordering::SeqCst),
            Err(e) => log::error!("[dialog] Failed to initialize: {}", e),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn is_showing(&self) -> bool {
        self.showing.load(Ordering::SeqCst)
    }

    /// Show `text` and wait for dismissal. Returns false if nothing was shown.
    pub fn show(&self, text: &str) -> bool {
        if !self.is_initialized() {
            log::warn!("[dialog] Not initialized, dropping message: {}", text);
            return false;
        }
        if self.showing.swap(true, Ordering::SeqCst) {
            log::warn!("[dialog] Already showing, dropping message: {}", text);
            return false;
        }

        let shown = match self.host.present(text, &self.showing) {
            Ok(()) => true,
            Err(e) => {
                log::error!("[dialog] Failed to show message: {}", e);
                false
            },
        };
        self.showing.store(false, Ordering::SeqCst);
        shown
    }

    pub fn terminate(&self) {
        if self.initialized.swap(false, Ordering::SeqCst) {
            self.host.terminate();
        }
    }
}

/// Fallback for hosts without a window system: print and return.
#[derive(Debug, Default)]
pub struct ConsoleDialogHost;

impl DialogHost for ConsoleDialogHost {
    fn init(&self) -> HostResult<()> {
        Ok(())
    }

    fn present(&self, text: &str, showing: &AtomicBool) -> HostResult<()> {
        eprintln!("{}: {}", DIALOG_TITLE, text);
        showing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn terminate(&self) {}
}

#[cfg(windows)]
type PlatformDialogHost = win32::Win32DialogHost;
#[cfg(not(windows))]
type PlatformDialogHost = ConsoleDialogHost;

lazy_static! {
    static ref DIALOG: MessageDialog<PlatformDialogHost> =
        MessageDialog::new(PlatformDialogHost::default());
}

/// Prepare the process-wide dialog. Call once at startup.
pub fn init() {
    DIALOG.init();
}

/// Show a message in the process-wide dialog and wait for dismissal.
pub fn show_message(text: &str) -> bool {
    DIALOG.show(text)
}

/// Release the process-wide dialog's resources.
pub fn terminate() {
    DIALOG.terminate();
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, OnceLock, Weak};

    use parking_lot::Mutex;

    use super::*;
    use crate::error::HostError;

    #[derive(Default)]
    struct FakeHost {
        windows: AtomicUsize,
        texts: Mutex<Vec<String>>,
        nested: OnceLock<Weak<MessageDialog<FakeHost>>>,
        nested_result: Mutex<Option<bool>>,
        fail: AtomicBool,
    }

    impl DialogHost for FakeHost {
        fn init(&self) -> HostResult<()> {
            Ok(())
        }

        fn present(&self, text: &str, showing: &AtomicBool) -> HostResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(HostError::Dialog("CreateWindowExW failed".into()));
            }
            self.windows.fetch_add(1, Ordering::SeqCst);
            self.texts.lock().push(text.to_string());

            // A second error raised while this one is on screen
            if let Some(dialog) = self.nested.get().and_then(Weak::upgrade) {
                *self.nested_result.lock() = Some(dialog.show("nested failure"));
            }

            showing.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn terminate(&self) {}
    }

    #[test]
    fn show_before_init_is_noop() {
        let dialog = MessageDialog::new(FakeHost::default());
        assert!(!dialog.show("too early"));
        assert_eq!(dialog.host().windows.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn show_presents_text() {
        let dialog = MessageDialog::new(FakeHost::default());
        dialog.init();
        assert!(dialog.show("Failed to create window"));
        assert!(!dialog.is_showing());
        assert_eq!(*dialog.host().texts.lock(), vec!["Failed to create window"]);
    }

    #[test]
    fn reentrant_show_creates_no_second_window() {
        let dialog = Arc::new(MessageDialog::new(FakeHost::default()));
        let _ = dialog.host().nested.set(Arc::downgrade(&dialog));
        dialog.init();

        assert!(dialog.show("first failure"));
        assert_eq!(dialog.host().windows.load(Ordering::SeqCst), 1);
        assert_eq!(*dialog.host().nested_result.lock(), Some(false));
    }

    #[test]
    fn dialog_can_be_shown_again_after_dismissal() {
        let dialog = MessageDialog::new(FakeHost::default());
        dialog.init();
        assert!(dialog.show("one"));
        assert!(dialog.show("two"));
        assert_eq!(dialog.host().windows.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn host_failure_clears_showing_flag() {
        let dialog = MessageDialog::new(FakeHost::default());
        dialog.init();
        dialog.host().fail.store(true, Ordering::SeqCst);
        assert!(!dialog.show("lost"));
        assert!(!dialog.is_showing());
    }

    #[test]
    fn terminate_requires_new_init() {
        let dialog = MessageDialog::new(FakeHost::default());
        dialog.init();
        dialog.terminate();
        assert!(!dialog.show("after terminate"));
    }
}
