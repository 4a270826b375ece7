//! Central error types for the mascot host.
//!
//! Every setup step that can fail maps to a variant here. Severity decides
//! whether the process shows the message dialog and exits, or logs and
//! carries on with a safe default.

use thiserror::Error;

/// How the host reacts to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Setup cannot continue. Show the dialog and exit non-zero.
    Fatal,
    /// Logged; the caller substitutes a default or skips the step.
    Recoverable,
}

/// Main error type for host operations.
#[derive(Error, Debug)]
pub enum HostError {
    /// Window class registration or window creation failed
    #[error("Window error: {0}")]
    Window(String),

    /// D3D11 device or view creation failed
    #[error("Device error: {0}")]
    Device(String),

    /// DXGI swap chain creation failed
    #[error("Swap chain error: {0}")]
    SwapChain(String),

    /// DirectComposition device, target or visual setup failed
    #[error("Compositor error: {0}")]
    Compositor(String),

    /// A frame could not be presented
    #[error("Present failed: {0}")]
    Present(String),

    /// The compositor transaction for a frame could not be committed
    #[error("Commit failed: {0}")]
    Commit(String),

    /// Notification icon could not be installed
    #[error("Tray icon error: {0}")]
    Tray(String),

    /// Context menu session failed (cursor query, popup creation)
    #[error("Menu error: {0}")]
    Menu(String),

    /// Message dialog could not be shown
    #[error("Dialog error: {0}")]
    Dialog(String),

    /// Configuration file could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    /// File system error (config, logs)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl HostError {
    /// Classify the error.
    ///
    /// Per-frame and menu failures are recoverable; everything that builds
    /// the surface, the device or the compositor tree is fatal.
    pub fn severity(&self) -> Severity {
        match self {
            HostError::Menu(_) | HostError::Present(_) | HostError::Commit(_) => {
                Severity::Recoverable
            },
            _ => Severity::Fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

/// Type alias for Results using HostError.
pub type HostResult<T> = Result<T, HostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HostError::Window("CreateWindowExW failed".to_string());
        assert_eq!(err.to_string(), "Window error: CreateWindowExW failed");
    }

    #[test]
    fn test_setup_errors_are_fatal() {
        assert!(HostError::Window("x".into()).is_fatal());
        assert!(HostError::Device("x".into()).is_fatal());
        assert!(HostError::SwapChain("create failed".into()).is_fatal());
        assert!(HostError::Compositor("target".into()).is_fatal());
        assert!(HostError::Tray("fallback icon".into()).is_fatal());
    }

    #[test]
    fn test_runtime_errors_are_recoverable() {
        assert_eq!(
            HostError::Menu("GetCursorPos failed".into()).severity(),
            Severity::Recoverable
        );
        assert_eq!(
            HostError::Present("device removed".into()).severity(),
            Severity::Recoverable
        );
        assert_eq!(
            HostError::Commit("0x887A0005".into()).severity(),
            Severity::Recoverable
        );
        // Classification follows the variant, not the message text
        assert!(HostError::SwapChain("present".into()).is_fatal());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: HostError = io_err.into();
        assert!(matches!(err, HostError::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: HostError = json_err.into();
        assert!(matches!(err, HostError::Config(_)));
        assert!(err.to_string().starts_with("Config error"));
    }
}
