//! The main overlay surface: window, window procedure and message pump.
//!
//! # Architecture
//!
//! ```text
//! mod.rs
//!   |
//!   +-- messages.rs (raw message -> SurfaceEvent)
//!   +-- window.rs (MainSurface: class, window, geometry)
//!   +-- wndproc.rs (routes decoded messages to the EventRouter)
//!   +-- pump.rs (PeekMessageW drain for the frame loop)
//! ```

pub mod messages;
#[cfg(windows)]
pub mod pump;
#[cfg(windows)]
pub mod window;
#[cfg(windows)]
pub mod wndproc;

#[cfg(windows)]
pub use pump::Win32Pump;
#[cfg(windows)]
pub use window::MainSurface;
#[cfg(windows)]
pub use wndproc::SurfaceRouter;
