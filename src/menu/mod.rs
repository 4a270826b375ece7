//! Context menu for the mascot: "Enable Mouse", "Reset Position", "Quit".
//!
//! A session runs on a short-lived worker thread (see [`supervisor`]). The
//! worker never touches the routine or the surface's GPU state; it only
//! flips the surface's click-through bit and posts messages back to the
//! main thread.
//!
//! # Architecture
//!
//! ```text
//! mod.rs (commands, item state, session logic)
//!   |
//!   +-- supervisor.rs (single worker, join on shutdown)
//!   +-- popup.rs (Win32 host: transient owner window + TrackPopupMenu)
//! ```

#[cfg(windows)]
pub mod popup;
pub mod supervisor;


#[cfg(windows)]
pub use popup::Win32MenuHost;
pub use supervisor::MenuSupervisor;

use crate::error::HostResult;
use crate::types::WS_EX_TRANSPARENT_BIT;

/// Menu item ids. Zero is reserved for "dismissed".
pub const ID_ENABLE_MOUSE: u32 = 1;
pub const ID_RESET_POSITION: u32 = 2;
pub const ID_QUIT: u32 = 3;

pub const LABEL_ENABLE_MOUSE: &str = "&Enable Mouse";
pub const LABEL_RESET_POSITION: &str = "&Reset Position";
pub const LABEL_QUIT: &str = "&Quit";

/// The user's choice from the popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    /// Dismissed without a choice
    None,
    EnableMouse,
    ResetPosition,
    Quit,
}

impl MenuCommand {
    /// Map a `TrackPopupMenu` return value.
    pub fn from_id(id: u32) -> Self {
        match id {
            ID_ENABLE_MOUSE => Self::EnableMouse,
            ID_RESET_POSITION => Self::ResetPosition,
            ID_QUIT => Self::Quit,
            _ => Self::None,
        }
    }
}

/// Display state of the "Enable Mouse" item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItemState {
    /// Surface receives mouse input
    Checked,
    /// Surface is click-through
    Unchecked,
    /// Style could not be read
    Disabled,
}

impl MenuItemState {
    pub fn from_style(ex_style: Option<u32>) -> Self {
        match ex_style {
            Some(style) if style & WS_EX_TRANSPARENT_BIT != 0 => Self::Unchecked,
            Some(_) => Self::Checked,
            None => Self::Disabled,
        }
    }
}

/// Flip exactly the click-through bit.
pub fn toggle_click_through(ex_style: u32) -> u32 {
    ex_style ^ WS_EX_TRANSPARENT_BIT
}

/// What a menu session may do to the rest of the process.
///
/// Called from the worker thread, so everything here must be safe to do
/// off the main thread: style reads/writes and posted messages only.
pub trait MenuHost: Send + Sync + 'static {
    /// The surface's extended style, or `None` if it could not be read.
    fn read_ex_style(&self) -> Option<u32>;

    fn write_ex_style(&self, ex_style: u32) -> HostResult<()>;

    /// True once shutdown has begun; the surface must not be restyled then.
    fn surface_closing(&self) -> bool;

    /// Show the popup at the cursor and block until it closes.
    fn show_popup(&self, enable_mouse: MenuItemState) -> HostResult<MenuCommand>;

    /// Ask the main thread to reset the model position.
    fn request_reset(&self);

    /// Ask the main thread to shut down.
    fn request_quit(&self);
}

/// One full menu session: read state, show the popup, apply the choice.
pub fn run_session<H: MenuHost + ?Sized>(host: &H) -> MenuCommand {
    let ex_style = host.read_ex_style();
    if ex_style.is_none() {
        log::warn!("[menu] Could not read surface style, Enable Mouse disabled");
    }

    let command = match host.show_popup(MenuItemState::from_style(ex_style)) {
        Ok(command) => command,
        Err(e) => {
            log::warn!("[menu] Session aborted: {}", e);
            return MenuCommand::None;
        },
    };

    log::debug!("[menu] Selected {:?}", command);
    apply_command(host, command, ex_style);
    command
}

/// Carry out a chosen command.
pub fn apply_command<H: MenuHost + ?Sized>(host: &H, command: MenuCommand, ex_style: Option<u32>) {
    match command {
        MenuCommand::EnableMouse => {
            let Some(style) = ex_style else {
                return;
            };
            if host.surface_closing() {
                log::info!("[menu] Surface is closing, click-through left unchanged");
                return;
            }
            let toggled = toggle_click_through(style);
            match host.write_ex_style(toggled) {
                Ok(()) => log::info!(
                    "[menu] Mouse input {}",
                    if toggled & WS_EX_TRANSPARENT_BIT == 0 {
                        "enabled"
                    } else {
                        "disabled"
                    }
                ),
                Err(e) => log::warn!("[menu] Failed to toggle click-through: {}", e),
            }
        },
        MenuCommand::ResetPosition => host.request_reset(),
        MenuCommand::Quit => {
            log::info!("[menu] Quit selected");
            host.request_quit();
        },
        MenuCommand::None => {},
    }
}
