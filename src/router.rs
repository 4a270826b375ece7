//! Input/event routing for the main surface.
//!
//! The window procedure decodes raw Win32 messages into [`SurfaceEvent`]s and
//! hands them to [`EventRouter::handle`]. The router decides what each event
//! means: a routine callback, a context-menu trigger, shutdown, or nothing
//! (default OS handling).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::routine::SharedRoutine;
use crate::types::WHEEL_DELTA;

/// Process-level run flag shared by the frame loop and the router.
#[derive(Debug, Clone)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Sub-codes delivered with the tray icon's callback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayNotification {
    LeftButtonDown,
    RightButtonDown,
    Other(u32),
}

/// The reduced event vocabulary of the main surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent {
    /// Close or destroy request for the surface
    CloseRequested,
    PrimaryButtonDown,
    PointerMoved { primary_held: bool },
    /// Raw wheel delta as reported by the OS (120 per notch)
    WheelScrolled { raw_delta: i16 },
    SecondaryButtonDown,
    Tray(TrayNotification),
    /// Posted by the menu worker
    ResetPositionRequested,
    /// Anything the router does not care about
    Unhandled,
}

/// What the window procedure should do after routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Consumed; return 0
    Handled,
    /// Consumed; also post WM_QUIT
    Quit,
    /// Pass to DefWindowProcW
    Default,
}

/// Starts a context-menu session.
pub trait MenuLauncher {
    /// Returns false when the request was dropped because a session is active.
    fn launch(&self) -> bool;
}

impl<T: MenuLauncher + ?Sized> MenuLauncher for Arc<T> {
    fn launch(&self) -> bool {
        (**self).launch()
    }
}

/// Convert an OS wheel delta into routine scroll units.
///
/// Linear in the OS delta: one notch (120) maps to `units_per_notch`.
pub fn wheel_units(raw_delta: i16, units_per_notch: f32) -> f32 {
    raw_delta as f32 / WHEEL_DELTA as f32 * units_per_notch
}

/// Routes surface events to the routine, the menu and the run flag.
pub struct EventRouter<M> {
    routine: SharedRoutine,
    run: RunFlag,
    menu: M,
    wheel_units_per_notch: f32,
}

impl<M: MenuLauncher> EventRouter<M> {
    pub fn new(routine: SharedRoutine, run: RunFlag, menu: M, wheel_units_per_notch: f32) -> Self {
        Self {
            routine,
            run,
            menu,
            wheel_units_per_notch,
        }
    }

    pub fn handle(&self, event: SurfaceEvent) -> Disposition {
        match event {
            SurfaceEvent::CloseRequested => {
                log::info!("[router] Close requested, stopping");
                self.run.stop();
                Disposition::Quit
            },
            SurfaceEvent::PrimaryButtonDown => {
                self.with_routine(|r| r.on_mouse_down());
                Disposition::Handled
            },
            SurfaceEvent::PointerMoved { primary_held: true } => {
                self.with_routine(|r| r.on_mouse_dragged());
                Disposition::Handled
            },
            SurfaceEvent::PointerMoved { primary_held: false } => Disposition::Default,
            SurfaceEvent::WheelScrolled { raw_delta } => {
                let delta = wheel_units(raw_delta, self.wheel_units_per_notch);
                self.with_routine(|r| r.on_wheel_scrolled(delta));
                Disposition::Handled
            },
            SurfaceEvent::Tray(TrayNotification::LeftButtonDown)
            | SurfaceEvent::Tray(TrayNotification::RightButtonDown)
            | SurfaceEvent::SecondaryButtonDown => {
                if !self.menu.launch() {
                    log::debug!("[router] Menu request dropped, session already active");
                }
                Disposition::Handled
            },
            SurfaceEvent::Tray(TrayNotification::Other(_)) => Disposition::Handled,
            SurfaceEvent::ResetPositionRequested => {
                self.with_routine(|r| r.reset_model_position());
                Disposition::Handled
            },
            SurfaceEvent::Unhandled => Disposition::Default,
        }
    }

    /// Call into the routine unless it is already borrowed (re-entrant dispatch).
    fn with_routine(&self, f: impl FnOnce(&mut dyn crate::routine::Routine)) {
        match self.routine.try_borrow_mut() {
            Ok(mut routine) => f(&mut *routine),
            Err(_) => log::warn!("[router] Routine busy, dropping re-entrant event"),
        }
    }
}
