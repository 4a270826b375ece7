//! Application context: owns every native resource of one host run.
//!
//! Setup order is surface, compositor binding, tray icon, menu supervisor,
//! router, routine init, show. Shutdown releases them in the reverse
//! dependency order, and always joins the menu worker before the surface
//! goes away.

use std::sync::Arc;

use crate::cli::LaunchArgs;
use crate::config::HostConfig;
use crate::error::{HostError, HostResult};
use crate::frame_loop::{FrameDriver, FramePacer, FrameStats, SystemClock};
use crate::graphics::CompositorBinding;
use crate::menu::{MenuSupervisor, Win32MenuHost};
use crate::router::RunFlag;
use crate::routine::{SharedRoutine, SurfaceGeometry};
use crate::surface::{MainSurface, SurfaceRouter, Win32Pump};
use crate::tray::TrayIcon;
use crate::types::{Point, Size, SENTINEL_SIZE};

pub struct AppContext {
    config: HostConfig,
    run: RunFlag,
    routine: SharedRoutine,
    routine_initialized: bool,
    menu: Option<Arc<MenuSupervisor<Win32MenuHost>>>,
    /// Boxed so its address stays put while the window holds a pointer to it
    router: Option<Box<SurfaceRouter>>,
    tray: Option<TrayIcon>,
    binding: Option<CompositorBinding>,
    surface: Option<MainSurface>,
}

impl AppContext {
    /// Create every resource and initialize the routine.
    ///
    /// On failure whatever was already created is released before returning.
    pub fn setup(args: &LaunchArgs, routine: SharedRoutine) -> HostResult<Self> {
        let mut app = Self {
            config: args.config.clone(),
            run: RunFlag::new(),
            routine,
            routine_initialized: false,
            menu: None,
            router: None,
            tray: None,
            binding: None,
            surface: None,
        };

        let surface = app.surface.insert(MainSurface::create()?);
        let hwnd = surface.hwnd();
        let logical = surface.logical_size();

        app.binding = Some(CompositorBinding::bind(
            hwnd,
            logical,
            app.config.sample_count,
        )?);

        app.tray = Some(TrayIcon::install(hwnd, &app.config.tray_tooltip)?);

        let menu = Arc::new(MenuSupervisor::new(Win32MenuHost::new(hwnd, app.run.clone())));
        app.menu = Some(menu.clone());

        let router = Box::new(SurfaceRouter::new(
            app.routine.clone(),
            app.run.clone(),
            menu,
            app.config.wheel_units_per_notch,
        ));
        if let Some(surface) = &app.surface {
            surface.attach_router(&router);
        }
        app.router = Some(router);

        let descriptor = app
            .binding
            .as_ref()
            .map(CompositorBinding::descriptor)
            .ok_or_else(|| HostError::Device("compositor binding missing".to_string()))?;
        app.routine
            .try_borrow_mut()
            .map_err(|_| HostError::Other("routine is already borrowed".to_string()))?
            .init(args, &descriptor)?;
        app.routine_initialized = true;

        if let Some(surface) = &app.surface {
            surface.show();
        }

        log::info!(
            "[app] Setup complete ({}x{}, {} fps)",
            logical.width,
            logical.height,
            app.config.frame_rate
        );
        Ok(app)
    }

    /// Run the frame loop until quit is requested.
    pub fn run_frames(&self) -> HostResult<FrameStats> {
        let binding = self
            .binding
            .as_ref()
            .ok_or_else(|| HostError::Device("compositor binding missing".to_string()))?;

        let driver = FrameDriver::new(
            Win32Pump::new(self.run.clone()),
            SystemClock,
            FramePacer::new(self.config.frame_interval()),
            self.run.clone(),
            self.routine.clone(),
            self,
            binding,
        );
        driver.run()
    }

    /// Release everything. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.run.stop();

        // The worker may still post to the surface
        if let Some(menu) = self.menu.take() {
            if menu.is_active() {
                log::info!("[app] Waiting for the context menu to close");
            }
            menu.shutdown();
        }

        if self.tray.take().is_some() {
            log::debug!("[app] Tray icon released");
        }

        if self.routine_initialized {
            self.routine_initialized = false;
            match self.routine.try_borrow_mut() {
                Ok(mut routine) => routine.terminate(),
                Err(_) => log::warn!("[app] Routine busy during shutdown, skipping terminate"),
            }
        }

        if let Some(surface) = &self.surface {
            surface.detach_router();
        }
        self.router = None;

        self.binding = None;

        if self.surface.take().is_some() {
            log::info!("[app] Shutdown complete");
        }
    }
}

impl SurfaceGeometry for AppContext {
    fn logical_size(&self) -> Size {
        self.surface
            .as_ref()
            .map_or(SENTINEL_SIZE, MainSurface::logical_size)
    }

    fn drawable_size(&self) -> Size {
        self.binding
            .as_ref()
            .map_or(SENTINEL_SIZE, CompositorBinding::drawable_size)
    }

    fn mouse_position(&self) -> Point {
        crate::surface::window::cursor_position()
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}
