//! A minimal routine that keeps the surface transparent.
//!
//! Used when no animation routine is linked in. It draws nothing but a
//! cleared frame, and tracks drag offset and zoom from the input callbacks
//! so the routing can be followed in the logs.

use crate::cli::LaunchArgs;
use crate::error::HostResult;
use crate::graphics::GraphicsDescriptor;
use crate::types::Point;

use super::{Routine, SurfaceGeometry};

/// Zoom factor applied per scroll unit
const ZOOM_STEP: f32 = 1.1;
const MIN_ZOOM: f32 = 0.1;
const MAX_ZOOM: f32 = 10.0;

pub struct IdleRoutine {
    graphics: Option<GraphicsDescriptor>,
    /// Accumulated drag offset in screen pixels (bottom-left origin)
    offset: (i32, i32),
    zoom: f32,
    anchor: Option<Point>,
    anchor_pending: bool,
    drag_pending: bool,
    frames: u64,
}

impl Default for IdleRoutine {
    fn default() -> Self {
        Self::new()
    }
}

impl IdleRoutine {
    pub fn new() -> Self {
        Self {
            graphics: None,
            offset: (0, 0),
            zoom: 1.0,
            anchor: None,
            anchor_pending: false,
            drag_pending: false,
            frames: 0,
        }
    }

    pub fn offset(&self) -> (i32, i32) {
        self.offset
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Routine for IdleRoutine {
    fn init(&mut self, args: &LaunchArgs, graphics: &GraphicsDescriptor) -> HostResult<()> {
        match &args.model {
            Some(model) => log::info!("[routine] Idle routine ignoring model {:?}", model),
            None => log::info!("[routine] Idle routine started"),
        }
        self.graphics = Some(graphics.clone());
        Ok(())
    }

    fn update(&mut self, geometry: &dyn SurfaceGeometry) {
        self.frames += 1;
        let position = geometry.mouse_position();

        if self.anchor_pending {
            self.anchor = Some(position);
            self.anchor_pending = false;
        }

        if self.drag_pending {
            if let Some(anchor) = self.anchor {
                self.offset.0 += position.x - anchor.x;
                self.offset.1 += position.y - anchor.y;
                self.anchor = Some(position);
            }
            self.drag_pending = false;
        }
    }

    fn draw(&mut self) {
        #[cfg(windows)]
        if let Some(graphics) = &self.graphics {
            clear_views(graphics);
        }
    }

    fn terminate(&mut self) {
        log::info!(
            "[routine] Idle routine stopped after {} frames (offset {:?}, zoom {:.2})",
            self.frames,
            self.offset,
            self.zoom
        );
        self.graphics = None;
    }

    fn on_mouse_down(&mut self) {
        self.anchor_pending = true;
    }

    fn on_mouse_dragged(&mut self) {
        self.drag_pending = true;
    }

    fn on_wheel_scrolled(&mut self, delta: f32) {
        self.zoom = (self.zoom * ZOOM_STEP.powf(delta)).clamp(MIN_ZOOM, MAX_ZOOM);
        log::debug!("[routine] Zoom {:.2}", self.zoom);
    }

    fn reset_model_position(&mut self) {
        log::info!("[routine] Model position reset");
        self.offset = (0, 0);
        self.zoom = 1.0;
        self.anchor = None;
    }
}

/// Bind the current views and clear them to fully transparent.
#[cfg(windows)]
fn clear_views(graphics: &GraphicsDescriptor) {
    use windows::Win32::Graphics::Direct3D11::{D3D11_CLEAR_DEPTH, D3D11_CLEAR_STENCIL};

    let (Some(rtv), dsv) = (
        graphics.views.render_target_view(),
        graphics.views.depth_stencil_view(),
    ) else {
        return;
    };

    unsafe {
        graphics
            .context
            .OMSetRenderTargets(Some(&[Some(rtv.clone())]), dsv.as_ref());
        graphics.context.ClearRenderTargetView(&rtv, &[0.0, 0.0, 0.0, 0.0]);
        if let Some(dsv) = &dsv {
            graphics.context.ClearDepthStencilView(
                dsv,
                (D3D11_CLEAR_DEPTH.0 | D3D11_CLEAR_STENCIL.0) as u32,
                1.0,
                0,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::types::Size;

    struct FakeGeometry {
        mouse: Cell<Point>,
    }

    impl SurfaceGeometry for FakeGeometry {
        fn logical_size(&self) -> Size {
            Size::new(800, 600)
        }

        fn drawable_size(&self) -> Size {
            Size::new(800, 600)
        }

        fn mouse_position(&self) -> Point {
            self.mouse.get()
        }
    }

    #[test]
    fn drag_accumulates_offset() {
        let geometry = FakeGeometry {
            mouse: Cell::new(Point::new(100, 100)),
        };
        let mut routine = IdleRoutine::new();

        routine.on_mouse_down();
        routine.update(&geometry);

        geometry.mouse.set(Point::new(130, 90));
        routine.on_mouse_dragged();
        routine.update(&geometry);

        geometry.mouse.set(Point::new(140, 95));
        routine.on_mouse_dragged();
        routine.update(&geometry);

        assert_eq!(routine.offset(), (40, -5));
        assert_eq!(routine.frames(), 3);
    }

    #[test]
    fn update_without_drag_keeps_offset() {
        let geometry = FakeGeometry {
            mouse: Cell::new(Point::new(10, 10)),
        };
        let mut routine = IdleRoutine::new();
        routine.on_mouse_down();
        routine.update(&geometry);
        geometry.mouse.set(Point::new(50, 50));
        routine.update(&geometry);
        assert_eq!(routine.offset(), (0, 0));
    }

    #[test]
    fn wheel_zoom_is_clamped() {
        let mut routine = IdleRoutine::new();
        routine.on_wheel_scrolled(1.0);
        assert!((routine.zoom() - 1.1).abs() < 1e-5);

        routine.on_wheel_scrolled(1000.0);
        assert_eq!(routine.zoom(), MAX_ZOOM);

        routine.on_wheel_scrolled(-1000.0);
        assert_eq!(routine.zoom(), MIN_ZOOM);
    }

    #[test]
    fn reset_restores_origin() {
        let geometry = FakeGeometry {
            mouse: Cell::new(Point::new(0, 0)),
        };
        let mut routine = IdleRoutine::new();
        routine.on_mouse_down();
        routine.update(&geometry);
        geometry.mouse.set(Point::new(25, 25));
        routine.on_mouse_dragged();
        routine.update(&geometry);
        routine.on_wheel_scrolled(3.0);

        routine.reset_model_position();
        assert_eq!(routine.offset(), (0, 0));
        assert_eq!(routine.zoom(), 1.0);
    }
}
