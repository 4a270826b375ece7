//! The contract between the host shell and the animation routine.
//!
//! The routine loads, poses and draws the mascot. The host only drives it:
//! lifecycle calls from the frame loop, input callbacks from the event
//! router. Every call happens on the main thread.

pub mod idle;

use std::cell::RefCell;
use std::rc::Rc;

pub use idle::IdleRoutine;

use crate::cli::LaunchArgs;
use crate::error::HostResult;
use crate::graphics::GraphicsDescriptor;
use crate::types::{Point, Size};

/// Live geometry of the main surface, queried by the routine each frame.
pub trait SurfaceGeometry {
    /// Client-area size; 1x1 when the query fails.
    fn logical_size(&self) -> Size;
    /// Backing buffer pixel size.
    fn drawable_size(&self) -> Size;
    /// Cursor position in screen coordinates, origin at the bottom-left of
    /// the primary screen; `(0, 0)` when the cursor cannot be queried.
    fn mouse_position(&self) -> Point;
}

/// The external animation/model routine.
pub trait Routine {
    /// Called once after the compositor is bound and before the surface is shown.
    fn init(&mut self, args: &LaunchArgs, graphics: &GraphicsDescriptor) -> HostResult<()>;

    /// Advance the animation by one frame.
    fn update(&mut self, geometry: &dyn SurfaceGeometry);

    /// Record the frame's draw calls into the current render target.
    fn draw(&mut self);

    /// Called once during shutdown, before the compositor is released.
    fn terminate(&mut self);

    fn on_mouse_down(&mut self);

    fn on_mouse_dragged(&mut self);

    /// `delta` is in scroll units; positive scrolls away from the user.
    fn on_wheel_scrolled(&mut self, delta: f32);

    fn reset_model_position(&mut self);
}

/// The routine as shared between the frame loop and the window procedure.
pub type SharedRoutine = Rc<RefCell<dyn Routine>>;

/// Wrap a routine for sharing on the main thread.
pub fn share<R: Routine + 'static>(routine: R) -> SharedRoutine {
    Rc::new(RefCell::new(routine))
}
