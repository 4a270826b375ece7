//! Graphics subsystem: the GPU device, swap chain and DirectComposition tree
//! behind the overlay surface.
//!
//! # Architecture
//!
//! ```text
//! D3D11 Device (single-threaded, BGRA)
//!     |
//!     +-- DXGI Swap Chain (for composition, premultiplied alpha)
//!     |       |
//!     |       +-- Render target view (back buffer)
//!     |       +-- DirectComposition visual -> target -> surface HWND
//!     |
//!     +-- Depth/stencil texture + view (D24S8)
//! ```
//!
//! # Modules
//!
//! - `d3d` - device, swap chain and view creation
//! - `compositor` - DirectComposition setup
//! - `binding` - owns all of the above; present + commit
//!
//! The `CompositionTarget` contract and `present_and_commit` are platform
//! independent so the frame loop can be driven by test doubles.

#[cfg(windows)]
pub mod binding;
#[cfg(windows)]
pub mod compositor;
#[cfg(windows)]
pub mod d3d;

#[cfg(windows)]
pub use binding::CompositorBinding;

use crate::error::HostResult;

/// Vertical sync interval passed to `Present`: wait for the next refresh.
pub const PRESENT_SYNC_INTERVAL: u32 = 1;

/// Something that can put a finished frame on screen.
///
/// `present` hands the frame to the swap chain; `commit` publishes the
/// compositor transaction. A frame only becomes visible after both.
pub trait CompositionTarget {
    fn present(&self) -> HostResult<()>;
    fn commit(&self) -> HostResult<()>;
}

/// Present the current frame, then commit the compositor.
///
/// The commit is issued even when present fails so that presents never
/// pile up without an intervening commit. The first error is returned.
pub fn present_and_commit<T: CompositionTarget + ?Sized>(target: &T) -> HostResult<()> {
    let presented = target.present();
    let committed = target.commit();
    presented.and(committed)
}

/// Pull interface for the views the routine draws into.
///
/// Views are looked up at draw time rather than captured at bind time, so
/// recreating them never requires re-registering anything.
#[cfg(windows)]
pub trait RenderViews {
    fn render_target_view(&self) -> Option<windows::Win32::Graphics::Direct3D11::ID3D11RenderTargetView>;
    fn depth_stencil_view(&self) -> Option<windows::Win32::Graphics::Direct3D11::ID3D11DepthStencilView>;
}

/// What the external graphics layer receives at context initialization.
#[derive(Clone)]
pub struct GraphicsDescriptor {
    /// MSAA sample count of the render target
    pub sample_count: u32,
    #[cfg(windows)]
    pub device: windows::Win32::Graphics::Direct3D11::ID3D11Device,
    #[cfg(windows)]
    pub context: windows::Win32::Graphics::Direct3D11::ID3D11DeviceContext,
    #[cfg(windows)]
    pub views: std::rc::Rc<dyn RenderViews>,
}

impl std::fmt::Debug for GraphicsDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsDescriptor")
            .field("sample_count", &self.sample_count)
            .finish_non_exhaustive()
    }
}
