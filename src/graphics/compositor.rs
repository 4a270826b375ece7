//! DirectComposition tree for the overlay surface.
//!
//! Without a redirection bitmap the window shows nothing of its own. One
//! visual carrying the swap chain is all that ends up on screen.

use windows::core::Result;
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::DirectComposition::{
    DCompositionCreateDevice, IDCompositionDevice, IDCompositionTarget, IDCompositionVisual,
};
use windows::Win32::Graphics::Dxgi::{IDXGIDevice, IDXGISwapChain1};

/// The composition objects that keep the swap chain attached to the window.
pub struct CompositorResources {
    /// Commits go through this device once per frame
    pub device: IDCompositionDevice,
    /// Releasing the target detaches the tree from the window
    #[allow(dead_code)]
    pub target: IDCompositionTarget,
    #[allow(dead_code)]
    pub visual: IDCompositionVisual,
}

/// Attach `swap_chain` to `hwnd` and publish the tree.
///
/// The first commit happens here, before any frame is drawn.
pub fn create_compositor(
    dxgi_device: &IDXGIDevice,
    hwnd: HWND,
    swap_chain: &IDXGISwapChain1,
) -> Result<CompositorResources> {
    unsafe {
        let device: IDCompositionDevice = DCompositionCreateDevice(dxgi_device)?;
        let target = device.CreateTargetForHwnd(hwnd, true)?;
        let visual = device.CreateVisual()?;

        visual.SetContent(swap_chain)?;
        target.SetRoot(&visual)?;
        device.Commit()?;

        Ok(CompositorResources {
            device,
            target,
            visual,
        })
    }
}
