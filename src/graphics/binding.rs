//! The compositor binding: everything needed to get GPU frames onto the
//! overlay surface.
//!
//! Built in one strictly ordered pass by [`CompositorBinding::bind`]. Any
//! failing step aborts the whole binding; there is no partial fallback.

use std::cell::RefCell;
use std::rc::Rc;

use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Direct3D11::{
    ID3D11DepthStencilView, ID3D11Device, ID3D11DeviceContext, ID3D11RenderTargetView,
};
use windows::Win32::Graphics::Dxgi::{IDXGISwapChain1, DXGI_PRESENT};

use super::compositor::{self, CompositorResources};
use super::{d3d, CompositionTarget, GraphicsDescriptor, RenderViews, PRESENT_SYNC_INTERVAL};
use crate::error::{HostError, HostResult};
use crate::types::Size;

/// Current render-target and depth-stencil views.
///
/// Shared with the routine's graphics layer through [`RenderViews`].
#[derive(Default)]
pub struct ViewSlots {
    render_target: RefCell<Option<ID3D11RenderTargetView>>,
    depth_stencil: RefCell<Option<ID3D11DepthStencilView>>,
}

impl ViewSlots {
    fn replace(&self, rtv: ID3D11RenderTargetView, dsv: ID3D11DepthStencilView) {
        *self.render_target.borrow_mut() = Some(rtv);
        *self.depth_stencil.borrow_mut() = Some(dsv);
    }

    fn clear(&self) {
        self.render_target.borrow_mut().take();
        self.depth_stencil.borrow_mut().take();
    }
}

impl RenderViews for ViewSlots {
    fn render_target_view(&self) -> Option<ID3D11RenderTargetView> {
        self.render_target.borrow().clone()
    }

    fn depth_stencil_view(&self) -> Option<ID3D11DepthStencilView> {
        self.depth_stencil.borrow().clone()
    }
}

/// GPU device, swap chain, views and composition tree for the main surface.
pub struct CompositorBinding {
    device: ID3D11Device,
    context: ID3D11DeviceContext,
    swap_chain: IDXGISwapChain1,
    views: Rc<ViewSlots>,
    compositor: CompositorResources,
    size: Size,
    sample_count: u32,
}

impl CompositorBinding {
    /// Bind a swap chain to `hwnd` through DirectComposition.
    ///
    /// `size` is the surface's logical size; the swap chain and depth buffer
    /// are created at exactly that size.
    pub fn bind(hwnd: HWND, size: Size, sample_count: u32) -> HostResult<Self> {
        let size = size.or_sentinel();
        log::info!("[graphics] Binding compositor at {}x{}", size.width, size.height);

        let (device, context) = d3d::create_device()
            .map_err(|e| HostError::Device(format!("D3D11CreateDevice failed: {}", e)))?;

        let dxgi_device = d3d::dxgi_device(&device)
            .map_err(|e| HostError::Device(format!("IDXGIDevice cast failed: {}", e)))?;

        let factory = d3d::create_factory()
            .map_err(|e| HostError::SwapChain(format!("CreateDXGIFactory2 failed: {}", e)))?;

        let swap_chain = d3d::create_swap_chain(&factory, &dxgi_device, size).map_err(|e| {
            HostError::SwapChain(format!("CreateSwapChainForComposition failed: {}", e))
        })?;

        let rtv = d3d::create_render_target_view(&device, &swap_chain)
            .map_err(|e| HostError::Device(format!("render target view: {}", e)))?;

        let dsv = d3d::create_depth_stencil_view(&device, size)
            .map_err(|e| HostError::Device(format!("depth stencil view: {}", e)))?;

        let compositor = compositor::create_compositor(&dxgi_device, hwnd, &swap_chain)
            .map_err(|e| HostError::Compositor(format!("DirectComposition setup failed: {}", e)))?;

        let views = Rc::new(ViewSlots::default());
        views.replace(rtv, dsv);

        log::info!("[graphics] Compositor bound");

        Ok(Self {
            device,
            context,
            swap_chain,
            views,
            compositor,
            size,
            sample_count,
        })
    }

    /// Backing buffer size in pixels.
    pub fn drawable_size(&self) -> Size {
        self.size
    }

    pub fn render_target_view(&self) -> Option<ID3D11RenderTargetView> {
        self.views.render_target_view()
    }

    pub fn depth_stencil_view(&self) -> Option<ID3D11DepthStencilView> {
        self.views.depth_stencil_view()
    }

    /// Descriptor handed to the routine's graphics layer at init.
    pub fn descriptor(&self) -> GraphicsDescriptor {
        GraphicsDescriptor {
            sample_count: self.sample_count,
            device: self.device.clone(),
            context: self.context.clone(),
            views: self.views.clone(),
        }
    }
}

impl CompositionTarget for CompositorBinding {
    fn present(&self) -> HostResult<()> {
        unsafe { self.swap_chain.Present(PRESENT_SYNC_INTERVAL, DXGI_PRESENT(0)) }
            .ok()
            .map_err(|e| HostError::Present(e.to_string()))
    }

    fn commit(&self) -> HostResult<()> {
        unsafe { self.compositor.device.Commit() }
            .map_err(|e| HostError::Commit(e.to_string()))
    }
}

impl Drop for CompositorBinding {
    fn drop(&mut self) {
        // Unbind views before the swap chain goes so no stale view outlives it
        unsafe { self.context.ClearState() };
        self.views.clear();
        log::debug!("[graphics] Compositor binding released");
    }
}
