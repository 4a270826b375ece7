//! Direct3D 11 device, swap chain and view creation.
//!
//! The device is single-threaded: every call into it happens on the main
//! thread that owns the frame loop.

use windows::core::{Interface, Result};
use windows::Win32::Foundation::HMODULE;
use windows::Win32::Graphics::Direct3D::D3D_DRIVER_TYPE_HARDWARE;
use windows::Win32::Graphics::Direct3D11::{
    D3D11CreateDevice, ID3D11DepthStencilView, ID3D11Device, ID3D11DeviceContext,
    ID3D11RenderTargetView, ID3D11Texture2D, D3D11_BIND_DEPTH_STENCIL,
    D3D11_CREATE_DEVICE_BGRA_SUPPORT, D3D11_CREATE_DEVICE_SINGLETHREADED, D3D11_SDK_VERSION,
    D3D11_TEXTURE2D_DESC, D3D11_USAGE_DEFAULT,
};
use windows::Win32::Graphics::Dxgi::Common::{
    DXGI_ALPHA_MODE_PREMULTIPLIED, DXGI_FORMAT_B8G8R8A8_UNORM, DXGI_FORMAT_D24_UNORM_S8_UINT,
    DXGI_SAMPLE_DESC,
};
use windows::Win32::Graphics::Dxgi::{
    CreateDXGIFactory2, IDXGIDevice, IDXGIFactory2, IDXGISwapChain1, DXGI_CREATE_FACTORY_FLAGS,
    DXGI_SCALING_STRETCH, DXGI_SWAP_CHAIN_DESC1, DXGI_SWAP_EFFECT_FLIP_SEQUENTIAL,
    DXGI_USAGE_RENDER_TARGET_OUTPUT,
};

use crate::types::Size;

/// Number of swap chain buffers (double buffering)
pub const SWAP_CHAIN_BUFFERS: u32 = 2;

/// Create a hardware D3D11 device and its immediate context.
///
/// BGRA support is required for composition swap chains.
pub fn create_device() -> Result<(ID3D11Device, ID3D11DeviceContext)> {
    let mut device: Option<ID3D11Device> = None;
    let mut context: Option<ID3D11DeviceContext> = None;

    unsafe {
        D3D11CreateDevice(
            None,
            D3D_DRIVER_TYPE_HARDWARE,
            HMODULE::default(),
            D3D11_CREATE_DEVICE_SINGLETHREADED | D3D11_CREATE_DEVICE_BGRA_SUPPORT,
            None,
            D3D11_SDK_VERSION,
            Some(&mut device),
            None,
            Some(&mut context),
        )?;
    }

    match (device, context) {
        (Some(device), Some(context)) => Ok((device, context)),
        _ => Err(windows::core::Error::from_win32()),
    }
}

/// Cast the D3D device to the DXGI device that composition APIs expect.
pub fn dxgi_device(device: &ID3D11Device) -> Result<IDXGIDevice> {
    device.cast()
}

/// Create the DXGI factory used for swap chain creation.
pub fn create_factory() -> Result<IDXGIFactory2> {
    unsafe { CreateDXGIFactory2(DXGI_CREATE_FACTORY_FLAGS(0)) }
}

/// Create a DXGI swap chain for DirectComposition.
///
/// The swap chain is configured for:
/// - BGRA format
/// - Premultiplied alpha (the desktop shows through transparent pixels)
/// - Flip sequential presentation, two buffers
pub fn create_swap_chain(
    factory: &IDXGIFactory2,
    dxgi_device: &IDXGIDevice,
    size: Size,
) -> Result<IDXGISwapChain1> {
    let desc = DXGI_SWAP_CHAIN_DESC1 {
        Width: size.width,
        Height: size.height,
        Format: DXGI_FORMAT_B8G8R8A8_UNORM,
        Stereo: false.into(),
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
        BufferCount: SWAP_CHAIN_BUFFERS,
        Scaling: DXGI_SCALING_STRETCH,
        SwapEffect: DXGI_SWAP_EFFECT_FLIP_SEQUENTIAL,
        AlphaMode: DXGI_ALPHA_MODE_PREMULTIPLIED,
        Flags: 0,
    };

    unsafe { factory.CreateSwapChainForComposition(dxgi_device, &desc, None) }
}

/// Create a render target view over the swap chain's back buffer.
pub fn create_render_target_view(
    device: &ID3D11Device,
    swap_chain: &IDXGISwapChain1,
) -> Result<ID3D11RenderTargetView> {
    unsafe {
        let back_buffer: ID3D11Texture2D = swap_chain.GetBuffer(0)?;
        let mut rtv: Option<ID3D11RenderTargetView> = None;
        device.CreateRenderTargetView(&back_buffer, None, Some(&mut rtv))?;
        rtv.ok_or_else(windows::core::Error::from_win32)
    }
}

/// Create a 24-bit depth / 8-bit stencil texture and its view.
pub fn create_depth_stencil_view(
    device: &ID3D11Device,
    size: Size,
) -> Result<ID3D11DepthStencilView> {
    let desc = D3D11_TEXTURE2D_DESC {
        Width: size.width,
        Height: size.height,
        MipLevels: 1,
        ArraySize: 1,
        Format: DXGI_FORMAT_D24_UNORM_S8_UINT,
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        Usage: D3D11_USAGE_DEFAULT,
        BindFlags: D3D11_BIND_DEPTH_STENCIL.0 as u32,
        CPUAccessFlags: 0,
        MiscFlags: 0,
    };

    unsafe {
        let mut texture: Option<ID3D11Texture2D> = None;
        device.CreateTexture2D(&desc, None, Some(&mut texture))?;
        let texture = texture.ok_or_else(windows::core::Error::from_win32)?;

        let mut dsv: Option<ID3D11DepthStencilView> = None;
        device.CreateDepthStencilView(&texture, None, Some(&mut dsv))?;
        dsv.ok_or_else(windows::core::Error::from_win32)
    }
}
