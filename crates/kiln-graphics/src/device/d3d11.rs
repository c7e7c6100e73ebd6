use crate::device::{DeviceDesc, DeviceError, RenderDevice};
use kiln::graphics::{RenderApi, TextureDesc, TextureFormat, TextureUsage};
use kiln::types::Color;
use log::{debug, warn};
use std::ffi::c_void;
use windows::Win32::Foundation::HMODULE;
use windows::Win32::Graphics::Direct3D::{
    D3D_DRIVER_TYPE_HARDWARE, D3D_FEATURE_LEVEL, D3D_FEATURE_LEVEL_11_0,
};
use windows::Win32::Graphics::Direct3D11::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::IDXGIAdapter;

pub struct D3d11Device {
    device: ID3D11Device,
    context: ID3D11DeviceContext,
    feature_level: D3D_FEATURE_LEVEL,
    // default target; there is no swap chain without a window.
    _target: ID3D11Texture2D,
    target_view: ID3D11RenderTargetView,
}

pub struct D3d11Texture {
    pub texture: ID3D11Texture2D,
    pub view: Option<ID3D11ShaderResourceView>,
}

fn dxgi_format(format: TextureFormat) -> DXGI_FORMAT {
    match format {
        TextureFormat::R8UNorm => DXGI_FORMAT_R8_UNORM,
        TextureFormat::Rgba8UNorm => DXGI_FORMAT_R8G8B8A8_UNORM,
        TextureFormat::Rgba16Float => DXGI_FORMAT_R16G16B16A16_FLOAT,
        TextureFormat::Depth32Float => DXGI_FORMAT_D32_FLOAT,
        TextureFormat::Bc1UNorm => DXGI_FORMAT_BC1_UNORM,
        TextureFormat::Bc3UNorm => DXGI_FORMAT_BC3_UNORM,
    }
}

/// Bytes per row of the top mip level, as D3D11 wants it for initial data.
fn row_pitch(format: TextureFormat, width: u32) -> Option<u32> {
    let rows = match format {
        TextureFormat::Bc1UNorm | TextureFormat::Bc3UNorm => 4,
        _ => 1,
    };
    u32::try_from(format.surface_size(width, rows)?).ok()
}

fn too_large() -> DeviceError {
    DeviceError::Unsupported("texture does not fit in memory".to_string())
}

impl D3d11Device {
    pub fn feature_level(&self) -> D3D_FEATURE_LEVEL {
        self.feature_level
    }
}

impl RenderDevice for D3d11Device {
    type Texture = D3d11Texture;

    const RENDER_API: RenderApi = RenderApi::DirectX11;

    fn create(desc: &DeviceDesc) -> Result<Self, DeviceError> {
        let flags = if desc.debug {
            D3D11_CREATE_DEVICE_DEBUG
        } else {
            D3D11_CREATE_DEVICE_FLAG(0)
        };

        let mut device: Option<ID3D11Device> = None;
        let mut context: Option<ID3D11DeviceContext> = None;
        let mut feature_level = D3D_FEATURE_LEVEL::default();
        unsafe {
            D3D11CreateDevice(
                None::<&IDXGIAdapter>,
                D3D_DRIVER_TYPE_HARDWARE,
                HMODULE::default(),
                flags,
                Some(&[D3D_FEATURE_LEVEL_11_0]),
                D3D11_SDK_VERSION,
                Some(&mut device),
                Some(&mut feature_level),
                Some(&mut context),
            )
        }?;

        // Whatever did get created is released on the early return.
        let (Some(device), Some(context)) = (device, context) else {
            return Err(DeviceError::Creation(
                "D3D11CreateDevice returned no device or context".to_string(),
            ));
        };
        debug!("d3d11: created device at feature level {:#x}", feature_level.0);

        let target_desc = D3D11_TEXTURE2D_DESC {
            Width: desc.width.max(1),
            Height: desc.height.max(1),
            MipLevels: 1,
            ArraySize: 1,
            Format: DXGI_FORMAT_R8G8B8A8_UNORM,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            Usage: D3D11_USAGE_DEFAULT,
            BindFlags: D3D11_BIND_RENDER_TARGET.0 as u32,
            CPUAccessFlags: 0,
            MiscFlags: 0,
        };
        let mut target: Option<ID3D11Texture2D> = None;
        unsafe { device.CreateTexture2D(&target_desc, None, Some(&mut target)) }?;
        let target = target.ok_or_else(|| {
            DeviceError::Creation("CreateTexture2D returned no render target".to_string())
        })?;

        let mut target_view: Option<ID3D11RenderTargetView> = None;
        unsafe { device.CreateRenderTargetView(&target, None, Some(&mut target_view)) }?;
        let target_view = target_view.ok_or_else(|| {
            DeviceError::Creation("CreateRenderTargetView returned no view".to_string())
        })?;

        Ok(Self {
            device,
            context,
            feature_level,
            _target: target,
            target_view,
        })
    }

    fn max_texture_size(&self) -> u32 {
        D3D11_REQ_TEXTURE2D_U_OR_V_DIMENSION
    }

    fn supports_format(&self, format: TextureFormat) -> bool {
        match unsafe { self.device.CheckFormatSupport(dxgi_format(format)) } {
            Ok(support) => support & (D3D11_FORMAT_SUPPORT_TEXTURE2D.0 as u32) != 0,
            Err(e) => {
                warn!("d3d11: CheckFormatSupport({:?}) failed: {}", format, e);
                false
            }
        }
    }

    fn create_texture(
        &mut self,
        desc: &TextureDesc<'_>,
        data: Option<&[u8]>,
    ) -> Result<Self::Texture, DeviceError> {
        let is_depth = desc.format == TextureFormat::Depth32Float;
        let mut bind = if is_depth {
            D3D11_BIND_DEPTH_STENCIL.0 as u32
        } else {
            D3D11_BIND_SHADER_RESOURCE.0 as u32
        };
        if desc.usage == TextureUsage::RenderTarget && !is_depth {
            bind |= D3D11_BIND_RENDER_TARGET.0 as u32;
        }

        let (usage, cpu_access) = match desc.usage {
            TextureUsage::Dynamic => (D3D11_USAGE_DYNAMIC, D3D11_CPU_ACCESS_WRITE.0 as u32),
            _ => (D3D11_USAGE_DEFAULT, 0),
        };

        if data.is_some() && desc.mip_levels != 1 {
            return Err(DeviceError::Unsupported(
                "initial data is only supported for single mip textures".to_string(),
            ));
        }
        let initial = match data {
            Some(data) => {
                let expected = desc
                    .format
                    .surface_size(desc.width, desc.height)
                    .ok_or_else(too_large)?;
                if data.len() != expected {
                    return Err(DeviceError::InvalidData {
                        expected,
                        found: data.len(),
                    });
                }
                Some(D3D11_SUBRESOURCE_DATA {
                    pSysMem: data.as_ptr() as *const c_void,
                    SysMemPitch: row_pitch(desc.format, desc.width).ok_or_else(too_large)?,
                    SysMemSlicePitch: 0,
                })
            }
            None => None,
        };

        let texture_desc = D3D11_TEXTURE2D_DESC {
            Width: desc.width,
            Height: desc.height,
            MipLevels: desc.mip_levels,
            ArraySize: 1,
            Format: dxgi_format(desc.format),
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            Usage: usage,
            BindFlags: bind,
            CPUAccessFlags: cpu_access,
            MiscFlags: 0,
        };

        let mut texture: Option<ID3D11Texture2D> = None;
        unsafe {
            self.device.CreateTexture2D(
                &texture_desc,
                initial.as_ref().map(|i| i as *const _),
                Some(&mut texture),
            )
        }?;
        let texture = texture.ok_or_else(|| {
            DeviceError::Creation("CreateTexture2D returned no texture".to_string())
        })?;

        let view = if is_depth {
            None
        } else {
            let mut view: Option<ID3D11ShaderResourceView> = None;
            unsafe {
                self.device
                    .CreateShaderResourceView(&texture, None, Some(&mut view))
            }?;
            view
        };

        Ok(D3d11Texture { texture, view })
    }

    fn clear(&mut self, color: Color) {
        unsafe {
            self.context
                .ClearRenderTargetView(&self.target_view, &color.to_array());
        }
    }

    fn present(&mut self) -> Result<(), DeviceError> {
        unsafe { self.context.Flush() };
        Ok(())
    }
}

impl Drop for D3d11Device {
    fn drop(&mut self) {
        unsafe { self.context.ClearState() };
        debug!("d3d11: releasing device");
    }
}
