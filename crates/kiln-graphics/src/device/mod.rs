//! Native device seam. Everything API specific lives behind [`RenderDevice`].

use kiln::graphics::{RenderApi, TextureDesc, TextureFormat};
use kiln::types::Color;
use thiserror::Error;

#[cfg(windows)]
pub mod d3d11;
pub mod headless;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("device creation failed: {0}")]
    Creation(String),

    #[error("texture data is {found} bytes, expected {expected}")]
    InvalidData { expected: usize, found: usize },

    #[error("{0}")]
    Unsupported(String),

    #[cfg(windows)]
    #[error(transparent)]
    Windows(#[from] windows::core::Error),
}

/// Parameters for device creation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DeviceDesc {
    /// Size of the default render target.
    pub width: u32,
    pub height: u32,
    /// Enables the native API's debug layer when available.
    pub debug: bool,
}

impl Default for DeviceDesc {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            debug: cfg!(debug_assertions),
        }
    }
}

/// A native rendering device and its immediate context.
///
/// Dropping a device releases every native object it owns, which is also how
/// a half-created device gets rolled back.
pub trait RenderDevice: Sized {
    type Texture;

    const RENDER_API: RenderApi;

    fn create(desc: &DeviceDesc) -> Result<Self, DeviceError>;

    fn render_api(&self) -> RenderApi {
        Self::RENDER_API
    }

    fn max_texture_size(&self) -> u32;

    fn supports_format(&self, format: TextureFormat) -> bool;

    /// `data`, when present, holds the top mip level.
    fn create_texture(
        &mut self,
        desc: &TextureDesc<'_>,
        data: Option<&[u8]>,
    ) -> Result<Self::Texture, DeviceError>;

    fn clear(&mut self, color: Color);

    fn present(&mut self) -> Result<(), DeviceError>;
}

/// The device the exported module runs on.
#[cfg(windows)]
pub type NativeDevice = d3d11::D3d11Device;
#[cfg(not(windows))]
pub type NativeDevice = headless::HeadlessDevice;
