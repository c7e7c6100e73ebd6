//! The graphics extension interface and the resource model it works with.

use crate::module::Module;
use crate::types::{Color, Rectangle, Vector3};
use std::path::Path;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RenderApi {
    DirectX11,
    DirectX12,
    OpenGl,
    Vulkan,
    Metal,
    /// CPU-side device with no native API behind it.
    Software,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureFormat {
    R8UNorm,
    Rgba8UNorm,
    Rgba16Float,
    Depth32Float,
    /// DXT1
    Bc1UNorm,
    /// DXT5
    Bc3UNorm,
}

impl TextureFormat {
    pub fn is_compressed(self) -> bool {
        matches!(self, TextureFormat::Bc1UNorm | TextureFormat::Bc3UNorm)
    }

    /// Size in bytes of a single mip level, or `None` if it doesn't fit a `usize`.
    pub fn surface_size(self, width: u32, height: u32) -> Option<usize> {
        let (width, height) = (width as usize, height as usize);
        let (blocks_wide, blocks_high, block_bytes) = match self {
            TextureFormat::R8UNorm => (width, height, 1),
            TextureFormat::Rgba8UNorm | TextureFormat::Depth32Float => (width, height, 4),
            TextureFormat::Rgba16Float => (width, height, 8),
            TextureFormat::Bc1UNorm => (width.div_ceil(4), height.div_ceil(4), 8),
            TextureFormat::Bc3UNorm => (width.div_ceil(4), height.div_ceil(4), 16),
        };
        blocks_wide.checked_mul(blocks_high)?.checked_mul(block_bytes)
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum TextureUsage {
    /// Loaded once, rarely changed.
    #[default]
    Static,
    /// Updated frequently.
    Dynamic,
    RenderTarget,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    #[default]
    Vertex,
    Pixel,
    Geometry,
    Compute,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum PrimitiveType {
    #[default]
    Triangles,
    Lines,
    Points,
}

macro_rules! resource_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
        #[repr(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const INVALID: $name = $name(0);

            pub const fn from_raw(id: u64) -> Self {
                $name(id)
            }

            pub const fn id(self) -> u64 {
                self.0
            }

            pub const fn is_valid(self) -> bool {
                self.0 != 0
            }
        }
    };
}

resource_handle!(
    /// Opaque reference to a backend owned texture. Zero is invalid.
    TextureHandle
);
resource_handle!(
    /// Opaque reference to a backend owned shader. Zero is invalid.
    ShaderHandle
);
resource_handle!(
    /// Opaque reference to a backend owned mesh. Zero is invalid.
    MeshHandle
);

#[derive(Debug, Copy, Clone)]
pub struct TextureDesc<'a> {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
    pub mip_levels: u32,
    pub debug_name: Option<&'a str>,
}

impl Default for TextureDesc<'_> {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            format: TextureFormat::Rgba8UNorm,
            usage: TextureUsage::Static,
            mip_levels: 1,
            debug_name: None,
        }
    }
}

impl<'a> TextureDesc<'a> {
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            width,
            height,
            format,
            ..Default::default()
        }
    }

    /// Largest mip chain the dimensions allow.
    pub fn max_mip_levels(&self) -> u32 {
        32 - self.width.max(self.height).max(1).leading_zeros()
    }
}

#[derive(Debug, Copy, Clone)]
pub struct ShaderDesc<'a> {
    pub stage: ShaderStage,
    pub source: &'a str,
    pub entry_point: &'a str,
    pub debug_name: Option<&'a str>,
}

impl<'a> ShaderDesc<'a> {
    pub fn new(stage: ShaderStage, source: &'a str) -> Self {
        Self {
            stage,
            source,
            entry_point: "main",
            debug_name: None,
        }
    }
}

#[derive(Debug, Copy, Clone, Default)]
pub struct MeshDesc<'a> {
    pub primitive_type: PrimitiveType,
    pub vertex_data: &'a [u8],
    pub vertex_count: u32,
    pub vertex_stride: u32,
    pub index_data: &'a [u32],
    pub debug_name: Option<&'a str>,
}

impl MeshDesc<'_> {
    /// Number of primitives the mesh draws, counting indices when present.
    pub fn primitive_count(&self) -> u32 {
        let elements = if self.index_data.is_empty() {
            self.vertex_count
        } else {
            self.index_data.len() as u32
        };
        match self.primitive_type {
            PrimitiveType::Triangles => elements / 3,
            PrimitiveType::Lines => elements / 2,
            PrimitiveType::Points => elements,
        }
    }
}

/// Statistics for the last completed frame.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct RenderStats {
    pub draw_calls: u32,
    pub triangles_drawn: u32,
    pub textures_loaded: u32,
    pub shaders_loaded: u32,
    /// Seconds between `begin_frame` and `end_frame`.
    pub frame_time: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub position: Vector3,
    pub direction: Vector3,
    pub up: Vector3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near_plane: f32,
    pub far_plane: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vector3::ZERO,
            direction: Vector3::Z,
            up: Vector3::Y,
            fov: 60.0,
            near_plane: 0.1,
            far_plane: 1000.0,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Rendering and graphics resource management.
///
/// Create and load operations never fail loudly: they return the invalid
/// handle, and callers are expected to check [`TextureHandle::is_valid`] and
/// friends. Every operation taking a handle is a no-op for invalid, unknown or
/// destroyed handles.
pub trait Graphics: Module {
    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> TextureHandle;

    fn load_texture(&mut self, path: &Path, usage: TextureUsage) -> TextureHandle;

    fn destroy_texture(&mut self, texture: TextureHandle);

    fn create_shader(&mut self, desc: &ShaderDesc<'_>) -> ShaderHandle;

    fn load_shader(&mut self, path: &Path, stage: ShaderStage) -> ShaderHandle;

    fn destroy_shader(&mut self, shader: ShaderHandle);

    fn create_mesh(&mut self, desc: &MeshDesc<'_>) -> MeshHandle;

    fn load_mesh(&mut self, path: &Path) -> MeshHandle;

    fn destroy_mesh(&mut self, mesh: MeshHandle);

    fn begin_frame(&mut self);

    /// Ends the current frame and presents it.
    fn end_frame(&mut self);

    fn clear(&mut self, color: Color);

    /// Applies to every draw submitted afterwards.
    fn set_camera(&mut self, camera: &Camera);

    fn draw_mesh(&mut self, mesh: MeshHandle, position: Vector3, rotation: Vector3, scale: Vector3);

    fn draw_texture(&mut self, texture: TextureHandle, destination: Rectangle);

    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32);

    fn render_api(&self) -> RenderApi;

    fn stats(&self) -> RenderStats;

    fn is_texture_format_supported(&self, format: TextureFormat) -> bool;

    fn max_texture_size(&self) -> u32;

    /// Re-reads file backed shaders. Existing shader handles stay valid.
    fn reload_shaders(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_handles_are_invalid() {
        assert!(!TextureHandle::default().is_valid());
        assert!(!ShaderHandle::default().is_valid());
        assert!(!MeshHandle::default().is_valid());
        assert!(TextureHandle::from_raw(1).is_valid());
        assert_eq!(MeshHandle::INVALID.id(), 0);
    }

    #[test]
    fn mip_chain_length() {
        assert_eq!(TextureDesc::new(1, 1, TextureFormat::R8UNorm).max_mip_levels(), 1);
        assert_eq!(TextureDesc::new(256, 64, TextureFormat::R8UNorm).max_mip_levels(), 9);
        assert_eq!(TextureDesc::new(0, 0, TextureFormat::R8UNorm).max_mip_levels(), 1);
    }

    #[test]
    fn surface_sizes() {
        assert_eq!(TextureFormat::Rgba8UNorm.surface_size(4, 4), Some(64));
        assert_eq!(TextureFormat::Bc1UNorm.surface_size(5, 5), Some(32));
        assert_eq!(TextureFormat::Bc3UNorm.surface_size(4, 4), Some(16));
    }

    #[test]
    fn oversized_surfaces_do_not_wrap() {
        assert_eq!(TextureFormat::Rgba16Float.surface_size(u32::MAX, u32::MAX), None);
        assert_eq!(TextureFormat::Rgba8UNorm.surface_size(u32::MAX, u32::MAX), None);
        assert_eq!(TextureFormat::R8UNorm.surface_size(0, u32::MAX), Some(0));
    }

    #[test]
    fn primitive_counts() {
        let indices = [0, 1, 2, 2, 3, 0];
        let desc = MeshDesc {
            vertex_count: 4,
            index_data: &indices,
            ..Default::default()
        };
        assert_eq!(desc.primitive_count(), 2);
        let lines = MeshDesc {
            primitive_type: PrimitiveType::Lines,
            vertex_count: 6,
            ..Default::default()
        };
        assert_eq!(lines.primitive_count(), 3);
    }
}
