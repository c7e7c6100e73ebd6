use crate::device::{DeviceDesc, RenderDevice};
use crate::frame::{DrawCommand, FrameState, Transform};
use crate::obj::{OBJ_VERTEX_STRIDE, ObjMesh};
use crate::resources::ResourcePool;
use kiln::graphics::{
    Camera, Graphics, MeshDesc, MeshHandle, PrimitiveType, RenderApi, RenderStats, ShaderDesc,
    ShaderHandle, ShaderStage, TextureDesc, TextureFormat, TextureHandle, TextureUsage, Viewport,
};
use kiln::types::{Color, ModulePriority, Rectangle, Vector3};
use kiln::{Application, Capabilities, EngineError, EngineResult, Module, ModuleInfo};
use log::{debug, error, info, trace, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub struct Texture<T> {
    pub native: T,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
    pub mip_levels: u32,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Shader {
    pub stage: ShaderStage,
    pub source: String,
    pub entry_point: String,
    pub name: Option<String>,
    /// Set for shaders loaded from disk; those are re-read by `reload_shaders`.
    pub path: Option<PathBuf>,
    pub revision: u32,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub primitive_type: PrimitiveType,
    pub vertex_data: Vec<u8>,
    pub vertex_count: u32,
    pub vertex_stride: u32,
    pub indices: Vec<u32>,
    pub primitives: u32,
    pub name: Option<String>,
}

/// The graphics module, generic over the device it drives.
pub struct GraphicsModule<D: RenderDevice> {
    info: ModuleInfo,
    device: Option<D>,
    textures: ResourcePool<TextureHandle, Texture<D::Texture>>,
    shaders: ResourcePool<ShaderHandle, Shader>,
    meshes: ResourcePool<MeshHandle, Mesh>,
    camera: Camera,
    viewport: Viewport,
    frame: FrameState,
    elapsed: f64,
}

impl<D: RenderDevice> GraphicsModule<D> {
    pub fn new(info: ModuleInfo) -> Self {
        Self {
            info,
            device: None,
            textures: ResourcePool::new(),
            shaders: ResourcePool::new(),
            meshes: ResourcePool::new(),
            camera: Camera::default(),
            viewport: Viewport::default(),
            frame: FrameState::default(),
            elapsed: 0.0,
        }
    }

    pub fn device(&self) -> Option<&D> {
        self.device.as_ref()
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture<D::Texture>> {
        self.textures.get(handle)
    }

    pub fn shader(&self, handle: ShaderHandle) -> Option<&Shader> {
        self.shaders.get(handle)
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Draws of the last completed frame, in submission order.
    pub fn submitted(&self) -> &[DrawCommand] {
        self.frame.submitted()
    }

    /// Seconds accumulated through `update`.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    fn create_texture_with_data(
        &mut self,
        desc: &TextureDesc<'_>,
        data: Option<&[u8]>,
    ) -> TextureHandle {
        let Some(device) = self.device.as_mut() else {
            debug!("{}: create_texture called before initialize.", self.info.name);
            return TextureHandle::INVALID;
        };
        let label = desc.debug_name.unwrap_or("<unnamed>");

        let max = device.max_texture_size();
        if desc.width == 0 || desc.height == 0 || desc.width > max || desc.height > max {
            warn!(
                "{}: texture {} has invalid size {}x{} (max {}).",
                self.info.name, label, desc.width, desc.height, max
            );
            return TextureHandle::INVALID;
        }
        if desc.mip_levels == 0 || desc.mip_levels > desc.max_mip_levels() {
            warn!(
                "{}: texture {} has invalid mip count {}.",
                self.info.name, label, desc.mip_levels
            );
            return TextureHandle::INVALID;
        }
        if !device.supports_format(desc.format) {
            warn!(
                "{}: texture {} uses unsupported format {:?}.",
                self.info.name, label, desc.format
            );
            return TextureHandle::INVALID;
        }

        match device.create_texture(desc, data) {
            Ok(native) => {
                let handle = self.textures.insert(Texture {
                    native,
                    width: desc.width,
                    height: desc.height,
                    format: desc.format,
                    usage: desc.usage,
                    mip_levels: desc.mip_levels,
                    name: desc.debug_name.map(str::to_string),
                });
                trace!("{}: created texture {} as {:?}", self.info.name, label, handle);
                handle
            }
            Err(e) => {
                error!("{}: failed to create texture {}: {}", self.info.name, label, e);
                TextureHandle::INVALID
            }
        }
    }

    fn read_file(&self, path: &Path) -> Result<String, EngineError> {
        fs::read_to_string(path).map_err(|e| {
            warn!("{}: couldn't read {:?}: {}", self.info.name, path, e);
            if e.kind() == std::io::ErrorKind::NotFound {
                EngineError::FileNotFound
            } else {
                EngineError::Failure
            }
        })
    }
}

impl<D: RenderDevice> Module for GraphicsModule<D> {
    fn initialize(&mut self, app: &dyn Application) -> EngineResult {
        if self.device.is_some() {
            return Err(EngineError::AlreadyInitialized);
        }

        let desc = DeviceDesc {
            width: app.window_width(),
            height: app.window_height(),
            ..DeviceDesc::default()
        };
        // On failure the device type has already released whatever it made.
        let device = D::create(&desc).map_err(|e| {
            error!("{}: {}", self.info.name, e);
            EngineError::Failure
        })?;

        self.viewport = Viewport {
            x: 0,
            y: 0,
            width: desc.width,
            height: desc.height,
        };
        self.device = Some(device);
        app.log_message(&format!("{} v{} ready", self.info.name, self.info.version));
        Ok(())
    }

    fn update(&mut self, delta_time: f32) {
        self.elapsed += f64::from(delta_time);
    }

    fn shutdown(&mut self) {
        if self.device.is_none() {
            return;
        }

        info!(
            "{}: releasing {} textures, {} shaders, {} meshes.",
            self.info.name,
            self.textures.len(),
            self.shaders.len(),
            self.meshes.len()
        );
        // resources first, they may reference the device
        self.textures.clear();
        self.shaders.clear();
        self.meshes.clear();
        self.frame.reset();
        self.camera = Camera::default();
        self.viewport = Viewport::default();
        self.device = None;
    }

    fn name(&self) -> &str {
        &self.info.name
    }

    fn version(&self) -> &str {
        &self.info.version
    }

    fn priority(&self) -> ModulePriority {
        self.info.priority
    }

    fn is_initialized(&self) -> bool {
        self.device.is_some()
    }

    fn module_info(&self) -> ModuleInfo {
        self.info.clone()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::GRAPHICS
    }

    fn as_graphics(&mut self) -> Option<&mut dyn Graphics> {
        Some(self)
    }
}

impl<D: RenderDevice> Graphics for GraphicsModule<D> {
    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> TextureHandle {
        self.create_texture_with_data(desc, None)
    }

    fn load_texture(&mut self, path: &Path, usage: TextureUsage) -> TextureHandle {
        if self.device.is_none() {
            return TextureHandle::INVALID;
        }

        let image = match image::open(path) {
            Ok(image) => image.to_rgba8(),
            Err(e) => {
                warn!("{}: couldn't load texture {:?}: {}", self.info.name, path, e);
                return TextureHandle::INVALID;
            }
        };

        let name = path.to_string_lossy();
        let desc = TextureDesc {
            width: image.width(),
            height: image.height(),
            format: TextureFormat::Rgba8UNorm,
            usage,
            mip_levels: 1,
            debug_name: Some(&*name),
        };
        self.create_texture_with_data(&desc, Some(image.as_raw().as_slice()))
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        if self.textures.remove(texture).is_none() && texture.is_valid() {
            debug!("{}: destroy of unknown texture {:?}", self.info.name, texture);
        }
    }

    fn create_shader(&mut self, desc: &ShaderDesc<'_>) -> ShaderHandle {
        if self.device.is_none() {
            return ShaderHandle::INVALID;
        }
        if desc.source.trim().is_empty() || desc.entry_point.is_empty() {
            warn!(
                "{}: shader {} has no source or entry point.",
                self.info.name,
                desc.debug_name.unwrap_or("<unnamed>")
            );
            return ShaderHandle::INVALID;
        }

        self.shaders.insert(Shader {
            stage: desc.stage,
            source: desc.source.to_string(),
            entry_point: desc.entry_point.to_string(),
            name: desc.debug_name.map(str::to_string),
            path: None,
            revision: 0,
        })
    }

    fn load_shader(&mut self, path: &Path, stage: ShaderStage) -> ShaderHandle {
        if self.device.is_none() {
            return ShaderHandle::INVALID;
        }
        let Ok(source) = self.read_file(path) else {
            return ShaderHandle::INVALID;
        };

        let name = path.to_string_lossy();
        let handle = self.create_shader(&ShaderDesc {
            debug_name: Some(&*name),
            ..ShaderDesc::new(stage, &source)
        });
        if let Some(shader) = self.shaders.get_mut(handle) {
            shader.path = Some(path.to_path_buf());
        }
        handle
    }

    fn destroy_shader(&mut self, shader: ShaderHandle) {
        if self.shaders.remove(shader).is_none() && shader.is_valid() {
            debug!("{}: destroy of unknown shader {:?}", self.info.name, shader);
        }
    }

    fn create_mesh(&mut self, desc: &MeshDesc<'_>) -> MeshHandle {
        if self.device.is_none() {
            return MeshHandle::INVALID;
        }
        let label = desc.debug_name.unwrap_or("<unnamed>");

        let expected = (desc.vertex_count as usize).checked_mul(desc.vertex_stride as usize);
        if desc.vertex_count == 0
            || desc.vertex_stride == 0
            || expected != Some(desc.vertex_data.len())
        {
            warn!(
                "{}: mesh {} has {} bytes of vertex data for {} vertices of {} bytes.",
                self.info.name,
                label,
                desc.vertex_data.len(),
                desc.vertex_count,
                desc.vertex_stride
            );
            return MeshHandle::INVALID;
        }
        if let Some(index) = desc.index_data.iter().find(|&&i| i >= desc.vertex_count) {
            warn!(
                "{}: mesh {} indexes vertex {} of {}.",
                self.info.name, label, index, desc.vertex_count
            );
            return MeshHandle::INVALID;
        }

        self.meshes.insert(Mesh {
            primitive_type: desc.primitive_type,
            vertex_data: desc.vertex_data.to_vec(),
            vertex_count: desc.vertex_count,
            vertex_stride: desc.vertex_stride,
            indices: desc.index_data.to_vec(),
            primitives: desc.primitive_count(),
            name: desc.debug_name.map(str::to_string),
        })
    }

    fn load_mesh(&mut self, path: &Path) -> MeshHandle {
        if self.device.is_none() {
            return MeshHandle::INVALID;
        }

        let obj = match ObjMesh::load(path) {
            Ok(obj) => obj,
            Err(e) => {
                warn!("{}: couldn't load mesh {:?}: {}", self.info.name, path, e);
                return MeshHandle::INVALID;
            }
        };

        let vertices = obj.vertex_bytes();
        let name = path.to_string_lossy();
        self.create_mesh(&MeshDesc {
            primitive_type: PrimitiveType::Triangles,
            vertex_data: &vertices,
            vertex_count: obj.positions.len() as u32,
            vertex_stride: OBJ_VERTEX_STRIDE,
            index_data: &obj.indices,
            debug_name: Some(&*name),
        })
    }

    fn destroy_mesh(&mut self, mesh: MeshHandle) {
        if self.meshes.remove(mesh).is_none() && mesh.is_valid() {
            debug!("{}: destroy of unknown mesh {:?}", self.info.name, mesh);
        }
    }

    fn begin_frame(&mut self) {
        if self.frame.in_frame() {
            warn!("{}: begin_frame called twice, restarting the frame.", self.info.name);
        }
        self.frame.begin();
    }

    fn end_frame(&mut self) {
        let Some(device) = self.device.as_mut() else {
            return;
        };

        self.frame.end();
        if let Err(e) = device.present() {
            error!("{}: present failed: {}", self.info.name, e);
        }
    }

    fn clear(&mut self, color: Color) {
        if let Some(device) = self.device.as_mut() {
            device.clear(color);
        }
    }

    fn set_camera(&mut self, camera: &Camera) {
        self.camera = *camera;
    }

    fn draw_mesh(&mut self, mesh: MeshHandle, position: Vector3, rotation: Vector3, scale: Vector3) {
        let Some(record) = self.meshes.get(mesh) else {
            trace!("{}: skipping draw of unknown mesh {:?}", self.info.name, mesh);
            return;
        };

        let triangles = match record.primitive_type {
            PrimitiveType::Triangles => record.primitives,
            _ => 0,
        };
        self.frame.push(
            DrawCommand::Mesh {
                mesh,
                transform: Transform {
                    position,
                    rotation,
                    scale,
                },
                camera: self.camera,
                viewport: self.viewport,
            },
            triangles,
        );
    }

    fn draw_texture(&mut self, texture: TextureHandle, destination: Rectangle) {
        if !self.textures.contains(texture) {
            trace!("{}: skipping draw of unknown texture {:?}", self.info.name, texture);
            return;
        }

        // a textured quad
        self.frame.push(
            DrawCommand::Texture {
                texture,
                destination,
                viewport: self.viewport,
            },
            2,
        );
    }

    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.viewport = Viewport {
            x,
            y,
            width,
            height,
        };
    }

    fn render_api(&self) -> RenderApi {
        D::RENDER_API
    }

    fn stats(&self) -> RenderStats {
        RenderStats {
            textures_loaded: self.textures.len() as u32,
            shaders_loaded: self.shaders.len() as u32,
            ..self.frame.last_stats()
        }
    }

    fn is_texture_format_supported(&self, format: TextureFormat) -> bool {
        self.device
            .as_ref()
            .is_some_and(|device| device.supports_format(format))
    }

    fn max_texture_size(&self) -> u32 {
        self.device
            .as_ref()
            .map(RenderDevice::max_texture_size)
            .unwrap_or(0)
    }

    fn reload_shaders(&mut self) {
        let module = self.info.name.clone();
        let mut reloaded = 0;
        for shader in self.shaders.values_mut() {
            let Some(path) = &shader.path else {
                continue;
            };
            match fs::read_to_string(path) {
                Ok(source) if source.trim().is_empty() => {
                    warn!("{}: {:?} is empty, keeping the previous source.", module, path);
                }
                Ok(source) => {
                    if source != shader.source {
                        shader.source = source;
                        shader.revision += 1;
                        reloaded += 1;
                    }
                }
                Err(e) => {
                    warn!("{}: couldn't reload {:?}: {}", module, path, e);
                }
            }
        }
        info!("{}: reloaded {} shaders.", module, reloaded);
    }
}

impl<D: RenderDevice> Drop for GraphicsModule<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
