use kiln::graphics::{
    Camera, Graphics, MeshDesc, MeshHandle, PrimitiveType, RenderApi, ShaderDesc, ShaderHandle,
    ShaderStage, TextureDesc, TextureFormat, TextureHandle, TextureUsage,
};
use kiln::types::{Color, Rectangle, Vector3};
use kiln::{Application, EngineError, Module, ModuleInfo, ShutdownHandle};
use kiln_graphics::device::headless::HeadlessDevice;
use kiln_graphics::device::{DeviceDesc, DeviceError, RenderDevice};
use kiln_graphics::frame::DrawCommand;
use kiln_graphics::module::GraphicsModule;
use std::fs;
use std::path::{Path, PathBuf};

struct TestApp {
    data_path: PathBuf,
    shutdown: ShutdownHandle,
}

impl TestApp {
    fn new() -> Self {
        Self {
            data_path: PathBuf::from("data"),
            shutdown: ShutdownHandle::new(),
        }
    }
}

impl Application for TestApp {
    fn module_info(&self, _name: &str) -> Option<ModuleInfo> {
        None
    }

    fn data_path(&self) -> &Path {
        &self.data_path
    }

    fn window_width(&self) -> u32 {
        320
    }

    fn window_height(&self) -> u32 {
        240
    }

    fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    fn log_message(&self, _message: &str) {}
}

fn info() -> ModuleInfo {
    ModuleInfo::builder("Test Graphics", "1.0.0").build()
}

fn initialized() -> GraphicsModule<HeadlessDevice> {
    let mut graphics = GraphicsModule::<HeadlessDevice>::new(info());
    graphics.initialize(&TestApp::new()).unwrap();
    graphics
}

fn rgba(width: u32, height: u32) -> TextureDesc<'static> {
    TextureDesc::new(width, height, TextureFormat::Rgba8UNorm)
}

const TRIANGLE: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

fn triangle_bytes() -> Vec<u8> {
    TRIANGLE.iter().flat_map(|v| v.to_ne_bytes()).collect()
}

#[test]
fn nothing_is_created_before_initialize() {
    let mut graphics = GraphicsModule::<HeadlessDevice>::new(info());
    assert!(!graphics.is_initialized());
    assert_eq!(graphics.create_texture(&rgba(4, 4)), TextureHandle::INVALID);
    assert_eq!(
        graphics.create_shader(&ShaderDesc::new(ShaderStage::Vertex, "void main() {}")),
        ShaderHandle::INVALID
    );
    assert_eq!(graphics.create_mesh(&MeshDesc::default()), MeshHandle::INVALID);
    assert_eq!(graphics.max_texture_size(), 0);
    assert!(!graphics.is_texture_format_supported(TextureFormat::Rgba8UNorm));
}

#[test]
fn initialize_twice_is_rejected() {
    let mut graphics = initialized();
    assert_eq!(
        graphics.initialize(&TestApp::new()),
        Err(EngineError::AlreadyInitialized)
    );
    assert!(graphics.is_initialized());
    assert_eq!(graphics.render_api(), RenderApi::Software);
    assert_eq!(graphics.device().unwrap().desc().width, 320);
}

#[test]
fn shutdown_is_idempotent_and_releases_everything() {
    let mut graphics = initialized();
    let texture = graphics.create_texture(&rgba(8, 8));
    assert!(texture.is_valid());

    graphics.shutdown();
    assert!(!graphics.is_initialized());
    assert_eq!(graphics.stats().textures_loaded, 0);
    assert!(graphics.texture(texture).is_none());

    graphics.shutdown();
    assert!(!graphics.is_initialized());

    // and it can come back up
    graphics.initialize(&TestApp::new()).unwrap();
    assert!(graphics.create_texture(&rgba(8, 8)).is_valid());
}

#[test]
fn destroying_one_texture_leaves_the_others_valid() {
    let mut graphics = initialized();
    let handles: Vec<_> = (0..5).map(|_| graphics.create_texture(&rgba(2, 2))).collect();
    assert!(handles.iter().all(|h| h.is_valid()));
    assert_eq!(graphics.stats().textures_loaded, 5);

    graphics.destroy_texture(handles[0]);
    assert!(graphics.texture(handles[0]).is_none());
    for handle in &handles[1..] {
        assert_eq!(graphics.texture(*handle).unwrap().width, 2);
    }
    assert_eq!(graphics.stats().textures_loaded, 4);

    // stale and invalid handles are ignored
    graphics.destroy_texture(handles[0]);
    graphics.destroy_texture(TextureHandle::INVALID);
    assert_eq!(graphics.stats().textures_loaded, 4);

    let reused = graphics.create_texture(&rgba(2, 2));
    assert_ne!(reused, handles[0]);
    assert!(graphics.texture(handles[0]).is_none());
}

#[test]
fn foreign_texture_ids_never_reach_live_textures() {
    let mut graphics = initialized();
    let live = graphics.create_texture(&rgba(2, 2));
    let forged = TextureHandle::from_raw(live.id() & 0xffff_ffff);
    assert_ne!(forged, live);

    assert!(graphics.texture(forged).is_none());
    graphics.destroy_texture(forged);
    assert!(graphics.texture(live).is_some());
    assert_eq!(graphics.stats().textures_loaded, 1);

    graphics.begin_frame();
    graphics.draw_texture(forged, Rectangle::new(0.0, 0.0, 1.0, 1.0));
    graphics.end_frame();
    assert_eq!(graphics.stats().draw_calls, 0);
}

#[test]
fn invalid_texture_descriptions_are_rejected() {
    let mut graphics = initialized();
    assert!(!graphics.create_texture(&rgba(0, 4)).is_valid());
    assert!(!graphics.create_texture(&rgba(1 << 20, 4)).is_valid());
    assert!(
        !graphics
            .create_texture(&TextureDesc {
                mip_levels: 0,
                ..rgba(4, 4)
            })
            .is_valid()
    );
    assert!(
        !graphics
            .create_texture(&TextureDesc {
                mip_levels: 4,
                ..rgba(4, 4)
            })
            .is_valid()
    );
    assert!(
        !graphics
            .create_texture(&TextureDesc::new(4, 4, TextureFormat::Bc1UNorm))
            .is_valid()
    );
    assert!(
        graphics
            .create_texture(&TextureDesc {
                mip_levels: 3,
                usage: TextureUsage::RenderTarget,
                ..rgba(4, 4)
            })
            .is_valid()
    );
    assert_eq!(graphics.stats().textures_loaded, 1);
}

#[test]
fn load_texture_decodes_to_rgba() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checker.png");
    image::RgbImage::from_fn(3, 2, |x, y| {
        if (x + y) % 2 == 0 {
            image::Rgb([255, 255, 255])
        } else {
            image::Rgb([0, 0, 0])
        }
    })
    .save(&path)
    .unwrap();

    let mut graphics = initialized();
    let handle = graphics.load_texture(&path, TextureUsage::Static);
    assert!(handle.is_valid());

    let texture = graphics.texture(handle).unwrap();
    assert_eq!((texture.width, texture.height), (3, 2));
    assert_eq!(texture.format, TextureFormat::Rgba8UNorm);
    assert_eq!(texture.native.pixels.len(), 3 * 2 * 4);
    assert_eq!(&texture.native.pixels[..4], &[255, 255, 255, 255]);

    assert!(
        !graphics
            .load_texture(&dir.path().join("missing.png"), TextureUsage::Static)
            .is_valid()
    );
}

#[test]
fn shaders_reload_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("solid.hlsl");
    fs::write(&path, "float4 main() : SV_Target { return 1; }").unwrap();

    let mut graphics = initialized();
    let loaded = graphics.load_shader(&path, ShaderStage::Pixel);
    let inline = graphics.create_shader(&ShaderDesc::new(ShaderStage::Vertex, "vs"));
    assert!(loaded.is_valid() && inline.is_valid());
    assert_eq!(graphics.stats().shaders_loaded, 2);

    fs::write(&path, "float4 main() : SV_Target { return 0; }").unwrap();
    graphics.reload_shaders();
    let shader = graphics.shader(loaded).unwrap();
    assert!(shader.source.contains("return 0"));
    assert_eq!(shader.revision, 1);
    assert_eq!(shader.stage, ShaderStage::Pixel);
    assert_eq!(graphics.shader(inline).unwrap().source, "vs");

    // a broken file keeps the last good source
    fs::remove_file(&path).unwrap();
    graphics.reload_shaders();
    assert!(graphics.shader(loaded).unwrap().source.contains("return 0"));
    assert_eq!(graphics.stats().shaders_loaded, 2);
}

#[test]
fn empty_shaders_are_rejected() {
    let mut graphics = initialized();
    assert!(
        !graphics
            .create_shader(&ShaderDesc::new(ShaderStage::Vertex, "  "))
            .is_valid()
    );
    assert!(
        !graphics
            .create_shader(&ShaderDesc {
                entry_point: "",
                ..ShaderDesc::new(ShaderStage::Vertex, "vs")
            })
            .is_valid()
    );
    assert!(
        !graphics
            .load_shader(Path::new("does/not/exist.hlsl"), ShaderStage::Vertex)
            .is_valid()
    );
}

#[test]
fn meshes_validate_their_data() {
    let mut graphics = initialized();
    let vertices = triangle_bytes();

    let good = graphics.create_mesh(&MeshDesc {
        vertex_data: &vertices,
        vertex_count: 3,
        vertex_stride: 12,
        index_data: &[0, 1, 2],
        ..Default::default()
    });
    assert!(good.is_valid());
    assert_eq!(graphics.mesh(good).unwrap().primitives, 1);

    let short = graphics.create_mesh(&MeshDesc {
        vertex_data: &vertices[..24],
        vertex_count: 3,
        vertex_stride: 12,
        ..Default::default()
    });
    assert!(!short.is_valid());

    let out_of_range = graphics.create_mesh(&MeshDesc {
        vertex_data: &vertices,
        vertex_count: 3,
        vertex_stride: 12,
        index_data: &[0, 1, 3],
        ..Default::default()
    });
    assert!(!out_of_range.is_valid());

    let oversized = graphics.create_mesh(&MeshDesc {
        vertex_data: &vertices,
        vertex_count: u32::MAX,
        vertex_stride: u32::MAX,
        ..Default::default()
    });
    assert!(!oversized.is_valid());
}

#[test]
fn load_mesh_reads_obj_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quad.obj");
    fs::write(&path, "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n").unwrap();

    let mut graphics = initialized();
    let mesh = graphics.load_mesh(&path);
    assert!(mesh.is_valid());
    let record = graphics.mesh(mesh).unwrap();
    assert_eq!(record.vertex_count, 4);
    assert_eq!(record.primitive_type, PrimitiveType::Triangles);
    assert_eq!(record.primitives, 2);

    fs::write(&path, "v 0 0 0\nf 1 2 3\n").unwrap();
    assert!(!graphics.load_mesh(&path).is_valid());
}

#[test]
fn frames_record_draws_and_stats() {
    let mut graphics = initialized();
    let texture = graphics.create_texture(&rgba(1, 1));
    let vertices = triangle_bytes();
    let mesh = graphics.create_mesh(&MeshDesc {
        vertex_data: &vertices,
        vertex_count: 3,
        vertex_stride: 12,
        ..Default::default()
    });

    let camera = Camera {
        position: Vector3::new(0.0, 2.0, -5.0),
        ..Camera::default()
    };
    graphics.begin_frame();
    graphics.clear(Color::RED);
    graphics.set_camera(&camera);
    graphics.set_viewport(0, 0, 100, 50);
    graphics.draw_mesh(mesh, Vector3::ZERO, Vector3::ZERO, Vector3::ONE);
    graphics.draw_texture(texture, Rectangle::new(0.0, 0.0, 16.0, 16.0));
    graphics.draw_texture(TextureHandle::from_raw(12345), Rectangle::default());
    graphics.draw_mesh(MeshHandle::INVALID, Vector3::ZERO, Vector3::ZERO, Vector3::ONE);
    graphics.end_frame();

    let stats = graphics.stats();
    assert_eq!(stats.draw_calls, 2);
    assert_eq!(stats.triangles_drawn, 3);
    assert_eq!(stats.textures_loaded, 1);
    assert!(stats.frame_time >= 0.0);

    let device = graphics.device().unwrap();
    assert_eq!(device.clear_color(), Color::RED);
    assert_eq!(device.presents(), 1);

    match graphics.submitted() {
        [DrawCommand::Mesh {
            camera: drawn_with,
            viewport,
            ..
        }, DrawCommand::Texture { texture: drawn, .. }] => {
            assert_eq!(drawn_with.position, camera.position);
            assert_eq!(viewport.width, 100);
            assert_eq!(*drawn, texture);
        }
        other => panic!("unexpected draws: {other:?}"),
    }
}

#[test]
fn update_accumulates_time() {
    let mut graphics = initialized();
    graphics.update(0.25);
    graphics.update(0.5);
    assert!((graphics.elapsed() - 0.75).abs() < f64::EPSILON);
}

struct BrokenDevice;

impl RenderDevice for BrokenDevice {
    type Texture = ();

    const RENDER_API: RenderApi = RenderApi::Software;

    fn create(_desc: &DeviceDesc) -> Result<Self, DeviceError> {
        Err(DeviceError::Creation("no adapter".to_string()))
    }

    fn max_texture_size(&self) -> u32 {
        0
    }

    fn supports_format(&self, _format: TextureFormat) -> bool {
        false
    }

    fn create_texture(
        &mut self,
        _desc: &TextureDesc<'_>,
        _data: Option<&[u8]>,
    ) -> Result<(), DeviceError> {
        Err(DeviceError::Unsupported("broken".to_string()))
    }

    fn clear(&mut self, _color: Color) {}

    fn present(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }
}

#[test]
fn failed_device_creation_leaves_the_module_uninitialized() {
    let mut graphics = GraphicsModule::<BrokenDevice>::new(info());
    assert_eq!(graphics.initialize(&TestApp::new()), Err(EngineError::Failure));
    assert!(!graphics.is_initialized());
    assert!(!graphics.create_texture(&rgba(1, 1)).is_valid());
    graphics.shutdown();
}
