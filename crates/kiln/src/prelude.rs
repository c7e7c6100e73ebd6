pub use crate::abi::RawModuleInfo;
pub use crate::define_module;
pub use crate::error::{EngineError, EngineResult};
pub use crate::graphics::{
    Camera, Graphics, MeshDesc, MeshHandle, PrimitiveType, RenderApi, RenderStats, ShaderDesc,
    ShaderHandle, ShaderStage, TextureDesc, TextureFormat, TextureHandle, TextureUsage, Viewport,
};
pub use crate::module::{Application, Capabilities, Module, ModuleInfo, ShutdownHandle};
pub use crate::types::{Color, ModulePriority, Rectangle, Vector2, Vector3, Vector4};
