//! The graphics module library.
//!
//! Built as a `cdylib` it exports the three module entry points for the host
//! to load. On Windows it renders through Direct3D 11; everywhere else it runs
//! on [`HeadlessDevice`](device::headless::HeadlessDevice).

pub mod device;
pub mod frame;
pub mod module;
pub mod obj;
pub mod resources;

use device::NativeDevice;
use kiln::abi::RawModuleInfo;
use kiln::types::ModulePriority;
use kiln::{API_VERSION, ModuleInfo};
use module::GraphicsModule;
use std::ffi::CStr;

#[cfg(windows)]
const NAME: &CStr = c"DirectX11 Graphics";
#[cfg(windows)]
const DESCRIPTION: &CStr = c"DirectX 11 rendering implementation";

#[cfg(not(windows))]
const NAME: &CStr = c"Headless Graphics";
#[cfg(not(windows))]
const DESCRIPTION: &CStr = c"Headless software rendering implementation";

const VERSION: &CStr = c"1.0.0";

pub const MODULE_INFO: RawModuleInfo = RawModuleInfo::new(
    NAME,
    VERSION,
    DESCRIPTION,
    ModulePriority::System,
    API_VERSION,
);

pub fn graphics_module_info() -> ModuleInfo {
    ModuleInfo::builder(&NAME.to_string_lossy(), &VERSION.to_string_lossy())
        .description(&DESCRIPTION.to_string_lossy())
        .priority(ModulePriority::System)
        .minimum_api_version(API_VERSION)
        .build()
}

/// The module type this library exports.
pub type NativeGraphicsModule = GraphicsModule<NativeDevice>;

kiln::define_module!(
    NativeGraphicsModule,
    GraphicsModule::new(graphics_module_info()),
    MODULE_INFO
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exported_info_matches_the_instance() {
        let exported = MODULE_INFO.to_info().unwrap();
        assert_eq!(exported, graphics_module_info());
        assert_eq!(exported.version, "1.0.0");
        assert_eq!(exported.priority, ModulePriority::System);
        assert_eq!(exported.minimum_api_version, 1);
    }
}
