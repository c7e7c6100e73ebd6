//! The C boundary between the host and a module library.
//!
//! A module library exports exactly three symbols, all generated by
//! [`define_module!`](crate::define_module):
//!
//! | symbol          | signature                             |
//! |-----------------|---------------------------------------|
//! | `CreateModule`  | `extern "C" fn() -> *mut RawModule`   |
//! | `DestroyModule` | `extern "C" fn(*mut RawModule)`       |
//! | `GetModuleInfo` | `extern "C" fn() -> RawModuleInfo`    |
//!
//! The instance pointer is opaque to C. Behind it sits a boxed Rust trait
//! object, so host and module must be built with the same compiler; the
//! interface revision is guarded by [`RawModuleInfo::minimum_api_version`].

use crate::module::{Module, ModuleInfo};
use crate::types::ModulePriority;
use libc::c_char;
use std::ffi::CStr;
use std::ptr;

pub const CREATE_MODULE_SYMBOL: &str = "CreateModule";
pub const DESTROY_MODULE_SYMBOL: &str = "DestroyModule";
pub const MODULE_INFO_SYMBOL: &str = "GetModuleInfo";

/// Opaque module instance as it crosses the boundary.
#[repr(C)]
pub struct RawModule {
    _private: [u8; 0],
}

pub type CreateModuleFn = unsafe extern "C" fn() -> *mut RawModule;
pub type DestroyModuleFn = unsafe extern "C" fn(*mut RawModule);
pub type ModuleInfoFn = unsafe extern "C" fn() -> RawModuleInfo;

/// Plain-old-data module metadata. Only ever points at static strings.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct RawModuleInfo {
    name: *const c_char,
    version: *const c_char,
    description: *const c_char,
    priority: u32,
    minimum_api_version: u32,
}

impl RawModuleInfo {
    pub const fn new(
        name: &'static CStr,
        version: &'static CStr,
        description: &'static CStr,
        priority: ModulePriority,
        minimum_api_version: u32,
    ) -> Self {
        Self {
            name: name.as_ptr(),
            version: version.as_ptr(),
            description: description.as_ptr(),
            priority: priority.as_raw(),
            minimum_api_version,
        }
    }

    pub fn minimum_api_version(&self) -> u32 {
        self.minimum_api_version
    }

    /// Copies the record into an owned [`ModuleInfo`].
    ///
    /// Returns `None` when the name is missing or the priority is not a known
    /// value. Other missing strings become empty.
    pub fn to_info(&self) -> Option<ModuleInfo> {
        let name = unsafe { string_from_ptr(self.name) }?;
        let version = unsafe { string_from_ptr(self.version) }.unwrap_or_default();
        let description = unsafe { string_from_ptr(self.description) }.unwrap_or_default();
        let priority = ModulePriority::from_raw(self.priority)?;

        Some(ModuleInfo {
            name,
            version,
            description,
            priority,
            minimum_api_version: self.minimum_api_version,
        })
    }
}

unsafe fn string_from_ptr(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
    }
}

/// Moves a module onto the heap and hands out the opaque pointer.
#[doc(hidden)]
pub fn into_raw<M: Module + 'static>(module: M) -> *mut RawModule {
    let boxed: Box<dyn Module> = Box::new(module);
    Box::into_raw(Box::new(boxed)).cast()
}

/// Drops a module previously produced by [`into_raw`]. Null is ignored.
#[doc(hidden)]
pub unsafe fn drop_raw(module: *mut RawModule) {
    if module.is_null() {
        return;
    }
    drop(unsafe { Box::from_raw(module.cast::<Box<dyn Module>>()) });
}

/// Borrows the module behind an opaque pointer.
pub(crate) unsafe fn module_ref<'a>(module: ptr::NonNull<RawModule>) -> &'a dyn Module {
    unsafe { &**module.cast::<Box<dyn Module>>().as_ptr() }
}

pub(crate) unsafe fn module_mut<'a>(module: ptr::NonNull<RawModule>) -> &'a mut dyn Module {
    unsafe { &mut **module.cast::<Box<dyn Module>>().as_ptr() }
}

/// Exports the three module entry points for `$module`.
///
/// ```ignore
/// kiln::define_module!(HelloModule, HelloModule::new(), HELLO_INFO);
/// ```
///
/// Generates a `kiln_exports` module whose `ENTRY_POINTS` lets the same
/// module be driven in-process.
#[macro_export]
macro_rules! define_module {
    ($t:ty, $ctor:expr, $info:expr) => {
        pub mod kiln_exports {
            use super::*;

            #[unsafe(export_name = "CreateModule")]
            pub unsafe extern "C" fn kiln_create_module() -> *mut $crate::abi::RawModule {
                let module: $t = $ctor;
                $crate::abi::into_raw(module)
            }

            #[unsafe(export_name = "DestroyModule")]
            pub unsafe extern "C" fn kiln_destroy_module(module: *mut $crate::abi::RawModule) {
                unsafe { $crate::abi::drop_raw(module) }
            }

            #[unsafe(export_name = "GetModuleInfo")]
            pub unsafe extern "C" fn kiln_module_info() -> $crate::abi::RawModuleInfo {
                $info
            }

            pub const ENTRY_POINTS: $crate::loader::EntryPoints<'static> =
                $crate::loader::EntryPoints::from_static(
                    kiln_create_module,
                    kiln_destroy_module,
                    kiln_module_info,
                );
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO: RawModuleInfo = RawModuleInfo::new(
        c"Test Module",
        c"2.1.0",
        c"",
        ModulePriority::Game,
        1,
    );

    #[test]
    fn raw_info_round_trips_strings() {
        let info = INFO.to_info().unwrap();
        assert_eq!(info.name, "Test Module");
        assert_eq!(info.version, "2.1.0");
        assert_eq!(info.description, "");
        assert_eq!(info.priority, ModulePriority::Game);
    }

    #[test]
    fn raw_info_rejects_unknown_priority() {
        let mut info = INFO;
        info.priority = 42;
        assert!(info.to_info().is_none());
        let mut info = INFO;
        info.name = ptr::null();
        assert!(info.to_info().is_none());
    }
}
