use crate::abi::{
    self, CREATE_MODULE_SYMBOL, CreateModuleFn, DESTROY_MODULE_SYMBOL, DestroyModuleFn,
    MODULE_INFO_SYMBOL, ModuleInfoFn, RawModule, RawModuleInfo,
};
use crate::graphics::Graphics;
use crate::module::{Capabilities, Module, ModuleInfo};
use libloading::Library;
use log::{debug, trace};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load {path:?}: {source}")]
    Library {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("{path:?} does not export `{symbol}`")]
    Symbol {
        path: PathBuf,
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    #[error("module metadata is malformed")]
    InvalidInfo,

    #[error("module `{name}` requires host API version {required}, but this host provides {provided}")]
    ApiVersion {
        name: String,
        required: u32,
        provided: u32,
    },

    #[error("module `{name}` v{found} does not satisfy the required version {required}")]
    VersionMismatch {
        name: String,
        found: String,
        required: semver::VersionReq,
    },

    #[error("module factory returned a null instance")]
    NullInstance,

    #[error("module `{name}` does not implement the {interface} interface")]
    TypeMismatch {
        name: String,
        interface: &'static str,
    },
}

/// A module library, unloaded when dropped.
///
/// Anything resolved from the library borrows it, so nothing it produced can
/// outlive it.
pub struct ModuleLibrary {
    path: PathBuf,
    library: Library,
}

impl ModuleLibrary {
    /// Resolves a module name against a directory.
    ///
    /// A bare name such as `kiln_graphics` gets the platform prefix and suffix
    /// (`libkiln_graphics.so`, `kiln_graphics.dll`). Names that already carry
    /// an extension are used as-is.
    pub fn resolve(dir: &Path, name: &str) -> PathBuf {
        if Path::new(name).extension().is_some() {
            dir.join(name)
        } else {
            dir.join(libloading::library_filename(name))
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref().to_path_buf();
        debug!("kiln: opening module library {:?}", path);
        // SAFETY: module libraries run no initialisers that depend on host state.
        let library = unsafe { Library::new(&path) }.map_err(|source| LoadError::Library {
            path: path.clone(),
            source,
        })?;

        Ok(Self { path, library })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves all three entry points.
    ///
    /// `CreateModule` is resolved first and `DestroyModule` only once it was
    /// found, so a library missing either never gets to construct anything.
    pub fn entry_points(&self) -> Result<EntryPoints<'_>, LoadError> {
        let create = self.symbol::<CreateModuleFn>(CREATE_MODULE_SYMBOL)?;
        let destroy = self.symbol::<DestroyModuleFn>(DESTROY_MODULE_SYMBOL)?;
        let info = self.symbol::<ModuleInfoFn>(MODULE_INFO_SYMBOL)?;

        Ok(EntryPoints {
            create,
            destroy,
            info,
            _library: PhantomData,
        })
    }

    fn symbol<T: Copy>(&self, symbol: &'static str) -> Result<T, LoadError> {
        trace!("kiln: resolving `{}` in {:?}", symbol, self.path);
        // SAFETY: `T` is one of the entry point signatures declared in `abi`.
        unsafe { self.library.get::<T>(symbol.as_bytes()) }
            .map(|resolved| *resolved)
            .map_err(|source| LoadError::Symbol {
                path: self.path.clone(),
                symbol,
                source,
            })
    }
}

impl Drop for ModuleLibrary {
    fn drop(&mut self) {
        debug!("kiln: unloading {:?}", self.path);
    }
}

/// The three resolved entry points of a module.
#[derive(Copy, Clone)]
pub struct EntryPoints<'lib> {
    create: CreateModuleFn,
    destroy: DestroyModuleFn,
    info: ModuleInfoFn,
    _library: PhantomData<&'lib ModuleLibrary>,
}

impl EntryPoints<'static> {
    /// Entry points of a module linked into the current binary.
    pub const fn from_static(
        create: CreateModuleFn,
        destroy: DestroyModuleFn,
        info: ModuleInfoFn,
    ) -> Self {
        Self {
            create,
            destroy,
            info,
            _library: PhantomData,
        }
    }
}

impl<'lib> EntryPoints<'lib> {
    pub fn raw_info(&self) -> RawModuleInfo {
        unsafe { (self.info)() }
    }

    pub fn info(&self) -> Result<ModuleInfo, LoadError> {
        self.raw_info().to_info().ok_or(LoadError::InvalidInfo)
    }

    /// Constructs a new instance. It is destroyed through the paired
    /// `DestroyModule` when the returned value drops.
    pub fn instantiate(&self) -> Result<ModuleInstance<'lib>, LoadError> {
        let raw = NonNull::new(unsafe { (self.create)() }).ok_or(LoadError::NullInstance)?;

        Ok(ModuleInstance {
            raw,
            destroy: self.destroy,
            _library: PhantomData,
        })
    }
}

/// An owned module instance created through `CreateModule`.
pub struct ModuleInstance<'lib> {
    raw: NonNull<RawModule>,
    destroy: DestroyModuleFn,
    _library: PhantomData<&'lib ModuleLibrary>,
}

impl ModuleInstance<'_> {
    pub fn module(&self) -> &dyn Module {
        unsafe { abi::module_ref(self.raw) }
    }

    pub fn module_mut(&mut self) -> &mut dyn Module {
        unsafe { abi::module_mut(self.raw) }
    }

    /// Negotiates the graphics interface.
    pub fn graphics(&mut self) -> Result<&mut dyn Graphics, LoadError> {
        let module = self.module_mut();
        let name = module.name().to_string();
        if !module.capabilities().contains(Capabilities::GRAPHICS) {
            return Err(LoadError::TypeMismatch {
                name,
                interface: "Graphics",
            });
        }

        module.as_graphics().ok_or(LoadError::TypeMismatch {
            name,
            interface: "Graphics",
        })
    }
}

impl Drop for ModuleInstance<'_> {
    fn drop(&mut self) {
        trace!("kiln: destroying module instance {:p}", self.raw);
        unsafe { (self.destroy)(self.raw.as_ptr()) };
    }
}
