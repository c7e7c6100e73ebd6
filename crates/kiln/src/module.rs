use crate::error::EngineResult;
use crate::graphics::Graphics;
use crate::types::ModulePriority;
use bitflags::bitflags;
use semver::Version;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Metadata describing a module, as read by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// The module's display name. Also used for cross-module lookup.
    pub name: String,

    /// The module's version. Expected to be SemVer compliant.
    pub version: String,

    pub description: String,

    pub priority: ModulePriority,

    /// The lowest host API version the module can run against.
    pub minimum_api_version: u32,
}

impl ModuleInfo {
    pub fn builder(name: &str, version: &str) -> ModuleInfoBuilder {
        ModuleInfoBuilder::new(name, version)
    }

    /// Parses [`ModuleInfo::version`] as a SemVer version.
    pub fn semver(&self) -> Result<Version, semver::Error> {
        Version::parse(&self.version)
    }
}

pub struct ModuleInfoBuilder {
    name: String,
    version: String,
    description: String,
    priority: ModulePriority,
    minimum_api_version: u32,
}

impl ModuleInfoBuilder {
    fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            description: String::new(),
            priority: ModulePriority::Engine,
            minimum_api_version: crate::version::API_VERSION,
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn priority(mut self, priority: ModulePriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn minimum_api_version(mut self, version: u32) -> Self {
        self.minimum_api_version = version;
        self
    }

    pub fn build(self) -> ModuleInfo {
        ModuleInfo {
            name: self.name,
            version: self.version,
            description: self.description,
            priority: self.priority,
            minimum_api_version: self.minimum_api_version,
        }
    }
}

bitflags! {
    /// Extension interfaces a module can be queried for.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct Capabilities: u32 {
        const GRAPHICS = 1 << 0;
    }
}

/// Base contract every loadable module satisfies.
///
/// Extension interfaces are negotiated rather than downcast: a module
/// advertises them through [`Module::capabilities`] and hands them out through
/// the matching `as_*` accessor.
pub trait Module {
    /// Called once after the module is loaded.
    ///
    /// Must fail with [`EngineError::AlreadyInitialized`](crate::EngineError::AlreadyInitialized)
    /// when the module is already running. On any other failure the module
    /// must be left uninitialized with nothing allocated.
    fn initialize(&mut self, app: &dyn Application) -> EngineResult;

    /// Called every frame. `delta_time` is in seconds.
    fn update(&mut self, delta_time: f32);

    /// Releases everything created since [`Module::initialize`].
    /// A no-op when the module isn't initialized.
    fn shutdown(&mut self);

    fn name(&self) -> &str;

    fn version(&self) -> &str;

    fn priority(&self) -> ModulePriority;

    fn is_initialized(&self) -> bool;

    fn module_info(&self) -> ModuleInfo;

    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    fn as_graphics(&mut self) -> Option<&mut dyn Graphics> {
        None
    }
}

/// Shared run-state flag. Cleared once shutdown is requested.
#[derive(Debug, Clone)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn new() -> Self {
        ShutdownHandle(Arc::new(AtomicBool::new(true)))
    }

    pub fn request_shutdown(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Sets the flag back to running, for every clone.
    pub fn reset(&self) {
        self.0.store(true, Ordering::Release);
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// The host as seen from inside a module.
pub trait Application {
    /// Looks up another loaded module by name.
    fn module_info(&self, name: &str) -> Option<ModuleInfo>;

    fn has_module(&self, name: &str) -> bool {
        self.module_info(name).is_some()
    }

    /// Root directory for game data.
    fn data_path(&self) -> &Path;

    fn window_width(&self) -> u32;

    fn window_height(&self) -> u32;

    fn shutdown_handle(&self) -> ShutdownHandle;

    fn is_running(&self) -> bool {
        self.shutdown_handle().is_running()
    }

    fn request_shutdown(&self) {
        self.shutdown_handle().request_shutdown();
    }

    fn log_message(&self, message: &str);
}
