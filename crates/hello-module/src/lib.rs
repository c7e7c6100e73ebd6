use kiln::abi::RawModuleInfo;
use kiln::types::ModulePriority;
use kiln::{Application, EngineError, EngineResult, Module, ModuleInfo, define_module, info};

/// Says hello and nothing else. A host asking it for graphics gets refused.
pub struct HelloModule {
    initialized: bool,
}

impl HelloModule {
    pub fn new() -> Self {
        HelloModule { initialized: false }
    }
}

impl Default for HelloModule {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for HelloModule {
    fn initialize(&mut self, app: &dyn Application) -> EngineResult {
        if self.initialized {
            return Err(EngineError::AlreadyInitialized);
        }
        app.log_message("Hello Kiln!");
        self.initialized = true;
        Ok(())
    }

    fn update(&mut self, _delta_time: f32) {}

    fn shutdown(&mut self) {
        if std::mem::take(&mut self.initialized) {
            info!("Goodbye Kiln!");
        }
    }

    fn name(&self) -> &str {
        "Hello"
    }

    fn version(&self) -> &str {
        "0.1.0"
    }

    fn priority(&self) -> ModulePriority {
        ModulePriority::Game
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn module_info(&self) -> ModuleInfo {
        ModuleInfo::builder(self.name(), self.version())
            .description("Says hello")
            .priority(self.priority())
            .build()
    }
}

pub const HELLO_INFO: RawModuleInfo = RawModuleInfo::new(
    c"Hello",
    c"0.1.0",
    c"Says hello",
    ModulePriority::Game,
    kiln::API_VERSION,
);

define_module!(HelloModule, HelloModule::new(), HELLO_INFO);
