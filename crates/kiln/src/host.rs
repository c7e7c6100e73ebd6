use crate::config::HostSection;
use crate::graphics::{Graphics, TextureDesc, TextureFormat};
use crate::loader::{EntryPoints, LoadError, ModuleLibrary};
use crate::module::{Application, ModuleInfo, ShutdownHandle};
use crate::types::Rectangle;
use crate::version::check_compatibility;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

/// How a host run ended. The discriminant is the process exit code.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum HostExit {
    Clean = 0,
    /// The module could not be loaded, resolved or negotiated.
    LoadFailed = 1,
    /// The module loaded but failed to initialize.
    InitFailed = 2,
}

impl HostExit {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl From<HostExit> for ExitCode {
    fn from(exit: HostExit) -> Self {
        ExitCode::from(exit.code())
    }
}

/// The host state modules see through [`Application`].
#[derive(Debug)]
pub struct HostContext {
    data_path: PathBuf,
    window_width: u32,
    window_height: u32,
    shutdown: ShutdownHandle,
    modules: Vec<ModuleInfo>,
}

impl Application for HostContext {
    fn module_info(&self, name: &str) -> Option<ModuleInfo> {
        self.modules.iter().find(|m| m.name == name).cloned()
    }

    fn data_path(&self) -> &Path {
        &self.data_path
    }

    fn window_width(&self) -> u32 {
        self.window_width
    }

    fn window_height(&self) -> u32 {
        self.window_height
    }

    fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    fn log_message(&self, message: &str) {
        info!(target: "kiln::module", "{}", message);
    }
}

/// Loads one graphics module and drives it frame by frame.
pub struct Host {
    config: HostSection,
    context: HostContext,
    frames: u64,
}

impl Host {
    pub fn new(config: HostSection) -> Self {
        let context = HostContext {
            data_path: config.data_path.clone(),
            window_width: config.window_width,
            window_height: config.window_height,
            shutdown: ShutdownHandle::new(),
            modules: Vec::new(),
        };

        Self {
            config,
            context,
            frames: 0,
        }
    }

    pub fn context(&self) -> &HostContext {
        &self.context
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.context.shutdown_handle()
    }

    /// Frames completed by the last run.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Loads the configured module library and runs it.
    ///
    /// The library is released before this returns, whichever way the run
    /// ended.
    pub fn run(&mut self) -> HostExit {
        let path = ModuleLibrary::resolve(&self.config.module_dir, &self.config.module);
        info!("Loading module {:?}...", path);

        let library = match ModuleLibrary::open(&path) {
            Ok(library) => library,
            Err(e) => {
                error!("kiln: {}", e);
                return HostExit::LoadFailed;
            }
        };

        let exit = match library.entry_points() {
            Ok(entry_points) => self.drive(&entry_points),
            Err(e) => {
                error!("kiln: {}", e);
                HostExit::LoadFailed
            }
        };
        drop(library);
        exit
    }

    /// Runs a module through its whole lifecycle: create, negotiate,
    /// initialize, frame loop, shutdown, destroy.
    ///
    /// Each drive starts running again, even if the previous one was stopped
    /// through the shutdown handle.
    pub fn drive(&mut self, entry_points: &EntryPoints<'_>) -> HostExit {
        self.context.shutdown.reset();
        self.frames = 0;
        match self.try_drive(entry_points) {
            Ok(exit) => exit,
            Err(e) => {
                error!("kiln: {}", e);
                HostExit::LoadFailed
            }
        }
    }

    fn try_drive(&mut self, entry_points: &EntryPoints<'_>) -> Result<HostExit, LoadError> {
        let info = entry_points.info()?;
        check_compatibility(&info, self.config.required_version.as_ref())?;
        info!(
            "Found {} v{}: {}",
            info.name,
            info.version,
            if info.description.is_empty() { "-" } else { info.description.as_str() }
        );

        let mut instance = entry_points.instantiate()?;
        let graphics = instance.graphics()?;

        self.context.modules.push(info.clone());
        let exit = match graphics.initialize(&self.context) {
            Ok(()) => {
                info!("{} initialized.", info.name);
                self.run_frames(graphics);
                HostExit::Clean
            }
            Err(e) => {
                error!("kiln: {} failed to initialize: {}", info.name, e);
                HostExit::InitFailed
            }
        };

        graphics.shutdown();
        self.context.modules.retain(|m| m.name != info.name);
        info!("{} shut down.", info.name);

        Ok(exit)
    }

    fn run_frames(&mut self, graphics: &mut dyn Graphics) {
        let splash = graphics.create_texture(&TextureDesc {
            debug_name: Some("kiln splash"),
            ..TextureDesc::new(1, 1, TextureFormat::Rgba8UNorm)
        });
        if !splash.is_valid() {
            warn!("kiln: couldn't create the splash texture, drawing nothing.");
        }
        let destination = Rectangle::new(10.0, 10.0, 64.0, 64.0);
        graphics.set_viewport(0, 0, self.config.window_width, self.config.window_height);

        self.frames = 0;
        let mut last = Instant::now();
        while self.context.is_running() {
            if self.config.max_frames != 0 && self.frames >= self.config.max_frames {
                debug!("kiln: frame limit of {} reached.", self.config.max_frames);
                break;
            }

            graphics.begin_frame();
            graphics.clear(self.config.clear_color);
            graphics.draw_texture(splash, destination);
            graphics.end_frame();

            let now = Instant::now();
            graphics.update(now.duration_since(last).as_secs_f32());
            last = now;

            self.frames += 1;
        }

        graphics.destroy_texture(splash);
        info!("Ran {} frames.", self.frames);
    }
}
