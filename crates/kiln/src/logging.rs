use crate::config::LoggingSection;
use once_cell::sync::OnceCell;
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::{self, File};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogInitError {
    #[error("failed to create log file {path:?}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Logger(#[from] log::SetLoggerError),
}

/// Installs the console and file loggers described by `section`.
///
/// Only the first call in a process does anything; later calls return `Ok`.
pub fn init_logging(section: &LoggingSection) -> Result<(), LogInitError> {
    static INSTALLED: OnceCell<()> = OnceCell::new();
    INSTALLED
        .get_or_try_init(|| install(section))
        .map(|_| ())
}

fn install(section: &LoggingSection) -> Result<(), LogInitError> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if section.show_console {
        loggers.push(TermLogger::new(
            section.console_level.to_log(),
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }

    if !section.file_path.is_empty() {
        let file_error = |source| LogInitError::File {
            path: section.file_path.clone(),
            source,
        };
        if let Some(parent) = Path::new(&section.file_path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).map_err(file_error)?;
        }
        loggers.push(WriteLogger::new(
            section.file_level.to_log(),
            Config::default(),
            File::create(&section.file_path).map_err(file_error)?,
        ));
    }

    CombinedLogger::init(loggers)?;
    Ok(())
}
