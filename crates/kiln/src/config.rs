use crate::types::Color;
pub use semver::VersionReq;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "kiln/kiln.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Used to determine the config version before fully deserializing.
#[derive(Debug, Deserialize)]
pub struct HostConfigVersionOnly {
    #[serde(default)]
    pub config_version: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// DO NOT EDIT - Used to identify which version of the config is used.
    #[serde(default)]
    pub config_version: u32,

    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub host: HostSection,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(usize)]
pub enum LogLevelConfig {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelConfig {
    pub fn from_log(level: log::LevelFilter) -> LogLevelConfig {
        match level {
            log::LevelFilter::Off => LogLevelConfig::Off,
            log::LevelFilter::Error => LogLevelConfig::Error,
            log::LevelFilter::Warn => LogLevelConfig::Warn,
            log::LevelFilter::Info => LogLevelConfig::Info,
            log::LevelFilter::Debug => LogLevelConfig::Debug,
            log::LevelFilter::Trace => LogLevelConfig::Trace,
        }
    }

    pub fn to_log(&self) -> log::LevelFilter {
        match self {
            LogLevelConfig::Off => log::LevelFilter::Off,
            LogLevelConfig::Error => log::LevelFilter::Error,
            LogLevelConfig::Warn => log::LevelFilter::Warn,
            LogLevelConfig::Info => log::LevelFilter::Info,
            LogLevelConfig::Debug => log::LevelFilter::Debug,
            LogLevelConfig::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub show_console: bool,
    pub console_level: LogLevelConfig,

    pub file_level: LogLevelConfig,
    /// Empty disables the log file.
    pub file_path: String,
}

impl Default for LoggingSection {
    fn default() -> LoggingSection {
        LoggingSection {
            show_console: true,
            console_level: LogLevelConfig::Info,
            file_level: LogLevelConfig::Info,
            file_path: "kiln/kiln.log".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSection {
    /// Module library to load, either a bare name or a file name.
    pub module: String,
    /// Directory the module library is looked up in.
    pub module_dir: PathBuf,
    pub data_path: PathBuf,
    pub window_width: u32,
    pub window_height: u32,
    /// Stop after this many frames. `0` runs until shutdown is requested.
    pub max_frames: u64,
    pub clear_color: Color,
    /// Reject modules whose version doesn't match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_version: Option<VersionReq>,
}

impl Default for HostSection {
    fn default() -> Self {
        HostSection {
            module: "kiln_graphics".to_string(),
            module_dir: PathBuf::from("."),
            data_path: PathBuf::from("data"),
            window_width: 1280,
            window_height: 720,
            max_frames: 600,
            clear_color: Color::new(0.1, 0.2, 0.3, 1.0),
            required_version: None,
        }
    }
}

impl HostConfig {
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Loads the host config, writing the defaults out first when the file is
/// missing.
pub fn load_config(path: &Path) -> Result<HostConfig, ConfigError> {
    let io_error = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if path.exists() {
        let text = fs::read_to_string(path).map_err(io_error)?;
        let version: HostConfigVersionOnly =
            toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if version.config_version != 0 {
            log::warn!(
                "kiln: unknown config version {}, reading it as version 0.",
                version.config_version
            );
        }

        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    } else {
        let config = HostConfig::default();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(path, config.to_toml()?).map_err(io_error)?;
        Ok(config)
    }
}
