//! Kiln loads engine modules from shared libraries and drives them.
//!
//! A module is a shared library exporting the three entry points described in
//! [`abi`], usually generated with [`define_module!`]. The host resolves them
//! through [`loader::ModuleLibrary`], negotiates the interfaces it needs and
//! runs the module's lifecycle with [`host::Host`].

#![allow(clippy::missing_safety_doc)]

pub mod abi;
pub mod config;
pub mod error;
pub mod graphics;
pub mod host;
pub mod loader;
pub mod logging;
pub mod module;
pub mod prelude;
pub mod types;
pub mod version;

pub use error::{EngineError, EngineResult};
pub use graphics::Graphics;
pub use module::{Application, Capabilities, Module, ModuleInfo, ShutdownHandle};
pub use version::API_VERSION;

pub mod log {
    pub use log::Level;

    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)+) => (::log::log!(::log::Level::Trace, $($arg)+))
    }

    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)+) => (::log::log!(::log::Level::Debug, $($arg)+))
    }

    #[macro_export]
    macro_rules! error {
        ($($arg:tt)+) => (::log::log!(::log::Level::Error, $($arg)+))
    }

    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)+) => (::log::log!(::log::Level::Warn, $($arg)+))
    }

    #[macro_export]
    macro_rules! info {
        ($($arg:tt)+) => (::log::log!(::log::Level::Info, $($arg)+))
    }
}
