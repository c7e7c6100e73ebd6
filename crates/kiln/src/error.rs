use thiserror::Error;

/// Result codes reported by module operations.
///
/// The numeric codes are stable and match the values modules report across
/// the C boundary; `0` is success and therefore has no variant.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Error)]
#[repr(u32)]
pub enum EngineError {
    #[error("operation failed")]
    Failure = 1,
    #[error("file not found")]
    FileNotFound = 2,
    #[error("invalid parameter")]
    InvalidParameter = 3,
    #[error("out of memory")]
    OutOfMemory = 4,
    #[error("module is not initialized")]
    NotInitialized = 5,
    #[error("module is already initialized")]
    AlreadyInitialized = 6,
    #[error("platform error")]
    PlatformError = 7,
}

pub type EngineResult<T = ()> = Result<T, EngineError>;

impl EngineError {
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<EngineResult> {
        Some(Err(match code {
            0 => return Some(Ok(())),
            1 => EngineError::Failure,
            2 => EngineError::FileNotFound,
            3 => EngineError::InvalidParameter,
            4 => EngineError::OutOfMemory,
            5 => EngineError::NotInitialized,
            6 => EngineError::AlreadyInitialized,
            7 => EngineError::PlatformError,
            _ => return None,
        }))
    }
}
