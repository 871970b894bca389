use thiserror::Error;

use crate::backend::BackendError;

/// Crate-wide error type.
///
/// Every fallible operation of the service returns `Result<_, SpiceryError>`.
/// Whether a given error actually reaches the caller depends on the
/// configured [`ErrorMode`](crate::spicery::ErrorMode): in fallback mode the
/// recoverable kinds (`NoCoverage`, `KernelLoad`, `KernelComputation`,
/// `InvalidHandle`) are absorbed into documented defaults, while
/// `InvalidArgument` always propagates because it indicates a caller bug.
#[derive(Error, Debug)]
pub enum SpiceryError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid kernel handle or path: {0}")]
    InvalidHandle(String),

    #[error("No coverage: {0}")]
    NoCoverage(String),

    #[error("Kernel loading failed: {context}: {source}")]
    KernelLoad {
        context: String,
        source: BackendError,
    },

    #[error("Kernel computation failed: {context}: {source}")]
    KernelComputation {
        context: String,
        source: BackendError,
    },

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(String),
}

impl SpiceryError {
    /// Whether fallback mode may downgrade this error to a safe default.
    pub(crate) fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            SpiceryError::InvalidArgument(_) | SpiceryError::NonUtf8Path(_)
        )
    }
}
