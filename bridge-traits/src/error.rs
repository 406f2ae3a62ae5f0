use crate::playback::PlatformState;
use thiserror::Error;

/// Errors reported by host adapters.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Platform operation failed: {0}")]
    OperationFailed(String),

    #[error("Platform cannot {operation} while {state:?}")]
    InvalidState {
        operation: &'static str,
        state: PlatformState,
    },

    /// The operation observed its cancellation token and gave up.
    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Returns `true` if the error only reports a cooperative cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, BridgeError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
