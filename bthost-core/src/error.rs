//! Error taxonomy shared across the service loop, HSMs and profile services.

use thiserror::Error;

/// The small, closed set of failure kinds a profile service or IPC handler
/// can report back to a client (mirrors `bthost_types::packet::ResponseErr`,
/// which `bthost-net` converts this into at the dispatcher boundary).
#[derive(Error, Debug)]
pub enum BtError {
    #[error("invalid parameter: {0}")]
    Parameter(String),

    #[error("not found")]
    NotFound,

    #[error("profile not enabled")]
    NotEnabled,

    #[error("operation already pending")]
    Busy,

    #[error("operation timed out")]
    Timeout,

    #[error("ipc error: {0}")]
    Ipc(String),

    #[error("stack error: {0}")]
    Stack(String),

    #[error("opcode not supported")]
    NotSupported,
}

pub type BtResult<T> = Result<T, BtError>;

impl From<std::io::Error> for BtError {
    fn from(e: std::io::Error) -> Self {
        BtError::Ipc(e.to_string())
    }
}
