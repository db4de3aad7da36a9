use std::collections::TryReserveError;

/// Errors that can occur while talking to a calculator
#[derive(Debug, thiserror::Error)]
pub enum CalcError {
    /// The connection handle is closed or was never opened
    #[error("invalid connection handle")]
    InvalidHandle,

    /// A required argument is missing or cannot be encoded
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// A buffer could not be allocated
    #[error("out of memory")]
    OutOfMemory,

    /// The calculator sent a structurally invalid packet
    #[error("bad packet format: {0}")]
    BadPacketFormat(&'static str),

    /// The transport failed to move a packet
    #[error("communication failure: {0}")]
    CommunicationFailure(String),

    /// Embedded and computed checksums differ (strict checksum policy only)
    #[error("checksum mismatch: embedded {embedded:04X}, computed {computed:04X}")]
    ChecksumMismatch { embedded: u16, computed: u16 },
}

impl From<std::io::Error> for CalcError {
    fn from(err: std::io::Error) -> Self {
        Self::CommunicationFailure(err.to_string())
    }
}

impl From<TryReserveError> for CalcError {
    fn from(_: TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;
