use std::time::Duration;

use simcom_transport::TransportError;

/// Errors that can occur while framing modem traffic.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// No settled, delimiter-terminated response arrived in time.
    #[error("no complete response within {0:?}")]
    Timeout(Duration),

    /// The framing delimiter must contain at least one byte.
    #[error("framing delimiter must not be empty")]
    EmptyDelimiter,

    /// The accumulated response exceeds the configured maximum size.
    #[error("response too large ({size} bytes, max {max})")]
    BufferOverflow { size: usize, max: usize },

    /// The underlying transport failed.
    #[error("frame transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, FrameError>;
