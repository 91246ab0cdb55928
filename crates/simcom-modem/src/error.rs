use std::time::Duration;

use simcom_frame::FrameError;
use simcom_transport::TransportError;

/// Errors surfaced by modem operations.
///
/// Transport failures and protocol-level failures share this one type so
/// callers match on a single taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum ModemError {
    /// A command was attempted while the modem is not powered on.
    #[error("modem is not powered on")]
    NotPowered,

    /// The serial channel failed on open, write or read.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// No complete, settled response arrived in time.
    #[error("no complete response to {command:?} within {timeout:?}")]
    ReadTimeout { command: String, timeout: Duration },

    /// A frame matched one of the command's error markers.
    #[error("{command:?} rejected: {response:?} matched error marker {marker:?}")]
    CommandRejected {
        command: String,
        marker: String,
        response: String,
    },

    /// Frames arrived but none was the expected result.
    #[error("no valid response to {command:?} (expected {expected:?}, got {frames} frames)")]
    NoValidResponse {
        command: String,
        expected: Option<String>,
        frames: usize,
    },

    /// The operation is not valid in the current connection state.
    #[error("usage error: {0}")]
    Usage(String),

    /// The power-control collaborator failed or is missing.
    #[error("power control error: {0}")]
    Power(#[from] PowerError),

    /// The reply could not be decoded into the expected shape.
    #[error("malformed response to {command:?}: {response:?}")]
    MalformedResponse { command: String, response: String },

    /// Framing configuration or size limits were violated.
    #[error("framing error: {0}")]
    Frame(FrameError),
}

impl ModemError {
    pub(crate) fn from_frame(err: FrameError, command: &str) -> Self {
        match err {
            FrameError::Timeout(timeout) => Self::ReadTimeout {
                command: command.to_string(),
                timeout,
            },
            FrameError::Transport(err) => Self::Transport(err),
            other => Self::Frame(other),
        }
    }

    pub(crate) fn malformed(command: &str, response: impl Into<String>) -> Self {
        Self::MalformedResponse {
            command: command.to_string(),
            response: response.into(),
        }
    }
}

/// Errors reported by a [`PowerControl`](crate::PowerControl) implementation.
#[derive(Debug, thiserror::Error)]
pub enum PowerError {
    /// No way to drive the module's power key on this host.
    #[error("power control unavailable: {0}")]
    Unavailable(String),

    /// Driving the power key failed.
    #[error("power control I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ModemError>;
