//! Typed wrappers over individual AT commands.
//!
//! Each wrapper builds a [`CommandRequest`](crate::CommandRequest), sends it
//! through [`Modem::send_request`](crate::Modem::send_request) and decodes
//! the reply. Only a handful of commands are covered.

mod signal;
mod status;
mod v25ter;

pub use signal::SignalQuality;
pub use status::{FunctionalityLevel, PinStatus, StatusControl};
pub use v25ter::{CallKind, DialOptions, Identification, V25ter};

use crate::request::CommandRequest;

pub(crate) const ERROR_MARKER: &str = "ERROR";
pub(crate) const OK_MARKER: &str = "OK";

/// Request expecting `OK` and failing on `ERROR`.
pub(crate) fn ok_request(command: impl Into<String>) -> CommandRequest {
    CommandRequest::new(command).expect(OK_MARKER).error(ERROR_MARKER)
}
