//! Command/response demultiplexing for SIMCom modems.
//!
//! This is the layer applications talk to. A [`Modem`] owns one serial
//! transport, keeps at most one command in flight, and separates the reply
//! to that command from unsolicited result codes (`RING`, `+CMTI: ...`)
//! that the module emits whenever it likes. Unclaimed frames are kept in an
//! ordered queue until [`Modem::unsolicited_messages`] drains them.
//!
//! The [`command`] module is a thin catalog of typed AT commands built on
//! [`Modem::send_request`].

pub mod command;
pub mod config;
pub mod demux;
pub mod error;
pub mod modem;
pub mod power;
pub mod request;
pub mod urc;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use command::{
    CallKind, DialOptions, FunctionalityLevel, Identification, PinStatus, SignalQuality,
    StatusControl, V25ter,
};
pub use config::ModemConfig;
pub use demux::{classify, Classification, Rejection};
pub use error::{ModemError, PowerError, Result};
pub use modem::{ConnectionState, Modem, SIM7600_MODEL};
pub use power::PowerControl;
pub use request::{CommandRequest, Reply};
pub use urc::UnsolicitedQueue;
