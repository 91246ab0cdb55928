//! Byte-oriented serial transport abstraction.
//!
//! This is the lowest layer of simcom. The framing and modem layers only
//! ever talk to a [`SerialTransport`]:
//! - [`SerialPortTransport`] drives a real UART / USB-serial device
//! - [`MockSerial`] is a scripted in-memory port for tests
//!
//! Implementations never interpret the bytes they carry.

pub mod error;
pub mod mock;
pub mod serial;
pub mod traits;

pub use error::{Result, TransportError};
pub use mock::{MockEvent, MockSerial};
pub use serial::{SerialPortTransport, DEFAULT_BAUD_RATE, DEFAULT_IO_TIMEOUT};
pub use traits::SerialTransport;
