//! AT command framing and demultiplexing for SIMCom SIM7600 modems.
//!
//! # Crate Structure
//!
//! - [`transport`]: Serial byte channel (real port and scripted mock)
//! - [`frame`]: Settled, delimiter-framed response reading
//! - [`modem`]: Command/response demultiplexing and the AT command catalog
//!   (behind `modem` feature)
//!
//! ```no_run
//! # #[cfg(feature = "modem")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::time::Duration;
//!
//! use simcom::modem::Modem;
//! use simcom::transport::SerialPortTransport;
//!
//! let modem = Modem::new(SerialPortTransport::new("/dev/ttyUSB2", 115_200));
//! modem.open()?;
//! let reply = modem.send("AT+CSQ", Some("OK"), &["ERROR"], Duration::from_secs(2))?;
//! println!("{reply}");
//! for message in modem.unsolicited_messages(true) {
//!     println!("unsolicited: {message}");
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "modem"))]
//! # fn main() {}
//! ```

/// Re-export transport types.
pub mod transport {
    pub use simcom_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use simcom_frame::*;
}

/// Re-export modem types (requires `modem` feature).
#[cfg(feature = "modem")]
pub mod modem {
    pub use simcom_modem::*;
}
