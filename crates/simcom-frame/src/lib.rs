//! Delimiter framing of AT responses over a serial byte stream.
//!
//! A modem answers with segments bracketed by a fixed delimiter (`\r\n`):
//!
//! ```text
//! \r\n+CSQ: 22,0\r\n\r\nOK\r\n  ->  ["+CSQ: 22,0", "OK"]
//! ```
//!
//! The stream carries no length prefix, so the end of a response is
//! inferred: the buffer must end on a delimiter and stay quiet for a
//! settle window. [`FrameReader`] implements that wait; [`segment_frames`]
//! is the pure scan that splits a settled buffer.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    encode_command, is_settle_candidate, segment_frames, Frame, FrameConfig, DEFAULT_DELIMITER,
    DEFAULT_MAX_BUFFER, DEFAULT_TERMINATOR,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::CommandWriter;
