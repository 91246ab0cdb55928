use bytes::{Bytes, BytesMut};
use simcom_transport::SerialTransport;
use tracing::debug;

use crate::codec::{encode_command, DEFAULT_TERMINATOR};
use crate::error::Result;

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Writes terminated commands to a [`SerialTransport`].
///
/// Commands end with a carriage return while responses are framed by
/// `\r\n`, so the terminator is configured separately from the reader's
/// delimiter.
#[derive(Debug)]
pub struct CommandWriter {
    buf: BytesMut,
    terminator: Bytes,
}

impl CommandWriter {
    /// Create a writer using the default `\r` terminator.
    pub fn new() -> Self {
        Self::with_terminator(Bytes::from_static(DEFAULT_TERMINATOR))
    }

    /// Create a writer with an explicit terminator.
    pub fn with_terminator(terminator: impl Into<Bytes>) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            terminator: terminator.into(),
        }
    }

    /// Encode `command` plus terminator and write it in one call.
    pub fn send<T: SerialTransport>(&mut self, transport: &mut T, command: &str) -> Result<()> {
        self.buf.clear();
        encode_command(command, &self.terminator, &mut self.buf);
        transport.write_all(&self.buf)?;
        debug!(command, bytes = self.buf.len(), "command written");
        Ok(())
    }

    /// Terminator appended to every command.
    pub fn terminator(&self) -> &[u8] {
        &self.terminator
    }
}

impl Default for CommandWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use simcom_transport::{MockSerial, TransportError};

    use super::*;
    use crate::error::FrameError;

    fn open_mock() -> MockSerial {
        let mut mock = MockSerial::new();
        mock.open().unwrap();
        mock
    }

    #[test]
    fn writes_command_with_carriage_return() {
        let mut mock = open_mock();
        let mut writer = CommandWriter::new();

        writer.send(&mut mock, "AT+CSQ").unwrap();

        assert_eq!(mock.written(), vec![b"AT+CSQ\r".to_vec()]);
        assert_eq!(writer.terminator(), b"\r");
    }

    #[test]
    fn custom_terminator() {
        let mut mock = open_mock();
        let mut writer = CommandWriter::with_terminator(&b"\r\n"[..]);

        writer.send(&mut mock, "ATI").unwrap();
        writer.send(&mut mock, "AT").unwrap();

        assert_eq!(
            mock.written(),
            vec![b"ATI\r\n".to_vec(), b"AT\r\n".to_vec()]
        );
    }

    #[test]
    fn write_failure_is_transport_error() {
        let mut mock = open_mock();
        mock.fail_writes(true);

        let err = CommandWriter::new().send(&mut mock, "AT").unwrap_err();
        assert!(matches!(err, FrameError::Transport(TransportError::Io(_))));
    }
}
