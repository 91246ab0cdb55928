use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use serialport::{ClearBuffer, SerialPort};
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::SerialTransport;

/// Default baud rate of SIM7600 series modules.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default driver-level timeout for a single read or write.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_millis(50);

/// Serial device transport backed by the `serialport` crate.
///
/// Construction only records the settings; the device is opened by
/// [`SerialTransport::open`].
pub struct SerialPortTransport {
    path: String,
    baud_rate: u32,
    io_timeout: Duration,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialPortTransport {
    /// Create a transport for `path` at `baud_rate`.
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
            io_timeout: DEFAULT_IO_TIMEOUT,
            port: None,
        }
    }

    /// Override the driver-level read/write timeout.
    pub fn with_io_timeout(mut self, io_timeout: Duration) -> Self {
        self.io_timeout = io_timeout;
        self
    }

    /// Device path this transport opens.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Configured baud rate.
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or(TransportError::NotOpen)
    }
}

impl SerialTransport for SerialPortTransport {
    fn open(&mut self) -> Result<()> {
        let port = serialport::new(self.path.as_str(), self.baud_rate)
            .timeout(self.io_timeout)
            .open()
            .map_err(|source| TransportError::Open {
                path: PathBuf::from(&self.path),
                source,
            })?;
        debug!(path = %self.path, baud = self.baud_rate, "opened serial port");
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.port.take().is_some() {
            debug!(path = %self.path, "closed serial port");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let port = self.port_mut()?;
        port.write_all(data)?;
        port.flush()?;
        Ok(())
    }

    fn bytes_waiting(&mut self) -> Result<usize> {
        let port = self.port_mut()?;
        Ok(port.bytes_to_read()? as usize)
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let port = self.port_mut()?;
        loop {
            match port.read(buf) {
                Ok(n) => return Ok(n),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if err.kind() == ErrorKind::TimedOut || err.kind() == ErrorKind::WouldBlock =>
                {
                    return Ok(0);
                }
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    fn clear_input(&mut self) -> Result<()> {
        let port = self.port_mut()?;
        port.clear(ClearBuffer::Input)?;
        Ok(())
    }
}

impl std::fmt::Debug for SerialPortTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPortTransport")
            .field("path", &self.path)
            .field("baud_rate", &self.baud_rate)
            .field("io_timeout", &self.io_timeout)
            .field("open", &self.port.is_some())
            .finish()
    }
}
