use crate::error::Result;

/// A byte channel to a modem.
///
/// Mirrors what the framing layer needs from a serial port: explicit
/// open/close, a write, a count of bytes already received, and a read that
/// returns only what is available. Reads never block for longer than the
/// implementation's own I/O timeout and report "nothing yet" as `Ok(0)`.
pub trait SerialTransport: Send {
    /// Open the underlying device.
    fn open(&mut self) -> Result<()>;

    /// Close the underlying device. Closing a closed transport is a no-op.
    fn close(&mut self) -> Result<()>;

    /// Whether the device is currently open.
    fn is_open(&self) -> bool;

    /// Write the whole buffer and flush it.
    fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Number of received bytes waiting to be read.
    fn bytes_waiting(&mut self) -> Result<usize>;

    /// Read up to `buf.len()` already-received bytes.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Discard any received bytes that have not been read yet.
    fn clear_input(&mut self) -> Result<()>;
}

impl<T: SerialTransport + ?Sized> SerialTransport for Box<T> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_all(data)
    }

    fn bytes_waiting(&mut self) -> Result<usize> {
        (**self).bytes_waiting()
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read_available(buf)
    }

    fn clear_input(&mut self) -> Result<()> {
        (**self).clear_input()
    }
}
