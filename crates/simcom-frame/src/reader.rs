use std::thread;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use simcom_transport::SerialTransport;
use tracing::{debug, trace};

use crate::codec::{is_settle_candidate, segment_frames, Frame, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 1024;
const READ_CHUNK_SIZE: usize = 4 * 1024;

/// What happens to an unsettled buffer when a read times out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Partial {
    Discard,
    Keep,
}

/// Reads settled, delimiter-framed responses from a [`SerialTransport`].
///
/// The reader owns the transport. Each call to [`read_frames`] returns every
/// frame of one response burst. A burst left unsettled by [`poll_frames`]
/// stays buffered and is the start of the next read.
///
/// [`read_frames`]: FrameReader::read_frames
/// [`poll_frames`]: FrameReader::poll_frames
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: SerialTransport> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read one response burst using the configured delimiter.
    pub fn read_frames(&mut self, timeout: Duration) -> Result<Vec<Frame>> {
        let delimiter = self.config.delimiter.clone();
        self.read_frames_delimited(&delimiter, timeout)
    }

    /// Read one response burst framed by `delimiter` (blocking).
    ///
    /// Polls the transport until the buffer ends with the delimiter and no
    /// further bytes arrive during the settle window, then segments it.
    /// Returns `Err(FrameError::Timeout)` if that never happens within
    /// `timeout`; partial data is discarded in that case.
    pub fn read_frames_delimited(
        &mut self,
        delimiter: &[u8],
        timeout: Duration,
    ) -> Result<Vec<Frame>> {
        self.read_burst(delimiter, timeout, Partial::Discard)
    }

    /// Read one burst without losing a partial one at the deadline.
    ///
    /// Behaves like [`read_frames`](FrameReader::read_frames), except that
    /// bytes already taken from the transport when `timeout` expires stay
    /// buffered and are completed by the next read. Meant for speculative
    /// polls with short budgets, where a frame may straddle the deadline.
    pub fn poll_frames(&mut self, timeout: Duration) -> Result<Vec<Frame>> {
        let delimiter = self.config.delimiter.clone();
        self.read_burst(&delimiter, timeout, Partial::Keep)
    }

    /// Bytes held over from an unsettled [`poll_frames`](FrameReader::poll_frames).
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Drop any held-over bytes, returning how many there were.
    pub fn discard_buffered(&mut self) -> usize {
        let dropped = self.buf.len();
        self.buf.clear();
        dropped
    }

    fn read_burst(
        &mut self,
        delimiter: &[u8],
        timeout: Duration,
        partial: Partial,
    ) -> Result<Vec<Frame>> {
        if delimiter.is_empty() {
            return Err(FrameError::EmptyDelimiter);
        }

        let deadline = Instant::now() + timeout;
        if !self.buf.is_empty() {
            trace!(carried = self.buf.len(), "resuming held-over bytes");
        }

        if !self.config.initial_delay.is_zero() {
            thread::sleep(self.config.initial_delay.min(timeout));
        }

        match self.accumulate(delimiter, deadline, timeout) {
            Ok(()) => {
                let data = self.buf.split().freeze();
                let frames = segment_frames(&data, delimiter);
                debug!(bytes = data.len(), frames = frames.len(), "response settled");
                Ok(frames)
            }
            Err(err @ FrameError::Timeout(_)) if partial == Partial::Keep => {
                if !self.buf.is_empty() {
                    trace!(held = self.buf.len(), "holding partial burst for next read");
                }
                Err(err)
            }
            Err(err) => {
                if !self.buf.is_empty() {
                    debug!(discarded = self.buf.len(), error = %err, "dropping partial response");
                }
                self.buf.clear();
                Err(err)
            }
        }
    }

    fn accumulate(&mut self, delimiter: &[u8], deadline: Instant, timeout: Duration) -> Result<()> {
        loop {
            let received = self.fill()?;

            if is_settle_candidate(&self.buf, delimiter) {
                thread::sleep(self.config.settle_window);
                let late = self.fill()?;
                if late == 0 {
                    return Ok(());
                }
                trace!(late, "bytes arrived during settle window");
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(FrameError::Timeout(timeout));
            }
            if received == 0 {
                thread::sleep(self.config.poll_interval.min(deadline - now));
            }
        }
    }

    /// Move whatever the transport has buffered into `self.buf`.
    fn fill(&mut self) -> Result<usize> {
        let waiting = self.inner.bytes_waiting()?;
        if waiting == 0 {
            return Ok(0);
        }

        let mut chunk = [0u8; READ_CHUNK_SIZE];
        let want = waiting.min(READ_CHUNK_SIZE);
        let read = self.inner.read_available(&mut chunk[..want])?;

        let size = self.buf.len() + read;
        if size > self.config.max_buffer_size {
            return Err(FrameError::BufferOverflow {
                size,
                max: self.config.max_buffer_size,
            });
        }

        self.buf.extend_from_slice(&chunk[..read]);
        trace!(read, buffered = self.buf.len(), "received bytes");
        Ok(read)
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner transport.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update the settle window for subsequent reads.
    pub fn set_settle_window(&mut self, settle_window: Duration) {
        self.config.settle_window = settle_window;
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use simcom_transport::{MockSerial, TransportError};

    use super::*;

    fn fast_config() -> FrameConfig {
        FrameConfig {
            initial_delay: Duration::ZERO,
            poll_interval: Duration::from_millis(1),
            settle_window: Duration::from_millis(5),
            ..FrameConfig::default()
        }
    }

    fn open_mock() -> MockSerial {
        let mut mock = MockSerial::new();
        mock.open().unwrap();
        mock
    }

    fn texts(frames: &[Frame]) -> Vec<String> {
        frames.iter().map(|f| f.text().into_owned()).collect()
    }

    #[test]
    fn read_single_frame() {
        let mock = open_mock();
        mock.inject(b"\r\nOK\r\n");

        let mut reader = FrameReader::with_config(mock.clone(), fast_config());
        let frames = reader.read_frames(Duration::from_secs(1)).unwrap();

        assert_eq!(texts(&frames), vec!["OK"]);
        assert_eq!(mock.pending_input(), 0);
    }

    #[test]
    fn read_multiple_frames_in_order() {
        let mock = open_mock();
        mock.inject(b"\r\n+CFUN: 1\r\n\r\nOK\r\n\r\nRING\r\n");

        let mut reader = FrameReader::with_config(mock, fast_config());
        let frames = reader.read_frames(Duration::from_secs(1)).unwrap();

        assert_eq!(texts(&frames), vec!["+CFUN: 1", "OK", "RING"]);
        let indices: Vec<usize> = frames.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn chunking_does_not_change_frames() {
        let wire = b"\r\nManufacturer: SIMCOM INCORPORATED\r\n\r\nModel: SIMCOM_SIM7600E-H\r\n\r\nOK\r\n";
        let expected = vec![
            "Manufacturer: SIMCOM INCORPORATED",
            "Model: SIMCOM_SIM7600E-H",
            "OK",
        ];

        for chunk in [None, Some(1), Some(2), Some(3), Some(5), Some(7), Some(64)] {
            let mock = open_mock();
            mock.set_chunk_size(chunk);
            mock.inject(wire);

            let mut reader = FrameReader::with_config(mock, fast_config());
            let frames = reader.read_frames(Duration::from_secs(2)).unwrap();
            assert_eq!(texts(&frames), expected, "chunk size {chunk:?}");
        }
    }

    #[test]
    fn silent_transport_times_out() {
        let mock = open_mock();
        let mut reader = FrameReader::with_config(mock, fast_config());

        let timeout = Duration::from_millis(30);
        let start = Instant::now();
        let err = reader.read_frames(timeout).unwrap_err();

        assert!(matches!(err, FrameError::Timeout(t) if t == timeout));
        assert!(start.elapsed() >= timeout);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn stream_without_delimiter_times_out() {
        let mock = open_mock();
        mock.inject(b"no delimiter here");

        let mut reader = FrameReader::with_config(mock, fast_config());
        let err = reader.read_frames(Duration::from_millis(30)).unwrap_err();
        assert!(matches!(err, FrameError::Timeout(_)));
    }

    #[test]
    fn lone_delimiter_is_not_a_response() {
        let mock = open_mock();
        mock.inject(b"\r\n");

        let mut reader = FrameReader::with_config(mock, fast_config());
        let err = reader.read_frames(Duration::from_millis(30)).unwrap_err();
        assert!(matches!(err, FrameError::Timeout(_)));
    }

    #[test]
    fn terminated_buffer_without_frames_is_empty() {
        let mock = open_mock();
        mock.inject(b"OK\r\n");

        let mut reader = FrameReader::with_config(mock, fast_config());
        let frames = reader.read_frames(Duration::from_secs(1)).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn settle_window_joins_a_late_burst() {
        let mock = open_mock();
        mock.inject(b"\r\nOK\r\n");

        let late = mock.clone();
        let injector = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            late.inject(b"\r\nRING\r\n");
        });

        let config = FrameConfig {
            settle_window: Duration::from_millis(80),
            ..fast_config()
        };
        let mut reader = FrameReader::with_config(mock, config);
        let frames = reader.read_frames(Duration::from_secs(2)).unwrap();
        injector.join().unwrap();

        assert_eq!(texts(&frames), vec!["OK", "RING"]);
    }

    #[test]
    fn bytes_after_settle_belong_to_next_read() {
        let mock = open_mock();
        mock.inject(b"\r\nOK\r\n");

        let mut reader = FrameReader::with_config(mock.clone(), fast_config());
        let first = reader.read_frames(Duration::from_secs(1)).unwrap();

        mock.inject(b"\r\n+CMTI: \"SM\",3\r\n");
        let second = reader.read_frames(Duration::from_secs(1)).unwrap();

        assert_eq!(texts(&first), vec!["OK"]);
        assert_eq!(texts(&second), vec!["+CMTI: \"SM\",3"]);
    }

    #[test]
    fn partial_data_is_dropped_after_timeout() {
        let mock = open_mock();
        mock.inject(b"\r\npart");

        let mut reader = FrameReader::with_config(mock.clone(), fast_config());
        assert!(reader.read_frames(Duration::from_millis(20)).is_err());

        mock.inject(b"ial\r\n");
        let frames = reader.read_frames(Duration::from_secs(1)).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn poll_keeps_partial_frame_for_next_read() {
        let mock = open_mock();
        mock.inject(b"\r\nRI");

        let mut reader = FrameReader::with_config(mock.clone(), fast_config());
        let err = reader.poll_frames(Duration::from_millis(20)).unwrap_err();
        assert!(matches!(err, FrameError::Timeout(_)));
        assert_eq!(reader.buffered(), 4);

        mock.inject(b"NG\r\n");
        let frames = reader.poll_frames(Duration::from_millis(200)).unwrap();
        assert_eq!(texts(&frames), vec!["RING"]);
        assert_eq!(reader.buffered(), 0);
    }

    #[test]
    fn held_over_bytes_prefix_a_command_reply() {
        let mock = open_mock();
        mock.inject(b"\r\nRI");

        let mut reader = FrameReader::with_config(mock.clone(), fast_config());
        assert!(reader.poll_frames(Duration::from_millis(20)).is_err());

        mock.inject(b"NG\r\n\r\nOK\r\n");
        let frames = reader.read_frames(Duration::from_secs(1)).unwrap();
        assert_eq!(texts(&frames), vec!["RING", "OK"]);
    }

    #[test]
    fn discard_buffered_drops_held_over_bytes() {
        let mock = open_mock();
        mock.inject(b"\r\npart");

        let mut reader = FrameReader::with_config(mock.clone(), fast_config());
        assert!(reader.poll_frames(Duration::from_millis(20)).is_err());
        assert_eq!(reader.discard_buffered(), 6);

        mock.inject(b"\r\nOK\r\n");
        let frames = reader.read_frames(Duration::from_secs(1)).unwrap();
        assert_eq!(texts(&frames), vec!["OK"]);
    }

    #[test]
    fn custom_delimiter() {
        let mock = open_mock();
        mock.inject(b"||one||two||");

        let mut reader = FrameReader::with_config(mock, fast_config());
        let frames = reader
            .read_frames_delimited(b"||", Duration::from_secs(1))
            .unwrap();
        assert_eq!(texts(&frames), vec!["one", "two"]);
    }

    #[test]
    fn empty_delimiter_rejected() {
        let mut reader = FrameReader::with_config(open_mock(), fast_config());
        let err = reader
            .read_frames_delimited(b"", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, FrameError::EmptyDelimiter));
    }

    #[test]
    fn oversized_response_rejected() {
        let mock = open_mock();
        mock.inject(vec![b'x'; 64]);

        let config = FrameConfig {
            max_buffer_size: 16,
            ..fast_config()
        };
        let mut reader = FrameReader::with_config(mock, config);
        let err = reader.read_frames(Duration::from_secs(1)).unwrap_err();
        assert!(matches!(
            err,
            FrameError::BufferOverflow { size: 64, max: 16 }
        ));
    }

    #[test]
    fn closed_transport_error_propagates() {
        let mut reader = FrameReader::with_config(MockSerial::new(), fast_config());
        let err = reader.read_frames(Duration::from_secs(1)).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Transport(TransportError::NotOpen)
        ));
    }

    #[test]
    fn initial_delay_is_capped_by_timeout() {
        let config = FrameConfig {
            initial_delay: Duration::from_secs(5),
            ..fast_config()
        };
        let mut reader = FrameReader::with_config(open_mock(), config);

        let start = Instant::now();
        let err = reader.read_frames(Duration::from_millis(20)).unwrap_err();
        assert!(matches!(err, FrameError::Timeout(_)));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut reader = FrameReader::new(MockSerial::new());
        reader.set_settle_window(Duration::from_millis(7));
        assert_eq!(reader.config().settle_window, Duration::from_millis(7));

        let _ = reader.get_ref();
        let _ = reader.get_mut();
        let _inner = reader.into_inner();
    }
}
