//! Scripted in-memory serial port.
//!
//! Behaves like a modem that answers instantly: every write is matched
//! against the scripted responses and the matching output is queued as
//! received bytes. Clones share state, so a test can keep one handle for
//! inspection while the modem owns another.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Result, TransportError};
use crate::traits::SerialTransport;

/// One observable interaction with the mock port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    /// Bytes written by the host.
    Write(Vec<u8>),
    /// Non-empty chunk handed to the host by a read.
    Read(Vec<u8>),
}

#[derive(Debug, Default)]
struct MockState {
    open: bool,
    input: VecDeque<u8>,
    responses: Vec<(Vec<u8>, Vec<u8>)>,
    default_response: Vec<u8>,
    chunk_size: Option<usize>,
    fail_writes: bool,
    events: Vec<MockEvent>,
}

/// Shared-state mock implementing [`SerialTransport`].
#[derive(Debug, Clone, Default)]
pub struct MockSerial {
    state: Arc<Mutex<MockState>>,
}

impl MockSerial {
    /// Create a closed mock port with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `output` whenever exactly `input` is written.
    pub fn add_response(&self, input: impl AsRef<[u8]>, output: impl AsRef<[u8]>) {
        self.lock()
            .responses
            .push((input.as_ref().to_vec(), output.as_ref().to_vec()));
    }

    /// Bytes answered to writes that match no scripted response.
    pub fn set_default_response(&self, output: impl AsRef<[u8]>) {
        self.lock().default_response = output.as_ref().to_vec();
    }

    /// Limit how many bytes a single read may return.
    pub fn set_chunk_size(&self, chunk_size: Option<usize>) {
        self.lock().chunk_size = chunk_size.map(|n| n.max(1));
    }

    /// Make subsequent writes fail with an I/O error.
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Queue bytes as if the modem sent them on its own.
    pub fn inject(&self, bytes: impl AsRef<[u8]>) {
        self.lock().input.extend(bytes.as_ref().iter().copied());
    }

    /// Everything written so far, one entry per write.
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.lock()
            .events
            .iter()
            .filter_map(|event| match event {
                MockEvent::Write(bytes) => Some(bytes.clone()),
                MockEvent::Read(_) => None,
            })
            .collect()
    }

    /// Ordered log of writes and non-empty reads.
    pub fn events(&self) -> Vec<MockEvent> {
        self.lock().events.clone()
    }

    /// Received bytes not read yet.
    pub fn pending_input(&self) -> usize {
        self.lock().input.len()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SerialTransport for MockSerial {
    fn open(&mut self) -> Result<()> {
        self.lock().open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.lock().open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.lock().open
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let mut state = self.lock();
        if !state.open {
            return Err(TransportError::NotOpen);
        }
        if state.fail_writes {
            return Err(TransportError::Io(std::io::Error::other("mock write failure")));
        }

        state.events.push(MockEvent::Write(data.to_vec()));
        let response = state
            .responses
            .iter()
            .find(|(input, _)| input.as_slice() == data)
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| state.default_response.clone());
        state.input.extend(response);
        Ok(())
    }

    fn bytes_waiting(&mut self) -> Result<usize> {
        let state = self.lock();
        if !state.open {
            return Err(TransportError::NotOpen);
        }
        Ok(state.input.len())
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut state = self.lock();
        if !state.open {
            return Err(TransportError::NotOpen);
        }

        let mut n = buf.len().min(state.input.len());
        if let Some(chunk) = state.chunk_size {
            n = n.min(chunk);
        }
        for slot in buf.iter_mut().take(n) {
            // n never exceeds the queue length.
            *slot = state.input.pop_front().unwrap_or_default();
        }
        if n > 0 {
            state.events.push(MockEvent::Read(buf[..n].to_vec()));
        }
        Ok(n)
    }

    fn clear_input(&mut self) -> Result<()> {
        self.lock().input.clear();
        Ok(())
    }
}
