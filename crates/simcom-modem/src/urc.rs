//! Ordered store of unsolicited result codes.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// FIFO of frames no command claimed.
///
/// Guarded by its own lock so callers can inspect it while a command is in
/// flight. When both locks are needed the channel lock is taken first.
#[derive(Debug, Default)]
pub struct UnsolicitedQueue {
    inner: Mutex<VecDeque<String>>,
}

impl UnsolicitedQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: impl Into<String>) {
        self.lock().push_back(message.into());
    }

    /// Append messages in order.
    pub fn extend<I>(&self, messages: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.lock().extend(messages);
    }

    /// Remove and return everything queued.
    pub fn take(&self) -> Vec<String> {
        self.lock().drain(..).collect()
    }

    /// Copy of the queue, leaving it intact.
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
