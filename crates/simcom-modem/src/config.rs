use std::time::Duration;

use bytes::Bytes;
use simcom_frame::{FrameConfig, DEFAULT_TERMINATOR};

/// Connection-level settings for a [`Modem`](crate::Modem).
#[derive(Debug, Clone)]
pub struct ModemConfig {
    /// Response framing (delimiter, polling and settle timings).
    pub frame: FrameConfig,
    /// Bytes appended to every command. Default: `\r`.
    pub command_terminator: Bytes,
    /// Timeout for requests that do not set their own. Default: 5 s.
    pub default_timeout: Duration,
    /// Bound on the speculative read done when draining unsolicited
    /// messages. Default: 250 ms.
    pub drain_timeout: Duration,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            frame: FrameConfig::default(),
            command_terminator: Bytes::from_static(DEFAULT_TERMINATOR),
            default_timeout: Duration::from_secs(5),
            drain_timeout: Duration::from_millis(250),
        }
    }
}
