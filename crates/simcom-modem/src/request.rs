use std::time::Duration;

/// One AT command and the rules for recognising its reply.
///
/// Each frame of the response burst is classified in arrival order:
/// 1. contains an error marker: the command failed;
/// 2. no result claimed yet and contains the success marker (or there is
///    no success marker): the frame is the result;
/// 3. contains a collect marker: information text belonging to the reply;
/// 4. anything else is an unsolicited message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    /// Command text, without terminator.
    pub command: String,
    /// Substring identifying the result frame. `None` claims the first frame.
    pub success_marker: Option<String>,
    /// Substrings identifying a failure frame.
    pub error_markers: Vec<String>,
    /// Substrings identifying information-text frames of the reply.
    pub collect_markers: Vec<String>,
    /// Overrides the modem's default timeout.
    pub timeout: Option<Duration>,
}

impl CommandRequest {
    /// Create a request whose first frame is the result.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            success_marker: None,
            error_markers: Vec::new(),
            collect_markers: Vec::new(),
            timeout: None,
        }
    }

    /// Require the result frame to contain `marker`.
    pub fn expect(mut self, marker: impl Into<String>) -> Self {
        self.success_marker = Some(marker.into());
        self
    }

    /// Treat frames containing `marker` as failure.
    pub fn error(mut self, marker: impl Into<String>) -> Self {
        self.error_markers.push(marker.into());
        self
    }

    /// Treat frames containing any of `markers` as failure.
    pub fn errors<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.error_markers.extend(markers.into_iter().map(Into::into));
        self
    }

    /// Keep frames containing `marker` as information text of the reply.
    pub fn collect(mut self, marker: impl Into<String>) -> Self {
        self.collect_markers.push(marker.into());
        self
    }

    /// Set a per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A successfully classified reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    /// The frame claimed as the command's result.
    pub result: String,
    /// Frames matched by collect markers, in arrival order.
    pub information: Vec<String>,
}

impl Reply {
    /// First information line starting with `prefix`, with the prefix and
    /// following whitespace removed.
    pub fn information_value(&self, prefix: &str) -> Option<&str> {
        self.information
            .iter()
            .find_map(|line| line.strip_prefix(prefix))
            .map(str::trim_start)
    }
}
