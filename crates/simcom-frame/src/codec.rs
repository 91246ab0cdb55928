use std::borrow::Cow;
use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};

/// Delimiter bracketing every response segment.
pub const DEFAULT_DELIMITER: &[u8] = b"\r\n";

/// Terminator appended to every command before transmission.
pub const DEFAULT_TERMINATOR: &[u8] = b"\r";

/// Default cap on a single accumulated response: 1 MiB.
pub const DEFAULT_MAX_BUFFER: usize = 1024 * 1024;

/// One delimiter-bracketed segment of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Position within the batch it was read with.
    pub index: usize,
    /// Bytes strictly between two delimiters. Never empty.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(index: usize, payload: impl Into<Bytes>) -> Self {
        Self {
            index,
            payload: payload.into(),
        }
    }

    /// Payload as text; invalid UTF-8 is replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    /// Payload as an owned string.
    pub fn into_text(self) -> String {
        match String::from_utf8(self.payload.to_vec()) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }
}

/// Split a settled buffer into frames.
///
/// Delimiter occurrences are matched left to right without overlap, and a
/// frame is the span between two consecutive occurrences, so adjacent
/// frames share nothing:
///
/// ```text
/// \r\nA\r\n\r\nB\r\n  ->  "A", "", "B"  ->  ["A", "B"]
/// ```
///
/// Zero-length spans are padding and dropped. Bytes before the first
/// delimiter (a command echo) or after the last one are not frames.
pub fn segment_frames(data: &Bytes, delimiter: &[u8]) -> Vec<Frame> {
    let mut frames = Vec::new();
    if delimiter.is_empty() {
        return frames;
    }

    let Some(first) = find(data, delimiter, 0) else {
        return frames;
    };

    let mut start = first + delimiter.len();
    while let Some(end) = find(data, delimiter, start) {
        if end > start {
            frames.push(Frame::new(frames.len(), data.slice(start..end)));
        }
        start = end + delimiter.len();
    }

    frames
}

/// Whether `buf` looks like a finished response: it ends with the
/// delimiter and is more than the delimiter alone.
pub fn is_settle_candidate(buf: &[u8], delimiter: &[u8]) -> bool {
    !delimiter.is_empty() && buf.len() > delimiter.len() && buf.ends_with(delimiter)
}

/// Encode `command` followed by `terminator`.
pub fn encode_command(command: &str, terminator: &[u8], dst: &mut BytesMut) {
    dst.reserve(command.len() + terminator.len());
    dst.put_slice(command.as_bytes());
    dst.put_slice(terminator);
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

/// Configuration for response framing.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Segment delimiter. Default: `\r\n`.
    pub delimiter: Bytes,
    /// Pause before the first poll, giving the modem time to start answering.
    pub initial_delay: Duration,
    /// Sleep between polls that found no new bytes.
    pub poll_interval: Duration,
    /// Quiet period after a delimiter-terminated buffer before it counts as
    /// final. A timing heuristic: too short splits slow responses, too long
    /// only adds latency.
    pub settle_window: Duration,
    /// Maximum bytes accumulated for one response. Default: 1 MiB.
    pub max_buffer_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            delimiter: Bytes::from_static(DEFAULT_DELIMITER),
            initial_delay: Duration::from_millis(100),
            poll_interval: Duration::from_millis(10),
            settle_window: Duration::from_millis(100),
            max_buffer_size: DEFAULT_MAX_BUFFER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(frames: &[Frame]) -> Vec<String> {
        frames.iter().map(|f| f.text().into_owned()).collect()
    }

    #[test]
    fn test_single_frame() {
        let data = Bytes::from_static(b"\r\nOK\r\n");
        let frames = segment_frames(&data, DEFAULT_DELIMITER);
        assert_eq!(texts(&frames), vec!["OK"]);
        assert_eq!(frames[0].index, 0);
    }

    #[test]
    fn test_adjacent_frames_share_no_delimiter() {
        let data = Bytes::from_static(b"\r\nframe1\r\n\r\nframe2\r\n");
        let frames = segment_frames(&data, DEFAULT_DELIMITER);
        assert_eq!(texts(&frames), vec!["frame1", "frame2"]);
        assert_eq!(frames[1].index, 1);
    }

    #[test]
    fn test_single_delimiter_between_frames() {
        let data = Bytes::from_static(b"\r\n+CSQ: 22,0\r\nOK\r\n");
        let frames = segment_frames(&data, DEFAULT_DELIMITER);
        assert_eq!(texts(&frames), vec!["+CSQ: 22,0", "OK"]);
    }

    #[test]
    fn test_empty_spans_are_dropped() {
        let data = Bytes::from_static(b"\r\n\r\n\r\nRING\r\n\r\n");
        let frames = segment_frames(&data, DEFAULT_DELIMITER);
        assert_eq!(texts(&frames), vec!["RING"]);
        assert_eq!(frames[0].index, 0);
    }

    #[test]
    fn test_echo_before_first_delimiter_is_not_a_frame() {
        let data = Bytes::from_static(b"AT+CSQ\r\r\n+CSQ: 9,99\r\n\r\nOK\r\n");
        let frames = segment_frames(&data, DEFAULT_DELIMITER);
        assert_eq!(texts(&frames), vec!["+CSQ: 9,99", "OK"]);
    }

    #[test]
    fn test_no_opening_delimiter_yields_nothing() {
        let data = Bytes::from_static(b"OK\r\n");
        assert!(segment_frames(&data, DEFAULT_DELIMITER).is_empty());

        let data = Bytes::from_static(b"no delimiter at all");
        assert!(segment_frames(&data, DEFAULT_DELIMITER).is_empty());
    }

    #[test]
    fn test_trailing_unterminated_bytes_are_ignored() {
        let data = Bytes::from_static(b"\r\nOK\r\npartial");
        let frames = segment_frames(&data, DEFAULT_DELIMITER);
        assert_eq!(texts(&frames), vec!["OK"]);
    }

    #[test]
    fn test_custom_delimiter() {
        let data = Bytes::from_static(b"||a||b||||c||");
        let frames = segment_frames(&data, b"||");
        assert_eq!(texts(&frames), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_delimiter_yields_nothing() {
        let data = Bytes::from_static(b"\r\nOK\r\n");
        assert!(segment_frames(&data, b"").is_empty());
    }

    #[test]
    fn test_frames_are_slices_of_input() {
        let data = Bytes::from_static(b"\r\nOK\r\n");
        let frames = segment_frames(&data, DEFAULT_DELIMITER);
        assert_eq!(frames[0].payload.as_ptr(), data[2..].as_ptr());
    }

    #[test]
    fn test_settle_candidate() {
        assert!(is_settle_candidate(b"\r\nOK\r\n", DEFAULT_DELIMITER));
        assert!(is_settle_candidate(b"OK\r\n", DEFAULT_DELIMITER));
        assert!(!is_settle_candidate(b"\r\n", DEFAULT_DELIMITER));
        assert!(!is_settle_candidate(b"\r\nOK", DEFAULT_DELIMITER));
        assert!(!is_settle_candidate(b"\r\nOK\r", DEFAULT_DELIMITER));
        assert!(!is_settle_candidate(b"", DEFAULT_DELIMITER));
        assert!(!is_settle_candidate(b"x\r\n", b""));
    }

    #[test]
    fn test_encode_command_appends_terminator() {
        let mut buf = BytesMut::new();
        encode_command("AT+CSQ", DEFAULT_TERMINATOR, &mut buf);
        assert_eq!(buf.as_ref(), b"AT+CSQ\r");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let frame = Frame::new(0, Bytes::from_static(b"OK\xff"));
        assert_eq!(frame.text(), "OK\u{fffd}");
        assert_eq!(frame.into_text(), "OK\u{fffd}");
    }
}
