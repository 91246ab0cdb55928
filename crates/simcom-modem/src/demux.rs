use simcom_frame::Frame;
use tracing::{debug, trace};

use crate::error::{ModemError, Result};
use crate::request::{CommandRequest, Reply};

/// The error marker and frame that rejected a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub marker: String,
    pub response: String,
}

/// Outcome of classifying one response burst against a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Frame claimed as the result, if any.
    pub result: Option<String>,
    /// First frame that matched an error marker, if any.
    pub rejection: Option<Rejection>,
    /// Frames matched by collect markers.
    pub information: Vec<String>,
    /// Frames nobody claimed, in arrival order.
    pub unsolicited: Vec<String>,
    /// Number of frames in the burst.
    pub frames: usize,
}

/// Classify `frames` in arrival order against `request`.
///
/// Scanning never stops early: frames after a rejection are still
/// classified, so unsolicited traffic in the same burst is not lost.
pub fn classify(frames: Vec<Frame>, request: &CommandRequest) -> Classification {
    let mut outcome = Classification {
        frames: frames.len(),
        ..Classification::default()
    };

    for frame in frames {
        let text = frame.into_text();

        if let Some(marker) = first_match(&text, &request.error_markers) {
            if outcome.rejection.is_none() {
                outcome.rejection = Some(Rejection {
                    marker: marker.to_string(),
                    response: text,
                });
            } else {
                debug!(frame = %text, "ignoring further error frame");
            }
            continue;
        }

        let claims_result = outcome.result.is_none()
            && request
                .success_marker
                .as_deref()
                .is_none_or(|marker| text.contains(marker));
        if claims_result {
            outcome.result = Some(text);
            continue;
        }

        if first_match(&text, &request.collect_markers).is_some() {
            outcome.information.push(text);
            continue;
        }

        trace!(frame = %text, "unsolicited frame");
        outcome.unsolicited.push(text);
    }

    outcome
}

impl Classification {
    /// Turn the outcome into the caller-facing result.
    ///
    /// A rejection wins over a claimed result.
    pub fn into_reply(self, request: &CommandRequest) -> Result<Reply> {
        if let Some(rejection) = self.rejection {
            return Err(ModemError::CommandRejected {
                command: request.command.clone(),
                marker: rejection.marker,
                response: rejection.response,
            });
        }

        match self.result {
            Some(result) => Ok(Reply {
                result,
                information: self.information,
            }),
            None => Err(ModemError::NoValidResponse {
                command: request.command.clone(),
                expected: request.success_marker.clone(),
                frames: self.frames,
            }),
        }
    }
}

fn first_match<'a>(text: &str, markers: &'a [String]) -> Option<&'a str> {
    markers
        .iter()
        .map(String::as_str)
        .find(|marker| text.contains(marker))
}
