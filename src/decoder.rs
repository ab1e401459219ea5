//! Incremental decoder for the analysis event protocol.
//!
//! The server speaks a reduced SSE dialect: every record is one `event: <type>` line
//! followed by one `data: <json>` line.
//!
//! ```text
//! event: status
//! data: {"message": "Searching for earnings data..."}
//!
//! event: result
//! data: {"ticker": "AAPL", ...}
//! ```
//!
//! [`AnalysisDecoder`] is fed raw chunks in arrival order, dispatches `status` payloads
//! to a callback as soon as their data line is complete and keeps the `result` payload
//! until [`AnalysisDecoder::finish`]. An `error` event fails the current
//! [`feed`][AnalysisDecoder::feed] call immediately.

use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::{
    constants::{
        ERROR_EVENT, ERROR_FIELD, GENERIC_FAILURE, MESSAGE_FIELD, RESULT_EVENT, STATUS_EVENT,
    },
    errors::ProtocolError,
    event::AnalysisResult,
    parser::{LineKind, take_complete_lines},
    utf8::Utf8Decoder,
};

/// Where the decoder is within an event/data record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// No event type seen since the last dispatch
    AwaitingType,
    /// An event type is pending, waiting for its data line
    AwaitingData,
}

/// Per-invocation state of one analysis stream. Never share one between streams.
#[derive(Debug, Default)]
pub struct AnalysisDecoder {
    utf8: Utf8Decoder,
    // decoded text after the last LF seen
    buffer: String,
    pending_event: Option<String>,
    result: Option<AnalysisResult>,
}

impl AnalysisDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DecoderState {
        match self.pending_event {
            Some(_) => DecoderState::AwaitingData,
            None => DecoderState::AwaitingType,
        }
    }

    /// The event type waiting for its data line, if any
    pub fn pending_event(&self) -> Option<&str> {
        self.pending_event.as_deref()
    }

    /// Most recent `result` payload seen so far
    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// Decoded text that does not form a complete line yet
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Decode `chunk`, then process every line it completes in order.
    ///
    /// `on_status` receives the `message` of each `status` payload (None when the payload
    /// has no string `message`). Returns early, without looking at later lines, on an
    /// `error` event or a `data:` line that is not valid JSON.
    pub fn feed<F>(&mut self, chunk: &[u8], on_status: &mut F) -> Result<(), ProtocolError>
    where
        F: FnMut(Option<&str>),
    {
        let text = self.utf8.decode(chunk);
        self.buffer.push_str(&text);

        let Some(lines) = take_complete_lines(&mut self.buffer) else {
            return Ok(());
        };

        for line in lines.split('\n') {
            self.handle_line(line, on_status)?;
        }
        Ok(())
    }

    fn handle_line<F>(&mut self, line: &str, on_status: &mut F) -> Result<(), ProtocolError>
    where
        F: FnMut(Option<&str>),
    {
        match LineKind::classify(line) {
            LineKind::Event(event_type) => {
                // an empty type cancels whatever was pending
                self.pending_event = (!event_type.is_empty()).then(|| event_type.to_owned());
            }
            LineKind::Data(data) => {
                let Some(event_type) = self.pending_event.take() else {
                    trace!("data line without an event type, dropped");
                    return Ok(());
                };
                let payload: Value =
                    serde_json::from_str(data).map_err(ProtocolError::MalformedPayload)?;
                self.dispatch(&event_type, payload, on_status)?;
            }
            LineKind::Other => {}
        }
        Ok(())
    }

    fn dispatch<F>(
        &mut self,
        event_type: &str,
        payload: Value,
        on_status: &mut F,
    ) -> Result<(), ProtocolError>
    where
        F: FnMut(Option<&str>),
    {
        match event_type {
            STATUS_EVENT => {
                let message = payload.get(MESSAGE_FIELD).and_then(Value::as_str);
                debug!(message, "analysis status");
                on_status(message);
            }
            RESULT_EVENT => {
                if payload.is_null() {
                    warn!("result event with a null payload ignored");
                    return Ok(());
                }
                if self.result.is_some() {
                    warn!("stream sent more than one result, keeping the latest");
                }
                debug!("analysis result received");
                self.result = Some(AnalysisResult::new(payload));
            }
            ERROR_EVENT => {
                let message = error_message(&payload);
                debug!(%message, "analysis error event");
                return Err(ProtocolError::Server(message));
            }
            other => trace!(event_type = other, "unknown event type ignored"),
        }
        Ok(())
    }

    /// End of stream. Succeeds with the last recorded result.
    ///
    /// An unterminated final line is discarded, it never formed a complete record.
    pub fn finish(mut self) -> Result<AnalysisResult, ProtocolError> {
        let tail = self.utf8.finish();
        if !self.buffer.is_empty() || !tail.is_empty() {
            trace!(
                bytes = self.buffer.len() + tail.len(),
                "discarding unterminated line at end of stream"
            );
        }
        self.result.ok_or(ProtocolError::NoResult)
    }
}

fn error_message(payload: &Value) -> String {
    match payload.get(ERROR_FIELD) {
        Some(Value::String(message)) if !message.is_empty() => message.clone(),
        None | Some(Value::Null) | Some(Value::Bool(false)) | Some(Value::String(_)) => {
            GENERIC_FAILURE.to_owned()
        }
        Some(other) => other.to_string(),
    }
}
