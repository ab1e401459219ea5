//! Line tokenizer for the analysis event stream

use crate::constants::{DATA_PREFIX, EVENT_PREFIX, LF};

/// A complete line from the analysis stream, classified by its prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `event: <type>`, the value is trimmed
    Event(&'a str),
    /// `data: <json>`, the value is everything after the prefix, untouched
    Data(&'a str),
    /// Blank lines, comments, unknown fields and prefixes without the trailing space
    Other,
}

impl<'a> LineKind<'a> {
    /// Classify a line with its EOL already removed.
    ///
    /// The prefix match runs on the raw line so `  event: x` or `event:x` are [LineKind::Other].
    pub fn classify(line: &'a str) -> Self {
        if let Some(value) = line.strip_prefix(EVENT_PREFIX) {
            LineKind::Event(value.trim())
        } else if let Some(value) = line.strip_prefix(DATA_PREFIX) {
            LineKind::Data(value)
        } else {
            LineKind::Other
        }
    }
}

/// Takes every complete line out of `buffer`, leaving only the unterminated tail behind.
///
/// The returned block has its final LF removed, so `block.split('\n')` yields the lines in
/// order. Returns [None] if `buffer` holds no LF yet, in which case `buffer` is untouched.
pub fn take_complete_lines(buffer: &mut String) -> Option<String> {
    let last_eol = memchr::memrchr(LF, buffer.as_bytes())?;
    let remainder = buffer.split_off(last_eol + 1);
    let mut block = core::mem::replace(buffer, remainder);
    block.pop();
    Some(block)
}
