use bytes_utils::Str;

pub(crate) const LF: u8 = b'\n';

// field prefixes are matched against the raw line, space included
pub(crate) const EVENT_PREFIX: &str = "event: ";
pub(crate) const DATA_PREFIX: &str = "data: ";

pub(crate) const STATUS_EVENT: &str = "status";
pub(crate) const RESULT_EVENT: &str = "result";
pub(crate) const ERROR_EVENT: &str = "error";

pub(crate) const MESSAGE_FIELD: &str = "message";
pub(crate) const ERROR_FIELD: &str = "error";

pub(crate) const GENERIC_FAILURE: &str = "Analysis failed";
pub(crate) const NO_RESULT: &str = "No analysis result received";

pub(crate) const EVENT_STREAM_MIME: &str = "text/event-stream";

pub(crate) const EMPTY_STR: Str = Str::from_static("");
