//! Items produced while an analysis stream is consumed

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Terminal payload of an analysis run.
///
/// The backend owns its shape, so it is kept as raw JSON. Use [AnalysisResult::parse] to
/// view it as a typed value such as [EarningsAnalysis][crate::models::EarningsAnalysis].
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult(Value);

impl AnalysisResult {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Deserialise into `T`, errors carry the JSON path of the offending field via [serde_path_to_error]
    pub fn parse<T>(&self) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
    where
        T: DeserializeOwned,
    {
        serde_path_to_error::deserialize(&self.0)
    }
}

impl From<Value> for AnalysisResult {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Item from an [AnalysisStream][crate::analysis_stream::AnalysisStream]
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisEvent {
    /// Progress update, carries the payload's `message` field when it is a string
    Status(Option<String>),
    /// The terminal result, always the last item of a successful stream
    Result(AnalysisResult),
}
