pub const STATUS_RECORD: &[u8] =
    b"event: status\ndata: {\"message\": \"Searching for earnings data...\"}\n\n";
pub const KEEPALIVE_LINE: &[u8] = b": keepalive\n";
pub const EMPTY_LINE: &[u8] = b"\n";
pub const STATUS_DATA_LINE: &str = "data: {\"message\": \"Analyzing results...\"}";
pub const EVENT_LINE: &str = "event: status";

// guidance text with some emoji so multi-byte sequences straddle chunk boundaries
const GUIDANCE: &str = "Management raised full-year guidance \u{1F4C8} citing services growth, \
    record installed base and margin expansion \u{1F34E}. Supply constraints expected to ease \
    in the second half while FX remains a 2pt headwind \u{1F4B1}. ";

/// A `result` record carrying a realistic analysis payload with `repeat` copies of the
/// guidance text in `raw_analysis`
pub fn result_record(repeat: usize) -> Vec<u8> {
    let raw = GUIDANCE.repeat(repeat);
    format!(
        "event: result\ndata: {{\"ticker\": \"AAPL\", \"quarter\": \"Q4-2025\", \"has_reported\": true, \
         \"eps_estimate\": 2.35, \"eps_actual\": 2.45, \"eps_surprise_pct\": 4.26, \
         \"revenue_estimate\": 124000000000.0, \"revenue_actual\": 124300000000.0, \
         \"sentiment\": \"bullish\", \"sentiment_score\": 0.72, \
         \"raw_analysis\": {{\"notes\": \"{raw}\"}}}}\n\n"
    )
    .into_bytes()
}

/// `statuses` status records with keepalives in between, then one result
pub fn generate_analysis(statuses: usize, result_repeat: usize) -> Vec<u8> {
    let result = result_record(result_repeat);
    let mut buf = Vec::<u8>::with_capacity(
        (STATUS_RECORD.len() + KEEPALIVE_LINE.len() + EMPTY_LINE.len()) * statuses + result.len(),
    );

    for _ in 0..statuses {
        buf.extend_from_slice(STATUS_RECORD);
        buf.extend_from_slice(KEEPALIVE_LINE);
        buf.extend_from_slice(EMPTY_LINE);
    }
    buf.extend_from_slice(&result);
    buf
}
