//! HTTP side of an analysis run: building the request and exposing the body as bytes

use http_body_util::BodyDataStream;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{
    Body, Client, Response,
    header::{ACCEPT, HeaderValue},
};
use tracing::debug;
use url::Url;

use crate::{constants::EVENT_STREAM_MIME, errors::AnalysisError};

/// Characters left alone by `encodeURIComponent`, everything else gets escaped
pub(crate) const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// `base` with `segments` appended as path segments. An empty final segment leaves a
/// trailing slash.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    // base urls are validated by ClientConfig, cannot-be-a-base ones never get here
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Replace the query of `url` with `pairs`, values escaped like `encodeURIComponent`
pub(crate) fn with_query(mut url: Url, pairs: &[(&str, &str)]) -> Url {
    if pairs.is_empty() {
        url.set_query(None);
        return url;
    }
    let query = pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", utf8_percent_encode(value, COMPONENT)))
        .collect::<Vec<_>>()
        .join("&");
    url.set_query(Some(&query));
    url
}

/// `{base}/analysis/{ticker}?quarter={quarter}`
pub fn analysis_url(base: &Url, ticker: &str, quarter: &str) -> Url {
    with_query(endpoint(base, &["analysis", ticker]), &[("quarter", quarter)])
}

/// Convert a [`Response`] body into a stream of [`Bytes`][bytes::Bytes] chunks
pub fn response_to_stream(response: Response) -> BodyDataStream<Body> {
    BodyDataStream::new(Body::from(response))
}

/// Send the single analysis request and hand back its body once the server accepted it.
///
/// Never retried, a dropped analysis run cannot be resumed. A non-2xx status fails
/// without reading the body.
pub async fn open_analysis_stream(
    http: &Client,
    url: Url,
) -> Result<BodyDataStream<Body>, AnalysisError<reqwest::Error>> {
    debug!(%url, "opening analysis stream");
    let response = http
        .post(url)
        .header(ACCEPT, HeaderValue::from_static(EVENT_STREAM_MIME))
        .send()
        .await
        .map_err(AnalysisError::Transport)?;

    let status = response.status();
    if !status.is_success() {
        debug!(%status, "analysis request rejected");
        return Err(AnalysisError::Status {
            status: status.as_u16(),
        });
    }
    Ok(response_to_stream(response))
}
