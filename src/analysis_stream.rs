use core::{
    future::Future,
    pin::{Pin, pin},
    task::{Context, Poll},
    time::Duration,
};
use std::collections::VecDeque;

use futures_core::Stream;
use futures_timer::Delay;
use futures_util::StreamExt;
use tracing::warn;

use crate::{
    decoder::AnalysisDecoder,
    errors::{AnalysisError, ProtocolError},
    event::{AnalysisEvent, AnalysisResult},
};

pin_project_lite::pin_project! {
    /// [`Stream`] that turns a stream of byte chunks from an analysis endpoint into
    /// [`AnalysisEvent`]s.
    ///
    /// Yields one [`AnalysisEvent::Status`] per `status` event in stream order, then a single
    /// [`AnalysisEvent::Result`] once the byte stream has ended, or a single error. Nothing
    /// follows the terminal item.
    #[project = AnalysisStreamProjection]
    #[derive(Debug)]
    pub struct AnalysisStream<S> {
        #[pin]
        stream: S,
        // None once a terminal item has been handed out
        decoder: Option<AnalysisDecoder>,
        queued: VecDeque<Option<String>>,
        failure: Option<ProtocolError>,
        idle_timeout: Option<Duration>,
        delay: Option<Delay>,
    }
}

impl<S> AnalysisStream<S> {
    /// Create a new [`AnalysisStream`] from a stream of [`AsRef<[u8]>`][AsRef] with no timeout
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            decoder: Some(AnalysisDecoder::new()),
            queued: VecDeque::new(),
            failure: None,
            idle_timeout: None,
            delay: None,
        }
    }

    /// Like [`AnalysisStream::new`] but fails with [`AnalysisError::Timeout`] when the
    /// underlying stream stays silent for longer than `timeout`
    pub fn with_idle_timeout(stream: S, timeout: Duration) -> Self {
        let mut this = Self::new(stream);
        this.idle_timeout = Some(timeout);
        this
    }

    /// Whether the terminal item has already been yielded
    pub fn is_terminated(&self) -> bool {
        self.decoder.is_none() && self.queued.is_empty() && self.failure.is_none()
    }
}

impl<S, E, B> Stream for AnalysisStream<S>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    type Item = Result<AnalysisEvent, AnalysisError<E>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            // statuses decoded before a failure still go out first
            if let Some(message) = this.queued.pop_front() {
                return Poll::Ready(Some(Ok(AnalysisEvent::Status(message))));
            }
            if let Some(failure) = this.failure.take() {
                return Poll::Ready(Some(Err(failure.into())));
            }
            let Some(decoder) = this.decoder.as_mut() else {
                return Poll::Ready(None);
            };

            let next = match this.stream.as_mut().poll_next(cx) {
                Poll::Ready(next) => {
                    *this.delay = None;
                    next
                }
                Poll::Pending => {
                    if let Some(timeout) = *this.idle_timeout {
                        let delay = this.delay.get_or_insert_with(|| Delay::new(timeout));
                        if Pin::new(delay).poll(cx).is_ready() {
                            warn!(?timeout, "analysis stream idle, giving up");
                            *this.delay = None;
                            *this.decoder = None;
                            return Poll::Ready(Some(Err(AnalysisError::Timeout(timeout))));
                        }
                    }
                    return Poll::Pending;
                }
            };

            match next {
                Some(Ok(chunk)) => {
                    let queued = &mut *this.queued;
                    let mut on_status =
                        |message: Option<&str>| queued.push_back(message.map(str::to_owned));
                    if let Err(failure) = decoder.feed(chunk.as_ref(), &mut on_status) {
                        *this.failure = Some(failure);
                        *this.decoder = None;
                    }
                }
                Some(Err(e)) => {
                    *this.decoder = None;
                    return Poll::Ready(Some(Err(AnalysisError::Transport(e))));
                }
                None => {
                    let Some(decoder) = this.decoder.take() else {
                        return Poll::Ready(None);
                    };
                    return Poll::Ready(Some(
                        decoder
                            .finish()
                            .map(AnalysisEvent::Result)
                            .map_err(AnalysisError::from),
                    ));
                }
            }
        }
    }
}

/// Drive `stream` to completion, handing every status message to `on_status` in order,
/// and resolve with the terminal result.
pub async fn collect_analysis<S, E, B, F>(
    stream: AnalysisStream<S>,
    mut on_status: F,
) -> Result<AnalysisResult, AnalysisError<E>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    F: FnMut(Option<&str>),
{
    let mut stream = pin!(stream);
    while let Some(event) = stream.next().await {
        match event? {
            AnalysisEvent::Status(message) => on_status(message.as_deref()),
            AnalysisEvent::Result(result) => return Ok(result),
        }
    }
    Err(ProtocolError::NoResult.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::prelude::*;
    use serde_json::json;

    fn chunks(parts: &[&'static str]) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
        futures::stream::iter(
            parts
                .iter()
                .copied()
                .map(|part| Ok(Bytes::from_static(part.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn yields_statuses_then_result() {
        let events = AnalysisStream::new(chunks(&[
            "event: status\ndata: {\"message\":\"loading\"}\n\n",
            "event: result\ndata: {\"ticker\":\"AAPL\"}\n\n",
        ]))
        .try_collect::<Vec<_>>()
        .await
        .unwrap();

        assert_eq!(
            events,
            vec![
                AnalysisEvent::Status(Some("loading".to_owned())),
                AnalysisEvent::Result(json!({"ticker": "AAPL"}).into()),
            ]
        );
    }

    #[tokio::test]
    async fn collect_calls_back_in_order() {
        let mut seen = Vec::new();
        let result = collect_analysis(
            AnalysisStream::new(chunks(&[
                "event: status\ndata: {\"message\":\"Checking cache...\"}\nevent: sta",
                "tus\ndata: {\"message\":\"Searching for earnings data...\"}\n",
                "event: result\ndata: {\"ticker\":\"MSFT\",\"eps_actual\":3.1}\n",
            ])),
            |message| seen.push(message.unwrap_or_default().to_owned()),
        )
        .await
        .unwrap();

        assert_eq!(
            seen,
            vec!["Checking cache...", "Searching for earnings data..."]
        );
        assert_eq!(result.as_value()["ticker"], "MSFT");
    }

    #[tokio::test]
    async fn statuses_before_error_are_delivered() {
        let items = AnalysisStream::new(chunks(&[
            "event: status\ndata: {\"message\":\"one\"}\nevent: error\ndata: {\"error\":\"quota exceeded\"}\nevent: status\ndata: {\"message\":\"two\"}\n",
            "event: result\ndata: {}\n",
        ]))
        .collect::<Vec<_>>()
        .await;

        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].as_ref().unwrap(),
            &AnalysisEvent::Status(Some("one".to_owned()))
        );
        let err = items[1].as_ref().unwrap_err();
        assert_eq!(err.server_message(), Some("quota exceeded"));
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[tokio::test]
    async fn no_result_error() {
        let err = collect_analysis(AnalysisStream::new(chunks(&["\n\nsomething else\n"])), |_| {
            panic!("no status expected")
        })
        .await
        .unwrap_err();
        assert!(err.is_no_result());
        assert_eq!(err.to_string(), "No analysis result received");
    }

    #[tokio::test]
    async fn transport_error_ends_stream() {
        let stream = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"event: status\ndata: {\"message\":\"a\"}\n")),
            Err("connection reset"),
            Ok(Bytes::from_static(b"event: result\ndata: {}\n")),
        ]);
        let items = AnalysisStream::new(stream).collect::<Vec<_>>().await;
        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(AnalysisError::Transport("connection reset"))));
    }

    #[tokio::test]
    async fn nothing_after_terminal_item() {
        let mut stream = AnalysisStream::new(chunks(&["event: result\ndata: {\"x\":1}\n"]));
        assert!(matches!(stream.next().await, Some(Ok(AnalysisEvent::Result(_)))));
        assert!(stream.is_terminated());
        assert!(stream.next().await.is_none());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn idle_timeout_fires() {
        let silent = chunks(&["event: status\ndata: {\"message\":\"started\"}\n"])
            .chain(futures::stream::pending());
        let items = AnalysisStream::with_idle_timeout(silent, Duration::from_millis(20))
            .collect::<Vec<_>>()
            .await;

        assert_eq!(items.len(), 2);
        assert!(matches!(
            items[1],
            Err(AnalysisError::Timeout(timeout)) if timeout == Duration::from_millis(20)
        ));
    }

    #[tokio::test]
    async fn timeout_does_not_affect_prompt_streams() {
        let result = collect_analysis(
            AnalysisStream::with_idle_timeout(
                chunks(&["event: result\ndata: {\"x\":1}\n"]),
                Duration::from_millis(5),
            ),
            |_| {},
        )
        .await
        .unwrap();
        assert_eq!(result.into_inner(), json!({"x": 1}));
    }
}
