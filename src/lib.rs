//! Client for an earnings-calendar backend, built around a streaming decoder for its
//! per-ticker analysis endpoint.
//!
//! An analysis run is one `POST` answered with a reduced
//! [Server-Sent Events](https://html.spec.whatwg.org/multipage/server-sent-events.html) stream:
//! any number of `status` events with progress messages, then a single `result` event, or an
//! `error` event that aborts the run.
//!
//! - [`AnalysisDecoder`] - a push style decoder. Feed it byte chunks, get status callbacks,
//!   [`finish`][AnalysisDecoder::finish] it for the result.
//! - [`AnalysisStream`] - a [`Stream`][futures_core::Stream] adapter that turns any
//!   `Stream<Item = Result<impl AsRef<[u8]>, E>>` into [`AnalysisEvent`]s.
//! - [`EarningsClient`] (requires `reqwest` feature) - typed wrappers for the calendar, search,
//!   analysis and favorites endpoints.
//! - [`Session`][session::Session] - the signed-in user, passed explicitly to the client.
//! - [`format`] - date and number helpers for calendar views.
//!
//! # Quick start with `reqwest`
//!
//! ```ignore
//! use earnings_client::{ClientConfig, EarningsClient};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = EarningsClient::new(ClientConfig::from_env()?)?;
//! let result = client
//!     .trigger_analysis("AAPL", "Q4-2025", |message| {
//!         println!("{}", message.unwrap_or("working..."));
//!     })
//!     .await?;
//!
//! let analysis: earnings_client::models::EarningsAnalysis = result.parse()?;
//! println!("{:?}", analysis.sentiment);
//! # Ok(())
//! # }
//! ```
//!
//! # Pulling events yourself
//!
//! [`EarningsClient::analysis_stream`] hands back the [`AnalysisStream`] instead of driving it,
//! dropping it cancels the run:
//!
//! ```ignore
//! use futures::StreamExt;
//! use earnings_client::AnalysisEvent;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let client = earnings_client::EarningsClient::new(Default::default())?;
//! let mut stream = client.analysis_stream("MSFT", "Q2-2026").await?;
//!
//! while let Some(event) = stream.next().await {
//!     match event? {
//!         AnalysisEvent::Status(message) => println!("{message:?}"),
//!         AnalysisEvent::Result(result) => println!("{}", result.as_value()),
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Using `AnalysisStream` directly
//!
//! If you already have a byte stream you can use [`AnalysisStream`] without the `reqwest`
//! feature:
//!
//! ```rust
//! use bytes::Bytes;
//! use earnings_client::{AnalysisStream, collect_analysis};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let chunks = vec![
//!     Ok::<_, std::io::Error>(Bytes::from("event: status\ndata: {\"message\":\"Checking cache...\"}\n\n")),
//!     Ok(Bytes::from("event: result\ndata: {\"ticker\":\"AAPL\"}\n\n")),
//! ];
//! let stream = AnalysisStream::new(futures::stream::iter(chunks));
//!
//! let result = collect_analysis(stream, |message| println!("{message:?}"))
//!     .await
//!     .unwrap();
//! assert_eq!(result.as_value()["ticker"], "AAPL");
//! # }
//! ```
//!
//! # Feature flags
//!
//! | Feature | Default | Description |
//! | --- | --- | --- |
//! | `reqwest` | on | Provides [`EarningsClient`], [`ClientConfig`] and the HTTP transport. |
//!
//! Without it the crate still provides the decoder, the stream adapter, the models, the
//! session types and the formatting helpers.

pub mod analysis_stream;
pub(crate) mod constants;
pub mod decoder;
pub mod errors;
pub mod event;
pub mod format;
pub mod models;
pub mod parser;
pub mod session;
pub mod utf8;

#[cfg(feature = "reqwest")]
pub mod api;
#[cfg(feature = "reqwest")]
pub mod config;
#[cfg(feature = "reqwest")]
pub mod transport;

pub use analysis_stream::{AnalysisStream, collect_analysis};
pub use decoder::AnalysisDecoder;
pub use errors::{AnalysisError, ProtocolError};
pub use event::{AnalysisEvent, AnalysisResult};

#[cfg(feature = "reqwest")]
pub use api::EarningsClient;
#[cfg(feature = "reqwest")]
pub use config::ClientConfig;
#[cfg(feature = "reqwest")]
pub use errors::ApiError;
#[cfg(feature = "reqwest")]
pub use transport::response_to_stream;
