//! Typed client for the earnings backend's REST and analysis endpoints

use std::{collections::HashMap, sync::Arc};

use chrono::NaiveDate;
use http_body_util::BodyDataStream;
use reqwest::{Body, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::{
    analysis_stream::{AnalysisStream, collect_analysis},
    config::ClientConfig,
    errors::ApiError,
    event::AnalysisResult,
    models::{EarningsAnalysis, Favorite, FavoriteCheck, Highlights, SearchResults, WeekEarnings},
    session::Session,
    transport::{analysis_url, endpoint, open_analysis_stream, with_query},
};

/// Analysis stream straight off a [`reqwest`] response body
pub type ResponseAnalysisStream = AnalysisStream<BodyDataStream<Body>>;

/// Cheap to clone, clones share the connection pool and the [`Session`]
#[derive(Debug, Clone)]
pub struct EarningsClient {
    config: ClientConfig,
    http: Client,
    session: Arc<Session>,
}

impl EarningsClient {
    /// Anonymous client, favorites calls will come back empty or unauthorised
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        Self::with_session(config, Arc::new(Session::disabled()))
    }

    pub fn with_session(config: ClientConfig, session: Arc<Session>) -> Result<Self, ApiError> {
        let http = Client::builder().user_agent(&config.user_agent).build()?;
        Ok(Self {
            config,
            http,
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, segments: &[&str]) -> reqwest::Url {
        endpoint(&self.config.base_url, segments)
    }

    /// Request timeout and bearer token applied, then sent
    async fn send(&self, mut request: RequestBuilder) -> Result<Response, ApiError> {
        if let Some(timeout) = self.config.request_timeout {
            request = request.timeout(timeout);
        }
        if let Some(token) = self.session.token().await {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    pub async fn fetch_week_earnings(&self, date: Option<NaiveDate>) -> Result<WeekEarnings, ApiError> {
        self.fetch_week(&["calendar", "week"], date, "Failed to fetch earnings")
            .await
    }

    pub async fn fetch_next_week(&self, date: Option<NaiveDate>) -> Result<WeekEarnings, ApiError> {
        self.fetch_week(&["calendar", "week", "next"], date, "Failed to fetch next week")
            .await
    }

    pub async fn fetch_prev_week(&self, date: Option<NaiveDate>) -> Result<WeekEarnings, ApiError> {
        self.fetch_week(&["calendar", "week", "prev"], date, "Failed to fetch prev week")
            .await
    }

    async fn fetch_week(
        &self,
        segments: &[&str],
        date: Option<NaiveDate>,
        context: &'static str,
    ) -> Result<WeekEarnings, ApiError> {
        let date = date.map(|d| d.format("%Y-%m-%d").to_string());
        let pairs: Vec<(&str, &str)> = date.iter().map(|d| ("date", d.as_str())).collect();
        let url = with_query(self.url(segments), &pairs);
        let response = self.send(self.http.get(url)).await?;
        decode(check(response, context)?).await
    }

    /// Biggest reporters of last week and this week
    pub async fn fetch_highlights(&self) -> Result<Highlights, ApiError> {
        let response = self
            .send(self.http.get(self.url(&["calendar", "highlights"])))
            .await?;
        decode(check(response, "Failed to fetch highlights")?).await
    }

    pub async fn search_stock(&self, ticker: &str) -> Result<SearchResults, ApiError> {
        let url = with_query(self.url(&["calendar", "search"]), &[("ticker", ticker)]);
        let response = self.send(self.http.get(url)).await?;
        decode(check(response, "Search failed")?).await
    }

    /// Stored analysis for `ticker`, [None] if it was never analysed
    pub async fn get_analysis(&self, ticker: &str) -> Result<Option<EarningsAnalysis>, ApiError> {
        require_ticker(ticker)?;
        let response = self.send(self.http.get(self.url(&["analysis", ticker]))).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(check(response, "Failed to get analysis")?).await.map(Some)
    }

    /// Start an analysis run and return its events as a [`Stream`][futures_core::Stream].
    ///
    /// Resolves once the server has accepted the request. Dropping the stream closes the
    /// connection. The request goes out without an `Authorization` header.
    #[instrument(skip(self), level = "debug")]
    pub async fn analysis_stream(
        &self,
        ticker: &str,
        quarter: &str,
    ) -> Result<ResponseAnalysisStream, ApiError> {
        require_ticker(ticker)?;
        let url = analysis_url(&self.config.base_url, ticker, quarter);
        let body = open_analysis_stream(&self.http, url).await?;
        Ok(match self.config.stream_idle_timeout {
            Some(timeout) => AnalysisStream::with_idle_timeout(body, timeout),
            None => AnalysisStream::new(body),
        })
    }

    /// Run an analysis to completion.
    ///
    /// `on_status` sees every progress message in order before this resolves. Fails with
    /// the server's message on an `error` event and with "No analysis result received"
    /// when the stream ends without a result.
    pub async fn trigger_analysis<F>(
        &self,
        ticker: &str,
        quarter: &str,
        on_status: F,
    ) -> Result<AnalysisResult, ApiError>
    where
        F: FnMut(Option<&str>),
    {
        let stream = self.analysis_stream(ticker, quarter).await?;
        Ok(collect_analysis(stream, on_status).await?)
    }

    /// The signed-in user's favorites, newest first. Empty when not signed in.
    pub async fn list_favorites(&self) -> Result<Vec<Favorite>, ApiError> {
        let response = self.send(self.http.get(self.url(&["favorites", ""]))).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("not signed in, no favorites");
            return Ok(Vec::new());
        }
        decode(check(response, "Failed to fetch favorites")?).await
    }

    /// Which of `tickers` are favorited
    pub async fn check_favorites<T>(&self, tickers: &[T]) -> Result<HashMap<String, bool>, ApiError>
    where
        T: AsRef<str>,
    {
        if tickers.is_empty() {
            return Ok(HashMap::new());
        }
        let pairs: Vec<(&str, &str)> = tickers.iter().map(|t| ("tickers", t.as_ref())).collect();
        let url = with_query(self.url(&["favorites", "check"]), &pairs);
        let response = self.send(self.http.get(url)).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("not signed in, nothing favorited");
            return Ok(HashMap::new());
        }
        let checked: FavoriteCheck = decode(check(response, "Failed to check favorites")?).await?;
        Ok(checked.favorites)
    }

    /// Returns the new entry, or [None] if `ticker` already was a favorite
    pub async fn add_favorite(
        &self,
        ticker: &str,
        company_name: Option<&str>,
    ) -> Result<Option<Favorite>, ApiError> {
        require_ticker(ticker)?;
        let pairs: Vec<(&str, &str)> = company_name
            .map(|name| ("company_name", name))
            .into_iter()
            .collect();
        let url = with_query(self.url(&["favorites", ticker]), &pairs);
        let response = self.send(self.http.post(url)).await?;
        if response.status() == StatusCode::CONFLICT {
            debug!(ticker, "already a favorite");
            return Ok(None);
        }
        decode(check(response, "Failed to add favorite")?).await.map(Some)
    }

    /// Returns false if `ticker` was not a favorite
    pub async fn remove_favorite(&self, ticker: &str) -> Result<bool, ApiError> {
        require_ticker(ticker)?;
        let response = self.send(self.http.delete(self.url(&["favorites", ticker]))).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(ticker, "not a favorite");
            return Ok(false);
        }
        check(response, "Failed to remove favorite")?;
        Ok(true)
    }
}

fn require_ticker(ticker: &str) -> Result<(), ApiError> {
    match ticker.trim().is_empty() {
        true => Err(ApiError::InvalidTicker),
        false => Ok(()),
    }
}

fn check(response: Response, context: &'static str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    debug!(%status, url = %response.url(), context, "request failed");
    Err(ApiError::Status {
        status: status.as_u16(),
        context,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.bytes().await?;
    let mut deserializer = serde_json::Deserializer::from_slice(&body);
    Ok(serde_path_to_error::deserialize(&mut deserializer)?)
}
