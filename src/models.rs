//! JSON shapes returned by the earnings backend

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// When a company reports relative to the trading session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportTime {
    PreMarket,
    PostMarket,
    #[default]
    #[serde(other)]
    Unknown,
}

/// One scheduled earnings report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsEvent {
    pub id: i64,
    pub ticker: String,
    pub company_name: String,
    pub report_date: NaiveDate,
    #[serde(default)]
    pub report_time: ReportTime,
    #[serde(default)]
    pub fiscal_quarter: Option<String>,
    #[serde(default)]
    pub eps_estimate: Option<f64>,
    #[serde(default)]
    pub revenue_estimate: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
}

/// A Monday to Friday window of earnings events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekEarnings {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub events: Vec<EarningsEvent>,
}

/// Largest reporters of the previous and the current week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlights {
    pub last_week: WeekEarnings,
    pub this_week: WeekEarnings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub ticker: String,
    pub events: Vec<EarningsEvent>,
}

/// A ticker on the signed-in user's watch list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub ticker: String,
    #[serde(default)]
    pub company_name: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct FavoriteCheck {
    pub favorites: HashMap<String, bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

/// Typed view of an analysis payload, both the streamed result and the stored one.
///
/// Every field except `ticker` is optional because a fresh run only fills in what the
/// model could find.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsAnalysis {
    pub ticker: String,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub earnings_event_id: Option<i64>,
    #[serde(default)]
    pub quarter: Option<String>,
    #[serde(default)]
    pub has_reported: Option<bool>,
    #[serde(default)]
    pub eps_estimate: Option<f64>,
    #[serde(default)]
    pub eps_actual: Option<f64>,
    #[serde(default)]
    pub eps_surprise_pct: Option<f64>,
    #[serde(default)]
    pub revenue_estimate: Option<f64>,
    #[serde(default)]
    pub revenue_actual: Option<f64>,
    #[serde(default)]
    pub revenue_surprise_pct: Option<f64>,
    #[serde(default)]
    pub guidance_summary: Option<String>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
    #[serde(default)]
    pub price_reaction_pct: Option<f64>,
    #[serde(default)]
    pub raw_analysis: Option<Value>,
    #[serde(default)]
    pub analyzed_at: Option<NaiveDateTime>,
}
