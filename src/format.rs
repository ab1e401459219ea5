//! Display helpers for calendar views

use chrono::{Days, NaiveDate, Utc, Weekday};

use indexmap::IndexMap;

use crate::models::{EarningsEvent, ReportTime};

const NOT_AVAILABLE: &str = "N/A";

/// Monday and Friday of the trading week containing `date`. Sundays belong to the week before.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date.week(Weekday::Mon).first_day();
    (monday, monday + Days::new(4))
}

/// `Mon, Feb 16`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

/// `Feb 16`
pub fn format_date_short(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Buckets events by report date. Dates come out in the order they first appear and
/// events keep their relative order within a day.
pub fn group_by_date(events: &[EarningsEvent]) -> IndexMap<NaiveDate, Vec<&EarningsEvent>> {
    let mut groups: IndexMap<NaiveDate, Vec<&EarningsEvent>> = IndexMap::new();
    for event in events {
        groups.entry(event.report_date).or_default().push(event);
    }
    groups
}

/// The five trading days starting at `week_start`
pub fn days_of_week(week_start: NaiveDate) -> [NaiveDate; 5] {
    core::array::from_fn(|offset| week_start + Days::new(offset as u64))
}

/// Compares against the current UTC date
pub fn is_today(date: NaiveDate) -> bool {
    date == Utc::now().date_naive()
}

pub fn format_report_time(time: ReportTime) -> &'static str {
    match time {
        ReportTime::PreMarket => "Before Market",
        ReportTime::PostMarket => "After Market",
        ReportTime::Unknown => "TBD",
    }
}

/// Dollar amount scaled to trillions, billions or millions with two decimals
pub fn format_large_number(num: Option<f64>) -> String {
    let Some(num) = num else {
        return NOT_AVAILABLE.to_owned();
    };
    let abs = num.abs();
    if abs >= 1e12 {
        format!("${:.2}T", num / 1e12)
    } else if abs >= 1e9 {
        format!("${:.2}B", num / 1e9)
    } else if abs >= 1e6 {
        format!("${:.2}M", num / 1e6)
    } else {
        format!("${num:.2}")
    }
}

/// Signed percentage, `+4.26%` or `-2.10%`
pub fn format_percent(num: Option<f64>) -> String {
    let Some(num) = num else {
        return NOT_AVAILABLE.to_owned();
    };
    // -0.0 would otherwise print as "+-0.00%"
    let num = if num == 0.0 { 0.0 } else { num };
    let sign = if num >= 0.0 { "+" } else { "" };
    format!("{sign}{num:.2}%")
}
