use anyhow::{anyhow, Result};
use chrono::{DateTime, SecondsFormat, Utc};

/// Timestamps are stored as RFC3339 TEXT with whole-second precision and a
/// `Z` suffix so that string comparison in SQL matches chronological order.
pub fn now_rfc3339() -> String {
    to_rfc3339(&Utc::now())
}

pub fn to_rfc3339(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| anyhow!("invalid RFC3339 datetime '{}': {}", value, e))
}

/// Renders a full date for user-facing messages, e.g. "07.08.2026 19:00".
pub fn format_date_ru(dt: &DateTime<Utc>) -> String {
    dt.format("%d.%m.%Y %H:%M").to_string()
}

/// Renders just the clock time, e.g. "19:00".
pub fn format_time(dt: &DateTime<Utc>) -> String {
    dt.format("%H:%M").to_string()
}
