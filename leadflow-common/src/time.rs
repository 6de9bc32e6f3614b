//! Timestamp and send-window time utilities

use crate::{Error, Result};
use chrono::{DateTime, Local, NaiveTime, TimeZone, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current UTC timestamp as RFC3339 text (database representation)
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Parse a send-window boundary in "HH:MM" form (seconds tolerated and ignored)
pub fn parse_window_time(value: &str) -> Result<NaiveTime> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|e| Error::InvalidInput(format!("Invalid window time {:?}: {}", value, e)))
}

/// UTC instant of the most recent local midnight.
///
/// The daily send count is scoped to the sender's calendar day, so the floor
/// is local midnight converted to UTC for comparison against stored RFC3339
/// timestamps.
pub fn local_midnight_utc() -> DateTime<Utc> {
    let midnight = Local::now().date_naive().and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&midnight).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        // DST gap exactly at midnight: fall back to the UTC reading
        None => Utc.from_utc_datetime(&midnight),
    }
}
