//! Recency and platform filter.
//!
//! Keeps devices whose `Platform` equals the target tag exactly and whose
//! `LastSeen` falls inside a trailing window ending at an explicit `now`.
//!
//! `LastSeen` is parsed once here and carried forward in [`ActiveDevice`], so
//! the row formatter derives its date column from the same value the
//! recency check used. The parsed value keeps the record's own offset: the
//! recency check compares in UTC, the date column shows the calendar day as
//! written. Records whose timestamp is missing or unparseable are excluded
//! and counted, never fatal.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::devices::DeviceRecord;

/// Naive layouts the API has been seen to emit. Space and `T` separators,
/// with and without fractional seconds.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// A device that passed the filter, with its parsed last-seen time.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveDevice {
    /// The record as fetched.
    pub record: DeviceRecord,
    /// `LastSeen`, parsed. Offset-less values carry `+00:00`.
    pub last_seen: DateTime<FixedOffset>,
}

/// Result of one filter pass.
#[derive(Debug, Default)]
pub struct FilterOutcome {
    /// Surviving devices, in input order.
    pub retained: Vec<ActiveDevice>,
    /// Target-platform devices dropped for a missing or unparseable `LastSeen`.
    pub unparseable: usize,
}

/// Parses a `LastSeen` value.
///
/// RFC 3339 values keep their offset. Offset-less timestamps are taken as
/// UTC, the clock `now` is read in. A bare date means midnight.
pub fn parse_last_seen(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    Some(naive.and_utc().fixed_offset())
}

/// Keeps devices on `platform` last seen at or after `now - window`.
///
/// The comparison is inclusive: a device seen exactly `window` ago is kept.
/// A window reaching past the earliest representable time has no lower bound.
pub fn filter_recent(
    devices: Vec<DeviceRecord>,
    platform: &str,
    window: Duration,
    now: NaiveDateTime,
) -> FilterOutcome {
    let cutoff = now.checked_sub_signed(window);
    let mut outcome = FilterOutcome::default();

    for record in devices {
        if record.platform.as_deref() != Some(platform) {
            continue;
        }
        let Some(last_seen) = record.last_seen.as_deref().and_then(parse_last_seen) else {
            warn!(
                serial = record.serial_number.as_deref().unwrap_or(""),
                last_seen = record.last_seen.as_deref().unwrap_or(""),
                "skipping device with unparseable LastSeen"
            );
            outcome.unparseable += 1;
            continue;
        };
        if cutoff.is_none_or(|cutoff| last_seen.naive_utc() >= cutoff) {
            outcome.retained.push(ActiveDevice { record, last_seen });
        }
    }

    outcome
}
