use chrono::{DateTime, Datelike, SubsecRound, Utc};

use crate::error::{Result, SwapError};

pub const MAX_TITLE_CHARS: usize = 100;

/// Trim and length-check an event title. Returns the trimmed title.
pub fn title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(SwapError::Validation("title must not be empty".to_string()));
    }
    let len = title.chars().count();
    if len > MAX_TITLE_CHARS {
        return Err(SwapError::Validation(format!(
            "title is {len} characters (max {MAX_TITLE_CHARS})"
        )));
    }
    Ok(title.to_string())
}

/// Drop sub-microsecond digits; instants are stored at microsecond
/// precision, so anything finer would not survive a read back.
pub fn stored_precision(t: DateTime<Utc>) -> DateTime<Utc> {
    t.trunc_subsecs(6)
}

/// `end` must be strictly after `start`.
///
/// Years are limited to four digits so stored timestamps keep a fixed width
/// and compare correctly as text.
pub fn time_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    for t in [start, end] {
        if !(1..=9999).contains(&t.year()) {
            return Err(SwapError::Validation(format!("time out of range: {t}")));
        }
    }
    if end <= start {
        return Err(SwapError::Validation(
            "end_time must be after start_time".to_string(),
        ));
    }
    Ok(())
}
