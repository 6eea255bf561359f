// Calendar-day arithmetic and range validation
//
// Every function here works on `NaiveDate` values that are interpreted as UTC
// calendar days. There is no wall-clock access; callers always pass the
// reference date explicitly.

use crate::errors::ValidationError;
use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;

/// Largest allowed distance, in days, between the start and end of a
/// generation range
pub const MAX_GENERATION_SPAN_DAYS: i64 = 90;

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_iso_date(field: &str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        ValidationError::InvalidFieldValue {
            field: field.to_string(),
            reason: format!("'{}' is not an ISO date: {}", value, e),
        }
    })
}

/// Shift `date` by a signed number of calendar days
pub fn add_days(date: NaiveDate, offset_days: i64) -> Result<NaiveDate, ValidationError> {
    let shifted = if offset_days >= 0 {
        date.checked_add_days(Days::new(offset_days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(offset_days.unsigned_abs()))
    };

    shifted.ok_or_else(|| ValidationError::InvalidFieldValue {
        field: "offset_days".to_string(),
        reason: format!("{} shifted by {} days is out of range", date, offset_days),
    })
}

/// Validate a generation range: `start <= end` and at most
/// [`MAX_GENERATION_SPAN_DAYS`] days apart
pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if end < start {
        return Err(ValidationError::InvalidRange {
            start,
            end,
            reason: "end date is before start date".to_string(),
        });
    }

    let span = (end - start).num_days();
    if span > MAX_GENERATION_SPAN_DAYS {
        return Err(ValidationError::InvalidRange {
            start,
            end,
            reason: format!(
                "range covers {} days, the limit is {}",
                span, MAX_GENERATION_SPAN_DAYS
            ),
        });
    }

    Ok(())
}

/// Every calendar day in `[start, end]`, in order
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

/// Human-readable form used in bundle titles, e.g. `March 10, 2026`
pub fn human_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// The calendar day `now` falls on in `timezone`
pub fn local_date(now: DateTime<Utc>, timezone: Tz) -> NaiveDate {
    now.with_timezone(&timezone).date_naive()
}
