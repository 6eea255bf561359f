// Day-granularity cron matching
//
// Expressions have exactly five whitespace-separated fields:
// `minute hour day-of-month month day-of-week` (0 = Sunday .. 6 = Saturday).
// A field is `*`, an integer, a comma-separated list of integers, or `*/N`.
// Hyphenated ranges are not supported. Minute and hour are accepted but never
// compared, since the engine fires at most once per calendar day.

use crate::dates::{days_in_range, validate_range};
use crate::errors::ValidationError;
use chrono::{Datelike, NaiveDate};

const FIELD_NAMES: [&str; 5] = ["minute", "hour", "day-of-month", "month", "day-of-week"];
const FIELD_BOUNDS: [(u32, u32); 5] = [(0, 59), (0, 23), (1, 31), (1, 12), (0, 6)];

/// Check a single cron field against a value
///
/// Unparsable fields never match, and `*/0` never matches.
pub fn match_field(field: &str, value: u32) -> bool {
    let field = field.trim();

    if field == "*" {
        return true;
    }

    if let Some(step) = field.strip_prefix("*/") {
        return match step.parse::<u32>() {
            Ok(n) if n > 0 => value % n == 0,
            _ => false,
        };
    }

    if field.contains(',') {
        return field
            .split(',')
            .any(|item| item.trim().parse::<u32>().map_or(false, |n| n == value));
    }

    field.parse::<u32>().map_or(false, |n| n == value)
}

/// Whether `expression` fires on `date`
///
/// Malformed expressions (field count other than five) return `false`.
pub fn cron_matches_date(expression: &str, date: NaiveDate) -> bool {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    if fields.len() != 5 {
        return false;
    }

    let day_of_month = date.day();
    let month = date.month();
    let day_of_week = date.weekday().num_days_from_sunday();

    match_field(fields[2], day_of_month)
        && match_field(fields[3], month)
        && match_field(fields[4], day_of_week)
}

/// Strict validation used when an expression is accepted from a user
pub fn validate_cron_expression(expression: &str) -> Result<(), ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidCronExpression {
        expression: expression.to_string(),
        reason,
    };

    let fields: Vec<&str> = expression.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(invalid(format!(
            "expected 5 fields (minute hour day-of-month month day-of-week), found {}",
            fields.len()
        )));
    }

    for ((field, name), (min, max)) in fields.iter().zip(FIELD_NAMES).zip(FIELD_BOUNDS) {
        validate_field(field, min, max).map_err(|reason| invalid(format!("{}: {}", name, reason)))?;
    }

    Ok(())
}

fn validate_field(field: &str, min: u32, max: u32) -> Result<(), String> {
    if field == "*" {
        return Ok(());
    }

    if field.contains('-') {
        return Err(format!("ranges are not supported ('{}')", field));
    }

    if let Some(step) = field.strip_prefix("*/") {
        return match step.parse::<u32>() {
            Ok(0) => Err("step must be greater than 0".to_string()),
            Ok(_) => Ok(()),
            Err(_) => Err(format!("invalid step '{}'", step)),
        };
    }

    for item in field.split(',') {
        let value: u32 = item
            .parse()
            .map_err(|_| format!("'{}' is not an integer", item))?;
        if value < min || value > max {
            return Err(format!("{} is outside {}..={}", value, min, max));
        }
    }

    Ok(())
}

/// Every date in `[start, end]` on which `expression` fires
pub fn matching_dates(
    expression: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<NaiveDate>, ValidationError> {
    validate_range(start, end)?;
    Ok(days_in_range(start, end)
        .filter(|d| cron_matches_date(expression, *d))
        .collect())
}

/// First date on or after `from`, within `horizon_days`, on which
/// `expression` fires
pub fn next_matching_date(expression: &str, from: NaiveDate, horizon_days: u32) -> Option<NaiveDate> {
    from.iter_days()
        .take(horizon_days as usize + 1)
        .find(|d| cron_matches_date(expression, *d))
}
