// Property-based tests for day-granularity cron matching

use chrono::{Datelike, Duration, NaiveDate};
use common::cron::{
    cron_matches_date, match_field, matching_dates, next_matching_date, validate_cron_expression,
};
use proptest::prelude::*;

fn any_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..20_000).prop_map(|offset| NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + Duration::days(offset))
}

proptest! {
    /// The all-wildcard expression fires every day
    #[test]
    fn property_wildcard_matches_every_day(date in any_date()) {
        prop_assert!(cron_matches_date("* * * * *", date));
    }

    /// `*/N` matches exactly the multiples of N
    #[test]
    fn property_step_matches_multiples(step in 1u32..40, value in 0u32..100) {
        prop_assert_eq!(match_field(&format!("*/{}", step), value), value % step == 0);
    }

    /// A list matches exactly its members
    #[test]
    fn property_list_matches_members(
        members in proptest::collection::vec(1u32..32, 1..6),
        value in 1u32..32,
    ) {
        let field = members
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        prop_assert_eq!(match_field(&field, value), members.contains(&value));
    }

    /// Minute and hour never influence the result
    #[test]
    fn property_time_fields_are_ignored(
        minute in 0u32..60,
        hour in 0u32..24,
        date in any_date(),
    ) {
        let expression = format!("{} {} {} * *", minute, hour, date.day());
        prop_assert!(cron_matches_date(&expression, date));
    }

    /// A single weekday fires exactly once in any seven consecutive days
    #[test]
    fn property_weekday_fires_once_a_week(weekday in 0u32..7, start in any_date()) {
        let expression = format!("0 9 * * {}", weekday);
        let dates = matching_dates(&expression, start, start + Duration::days(6)).unwrap();
        prop_assert_eq!(dates.len(), 1);
        prop_assert_eq!(dates[0].weekday().num_days_from_sunday(), weekday);
    }

    /// Preview results stay inside the range and all match
    #[test]
    fn property_matching_dates_are_contained(
        day in 1u32..29,
        start in any_date(),
        span in 0i64..=90,
    ) {
        let expression = format!("0 0 {} * *", day);
        let end = start + Duration::days(span);
        let dates = matching_dates(&expression, start, end).unwrap();
        for d in &dates {
            prop_assert!(*d >= start && *d <= end);
            prop_assert!(cron_matches_date(&expression, *d));
        }
        prop_assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    /// The next match is the first entry of the preview starting at the same day
    #[test]
    fn property_next_match_agrees_with_preview(weekday in 0u32..7, from in any_date()) {
        let expression = format!("30 7 * * {}", weekday);
        let next = next_matching_date(&expression, from, 30).unwrap();
        let preview = matching_dates(&expression, from, from + Duration::days(30)).unwrap();
        prop_assert_eq!(Some(next), preview.first().copied());
    }

    /// Hyphenated ranges never validate
    #[test]
    fn property_ranges_are_rejected(low in 1u32..15, high in 15u32..29) {
        let expression = format!("0 9 {}-{} * *", low, high);
        prop_assert!(validate_cron_expression(&expression).is_err());
    }

    /// Unparsable fields never match
    #[test]
    fn property_garbage_never_matches(field in "[a-z]{1,6}", value in 0u32..60) {
        prop_assert!(!match_field(&field, value));
    }
}

#[test]
fn test_zero_step_never_matches() {
    assert!((0..60).all(|v| !match_field("*/0", v)));
    assert!(validate_cron_expression("*/0 * * * *").is_err());
}
