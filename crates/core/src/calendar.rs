//! Working-day arithmetic shared by attendance and leave.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::CoreError;

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// A working day is a weekday that is not a public holiday.
pub fn is_working_day(date: NaiveDate, holidays: &HashSet<NaiveDate>) -> bool {
    !is_weekend(date) && !holidays.contains(&date)
}

/// Every date from `start` to `end`, inclusive. Empty when `end < start`.
pub fn dates_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Number of working days between `start` and `end`, inclusive.
pub fn working_days(start: NaiveDate, end: NaiveDate, holidays: &HashSet<NaiveDate>) -> i32 {
    dates_in_range(start, end)
        .into_iter()
        .filter(|d| is_working_day(*d, holidays))
        .count() as i32
}

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), CoreError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| CoreError::Validation(format!("Invalid month {year}-{month}")))?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last = next_month
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| CoreError::Validation(format!("Invalid month {year}-{month}")))?;
    Ok((first, last))
}

/// First and last day of a calendar year.
pub fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate), CoreError> {
    let (first, _) = month_bounds(year, 1)?;
    let (_, last) = month_bounds(year, 12)?;
    Ok((first, last))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekends_are_detected() {
        assert!(is_weekend(d(2026, 10, 17))); // Saturday
        assert!(is_weekend(d(2026, 10, 18))); // Sunday
        assert!(!is_weekend(d(2026, 10, 19)));
    }

    #[test]
    fn working_days_skip_weekends() {
        // Mon 2026-10-12 .. Sun 2026-10-18
        assert_eq!(working_days(d(2026, 10, 12), d(2026, 10, 18), &HashSet::new()), 5);
    }

    #[test]
    fn working_days_skip_holidays() {
        let holidays: HashSet<_> = [d(2026, 10, 14)].into_iter().collect();
        assert_eq!(working_days(d(2026, 10, 12), d(2026, 10, 16), &holidays), 4);
    }

    #[test]
    fn single_day_range() {
        assert_eq!(working_days(d(2026, 10, 19), d(2026, 10, 19), &HashSet::new()), 1);
        assert_eq!(working_days(d(2026, 10, 18), d(2026, 10, 18), &HashSet::new()), 0);
    }

    #[test]
    fn inverted_range_is_empty() {
        assert!(dates_in_range(d(2026, 10, 19), d(2026, 10, 18)).is_empty());
        assert_eq!(working_days(d(2026, 10, 19), d(2026, 10, 12), &HashSet::new()), 0);
    }

    #[test]
    fn month_bounds_handle_december_and_leap_years() {
        assert_eq!(
            month_bounds(2026, 12).unwrap(),
            (d(2026, 12, 1), d(2026, 12, 31))
        );
        assert_eq!(month_bounds(2028, 2).unwrap(), (d(2028, 2, 1), d(2028, 2, 29)));
        assert!(month_bounds(2026, 13).is_err());
    }

    #[test]
    fn year_bounds_cover_the_year() {
        assert_eq!(year_bounds(2026).unwrap(), (d(2026, 1, 1), d(2026, 12, 31)));
    }
}
