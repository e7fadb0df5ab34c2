//! Business-day calendars.
//!
//! The scoring engine only asks one question of a calendar: is this date a
//! working day? Streak continuation is derived from that answer.

mod holidays;

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub use holidays::{holiday_name, is_national_holiday};

/// How far back [`list_business_days`] searches.
pub const BUSINESS_DAY_LOOKBACK_DAYS: i64 = 14;

/// Answers whether a date is a working day.
pub trait BusinessCalendar: Send + Sync {
    fn is_business_day(&self, date: NaiveDate) -> bool;
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Monday to Friday, nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekdayCalendar;

impl BusinessCalendar for WeekdayCalendar {
    fn is_business_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date)
    }
}

/// Japanese office calendar.
///
/// Closed on weekends, national holidays, the New Year break (Jan 1-3),
/// New Year's Eve, and any extra closure dates from configuration.
#[derive(Debug, Clone, Default)]
pub struct JapaneseCalendar {
    extra_closures: BTreeSet<NaiveDate>,
}

impl JapaneseCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_closures(closures: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            extra_closures: closures.into_iter().collect(),
        }
    }

    fn is_company_closure(&self, date: NaiveDate) -> bool {
        matches!((date.month(), date.day()), (1, 1..=3) | (12, 31))
            || self.extra_closures.contains(&date)
    }
}

impl BusinessCalendar for JapaneseCalendar {
    fn is_business_day(&self, date: NaiveDate) -> bool {
        !(is_weekend(date) || is_national_holiday(date) || self.is_company_closure(date))
    }
}

/// The latest business day strictly before `date`, within the look-back.
pub fn previous_business_day(calendar: &dyn BusinessCalendar, date: NaiveDate) -> Option<NaiveDate> {
    (1..=BUSINESS_DAY_LOOKBACK_DAYS)
        .map(|offset| date - Duration::days(offset))
        .find(|day| calendar.is_business_day(*day))
}

/// Up to `length` business days on or before `from`, newest first.
///
/// The search never looks further back than [`BUSINESS_DAY_LOOKBACK_DAYS`].
pub fn list_business_days(
    calendar: &dyn BusinessCalendar,
    from: NaiveDate,
    length: usize,
) -> Vec<NaiveDate> {
    (0..BUSINESS_DAY_LOOKBACK_DAYS)
        .map(|offset| from - Duration::days(offset))
        .filter(|date| calendar.is_business_day(*date))
        .take(length)
        .collect()
}
