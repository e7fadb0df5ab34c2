//! Consecutive business-day streaks.
//!
//! A streak continues only when the new check-in falls on a business day and
//! the previous check-in was on the business day right before it. Weekends
//! and holidays in the gap are skipped over; a check-in made on one of them
//! starts a new streak.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{previous_business_day, BusinessCalendar};

/// Current streak for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub user_id: String,
    pub current_streak_length: u32,
    pub last_calendar_date: NaiveDate,
}

impl StreakState {
    /// A fresh streak of length one.
    pub fn start(user_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.into(),
            current_streak_length: 1,
            last_calendar_date: date,
        }
    }

    /// Whether a check-in on `date` extends this streak.
    pub fn is_continued_by(&self, date: NaiveDate, calendar: &dyn BusinessCalendar) -> bool {
        calendar.is_business_day(date)
            && previous_business_day(calendar, date) == Some(self.last_calendar_date)
    }

    /// State after a check-in on `date`.
    pub fn advance(&self, date: NaiveDate, calendar: &dyn BusinessCalendar) -> Self {
        if self.is_continued_by(date, calendar) {
            Self {
                user_id: self.user_id.clone(),
                current_streak_length: self.current_streak_length.saturating_add(1),
                last_calendar_date: date,
            }
        } else {
            Self::start(self.user_id.clone(), date)
        }
    }
}

/// Advance an optional prior streak; a user's first check-in starts at one.
pub fn next_streak(
    previous: Option<&StreakState>,
    user_id: &str,
    date: NaiveDate,
    calendar: &dyn BusinessCalendar,
) -> StreakState {
    match previous {
        Some(state) => state.advance(date, calendar),
        None => StreakState::start(user_id, date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{JapaneseCalendar, WeekdayCalendar};
    use chrono::Duration;
    use proptest::prelude::*;

    fn lengths(cal: &dyn BusinessCalendar, days: &[NaiveDate]) -> Vec<u32> {
        let mut state: Option<StreakState> = None;
        days.iter()
            .map(|day| {
                let next = next_streak(state.as_ref(), "U1", *day, cal);
                let length = next.current_streak_length;
                state = Some(next);
                length
            })
            .collect()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn next_business_day_continues() {
        let cal = WeekdayCalendar;
        let state = StreakState::start("U1", d(2025, 1, 6));
        let next = state.advance(d(2025, 1, 7), &cal);
        assert_eq!(next.current_streak_length, 2);
        assert_eq!(next.last_calendar_date, d(2025, 1, 7));
    }

    #[test]
    fn weekend_gap_continues() {
        let cal = WeekdayCalendar;
        let friday = StreakState {
            user_id: "U1".into(),
            current_streak_length: 4,
            last_calendar_date: d(2025, 1, 10),
        };
        assert_eq!(friday.advance(d(2025, 1, 13), &cal).current_streak_length, 5);
    }

    #[test]
    fn skipped_business_day_resets() {
        let cal = WeekdayCalendar;
        let state = StreakState {
            user_id: "U1".into(),
            current_streak_length: 3,
            last_calendar_date: d(2025, 1, 6),
        };
        assert_eq!(state.advance(d(2025, 1, 8), &cal).current_streak_length, 1);
    }

    #[test]
    fn holidays_do_not_break_the_streak() {
        let cal = JapaneseCalendar::new();
        // Dec 30 (Mon) -> Jan 6 (Mon) spans the New Year closure
        let state = StreakState::start("U1", d(2024, 12, 30));
        assert_eq!(state.advance(d(2025, 1, 6), &cal).current_streak_length, 2);
        // Jan 10 (Fri) -> Jan 14 (Tue) spans Coming of Age Day
        let state = StreakState::start("U1", d(2025, 1, 10));
        assert_eq!(state.advance(d(2025, 1, 14), &cal).current_streak_length, 2);
    }

    #[test]
    fn weekend_check_ins_do_not_extend() {
        let cal = WeekdayCalendar;
        // Sat, Sun
        assert_eq!(lengths(&cal, &[d(2025, 2, 8), d(2025, 2, 9)]), vec![1, 1]);
        // Fri, Sat, Mon
        assert_eq!(
            lengths(&cal, &[d(2025, 2, 7), d(2025, 2, 8), d(2025, 2, 10)]),
            vec![1, 1, 1]
        );
        // Thu, Fri, Sat, Sun, Mon
        let days = [d(2025, 2, 6), d(2025, 2, 7), d(2025, 2, 8), d(2025, 2, 9), d(2025, 2, 10)];
        assert_eq!(lengths(&cal, &days), vec![1, 2, 1, 1, 1]);
    }

    #[test]
    fn holiday_check_in_starts_over() {
        let cal = JapaneseCalendar::new();
        // Feb 11 2025 is National Foundation Day
        let days = [d(2025, 2, 10), d(2025, 2, 11), d(2025, 2, 12)];
        assert_eq!(lengths(&cal, &days), vec![1, 1, 1]);
    }

    #[test]
    fn same_or_older_date_never_continues() {
        let cal = WeekdayCalendar;
        let state = StreakState::start("U1", d(2025, 1, 7));
        assert!(!state.is_continued_by(d(2025, 1, 7), &cal));
        assert!(!state.is_continued_by(d(2025, 1, 6), &cal));
    }

    #[test]
    fn first_check_in_starts_at_one() {
        let cal = WeekdayCalendar;
        let state = next_streak(None, "U1", d(2025, 1, 7), &cal);
        assert_eq!(state, StreakState::start("U1", d(2025, 1, 7)));
    }

    proptest! {
        #[test]
        fn streak_counts_consecutive_business_days(start in 0i64..3_000, len in 1usize..40) {
            let cal = WeekdayCalendar;
            let first = d(2020, 1, 1) + Duration::days(start);
            let days: Vec<NaiveDate> = (0..120)
                .map(|o| first + Duration::days(o))
                .filter(|day| cal.is_business_day(*day))
                .take(len)
                .collect();

            let mut state: Option<StreakState> = None;
            for day in &days {
                state = Some(next_streak(state.as_ref(), "U1", *day, &cal));
            }
            let state = state.unwrap();
            prop_assert_eq!(state.current_streak_length as usize, len);
        }

        #[test]
        fn skipping_a_business_day_resets(start in 0i64..3_000, run in 1usize..10) {
            let cal = WeekdayCalendar;
            let first = d(2020, 1, 1) + Duration::days(start);
            let days: Vec<NaiveDate> = (0..60)
                .map(|o| first + Duration::days(o))
                .filter(|day| cal.is_business_day(*day))
                .collect();

            let mut state: Option<StreakState> = None;
            for day in &days[..run] {
                state = Some(next_streak(state.as_ref(), "U1", *day, &cal));
            }
            // skip exactly one business day
            let after_gap = days[run + 1];
            let state = next_streak(state.as_ref(), "U1", after_gap, &cal);
            prop_assert_eq!(state.current_streak_length, 1);
        }
    }
}
