//! Check-in events and the per-user ledger view handed to the scoring engine.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::scoring::{ArrivalTier, StreakState};

/// A user's arrival on one calendar date, in office-local time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInEvent {
    pub user_id: String,
    pub calendar_date: NaiveDate,
    pub timestamp_of_day: NaiveTime,
}

impl CheckInEvent {
    pub fn new(user_id: impl Into<String>, calendar_date: NaiveDate, timestamp_of_day: NaiveTime) -> Self {
        Self {
            user_id: user_id.into(),
            calendar_date,
            timestamp_of_day,
        }
    }

    /// Split a local date-time into date and time of day.
    pub fn from_local(user_id: impl Into<String>, at: NaiveDateTime) -> Self {
        Self::new(user_id, at.date(), at.time())
    }

    pub fn local_datetime(&self) -> NaiveDateTime {
        self.calendar_date.and_time(self.timestamp_of_day)
    }

    pub fn hour(&self) -> u32 {
        self.timestamp_of_day.hour()
    }

    pub fn minute(&self) -> u32 {
        self.timestamp_of_day.minute()
    }
}

/// A recorded check-in together with the tier it was scored at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInRecord {
    pub event: CheckInEvent,
    pub tier: ArrivalTier,
}

/// Other users' check-ins as seen by a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayContext {
    /// Times of day already recorded by other users on the same date
    pub arrivals: Vec<NaiveTime>,
    /// Accepted check-ins across all users before this one
    pub total_check_ins: u64,
}

impl DayContext {
    /// Recorded arrivals strictly earlier than `time`.
    pub fn earlier_than(&self, time: NaiveTime) -> usize {
        self.arrivals.iter().filter(|arrival| **arrival < time).count()
    }

    /// Recorded arrivals in the same minute as `time`, at or before it.
    pub fn same_minute(&self, time: NaiveTime) -> usize {
        self.arrivals
            .iter()
            .filter(|arrival| {
                arrival.hour() == time.hour() && arrival.minute() == time.minute() && **arrival <= time
            })
            .count()
    }
}

/// Everything the ledger knows about one user before a new check-in.
///
/// `history` is ordered by ascending date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub user_id: String,
    pub history: Vec<CheckInRecord>,
    pub streak: Option<StreakState>,
    #[serde(default)]
    pub day: DayContext,
}

impl LedgerSnapshot {
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            history: Vec::new(),
            streak: None,
            day: DayContext::default(),
        }
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.history
            .binary_search_by(|record| record.event.calendar_date.cmp(&date))
            .is_ok()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.history.last().map(|record| record.event.calendar_date)
    }
}
