//! Check-in scoring engine.
//!
//! Given a new check-in and the user's ledger snapshot, the engine decides:
//!
//! ```text
//! tier   = classify(time of day)
//! streak = advance(previous streak, date)
//! awards = { badge | holds(after) && (every_arrival || !holds(before)) }
//! points = sum(award.score)
//! ```
//!
//! Evaluation is pure. Persisting the result is the ledger's job, so a
//! rejected check-in never touches stored state.

pub mod level;
mod streak;
mod tier;

use std::sync::Arc;

use serde::Serialize;

use crate::badges::{BadgeAward, BadgeContext, BadgeRegistry};
use crate::calendar::BusinessCalendar;
use crate::checkin::{CheckInEvent, CheckInRecord, LedgerSnapshot};
use crate::error::ScoringError;

pub use level::ScoreUpdate;
pub use streak::{next_streak, StreakState};
pub use tier::{ArrivalTier, TierRules};

/// Everything a successful check-in produces, before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub record: CheckInRecord,
    pub streak: StreakState,
    /// New awards, ascending by badge id
    pub awards: Vec<BadgeAward>,
    pub acquired_points: u32,
}

impl Evaluation {
    pub fn tier(&self) -> ArrivalTier {
        self.record.tier
    }
}

/// Stateless evaluator shared by every check-in.
#[derive(Clone)]
pub struct ScoringEngine {
    rules: TierRules,
    registry: Arc<BadgeRegistry>,
    calendar: Arc<dyn BusinessCalendar>,
}

impl ScoringEngine {
    pub fn new(
        rules: TierRules,
        registry: Arc<BadgeRegistry>,
        calendar: Arc<dyn BusinessCalendar>,
    ) -> Self {
        Self {
            rules,
            registry,
            calendar,
        }
    }

    pub fn rules(&self) -> &TierRules {
        &self.rules
    }

    pub fn registry(&self) -> &BadgeRegistry {
        &self.registry
    }

    pub fn calendar(&self) -> &dyn BusinessCalendar {
        self.calendar.as_ref()
    }

    /// Score `event` against the user's prior history.
    ///
    /// # Errors
    /// Returns a [`ScoringError`] when the event belongs to another user,
    /// repeats an already recorded date, predates the latest check-in, or
    /// falls outside the valid time window. Nothing is produced in that case.
    pub fn evaluate(
        &self,
        event: &CheckInEvent,
        snapshot: &LedgerSnapshot,
    ) -> Result<Evaluation, ScoringError> {
        if event.user_id != snapshot.user_id {
            return Err(ScoringError::UserMismatch {
                user_id: snapshot.user_id.clone(),
                event_user: event.user_id.clone(),
            });
        }
        if snapshot.contains_date(event.calendar_date) {
            return Err(ScoringError::DuplicateCheckIn {
                user_id: event.user_id.clone(),
                date: event.calendar_date,
            });
        }
        if let Some(last) = snapshot.last_date() {
            if event.calendar_date < last {
                return Err(ScoringError::OutOfOrderCheckIn {
                    date: event.calendar_date,
                    last,
                });
            }
        }
        let tier = self.rules.tier_for(event.timestamp_of_day)?;

        let streak = next_streak(
            snapshot.streak.as_ref(),
            &event.user_id,
            event.calendar_date,
            self.calendar(),
        );

        let record = CheckInRecord {
            event: event.clone(),
            tier,
        };
        let mut after_history = Vec::with_capacity(snapshot.history.len() + 1);
        after_history.extend_from_slice(&snapshot.history);
        after_history.push(record.clone());

        let before = BadgeContext::new(&snapshot.history, snapshot.streak.as_ref());
        let after = BadgeContext::new(&after_history, Some(&streak)).with_day(&snapshot.day);

        let earned = self.registry.newly_satisfied(&before, &after);
        let acquired_points: u32 = earned.iter().map(|definition| definition.score).sum();
        let awards: Vec<BadgeAward> = earned
            .iter()
            .map(|definition| BadgeAward {
                user_id: event.user_id.clone(),
                badge_id: definition.id,
                awarded_date: event.calendar_date,
            })
            .collect();

        tracing::debug!(
            user = %event.user_id,
            date = %event.calendar_date,
            tier = tier.as_str(),
            streak = streak.current_streak_length,
            awards = awards.len(),
            points = acquired_points,
            "check-in evaluated"
        );

        Ok(Evaluation {
            record,
            streak,
            awards,
            acquired_points,
        })
    }
}

impl std::fmt::Debug for ScoringEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringEngine")
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}
