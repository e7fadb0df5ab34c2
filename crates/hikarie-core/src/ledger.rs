//! Attendance ledger.
//!
//! The ledger owns persistence. A check-in runs as:
//!
//! 1. log the raw attempt
//! 2. load the user's snapshot, with who else came in that day, and score it
//! 3. write check-in, streak, awards and score in one transaction
//! 4. rank the arrival among everyone who came in that day
//!
//! All writers go through one `Mutex` around the SQLite connection, so
//! check-ins for the same user can never interleave.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::badges::{BadgeAward, BadgeId};
use crate::checkin::{CheckInEvent, CheckInRecord};
use crate::error::{CoreError, DatabaseError, Result, ScoringError};
use crate::scoring::{ArrivalTier, ScoreUpdate, ScoringEngine, StreakState};
use crate::storage::{ArrivalEntry, Config, Database, UserScore};

/// Result of an accepted check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckInOutcome {
    pub event: CheckInEvent,
    pub tier: ArrivalTier,
    pub streak: StreakState,
    /// New awards, ascending by badge id
    pub awards: Vec<BadgeAward>,
    pub acquired_points: u32,
    pub score: ScoreUpdate,
    /// 1-based arrival position for the day across all users
    pub arrival_rank: Option<u32>,
}

pub struct AttendanceLedger {
    db: Mutex<Database>,
    engine: ScoringEngine,
}

impl AttendanceLedger {
    /// Wrap an open database and refresh its badge catalogue mirror.
    pub fn new(mut db: Database, engine: ScoringEngine) -> Result<Self> {
        db.sync_catalogue(engine.registry())?;
        Ok(Self {
            db: Mutex::new(db),
            engine,
        })
    }

    /// Open the ledger in the data directory using `config`.
    pub fn open(config: &Config) -> Result<Self> {
        let engine = config.engine()?;
        Self::new(Database::open()?, engine)
    }

    pub fn in_memory(engine: ScoringEngine) -> Result<Self> {
        Self::new(Database::open_memory()?, engine)
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>, DatabaseError> {
        self.db.lock().map_err(|_| DatabaseError::Locked)
    }

    fn read<T>(&self, f: impl FnOnce(&Database) -> Result<T, DatabaseError>) -> Result<T> {
        let db = self.lock()?;
        Ok(f(&db)?)
    }

    /// Record a check-in at an office-local date-time.
    ///
    /// # Errors
    /// Returns [`CoreError::Scoring`] when the check-in is rejected; only
    /// the raw attempt is stored in that case. Storage failures surface as
    /// [`CoreError::Database`].
    pub fn check_in(&self, user_id: &str, at: NaiveDateTime) -> Result<CheckInOutcome> {
        let mut db = self.lock()?;
        db.log_attempt(user_id, at, Utc::now())?;

        let event = CheckInEvent::from_local(user_id, at);
        let snapshot = db.snapshot(user_id, event.calendar_date)?;
        let evaluation = match self.engine.evaluate(&event, &snapshot) {
            Ok(evaluation) => evaluation,
            Err(err) => {
                tracing::warn!(user = %user_id, at = %at, error = %err, "check-in rejected");
                return Err(err.into());
            }
        };

        let previous_score = db.current_score(user_id)?;
        let score = ScoreUpdate::new(previous_score, evaluation.acquired_points);

        db.record_check_in(&evaluation, &score, Utc::now())
            .map_err(|err| match err {
                DatabaseError::UniqueViolation(_) => CoreError::Scoring(ScoringError::DuplicateCheckIn {
                    user_id: user_id.to_string(),
                    date: event.calendar_date,
                }),
                other => other.into(),
            })?;

        let arrival_rank = db
            .arrivals_on(event.calendar_date)?
            .iter()
            .find(|entry| entry.user_id == user_id)
            .map(|entry| entry.rank);

        tracing::info!(
            user = %user_id,
            date = %event.calendar_date,
            tier = evaluation.record.tier.as_str(),
            streak = evaluation.streak.current_streak_length,
            badges = ?evaluation.awards.iter().map(|a| a.badge_id).collect::<Vec<_>>(),
            score = score.current_score,
            "check-in recorded"
        );

        Ok(CheckInOutcome {
            tier: evaluation.record.tier,
            event,
            streak: evaluation.streak,
            awards: evaluation.awards,
            acquired_points: evaluation.acquired_points,
            score,
            arrival_rank,
        })
    }

    pub fn history(&self, user_id: &str) -> Result<Vec<CheckInRecord>> {
        self.read(|db| db.history(user_id))
    }

    pub fn streak(&self, user_id: &str) -> Result<Option<StreakState>> {
        self.read(|db| db.streak(user_id))
    }

    pub fn awards(&self, user_id: &str) -> Result<Vec<BadgeAward>> {
        self.read(|db| db.awards(user_id))
    }

    pub fn badge_counts(&self, user_id: &str) -> Result<BTreeMap<BadgeId, u32>> {
        self.read(|db| db.badge_counts(user_id))
    }

    pub fn score(&self, user_id: &str) -> Result<Option<UserScore>> {
        self.read(|db| db.score(user_id))
    }

    pub fn arrivals_on(&self, date: NaiveDate) -> Result<Vec<ArrivalEntry>> {
        self.read(|db| db.arrivals_on(date))
    }

    pub fn attempt_count(&self, user_id: &str) -> Result<u64> {
        self.read(|db| db.attempt_count(user_id))
    }

    pub fn users(&self) -> Result<Vec<String>> {
        self.read(|db| db.users())
    }
}
