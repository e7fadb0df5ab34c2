//! SQLite-based check-in storage.
//!
//! Provides persistent storage for:
//! - Raw check-in attempts, duplicates included
//! - Accepted check-ins with their arrival tier
//! - Per-user streaks, badge awards and scores
//! - A mirror of the badge catalogue

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::{data_dir, migrations};
use crate::badges::{BadgeAward, BadgeId, BadgeRegistry};
use crate::checkin::{CheckInEvent, CheckInRecord, DayContext, LedgerSnapshot};
use crate::error::{DatabaseError, Result};
use crate::scoring::level::{self, ScoreUpdate};
use crate::scoring::{ArrivalTier, Evaluation, StreakState};

/// Stored cumulative score for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserScore {
    pub user_id: String,
    pub previous_score: u32,
    pub current_score: u32,
    pub level: u32,
    pub level_name: String,
    pub level_up: bool,
    pub points_to_next_level: u32,
    pub updated_at: DateTime<Utc>,
}

/// One accepted check-in on a given day, ranked by arrival time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalEntry {
    /// 1-based position among that day's arrivals
    pub rank: u32,
    pub user_id: String,
    pub timestamp_of_day: NaiveTime,
    pub tier: ArrivalTier,
}

/// SQLite database for check-in storage.
pub struct Database {
    conn: Connection,
}

fn parse_date(table: &'static str, value: &str) -> Result<NaiveDate, DatabaseError> {
    value.parse().map_err(|e| DatabaseError::CorruptRow {
        table,
        message: format!("bad date '{value}': {e}"),
    })
}

fn parse_time(table: &'static str, value: &str) -> Result<NaiveTime, DatabaseError> {
    value.parse().map_err(|e| DatabaseError::CorruptRow {
        table,
        message: format!("bad time '{value}': {e}"),
    })
}

fn parse_tier(value: &str) -> Result<ArrivalTier, DatabaseError> {
    ArrivalTier::parse(value).ok_or_else(|| DatabaseError::CorruptRow {
        table: "check_ins",
        message: format!("unknown tier '{value}'"),
    })
}

fn parse_timestamp(
    table: &'static str,
    value: &str,
) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::CorruptRow {
            table,
            message: format!("bad timestamp '{value}': {e}"),
        })
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data dir>/hikarie.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the database
    /// cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("hikarie.db");
        Ok(Self::open_at(&path)?)
    }

    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        migrations::migrate(&self.conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Refresh the catalogue mirror from `registry`.
    pub fn sync_catalogue(&mut self, registry: &BadgeRegistry) -> Result<(), DatabaseError> {
        let tx = self.conn.transaction()?;
        for badge_type in registry.badge_types() {
            tx.execute(
                "INSERT OR REPLACE INTO badge_types (id, name, description, apply_start)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    badge_type.id,
                    badge_type.name,
                    badge_type.description,
                    badge_type.apply_start.map(|date| date.to_string()),
                ],
            )?;
        }
        for badge in registry.catalogue() {
            tx.execute(
                "INSERT OR REPLACE INTO badges (id, badge_type_id, message, condition, level, score)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    badge.id,
                    badge.badge_type,
                    badge.message,
                    badge.condition,
                    badge.level,
                    badge.score,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Append a raw check-in attempt. Every attempt is logged, accepted or not.
    pub fn log_attempt(
        &self,
        user_id: &str,
        at: NaiveDateTime,
        recorded_at: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO check_in_attempts (user_id, calendar_date, timestamp_of_day, recorded_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                user_id,
                at.date().to_string(),
                at.time().to_string(),
                recorded_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn attempt_count(&self, user_id: &str) -> Result<u64, DatabaseError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM check_in_attempts WHERE user_id = ?1",
            params![user_id],
            |row| row.get::<_, u64>(0),
        )?;
        Ok(count)
    }

    /// Accepted check-ins of `user_id`, oldest first.
    pub fn history(&self, user_id: &str) -> Result<Vec<CheckInRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT calendar_date, timestamp_of_day, tier
             FROM check_ins
             WHERE user_id = ?1
             ORDER BY calendar_date ASC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut history = Vec::new();
        for row in rows {
            let (date, time, tier) = row?;
            history.push(CheckInRecord {
                event: CheckInEvent::new(
                    user_id,
                    parse_date("check_ins", &date)?,
                    parse_time("check_ins", &time)?,
                ),
                tier: parse_tier(&tier)?,
            });
        }
        Ok(history)
    }

    pub fn streak(&self, user_id: &str) -> Result<Option<StreakState>, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT current_streak_length, last_calendar_date FROM streaks WHERE user_id = ?1",
                params![user_id],
                |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        row.map(|(length, date)| -> Result<StreakState, DatabaseError> {
            Ok(StreakState {
                user_id: user_id.to_string(),
                current_streak_length: length,
                last_calendar_date: parse_date("streaks", &date)?,
            })
        })
        .transpose()
    }

    /// Everything the scoring engine needs to score a check-in of `user_id` on `date`.
    pub fn snapshot(&self, user_id: &str, date: NaiveDate) -> Result<LedgerSnapshot, DatabaseError> {
        Ok(LedgerSnapshot {
            user_id: user_id.to_string(),
            history: self.history(user_id)?,
            streak: self.streak(user_id)?,
            day: self.day_context(user_id, date)?,
        })
    }

    /// Other users' arrivals on `date` and the office-wide check-in count.
    pub fn day_context(&self, user_id: &str, date: NaiveDate) -> Result<DayContext, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT timestamp_of_day
             FROM check_ins
             WHERE calendar_date = ?1 AND user_id != ?2
             ORDER BY timestamp_of_day ASC",
        )?;
        let rows = stmt.query_map(params![date.to_string(), user_id], |row| {
            row.get::<_, String>(0)
        })?;
        let mut arrivals = Vec::new();
        for row in rows {
            arrivals.push(parse_time("check_ins", &row?)?);
        }

        let total_check_ins =
            self.conn
                .query_row("SELECT COUNT(*) FROM check_ins", [], |row| row.get::<_, u64>(0))?;

        Ok(DayContext {
            arrivals,
            total_check_ins,
        })
    }

    /// Awards of `user_id` in the order they were granted.
    pub fn awards(&self, user_id: &str) -> Result<Vec<BadgeAward>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT badge_id, awarded_date FROM badge_awards WHERE user_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((row.get::<_, BadgeId>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut awards = Vec::new();
        for row in rows {
            let (badge_id, date) = row?;
            awards.push(BadgeAward {
                user_id: user_id.to_string(),
                badge_id,
                awarded_date: parse_date("badge_awards", &date)?,
            });
        }
        Ok(awards)
    }

    /// How many times each badge was awarded to `user_id`.
    pub fn badge_counts(
        &self,
        user_id: &str,
    ) -> Result<BTreeMap<BadgeId, u32>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT badge_id, COUNT(*) FROM badge_awards WHERE user_id = ?1 GROUP BY badge_id",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((row.get::<_, BadgeId>(0)?, row.get::<_, u32>(1)?))
        })?;
        let mut counts = BTreeMap::new();
        for row in rows {
            let (badge_id, count) = row?;
            counts.insert(badge_id, count);
        }
        Ok(counts)
    }

    pub fn score(&self, user_id: &str) -> Result<Option<UserScore>, DatabaseError> {
        let row = self
            .conn
            .query_row(
                "SELECT previous_score, current_score, level, level_up, updated_at
                 FROM user_scores WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, u32>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, u32>(2)?,
                        row.get::<_, bool>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;
        let Some((previous_score, current_score, stored_level, level_up, updated_at)) = row else {
            return Ok(None);
        };
        Ok(Some(UserScore {
            user_id: user_id.to_string(),
            previous_score,
            current_score,
            level: stored_level,
            level_name: level::level_name(current_score).to_string(),
            level_up,
            points_to_next_level: level::points_to_next_level(current_score),
            updated_at: parse_timestamp("user_scores", &updated_at)?,
        }))
    }

    pub fn current_score(&self, user_id: &str) -> Result<u32, DatabaseError> {
        Ok(self.score(user_id)?.map_or(0, |score| score.current_score))
    }

    /// Persist an accepted check-in in one transaction.
    ///
    /// # Errors
    /// Returns [`DatabaseError::UniqueViolation`] if the user already has a
    /// check-in on that date; nothing is written in that case.
    pub fn record_check_in(
        &mut self,
        evaluation: &Evaluation,
        score: &ScoreUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let event = &evaluation.record.event;
        let now = now.to_rfc3339();
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO check_ins (user_id, calendar_date, timestamp_of_day, tier, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                event.user_id,
                event.calendar_date.to_string(),
                event.timestamp_of_day.to_string(),
                evaluation.record.tier.as_str(),
                now,
            ],
        )?;

        tx.execute(
            "INSERT INTO streaks (user_id, current_streak_length, last_calendar_date)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET
                current_streak_length = excluded.current_streak_length,
                last_calendar_date = excluded.last_calendar_date",
            params![
                evaluation.streak.user_id,
                evaluation.streak.current_streak_length,
                evaluation.streak.last_calendar_date.to_string(),
            ],
        )?;

        for award in &evaluation.awards {
            tx.execute(
                "INSERT INTO badge_awards (user_id, badge_id, awarded_date) VALUES (?1, ?2, ?3)",
                params![award.user_id, award.badge_id, award.awarded_date.to_string()],
            )?;
        }

        tx.execute(
            "INSERT INTO user_scores (user_id, previous_score, current_score, level, level_up, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(user_id) DO UPDATE SET
                previous_score = excluded.previous_score,
                current_score = excluded.current_score,
                level = excluded.level,
                level_up = excluded.level_up,
                updated_at = excluded.updated_at",
            params![
                event.user_id,
                score.previous_score,
                score.current_score,
                score.level,
                score.level_up,
                now,
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Accepted check-ins on `date` across all users, earliest first.
    pub fn arrivals_on(&self, date: NaiveDate) -> Result<Vec<ArrivalEntry>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, timestamp_of_day, tier
             FROM check_ins
             WHERE calendar_date = ?1
             ORDER BY timestamp_of_day ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![date.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut entries = Vec::new();
        for (index, row) in rows.enumerate() {
            let (user_id, time, tier) = row?;
            entries.push(ArrivalEntry {
                rank: index as u32 + 1,
                user_id,
                timestamp_of_day: parse_time("check_ins", &time)?,
                tier: parse_tier(&tier)?,
            });
        }
        Ok(entries)
    }

    /// Distinct users with at least one accepted check-in, sorted.
    pub fn users(&self) -> Result<Vec<String>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT user_id FROM check_ins ORDER BY user_id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }
}
