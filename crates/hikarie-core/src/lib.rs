//! # Hikarie Core Library
//!
//! Core logic for the hikarie office check-in bot: each morning a user
//! announces their arrival, and the bot answers with how early they were,
//! their streak of business days, any badges they just earned and their
//! running score.
//!
//! ## Architecture
//!
//! - **Scoring**: a pure engine that turns a check-in plus the user's prior
//!   history into an arrival tier, an updated streak and new badge awards
//! - **Badges**: an immutable, validated catalogue of badge predicates
//! - **Calendar**: Japanese business days (holidays and company closures)
//! - **Storage**: SQLite ledger and TOML configuration
//!
//! ## Key Components
//!
//! - [`ScoringEngine`]: check-in evaluation
//! - [`BadgeRegistry`]: badge catalogue
//! - [`AttendanceLedger`]: single-writer persistence around the engine
//! - [`Config`]: application configuration management

pub mod badges;
pub mod calendar;
pub mod checkin;
pub mod error;
pub mod ledger;
pub mod notify;
pub mod scoring;
pub mod storage;

pub use badges::{AwardRule, BadgeAward, BadgeDefinition, BadgeRegistry, BadgeType};
pub use calendar::{BusinessCalendar, JapaneseCalendar, WeekdayCalendar};
pub use checkin::{CheckInEvent, CheckInRecord, DayContext, LedgerSnapshot};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ScoringError};
pub use ledger::{AttendanceLedger, CheckInOutcome};
pub use scoring::{ArrivalTier, Evaluation, ScoreUpdate, ScoringEngine, StreakState, TierRules};
pub use storage::{ArrivalEntry, Config, Database, UserScore};
