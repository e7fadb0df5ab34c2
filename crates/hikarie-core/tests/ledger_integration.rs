//! Integration tests for the attendance ledger.

use std::sync::Arc;
use std::thread;

use chrono::{NaiveDate, NaiveDateTime};
use hikarie_core::{
    AttendanceLedger, BadgeRegistry, Config, CoreError, Database, JapaneseCalendar,
    ScoringEngine, ScoringError, TierRules,
};

fn engine() -> ScoringEngine {
    ScoringEngine::new(
        TierRules::default(),
        Arc::new(BadgeRegistry::standard().unwrap()),
        Arc::new(JapaneseCalendar::new()),
    )
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

#[test]
fn concurrent_duplicates_record_once() {
    let ledger = Arc::new(AttendanceLedger::in_memory(engine()).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || ledger.check_in("U1", at(2025, 2, 3, 8, 30 + i)))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let accepted = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(CoreError::Scoring(ScoringError::DuplicateCheckIn { .. }))))
        .count();

    assert_eq!(accepted, 1);
    assert_eq!(duplicates, 7);
    assert_eq!(ledger.history("U1").unwrap().len(), 1);
    assert_eq!(ledger.attempt_count("U1").unwrap(), 8);
}

#[test]
fn different_users_do_not_interfere() {
    let ledger = Arc::new(AttendanceLedger::in_memory(engine()).unwrap());

    let handles: Vec<_> = ["U1", "U2", "U3", "U4"]
        .into_iter()
        .enumerate()
        .map(|(i, user)| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || ledger.check_in(user, at(2025, 2, 3, 8, i as u32)))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let arrivals = ledger.arrivals_on(NaiveDate::from_ymd_opt(2025, 2, 3).unwrap()).unwrap();
    let users: Vec<&str> = arrivals.iter().map(|a| a.user_id.as_str()).collect();
    assert_eq!(users, vec!["U1", "U2", "U3", "U4"]);
    let ranks: Vec<u32> = arrivals.iter().map(|a| a.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3, 4]);
}

#[test]
fn streak_badge_fires_once_across_a_holiday_week() {
    let ledger = AttendanceLedger::in_memory(engine()).unwrap();
    // Feb 11 2025 is National Foundation Day
    let days = [(6, 8), (7, 8), (10, 8), (12, 8), (13, 8), (14, 8)];
    let mut streak_awarded = Vec::new();
    for (day, hour) in days {
        let outcome = ledger.check_in("U1", at(2025, 2, day, hour, 40)).unwrap();
        if outcome.awards.iter().any(|a| a.badge_id == 401) {
            streak_awarded.push(day);
        }
    }
    assert_eq!(streak_awarded, vec![13]);
    assert_eq!(ledger.streak("U1").unwrap().unwrap().current_streak_length, 6);
    assert_eq!(ledger.badge_counts("U1").unwrap().get(&401), Some(&1));
}

#[test]
fn skipped_business_day_resets_the_streak() {
    let ledger = AttendanceLedger::in_memory(engine()).unwrap();
    ledger.check_in("U1", at(2025, 2, 3, 8, 0)).unwrap();
    ledger.check_in("U1", at(2025, 2, 4, 8, 0)).unwrap();
    let outcome = ledger.check_in("U1", at(2025, 2, 6, 8, 0)).unwrap();
    assert_eq!(outcome.streak.current_streak_length, 1);
}

#[test]
fn rejected_check_in_changes_nothing_but_the_attempt_log() {
    let ledger = AttendanceLedger::in_memory(engine()).unwrap();
    ledger.check_in("U1", at(2025, 2, 4, 8, 0)).unwrap();
    let score = ledger.score("U1").unwrap();

    let late = ledger.check_in("U1", at(2025, 2, 5, 23, 0)).unwrap_err();
    assert!(matches!(late, CoreError::Scoring(ScoringError::InvalidTimestamp { .. })));
    let older = ledger.check_in("U1", at(2025, 2, 3, 8, 0)).unwrap_err();
    assert!(matches!(older, CoreError::Scoring(ScoringError::OutOfOrderCheckIn { .. })));

    assert_eq!(ledger.history("U1").unwrap().len(), 1);
    assert_eq!(ledger.score("U1").unwrap(), score);
    assert_eq!(ledger.attempt_count("U1").unwrap(), 3);
}

#[test]
fn state_survives_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hikarie.db");

    let first_score = {
        let ledger = AttendanceLedger::new(Database::open_at(&path).unwrap(), engine()).unwrap();
        ledger.check_in("U1", at(2025, 2, 3, 8, 55)).unwrap().score.current_score
    };

    let ledger = AttendanceLedger::new(Database::open_at(&path).unwrap(), engine()).unwrap();
    let outcome = ledger.check_in("U1", at(2025, 2, 4, 9, 10)).unwrap();
    assert_eq!(outcome.streak.current_streak_length, 2);
    assert_eq!(outcome.score.previous_score, first_score);
}

#[test]
fn config_driven_engine_respects_tier_boundaries() {
    let mut config = Config::default();
    config.set("scoring.early_until", "08:30:00").unwrap();
    let ledger = AttendanceLedger::in_memory(config.engine().unwrap()).unwrap();

    let outcome = ledger.check_in("U1", at(2025, 2, 3, 8, 45)).unwrap();
    assert_eq!(outcome.tier, hikarie_core::ArrivalTier::OnTime);
}

fn ids(outcome: &hikarie_core::CheckInOutcome) -> Vec<u32> {
    outcome.awards.iter().map(|a| a.badge_id).collect()
}

#[test]
fn office_badges_use_other_users_check_ins() {
    let ledger = AttendanceLedger::in_memory(engine()).unwrap();
    let at_secs = |h, m, s| {
        NaiveDate::from_ymd_opt(2025, 2, 3)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    };

    let first = ledger.check_in("U1", at_secs(8, 10, 0)).unwrap();
    assert!(ids(&first).contains(&201));
    assert!(!ids(&first).contains(&801));

    let second = ledger.check_in("U2", at_secs(8, 10, 30)).unwrap();
    assert!(!ids(&second).contains(&201));
    assert!(ids(&second).contains(&801));

    let third = ledger.check_in("U3", at_secs(8, 10, 45)).unwrap();
    assert!(ids(&third).contains(&802));

    let other_minute = ledger.check_in("U4", at_secs(8, 11, 0)).unwrap();
    assert!(!ids(&other_minute).iter().any(|id| (801..=803).contains(id)));

    // a later check-in with an earlier time is still the fastest
    let early = ledger.check_in("U5", at_secs(7, 50, 0)).unwrap();
    assert!(ids(&early).contains(&201));
    assert_eq!(early.arrival_rank, Some(1));
}

#[test]
fn hundredth_office_check_in_earns_kiriban() {
    let ledger = AttendanceLedger::in_memory(engine()).unwrap();
    for i in 0..99 {
        let outcome = ledger.check_in(&format!("U{i}"), at(2025, 2, 3, 8, i % 60)).unwrap();
        assert!(!ids(&outcome).contains(&601));
    }
    let hundredth = ledger.check_in("U100", at(2025, 2, 4, 9, 30)).unwrap();
    assert!(ids(&hundredth).contains(&601));
    let next = ledger.check_in("U101", at(2025, 2, 4, 9, 31)).unwrap();
    assert!(!ids(&next).contains(&601));
}
