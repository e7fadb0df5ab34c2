//! Property tests for the scoring engine's public contract.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};
use hikarie_core::{
    ArrivalTier, BadgeRegistry, BusinessCalendar, CheckInEvent, LedgerSnapshot, ScoringEngine,
    ScoringError, TierRules, WeekdayCalendar,
};
use proptest::prelude::*;

fn engine() -> ScoringEngine {
    ScoringEngine::new(
        TierRules::default(),
        Arc::new(BadgeRegistry::standard().unwrap()),
        Arc::new(WeekdayCalendar),
    )
}

fn apply(snapshot: &mut LedgerSnapshot, engine: &ScoringEngine, event: &CheckInEvent) -> Vec<u32> {
    let evaluation = engine.evaluate(event, snapshot).unwrap();
    snapshot.history.push(evaluation.record.clone());
    snapshot.streak = Some(evaluation.streak.clone());
    evaluation.awards.iter().map(|a| a.badge_id).collect()
}

proptest! {
    #[test]
    fn every_valid_time_has_exactly_one_tier(secs in 6 * 3600u32..=18 * 3600) {
        let rules = TierRules::default();
        let time = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap();
        let tier = rules.tier_for(time).unwrap();
        let matching = ArrivalTier::ALL
            .iter()
            .filter(|candidate| **candidate == rules.classify(time))
            .count();
        prop_assert_eq!(matching, 1);
        prop_assert_eq!(tier, rules.classify(time));
    }

    #[test]
    fn tiers_never_get_earlier_as_time_advances(a in 6 * 3600u32..=18 * 3600, b in 6 * 3600u32..=18 * 3600) {
        let rules = TierRules::default();
        let (lo, hi) = (a.min(b), a.max(b));
        let lo = NaiveTime::from_num_seconds_from_midnight_opt(lo, 0).unwrap();
        let hi = NaiveTime::from_num_seconds_from_midnight_opt(hi, 0).unwrap();
        prop_assert!(rules.classify(lo) <= rules.classify(hi));
    }

    #[test]
    fn duplicate_check_in_is_always_rejected(day in 0i64..2_000, h1 in 6u32..18, h2 in 6u32..18) {
        let engine = engine();
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(day);
        let mut snapshot = LedgerSnapshot::empty("U1");
        apply(&mut snapshot, &engine, &CheckInEvent::new("U1", date, NaiveTime::from_hms_opt(h1, 0, 0).unwrap()));

        let before = snapshot.clone();
        let again = CheckInEvent::new("U1", date, NaiveTime::from_hms_opt(h2, 30, 0).unwrap());
        let err = engine.evaluate(&again, &snapshot).unwrap_err();
        prop_assert!(
            matches!(err, ScoringError::DuplicateCheckIn { .. }),
            "unexpected error: {:?}",
            err
        );
        prop_assert_eq!(snapshot, before);
    }

    #[test]
    fn streak_equals_run_of_consecutive_business_days(start in 0i64..2_000, len in 1usize..15) {
        let engine = engine();
        let cal = WeekdayCalendar;
        let first = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(start);
        let days: Vec<NaiveDate> = (0..40)
            .map(|o| first + Duration::days(o))
            .filter(|d| cal.is_business_day(*d))
            .take(len)
            .collect();

        let mut snapshot = LedgerSnapshot::empty("U1");
        let mut flash_awards = 0;
        for day in &days {
            let ids = apply(&mut snapshot, &engine, &CheckInEvent::new("U1", *day, NaiveTime::from_hms_opt(8, 0, 0).unwrap()));
            flash_awards += ids.iter().filter(|id| **id == 401).count();
        }
        prop_assert_eq!(snapshot.streak.unwrap().current_streak_length as usize, len);
        prop_assert_eq!(flash_awards, usize::from(len >= 5));
    }
}
