//! Built-in badge catalogue.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, Months, NaiveDate, Timelike};

use super::{AwardRule, BadgeContext, BadgeDefinition, BadgeId, BadgeType, BadgeTypeId};
use crate::scoring::ArrivalTier;

/// Badge types evaluated unless configuration says otherwise.
pub const DEFAULT_ENABLED_TYPES: [BadgeTypeId; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 15, 16, 17, 18];

const FLASH_LENGTH: usize = 5;

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn start_dash_from() -> Option<NaiveDate> {
    ymd(2024, 12, 9)
}

pub fn badge_types() -> Vec<BadgeType> {
    vec![
        BadgeType {
            id: 1,
            name: "welcome",
            description: "Checked in for the first time",
            apply_start: None,
            award_rule: AwardRule::Transition,
        },
        BadgeType {
            id: 2,
            name: "fastest_arrival",
            description: "Checked in before anyone else that day",
            apply_start: None,
            award_rule: AwardRule::EveryArrival,
        },
        BadgeType {
            id: 3,
            name: "arrival_count",
            description: "Checked in many times",
            apply_start: None,
            award_rule: AwardRule::Transition,
        },
        BadgeType {
            id: 4,
            name: "straight_flash",
            description: "Came in on consecutive business days",
            apply_start: None,
            award_rule: AwardRule::Transition,
        },
        BadgeType {
            id: 5,
            name: "time_window",
            description: "Arrival time of day",
            apply_start: None,
            award_rule: AwardRule::EveryArrival,
        },
        BadgeType {
            id: 6,
            name: "kiriban",
            description: "Made a milestone-numbered check-in for the office",
            apply_start: None,
            award_rule: AwardRule::EveryArrival,
        },
        BadgeType {
            id: 7,
            name: "long_time_no_see",
            description: "Came back after a long absence",
            apply_start: None,
            award_rule: AwardRule::EveryArrival,
        },
        BadgeType {
            id: 8,
            name: "lucky_you_guys",
            description: "Checked in within the same minute as someone else",
            apply_start: None,
            award_rule: AwardRule::EveryArrival,
        },
        BadgeType {
            id: 15,
            name: "start_dash",
            description: "Checked in within two weeks of the first check-in",
            apply_start: start_dash_from(),
            award_rule: AwardRule::Transition,
        },
        BadgeType {
            id: 16,
            name: "specific_day",
            description: "Came in on a particular date",
            apply_start: ymd(2024, 12, 26),
            award_rule: AwardRule::Transition,
        },
        BadgeType {
            id: 17,
            name: "yearly_specific_day",
            description: "Came in on a particular day of the year",
            apply_start: ymd(2024, 12, 1),
            award_rule: AwardRule::Transition,
        },
        BadgeType {
            id: 18,
            name: "specific_time",
            description: "Came in at a particular time",
            apply_start: ymd(2025, 1, 1),
            award_rule: AwardRule::EveryArrival,
        },
    ]
}

pub fn badge_definitions() -> Vec<BadgeDefinition> {
    let mut definitions = vec![
        BadgeDefinition {
            id: 101,
            badge_type: 1,
            message: "First check-in",
            condition: "Used the check-in bot for the first time",
            level: 1,
            score: 2,
            predicate: |ctx| ctx.count() >= 1,
        },
        BadgeDefinition {
            id: 201,
            badge_type: 2,
            message: "Speed of light",
            condition: "Checked in before anyone else that day",
            level: 1,
            score: 2,
            predicate: fastest_arrival,
        },
        BadgeDefinition {
            id: 301,
            badge_type: 3,
            message: "Check-in beginner",
            condition: "Checked in 5 times",
            level: 1,
            score: 3,
            predicate: |ctx| ctx.count() >= 5,
        },
        BadgeDefinition {
            id: 302,
            badge_type: 3,
            message: "Check-in master",
            condition: "Checked in 20 times",
            level: 2,
            score: 5,
            predicate: |ctx| ctx.count() >= 20,
        },
        BadgeDefinition {
            id: 303,
            badge_type: 3,
            message: "Check-in freak",
            condition: "Checked in 100 times",
            level: 3,
            score: 10,
            predicate: |ctx| ctx.count() >= 100,
        },
        BadgeDefinition {
            id: 401,
            badge_type: 4,
            message: "Straight flush",
            condition: "Came in 5 business days in a row",
            level: 1,
            score: 3,
            predicate: straight_flash,
        },
        BadgeDefinition {
            id: 402,
            badge_type: 4,
            message: "Royal straight flush",
            condition: "Came in 5 business days in a row, each in a different hour",
            level: 2,
            score: 5,
            predicate: royal_straight_flash,
        },
        BadgeDefinition {
            id: 403,
            badge_type: 4,
            message: "Ultra royal straight flush",
            condition: "Came in 5 business days in a row in 5 consecutive hours",
            level: 3,
            score: 8,
            predicate: ultra_royal_straight_flash,
        },
        BadgeDefinition {
            id: 501,
            badge_type: 5,
            message: "Morning person",
            condition: "Checked in during the early tier",
            level: 3,
            score: 3,
            predicate: |ctx| ctx.latest_tier() == Some(ArrivalTier::Early),
        },
        BadgeDefinition {
            id: 502,
            badge_type: 5,
            message: "Right on time",
            condition: "Checked in during the on-time tier",
            level: 2,
            score: 2,
            predicate: |ctx| ctx.latest_tier() == Some(ArrivalTier::OnTime),
        },
        BadgeDefinition {
            id: 503,
            badge_type: 5,
            message: "Fashionably late",
            condition: "Checked in during the late tier",
            level: 1,
            score: 1,
            predicate: |ctx| ctx.latest_tier() == Some(ArrivalTier::Late),
        },
        BadgeDefinition {
            id: 504,
            badge_type: 5,
            message: "Ultra early bird",
            condition: "Checked in during the dawn tier",
            level: 4,
            score: 5,
            predicate: |ctx| ctx.latest_tier() == Some(ArrivalTier::Dawn),
        },
        BadgeDefinition {
            id: 701,
            badge_type: 7,
            message: "Two weeks already? Good to see you",
            condition: "Came back after more than 14 days away",
            level: 1,
            score: 2,
            predicate: |ctx| absence_band(ctx) == Some(1),
        },
        BadgeDefinition {
            id: 702,
            badge_type: 7,
            message: "A whole month. Welcome back",
            condition: "Came back after more than 30 days away",
            level: 2,
            score: 3,
            predicate: |ctx| absence_band(ctx) == Some(2),
        },
        BadgeDefinition {
            id: 703,
            badge_type: 7,
            message: "Two months! We almost forgot your face",
            condition: "Came back after more than 2 months away",
            level: 3,
            score: 4,
            predicate: |ctx| absence_band(ctx) == Some(3),
        },
        BadgeDefinition {
            id: 704,
            badge_type: 7,
            message: "Half a year. Nice to meet you, again",
            condition: "Came back after more than 6 months away",
            level: 4,
            score: 6,
            predicate: |ctx| absence_band(ctx) == Some(4),
        },
        BadgeDefinition {
            id: 801,
            badge_type: 8,
            message: "Lucky pair",
            condition: "Second to check in within the same minute",
            level: 1,
            score: 2,
            predicate: |ctx| same_minute_rank(ctx) == Some(2),
        },
        BadgeDefinition {
            id: 802,
            badge_type: 8,
            message: "Lucky trio",
            condition: "Third to check in within the same minute",
            level: 2,
            score: 3,
            predicate: |ctx| same_minute_rank(ctx) == Some(3),
        },
        BadgeDefinition {
            id: 803,
            badge_type: 8,
            message: "Lucky quartet",
            condition: "Fourth to check in within the same minute",
            level: 3,
            score: 4,
            predicate: |ctx| same_minute_rank(ctx) == Some(4),
        },
        BadgeDefinition {
            id: 1501,
            badge_type: 15,
            message: "Start dash",
            condition: "Checked in within two weeks of the first check-in",
            level: 1,
            score: 2,
            predicate: start_dash,
        },
        BadgeDefinition {
            id: 1601,
            badge_type: 16,
            message: "Thanks for all your work in 2024",
            condition: "Came in on 2024-12-27",
            level: 1,
            score: 2,
            predicate: |ctx| latest_date(ctx) == ymd(2024, 12, 27),
        },
        BadgeDefinition {
            id: 1602,
            badge_type: 16,
            message: "Happy new year 2025",
            condition: "Came in on 2025-01-06",
            level: 1,
            score: 2,
            predicate: |ctx| latest_date(ctx) == ymd(2025, 1, 6),
        },
        BadgeDefinition {
            id: 1701,
            badge_type: 17,
            message: "Christmas at the office",
            condition: "Came in on December 25",
            level: 1,
            score: 2,
            predicate: |ctx| latest_month_day(ctx) == Some((12, 25)),
        },
        BadgeDefinition {
            id: 1702,
            badge_type: 17,
            message: "Thank you for this fiscal year",
            condition: "First check-in of the last week of the fiscal year",
            level: 1,
            score: 2,
            predicate: |ctx| first_check_in_within(ctx, (3, 25), (3, 31)),
        },
        BadgeDefinition {
            id: 1703,
            badge_type: 17,
            message: "Looking forward to the new fiscal year",
            condition: "First check-in of the first week of the fiscal year",
            level: 1,
            score: 2,
            predicate: |ctx| first_check_in_within(ctx, (4, 1), (4, 7)),
        },
        BadgeDefinition {
            id: 1704,
            badge_type: 17,
            message: "Everyone else is on Golden Week",
            condition: "Came in between April 29 and May 5",
            level: 1,
            score: 2,
            predicate: |ctx| {
                latest_month_day(ctx).is_some_and(|md| (4, 29) <= md && md <= (5, 5))
            },
        },
        BadgeDefinition {
            id: 1801,
            badge_type: 18,
            message: "Next-door neighbours",
            condition: "Came in when the hour and minute were adjacent numbers",
            level: 1,
            score: 2,
            predicate: |ctx| time_pattern_badge(ctx) == Some(1801),
        },
        BadgeDefinition {
            id: 1802,
            badge_type: 18,
            message: "Doubles",
            condition: "Came in when the hour and minute were the same number",
            level: 2,
            score: 3,
            predicate: |ctx| time_pattern_badge(ctx) == Some(1802),
        },
        BadgeDefinition {
            id: 1803,
            badge_type: 18,
            message: "Staircase",
            condition: "Came in at 12:34",
            level: 3,
            score: 4,
            predicate: |ctx| time_pattern_badge(ctx) == Some(1803),
        },
        BadgeDefinition {
            id: 1804,
            badge_type: 18,
            message: "Ready, set... Pocky!",
            condition: "Came in at 11:11",
            level: 3,
            score: 4,
            predicate: |ctx| time_pattern_badge(ctx) == Some(1804),
        },
        BadgeDefinition {
            id: 1805,
            badge_type: 18,
            message: "Could it be that you love fluffy things?",
            condition: "Came in at 11:22",
            level: 3,
            score: 4,
            predicate: |ctx| time_pattern_badge(ctx) == Some(1805),
        },
        BadgeDefinition {
            id: 1806,
            badge_type: 18,
            message: "Yakiniku tonight",
            condition: "Came in at 11:29",
            level: 3,
            score: 4,
            predicate: |ctx| time_pattern_badge(ctx) == Some(1806),
        },
        BadgeDefinition {
            id: 1807,
            badge_type: 18,
            message: "There is only one truth",
            condition: "Came in at 9:10",
            level: 3,
            score: 4,
            predicate: |ctx| time_pattern_badge(ctx) == Some(1807),
        },
    ];
    definitions.extend(kiriban_definitions());
    definitions
}

macro_rules! kiriban {
    ($($id:literal => $count:literal, $score:literal;)*) => {
        vec![$(
            BadgeDefinition {
                id: $id,
                badge_type: 6,
                message: concat!("Visitor number ", stringify!($count)),
                condition: concat!("Made check-in number ", stringify!($count), " for the office"),
                level: 1,
                score: $score,
                predicate: |ctx| office_check_in_number(ctx) == Some($count),
            },
        )*]
    };
}

fn kiriban_definitions() -> Vec<BadgeDefinition> {
    kiriban! {
        601 => 100, 5;
        602 => 111, 5;
        603 => 200, 5;
        604 => 222, 5;
        605 => 300, 5;
        606 => 333, 5;
        607 => 400, 5;
        608 => 444, 5;
        609 => 500, 5;
        610 => 555, 5;
        611 => 600, 5;
        612 => 666, 5;
        613 => 700, 5;
        614 => 777, 5;
        615 => 800, 5;
        616 => 888, 5;
        617 => 900, 5;
        618 => 999, 10;
        619 => 1000, 10;
        620 => 1100, 5;
        621 => 1111, 10;
        622 => 1200, 5;
        623 => 1222, 5;
        624 => 1234, 5;
        625 => 1300, 5;
        626 => 1333, 5;
        627 => 1400, 5;
        628 => 1444, 5;
        629 => 1500, 5;
        630 => 1555, 5;
        631 => 1600, 5;
        632 => 1666, 5;
        633 => 1700, 5;
        634 => 1777, 5;
        635 => 1800, 5;
        636 => 1888, 5;
        637 => 1900, 5;
        638 => 1999, 10;
        639 => 2000, 10;
    }
}

fn latest_date(ctx: &BadgeContext<'_>) -> Option<NaiveDate> {
    ctx.latest().map(|event| event.calendar_date)
}

fn latest_month_day(ctx: &BadgeContext<'_>) -> Option<(u32, u32)> {
    latest_date(ctx).map(|date| (date.month(), date.day()))
}

/// No one recorded an earlier time on the same date.
fn fastest_arrival(ctx: &BadgeContext<'_>) -> bool {
    match (ctx.day, ctx.latest_time()) {
        (Some(day), Some(time)) => day.earlier_than(time) == 0,
        _ => false,
    }
}

/// 1-based position of the latest check-in among all accepted check-ins.
fn office_check_in_number(ctx: &BadgeContext<'_>) -> Option<u64> {
    ctx.day.map(|day| day.total_check_ins + 1)
}

/// 1-based position of the latest check-in within its minute of the day.
fn same_minute_rank(ctx: &BadgeContext<'_>) -> Option<usize> {
    let time = ctx.latest_time()?;
    ctx.day.map(|day| day.same_minute(time) + 1)
}

fn straight_flash(ctx: &BadgeContext<'_>) -> bool {
    ctx.streak_length() as usize >= FLASH_LENGTH
}

/// Arrival hours of the current flash, if the streak is long enough.
fn flash_hours(ctx: &BadgeContext<'_>) -> Option<BTreeSet<u32>> {
    if !straight_flash(ctx) {
        return None;
    }
    let recent = ctx.recent(FLASH_LENGTH);
    Some(recent.iter().map(|record| record.event.hour()).collect())
}

fn royal_straight_flash(ctx: &BadgeContext<'_>) -> bool {
    flash_hours(ctx).is_some_and(|hours| hours.len() == FLASH_LENGTH)
}

fn ultra_royal_straight_flash(ctx: &BadgeContext<'_>) -> bool {
    let Some(hours) = flash_hours(ctx) else {
        return false;
    };
    match (hours.first(), hours.last()) {
        (Some(min), Some(max)) => {
            hours.len() == FLASH_LENGTH && (max - min) as usize == FLASH_LENGTH - 1
        }
        _ => false,
    }
}

/// Length of the absence before the latest check-in, as bands 1 to 4.
fn absence_band(ctx: &BadgeContext<'_>) -> Option<u8> {
    let previous = ctx.previous()?.calendar_date;
    let latest = ctx.latest()?.calendar_date;
    let exceeded = |limit: Option<NaiveDate>| limit.is_some_and(|limit| limit < latest);

    if exceeded(previous.checked_add_months(Months::new(6))) {
        Some(4)
    } else if exceeded(previous.checked_add_months(Months::new(2))) {
        Some(3)
    } else if exceeded(Some(previous + Duration::days(30))) {
        Some(2)
    } else if exceeded(Some(previous + Duration::days(14))) {
        Some(1)
    } else {
        None
    }
}

fn start_dash(ctx: &BadgeContext<'_>) -> bool {
    let Some(from) = start_dash_from() else {
        return false;
    };
    let first = ctx
        .history
        .iter()
        .map(|record| record.event.calendar_date)
        .find(|date| *date >= from);
    match (first, latest_date(ctx)) {
        (Some(first), Some(latest)) => latest - first <= Duration::days(14),
        _ => false,
    }
}

/// The latest check-in falls inside the window and is the first one there this year.
fn first_check_in_within(ctx: &BadgeContext<'_>, from: (u32, u32), to: (u32, u32)) -> bool {
    let Some(latest) = latest_date(ctx) else {
        return false;
    };
    let md = (latest.month(), latest.day());
    if md < from || md > to {
        return false;
    }
    let Some(window_start) = ymd(latest.year(), from.0, from.1) else {
        return false;
    };
    ctx.previous()
        .map_or(true, |previous| previous.calendar_date < window_start)
}

/// Which time-of-day badge the latest check-in minute earns, if any.
///
/// Named times win over the generic doubles and neighbours patterns.
fn time_pattern_badge(ctx: &BadgeContext<'_>) -> Option<BadgeId> {
    let time = ctx.latest_time()?;
    let (hour, minute) = (time.hour(), time.minute());
    match (hour, minute) {
        (11, 11) => Some(1804),
        (11, 22) => Some(1805),
        (11, 29) => Some(1806),
        (9, 10) => Some(1807),
        (12, 34) => Some(1803),
        (h, m) if h == m => Some(1802),
        (h, m) if h.abs_diff(m) == 1 => Some(1801),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkin::{CheckInEvent, CheckInRecord, DayContext};
    use crate::scoring::StreakState;
    use chrono::NaiveTime;

    fn rec(date: NaiveDate, h: u32, m: u32) -> CheckInRecord {
        CheckInRecord {
            event: CheckInEvent::new("U1", date, NaiveTime::from_hms_opt(h, m, 0).unwrap()),
            tier: ArrivalTier::Early,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn time_patterns_prefer_named_times() {
        let cases = [
            ((11, 11), Some(1804)),
            ((9, 10), Some(1807)),
            ((12, 34), Some(1803)),
            ((10, 10), Some(1802)),
            ((10, 11), Some(1801)),
            ((11, 10), Some(1801)),
            ((10, 30), None),
        ];
        for ((h, m), expected) in cases {
            let history = [rec(d(2025, 2, 3), h, m)];
            let ctx = BadgeContext::new(&history, None);
            assert_eq!(time_pattern_badge(&ctx), expected, "{h}:{m}");
        }
    }

    #[test]
    fn absence_bands_are_exclusive() {
        let cases = [
            (d(2025, 1, 20), None),
            (d(2025, 1, 21), Some(1)),
            (d(2025, 2, 6), Some(2)),
            (d(2025, 3, 7), Some(3)),
            (d(2025, 7, 7), Some(4)),
        ];
        for (latest, expected) in cases {
            let history = [rec(d(2025, 1, 6), 9, 0), rec(latest, 9, 0)];
            let ctx = BadgeContext::new(&history, None);
            assert_eq!(absence_band(&ctx), expected, "{latest}");
        }
    }

    #[test]
    fn fiscal_year_badges_only_for_first_check_in_of_window() {
        let first = [rec(d(2025, 3, 21), 9, 0), rec(d(2025, 3, 26), 9, 0)];
        assert!(first_check_in_within(&BadgeContext::new(&first, None), (3, 25), (3, 31)));

        let second = [rec(d(2025, 3, 25), 9, 0), rec(d(2025, 3, 26), 9, 0)];
        assert!(!first_check_in_within(&BadgeContext::new(&second, None), (3, 25), (3, 31)));

        let outside = [rec(d(2025, 4, 8), 9, 0)];
        assert!(!first_check_in_within(&BadgeContext::new(&outside, None), (4, 1), (4, 7)));
    }

    #[test]
    fn flash_variants_depend_on_hours() {
        let days = [d(2025, 1, 6), d(2025, 1, 7), d(2025, 1, 8), d(2025, 1, 9), d(2025, 1, 10)];
        let streak = StreakState {
            user_id: "U1".into(),
            current_streak_length: 5,
            last_calendar_date: d(2025, 1, 10),
        };

        let consecutive: Vec<_> = days.iter().zip(7..).map(|(day, h)| rec(*day, h, 30)).collect();
        let ctx = BadgeContext::new(&consecutive, Some(&streak));
        assert!(straight_flash(&ctx));
        assert!(royal_straight_flash(&ctx));
        assert!(ultra_royal_straight_flash(&ctx));

        let spread: Vec<_> = days
            .iter()
            .zip([7, 9, 11, 13, 15])
            .map(|(day, h)| rec(*day, h, 0))
            .collect();
        let ctx = BadgeContext::new(&spread, Some(&streak));
        assert!(royal_straight_flash(&ctx));
        assert!(!ultra_royal_straight_flash(&ctx));

        let same_hour: Vec<_> = days.iter().map(|day| rec(*day, 9, 0)).collect();
        let ctx = BadgeContext::new(&same_hour, Some(&streak));
        assert!(straight_flash(&ctx));
        assert!(!royal_straight_flash(&ctx));
    }

    fn times(list: &[(u32, u32, u32)]) -> Vec<NaiveTime> {
        list.iter()
            .map(|(h, m, s)| NaiveTime::from_hms_opt(*h, *m, *s).unwrap())
            .collect()
    }

    #[test]
    fn office_badges_need_the_day_context() {
        let history = [rec(d(2025, 2, 3), 8, 10)];
        let ctx = BadgeContext::new(&history, None);
        assert!(!fastest_arrival(&ctx));
        assert_eq!(office_check_in_number(&ctx), None);
        assert_eq!(same_minute_rank(&ctx), None);
    }

    #[test]
    fn fastest_arrival_compares_times_not_order() {
        let history = [rec(d(2025, 2, 3), 8, 10)];
        let later = DayContext {
            arrivals: times(&[(9, 0, 0), (8, 30, 0)]),
            total_check_ins: 2,
        };
        assert!(fastest_arrival(&BadgeContext::new(&history, None).with_day(&later)));

        let earlier = DayContext {
            arrivals: times(&[(7, 55, 0)]),
            total_check_ins: 1,
        };
        assert!(!fastest_arrival(&BadgeContext::new(&history, None).with_day(&earlier)));
    }

    #[test]
    fn lucky_badges_count_the_same_minute() {
        let history = [rec(d(2025, 2, 3), 8, 10)];
        let day = DayContext {
            arrivals: times(&[(8, 10, 0), (8, 9, 0), (8, 11, 0)]),
            total_check_ins: 3,
        };
        assert_eq!(same_minute_rank(&BadgeContext::new(&history, None).with_day(&day)), Some(2));
    }

    #[test]
    fn kiriban_follows_the_office_count() {
        let registry = crate::badges::BadgeRegistry::standard().unwrap();
        let history = [rec(d(2025, 2, 3), 8, 10)];
        let day = DayContext {
            arrivals: Vec::new(),
            total_check_ins: 110,
        };
        let ctx = BadgeContext::new(&history, None).with_day(&day);
        let earned: Vec<BadgeId> = registry
            .all_definitions()
            .filter(|definition| definition.badge_type == 6 && registry.holds(definition, &ctx))
            .map(|definition| definition.id)
            .collect();
        assert_eq!(earned, vec![602]);
        assert_eq!(registry.get(618).unwrap().score, 10);
        assert_eq!(registry.get(639).unwrap().message, "Visitor number 2000");
    }

    #[test]
    fn start_dash_window() {
        let history = [rec(d(2024, 12, 9), 9, 0), rec(d(2024, 12, 23), 9, 0)];
        assert!(start_dash(&BadgeContext::new(&history, None)));
        let history = [rec(d(2024, 12, 9), 9, 0), rec(d(2024, 12, 24), 9, 0)];
        assert!(!start_dash(&BadgeContext::new(&history, None)));
        let history = [rec(d(2024, 12, 2), 9, 0)];
        assert!(!start_dash(&BadgeContext::new(&history, None)));
    }
}
