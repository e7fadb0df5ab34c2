//! Plain-text replies for check-ins.
//!
//! The output is meant to be posted back to the channel the check-in came
//! from, so it stays short and line oriented.

use chrono::NaiveDate;

use crate::badges::BadgeRegistry;
use crate::error::ScoringError;
use crate::ledger::CheckInOutcome;

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Render an accepted check-in.
pub fn format_outcome(outcome: &CheckInOutcome, registry: &BadgeRegistry) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(
        "{} checked in! ({})",
        outcome.event.timestamp_of_day.format("%H:%M"),
        outcome.tier.label()
    ));

    if let Some(rank) = outcome.arrival_rank {
        lines.push(format!("{} arrival today", ordinal(rank)));
    }

    let streak = outcome.streak.current_streak_length;
    if streak > 1 {
        lines.push(format!("{streak} business days in a row"));
    }

    if !outcome.awards.is_empty() {
        lines.push("Badges:".to_string());
        for award in &outcome.awards {
            match registry.get(award.badge_id) {
                Some(badge) => lines.push(format!(
                    "- {} ({}) +{}pt",
                    badge.message, badge.condition, badge.score
                )),
                None => lines.push(format!("- badge #{}", award.badge_id)),
            }
        }
    }

    let score = &outcome.score;
    let mut score_line = format!(
        "Score: {} (+{}) Lv{} {}",
        score.current_score, outcome.acquired_points, score.level, score.level_name
    );
    if score.points_to_next_level > 0 {
        score_line.push_str(&format!(", {}pt to next level", score.points_to_next_level));
    }
    lines.push(score_line);

    if score.level_up {
        lines.push(format!(
            "Level up! You are now Lv{} {}",
            score.level, score.level_name
        ));
    }

    lines.join("\n")
}

/// Reply for a second check-in on the same day.
pub fn format_duplicate(user_id: &str, date: NaiveDate) -> String {
    format!("{user_id} already checked in today ({date}). See you tomorrow!")
}

/// Reply for any rejected check-in.
pub fn format_rejection(err: &ScoringError) -> String {
    match err {
        ScoringError::DuplicateCheckIn { user_id, date } => format_duplicate(user_id, *date),
        ScoringError::InvalidTimestamp {
            time,
            window_start,
            window_end,
        } => format!(
            "Check-ins are accepted between {} and {}; {} is outside that window.",
            window_start.format("%H:%M"),
            window_end.format("%H:%M"),
            time.format("%H:%M")
        ),
        other => format!("Check-in not recorded: {other}"),
    }
}
