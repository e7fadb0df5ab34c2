use clap::Subcommand;
use hikarie_core::calendar::list_business_days;
use serde_json::json;

use super::{local_date, open_ledger};

/// Business days shown in the recent attendance strip.
const RECENT_BUSINESS_DAYS: usize = 5;

#[derive(Subcommand)]
pub enum UserAction {
    /// Score, level, streak and recent attendance
    Show {
        /// User id
        user: String,
    },
    /// Every accepted check-in, oldest first
    History {
        /// User id
        user: String,
    },
    /// Badges earned, with how often each was awarded
    Badges {
        /// User id
        user: String,
    },
}

pub fn run(action: UserAction) -> Result<(), Box<dyn std::error::Error>> {
    let (config, ledger) = open_ledger()?;

    match action {
        UserAction::Show { user } => {
            let history = ledger.history(&user)?;
            let today = local_date(&config, None)?;
            let recent: Vec<_> = list_business_days(
                ledger.engine().calendar(),
                today,
                RECENT_BUSINESS_DAYS,
            )
            .into_iter()
            .map(|date| {
                let checked_in = history
                    .iter()
                    .any(|record| record.event.calendar_date == date);
                json!({ "date": date, "checked_in": checked_in })
            })
            .collect();

            let value = json!({
                "user_id": user,
                "check_ins": history.len(),
                "score": ledger.score(&user)?,
                "streak": ledger.streak(&user)?,
                "recent_business_days": recent,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        UserAction::History { user } => {
            let history = ledger.history(&user)?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
        UserAction::Badges { user } => {
            let registry = ledger.engine().registry();
            let awards = ledger.awards(&user)?;
            let badges: Vec<_> = ledger
                .badge_counts(&user)?
                .into_iter()
                .map(|(badge_id, count)| {
                    let badge = registry.get(badge_id);
                    let dates: Vec<_> = awards
                        .iter()
                        .filter(|award| award.badge_id == badge_id)
                        .map(|award| award.awarded_date)
                        .collect();
                    json!({
                        "badge_id": badge_id,
                        "message": badge.map(|b| b.message),
                        "condition": badge.map(|b| b.condition),
                        "count": count,
                        "awarded_dates": dates,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&badges)?);
        }
    }
    Ok(())
}
