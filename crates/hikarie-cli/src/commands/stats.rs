use std::collections::BTreeMap;

use clap::Subcommand;
use hikarie_core::calendar::holiday_name;
use hikarie_core::BusinessCalendar;
use serde_json::json;

use super::{local_date, open_ledger};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Arrivals for one day, earliest first
    Day {
        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let (config, ledger) = open_ledger()?;

    match action {
        StatsAction::Day { date } => {
            let date = local_date(&config, date.as_deref())?;
            let arrivals = ledger.arrivals_on(date)?;

            let mut tiers: BTreeMap<&str, usize> = BTreeMap::new();
            for entry in &arrivals {
                *tiers.entry(entry.tier.as_str()).or_default() += 1;
            }

            let value = json!({
                "date": date,
                "business_day": ledger.engine().calendar().is_business_day(date),
                "holiday": holiday_name(date),
                "total": arrivals.len(),
                "tiers": tiers,
                "arrivals": arrivals,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}
