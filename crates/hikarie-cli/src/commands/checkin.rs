use hikarie_core::notify;
use hikarie_core::{CoreError, ScoringError};

use super::{local_datetime, open_ledger};

pub fn run(user: &str, at: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (config, ledger) = open_ledger()?;
    let at = local_datetime(&config, at)?;

    match ledger.check_in(user, at) {
        Ok(outcome) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", notify::format_outcome(&outcome, ledger.engine().registry()));
            }
        }
        // a second check-in on the same day is answered, not failed
        Err(CoreError::Scoring(err @ ScoringError::DuplicateCheckIn { .. })) => {
            if json {
                let value = serde_json::json!({
                    "duplicate": true,
                    "message": notify::format_rejection(&err),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", notify::format_rejection(&err));
            }
        }
        Err(CoreError::Scoring(err)) => return Err(notify::format_rejection(&err).into()),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
