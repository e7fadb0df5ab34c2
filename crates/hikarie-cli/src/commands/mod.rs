pub mod badges;
pub mod checkin;
pub mod config;
pub mod stats;
pub mod user;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use hikarie_core::{AttendanceLedger, Config};

/// Load configuration and open the ledger it describes.
pub fn open_ledger() -> Result<(Config, AttendanceLedger), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let ledger = AttendanceLedger::open(&config)?;
    Ok((config, ledger))
}

/// Office-local date-time for `at`, or for now when absent.
pub fn local_datetime(
    config: &Config,
    at: Option<&str>,
) -> Result<NaiveDateTime, Box<dyn std::error::Error>> {
    let offset = config.utc_offset()?;
    let instant = match at {
        Some(at) => DateTime::parse_from_rfc3339(at)
            .map_err(|e| format!("invalid --at '{at}': {e}"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };
    let local = instant.with_timezone(&offset).naive_local();
    tracing::debug!(%instant, %offset, %local, "resolved office time");
    Ok(local)
}

/// `date` parsed as YYYY-MM-DD, or today in office time.
pub fn local_date(
    config: &Config,
    date: Option<&str>,
) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match date {
        Some(date) => Ok(NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{date}': {e}"))?),
        None => Ok(local_datetime(config, None)?.date()),
    }
}
