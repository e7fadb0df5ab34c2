//! Arrival tiers.
//!
//! A tier is a pure function of the time of day. Each boundary is the last
//! instant of the earlier tier, so a check-in exactly on a boundary lands in
//! the stricter (earlier) bucket.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ScoringError};

/// How early a check-in was, earliest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalTier {
    Dawn,
    Early,
    OnTime,
    Late,
}

impl ArrivalTier {
    pub const ALL: [ArrivalTier; 4] = [
        ArrivalTier::Dawn,
        ArrivalTier::Early,
        ArrivalTier::OnTime,
        ArrivalTier::Late,
    ];

    /// Stable storage key.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArrivalTier::Dawn => "dawn",
            ArrivalTier::Early => "early",
            ArrivalTier::OnTime => "on_time",
            ArrivalTier::Late => "late",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.as_str() == value)
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ArrivalTier::Dawn => "dawn",
            ArrivalTier::Early => "early",
            ArrivalTier::OnTime => "on-time",
            ArrivalTier::Late => "late",
        }
    }
}

impl std::fmt::Display for ArrivalTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Valid day window and tier boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRules {
    /// First accepted time of day (inclusive)
    #[serde(default = "default_window_start")]
    pub window_start: NaiveTime,
    /// Last accepted time of day (inclusive)
    #[serde(default = "default_window_end")]
    pub window_end: NaiveTime,
    /// Last instant still counted as `Dawn`
    #[serde(default = "default_dawn_until")]
    pub dawn_until: NaiveTime,
    /// Last instant still counted as `Early`
    #[serde(default = "default_early_until")]
    pub early_until: NaiveTime,
    /// Last instant still counted as `OnTime`
    #[serde(default = "default_on_time_until")]
    pub on_time_until: NaiveTime,
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

fn default_window_start() -> NaiveTime {
    hm(6, 0)
}
fn default_window_end() -> NaiveTime {
    hm(18, 0)
}
fn default_dawn_until() -> NaiveTime {
    hm(7, 0)
}
fn default_early_until() -> NaiveTime {
    hm(9, 0)
}
fn default_on_time_until() -> NaiveTime {
    hm(11, 0)
}

impl Default for TierRules {
    fn default() -> Self {
        Self {
            window_start: default_window_start(),
            window_end: default_window_end(),
            dawn_until: default_dawn_until(),
            early_until: default_early_until(),
            on_time_until: default_on_time_until(),
        }
    }
}

impl TierRules {
    /// Reject windows and boundaries that cannot produce a total ordering.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_start >= self.window_end {
            return Err(ConfigError::InvalidValue {
                key: "scoring.window_start".into(),
                message: format!(
                    "window start {} must be before window end {}",
                    self.window_start, self.window_end
                ),
            });
        }
        let ordered = self.dawn_until < self.early_until && self.early_until < self.on_time_until;
        if !ordered {
            return Err(ConfigError::InvalidValue {
                key: "scoring.dawn_until".into(),
                message: format!(
                    "tier boundaries must be strictly increasing, got {} / {} / {}",
                    self.dawn_until, self.early_until, self.on_time_until
                ),
            });
        }
        Ok(())
    }

    /// Whether `time` is a well-formed time inside the day window.
    pub fn check_window(&self, time: NaiveTime) -> Result<(), ScoringError> {
        // chrono encodes a leap second as nanos >= 1e9
        let leap_second = time.nanosecond() >= 1_000_000_000;
        if leap_second || time < self.window_start || time > self.window_end {
            return Err(ScoringError::InvalidTimestamp {
                time,
                window_start: self.window_start,
                window_end: self.window_end,
            });
        }
        Ok(())
    }

    /// Classify a time of day. Does not check the window.
    pub fn classify(&self, time: NaiveTime) -> ArrivalTier {
        if time <= self.dawn_until {
            ArrivalTier::Dawn
        } else if time <= self.early_until {
            ArrivalTier::Early
        } else if time <= self.on_time_until {
            ArrivalTier::OnTime
        } else {
            ArrivalTier::Late
        }
    }

    pub fn tier_for(&self, time: NaiveTime) -> Result<ArrivalTier, ScoringError> {
        self.check_window(time)?;
        Ok(self.classify(time))
    }
}
