//! Badge registry.
//!
//! The registry is an immutable table of badge types and definitions keyed
//! by id. It is validated once when built and then shared read-only by every
//! evaluation. Predicates are plain functions over a [`BadgeContext`].
//!
//! A badge is earned when its predicate holds after the new check-in but not
//! before it. Types whose predicates only describe the new arrival (its time,
//! the gap since the previous one, other users that day) use
//! [`AwardRule::EveryArrival`] and are earned on each arrival they describe.

mod catalogue;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::checkin::{CheckInEvent, CheckInRecord, DayContext};
use crate::error::ConfigError;
use crate::scoring::{ArrivalTier, StreakState};

pub use catalogue::{badge_definitions, badge_types, DEFAULT_ENABLED_TYPES};

pub type BadgeId = u32;
pub type BadgeTypeId = u32;

/// Predicate deciding whether a badge condition holds for a user's history.
pub type BadgePredicate = fn(&BadgeContext<'_>) -> bool;

/// How a badge type decides that one of its badges was newly earned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardRule {
    /// Predicate turned from false to true
    Transition,
    /// Predicate holds for the new arrival
    EveryArrival,
}

/// A family of related badges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeType {
    pub id: BadgeTypeId,
    pub name: &'static str,
    pub description: &'static str,
    /// Badges of this type only apply to check-ins on or after this date
    pub apply_start: Option<NaiveDate>,
    pub award_rule: AwardRule,
}

impl BadgeType {
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.apply_start.map_or(true, |start| date >= start)
    }
}

#[derive(Debug, Clone)]
pub struct BadgeDefinition {
    pub id: BadgeId,
    pub badge_type: BadgeTypeId,
    pub message: &'static str,
    pub condition: &'static str,
    pub level: u32,
    pub score: u32,
    pub predicate: BadgePredicate,
}

/// A badge earned by a user on a date. Awards are never revoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeAward {
    pub user_id: String,
    pub badge_id: BadgeId,
    pub awarded_date: NaiveDate,
}

/// Read-only view of a user's history that predicates run against.
#[derive(Debug, Clone, Copy)]
pub struct BadgeContext<'a> {
    /// Check-ins in ascending date order
    pub history: &'a [CheckInRecord],
    pub streak: Option<&'a StreakState>,
    /// Other users' check-ins; only known for the view after a new check-in
    pub day: Option<&'a DayContext>,
}

impl<'a> BadgeContext<'a> {
    pub fn new(history: &'a [CheckInRecord], streak: Option<&'a StreakState>) -> Self {
        Self {
            history,
            streak,
            day: None,
        }
    }

    pub fn with_day(self, day: &'a DayContext) -> Self {
        Self {
            day: Some(day),
            ..self
        }
    }

    pub fn count(&self) -> usize {
        self.history.len()
    }

    pub fn latest(&self) -> Option<&'a CheckInEvent> {
        self.history.last().map(|record| &record.event)
    }

    /// The check-in before the latest one.
    pub fn previous(&self) -> Option<&'a CheckInEvent> {
        let len = self.history.len();
        len.checked_sub(2).map(|i| &self.history[i].event)
    }

    pub fn latest_tier(&self) -> Option<ArrivalTier> {
        self.history.last().map(|record| record.tier)
    }

    pub fn latest_time(&self) -> Option<NaiveTime> {
        self.latest().map(|event| event.timestamp_of_day)
    }

    pub fn streak_length(&self) -> u32 {
        self.streak.map_or(0, |s| s.current_streak_length)
    }

    /// The last `n` check-ins, oldest first; fewer if history is short.
    pub fn recent(&self, n: usize) -> &'a [CheckInRecord] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    pub fn tiers(&self) -> impl Iterator<Item = ArrivalTier> + 'a {
        self.history.iter().map(|record| record.tier)
    }
}

/// Validated, immutable badge catalogue.
#[derive(Debug, Clone)]
pub struct BadgeRegistry {
    types: BTreeMap<BadgeTypeId, BadgeType>,
    definitions: BTreeMap<BadgeId, BadgeDefinition>,
    enabled_types: BTreeSet<BadgeTypeId>,
}

impl BadgeRegistry {
    /// Built-in catalogue with the default set of enabled badge types.
    pub fn standard() -> Result<Self, ConfigError> {
        Self::with_enabled_types(&DEFAULT_ENABLED_TYPES)
    }

    /// Process-wide standard registry, built on first use.
    pub fn shared() -> Result<Arc<Self>, ConfigError> {
        static STANDARD: OnceLock<Arc<BadgeRegistry>> = OnceLock::new();
        if let Some(registry) = STANDARD.get() {
            return Ok(Arc::clone(registry));
        }
        let registry = Arc::new(Self::standard()?);
        Ok(Arc::clone(STANDARD.get_or_init(|| registry)))
    }

    /// Built-in catalogue restricted to `enabled` badge types.
    pub fn with_enabled_types(enabled: &[BadgeTypeId]) -> Result<Self, ConfigError> {
        Self::from_catalogue(badge_types(), badge_definitions(), enabled)
    }

    /// Build and validate a registry.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidCatalogue`] on duplicate ids, a
    /// definition pointing at an unknown type, an unknown or empty enabled
    /// set, a level of zero or an empty message.
    pub fn from_catalogue(
        types: Vec<BadgeType>,
        definitions: Vec<BadgeDefinition>,
        enabled: &[BadgeTypeId],
    ) -> Result<Self, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidCatalogue(message);

        let mut type_map = BTreeMap::new();
        for badge_type in types {
            let id = badge_type.id;
            if type_map.insert(id, badge_type).is_some() {
                return Err(invalid(format!("duplicate badge type id {id}")));
            }
        }

        let mut definition_map = BTreeMap::new();
        for definition in definitions {
            let id = definition.id;
            if !type_map.contains_key(&definition.badge_type) {
                return Err(invalid(format!(
                    "badge {id} references unknown type {}",
                    definition.badge_type
                )));
            }
            if definition.level == 0 {
                return Err(invalid(format!("badge {id} has level 0")));
            }
            if definition.message.trim().is_empty() {
                return Err(invalid(format!("badge {id} has an empty message")));
            }
            if definition_map.insert(id, definition).is_some() {
                return Err(invalid(format!("duplicate badge id {id}")));
            }
        }

        if enabled.is_empty() {
            return Err(invalid("no badge types enabled".into()));
        }
        let mut enabled_types = BTreeSet::new();
        for type_id in enabled {
            if !type_map.contains_key(type_id) {
                return Err(invalid(format!("enabled badge type {type_id} does not exist")));
            }
            enabled_types.insert(*type_id);
        }

        Ok(Self {
            types: type_map,
            definitions: definition_map,
            enabled_types,
        })
    }

    /// Definitions of enabled badge types, ascending by badge id.
    pub fn all_definitions(&self) -> impl Iterator<Item = &BadgeDefinition> {
        self.definitions
            .values()
            .filter(|definition| self.enabled_types.contains(&definition.badge_type))
    }

    /// Every definition in the catalogue, enabled or not.
    pub fn catalogue(&self) -> impl Iterator<Item = &BadgeDefinition> {
        self.definitions.values()
    }

    pub fn badge_types(&self) -> impl Iterator<Item = &BadgeType> {
        self.types.values()
    }

    pub fn get(&self, id: BadgeId) -> Option<&BadgeDefinition> {
        self.definitions.get(&id)
    }

    pub fn badge_type(&self, id: BadgeTypeId) -> Option<&BadgeType> {
        self.types.get(&id)
    }

    pub fn is_enabled(&self, type_id: BadgeTypeId) -> bool {
        self.enabled_types.contains(&type_id)
    }

    /// Whether `definition` holds for `ctx`, honouring its type's start date.
    pub fn holds(&self, definition: &BadgeDefinition, ctx: &BadgeContext<'_>) -> bool {
        let Some(latest) = ctx.latest() else {
            return false;
        };
        let active = self
            .types
            .get(&definition.badge_type)
            .map_or(false, |badge_type| badge_type.applies_on(latest.calendar_date));
        active && (definition.predicate)(ctx)
    }

    fn award_rule(&self, definition: &BadgeDefinition) -> AwardRule {
        self.types
            .get(&definition.badge_type)
            .map_or(AwardRule::Transition, |badge_type| badge_type.award_rule)
    }

    /// Enabled definitions earned by moving from `before` to `after`.
    pub fn newly_satisfied<'r>(
        &'r self,
        before: &BadgeContext<'_>,
        after: &BadgeContext<'_>,
    ) -> Vec<&'r BadgeDefinition> {
        self.all_definitions()
            .filter(|definition| {
                self.holds(definition, after)
                    && match self.award_rule(definition) {
                        AwardRule::Transition => !self.holds(definition, before),
                        AwardRule::EveryArrival => true,
                    }
            })
            .collect()
    }
}
