//! Point thresholds and level names.
//!
//! Level `n` covers every total strictly below the `n`-th threshold. Totals
//! at or above the last threshold stay on the top level.

use serde::{Deserialize, Serialize};

struct LevelStep {
    name: &'static str,
    until: u32,
}

const LEVELS: [LevelStep; 12] = [
    LevelStep { name: "Fledgling Employee", until: 20 },
    LevelStep { name: "Apprentice Employee", until: 42 },
    LevelStep { name: "Learning Employee", until: 71 },
    LevelStep { name: "Half-Fledged Employee", until: 111 },
    LevelStep { name: "Confident Employee", until: 167 },
    LevelStep { name: "Full-Fledged Employee", until: 244 },
    LevelStep { name: "Seasoned Employee", until: 346 },
    LevelStep { name: "Specialist Employee", until: 478 },
    LevelStep { name: "Expert Employee", until: 644 },
    LevelStep { name: "Elite Employee", until: 849 },
    LevelStep { name: "Invincible Employee", until: 1098 },
    LevelStep { name: "Legendary Employee", until: 1400 },
];

pub const MAX_LEVEL: u32 = LEVELS.len() as u32;

/// Index of the step containing `points`, if below the last threshold.
fn step_index(points: u32) -> Option<usize> {
    LEVELS.iter().position(|step| points < step.until)
}

fn floor_of(index: usize) -> u32 {
    index.checked_sub(1).map_or(0, |prev| LEVELS[prev].until)
}

pub fn level(points: u32) -> u32 {
    step_index(points).map_or(MAX_LEVEL, |i| i as u32 + 1)
}

pub fn level_name(points: u32) -> &'static str {
    let index = step_index(points).unwrap_or(LEVELS.len() - 1);
    LEVELS[index].name
}

/// True when a threshold lies in `(previous, current]`.
pub fn is_level_up(previous: u32, current: u32) -> bool {
    LEVELS
        .iter()
        .any(|step| previous < step.until && step.until <= current)
}

/// Points still missing for the next level; zero on the top level.
pub fn points_to_next_level(points: u32) -> u32 {
    step_index(points).map_or(0, |i| LEVELS[i].until - points)
}

/// Width of the current level band; `None` past the last threshold.
pub fn point_range_to_next_level(points: u32) -> Option<u32> {
    step_index(points).map(|i| LEVELS[i].until - floor_of(i))
}

/// Points earned inside the current level band; `None` past the last threshold.
pub fn current_level_points(points: u32) -> Option<u32> {
    step_index(points).map(|i| points - floor_of(i))
}

/// Score bookkeeping after a check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub previous_score: u32,
    pub current_score: u32,
    pub level: u32,
    pub level_name: String,
    pub level_up: bool,
    pub points_to_next_level: u32,
    pub point_range_to_next_level: Option<u32>,
    pub current_level_points: Option<u32>,
}

impl ScoreUpdate {
    pub fn new(previous_score: u32, acquired: u32) -> Self {
        let current_score = previous_score.saturating_add(acquired);
        Self {
            previous_score,
            current_score,
            level: level(current_score),
            level_name: level_name(current_score).to_string(),
            level_up: is_level_up(previous_score, current_score),
            points_to_next_level: points_to_next_level(current_score),
            point_range_to_next_level: point_range_to_next_level(current_score),
            current_level_points: current_level_points(current_score),
        }
    }
}
