use serde::{Deserialize, Serialize};

use super::player::Bats;
use crate::config::ReliefConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Throws {
    #[default]
    #[serde(rename = "R")]
    Right,
    #[serde(rename = "L")]
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PitcherRole {
    #[default]
    #[serde(alias = "SP")]
    Starter,
    #[serde(alias = "RP")]
    Reliever,
}

fn default_threshold() -> u16 {
    666
}

/// A pitcher card.
///
/// `cg_rating` and `sho_rating` are triad thresholds on the 611-666 scale: the
/// triad must be strictly greater, so the default of 666 never qualifies.
/// `last_start_day` and `last_relief_day` stay `None` until the first
/// appearance, which reads as fully rested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pitcher {
    pub name: String,
    #[serde(default, alias = "type")]
    pub role: PitcherRole,
    #[serde(default)]
    pub throws: Throws,
    #[serde(default)]
    pub start_value: f64,
    #[serde(default)]
    pub endurance: f64,
    /// Days required between starts.
    #[serde(default)]
    pub rest: u32,
    #[serde(default)]
    pub relief_value: f64,
    #[serde(default)]
    pub fatigue: f64,
    #[serde(default)]
    pub clutch: f64,
    #[serde(default = "default_threshold")]
    pub cg_rating: u16,
    #[serde(default = "default_threshold")]
    pub sho_rating: u16,
    #[serde(default)]
    pub injury: i32,
    #[serde(default, alias = "splits_L")]
    pub vs_left: f64,
    #[serde(default, alias = "splits_R")]
    pub vs_right: f64,
    #[serde(default)]
    pub last_start_day: Option<u32>,
    #[serde(default)]
    pub last_relief_day: Option<u32>,
}

impl Pitcher {
    pub fn new(name: impl Into<String>, role: PitcherRole) -> Self {
        Self {
            name: name.into(),
            role,
            throws: Throws::Right,
            start_value: 0.0,
            endurance: 0.0,
            rest: 0,
            relief_value: 0.0,
            fatigue: 0.0,
            clutch: 0.0,
            cg_rating: default_threshold(),
            sho_rating: default_threshold(),
            injury: 0,
            vs_left: 0.0,
            vs_right: 0.0,
            last_start_day: None,
            last_relief_day: None,
        }
    }

    pub fn is_reliever(&self) -> bool {
        self.role == PitcherRole::Reliever
    }

    pub fn days_since_start(&self, day: u32) -> Option<u32> {
        self.last_start_day.map(|last| day.saturating_sub(last))
    }

    pub fn days_since_relief(&self, day: u32) -> Option<u32> {
        self.last_relief_day.map(|last| day.saturating_sub(last))
    }

    /// Started again before the required rest elapsed.
    pub fn is_short_rested(&self, day: u32) -> bool {
        matches!(self.days_since_start(day), Some(days) if days < self.rest)
    }

    /// Scale applied to relief value for recent work; 1.0 when rested.
    pub fn fatigue_multiplier(&self, day: u32, cfg: &ReliefConfig) -> f64 {
        let base = self.fatigue / cfg.fatigue_scale;
        match self.days_since_relief(day) {
            Some(0) => base * cfg.fatigue_factors[0],
            Some(1) => base * cfg.fatigue_factors[1],
            Some(2) => base * cfg.fatigue_factors[2],
            _ => 1.0,
        }
    }

    /// The pitcher's split against the batter's side; switch hitters none.
    pub fn split_against(&self, bats: Bats) -> f64 {
        match bats {
            Bats::Left => self.vs_left,
            Bats::Right => self.vs_right,
            Bats::Switch => 0.0,
        }
    }
}
