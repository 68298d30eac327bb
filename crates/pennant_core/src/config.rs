//! # Engine Configuration
//!
//! Every tuning constant the resolution engine consults lives here so the
//! rules can be rebalanced (or loaded from JSON) without touching the engine.
//!
//! ```rust
//! use pennant_core::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! let low = EngineConfig::deterministic_low();
//! assert!(low.runs.bv_cap < config.runs.bv_cap);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Run resolution constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Batting Value never exceeds this after any bonus step.
    pub bv_cap: f64,
    /// Lower bound of the `start_value * white` divisor.
    pub min_run_divisor: f64,
    /// Weight of a batter's power in a batter's Batting Value contribution.
    pub power_weight: f64,
    pub shutout_min_white: u8,
    pub shutout_min_start_value: f64,
    pub complete_game_min_white: u8,
    pub complete_game_min_endurance: f64,
    /// A triad equal to this never yields a shutout or complete game.
    pub disqualifying_triad: u16,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            bv_cap: 135.0,
            min_run_divisor: 6.0,
            power_weight: 0.6,
            shutout_min_white: 5,
            shutout_min_start_value: 3.0,
            complete_game_min_white: 6,
            complete_game_min_endurance: 5.0,
            disqualifying_triad: 666,
        }
    }
}

/// How long the starter stays in and how many runs they wear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarterConfig {
    /// Earned runs at which the starter gets pulled early.
    pub pull_run_threshold: u32,
    /// Start Value at or above which an early pull costs one inning instead of two.
    pub pull_start_value: f64,
    pub pull_floor_innings: u32,
    pub weak_pull_floor_innings: u32,
    /// Endurance at or above which short rest costs one inning instead of two.
    pub short_rest_endurance: f64,
    pub short_rest_floor_innings: u32,
    /// `(earned runs threshold, extra runs)`, checked top-down, first match wins.
    pub run_bonus: Vec<(u32, u32)>,
}

impl Default for StarterConfig {
    fn default() -> Self {
        Self {
            pull_run_threshold: 8,
            pull_start_value: 5.0,
            pull_floor_innings: 3,
            weak_pull_floor_innings: 2,
            short_rest_endurance: 4.0,
            short_rest_floor_innings: 2,
            run_bonus: vec![(16, 8), (14, 4), (12, 2), (10, 1)],
        }
    }
}

impl StarterConfig {
    pub fn run_bonus_for(&self, earned_runs: u32) -> u32 {
        self.run_bonus
            .iter()
            .find(|(threshold, _)| earned_runs >= *threshold)
            .map(|(_, bonus)| *bonus)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliefConfig {
    /// Relievers used when the bullpen owes this many outs or more.
    pub default_threshold_outs: u32,
    pub default_count: usize,
    /// Divisor applied to a reliever's fatigue rating.
    pub fatigue_scale: f64,
    /// Multipliers for 0, 1 and 2 days since the last relief appearance.
    pub fatigue_factors: [f64; 3],
}

impl Default for ReliefConfig {
    fn default() -> Self {
        Self {
            default_threshold_outs: 15,
            default_count: 5,
            fatigue_scale: 8.0,
            fatigue_factors: [0.5, 0.75, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Innings a starter must complete to be eligible for the W or L.
    pub starter_min_innings: u32,
    pub save_max_margin: u32,
    /// Relievers going this many innings get first claim on a save.
    pub long_relief_innings: u32,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self { starter_min_innings: 5, save_max_margin: 3, long_relief_innings: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostseasonConfig {
    /// Days between the last regular-season day and game one.
    pub start_gap_days: u32,
    pub series_length: u32,
    /// `true` = higher seed at home, indexed by game number.
    pub home_pattern: Vec<bool>,
}

impl Default for PostseasonConfig {
    fn default() -> Self {
        Self {
            start_gap_days: 3,
            series_length: 7,
            home_pattern: vec![true, true, false, false, false, true, true],
        }
    }
}

impl PostseasonConfig {
    pub fn wins_needed(&self) -> u32 {
        self.series_length / 2 + 1
    }

    /// Series must be a positive odd number of games so one side always
    /// reaches `wins_needed`.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.series_length == 0 || self.series_length % 2 == 0 {
            return Err(format!("series_length must be odd, got {}", self.series_length));
        }
        Ok(())
    }

    pub fn higher_seed_home(&self, game_index: usize) -> bool {
        self.home_pattern.get(game_index).copied().unwrap_or(game_index % 2 == 0)
    }
}

/// All engine tuning in one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub runs: RunConfig,
    #[serde(default)]
    pub starter: StarterConfig,
    #[serde(default)]
    pub relief: ReliefConfig,
    #[serde(default)]
    pub decisions: DecisionConfig,
    #[serde(default)]
    pub postseason: PostseasonConfig,
}

impl EngineConfig {
    /// The rules as published with the board game.
    pub fn standard() -> Self {
        Self::default()
    }

    /// Low-scoring variant for tests: small BV cap keeps run totals tiny.
    pub fn deterministic_low() -> Self {
        let mut cfg = Self::default();
        cfg.runs.bv_cap = 60.0;
        cfg.runs.min_run_divisor = 10.0;
        cfg
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        self.postseason.validate()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate().map_err(SimError::InvalidConfig)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = EngineConfig::default();
        assert!((cfg.runs.bv_cap - 135.0).abs() < f64::EPSILON);
        assert_eq!(cfg.starter.pull_run_threshold, 8);
        assert_eq!(cfg.relief.default_count, 5);
        assert_eq!(cfg.postseason.wins_needed(), 4);
    }

    #[test]
    fn test_run_bonus_schedule() {
        let starter = StarterConfig::default();
        assert_eq!(starter.run_bonus_for(9), 0);
        assert_eq!(starter.run_bonus_for(10), 1);
        assert_eq!(starter.run_bonus_for(13), 2);
        assert_eq!(starter.run_bonus_for(14), 4);
        assert_eq!(starter.run_bonus_for(21), 8);
    }

    #[test]
    fn test_home_pattern_is_two_three_two() {
        let post = PostseasonConfig::default();
        let pattern: Vec<bool> = (0..7).map(|g| post.higher_seed_home(g)).collect();
        assert_eq!(pattern, vec![true, true, false, false, false, true, true]);
    }

    #[test]
    fn test_series_length_must_be_odd() {
        for bad in [0, 6] {
            let json = format!(r#"{{"postseason": {{"series_length": {}}}}}"#, bad);
            let err = EngineConfig::from_json_str(&json).unwrap_err();
            assert!(matches!(err, SimError::InvalidConfig(_)));
        }
        let cfg = EngineConfig::from_json_str(r#"{"postseason": {"series_length": 5}}"#).unwrap();
        assert_eq!(cfg.postseason.wins_needed(), 3);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg = EngineConfig::from_json_str(r#"{"runs": {"bv_cap": 100.0}}"#).unwrap();
        assert!((cfg.runs.bv_cap - 100.0).abs() < f64::EPSILON);
        assert!((cfg.runs.min_run_divisor - 6.0).abs() < f64::EPSILON);
        assert_eq!(cfg.decisions.save_max_margin, 3);
    }
}
