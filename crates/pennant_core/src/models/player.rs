use serde::{Deserialize, Serialize};

use super::pitcher::Throws;

/// Which side of the plate a batter hits from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Bats {
    #[default]
    #[serde(rename = "R")]
    Right,
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "S")]
    Switch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LineupRole {
    #[default]
    Starter,
    Bench,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "C")]
    Catcher,
    #[serde(rename = "1B")]
    FirstBase,
    #[serde(rename = "2B")]
    SecondBase,
    #[serde(rename = "3B")]
    ThirdBase,
    #[serde(rename = "SS")]
    Shortstop,
    #[serde(rename = "LF")]
    LeftField,
    #[serde(rename = "CF")]
    CenterField,
    #[serde(rename = "RF")]
    RightField,
    #[serde(rename = "DH")]
    DesignatedHitter,
}

/// Availability of a batter after the injury check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InjuryStatus {
    #[default]
    Healthy,
    Out {
        return_day: u32,
    },
    SeasonEnding,
}

impl InjuryStatus {
    pub fn is_available(&self, day: u32) -> bool {
        match self {
            InjuryStatus::Healthy => true,
            InjuryStatus::Out { return_day } => day >= *return_day,
            InjuryStatus::SeasonEnding => false,
        }
    }
}

/// A position player. Ratings missing from the input default to 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batter {
    pub name: String,
    #[serde(default)]
    pub role: LineupRole,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub bats: Bats,
    #[serde(default)]
    pub batting: f64,
    #[serde(default)]
    pub power: f64,
    #[serde(default)]
    pub eye: f64,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub fielding: f64,
    #[serde(default)]
    pub clutch: f64,
    /// Platoon split against left-handed pitching.
    #[serde(default, alias = "splits_L")]
    pub vs_left: f64,
    /// Platoon split against right-handed pitching.
    #[serde(default, alias = "splits_R")]
    pub vs_right: f64,
    /// Added to the days lost whenever this batter gets hurt.
    #[serde(default)]
    pub injury: i32,
    #[serde(default)]
    pub injury_status: InjuryStatus,
}

impl Batter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: LineupRole::Starter,
            position: None,
            bats: Bats::Right,
            batting: 0.0,
            power: 0.0,
            eye: 0.0,
            speed: 0.0,
            fielding: 0.0,
            clutch: 0.0,
            vs_left: 0.0,
            vs_right: 0.0,
            injury: 0,
            injury_status: InjuryStatus::Healthy,
        }
    }

    /// Own split against a pitcher's throwing arm; switch hitters have none.
    pub fn split_against(&self, throws: Throws) -> f64 {
        match (self.bats, throws) {
            (Bats::Switch, _) => 0.0,
            (_, Throws::Left) => self.vs_left,
            (_, Throws::Right) => self.vs_right,
        }
    }

    /// `batting + eye + power_weight * power`, before any platoon adjustment.
    pub fn raw_value(&self, power_weight: f64) -> f64 {
        self.batting + self.eye + power_weight * self.power
    }
}
