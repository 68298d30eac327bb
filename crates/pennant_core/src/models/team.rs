use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::pitcher::Pitcher;
use super::player::{Batter, InjuryStatus, LineupRole, Position};
use super::TeamId;

/// Pitchers at the head of the staff that form the starting rotation.
pub const ROTATION_SIZE: usize = 5;
/// Lineup slots before the bench begins.
pub const LINEUP_SIZE: usize = 9;

/// Home park modifiers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ballpark {
    pub name: String,
    pub capacity: u32,
    /// Added to every power bonus hit in this park.
    pub stadium_value: f64,
    /// Added to the home side's green die in an extra-innings tie-break.
    pub home_field_advantage: f64,
}

/// Unearned runs a team scores by dice sum (3..=10). Missing sums give 0.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnearnedRunsChart(BTreeMap<u8, u32>);

impl UnearnedRunsChart {
    pub fn new(entries: impl IntoIterator<Item = (u8, u32)>) -> Self {
        Self(entries.into_iter().collect())
    }

    pub fn runs_for(&self, dice_sum: u8) -> u32 {
        self.0.get(&dice_sum).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(alias = "team_id")]
    pub id: TeamId,
    #[serde(alias = "team_name")]
    pub name: String,
    /// Batting order: lineup slots 1-9 first, bench after.
    #[serde(default, alias = "players")]
    pub batters: Vec<Batter>,
    /// Rotation first, bullpen after.
    #[serde(default)]
    pub pitchers: Vec<Pitcher>,
    #[serde(default)]
    pub ballpark: Ballpark,
    #[serde(default, alias = "unearned_runs_chart")]
    pub unearned_runs: UnearnedRunsChart,
    #[serde(default)]
    pub rotation_cursor: usize,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            batters: Vec::new(),
            pitchers: Vec::new(),
            ballpark: Ballpark::default(),
            unearned_runs: UnearnedRunsChart::default(),
            rotation_cursor: 0,
        }
    }

    pub fn rotation_size(&self) -> usize {
        self.pitchers.len().min(ROTATION_SIZE)
    }

    /// Index of today's starter; advances the rotation cursor.
    pub fn select_starting_pitcher(&mut self) -> Option<usize> {
        let size = self.rotation_size();
        if size == 0 {
            return None;
        }
        let index = self.rotation_cursor % size;
        self.rotation_cursor = (index + 1) % size;
        Some(index)
    }

    /// Batters flagged as starters, in batting order.
    pub fn starting_lineup(&self) -> impl Iterator<Item = &Batter> {
        self.batters.iter().filter(|b| b.role == LineupRole::Starter)
    }

    /// Roster entry for a 1-based lineup slot (10 and up is the bench).
    pub fn lineup_slot(&self, slot: usize) -> Option<&Batter> {
        slot.checked_sub(1).and_then(|index| self.batters.get(index))
    }

    /// First batter listed at a fielding position.
    pub fn fielder_at(&self, position: Position) -> Option<&Batter> {
        self.batters.iter().find(|b| b.position == Some(position))
    }

    pub fn reliever_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.pitchers.iter().enumerate().filter(|(_, p)| p.is_reliever()).map(|(i, _)| i)
    }

    /// Clears injuries whose return day has arrived.
    pub fn heal_injuries(&mut self, day: u32) -> usize {
        let mut healed = 0;
        for batter in &mut self.batters {
            if batter.injury_status != InjuryStatus::Healthy
                && batter.injury_status.is_available(day)
            {
                log::info!("{} ({}) returns from injury on day {}", batter.name, self.name, day);
                batter.injury_status = InjuryStatus::Healthy;
                healed += 1;
            }
        }
        healed
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err(format!("team {} has no name", self.id));
        }
        if self.pitchers.is_empty() {
            return Err(format!("{} has no pitchers", self.name));
        }
        if self.starting_lineup().next().is_none() {
            return Err(format!("{} has no starting batters", self.name));
        }
        if self.rotation_cursor >= self.rotation_size() {
            return Err(format!(
                "{} rotation cursor {} outside rotation of {}",
                self.name,
                self.rotation_cursor,
                self.rotation_size()
            ));
        }
        Ok(())
    }
}
