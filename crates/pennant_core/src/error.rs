use thiserror::Error;

use crate::models::TeamId;

/// Failures raised by the game-day engine and the season driver.
///
/// Most of these are per-game faults: the season runner logs them and moves
/// on to the next matchup instead of aborting the whole season.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Team {0} is not part of this league")]
    MissingTeam(TeamId),

    #[error("Team {team} is already scheduled on day {day}")]
    DoubleBooked { team: TeamId, day: u32 },

    #[error("Team {0} has no pitchers to start")]
    EmptyRotation(TeamId),

    #[error("Cannot seed playoffs for {league}: {reason}")]
    InvalidPlayoffField { league: String, reason: String },

    #[error("Invalid schedule entry: {0}")]
    InvalidSchedule(String),

    #[error("Invalid engine config: {0}")]
    InvalidConfig(String),

    #[error("Invalid team data: {0}")]
    InvalidTeam(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Save error: {0}")]
    Save(#[from] crate::save::SaveError),
}

impl SimError {
    /// Whether the season can keep going after this error (only the affected
    /// game is lost).
    pub fn skips_game_only(&self) -> bool {
        matches!(
            self,
            SimError::MissingTeam(_) | SimError::DoubleBooked { .. } | SimError::EmptyRotation(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
