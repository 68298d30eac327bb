//! Entity records the engine reads and mutates: teams, batters, pitchers,
//! and the innings/outs unit they are measured in.

pub mod innings;
pub mod pitcher;
pub mod player;
pub mod team;

pub use innings::Outs;
pub use pitcher::{Pitcher, PitcherRole, Throws};
pub use player::{Bats, Batter, InjuryStatus, LineupRole, Position};
pub use team::{Ballpark, Team, UnearnedRunsChart};

use serde::{Deserialize, Serialize};
use std::fmt;

/// League-wide team identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub u32);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TeamId {
    fn from(id: u32) -> Self {
        TeamId(id)
    }
}
