//! # pennant_core - Dice-Resolved Baseball Season Engine
//!
//! Plays a league season one scheduled game at a time. Each game is resolved
//! from player cards and a handful of dice rolls rather than pitch by pitch:
//! the starter's outing, the bullpen share, runs scored, the extra-innings
//! tie-break and the W/L/S decisions all come from chart lookups.
//!
//! ## Features
//! - Deterministic: the same season seed replays the same season, and a
//!   season resumed from a save finishes identically
//! - Standings, team splits, Pythagorean wins and pitcher season lines
//! - Three-round postseason bracket
//! - Monte Carlo season projection across threads
//! - Compressed, checksummed season saves with version migration

// Engine entry points take both rosters, both arenas and the dice
#![allow(clippy::too_many_arguments)]
// Struct initialization pattern used in fixtures and tests
#![allow(clippy::field_reassign_with_default)]
#![allow(clippy::needless_range_loop)]

pub mod charts;
pub mod config;
pub mod data;
pub mod dice;
pub mod engine;
pub mod error;
pub mod fixtures;
pub mod models;
pub mod save;
pub mod season;
pub mod stats;

pub use charts::ResolutionCharts;
pub use config::EngineConfig;
pub use data::{load_league, write_league, LeagueData, LeagueFile};
pub use dice::{Dice, DieRoller};
pub use engine::{GameEngine, GameResult, GameSummary};
pub use error::{Result, SimError};
pub use models::{Batter, Pitcher, Team, TeamId};
pub use save::{SaveManager, SeasonSave};
pub use season::{project, DayReport, Postseason, Projection, Schedule, Season, SeasonState};
pub use stats::{LeagueStructure, Standings, StandingsSnapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
