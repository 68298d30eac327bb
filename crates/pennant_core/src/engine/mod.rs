//! Game-day resolution engine.
//!
//! [`game::GameEngine::play`] drives one matchup end to end; the submodules
//! hold the individual steps so they can be exercised on their own.

pub mod decision;
pub mod extra_innings;
pub mod game;
pub mod injury;
pub mod relief;
pub mod runs;


pub use decision::{assign_decisions, Credit, Decisions, StaffLine};
pub use extra_innings::{resolve_extra_innings, ExtraArm, ExtraInningsOutcome, Side, TieBreakStep};
pub use game::{GameEngine, GameResult, GameSummary};
pub use injury::{check_injury, InjuryDuration, InjuryReport};
pub use relief::{allocate_relief, distribute_proportionally, BullpenArena, ReliefPick, ReliefPlan};
pub use runs::{resolve_runs, PitchingLine, RunContext, RunResolution, StartOutcome};
