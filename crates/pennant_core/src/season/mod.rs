//! Season driver, schedule, postseason and projection.

pub mod playoffs;
pub mod projection;
pub mod runner;
pub mod schedule;

pub use playoffs::{seed_league, PlayoffField, PlayoffResult, Postseason, Round, SeriesResult};
pub use projection::{project, Projection, TeamProjection};
pub use runner::{play_matchup, DayReport, Season, SeasonState, SkippedGame};
pub use schedule::{Schedule, ScheduledGame};
