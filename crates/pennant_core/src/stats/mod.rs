pub mod pitcher_stats;
pub mod standings;
pub mod team_stats;

pub use pitcher_stats::{PitcherSeasonLine, PitchingLedger};
pub use standings::{
    by_record, Division, DivisionStandings, League, LeagueStructure, StandingRow, Standings,
    StandingsSnapshot,
};
pub use team_stats::{Record, Streak, TeamStats};
