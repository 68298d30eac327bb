//! Day-by-day season driver.
//!
//! Teams live in a map owned by [`SeasonState`]. Each matchup takes its two
//! teams out of the map, plays, and puts them back, so a game holds the only
//! mutable handle to either roster while it runs.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::schedule::{Schedule, ScheduledGame};
use crate::dice::Dice;
use crate::engine::{GameEngine, GameResult, GameSummary};
use crate::error::{Result, SimError};
use crate::models::{Team, TeamId};
use crate::stats::{LeagueStructure, PitchingLedger, Standings, StandingsSnapshot};

/// Everything that changes as the season is played. Saved at day
/// boundaries; resuming from it replays the remaining days identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonState {
    pub seed: u64,
    /// First day not yet played.
    pub next_day: u32,
    pub teams: BTreeMap<TeamId, Team>,
    pub standings: Standings,
    pub pitching: PitchingLedger,
    pub game_log: Vec<GameSummary>,
}

impl SeasonState {
    pub fn new(teams: Vec<Team>, seed: u64) -> Self {
        let standings = Standings::new(teams.iter().map(|t| t.id));
        Self {
            seed,
            next_day: 1,
            teams: teams.into_iter().map(|t| (t.id, t)).collect(),
            standings,
            pitching: PitchingLedger::new(),
            game_log: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedGame {
    pub home: TeamId,
    pub away: TeamId,
    pub reason: String,
}

/// What happened on one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayReport {
    pub day: u32,
    pub games: Vec<GameSummary>,
    pub skipped: Vec<SkippedGame>,
    /// Players back from injury this morning.
    pub returned_from_injury: usize,
}

/// Takes both teams out of `teams`, plays them and puts them back.
pub fn play_matchup(
    engine: &GameEngine,
    teams: &mut BTreeMap<TeamId, Team>,
    home: TeamId,
    away: TeamId,
    day: u32,
    dice: &mut Dice,
) -> Result<GameResult> {
    if home == away {
        return Err(SimError::DoubleBooked { team: home, day });
    }
    let mut home_team = teams.remove(&home).ok_or(SimError::MissingTeam(home))?;
    let Some(mut away_team) = teams.remove(&away) else {
        teams.insert(home, home_team);
        return Err(SimError::MissingTeam(away));
    };
    let outcome = engine.play(&mut home_team, &mut away_team, day, dice);
    teams.insert(home, home_team);
    teams.insert(away, away_team);
    outcome
}

#[derive(Debug, Clone)]
pub struct Season {
    engine: GameEngine,
    structure: LeagueStructure,
    schedule: Schedule,
    state: SeasonState,
}

impl Season {
    pub fn new(
        engine: GameEngine,
        structure: LeagueStructure,
        schedule: Schedule,
        teams: Vec<Team>,
        seed: u64,
    ) -> Result<Self> {
        structure.validate().map_err(SimError::InvalidTeam)?;
        for team in &teams {
            team.validate().map_err(SimError::InvalidTeam)?;
        }
        Ok(Self::resume(engine, structure, schedule, SeasonState::new(teams, seed)))
    }

    pub fn resume(
        engine: GameEngine,
        structure: LeagueStructure,
        schedule: Schedule,
        state: SeasonState,
    ) -> Self {
        Self { engine, structure, schedule, state }
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn structure(&self) -> &LeagueStructure {
        &self.structure
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn state(&self) -> &SeasonState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SeasonState {
        &mut self.state
    }

    pub fn into_state(self) -> SeasonState {
        self.state
    }

    /// Replaces the seed for the days still to be played.
    pub fn reseed(&mut self, seed: u64) {
        self.state.seed = seed;
    }

    pub fn is_complete(&self) -> bool {
        self.remaining_days().is_empty()
    }

    pub fn remaining_days(&self) -> Vec<u32> {
        let next = self.state.next_day;
        self.schedule.days().into_iter().filter(|day| *day >= next).collect()
    }

    pub fn last_day(&self) -> u32 {
        self.schedule.last_day().unwrap_or(0)
    }

    pub fn snapshot(&self) -> StandingsSnapshot {
        self.state.standings.snapshot(self.state.next_day.saturating_sub(1), &self.structure)
    }

    /// Plays every game scheduled on `day`. Matchups that cannot be played
    /// (unknown team, team already playing today, no pitchers) are logged
    /// and skipped.
    pub fn play_day(&mut self, day: u32) -> DayReport {
        let mut report = DayReport { day, ..Default::default() };
        report.returned_from_injury =
            self.state.teams.values_mut().map(|team| team.heal_injuries(day)).sum();

        let games: Vec<ScheduledGame> = self.schedule.games_on(day).cloned().collect();
        let mut booked = BTreeSet::new();
        for (index, game) in games.iter().enumerate() {
            match self.play_scheduled(game, index as u32, &mut booked) {
                Ok(result) => {
                    let summary = result.summary();
                    self.state.standings.record_game(&result);
                    self.state.pitching.record_game(&result);
                    self.state.game_log.push(summary.clone());
                    report.games.push(summary);
                }
                Err(err) => {
                    log::warn!(
                        "Skipping day {} game {} at {}: {}",
                        day,
                        game.away,
                        game.home,
                        err
                    );
                    report.skipped.push(SkippedGame {
                        home: game.home,
                        away: game.away,
                        reason: err.to_string(),
                    });
                }
            }
        }

        self.state.next_day = self.state.next_day.max(day + 1);
        log::debug!("Day {} complete: {} played, {} skipped", day, report.games.len(), report.skipped.len());
        report
    }

    fn play_scheduled(
        &mut self,
        game: &ScheduledGame,
        index: u32,
        booked: &mut BTreeSet<TeamId>,
    ) -> Result<GameResult> {
        for team in [game.home, game.away] {
            if !self.state.teams.contains_key(&team) {
                return Err(SimError::MissingTeam(team));
            }
            if booked.contains(&team) {
                return Err(SimError::DoubleBooked { team, day: game.day });
            }
        }
        booked.insert(game.home);
        booked.insert(game.away);

        let mut dice = Dice::for_game(self.state.seed, game.day, index);
        play_matchup(&self.engine, &mut self.state.teams, game.home, game.away, game.day, &mut dice)
    }

    /// Plays remaining days up to and including `through` (or the end of the
    /// schedule). `on_day` runs after each day, typically to save; an error
    /// from it stops the run.
    pub fn play_through<F>(&mut self, through: Option<u32>, mut on_day: F) -> Result<Vec<DayReport>>
    where
        F: FnMut(&DayReport, &SeasonState) -> Result<()>,
    {
        let mut reports = Vec::new();
        for day in self.remaining_days() {
            if through.is_some_and(|last| day > last) {
                break;
            }
            let report = self.play_day(day);
            on_day(&report, &self.state)?;
            reports.push(report);
        }
        Ok(reports)
    }

    pub fn play_to_end(&mut self) -> Vec<DayReport> {
        let mut reports = Vec::new();
        for day in self.remaining_days() {
            reports.push(self.play_day(day));
        }
        reports
    }
}
