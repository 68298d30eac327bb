//! Postseason: three division winners and a wildcard per league, two
//! best-of-seven rounds inside each league, then a final between the two
//! league champions.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::runner::play_matchup;
use crate::dice::{game_seed, Dice};
use crate::engine::{GameEngine, GameSummary};
use crate::error::{Result, SimError};
use crate::models::{Team, TeamId};
use crate::stats::{League, LeagueStructure, Standings, TeamStats};

/// Division winners taken into the bracket, per league.
pub const DIVISION_WINNERS: usize = 3;
/// Mixed into the season seed so postseason dice never repeat a regular
/// season game's dice.
const POSTSEASON_SALT: u64 = 0x706c_6179_6f66_6673;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Round {
    DivisionSeries,
    LeagueChampionship,
    Final,
}

/// A league's seeded playoff teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffField {
    pub league: String,
    /// Best first.
    pub division_winners: Vec<TeamId>,
    pub wildcard: TeamId,
}

impl PlayoffField {
    pub fn teams(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.division_winners.iter().copied().chain(std::iter::once(self.wildcard))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesResult {
    pub round: Round,
    pub higher_seed: TeamId,
    pub lower_seed: TeamId,
    pub winner: TeamId,
    pub higher_seed_wins: u32,
    pub lower_seed_wins: u32,
    pub games: Vec<GameSummary>,
}

impl SeriesResult {
    pub fn loser(&self) -> TeamId {
        if self.winner == self.higher_seed {
            self.lower_seed
        } else {
            self.higher_seed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffResult {
    pub fields: Vec<PlayoffField>,
    pub series: Vec<SeriesResult>,
    pub champion: TeamId,
}

impl PlayoffResult {
    pub fn qualifiers(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.fields.iter().flat_map(|field| field.teams())
    }
}

/// Seeding order: wins, then run differential, then lower team id.
fn by_wins(a: &TeamStats, b: &TeamStats) -> Ordering {
    b.wins()
        .cmp(&a.wins())
        .then_with(|| b.run_differential().cmp(&a.run_differential()))
        .then_with(|| a.team.cmp(&b.team))
}

fn stats_for(standings: &Standings, team: TeamId) -> TeamStats {
    standings.get(team).cloned().unwrap_or_else(|| TeamStats::new(team))
}

pub fn seed_league(league: &League, standings: &Standings) -> Result<PlayoffField> {
    let invalid = |reason: String| SimError::InvalidPlayoffField {
        league: league.name.clone(),
        reason,
    };
    if league.divisions.len() < DIVISION_WINNERS {
        return Err(invalid(format!(
            "needs {} divisions, found {}",
            DIVISION_WINNERS,
            league.divisions.len()
        )));
    }

    let mut winners = Vec::new();
    let mut candidates = Vec::new();
    for division in &league.divisions {
        let mut table: Vec<TeamStats> =
            division.teams.iter().map(|id| stats_for(standings, *id)).collect();
        table.sort_by(by_wins);
        let mut rest = table.into_iter();
        let winner = rest
            .next()
            .ok_or_else(|| invalid(format!("division {} has no teams", division.name)))?;
        winners.push(winner);
        candidates.extend(rest);
    }

    winners.sort_by(by_wins);
    // Extra division winners beyond the bracket size compete for the wildcard.
    candidates.extend(winners.split_off(DIVISION_WINNERS));
    candidates.sort_by(by_wins);
    let wildcard = candidates
        .first()
        .map(|stats| stats.team)
        .ok_or_else(|| invalid("no wildcard candidate".to_string()))?;

    let field = PlayoffField {
        league: league.name.clone(),
        division_winners: winners.iter().map(|stats| stats.team).collect(),
        wildcard,
    };
    log::info!(
        "{} playoff field: division winners {:?}, wildcard {}",
        field.league,
        field.division_winners,
        field.wildcard
    );
    Ok(field)
}

/// Runs the whole bracket. Games are played one per day starting
/// `start_gap_days` after `last_regular_day`.
pub struct Postseason<'a> {
    engine: &'a GameEngine,
    seed: u64,
    day: u32,
}

impl<'a> Postseason<'a> {
    pub fn new(engine: &'a GameEngine, seed: u64, last_regular_day: u32) -> Self {
        let day = last_regular_day + engine.config.postseason.start_gap_days;
        Self { engine, seed: seed ^ POSTSEASON_SALT, day }
    }

    /// Day the next playoff game will be played.
    pub fn current_day(&self) -> u32 {
        self.day
    }

    pub fn run(
        &mut self,
        structure: &LeagueStructure,
        standings: &Standings,
        teams: &mut BTreeMap<TeamId, Team>,
    ) -> Result<PlayoffResult> {
        if structure.leagues.len() != 2 {
            return Err(SimError::InvalidPlayoffField {
                league: "all".to_string(),
                reason: format!("needs exactly 2 leagues, found {}", structure.leagues.len()),
            });
        }
        let fields = structure
            .leagues
            .iter()
            .map(|league| seed_league(league, standings))
            .collect::<Result<Vec<_>>>()?;

        let mut series = Vec::new();
        let mut champions = Vec::new();
        for field in &fields {
            let first = self.series(
                Round::DivisionSeries,
                field.division_winners[0],
                field.wildcard,
                teams,
            )?;
            let second = self.series(
                Round::DivisionSeries,
                field.division_winners[1],
                field.division_winners[2],
                teams,
            )?;
            let (higher, lower) = order_seeds(standings, first.winner, second.winner);
            let championship = self.series(Round::LeagueChampionship, higher, lower, teams)?;
            log::info!("{} champion: {}", field.league, championship.winner);
            champions.push(championship.winner);
            series.extend([first, second, championship]);
        }

        let (higher, lower) = order_seeds(standings, champions[0], champions[1]);
        let last = self.series(Round::Final, higher, lower, teams)?;
        let champion = last.winner;
        series.push(last);
        log::info!("Champion: {}", champion);

        Ok(PlayoffResult { fields, series, champion })
    }

    /// Best-of-`series_length`; home field follows the configured pattern
    /// (2-3-2 by default) from the higher seed's side.
    pub fn series(
        &mut self,
        round: Round,
        higher_seed: TeamId,
        lower_seed: TeamId,
        teams: &mut BTreeMap<TeamId, Team>,
    ) -> Result<SeriesResult> {
        let cfg = &self.engine.config.postseason;
        let needed = cfg.wins_needed();
        let (mut higher_wins, mut lower_wins) = (0, 0);
        let mut games = Vec::new();

        for game_index in 0..cfg.series_length as usize {
            if higher_wins == needed || lower_wins == needed {
                break;
            }
            let (home, away) = if cfg.higher_seed_home(game_index) {
                (higher_seed, lower_seed)
            } else {
                (lower_seed, higher_seed)
            };
            let mut dice = Dice::from_seed(game_seed(self.seed, self.day, 0));
            let result = play_matchup(self.engine, teams, home, away, self.day, &mut dice)?;
            if result.winner() == higher_seed {
                higher_wins += 1;
            } else {
                lower_wins += 1;
            }
            games.push(result.summary());
            self.day += 1;
        }

        let winner = if higher_wins > lower_wins { higher_seed } else { lower_seed };
        log::info!(
            "{:?}: {} over {} ({}-{})",
            round,
            winner,
            if winner == higher_seed { lower_seed } else { higher_seed },
            higher_wins.max(lower_wins),
            higher_wins.min(lower_wins)
        );
        Ok(SeriesResult {
            round,
            higher_seed,
            lower_seed,
            winner,
            higher_seed_wins: higher_wins,
            lower_seed_wins: lower_wins,
            games,
        })
    }
}

fn order_seeds(standings: &Standings, a: TeamId, b: TeamId) -> (TeamId, TeamId) {
    match by_wins(&stats_for(standings, a), &stats_for(standings, b)) {
        Ordering::Greater => (b, a),
        _ => (a, b),
    }
}
