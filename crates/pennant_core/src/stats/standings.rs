//! League structure and the standings table built over it.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::team_stats::TeamStats;
use crate::engine::GameResult;
use crate::models::TeamId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division {
    pub name: String,
    pub teams: Vec<TeamId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub name: String,
    pub divisions: Vec<Division>,
}

/// Leagues, their divisions and the teams in each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueStructure {
    pub leagues: Vec<League>,
}

impl LeagueStructure {
    pub fn team_ids(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.leagues
            .iter()
            .flat_map(|league| league.divisions.iter())
            .flat_map(|division| division.teams.iter().copied())
    }

    pub fn league_of(&self, team: TeamId) -> Option<&League> {
        self.leagues
            .iter()
            .find(|league| league.divisions.iter().any(|d| d.teams.contains(&team)))
    }

    pub fn division_of(&self, team: TeamId) -> Option<&Division> {
        self.leagues
            .iter()
            .flat_map(|league| league.divisions.iter())
            .find(|division| division.teams.contains(&team))
    }

    /// Every team must appear exactly once.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = std::collections::BTreeSet::new();
        for team in self.team_ids() {
            if !seen.insert(team) {
                return Err(format!("team {} is listed in more than one division", team));
            }
        }
        if seen.is_empty() {
            return Err("league structure lists no teams".to_string());
        }
        Ok(())
    }
}

/// Orders teams best first: winning percentage, then run differential,
/// then team id for a stable result.
pub fn by_record(a: &TeamStats, b: &TeamStats) -> Ordering {
    b.win_pct()
        .total_cmp(&a.win_pct())
        .then_with(|| b.run_differential().cmp(&a.run_differential()))
        .then_with(|| a.team.cmp(&b.team))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Standings {
    teams: BTreeMap<TeamId, TeamStats>,
}

impl Standings {
    pub fn new(teams: impl IntoIterator<Item = TeamId>) -> Self {
        Self { teams: teams.into_iter().map(|id| (id, TeamStats::new(id))).collect() }
    }

    pub fn record_game(&mut self, result: &GameResult) {
        for team in [result.home, result.away] {
            self.teams.entry(team).or_insert_with(|| TeamStats::new(team)).record_game(result);
        }
    }

    /// Replaces a team's line outright.
    pub fn insert(&mut self, stats: TeamStats) {
        self.teams.insert(stats.team, stats);
    }

    pub fn get(&self, team: TeamId) -> Option<&TeamStats> {
        self.teams.get(&team)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TeamStats> {
        self.teams.values()
    }

    pub fn games_recorded(&self) -> u32 {
        self.teams.values().map(|s| s.games_played()).sum::<u32>() / 2
    }

    /// Division teams, best record first.
    pub fn division_table(&self, division: &Division) -> Vec<&TeamStats> {
        let mut rows: Vec<&TeamStats> =
            division.teams.iter().filter_map(|id| self.teams.get(id)).collect();
        rows.sort_by(|a, b| by_record(a, b));
        rows
    }

    pub fn snapshot(&self, day: u32, structure: &LeagueStructure) -> StandingsSnapshot {
        let divisions = structure
            .leagues
            .iter()
            .flat_map(|league| {
                league.divisions.iter().map(move |division| (league.name.as_str(), division))
            })
            .map(|(league, division)| {
                let table = self.division_table(division);
                let rows = match table.first() {
                    Some(leader) => table.iter().map(|stats| StandingRow::new(stats, leader)).collect(),
                    None => Vec::new(),
                };
                DivisionStandings {
                    league: league.to_string(),
                    division: division.name.clone(),
                    rows,
                }
            })
            .collect();
        StandingsSnapshot { day, divisions }
    }
}

/// One line of a printed standings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingRow {
    pub team: TeamId,
    pub wins: u32,
    pub losses: u32,
    pub win_pct: f64,
    pub games_behind: f64,
    pub runs_scored: u32,
    pub runs_allowed: u32,
    pub pythagorean_wins: u32,
    pub pythagorean_losses: u32,
    pub luck: i64,
    pub home: String,
    pub away: String,
    pub one_run: String,
    pub extra_innings: String,
    pub vs_right: String,
    pub vs_left: String,
    pub streak: String,
    pub longest_winning_streak: u32,
    pub longest_losing_streak: u32,
    pub most_runs_scored: u32,
    pub most_runs_allowed: u32,
}

impl StandingRow {
    fn new(stats: &TeamStats, leader: &TeamStats) -> Self {
        Self {
            team: stats.team,
            wins: stats.wins(),
            losses: stats.losses(),
            win_pct: stats.win_pct(),
            games_behind: stats.games_behind(leader),
            runs_scored: stats.runs_scored,
            runs_allowed: stats.runs_allowed,
            pythagorean_wins: stats.pythagorean_wins(),
            pythagorean_losses: stats.pythagorean_losses(),
            luck: stats.luck(),
            home: stats.home.to_string(),
            away: stats.away.to_string(),
            one_run: stats.one_run.to_string(),
            extra_innings: stats.extra_innings.to_string(),
            vs_right: stats.vs_right.to_string(),
            vs_left: stats.vs_left.to_string(),
            streak: stats.streak.to_string(),
            longest_winning_streak: stats.streak.longest_winning,
            longest_losing_streak: stats.streak.longest_losing,
            most_runs_scored: stats.most_runs_scored,
            most_runs_allowed: stats.most_runs_allowed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionStandings {
    pub league: String,
    pub division: String,
    pub rows: Vec<StandingRow>,
}

/// Standings as of the end of `day`, ready to write out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsSnapshot {
    pub day: u32,
    pub divisions: Vec<DivisionStandings>,
}
