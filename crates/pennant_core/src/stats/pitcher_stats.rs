//! Season lines for every pitcher who appears.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::engine::{Credit, GameResult, PitchingLine, StaffLine};
use crate::models::{Outs, TeamId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitcherSeasonLine {
    pub name: String,
    pub games: u32,
    pub starts: u32,
    pub outs: Outs,
    pub earned_runs: u32,
    pub unearned_runs: u32,
    pub wins: u32,
    pub losses: u32,
    pub saves: u32,
    pub complete_games: u32,
    pub shutouts: u32,
}

impl PitcherSeasonLine {
    /// Earned runs per nine innings; 0 before any out is recorded.
    pub fn era(&self) -> f64 {
        if self.outs.is_zero() {
            return 0.0;
        }
        f64::from(self.earned_runs) * 27.0 / f64::from(self.outs.0)
    }

    fn add_appearance(&mut self, line: &PitchingLine) {
        self.games += 1;
        self.outs += line.outs;
        self.earned_runs += line.earned_runs;
        self.unearned_runs += line.unearned_runs;
    }
}

/// Pitcher lines per team, keyed by staff index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PitchingLedger {
    teams: BTreeMap<TeamId, BTreeMap<usize, PitcherSeasonLine>>,
}

impl PitchingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_game(&mut self, result: &GameResult) {
        self.record_staff(&result.home_pitching);
        self.record_staff(&result.away_pitching);

        let decisions = &result.decisions;
        self.entry(&decisions.win).wins += 1;
        self.entry(&decisions.loss).losses += 1;
        if let Some(save) = &decisions.save {
            self.entry(save).saves += 1;
        }
    }

    fn record_staff(&mut self, staff: &StaffLine) {
        let lines = self.teams.entry(staff.team).or_default();

        let starter = lines.entry(staff.starter.pitcher).or_default();
        starter.name.clone_from(&staff.starter.name);
        starter.starts += 1;
        starter.add_appearance(&staff.starter);
        if staff.outcome.is_complete_game() {
            starter.complete_games += 1;
            if staff.runs_allowed() == 0 {
                starter.shutouts += 1;
            }
        }

        for reliever in &staff.relievers {
            let line = lines.entry(reliever.pitcher).or_default();
            line.name.clone_from(&reliever.name);
            line.add_appearance(reliever);
        }
    }

    fn entry(&mut self, credit: &Credit) -> &mut PitcherSeasonLine {
        let line = self.teams.entry(credit.team).or_default().entry(credit.pitcher).or_default();
        if line.name.is_empty() {
            line.name.clone_from(&credit.name);
        }
        line
    }

    pub fn line(&self, team: TeamId, pitcher: usize) -> Option<&PitcherSeasonLine> {
        self.teams.get(&team).and_then(|lines| lines.get(&pitcher))
    }

    pub fn team_lines(&self, team: TeamId) -> impl Iterator<Item = (usize, &PitcherSeasonLine)> {
        self.teams.get(&team).into_iter().flat_map(|lines| lines.iter().map(|(i, l)| (*i, l)))
    }

    /// Lowest ERA first among pitchers with at least `min_outs`.
    pub fn era_leaders(&self, min_outs: Outs) -> Vec<(TeamId, &PitcherSeasonLine)> {
        let mut leaders: Vec<_> = self
            .teams
            .iter()
            .flat_map(|(team, lines)| lines.values().map(move |line| (*team, line)))
            .filter(|(_, line)| line.outs >= min_outs)
            .collect();
        leaders.sort_by(|a, b| a.1.era().total_cmp(&b.1.era()));
        leaders
    }

    pub fn total_wins(&self) -> u32 {
        self.teams.values().flat_map(|lines| lines.values()).map(|l| l.wins).sum()
    }

    pub fn total_losses(&self) -> u32 {
        self.teams.values().flat_map(|lines| lines.values()).map(|l| l.losses).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GameEngine;
    use crate::fixtures;
    use crate::dice::Dice;
    use crate::engine::StartOutcome;
    use crate::models::{Pitcher, PitcherRole};

    fn lone_starter(outcome: StartOutcome, runs: u32) -> StaffLine {
        let card = Pitcher::new("Workhorse", PitcherRole::Starter);
        StaffLine {
            team: TeamId(3),
            outcome,
            starter: PitchingLine::starter(0, &card, Outs::REGULATION, runs, 0),
            relievers: Vec::new(),
        }
    }

    #[test]
    fn test_complete_games_follow_start_outcome() {
        let mut ledger = PitchingLedger::new();
        // Empty bullpen: the starter finishes, but it was not a complete-game roll.
        ledger.record_staff(&lone_starter(StartOutcome::Regular, 4));
        ledger.record_staff(&lone_starter(StartOutcome::CompleteGame, 2));
        ledger.record_staff(&lone_starter(StartOutcome::CompleteGameShutout, 0));

        let line = ledger.line(TeamId(3), 0).unwrap();
        assert_eq!(line.starts, 3);
        assert_eq!(line.complete_games, 2);
        assert_eq!(line.shutouts, 1);
    }

    #[test]
    fn test_era() {
        let line = PitcherSeasonLine { outs: Outs(27), earned_runs: 3, ..Default::default() };
        assert_eq!(line.era(), 3.0);
        let line = PitcherSeasonLine { outs: Outs(20), earned_runs: 4, ..Default::default() };
        assert!((line.era() - 5.4).abs() < 1e-9);
        assert_eq!(PitcherSeasonLine::default().era(), 0.0);
    }

    #[test]
    fn test_ledger_accumulates_decisions() {
        let engine = GameEngine::default();
        let mut home = fixtures::synthetic_team(TeamId(1), 7);
        let mut away = fixtures::synthetic_team(TeamId(2), 8);
        let mut ledger = PitchingLedger::new();
        let mut expected_outs = Outs::ZERO;
        for day in 1..=10 {
            let mut dice = Dice::from_seed(u64::from(day));
            let result = engine.play(&mut home, &mut away, day, &mut dice).unwrap();
            expected_outs += result.home_pitching.total_outs();
            ledger.record_game(&result);
        }
        assert_eq!(ledger.total_wins(), 10);
        assert_eq!(ledger.total_losses(), 10);
        let outs: Outs = ledger.team_lines(TeamId(1)).map(|(_, l)| l.outs).sum();
        assert_eq!(outs, expected_outs);
        let starts: u32 = ledger.team_lines(TeamId(1)).map(|(_, l)| l.starts).sum();
        assert_eq!(starts, 10);
        // Five-man rotation: the first starter went on days 1 and 6.
        assert_eq!(ledger.line(TeamId(1), 0).map(|l| l.starts), Some(2));
    }
}
