//! The per-game pipeline: both offenses against the opposing starters,
//! extra innings on a tie, then decisions.

use serde::{Deserialize, Serialize};

use super::decision::{assign_decisions, Credit, Decisions, StaffLine};
use super::extra_innings::{resolve_extra_innings, ExtraArm, ExtraInningsOutcome, Side};
use super::relief::BullpenArena;
use super::runs::{resolve_runs, PitchingLine, RunContext, RunResolution};
use crate::charts::ResolutionCharts;
use crate::config::{EngineConfig, ReliefConfig};
use crate::dice::DieRoller;
use crate::error::{Result, SimError};
use crate::models::{Outs, Team, TeamId, Throws};

/// Full record of one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub day: u32,
    pub home: TeamId,
    pub away: TeamId,
    pub home_runs: u32,
    pub away_runs: u32,
    /// The home team at bat against the away starter.
    pub home_offense: RunResolution,
    pub away_offense: RunResolution,
    /// Home staff's pitching, extra inning included.
    pub home_pitching: StaffLine,
    pub away_pitching: StaffLine,
    pub home_starter_throws: Throws,
    pub away_starter_throws: Throws,
    pub extra_innings: Option<ExtraInningsOutcome>,
    pub one_run: bool,
    pub decisions: Decisions,
}

impl GameResult {
    pub fn winner(&self) -> TeamId {
        if self.home_runs > self.away_runs {
            self.home
        } else {
            self.away
        }
    }

    pub fn loser(&self) -> TeamId {
        if self.winner() == self.home {
            self.away
        } else {
            self.home
        }
    }

    pub fn margin(&self) -> u32 {
        self.home_runs.abs_diff(self.away_runs)
    }

    pub fn is_extra_innings(&self) -> bool {
        self.extra_innings.is_some()
    }

    pub fn pitching(&self, team: TeamId) -> Option<&StaffLine> {
        if team == self.home {
            Some(&self.home_pitching)
        } else if team == self.away {
            Some(&self.away_pitching)
        } else {
            None
        }
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            day: self.day,
            home: self.home,
            away: self.away,
            home_runs: self.home_runs,
            away_runs: self.away_runs,
            extra_innings: self.is_extra_innings(),
            win: self.decisions.win.clone(),
            loss: self.decisions.loss.clone(),
            save: self.decisions.save.clone(),
        }
    }
}

/// Line-score view of a game kept in the season log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub day: u32,
    pub home: TeamId,
    pub away: TeamId,
    pub home_runs: u32,
    pub away_runs: u32,
    pub extra_innings: bool,
    pub win: Credit,
    pub loss: Credit,
    pub save: Option<Credit>,
}

impl GameSummary {
    pub fn winner(&self) -> TeamId {
        if self.home_runs > self.away_runs {
            self.home
        } else {
            self.away
        }
    }
}

/// Charts and rules shared by every game of a season.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameEngine {
    pub charts: ResolutionCharts,
    pub config: EngineConfig,
}

impl GameEngine {
    pub fn new(charts: ResolutionCharts, config: EngineConfig) -> Self {
        Self { charts, config }
    }

    /// Plays `away` at `home`. Both teams are mutated in place: rotation
    /// cursors, rest days, injuries.
    pub fn play(
        &self,
        home: &mut Team,
        away: &mut Team,
        day: u32,
        dice: &mut dyn DieRoller,
    ) -> Result<GameResult> {
        for team in [&*home, &*away] {
            if team.rotation_size() == 0 {
                return Err(SimError::EmptyRotation(team.id));
            }
        }
        let home_starter = home.select_starting_pitcher().ok_or(SimError::EmptyRotation(home.id))?;
        let away_starter = away.select_starting_pitcher().ok_or(SimError::EmptyRotation(away.id))?;

        let ctx = RunContext {
            charts: &self.charts,
            config: &self.config,
            day,
            stadium_value: home.ballpark.stadium_value,
        };
        let mut home_arena = BullpenArena::new();
        let mut away_arena = BullpenArena::new();

        let away_offense = resolve_runs(away, home, home_starter, &mut home_arena, dice, &ctx);
        let home_offense = resolve_runs(home, away, away_starter, &mut away_arena, dice, &ctx);

        let mut home_pitching = StaffLine {
            team: home.id,
            outcome: away_offense.outcome,
            starter: away_offense.starter.clone(),
            relievers: away_offense.relievers.clone(),
        };
        let mut away_pitching = StaffLine {
            team: away.id,
            outcome: home_offense.outcome,
            starter: home_offense.starter.clone(),
            relievers: home_offense.relievers.clone(),
        };

        let mut home_runs = home_offense.runs();
        let mut away_runs = away_offense.runs();
        let extra_innings = if home_runs == away_runs {
            let outcome = resolve_extra_innings(home, away, &home_arena, &away_arena, dice);
            match outcome.winner {
                Side::Home => home_runs += 1,
                Side::Away => away_runs += 1,
            }
            let relief = &self.config.relief;
            credit_extra_inning(
                home,
                &mut home_pitching,
                &mut home_arena,
                outcome.home.arm,
                outcome.winner == Side::Away,
                day,
                relief,
            );
            credit_extra_inning(
                away,
                &mut away_pitching,
                &mut away_arena,
                outcome.away.arm,
                outcome.winner == Side::Home,
                day,
                relief,
            );
            Some(outcome)
        } else {
            None
        };
        debug_assert_eq!(home_pitching.runs_allowed(), away_runs);
        debug_assert_eq!(away_pitching.runs_allowed(), home_runs);

        let margin = home_runs.abs_diff(away_runs);
        let extra = extra_innings.is_some();
        let decisions = if home_runs > away_runs {
            assign_decisions(&home_pitching, &away_pitching, margin, extra, &self.config.decisions)
        } else {
            assign_decisions(&away_pitching, &home_pitching, margin, extra, &self.config.decisions)
        };

        home.pitchers[home_starter].last_start_day = Some(day);
        away.pitchers[away_starter].last_start_day = Some(day);

        log::info!(
            "Day {}: {} {} at {} {}{} (W: {}, L: {}{})",
            day,
            away.name,
            away_runs,
            home.name,
            home_runs,
            if extra { " (10)" } else { "" },
            decisions.win.name,
            decisions.loss.name,
            decisions.save.as_ref().map(|s| format!(", S: {}", s.name)).unwrap_or_default()
        );

        Ok(GameResult {
            day,
            home: home.id,
            away: away.id,
            home_runs,
            away_runs,
            home_starter_throws: home.pitchers[home_starter].throws,
            away_starter_throws: away.pitchers[away_starter].throws,
            home_offense,
            away_offense,
            home_pitching,
            away_pitching,
            extra_innings,
            one_run: margin == 1,
            decisions,
        })
    }
}

/// Adds the extra frame to `arm`'s line, bringing a fresh reliever into the
/// game if needed. `charged` pins the winning run on this arm.
fn credit_extra_inning(
    team: &mut Team,
    staff: &mut StaffLine,
    arena: &mut BullpenArena,
    arm: ExtraArm,
    charged: bool,
    day: u32,
    cfg: &ReliefConfig,
) {
    let index = match arm {
        ExtraArm::Fresh { pitcher } => {
            let multiplier = arena.fatigue_multiplier(pitcher, &team.pitchers[pitcher], day, cfg);
            arena.mark_used(pitcher);
            team.pitchers[pitcher].last_relief_day = Some(day);
            if staff.line_mut(pitcher).is_none() {
                let card = &team.pitchers[pitcher];
                staff.relievers.push(PitchingLine {
                    pitcher,
                    name: card.name.clone(),
                    outs: Outs::ZERO,
                    earned_runs: 0,
                    unearned_runs: 0,
                    relief_value: card.relief_value,
                    adjusted_value: card.relief_value * multiplier,
                });
            }
            pitcher
        }
        ExtraArm::Tired { pitcher } => pitcher,
        ExtraArm::Starter => staff.starter.pitcher,
    };
    match staff.line_mut(index) {
        Some(line) => {
            line.outs += Outs::from_innings(1);
            if charged {
                line.earned_runs += 1;
            }
        }
        None => log::warn!("{} extra-inning arm {} has no line", team.name, index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::Dice;
    use crate::engine::StartOutcome;
    use crate::models::{Batter, Pitcher, PitcherRole};

    fn club(id: u32) -> Team {
        let mut team = Team::new(TeamId(id), format!("Club {}", id));
        for i in 0..12 {
            let mut b = Batter::new(format!("B{}-{}", id, i));
            b.batting = 4.0 + (i % 3) as f64;
            b.power = 2.0;
            b.speed = 1.0;
            if i >= 9 {
                b.role = crate::models::LineupRole::Bench;
            }
            team.batters.push(b);
        }
        for i in 0..5 {
            let mut p = Pitcher::new(format!("SP{}-{}", id, i), PitcherRole::Starter);
            p.start_value = 2.0 + i as f64 * 0.5;
            p.endurance = 5.0 + i as f64 * 0.5;
            p.rest = 4;
            p.cg_rating = 640;
            p.sho_rating = 650;
            team.pitchers.push(p);
        }
        for i in 0..6 {
            let mut p = Pitcher::new(format!("RP{}-{}", id, i), PitcherRole::Reliever);
            p.relief_value = 1.0 + i as f64;
            p.fatigue = 3.0;
            team.pitchers.push(p);
        }
        team
    }

    #[test]
    fn test_game_totals_balance() {
        let engine = GameEngine::default();
        for seed in 0..150u64 {
            let mut home = club(1);
            let mut away = club(2);
            let mut dice = Dice::from_seed(seed);
            let result = engine.play(&mut home, &mut away, 3, &mut dice).unwrap();

            assert_ne!(result.home_runs, result.away_runs);
            assert_eq!(result.home_pitching.runs_allowed(), result.away_runs);
            assert_eq!(result.away_pitching.runs_allowed(), result.home_runs);
            let expected = if result.is_extra_innings() { Outs(30) } else { Outs::REGULATION };
            assert_eq!(result.home_pitching.total_outs(), expected);
            assert_eq!(result.away_pitching.total_outs(), expected);
            assert_eq!(result.one_run, result.margin() == 1);
            assert_eq!(result.decisions.win.team, result.winner());
            assert_eq!(result.decisions.loss.team, result.loser());
        }
    }

    #[test]
    fn test_starters_stamped_and_rotation_advances() {
        let engine = GameEngine::default();
        let mut home = club(1);
        let mut away = club(2);
        let mut dice = Dice::from_seed(11);
        engine.play(&mut home, &mut away, 7, &mut dice).unwrap();
        assert_eq!(home.pitchers[0].last_start_day, Some(7));
        assert_eq!(away.pitchers[0].last_start_day, Some(7));
        assert_eq!(home.rotation_cursor, 1);
        assert_eq!(away.rotation_cursor, 1);
    }

    #[test]
    fn test_same_seed_same_game() {
        let engine = GameEngine::default();
        let play = || {
            let mut home = club(1);
            let mut away = club(2);
            let mut dice = Dice::from_seed(2024);
            engine.play(&mut home, &mut away, 1, &mut dice).unwrap()
        };
        assert_eq!(play(), play());
    }

    #[test]
    fn test_empty_staff_is_an_error() {
        let engine = GameEngine::default();
        let mut home = club(1);
        let mut away = club(2);
        away.pitchers.clear();
        let mut dice = Dice::from_seed(1);
        let err = engine.play(&mut home, &mut away, 1, &mut dice).unwrap_err();
        assert!(matches!(err, SimError::EmptyRotation(TeamId(2))));
        assert_eq!(home.rotation_cursor, 0);
    }

    #[test]
    fn test_extra_innings_credit_fresh_reliever() {
        let mut team = club(1);
        let mut staff = StaffLine {
            team: team.id,
            outcome: StartOutcome::CompleteGame,
            starter: PitchingLine::starter(0, &team.pitchers[0], Outs(27), 2, 0),
            relievers: Vec::new(),
        };
        let mut arena = BullpenArena::new();
        let cfg = ReliefConfig::default();
        credit_extra_inning(
            &mut team,
            &mut staff,
            &mut arena,
            ExtraArm::Fresh { pitcher: 10 },
            true,
            4,
            &cfg,
        );
        assert_eq!(staff.relievers.len(), 1);
        assert_eq!(staff.relievers[0].outs, Outs(3));
        assert_eq!(staff.relievers[0].earned_runs, 1);
        assert_eq!(team.pitchers[10].last_relief_day, Some(4));
        assert!(arena.is_used(10));
        assert_eq!(staff.total_outs(), Outs(30));
    }
}
