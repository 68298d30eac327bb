//! # Run resolution
//!
//! One call per team per game: three dice against the opposing starter
//! decide the team's runs and how the fielding staff wears them.
//!
//! ## Steps
//! 1. Shutout / complete-game check on the triad.
//! 2. Baseline Batting Value (BV) against the starter's arm.
//! 3. Relief allocation, plus the BV the lineup gains off the relievers.
//! 4. Triples: even triad adds power and speed bonuses, odd triad an injury.
//! 5. Dice sum above 10: individual bat bonus.
//! 6. Doubles: power bonus (white pairs) and speed bonus (red = green).
//! 7. Dice sum 10 or less: defense chart, unearned runs.
//! 8. `earned = BV / max(SV * white, 6)`, then split starter / relievers.
//!
//! BV is capped after every step from 3 on.

use serde::{Deserialize, Serialize};

use super::injury::{check_injury, InjuryReport};
use super::relief::{
    allocate_relief, distribute_outs, distribute_proportionally, platoon_value,
    reliever_batting_modifier, BullpenArena, ReliefPick, ReliefPlan,
};
use crate::charts::{individual_bonus_slot, DefenseRef, ResolutionCharts};
use crate::config::{EngineConfig, RunConfig, StarterConfig};
use crate::dice::{DiceRoll, DieRoller};
use crate::models::{Batter, Outs, Pitcher, Team};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartOutcome {
    Regular,
    Shutout,
    CompleteGame,
    CompleteGameShutout,
}

impl StartOutcome {
    pub fn is_complete_game(self) -> bool {
        matches!(self, StartOutcome::CompleteGame | StartOutcome::CompleteGameShutout)
    }

    pub fn is_shutout(self) -> bool {
        matches!(self, StartOutcome::Shutout | StartOutcome::CompleteGameShutout)
    }
}

/// Shutout and complete-game eligibility for the starter on this roll.
pub fn evaluate_start(roll: DiceRoll, pitcher: &Pitcher, day: u32, cfg: &RunConfig) -> StartOutcome {
    if pitcher.is_short_rested(day) || roll.triad() == cfg.disqualifying_triad {
        return StartOutcome::Regular;
    }
    let triad = roll.triad();
    let shutout = triad > pitcher.sho_rating
        && roll.white >= cfg.shutout_min_white
        && pitcher.start_value >= cfg.shutout_min_start_value;
    let complete = triad > pitcher.cg_rating
        && roll.white >= cfg.complete_game_min_white
        && pitcher.endurance >= cfg.complete_game_min_endurance;
    match (shutout, complete) {
        (true, true) => StartOutcome::CompleteGameShutout,
        (true, false) => StartOutcome::Shutout,
        (false, true) => StartOutcome::CompleteGame,
        (false, false) => StartOutcome::Regular,
    }
}

/// Outs and runs charged to one pitcher in one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchingLine {
    /// Index into the owning team's staff.
    pub pitcher: usize,
    pub name: String,
    pub outs: Outs,
    pub earned_runs: u32,
    pub unearned_runs: u32,
    pub relief_value: f64,
    /// Relief value after the fatigue multiplier; 0 for starters.
    pub adjusted_value: f64,
}

impl PitchingLine {
    pub fn starter(index: usize, card: &Pitcher, outs: Outs, earned: u32, unearned: u32) -> Self {
        Self {
            pitcher: index,
            name: card.name.clone(),
            outs,
            earned_runs: earned,
            unearned_runs: unearned,
            relief_value: card.relief_value,
            adjusted_value: 0.0,
        }
    }

    fn reliever(pick: &ReliefPick, outs: Outs, earned: u32, unearned: u32) -> Self {
        Self {
            pitcher: pick.pitcher,
            name: pick.name.clone(),
            outs,
            earned_runs: earned,
            unearned_runs: unearned,
            relief_value: pick.relief_value,
            adjusted_value: pick.adjusted_value(),
        }
    }

    pub fn runs(&self) -> u32 {
        self.earned_runs + self.unearned_runs
    }
}

/// Everything one run-resolution call produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResolution {
    pub roll: DiceRoll,
    pub outcome: StartOutcome,
    /// Final Batting Value after every bonus and cap.
    pub batting_value: f64,
    pub earned_runs: u32,
    pub unearned_runs: u32,
    /// The defense chart's own run figure (dice sum 10 or less). Reported,
    /// never folded into `earned_runs`.
    pub defense_runs: Option<u32>,
    pub starter: PitchingLine,
    pub relievers: Vec<PitchingLine>,
    pub injury: Option<InjuryReport>,
}

impl RunResolution {
    pub fn runs(&self) -> u32 {
        self.earned_runs + self.unearned_runs
    }

    pub fn total_relief_value(&self) -> f64 {
        self.relievers.iter().map(|r| r.adjusted_value).sum()
    }

    pub fn total_outs(&self) -> Outs {
        self.starter.outs + self.relievers.iter().map(|r| r.outs).sum()
    }
}

/// Shared inputs for every resolution call of a game.
#[derive(Debug, Clone, Copy)]
pub struct RunContext<'a> {
    pub charts: &'a ResolutionCharts,
    pub config: &'a EngineConfig,
    pub day: u32,
    /// Stadium value of the park the game is played in.
    pub stadium_value: f64,
}

/// Sum of the lineup's platoon-adjusted values against one pitcher.
pub fn batting_value(lineup: &[&Batter], pitcher: &Pitcher, power_weight: f64) -> f64 {
    lineup.iter().map(|b| platoon_value(b, pitcher, power_weight)).sum()
}

/// `BV / max(SV * white, min_divisor)`, rounded down.
pub fn earned_runs(batting_value: f64, start_value: f64, white: f64, min_divisor: f64) -> u32 {
    let divisor = (start_value * white).max(min_divisor);
    (batting_value / divisor).floor().max(0.0) as u32
}

/// Starter outs after the early-pull and short-rest rules.
pub fn starter_outs(
    bullpen: Outs,
    earned: u32,
    card: &Pitcher,
    day: u32,
    cfg: &StarterConfig,
) -> Outs {
    let mut outs = Outs::REGULATION.saturating_sub(bullpen);
    if earned >= cfg.pull_run_threshold {
        let (cut, floor) = if card.start_value >= cfg.pull_start_value {
            (1, cfg.pull_floor_innings)
        } else {
            (2, cfg.weak_pull_floor_innings)
        };
        outs = outs.saturating_sub(Outs::from_innings(cut)).max(Outs::from_innings(floor));
        log::debug!("{} pulled early after {} earned runs: {}", card.name, earned, outs);
    }
    if card.is_short_rested(day) {
        let cut = if card.endurance >= cfg.short_rest_endurance { 1 } else { 2 };
        outs = outs
            .saturating_sub(Outs::from_innings(cut))
            .max(Outs::from_innings(cfg.short_rest_floor_innings));
        log::debug!("{} on short rest: {}", card.name, outs);
    }
    outs.min(Outs::REGULATION)
}

/// Starter's share of the runs: proportional to innings in notation / 9,
/// plus the high-scoring bonus on earned runs, capped at the totals.
pub fn starter_run_share(
    outs: Outs,
    earned: u32,
    unearned: u32,
    cfg: &StarterConfig,
) -> (u32, u32) {
    let proportion = outs.notation() / 9.0;
    let share = |total: u32| ((f64::from(total) * proportion).round_ties_even() as u32).min(total);
    let starter_earned = (share(earned) + cfg.run_bonus_for(earned)).min(earned);
    (starter_earned, share(unearned))
}

fn relief_lines(plan: &ReliefPlan, bullpen: Outs, earned: u32, unearned: u32) -> Vec<PitchingLine> {
    let weights = plan.weights();
    let outs = distribute_outs(bullpen, &weights);
    let earned = distribute_proportionally(earned, &weights);
    let unearned = distribute_proportionally(unearned, &weights);
    plan.picks
        .iter()
        .enumerate()
        .map(|(i, pick)| PitchingLine::reliever(pick, outs[i], earned[i], unearned[i]))
        .collect()
}

fn cap(bv: f64, cfg: &RunConfig) -> f64 {
    bv.min(cfg.bv_cap)
}

fn power_bonus(team: &Team, roll: DiceRoll, charts: &ResolutionCharts, stadium_value: f64) -> f64 {
    let Some(batter) = charts.power_entry(roll).and_then(|r| team.lineup_slot(r.slot())) else {
        return 0.0;
    };
    let bonus = batter.power * f64::from(roll.sum()) + stadium_value;
    log::debug!("Power bonus from {}: +{:.1}", batter.name, bonus);
    bonus
}

fn speed_bonus(team: &Team, roll: DiceRoll, charts: &ResolutionCharts) -> f64 {
    let Some(batter) = charts.speed_bench_entry(roll).and_then(|r| team.lineup_slot(r.slot()))
    else {
        return 0.0;
    };
    let bonus = batter.speed * f64::from(roll.sum());
    log::debug!("Speed/bench bonus from {}: +{:.1}", batter.name, bonus);
    bonus
}

fn fielding_value(fielding: &Team, dice_sum: u8, green: u8, charts: &ResolutionCharts) -> f64 {
    let fielder = match charts.defense_entry(dice_sum, green) {
        Some(DefenseRef::Fielder(position)) => fielding.fielder_at(position),
        Some(DefenseRef::Roster(slot)) => fielding.lineup_slot(slot.slot()),
        None => None,
    };
    fielder.map(|b| b.fielding).unwrap_or(0.0)
}

/// Resolves the runs `batting` scores against `fielding`'s starter.
///
/// Mutates the fielding staff (relievers' `last_relief_day`, the arena) and
/// the batting roster (injuries). The starter's `last_start_day` is left to
/// the caller so both halves of a game see the same rest state.
pub fn resolve_runs(
    batting: &mut Team,
    fielding: &mut Team,
    starter: usize,
    arena: &mut BullpenArena,
    dice: &mut dyn DieRoller,
    ctx: &RunContext<'_>,
) -> RunResolution {
    let cfg = ctx.config;
    let roll = dice.roll_triad();
    let card = fielding.pitchers[starter].clone();
    let outcome = evaluate_start(roll, &card, ctx.day, &cfg.runs);
    log::debug!("{} vs {}: roll {} ({:?})", batting.name, card.name, roll, outcome);

    match outcome {
        StartOutcome::CompleteGameShutout => {
            return RunResolution {
                roll,
                outcome,
                batting_value: 0.0,
                earned_runs: 0,
                unearned_runs: 0,
                defense_runs: None,
                starter: PitchingLine::starter(starter, &card, Outs::REGULATION, 0, 0),
                relievers: Vec::new(),
                injury: None,
            };
        }
        StartOutcome::Shutout => {
            let plan = allocate_relief(
                &mut fielding.pitchers,
                card.endurance,
                roll,
                ctx.day,
                arena,
                ctx.charts,
                &cfg.relief,
            );
            let (starter_outs, relievers) = if plan.is_empty() {
                (Outs::REGULATION, Vec::new())
            } else {
                let outs = Outs::REGULATION.saturating_sub(plan.bullpen_outs);
                (outs, relief_lines(&plan, plan.bullpen_outs, 0, 0))
            };
            return RunResolution {
                roll,
                outcome,
                batting_value: 0.0,
                earned_runs: 0,
                unearned_runs: 0,
                defense_runs: None,
                starter: PitchingLine::starter(starter, &card, starter_outs, 0, 0),
                relievers,
                injury: None,
            };
        }
        StartOutcome::CompleteGame | StartOutcome::Regular => {}
    }

    let power_weight = cfg.runs.power_weight;
    let (mut bv, plan) = {
        let lineup: Vec<&Batter> = batting.starting_lineup().collect();
        let baseline = batting_value(&lineup, &card, power_weight);
        if outcome.is_complete_game() {
            (baseline, None)
        } else {
            let plan = allocate_relief(
                &mut fielding.pitchers,
                card.endurance,
                roll,
                ctx.day,
                arena,
                ctx.charts,
                &cfg.relief,
            );
            let initial = distribute_outs(plan.bullpen_outs, &plan.weights());
            let modifier = reliever_batting_modifier(
                &lineup,
                &plan.picks,
                &fielding.pitchers,
                &initial,
                power_weight,
            );
            log::debug!("BV {:.1} baseline, {:+.1} from relievers", baseline, modifier);
            ((baseline + modifier).max(0.0), Some(plan))
        }
    };
    bv = cap(bv, &cfg.runs);

    let sum = roll.sum();
    let mut injury = None;
    if roll.is_triples() {
        if roll.triad() % 2 == 0 {
            bv += power_bonus(batting, roll, ctx.charts, ctx.stadium_value);
            bv += speed_bonus(batting, roll, ctx.charts);
        } else {
            injury = check_injury(batting, dice, ctx.day);
        }
        bv = cap(bv, &cfg.runs);
    }

    if let Some(batter) = individual_bonus_slot(sum).and_then(|slot| batting.lineup_slot(slot)) {
        log::debug!("Individual bat bonus from {}: +{:.1}", batter.name, batter.batting);
        bv = cap(bv + batter.batting, &cfg.runs);
    }

    if roll.is_doubles() {
        if roll.white_pairs() {
            bv += power_bonus(batting, roll, ctx.charts, ctx.stadium_value);
        }
        if roll.red == roll.green {
            bv += speed_bonus(batting, roll, ctx.charts);
        }
        bv = cap(bv, &cfg.runs);
    }

    let mut defense_runs = None;
    let mut unearned = 0;
    if sum <= 10 {
        let fielding_bonus = fielding_value(fielding, sum, roll.green, ctx.charts);
        let adjusted_white = (f64::from(roll.white) + fielding_bonus).max(1.0);
        defense_runs =
            Some(earned_runs(bv, card.start_value, adjusted_white, cfg.runs.min_run_divisor));
        unearned = batting.unearned_runs.runs_for(sum);
    }
    let earned =
        earned_runs(bv, card.start_value, f64::from(roll.white), cfg.runs.min_run_divisor);
    log::debug!("{}: BV {:.1}, {} earned, {} unearned", batting.name, bv, earned, unearned);

    let (starter_line, relievers) = match plan {
        Some(plan) if !plan.is_empty() => {
            let outs = starter_outs(plan.bullpen_outs, earned, &card, ctx.day, &cfg.starter);
            let (starter_earned, starter_unearned) =
                starter_run_share(outs, earned, unearned, &cfg.starter);
            let bullpen = Outs::REGULATION.saturating_sub(outs);
            let relievers = relief_lines(
                &plan,
                bullpen,
                earned - starter_earned,
                unearned - starter_unearned,
            );
            (
                PitchingLine::starter(starter, &card, outs, starter_earned, starter_unearned),
                relievers,
            )
        }
        Some(_) => {
            log::warn!("{} has no relievers available; {} finishes the game", fielding.name, card.name);
            (PitchingLine::starter(starter, &card, Outs::REGULATION, earned, unearned), Vec::new())
        }
        None => {
            (PitchingLine::starter(starter, &card, Outs::REGULATION, earned, unearned), Vec::new())
        }
    };

    let resolution = RunResolution {
        roll,
        outcome,
        batting_value: bv,
        earned_runs: earned,
        unearned_runs: unearned,
        defense_runs,
        starter: starter_line,
        relievers,
        injury,
    };
    debug_assert_eq!(resolution.total_outs(), Outs::REGULATION);
    debug_assert_eq!(
        resolution.starter.earned_runs
            + resolution.relievers.iter().map(|r| r.earned_runs).sum::<u32>(),
        earned
    );
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::models::{PitcherRole, TeamId, UnearnedRunsChart};

    fn lineup_team(id: u32, batting: f64) -> Team {
        let mut team = Team::new(TeamId(id), format!("Team {}", id));
        for i in 0..4 {
            let mut b = Batter::new(format!("B{}", i + 1));
            b.batting = batting;
            team.batters.push(b);
        }
        team
    }

    fn staff_team(id: u32, start_value: f64, endurance: f64, relievers: usize) -> Team {
        let mut team = lineup_team(id, 0.0);
        let mut ace = Pitcher::new("Ace", PitcherRole::Starter);
        ace.start_value = start_value;
        ace.endurance = endurance;
        team.pitchers.push(ace);
        for i in 0..relievers {
            let mut rp = Pitcher::new(format!("RP{}", i), PitcherRole::Reliever);
            rp.relief_value = 2.0 + i as f64;
            team.pitchers.push(rp);
        }
        team
    }

    fn resolve(
        batting: &mut Team,
        fielding: &mut Team,
        faces: Vec<u8>,
    ) -> (RunResolution, BullpenArena) {
        let charts = ResolutionCharts::default();
        let config = EngineConfig::default();
        let ctx = RunContext { charts: &charts, config: &config, day: 1, stadium_value: 0.0 };
        let mut arena = BullpenArena::new();
        let mut dice = ScriptedDice::new(faces);
        let result = resolve_runs(batting, fielding, 0, &mut arena, &mut dice, &ctx);
        (result, arena)
    }

    #[test]
    fn test_start_outcomes() {
        let cfg = RunConfig::default();
        let mut ace = Pitcher::new("Ace", PitcherRole::Starter);
        ace.start_value = 6.0;
        ace.endurance = 7.0;
        ace.cg_rating = 230;
        ace.sho_rating = 640;
        assert_eq!(evaluate_start(DiceRoll::new(2, 3, 4), &ace, 1, &cfg), StartOutcome::Regular);
        assert_eq!(
            evaluate_start(DiceRoll::new(6, 2, 1), &ace, 1, &cfg),
            StartOutcome::CompleteGame
        );
        assert_eq!(
            evaluate_start(DiceRoll::new(6, 5, 1), &ace, 1, &cfg),
            StartOutcome::CompleteGameShutout
        );
        assert_eq!(evaluate_start(DiceRoll::new(6, 6, 6), &ace, 1, &cfg), StartOutcome::Regular);

        ace.rest = 4;
        ace.last_start_day = Some(1);
        assert_eq!(evaluate_start(DiceRoll::new(6, 5, 1), &ace, 3, &cfg), StartOutcome::Regular);
    }

    #[test]
    fn test_scenario_a_relief_completes_nine_innings() {
        let mut batting = lineup_team(1, 5.0);
        let mut fielding = staff_team(2, 6.0, 7.0, 4);
        fielding.pitchers[0].cg_rating = 230;
        let (result, arena) = resolve(&mut batting, &mut fielding, vec![2, 3, 4]);

        assert_eq!(result.outcome, StartOutcome::Regular);
        assert_eq!(result.relievers.len(), 2);
        assert_eq!(result.total_outs(), Outs::REGULATION);
        assert_eq!(arena.used().len(), 2);
    }

    #[test]
    fn test_scenario_b_and_c_earned_and_unearned() {
        // Four batters at 10 each: BV 40, no relievers to shift it.
        let mut batting = lineup_team(1, 10.0);
        batting.unearned_runs = UnearnedRunsChart::new([(7, 2)]);
        let mut fielding = staff_team(2, 3.0, 7.0, 0);
        let (result, _) = resolve(&mut batting, &mut fielding, vec![4, 1, 2]);

        assert!((result.batting_value - 40.0).abs() < 1e-9);
        assert_eq!(result.earned_runs, 3);
        assert_eq!(result.unearned_runs, 2);
        assert_eq!(result.runs(), 5);
        assert_eq!(result.starter.outs, Outs::REGULATION);
        assert_eq!(result.starter.runs(), 5);
        assert_eq!(result.defense_runs, Some(3));
    }

    #[test]
    fn test_earned_runs_formula() {
        assert_eq!(earned_runs(40.0, 3.0, 4.0, 6.0), 3);
        assert_eq!(earned_runs(40.0, 1.0, 2.0, 6.0), 6);
        assert_eq!(earned_runs(135.0, 0.0, 1.0, 6.0), 22);
    }

    #[test]
    fn test_defense_adjusts_white_only_for_defense_runs() {
        let mut batting = lineup_team(1, 10.0);
        let mut fielding = staff_team(2, 3.0, 7.0, 0);
        fielding.batters[0].position = Some(crate::models::Position::FirstBase);
        fielding.batters[0].fielding = 2.0;
        let (result, _) = resolve(&mut batting, &mut fielding, vec![4, 1, 2]);
        assert_eq!(result.earned_runs, 3);
        // 40 / (3 * 6) = 2
        assert_eq!(result.defense_runs, Some(2));
    }

    #[test]
    fn test_complete_game_shutout() {
        let mut batting = lineup_team(1, 30.0);
        let mut fielding = staff_team(2, 6.0, 7.0, 3);
        fielding.pitchers[0].cg_rating = 611;
        fielding.pitchers[0].sho_rating = 611;
        let (result, arena) = resolve(&mut batting, &mut fielding, vec![6, 5, 1]);
        assert_eq!(result.outcome, StartOutcome::CompleteGameShutout);
        assert_eq!(result.runs(), 0);
        assert_eq!(result.starter.outs, Outs::REGULATION);
        assert!(arena.used().is_empty());
    }

    #[test]
    fn test_shutout_still_uses_bullpen() {
        let mut batting = lineup_team(1, 30.0);
        let mut fielding = staff_team(2, 6.0, 4.0, 3);
        fielding.pitchers[0].sho_rating = 611;
        let (result, _) = resolve(&mut batting, &mut fielding, vec![6, 5, 1]);
        assert_eq!(result.outcome, StartOutcome::Shutout);
        assert_eq!(result.runs(), 0);
        assert!(!result.relievers.is_empty());
        assert_eq!(result.total_outs(), Outs::REGULATION);
        assert!(fielding.pitchers[1..].iter().any(|p| p.last_relief_day == Some(1)));
    }

    #[test]
    fn test_bv_capped() {
        let mut batting = lineup_team(1, 100.0);
        let mut fielding = staff_team(2, 1.0, 7.0, 0);
        let (result, _) = resolve(&mut batting, &mut fielding, vec![1, 2, 4]);
        assert!((result.batting_value - 135.0).abs() < 1e-9);
        assert_eq!(result.earned_runs, 22);
    }

    #[test]
    fn test_starter_policy() {
        let cfg = StarterConfig::default();
        let mut card = Pitcher::new("Ace", PitcherRole::Starter);
        card.start_value = 5.0;
        card.endurance = 3.0;
        assert_eq!(starter_outs(Outs(7), 3, &card, 10, &cfg), Outs(20));
        assert_eq!(starter_outs(Outs(7), 8, &card, 10, &cfg), Outs(17));
        card.start_value = 2.0;
        assert_eq!(starter_outs(Outs(7), 8, &card, 10, &cfg), Outs(14));
        card.rest = 5;
        card.last_start_day = Some(8);
        assert_eq!(starter_outs(Outs(7), 8, &card, 10, &cfg), Outs(8));
    }

    #[test]
    fn test_starter_run_share_bonus() {
        let cfg = StarterConfig::default();
        // 6.0 innings: 12 * 6/9 = 8, +2 bonus.
        assert_eq!(starter_run_share(Outs(18), 12, 0, &cfg), (10, 0));
        // 4.2 innings is 4.2 / 9 of the runs: 16 * 0.4667 = 7.47 -> 7, +8 capped at 16.
        assert_eq!(starter_run_share(Outs(14), 16, 3, &cfg), (15, 1));
    }

    #[test]
    fn test_runs_always_fully_assigned() {
        for seed in 0..200u64 {
            let mut batting = lineup_team(1, 12.0);
            let mut fielding = staff_team(2, 2.5, 6.0, 5);
            let charts = ResolutionCharts::default();
            let config = EngineConfig::default();
            let ctx = RunContext { charts: &charts, config: &config, day: 5, stadium_value: 1.0 };
            let mut arena = BullpenArena::new();
            let mut dice = crate::dice::Dice::from_seed(seed);
            let result = resolve_runs(&mut batting, &mut fielding, 0, &mut arena, &mut dice, &ctx);

            let earned: u32 = result.relievers.iter().map(|r| r.earned_runs).sum();
            let unearned: u32 = result.relievers.iter().map(|r| r.unearned_runs).sum();
            assert_eq!(result.starter.earned_runs + earned, result.earned_runs);
            assert_eq!(result.starter.unearned_runs + unearned, result.unearned_runs);
            assert_eq!(result.total_outs(), Outs::REGULATION);
        }
    }
}
