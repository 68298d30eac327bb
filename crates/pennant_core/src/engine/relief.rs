//! # Relief allocation
//!
//! Works out how many outs the bullpen owes behind a starter, picks the
//! relievers (best fatigue-adjusted relief value first) and splits outs and
//! runs among them proportionally, the last arm absorbing any rounding
//! remainder.

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::charts::ResolutionCharts;
use crate::config::ReliefConfig;
use crate::dice::DiceRoll;
use crate::models::{Batter, Outs, Pitcher, Throws};

/// Per-game bullpen bookkeeping for one staff: who has pitched and each
/// reliever's fatigue multiplier as of the first time it was asked for.
///
/// Built when a game starts and dropped when it ends; never persisted.
#[derive(Debug, Clone, Default)]
pub struct BullpenArena {
    used: Vec<usize>,
    fatigue: FxHashMap<usize, f64>,
}

impl BullpenArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_used(&self, pitcher: usize) -> bool {
        self.used.contains(&pitcher)
    }

    /// Relievers in the order they entered.
    pub fn used(&self) -> &[usize] {
        &self.used
    }

    pub fn last_used(&self) -> Option<usize> {
        self.used.last().copied()
    }

    pub fn mark_used(&mut self, pitcher: usize) {
        if !self.is_used(pitcher) {
            self.used.push(pitcher);
        }
    }

    /// Cached per game: later lookups ignore `last_relief_day` changes made
    /// by this game's own selections.
    pub fn fatigue_multiplier(
        &mut self,
        index: usize,
        pitcher: &Pitcher,
        day: u32,
        cfg: &ReliefConfig,
    ) -> f64 {
        *self.fatigue.entry(index).or_insert_with(|| pitcher.fatigue_multiplier(day, cfg))
    }

    pub fn cached_multiplier(&self, index: usize) -> Option<f64> {
        self.fatigue.get(&index).copied()
    }
}

/// One reliever chosen for the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliefPick {
    pub pitcher: usize,
    pub name: String,
    pub throws: Throws,
    pub relief_value: f64,
    pub fatigue_multiplier: f64,
}

impl ReliefPick {
    pub fn adjusted_value(&self) -> f64 {
        self.relief_value * self.fatigue_multiplier
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReliefPlan {
    /// Outs owed according to the bullpen chart, before the starter policy.
    pub bullpen_outs: Outs,
    pub picks: Vec<ReliefPick>,
}

impl ReliefPlan {
    pub fn total_relief_value(&self) -> f64 {
        self.picks.iter().map(ReliefPick::adjusted_value).sum()
    }

    pub fn weights(&self) -> Vec<f64> {
        self.picks.iter().map(ReliefPick::adjusted_value).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }
}

/// Reads the bullpen and relievers charts and brings in the relievers.
pub fn allocate_relief(
    staff: &mut [Pitcher],
    starter_endurance: f64,
    roll: DiceRoll,
    day: u32,
    arena: &mut BullpenArena,
    charts: &ResolutionCharts,
    cfg: &ReliefConfig,
) -> ReliefPlan {
    let bullpen_outs = charts.bullpen_outs(starter_endurance, roll.white).unwrap_or(Outs::ZERO);
    let needed = charts.relievers_needed(bullpen_outs, roll.red, cfg);
    let picks = select_relievers(staff, needed, day, arena, cfg);
    log::debug!(
        "Bullpen owes {} innings, {} relievers wanted, {} available",
        bullpen_outs,
        needed,
        picks.len()
    );
    ReliefPlan { bullpen_outs, picks }
}

/// Takes the `count` best unused relievers by fatigue-adjusted relief value
/// (ties keep staff order), marks them used and stamps `last_relief_day`.
pub fn select_relievers(
    staff: &mut [Pitcher],
    count: usize,
    day: u32,
    arena: &mut BullpenArena,
    cfg: &ReliefConfig,
) -> Vec<ReliefPick> {
    if count == 0 {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    for (index, pitcher) in staff.iter().enumerate() {
        if !pitcher.is_reliever() || arena.is_used(index) {
            continue;
        }
        let multiplier = arena.fatigue_multiplier(index, pitcher, day, cfg);
        candidates.push(ReliefPick {
            pitcher: index,
            name: pitcher.name.clone(),
            throws: pitcher.throws,
            relief_value: pitcher.relief_value,
            fatigue_multiplier: multiplier,
        });
    }
    candidates.sort_by(|a, b| b.adjusted_value().total_cmp(&a.adjusted_value()));
    candidates.truncate(count);

    for pick in &candidates {
        arena.mark_used(pick.pitcher);
        staff[pick.pitcher].last_relief_day = Some(day);
    }
    candidates
}

/// Splits `total` by weight. Each share but the last is
/// `round(remaining * weight / group_total)`, clamped to what remains; the
/// last takes the rest. Zero total weight falls back to equal weights.
pub fn distribute_proportionally(total: u32, weights: &[f64]) -> Vec<u32> {
    let Some(last) = weights.len().checked_sub(1) else {
        return Vec::new();
    };
    let group_total: f64 = weights.iter().map(|w| w.max(0.0)).sum();
    let equal = group_total <= 0.0 || !group_total.is_finite();

    let mut remaining = total;
    let mut shares = Vec::with_capacity(weights.len());
    for (i, weight) in weights.iter().enumerate() {
        if i == last {
            shares.push(remaining);
            break;
        }
        let fraction = if equal { 1.0 / weights.len() as f64 } else { weight.max(0.0) / group_total };
        let share = (f64::from(remaining) * fraction).round_ties_even() as u32;
        let share = share.min(remaining);
        remaining -= share;
        shares.push(share);
    }

    debug_assert_eq!(shares.iter().sum::<u32>(), total);
    shares
}

pub fn distribute_outs(total: Outs, weights: &[f64]) -> Vec<Outs> {
    distribute_proportionally(total.0, weights).into_iter().map(Outs).collect()
}

/// Net Batting Value the lineup gains from facing these relievers.
///
/// The reliever outs are walked through the lineup in batting order, one
/// out per batter, wrapping around. Each batter faced adds a platoon
/// adjusted value (floored at 0) scaled by that reliever's innings / 9.
pub fn reliever_batting_modifier(
    lineup: &[&Batter],
    picks: &[ReliefPick],
    staff: &[Pitcher],
    outs: &[Outs],
    power_weight: f64,
) -> f64 {
    if lineup.is_empty() {
        return 0.0;
    }
    let mut modifier = 0.0;
    let mut batters_faced = 0usize;
    for (pick, pitched) in picks.iter().zip(outs) {
        if pitched.is_zero() {
            continue;
        }
        let Some(pitcher) = staff.get(pick.pitcher) else {
            continue;
        };
        let innings_share = pitched.innings() / 9.0;
        for _ in 0..pitched.0 {
            let batter = lineup[batters_faced % lineup.len()];
            modifier += platoon_value(batter, pitcher, power_weight) * innings_share;
            batters_faced += 1;
        }
    }
    modifier
}

/// A batter's value against one pitcher: raw value plus the batter's split
/// against the pitcher's arm minus the pitcher's split against the batter's
/// side, floored at 0.
pub fn platoon_value(batter: &Batter, pitcher: &Pitcher, power_weight: f64) -> f64 {
    let adjustment = batter.split_against(pitcher.throws) - pitcher.split_against(batter.bats);
    (batter.raw_value(power_weight) + adjustment).max(0.0)
}
