//! Win / loss / save assignment.

use serde::{Deserialize, Serialize};

use super::runs::{PitchingLine, StartOutcome};
use crate::config::DecisionConfig;
use crate::models::{Outs, TeamId};

/// One team's pitching in a finished game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffLine {
    pub team: TeamId,
    /// How the starter's outing was resolved.
    pub outcome: StartOutcome,
    pub starter: PitchingLine,
    pub relievers: Vec<PitchingLine>,
}

impl StaffLine {
    pub fn total_outs(&self) -> Outs {
        self.starter.outs + self.relievers.iter().map(|r| r.outs).sum()
    }

    pub fn runs_allowed(&self) -> u32 {
        self.starter.runs() + self.relievers.iter().map(PitchingLine::runs).sum::<u32>()
    }

    pub fn lines(&self) -> impl Iterator<Item = &PitchingLine> {
        std::iter::once(&self.starter).chain(self.relievers.iter())
    }

    /// Line for a pitcher already in the game, if any.
    pub fn line_mut(&mut self, pitcher: usize) -> Option<&mut PitchingLine> {
        if self.starter.pitcher == pitcher {
            return Some(&mut self.starter);
        }
        self.relievers.iter_mut().find(|r| r.pitcher == pitcher)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    pub team: TeamId,
    pub pitcher: usize,
    pub name: String,
}

impl Credit {
    fn of(team: TeamId, line: &PitchingLine) -> Self {
        Self { team, pitcher: line.pitcher, name: line.name.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decisions {
    pub win: Credit,
    pub loss: Credit,
    pub save: Option<Credit>,
}

fn starter_qualifies(staff: &StaffLine, cfg: &DecisionConfig) -> bool {
    staff.starter.outs >= Outs::from_innings(cfg.starter_min_innings)
}

/// The starter if they went long enough; otherwise the reliever with the best
/// fatigue-adjusted value, then most outs, then fewest earned runs.
pub fn winning_pitcher<'a>(staff: &'a StaffLine, cfg: &DecisionConfig) -> &'a PitchingLine {
    if starter_qualifies(staff, cfg) {
        return &staff.starter;
    }
    staff
        .relievers
        .iter()
        .filter(|r| !r.outs.is_zero())
        .max_by(|a, b| {
            a.adjusted_value
                .total_cmp(&b.adjusted_value)
                .then(a.outs.cmp(&b.outs))
                .then(b.earned_runs.cmp(&a.earned_runs))
        })
        .unwrap_or(&staff.starter)
}

/// The starter if they went long enough; otherwise the reliever charged the most
/// runs, then most outs, then lowest fatigue-adjusted value.
pub fn losing_pitcher<'a>(staff: &'a StaffLine, cfg: &DecisionConfig) -> &'a PitchingLine {
    if starter_qualifies(staff, cfg) {
        return &staff.starter;
    }
    staff
        .relievers
        .iter()
        .filter(|r| r.runs() > 0)
        .max_by(|a, b| {
            a.runs()
                .cmp(&b.runs())
                .then(a.outs.cmp(&b.outs))
                .then(b.adjusted_value.total_cmp(&a.adjusted_value))
        })
        .unwrap_or(&staff.starter)
}

/// The winning staff's save, if one is on offer.
pub fn save_pitcher<'a>(
    staff: &'a StaffLine,
    winner: usize,
    margin: u32,
    extra_innings: bool,
    cfg: &DecisionConfig,
) -> Option<&'a PitchingLine> {
    if extra_innings || staff.starter.outs >= Outs::REGULATION || margin > cfg.save_max_margin {
        return None;
    }
    let eligible: Vec<&PitchingLine> =
        staff.relievers.iter().filter(|r| r.pitcher != winner && !r.outs.is_zero()).collect();
    let long_relief = Outs::from_innings(cfg.long_relief_innings);
    best_relief_value(eligible.iter().copied().filter(|r| r.outs >= long_relief))
        .or_else(|| best_relief_value(eligible.iter().copied()))
}

fn best_relief_value<'a>(
    lines: impl Iterator<Item = &'a PitchingLine>,
) -> Option<&'a PitchingLine> {
    lines.max_by(|a, b| a.relief_value.total_cmp(&b.relief_value))
}

pub fn assign_decisions(
    winners: &StaffLine,
    losers: &StaffLine,
    margin: u32,
    extra_innings: bool,
    cfg: &DecisionConfig,
) -> Decisions {
    let win = winning_pitcher(winners, cfg);
    let loss = losing_pitcher(losers, cfg);
    let save = save_pitcher(winners, win.pitcher, margin, extra_innings, cfg);
    Decisions {
        win: Credit::of(winners.team, win),
        loss: Credit::of(losers.team, loss),
        save: save.map(|line| Credit::of(winners.team, line)),
    }
}
