//! # Extra innings
//!
//! A tied game is settled in one extra frame per side: each side sends up a
//! batter picked off the lineup chart and faces the other side's best
//! remaining arm. Higher special value wins; an exact tie goes to a dice
//! cascade.

use serde::{Deserialize, Serialize};

use super::relief::BullpenArena;
use crate::charts::extra_innings_slot;
use crate::dice::DieRoller;
use crate::models::Team;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

/// Step of the tie-break cascade that settled the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreakStep {
    Green,
    Red,
    White,
    /// Still level after the white die.
    HomeDefault,
}

/// Who takes the mound in the extra frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtraArm {
    /// Best reliever not yet used this game.
    Fresh { pitcher: usize },
    /// Bullpen is spent: the last reliever used goes again.
    Tired { pitcher: usize },
    /// No relievers at all.
    Starter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraSide {
    pub batter_slot: Option<usize>,
    /// Batting plus clutch of the chosen batter.
    pub batter_value: f64,
    pub arm: ExtraArm,
    pub arm_value: f64,
    /// Own batter value minus the opposing arm value.
    pub special_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraInningsOutcome {
    pub winner: Side,
    pub home: ExtraSide,
    pub away: ExtraSide,
    pub tiebreak: Option<TieBreakStep>,
}

impl ExtraInningsOutcome {
    pub fn side(&self, side: Side) -> &ExtraSide {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }
}

/// Relief value lost by a reliever going a second time in one game.
pub fn fatigue_penalty(fatigue: f64) -> f64 {
    if fatigue >= 7.0 {
        1.0
    } else if fatigue >= 5.0 {
        2.0
    } else if fatigue >= 3.0 {
        3.0
    } else {
        4.0
    }
}

/// Red then green picks the batter; a slot past the roster counts as 0.
pub fn extra_batter(team: &Team, dice: &mut dyn DieRoller) -> (Option<usize>, f64) {
    let red = dice.roll();
    let green = dice.roll();
    let slot = extra_innings_slot(red, green);
    let value = slot.and_then(|s| team.lineup_slot(s)).map(|b| b.batting + b.clutch);
    if slot.is_some() && value.is_none() {
        log::debug!("{} has nobody in extra-innings slot {:?}", team.name, slot);
    }
    (slot, value.unwrap_or(0.0))
}

/// The side's extra-frame arm and its value.
pub fn extra_arm(team: &Team, arena: &BullpenArena) -> (ExtraArm, f64) {
    let fresh = team
        .reliever_indices()
        .filter(|i| !arena.is_used(*i))
        .fold(None::<usize>, |best, i| match best {
            Some(b) if team.pitchers[b].relief_value >= team.pitchers[i].relief_value => Some(b),
            _ => Some(i),
        });
    if let Some(index) = fresh {
        let p = &team.pitchers[index];
        return (ExtraArm::Fresh { pitcher: index }, p.relief_value + p.clutch);
    }
    if let Some(index) = arena.last_used() {
        let p = &team.pitchers[index];
        let value = (p.relief_value - fatigue_penalty(p.fatigue) + p.clutch).max(0.0);
        return (ExtraArm::Tired { pitcher: index }, value);
    }
    (ExtraArm::Starter, 0.0)
}

/// Independent die per side at each step; the home side adds its
/// home-field advantage on the green step. Level after white: home wins.
pub fn break_tie(home_field_advantage: f64, dice: &mut dyn DieRoller) -> (Side, TieBreakStep) {
    let mut away = 0.0;
    let mut home = 0.0;
    for step in [TieBreakStep::Green, TieBreakStep::Red, TieBreakStep::White] {
        away += f64::from(dice.roll());
        home += f64::from(dice.roll());
        if step == TieBreakStep::Green {
            home += home_field_advantage;
        }
        log::debug!("Tie-break {:?}: away {} home {}", step, away, home);
        if away > home {
            return (Side::Away, step);
        }
        if home > away {
            return (Side::Home, step);
        }
    }
    (Side::Home, TieBreakStep::HomeDefault)
}

/// Plays the extra frame. Read-only: crediting the extra inning to the arms
/// is the caller's job.
pub fn resolve_extra_innings(
    home: &Team,
    away: &Team,
    home_arena: &BullpenArena,
    away_arena: &BullpenArena,
    dice: &mut dyn DieRoller,
) -> ExtraInningsOutcome {
    let (away_slot, away_bat) = extra_batter(away, dice);
    let (home_slot, home_bat) = extra_batter(home, dice);
    let (away_arm, away_arm_value) = extra_arm(away, away_arena);
    let (home_arm, home_arm_value) = extra_arm(home, home_arena);

    let away_side = ExtraSide {
        batter_slot: away_slot,
        batter_value: away_bat,
        arm: away_arm,
        arm_value: away_arm_value,
        special_value: away_bat - home_arm_value,
    };
    let home_side = ExtraSide {
        batter_slot: home_slot,
        batter_value: home_bat,
        arm: home_arm,
        arm_value: home_arm_value,
        special_value: home_bat - away_arm_value,
    };

    let (winner, tiebreak) = if away_side.special_value > home_side.special_value {
        (Side::Away, None)
    } else if home_side.special_value > away_side.special_value {
        (Side::Home, None)
    } else {
        let (side, step) = break_tie(home.ballpark.home_field_advantage, dice);
        (side, Some(step))
    };
    log::debug!(
        "Extra innings: {} {:.1} vs {} {:.1}, {:?} wins",
        away.name,
        away_side.special_value,
        home.name,
        home_side.special_value,
        winner
    );

    ExtraInningsOutcome { winner, home: home_side, away: away_side, tiebreak }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::{Dice, ScriptedDice};
    use crate::models::{Batter, Pitcher, PitcherRole, TeamId};

    fn team(id: u32, hfa: f64) -> Team {
        let mut t = Team::new(TeamId(id), format!("T{}", id));
        for i in 0..15 {
            let mut b = Batter::new(format!("B{}", i + 1));
            b.batting = 5.0;
            t.batters.push(b);
        }
        t.pitchers.push(Pitcher::new("SP", PitcherRole::Starter));
        let mut rp = Pitcher::new("RP", PitcherRole::Reliever);
        rp.relief_value = 3.0;
        rp.clutch = 1.0;
        rp.fatigue = 5.0;
        t.pitchers.push(rp);
        t.ballpark.home_field_advantage = hfa;
        t
    }

    #[test]
    fn test_fatigue_penalty_steps() {
        assert_eq!(fatigue_penalty(8.0), 1.0);
        assert_eq!(fatigue_penalty(5.0), 2.0);
        assert_eq!(fatigue_penalty(3.5), 3.0);
        assert_eq!(fatigue_penalty(1.0), 4.0);
    }

    #[test]
    fn test_arm_fallbacks() {
        let t = team(1, 0.0);
        let mut arena = BullpenArena::new();
        assert_eq!(extra_arm(&t, &arena), (ExtraArm::Fresh { pitcher: 1 }, 4.0));
        arena.mark_used(1);
        // 3 - 2 + 1
        assert_eq!(extra_arm(&t, &arena), (ExtraArm::Tired { pitcher: 1 }, 2.0));
        let mut bare = team(2, 0.0);
        bare.pitchers.truncate(1);
        assert_eq!(extra_arm(&bare, &BullpenArena::new()), (ExtraArm::Starter, 0.0));
    }

    #[test]
    fn test_green_step_includes_home_field() {
        // Equal special values; away green 3, home green 3 + 1.
        let home = team(1, 1.0);
        let away = team(2, 0.0);
        let arena = BullpenArena::new();
        let mut dice = ScriptedDice::new(vec![1, 1, 1, 1, 3, 3]);
        let outcome = resolve_extra_innings(&home, &away, &arena, &arena, &mut dice);
        assert_eq!(outcome.home.special_value, outcome.away.special_value);
        assert_eq!(outcome.winner, Side::Home);
        assert_eq!(outcome.tiebreak, Some(TieBreakStep::Green));
    }

    #[test]
    fn test_cascade_moves_to_red_then_white() {
        let mut dice = ScriptedDice::new(vec![4, 4, 2, 5]);
        assert_eq!(break_tie(0.0, &mut dice), (Side::Home, TieBreakStep::Red));
        let mut dice = ScriptedDice::new(vec![4, 4, 2, 2, 6, 1]);
        assert_eq!(break_tie(0.0, &mut dice), (Side::Away, TieBreakStep::White));
        let mut dice = ScriptedDice::new(vec![3]);
        assert_eq!(break_tie(0.0, &mut dice), (Side::Home, TieBreakStep::HomeDefault));
    }

    #[test]
    fn test_better_batter_wins_outright() {
        let home = team(1, 0.0);
        let mut away = team(2, 0.0);
        away.batters[0].batting = 12.0;
        let arena = BullpenArena::new();
        // Away rolls 1-1 (slot 1), home rolls 6-6 (slot 15).
        let mut dice = ScriptedDice::new(vec![1, 1, 6, 6]);
        let outcome = resolve_extra_innings(&home, &away, &arena, &arena, &mut dice);
        assert_eq!(outcome.winner, Side::Away);
        assert_eq!(outcome.away.batter_slot, Some(1));
        assert_eq!(outcome.home.batter_slot, Some(15));
        assert!(outcome.tiebreak.is_none());
    }

    #[test]
    fn test_always_one_winner() {
        let home = team(1, 0.5);
        let away = team(2, 0.0);
        let arena = BullpenArena::new();
        for seed in 0..100 {
            let mut dice = Dice::from_seed(seed);
            let outcome = resolve_extra_innings(&home, &away, &arena, &arena, &mut dice);
            assert!(matches!(outcome.winner, Side::Home | Side::Away));
        }
    }
}
