//! # Static resolution charts
//!
//! Lookup tables the dice are read against. Every lookup is a pure function
//! returning `None` for a key the chart does not cover; callers treat that as
//! "no bonus" and carry on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::ReliefConfig;
use crate::dice::DiceRoll;
use crate::models::team::LINEUP_SIZE;
use crate::models::{Outs, Position};

/// A roster reference printed on a chart: `Spot n` is lineup slot n (1-9),
/// `Bench n` is the n-th bench player (roster slot 9 + n).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RosterRef {
    Spot(u8),
    Bench(u8),
}

impl RosterRef {
    /// 1-based roster slot.
    pub fn slot(self) -> usize {
        match self {
            RosterRef::Spot(n) => usize::from(n),
            RosterRef::Bench(n) => LINEUP_SIZE + usize::from(n),
        }
    }
}

impl fmt::Display for RosterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterRef::Spot(n) => write!(f, "Spot {}", n),
            RosterRef::Bench(n) => write!(f, "Bench {}", n),
        }
    }
}

impl FromStr for RosterRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, number) =
            s.trim().split_once(' ').ok_or_else(|| format!("bad roster reference '{}'", s))?;
        let number: u8 = number
            .trim()
            .parse()
            .map_err(|_| format!("bad slot number in roster reference '{}'", s))?;
        match kind {
            "Spot" if (1..=9).contains(&number) => Ok(RosterRef::Spot(number)),
            "Bench" if (1..=6).contains(&number) => Ok(RosterRef::Bench(number)),
            _ => Err(format!("bad roster reference '{}'", s)),
        }
    }
}

impl TryFrom<String> for RosterRef {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RosterRef> for String {
    fn from(value: RosterRef) -> Self {
        value.to_string()
    }
}

/// Defense chart entry: a fielding position on the fielding team, or one of
/// its bench players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefenseRef {
    Fielder(Position),
    Roster(RosterRef),
}

use RosterRef::{Bench as B, Spot as S};

const POWER_CHART: [[RosterRef; 6]; 6] = [
    [S(4), B(6), B(5), S(5), S(7), S(9)],
    [S(3), S(4), B(1), S(2), S(6), B(2)],
    [B(4), S(3), S(4), S(1), S(5), B(3)],
    [S(5), S(2), S(3), S(4), S(1), S(6)],
    [S(8), S(7), S(6), S(3), S(4), S(2)],
    [B(2), S(8), S(5), B(1), S(3), S(4)],
];

const SPEED_BENCH_CHART: [[RosterRef; 6]; 6] = [
    [S(5), B(1), B(2), S(3), S(6), S(2)],
    [S(1), S(8), S(3), S(4), S(7), B(3)],
    [S(1), S(1), S(1), S(9), S(1), S(1)],
    [S(2), B(3), B(6), S(2), S(3), B(5)],
    [S(6), S(9), S(8), B(4), S(2), S(1)],
    [S(7), B(2), S(4), B(1), S(3), S(5)],
];

const DEFENSE_CHART: [[DefenseRef; 2]; 8] = {
    use DefenseRef::{Fielder as F, Roster as R};
    use Position::*;
    [
        [R(B(5)), F(CenterField)],
        [R(B(4)), R(B(6))],
        [R(B(2)), R(B(3))],
        [F(Catcher), R(B(1))],
        [F(Shortstop), F(FirstBase)],
        [F(ThirdBase), F(Shortstop)],
        [F(CenterField), F(LeftField)],
        [F(SecondBase), F(RightField)],
    ]
};

/// Bullpen outs owed, by endurance bracket (row) and `6 - white` (column).
const BULLPEN_OUTS: [[u32; 6]; 8] = [
    [9, 10, 11, 12, 13, 14],
    [8, 9, 10, 11, 12, 13],
    [7, 8, 9, 10, 11, 12],
    [6, 7, 8, 9, 10, 11],
    [5, 6, 7, 8, 9, 10],
    [4, 5, 6, 7, 8, 9],
    [3, 4, 5, 6, 7, 8],
    [2, 3, 4, 5, 6, 7],
];

/// Relievers needed, by bullpen outs 1..=14 (row) and red die (column).
const RELIEVERS_NEEDED: [[usize; 6]; 14] = [
    [1, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 1, 2],
    [1, 1, 1, 1, 2, 2],
    [1, 1, 1, 2, 2, 2],
    [1, 1, 2, 2, 2, 2],
    [1, 2, 2, 2, 2, 3],
    [2, 2, 2, 2, 3, 3],
    [2, 2, 2, 3, 3, 3],
    [2, 2, 3, 3, 3, 4],
    [2, 3, 3, 3, 4, 4],
    [3, 3, 3, 4, 4, 4],
    [3, 3, 4, 4, 4, 4],
    [3, 4, 4, 4, 4, 5],
    [4, 4, 4, 4, 5, 5],
];

fn die_index(die: u8) -> Option<usize> {
    (1..=6).contains(&die).then(|| usize::from(die - 1))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionCharts {
    pub power: [[RosterRef; 6]; 6],
    pub speed_bench: [[RosterRef; 6]; 6],
    /// Dice sums 3..=10, `[odd green, even green]`.
    pub defense: [[DefenseRef; 2]; 8],
    pub bullpen_outs: [[u32; 6]; 8],
    pub relievers_needed: [[usize; 6]; 14],
}

impl Default for ResolutionCharts {
    fn default() -> Self {
        Self {
            power: POWER_CHART,
            speed_bench: SPEED_BENCH_CHART,
            defense: DEFENSE_CHART,
            bullpen_outs: BULLPEN_OUTS,
            relievers_needed: RELIEVERS_NEEDED,
        }
    }
}

impl ResolutionCharts {
    /// Power bonus hitter: row by the pair white makes, column by the odd die.
    pub fn power_entry(&self, roll: DiceRoll) -> Option<RosterRef> {
        let (pair, odd) = roll.power_key()?;
        let entry = self.power.get(die_index(pair)?)?.get(die_index(odd)?).copied();
        if entry.is_none() {
            log::debug!("Power chart has no entry for {}", roll);
        }
        entry
    }

    /// Speed/bench bonus player: only defined when red and green match.
    pub fn speed_bench_entry(&self, roll: DiceRoll) -> Option<RosterRef> {
        if roll.red != roll.green {
            log::debug!("Speed/bench chart has no entry for red {} green {}", roll.red, roll.green);
            return None;
        }
        self.speed_bench.get(die_index(roll.red)?)?.get(die_index(roll.white)?).copied()
    }

    pub fn defense_entry(&self, dice_sum: u8, green: u8) -> Option<DefenseRef> {
        let row = dice_sum.checked_sub(3).map(usize::from).and_then(|i| self.defense.get(i));
        match row {
            Some(row) => Some(row[if green % 2 == 1 { 0 } else { 1 }]),
            None => {
                log::debug!("Defense chart has no entry for dice sum {}", dice_sum);
                None
            }
        }
    }

    /// Outs the bullpen owes behind a starter of this endurance.
    pub fn bullpen_outs(&self, endurance: f64, white: u8) -> Option<Outs> {
        if endurance.is_nan() || endurance > self.bullpen_outs.len() as f64 {
            log::warn!("Bullpen chart has no bracket for endurance {}", endurance);
            return None;
        }
        let bracket = (endurance.ceil().max(1.0) as usize) - 1;
        let column = 6usize.checked_sub(usize::from(white)).filter(|c| *c < 6);
        match column {
            Some(column) => Some(Outs(self.bullpen_outs[bracket][column])),
            None => {
                log::warn!("Bullpen chart has no column for white die {}", white);
                None
            }
        }
    }

    /// Relievers to bring in for the owed outs; 0 when nothing is owed.
    pub fn relievers_needed(&self, bullpen: Outs, red: u8, cfg: &ReliefConfig) -> usize {
        if bullpen.0 >= cfg.default_threshold_outs {
            return cfg.default_count;
        }
        let entry = (bullpen.0 as usize)
            .checked_sub(1)
            .and_then(|row| self.relievers_needed.get(row))
            .zip(die_index(red))
            .map(|(row, column)| row[column]);
        match entry {
            Some(count) => count,
            None => {
                if !bullpen.is_zero() {
                    log::warn!("Relievers chart has no entry for {} innings, red {}", bullpen, red);
                }
                0
            }
        }
    }
}

/// Lineup slot (1-8) whose batting rating is added for a dice sum above 10.
pub fn individual_bonus_slot(dice_sum: u8) -> Option<usize> {
    (11..=18).contains(&dice_sum).then(|| usize::from(dice_sum - 10))
}

/// Extra-innings batter: red then green read as a two-digit number, mapped
/// onto roster slots 1-15.
pub fn extra_innings_slot(red: u8, green: u8) -> Option<usize> {
    let slot = match (red, green) {
        (1, 1..=2) => 1,
        (1, 3..=4) => 2,
        (1, 5..=6) => 3,
        (2, 1..=2) => 4,
        (2, 3..=4) => 5,
        (2, 5..=6) => 6,
        (3, 1..=2) => 7,
        (3, 3..=4) => 8,
        (3, 5..=6) => 9,
        (4, 1..=3) => 10,
        (4, 4..=6) => 11,
        (5, 1..=3) => 12,
        (5, 4..=6) => 13,
        (6, 1..=3) => 14,
        (6, 4..=6) => 15,
        _ => {
            log::debug!("Extra-innings chart has no entry for {}{}", red, green);
            return None;
        }
    };
    Some(slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_chart_uses_odd_die() {
        let charts = ResolutionCharts::default();
        assert_eq!(charts.power_entry(DiceRoll::new(1, 1, 2)), Some(RosterRef::Bench(6)));
        assert_eq!(charts.power_entry(DiceRoll::new(5, 3, 5)), Some(RosterRef::Spot(6)));
        assert_eq!(charts.power_entry(DiceRoll::new(6, 6, 6)), Some(RosterRef::Spot(4)));
        assert_eq!(charts.power_entry(DiceRoll::new(1, 2, 3)), None);
    }

    #[test]
    fn test_speed_bench_requires_red_green_pair() {
        let charts = ResolutionCharts::default();
        assert_eq!(charts.speed_bench_entry(DiceRoll::new(4, 3, 3)), Some(RosterRef::Spot(9)));
        assert_eq!(charts.speed_bench_entry(DiceRoll::new(2, 2, 2)), Some(RosterRef::Spot(8)));
        assert_eq!(charts.speed_bench_entry(DiceRoll::new(2, 3, 4)), None);
    }

    #[test]
    fn test_roster_ref_slots() {
        assert_eq!(RosterRef::Spot(4).slot(), 4);
        assert_eq!(RosterRef::Bench(1).slot(), 10);
        assert_eq!("Bench 6".parse::<RosterRef>(), Ok(RosterRef::Bench(6)));
        assert!("Bench 9".parse::<RosterRef>().is_err());
        assert!("Spot".parse::<RosterRef>().is_err());
    }

    #[test]
    fn test_defense_chart_parity() {
        let charts = ResolutionCharts::default();
        assert_eq!(charts.defense_entry(7, 3), Some(DefenseRef::Fielder(Position::Shortstop)));
        assert_eq!(charts.defense_entry(7, 2), Some(DefenseRef::Fielder(Position::FirstBase)));
        assert_eq!(charts.defense_entry(4, 1), Some(DefenseRef::Roster(RosterRef::Bench(4))));
        assert_eq!(charts.defense_entry(11, 1), None);
    }

    #[test]
    fn test_bullpen_chart_brackets() {
        let charts = ResolutionCharts::default();
        // Endurance 7 falls in the (6.0, 7.0] bracket; white 6 is column 0.
        assert_eq!(charts.bullpen_outs(7.0, 6), Some(Outs::from_notation(1.0)));
        assert_eq!(charts.bullpen_outs(6.5, 1), Some(Outs::from_notation(2.2)));
        assert_eq!(charts.bullpen_outs(0.5, 1), Some(Outs::from_notation(4.2)));
        assert_eq!(charts.bullpen_outs(8.0, 6), Some(Outs::from_notation(0.2)));
        assert_eq!(charts.bullpen_outs(8.5, 3), None);
    }

    #[test]
    fn test_relievers_needed() {
        let charts = ResolutionCharts::default();
        let cfg = ReliefConfig::default();
        assert_eq!(charts.relievers_needed(Outs::from_notation(4.2), 6, &cfg), 5);
        assert_eq!(charts.relievers_needed(Outs::from_notation(2.0), 1, &cfg), 1);
        assert_eq!(charts.relievers_needed(Outs::from_notation(0.1), 6, &cfg), 1);
        assert_eq!(charts.relievers_needed(Outs::from_innings(5), 1, &cfg), 5);
        assert_eq!(charts.relievers_needed(Outs::ZERO, 3, &cfg), 0);
    }

    #[test]
    fn test_extra_innings_bands() {
        assert_eq!(extra_innings_slot(1, 1), Some(1));
        assert_eq!(extra_innings_slot(3, 6), Some(9));
        assert_eq!(extra_innings_slot(4, 3), Some(10));
        assert_eq!(extra_innings_slot(6, 6), Some(15));
        assert_eq!(extra_innings_slot(7, 1), None);
    }

    #[test]
    fn test_individual_bonus_slot() {
        assert_eq!(individual_bonus_slot(10), None);
        assert_eq!(individual_bonus_slot(11), Some(1));
        assert_eq!(individual_bonus_slot(18), Some(8));
    }

    #[test]
    fn test_charts_serialize_as_text() {
        let json = serde_json::to_string(&ResolutionCharts::default()).unwrap();
        assert!(json.contains("\"Bench 6\""));
        let back: ResolutionCharts = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ResolutionCharts::default());
    }
}
