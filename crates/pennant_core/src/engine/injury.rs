use serde::{Deserialize, Serialize};

use crate::dice::DieRoller;
use crate::models::{InjuryStatus, Team};

/// How long an injured batter sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InjuryDuration {
    Days(u32),
    Season,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryReport {
    /// 1-based roster slot of the injured batter.
    pub slot: usize,
    pub name: String,
    pub duration: InjuryDuration,
}

/// Days lost from three dice: sum x 3 plus the batter's injury rating,
/// floored at 0. Odd triples end the season, even triples double the time.
pub fn injury_duration(dice: [u8; 3], injury_rating: i32) -> InjuryDuration {
    let base = i64::from(dice.iter().map(|d| u32::from(*d)).sum::<u32>()) * 3;
    let days = (base + i64::from(injury_rating)).max(0) as u32;
    if dice[0] == dice[1] && dice[1] == dice[2] {
        if dice[0] % 2 == 1 {
            return InjuryDuration::Season;
        }
        return InjuryDuration::Days(days * 2);
    }
    InjuryDuration::Days(days)
}

/// One die picks the batter (slots 1-6), three more set the duration. The
/// status lands on the batter; a roster too short for the roll is a no-op.
pub fn check_injury(team: &mut Team, dice: &mut dyn DieRoller, day: u32) -> Option<InjuryReport> {
    let slot = usize::from(dice.roll());
    let duration_dice = [dice.roll(), dice.roll(), dice.roll()];

    let Some(batter) = slot.checked_sub(1).and_then(|i| team.batters.get_mut(i)) else {
        log::warn!("Injury roll hit empty roster slot {} on {}", slot, team.name);
        return None;
    };

    let duration = injury_duration(duration_dice, batter.injury);
    batter.injury_status = match duration {
        InjuryDuration::Days(days) => InjuryStatus::Out { return_day: day + days },
        InjuryDuration::Season => InjuryStatus::SeasonEnding,
    };
    match duration {
        InjuryDuration::Days(days) => {
            log::info!("{} ({}) is injured for {} days", batter.name, team.name, days)
        }
        InjuryDuration::Season => {
            log::info!("{} ({}) is injured for the rest of the season", batter.name, team.name)
        }
    }

    Some(InjuryReport { slot, name: batter.name.clone(), duration })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::models::{Batter, TeamId};

    #[test]
    fn test_duration_rules() {
        assert_eq!(injury_duration([1, 2, 3], 0), InjuryDuration::Days(18));
        assert_eq!(injury_duration([1, 2, 3], -30), InjuryDuration::Days(0));
        assert_eq!(injury_duration([2, 2, 2], 1), InjuryDuration::Days(38));
        assert_eq!(injury_duration([3, 3, 3], 0), InjuryDuration::Season);
    }

    #[test]
    fn test_injury_marks_batter() {
        let mut team = Team::new(TeamId(3), "Gulls");
        for i in 0..9 {
            team.batters.push(Batter::new(format!("B{}", i + 1)));
        }
        team.batters[1].injury = 2;
        let mut dice = ScriptedDice::new(vec![2, 4, 5, 6]);
        let report = check_injury(&mut team, &mut dice, 40).unwrap();
        assert_eq!(report.slot, 2);
        assert_eq!(report.duration, InjuryDuration::Days(47));
        assert_eq!(team.batters[1].injury_status, InjuryStatus::Out { return_day: 87 });
    }

    #[test]
    fn test_short_roster_is_noop() {
        let mut team = Team::new(TeamId(3), "Gulls");
        team.batters.push(Batter::new("Only"));
        let mut dice = ScriptedDice::new(vec![6, 1, 1, 2]);
        assert!(check_injury(&mut team, &mut dice, 1).is_none());
        assert_eq!(dice.consumed(), 4);
    }
}
