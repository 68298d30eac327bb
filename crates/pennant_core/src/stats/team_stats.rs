//! Running per-team records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::GameResult;
use crate::models::{TeamId, Throws};

/// A win-loss pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
}

impl Record {
    pub fn record(&mut self, won: bool) {
        if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    /// Winning percentage rounded to three places; 0 before any game.
    pub fn win_pct(&self) -> f64 {
        if self.games() == 0 {
            return 0.0;
        }
        let pct = f64::from(self.wins) / f64::from(self.games());
        (pct * 1000.0).round_ties_even() / 1000.0
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.wins, self.losses)
    }
}

/// Current run of results plus the longest run each way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    /// Positive for consecutive wins, negative for losses.
    pub current: i32,
    pub longest_winning: u32,
    pub longest_losing: u32,
}

impl Streak {
    pub fn push(&mut self, won: bool) {
        self.current = match (won, self.current) {
            (true, n) if n > 0 => n + 1,
            (true, _) => 1,
            (false, n) if n < 0 => n - 1,
            (false, _) => -1,
        };
        let length = self.current.unsigned_abs();
        if won {
            self.longest_winning = self.longest_winning.max(length);
        } else {
            self.longest_losing = self.longest_losing.max(length);
        }
    }
}

impl fmt::Display for Streak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.current {
            0 => write!(f, "-"),
            n if n > 0 => write!(f, "W{}", n),
            n => write!(f, "L{}", n.unsigned_abs()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub team: TeamId,
    pub overall: Record,
    pub home: Record,
    pub away: Record,
    pub one_run: Record,
    pub extra_innings: Record,
    /// Keyed by the opposing starter's throwing hand.
    pub vs_right: Record,
    pub vs_left: Record,
    pub runs_scored: u32,
    pub runs_allowed: u32,
    pub streak: Streak,
    pub most_runs_scored: u32,
    pub most_runs_allowed: u32,
}

impl TeamStats {
    pub fn new(team: TeamId) -> Self {
        Self {
            team,
            overall: Record::default(),
            home: Record::default(),
            away: Record::default(),
            one_run: Record::default(),
            extra_innings: Record::default(),
            vs_right: Record::default(),
            vs_left: Record::default(),
            runs_scored: 0,
            runs_allowed: 0,
            streak: Streak::default(),
            most_runs_scored: 0,
            most_runs_allowed: 0,
        }
    }

    /// Folds one game in. Games this team did not play are ignored.
    pub fn record_game(&mut self, result: &GameResult) {
        let (at_home, scored, allowed, opposing_hand) = if result.home == self.team {
            (true, result.home_runs, result.away_runs, result.away_starter_throws)
        } else if result.away == self.team {
            (false, result.away_runs, result.home_runs, result.home_starter_throws)
        } else {
            return;
        };
        let won = scored > allowed;

        self.overall.record(won);
        if at_home {
            self.home.record(won);
        } else {
            self.away.record(won);
        }
        if result.one_run {
            self.one_run.record(won);
        }
        if result.is_extra_innings() {
            self.extra_innings.record(won);
        }
        match opposing_hand {
            Throws::Right => self.vs_right.record(won),
            Throws::Left => self.vs_left.record(won),
        }

        self.runs_scored += scored;
        self.runs_allowed += allowed;
        self.most_runs_scored = self.most_runs_scored.max(scored);
        self.most_runs_allowed = self.most_runs_allowed.max(allowed);
        self.streak.push(won);
    }

    pub fn wins(&self) -> u32 {
        self.overall.wins
    }

    pub fn losses(&self) -> u32 {
        self.overall.losses
    }

    pub fn games_played(&self) -> u32 {
        self.overall.games()
    }

    pub fn win_pct(&self) -> f64 {
        self.overall.win_pct()
    }

    pub fn run_differential(&self) -> i64 {
        i64::from(self.runs_scored) - i64::from(self.runs_allowed)
    }

    /// `games × RS² / (RS² + RA²)`, rounded half to even. Zero when no runs
    /// have been scored or allowed.
    pub fn pythagorean_wins(&self) -> u32 {
        let scored = f64::from(self.runs_scored).powi(2);
        let allowed = f64::from(self.runs_allowed).powi(2);
        if scored + allowed == 0.0 {
            return 0;
        }
        let expected = f64::from(self.games_played()) * scored / (scored + allowed);
        expected.round_ties_even() as u32
    }

    pub fn pythagorean_losses(&self) -> u32 {
        self.games_played() - self.pythagorean_wins()
    }

    /// Actual wins minus Pythagorean wins.
    pub fn luck(&self) -> i64 {
        i64::from(self.wins()) - i64::from(self.pythagorean_wins())
    }

    pub fn games_behind(&self, leader: &TeamStats) -> f64 {
        let wins = f64::from(leader.wins()) - f64::from(self.wins());
        let losses = f64::from(self.losses()) - f64::from(leader.losses());
        (wins + losses) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_with(wins: u32, losses: u32, scored: u32, allowed: u32) -> TeamStats {
        let mut stats = TeamStats::new(TeamId(1));
        stats.overall = Record { wins, losses };
        stats.runs_scored = scored;
        stats.runs_allowed = allowed;
        stats
    }

    #[test]
    fn test_pythagorean_and_luck() {
        let stats = stats_with(9, 1, 50, 50);
        assert_eq!(stats.pythagorean_wins(), 5);
        assert_eq!(stats.pythagorean_losses(), 5);
        assert_eq!(stats.luck(), 4);

        // 10 * 900 / (900 + 400) = 6.92
        let stats = stats_with(6, 4, 30, 20);
        assert_eq!(stats.pythagorean_wins(), 7);
        assert_eq!(stats.luck(), -1);
    }

    #[test]
    fn test_pythagorean_without_runs_is_zero() {
        let stats = stats_with(0, 0, 0, 0);
        assert_eq!(stats.pythagorean_wins(), 0);
        assert_eq!(stats.luck(), 0);
        assert_eq!(stats.win_pct(), 0.0);
    }

    #[test]
    fn test_pythagorean_ties_round_to_even() {
        // 5 * 1 / 2 = 2.5
        let stats = stats_with(3, 2, 1, 1);
        assert_eq!(stats.pythagorean_wins(), 2);
    }

    #[test]
    fn test_win_pct_three_places() {
        assert_eq!(Record { wins: 2, losses: 1 }.win_pct(), 0.667);
        assert_eq!(Record { wins: 1, losses: 7 }.win_pct(), 0.125);
    }

    #[test]
    fn test_streaks() {
        let mut streak = Streak::default();
        for won in [true, true, true, false, false, true] {
            streak.push(won);
        }
        assert_eq!(streak.current, 1);
        assert_eq!(streak.longest_winning, 3);
        assert_eq!(streak.longest_losing, 2);
        assert_eq!(streak.to_string(), "W1");
        streak.push(false);
        assert_eq!(streak.to_string(), "L1");
    }

    #[test]
    fn test_games_behind() {
        let leader = stats_with(10, 4, 0, 0);
        let chaser = stats_with(8, 7, 0, 0);
        assert_eq!(chaser.games_behind(&leader), 2.5);
        assert_eq!(leader.games_behind(&leader), 0.0);
    }
}
