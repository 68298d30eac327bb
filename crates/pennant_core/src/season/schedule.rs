//! Season schedule: day-ordered `(home, away)` matchups.
//!
//! Two input shapes are accepted: a JSON array of entries, or the
//! line-oriented listing with one `<Game day="1" time="7:05" away="2"
//! home="1"/>` element per line.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, SimError};
use crate::models::TeamId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledGame {
    pub day: u32,
    pub home: TeamId,
    pub away: TeamId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    games: Vec<ScheduledGame>,
}

impl Schedule {
    /// Entries are kept in day order; within a day the listed order stands.
    pub fn new(mut games: Vec<ScheduledGame>) -> Self {
        games.sort_by_key(|g| g.day);
        Self { games }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let games: Vec<ScheduledGame> = serde_json::from_str(json)?;
        Ok(Self::new(games))
    }

    pub fn from_listing(text: &str) -> Result<Self> {
        let games = text
            .lines()
            .enumerate()
            .filter(|(_, line)| line.contains("<Game"))
            .map(|(number, line)| parse_game_line(line).map_err(|reason| {
                SimError::InvalidSchedule(format!("line {}: {}", number + 1, reason))
            }))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(games))
    }

    /// Picks the parser by extension: `.json` or anything else as a listing.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let schedule = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text)?,
            _ => Self::from_listing(&text)?,
        };
        log::info!("Loaded {} games over {} days from {}", schedule.len(), schedule.days().len(), path.display());
        Ok(schedule)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn games(&self) -> &[ScheduledGame] {
        &self.games
    }

    pub fn games_on(&self, day: u32) -> impl Iterator<Item = &ScheduledGame> {
        self.games.iter().filter(move |g| g.day == day)
    }

    /// Distinct scheduled days, ascending.
    pub fn days(&self) -> Vec<u32> {
        let mut days: Vec<u32> = self.games.iter().map(|g| g.day).collect();
        days.dedup();
        days
    }

    pub fn last_day(&self) -> Option<u32> {
        self.games.last().map(|g| g.day)
    }

    /// Games grouped by day, ascending.
    pub fn by_day(&self) -> BTreeMap<u32, Vec<&ScheduledGame>> {
        let mut days: BTreeMap<u32, Vec<&ScheduledGame>> = BTreeMap::new();
        for game in &self.games {
            days.entry(game.day).or_default().push(game);
        }
        days
    }
}

fn attribute<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let key = format!("{}=\"", name);
    let start = line.find(&key)? + key.len();
    let end = line[start..].find('"')? + start;
    Some(&line[start..end])
}

fn numeric(line: &str, name: &str) -> std::result::Result<u32, String> {
    let raw = attribute(line, name).ok_or_else(|| format!("missing {}", name))?;
    raw.trim().parse().map_err(|_| format!("{} is not a number: {:?}", name, raw))
}

fn parse_game_line(line: &str) -> std::result::Result<ScheduledGame, String> {
    Ok(ScheduledGame {
        day: numeric(line, "day")?,
        home: TeamId(numeric(line, "home")?),
        away: TeamId(numeric(line, "away")?),
        time: attribute(line, "time").map(str::to_string),
    })
}
