//! League directory loading.
//!
//! A league directory holds `league.json` (name, leagues → divisions → team
//! ids, schedule file name, optional seed and engine overrides), one
//! `team_id_<id>.json` per team, and the schedule file it names.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::charts::ResolutionCharts;
use crate::config::EngineConfig;
use crate::engine::GameEngine;
use crate::error::{Result, SimError};
use crate::models::{Team, TeamId};
use crate::season::Schedule;
use crate::stats::{League, LeagueStructure};

pub const LEAGUE_FILE: &str = "league.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueFile {
    #[serde(alias = "league_name")]
    pub name: String,
    pub leagues: Vec<League>,
    /// Schedule file, relative to the league directory.
    #[serde(alias = "schedule_name")]
    pub schedule: String,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub config: Option<EngineConfig>,
    #[serde(default)]
    pub charts: Option<ResolutionCharts>,
}

impl LeagueFile {
    pub fn structure(&self) -> LeagueStructure {
        LeagueStructure { leagues: self.leagues.clone() }
    }

    pub fn engine(&self) -> GameEngine {
        GameEngine::new(
            self.charts.clone().unwrap_or_default(),
            self.config.clone().unwrap_or_default(),
        )
    }
}

/// Park fields older exports write at the top level of a team file, and
/// where they belong inside `ballpark`.
const LEGACY_PARK_FIELDS: [(&str, &str); 4] = [
    ("ballpark_name", "name"),
    ("ballpark_capacity", "capacity"),
    ("stadium_value", "stadium_value"),
    ("home_field_advantage", "home_field_advantage"),
];

fn nest_legacy_park(value: &mut Value) {
    let Some(object) = value.as_object_mut() else {
        return;
    };
    let mut park = match object.remove("ballpark") {
        Some(Value::Object(park)) => park,
        _ => Map::new(),
    };
    for (legacy, field) in LEGACY_PARK_FIELDS {
        if let Some(v) = object.remove(legacy) {
            park.insert(field.to_string(), v);
        }
    }
    if !park.is_empty() {
        object.insert("ballpark".to_string(), Value::Object(park));
    }
}

pub fn team_path(dir: &Path, team: TeamId) -> PathBuf {
    dir.join(format!("team_id_{}.json", team))
}

pub fn parse_team(json: &str) -> Result<Team> {
    let mut value: Value = serde_json::from_str(json)?;
    nest_legacy_park(&mut value);
    let team: Team = serde_json::from_value(value)?;
    team.validate().map_err(SimError::InvalidTeam)?;
    Ok(team)
}

pub fn load_team(path: &Path) -> Result<Team> {
    let text = std::fs::read_to_string(path)?;
    parse_team(&text).map_err(|err| match err {
        SimError::InvalidTeam(reason) => {
            SimError::InvalidTeam(format!("{}: {}", path.display(), reason))
        }
        other => other,
    })
}

/// Everything needed to start a season.
#[derive(Debug, Clone)]
pub struct LeagueData {
    pub file: LeagueFile,
    pub teams: Vec<Team>,
    pub schedule: Schedule,
}

/// Loads a league directory. A team whose file is missing is logged and left
/// out; its games are skipped when the season reaches them.
pub fn load_league(dir: &Path) -> Result<LeagueData> {
    let text = std::fs::read_to_string(dir.join(LEAGUE_FILE))?;
    let file: LeagueFile = serde_json::from_str(&text)?;
    file.structure().validate().map_err(SimError::InvalidTeam)?;
    if let Some(config) = &file.config {
        config.validate().map_err(SimError::InvalidConfig)?;
    }

    let mut teams = Vec::new();
    for id in file.structure().team_ids() {
        let path = team_path(dir, id);
        if !path.exists() {
            log::warn!("No team file for team {} at {}", id, path.display());
            continue;
        }
        let team = load_team(&path)?;
        if team.id != id {
            return Err(SimError::InvalidTeam(format!(
                "{} holds team {}, expected {}",
                path.display(),
                team.id,
                id
            )));
        }
        teams.push(team);
    }

    let schedule = Schedule::load(&dir.join(&file.schedule))?;
    log::info!("Loaded {} with {} teams", file.name, teams.len());
    Ok(LeagueData { file, teams, schedule })
}

/// Writes a league directory that [`load_league`] reads back.
pub fn write_league(dir: &Path, file: &LeagueFile, teams: &[Team], schedule: &Schedule) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join(LEAGUE_FILE), serde_json::to_string_pretty(file)?)?;
    for team in teams {
        std::fs::write(team_path(dir, team.id), serde_json::to_string_pretty(team)?)?;
    }
    std::fs::write(dir.join(&file.schedule), serde_json::to_string_pretty(schedule)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::models::PitcherRole;

    const LEGACY_TEAM: &str = r#"{
        "team_id": 7,
        "team_name": "Harbor Gulls",
        "stadium_value": 1.5,
        "home_field_advantage": 0.5,
        "ballpark_name": "Pier Park",
        "unearned_runs_chart": {"7": 2, "9": 1},
        "players": [
            {"name": "Lead", "role": "Starter", "batting": 5.0, "power": 2.0,
             "splits_L": 1.0, "splits_R": -1.0, "speed": 3.0, "fielding": 2.0,
             "clutch": 1.0, "position": "SS", "bats": "L"}
        ],
        "pitchers": [
            {"name": "Ace", "type": "SP", "splits_L": 0.5, "splits_R": 0.0,
             "start_value": 5.5, "relief_value": 0.0, "endurance": 7.0, "rest": 4,
             "throws": "L", "cg_rating": 640},
            {"name": "Closer", "type": "RP", "relief_value": 4.0, "fatigue": 3}
        ]
    }"#;

    #[test]
    fn test_parse_legacy_team() {
        let team = parse_team(LEGACY_TEAM).unwrap();
        assert_eq!(team.id, TeamId(7));
        assert_eq!(team.name, "Harbor Gulls");
        assert_eq!(team.ballpark.stadium_value, 1.5);
        assert_eq!(team.ballpark.name, "Pier Park");
        assert_eq!(team.unearned_runs.runs_for(7), 2);
        assert_eq!(team.unearned_runs.runs_for(4), 0);
        assert_eq!(team.batters[0].vs_left, 1.0);
        assert_eq!(team.pitchers[0].cg_rating, 640);
        assert_eq!(team.pitchers[0].sho_rating, 666);
        assert_eq!(team.pitchers[1].role, PitcherRole::Reliever);
        assert_eq!(team.pitchers[1].last_relief_day, None);
    }

    #[test]
    fn test_team_without_pitchers_is_invalid() {
        let err = parse_team(r#"{"id": 1, "name": "Empty", "batters": [{"name": "Solo"}]}"#)
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidTeam(_)));
    }

    #[test]
    fn test_league_directory_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let (structure, teams) = fixtures::synthetic_league(1, 2, 2, 6);
        let ids: Vec<TeamId> = structure.team_ids().collect();
        let schedule = fixtures::round_robin_schedule(&ids, 4);
        let file = LeagueFile {
            name: "Test League".into(),
            leagues: structure.leagues.clone(),
            schedule: "schedule.json".into(),
            seed: Some(6),
            config: None,
            charts: None,
        };
        write_league(dir.path(), &file, &teams, &schedule).unwrap();
        std::fs::remove_file(team_path(dir.path(), TeamId(4))).unwrap();

        let loaded = load_league(dir.path()).unwrap();
        assert_eq!(loaded.file, file);
        assert_eq!(loaded.teams.len(), 3);
        assert_eq!(loaded.teams[0], teams[0]);
        assert_eq!(loaded.schedule, schedule);
    }

    #[test]
    fn test_league_with_even_series_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (structure, teams) = fixtures::synthetic_league(1, 1, 2, 2);
        let ids: Vec<TeamId> = structure.team_ids().collect();
        let mut config = EngineConfig::default();
        config.postseason.series_length = 4;
        let file = LeagueFile {
            name: "Short Series".into(),
            leagues: structure.leagues,
            schedule: "schedule.json".into(),
            seed: None,
            config: Some(config),
            charts: None,
        };
        write_league(dir.path(), &file, &teams, &fixtures::round_robin_schedule(&ids, 2)).unwrap();
        assert!(matches!(load_league(dir.path()), Err(SimError::InvalidConfig(_))));
    }
}
