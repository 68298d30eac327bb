//! End-to-end season runs through the public API: load a league directory,
//! play it with periodic saves, resume, and finish with the postseason.

use pennant_core::data::{load_league, write_league, LeagueFile};
use pennant_core::fixtures::{round_robin_schedule, synthetic_league};
use pennant_core::models::TeamId;
use pennant_core::save::{SaveManager, SeasonSave};
use pennant_core::season::{Postseason, Season};
use pennant_core::{EngineConfig, GameEngine};
use tempfile::TempDir;

const SEED: u64 = 20_240_401;

fn league_dir() -> (TempDir, LeagueFile) {
    let dir = TempDir::new().unwrap();
    let (structure, teams) = synthetic_league(2, 3, 2, 99);
    let ids: Vec<TeamId> = structure.team_ids().collect();
    let schedule = round_robin_schedule(&ids, 22);
    let file = LeagueFile {
        name: "Integration League".into(),
        leagues: structure.leagues,
        schedule: "schedule.json".into(),
        seed: Some(SEED),
        config: Some(EngineConfig::default()),
        charts: None,
    };
    write_league(dir.path(), &file, &teams, &schedule).unwrap();
    (dir, file)
}

fn load_season(dir: &TempDir) -> Season {
    let data = load_league(dir.path()).unwrap();
    let seed = data.file.seed.unwrap_or_default();
    Season::new(data.file.engine(), data.file.structure(), data.schedule, data.teams, seed).unwrap()
}

#[test]
fn test_full_season_and_postseason() {
    let (dir, _) = league_dir();
    let mut season = load_season(&dir);
    let reports = season.play_to_end();

    assert_eq!(reports.len(), 22);
    assert!(reports.iter().all(|r| r.skipped.is_empty()));
    assert!(season.is_complete());

    let state = season.state();
    assert_eq!(state.game_log.len(), 22 * 6);
    let wins: u32 = state.standings.iter().map(|s| s.wins()).sum();
    let losses: u32 = state.standings.iter().map(|s| s.losses()).sum();
    assert_eq!(wins, 132);
    assert_eq!(losses, 132);
    assert_eq!(state.pitching.total_wins(), 132);
    assert_eq!(state.pitching.total_losses(), 132);

    let snapshot = season.snapshot();
    assert_eq!(snapshot.day, 22);
    assert_eq!(snapshot.divisions.len(), 6);
    for division in &snapshot.divisions {
        assert_eq!(division.rows[0].games_behind, 0.0);
    }

    let engine = season.engine().clone();
    let structure = season.structure().clone();
    let last_day = season.last_day();
    let state = season.state_mut();
    let result = Postseason::new(&engine, SEED, last_day)
        .run(&structure, &state.standings, &mut state.teams)
        .unwrap();
    assert_eq!(result.qualifiers().count(), 8);
    assert_eq!(result.series.len(), 7);
    assert!(result.qualifiers().any(|team| team == result.champion));
}

#[test]
fn test_saved_and_resumed_season_matches_straight_run() {
    let (dir, file) = league_dir();
    let saves = TempDir::new().unwrap();
    let manager = SaveManager::new(saves.path());

    let mut straight = load_season(&dir);
    straight.play_to_end();

    let mut first_half = load_season(&dir);
    first_half
        .play_through(Some(11), |report, state| {
            if report.day % 5 == 0 || report.day == 11 {
                let save = SeasonSave::new(file.name.clone(), state.clone());
                manager.auto_save(&save)?;
            }
            Ok(())
        })
        .unwrap();

    let save = manager.load_auto_save().unwrap();
    assert_eq!(save.next_day(), 12);
    let fresh = load_season(&dir);
    let mut resumed = Season::resume(
        GameEngine::default(),
        fresh.structure().clone(),
        fresh.schedule().clone(),
        save.season,
    );
    resumed.play_to_end();

    assert_eq!(resumed.state(), straight.state());
}

#[test]
fn test_missing_team_file_skips_its_games() {
    let (dir, _) = league_dir();
    std::fs::remove_file(pennant_core::data::team_path(dir.path(), TeamId(5))).unwrap();

    let mut season = load_season(&dir);
    let reports = season.play_to_end();
    let skipped: usize = reports.iter().map(|r| r.skipped.len()).sum();

    assert_eq!(skipped, 22);
    assert!(season.state().game_log.iter().all(|g| g.home != TeamId(5) && g.away != TeamId(5)));
}
