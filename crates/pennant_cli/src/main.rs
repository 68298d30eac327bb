//! pennant - run a dice-resolved baseball season from the command line.
//!
//! A league directory holds `league.json`, one `team_id_<n>.json` per team
//! and the schedule file `league.json` names.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use pennant_core::data::{load_league, write_league, LeagueFile};
use pennant_core::fixtures::{round_robin_schedule, synthetic_league};
use pennant_core::models::{Outs, TeamId};
use pennant_core::save::{SaveManager, SeasonSave};
use pennant_core::season::{project, PlayoffResult, Postseason, Season};
use pennant_core::stats::StandingsSnapshot;
use pennant_core::EngineConfig;

#[derive(Parser)]
#[command(name = "pennant")]
#[command(version, about = "Simulate a baseball league season", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the regular season, saving after every day
    Season {
        #[command(flatten)]
        source: SeasonSource,

        /// Stop after this day instead of the end of the schedule
        #[arg(long)]
        through: Option<u32>,

        /// Write the final standings here as JSON
        #[arg(long)]
        standings: Option<PathBuf>,
    },

    /// Finish the regular season, then play the postseason
    Playoffs {
        #[command(flatten)]
        source: SeasonSource,
    },

    /// Replay the rest of the season many times and report odds
    Project {
        #[command(flatten)]
        source: SeasonSource,

        #[arg(long, default_value_t = 200)]
        replicas: u32,

        #[arg(long, default_value_t = 1)]
        projection_seed: u64,
    },

    /// Write a synthetic league directory and play it
    Demo {
        /// Where to write the league
        #[arg(long)]
        out: PathBuf,

        #[arg(long, default_value_t = 2)]
        leagues: usize,

        #[arg(long, default_value_t = 3)]
        divisions: usize,

        #[arg(long, default_value_t = 4)]
        teams_per_division: usize,

        #[arg(long, default_value_t = 162)]
        days: u32,

        #[arg(long, default_value_t = 2024)]
        seed: u64,
    },
}

#[derive(clap::Args)]
struct SeasonSource {
    /// League directory
    #[arg(long)]
    league: PathBuf,

    /// Override the seed from league.json
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for the per-day auto save
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Continue from the auto save in --save-dir
    #[arg(long, default_value = "false")]
    resume: bool,
}

struct LoadedSeason {
    name: String,
    season: Season,
    saves: Option<SaveManager>,
}

fn open_season(source: &SeasonSource) -> Result<LoadedSeason> {
    let data = load_league(&source.league)
        .with_context(|| format!("loading league from {}", source.league.display()))?;
    let seed = source.seed.or(data.file.seed).unwrap_or_default();
    let engine = data.file.engine();
    let structure = data.file.structure();
    let saves = source.save_dir.as_ref().map(SaveManager::new);

    let season = match (&saves, source.resume) {
        (Some(manager), true) => {
            let save = manager.load_auto_save().context("reading auto save")?;
            if save.league != data.file.name {
                bail!("auto save belongs to {}, not {}", save.league, data.file.name);
            }
            log::info!("Resuming {} at day {}", save.league, save.next_day());
            Season::resume(engine, structure, data.schedule, save.season)
        }
        (None, true) => bail!("--resume needs --save-dir"),
        _ => Season::new(engine, structure, data.schedule, data.teams, seed)?,
    };
    Ok(LoadedSeason { name: data.file.name, season, saves })
}

fn play_regular_season(loaded: &mut LoadedSeason, through: Option<u32>) -> Result<()> {
    let name = loaded.name.clone();
    let saves = loaded.saves.as_ref();
    let reports = loaded.season.play_through(through, |report, state| {
        log::info!(
            "Day {}: {} games, {} skipped",
            report.day,
            report.games.len(),
            report.skipped.len()
        );
        if let Some(manager) = saves {
            manager.auto_save(&SeasonSave::new(name.clone(), state.clone()))?;
        }
        Ok(())
    })?;
    log::info!("Played {} days", reports.len());
    Ok(())
}

fn print_standings(snapshot: &StandingsSnapshot, team_name: impl Fn(TeamId) -> String) {
    println!("Standings through day {}", snapshot.day);
    for division in &snapshot.divisions {
        println!();
        println!("{} {}", division.league, division.division);
        println!(
            "{:<24} {:>4} {:>4} {:>6} {:>5} {:>5} {:>5} {:>7} {:>5}",
            "Team", "W", "L", "Pct", "GB", "RS", "RA", "Pyth", "Strk"
        );
        for row in &division.rows {
            let gb = if row.games_behind == 0.0 { "-".to_string() } else { format!("{:.1}", row.games_behind) };
            println!(
                "{:<24} {:>4} {:>4} {:>6.3} {:>5} {:>5} {:>5} {:>3}-{:<3} {:>5}",
                team_name(row.team),
                row.wins,
                row.losses,
                row.win_pct,
                gb,
                row.runs_scored,
                row.runs_allowed,
                row.pythagorean_wins,
                row.pythagorean_losses,
                row.streak
            );
        }
    }
}

fn print_era_leaders(season: &Season, count: usize) {
    let state = season.state();
    let min_outs = Outs(3 * season.state().next_day.saturating_sub(1));
    let leaders = state.pitching.era_leaders(min_outs);
    if leaders.is_empty() {
        return;
    }
    println!();
    println!("ERA leaders");
    for (team, line) in leaders.into_iter().take(count) {
        println!(
            "{:<24} {:<20} {:>5.2} {:>3}-{:<3} {:>3} SV",
            line.name,
            team_label(season, team),
            line.era(),
            line.wins,
            line.losses,
            line.saves
        );
    }
}

fn print_playoffs(season: &Season, result: &PlayoffResult) {
    for series in &result.series {
        println!(
            "{:?}: {} over {} ({}-{})",
            series.round,
            team_label(season, series.winner),
            team_label(season, series.loser()),
            series.higher_seed_wins.max(series.lower_seed_wins),
            series.higher_seed_wins.min(series.lower_seed_wins)
        );
    }
    println!("Champion: {}", team_label(season, result.champion));
}

fn team_label(season: &Season, team: TeamId) -> String {
    season
        .state()
        .teams
        .get(&team)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| format!("Team {}", team))
}

fn run_postseason(loaded: &mut LoadedSeason) -> Result<PlayoffResult> {
    let season = &mut loaded.season;
    let engine = season.engine().clone();
    let structure = season.structure().clone();
    let last_day = season.last_day();
    let seed = season.state().seed;
    let state = season.state_mut();
    let result = Postseason::new(&engine, seed, last_day).run(&structure, &state.standings, &mut state.teams)?;
    Ok(result)
}

fn write_demo_league(out: &Path, leagues: usize, divisions: usize, per_division: usize, days: u32, seed: u64) -> Result<()> {
    let (structure, teams) = synthetic_league(leagues, divisions, per_division, seed);
    let ids: Vec<TeamId> = structure.team_ids().collect();
    let schedule = round_robin_schedule(&ids, days);
    let file = LeagueFile {
        name: "Demo League".into(),
        leagues: structure.leagues,
        schedule: "schedule.json".into(),
        seed: Some(seed),
        config: Some(EngineConfig::default()),
        charts: None,
    };
    write_league(out, &file, &teams, &schedule)
        .with_context(|| format!("writing demo league to {}", out.display()))?;
    log::info!("Wrote {} teams and {} games to {}", teams.len(), schedule.len(), out.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Season { source, through, standings } => {
            let mut loaded = open_season(&source)?;
            play_regular_season(&mut loaded, through)?;
            let snapshot = loaded.season.snapshot();
            print_standings(&snapshot, |team| team_label(&loaded.season, team));
            print_era_leaders(&loaded.season, 10);
            if let Some(path) = standings {
                std::fs::write(&path, serde_json::to_string_pretty(&snapshot)?)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
        }
        Commands::Playoffs { source } => {
            let mut loaded = open_season(&source)?;
            play_regular_season(&mut loaded, None)?;
            let result = run_postseason(&mut loaded)?;
            print_playoffs(&loaded.season, &result);
        }
        Commands::Project { source, replicas, projection_seed } => {
            let loaded = open_season(&source)?;
            let projection = project(&loaded.season, replicas, projection_seed)?;
            println!("{:<24} {:>8} {:>9} {:>9}", "Team", "Wins", "Playoffs", "Champion");
            for row in projection.ranked() {
                println!(
                    "{:<24} {:>8.1} {:>8.1}% {:>8.1}%",
                    team_label(&loaded.season, row.team),
                    row.mean_wins,
                    row.playoff_probability * 100.0,
                    row.championship_probability * 100.0
                );
            }
        }
        Commands::Demo { out, leagues, divisions, teams_per_division, days, seed } => {
            write_demo_league(&out, leagues, divisions, teams_per_division, days, seed)?;
            let source = SeasonSource { league: out, seed: None, save_dir: None, resume: false };
            let mut loaded = open_season(&source)?;
            play_regular_season(&mut loaded, None)?;
            print_standings(&loaded.season.snapshot(), |team| team_label(&loaded.season, team));
            if leagues == 2 && divisions >= 3 && divisions * teams_per_division > 3 {
                let result = run_postseason(&mut loaded)?;
                print_playoffs(&loaded.season, &result);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source(dir: &Path, saves: Option<&Path>, resume: bool) -> SeasonSource {
        SeasonSource {
            league: dir.to_path_buf(),
            seed: None,
            save_dir: saves.map(Path::to_path_buf),
            resume,
        }
    }

    #[test]
    fn test_demo_league_plays_and_resumes() {
        let league = TempDir::new().unwrap();
        let saves = TempDir::new().unwrap();
        write_demo_league(league.path(), 2, 3, 2, 8, 5).unwrap();

        let mut first = open_season(&source(league.path(), Some(saves.path()), false)).unwrap();
        play_regular_season(&mut first, Some(4)).unwrap();
        assert_eq!(first.season.state().next_day, 5);

        let mut resumed = open_season(&source(league.path(), Some(saves.path()), true)).unwrap();
        assert_eq!(resumed.season.state(), first.season.state());
        play_regular_season(&mut resumed, None).unwrap();
        assert!(resumed.season.is_complete());

        let result = run_postseason(&mut resumed).unwrap();
        assert_eq!(result.series.len(), 7);
    }

    #[test]
    fn test_resume_requires_save_dir() {
        let league = TempDir::new().unwrap();
        write_demo_league(league.path(), 1, 1, 2, 2, 5).unwrap();
        assert!(open_season(&source(league.path(), None, true)).is_err());
    }

    #[test]
    fn test_cli_parses_season_command() {
        let cli = Cli::try_parse_from(["pennant", "season", "--league", "leagues/demo", "--through", "30"]).unwrap();
        match cli.command {
            Commands::Season { source, through, .. } => {
                assert_eq!(source.league, PathBuf::from("leagues/demo"));
                assert_eq!(through, Some(30));
                assert!(!source.resume);
            }
            _ => panic!("expected season command"),
        }
    }
}
