//! Synthetic leagues for demos, benchmarks and tests.
//!
//! Ratings are drawn from a seeded ChaCha stream and rounded to tenths, the
//! precision printed cards use.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::models::team::{LINEUP_SIZE, ROTATION_SIZE};
use crate::models::{
    Ballpark, Bats, Batter, LineupRole, Pitcher, PitcherRole, Position, Team, TeamId, Throws,
    UnearnedRunsChart,
};
use crate::season::{Schedule, ScheduledGame};
use crate::stats::{Division, League, LeagueStructure};

const CITIES: [&str; 12] = [
    "Harbor", "Summit", "Prairie", "Granite", "Delta", "Canyon", "Lakeside", "Cedar", "Ironton",
    "Bayview", "Pinecrest", "Riverton",
];
const NICKNAMES: [&str; 12] = [
    "Gulls", "Miners", "Comets", "Foxes", "Pilots", "Owls", "Rangers", "Barons", "Herons",
    "Sentinels", "Lumberjacks", "Kings",
];
const LEAGUE_NAMES: [&str; 4] = ["Continental", "Federal", "Atlantic", "Pacific"];
const DIVISION_NAMES: [&str; 5] = ["East", "Central", "West", "North", "South"];
const FIELD_POSITIONS: [Position; LINEUP_SIZE] = [
    Position::CenterField,
    Position::Shortstop,
    Position::RightField,
    Position::FirstBase,
    Position::ThirdBase,
    Position::LeftField,
    Position::DesignatedHitter,
    Position::SecondBase,
    Position::Catcher,
];
const BENCH_SIZE: usize = 4;
const BULLPEN_SIZE: usize = 7;

fn rating(rng: &mut ChaCha8Rng, low: f64, high: f64) -> f64 {
    (rng.gen_range(low..=high) * 10.0).round() / 10.0
}

fn batter(rng: &mut ChaCha8Rng, name: String, position: Option<Position>, role: LineupRole) -> Batter {
    let mut b = Batter::new(name);
    b.role = role;
    b.position = position;
    b.bats = *[Bats::Right, Bats::Right, Bats::Left, Bats::Switch].choose(rng).unwrap_or(&Bats::Right);
    b.batting = rating(rng, 2.0, 7.0);
    b.power = rating(rng, 0.5, 5.0);
    b.eye = rating(rng, 0.5, 4.0);
    b.speed = rating(rng, 0.5, 5.0);
    b.fielding = rating(rng, 0.0, 3.0);
    b.clutch = rating(rng, 0.0, 2.0);
    b.vs_left = rating(rng, -1.5, 1.5);
    b.vs_right = rating(rng, -1.5, 1.5);
    b.injury = rng.gen_range(-3..=3);
    b
}

fn starter(rng: &mut ChaCha8Rng, name: String) -> Pitcher {
    let mut p = Pitcher::new(name, PitcherRole::Starter);
    p.throws = if rng.gen_bool(0.3) { Throws::Left } else { Throws::Right };
    p.start_value = rating(rng, 2.0, 6.5);
    p.endurance = rating(rng, 3.5, 8.0);
    p.rest = 4;
    p.cg_rating = rng.gen_range(625..=660);
    p.sho_rating = rng.gen_range(640..=665);
    p.clutch = rating(rng, 0.0, 1.5);
    p.vs_left = rating(rng, -1.0, 1.0);
    p.vs_right = rating(rng, -1.0, 1.0);
    p
}

fn reliever(rng: &mut ChaCha8Rng, name: String) -> Pitcher {
    let mut p = Pitcher::new(name, PitcherRole::Reliever);
    p.throws = if rng.gen_bool(0.35) { Throws::Left } else { Throws::Right };
    p.relief_value = rating(rng, 1.0, 6.0);
    p.fatigue = f64::from(rng.gen_range(1..=5));
    p.clutch = rating(rng, 0.0, 2.0);
    p.vs_left = rating(rng, -1.0, 1.0);
    p.vs_right = rating(rng, -1.0, 1.0);
    p
}

/// A full roster: nine starters at every position, a four-man bench, a
/// five-man rotation and a seven-man bullpen.
pub fn synthetic_team(id: TeamId, seed: u64) -> Team {
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ (u64::from(id.0) << 32));
    let index = id.0 as usize;
    let name = format!(
        "{} {}",
        CITIES[index % CITIES.len()],
        NICKNAMES[(index / CITIES.len() + index) % NICKNAMES.len()]
    );
    let mut team = Team::new(id, name);

    for (slot, position) in FIELD_POSITIONS.iter().enumerate() {
        let b = batter(&mut rng, format!("Batter {}-{}", id, slot + 1), Some(*position), LineupRole::Starter);
        team.batters.push(b);
    }
    for n in 0..BENCH_SIZE {
        let b = batter(&mut rng, format!("Bench {}-{}", id, n + 1), None, LineupRole::Bench);
        team.batters.push(b);
    }
    for n in 0..ROTATION_SIZE {
        team.pitchers.push(starter(&mut rng, format!("Starter {}-{}", id, n + 1)));
    }
    for n in 0..BULLPEN_SIZE {
        team.pitchers.push(reliever(&mut rng, format!("Reliever {}-{}", id, n + 1)));
    }

    team.ballpark = Ballpark {
        name: format!("{} Field", CITIES[index % CITIES.len()]),
        capacity: rng.gen_range(25_000..=50_000),
        stadium_value: rating(&mut rng, 0.0, 2.0),
        home_field_advantage: rating(&mut rng, 0.0, 1.5),
    };
    team.unearned_runs = UnearnedRunsChart::new((3..=10).map(|sum| (sum, rng.gen_range(0..=2))));
    team
}

/// `leagues` × `divisions` × `teams_per_division` teams, numbered from 1.
pub fn synthetic_league(
    leagues: usize,
    divisions: usize,
    teams_per_division: usize,
    seed: u64,
) -> (LeagueStructure, Vec<Team>) {
    let mut next_id = 1u32;
    let mut teams = Vec::new();
    let mut structure = LeagueStructure::default();
    for l in 0..leagues {
        let mut league = League {
            name: format!("{} League", LEAGUE_NAMES[l % LEAGUE_NAMES.len()]),
            divisions: Vec::new(),
        };
        for d in 0..divisions {
            let mut division =
                Division { name: DIVISION_NAMES[d % DIVISION_NAMES.len()].to_string(), teams: Vec::new() };
            for _ in 0..teams_per_division {
                let id = TeamId(next_id);
                next_id += 1;
                division.teams.push(id);
                teams.push(synthetic_team(id, seed));
            }
            league.divisions.push(division);
        }
        structure.leagues.push(league);
    }
    (structure, teams)
}

/// Circle-method round robin, one round per day from day 1. Every team
/// plays every day (one sits out when the count is odd); home field
/// alternates each time the cycle repeats.
pub fn round_robin_schedule(teams: &[TeamId], days: u32) -> Schedule {
    let mut ring: Vec<Option<TeamId>> = teams.iter().copied().map(Some).collect();
    if ring.len() % 2 == 1 {
        ring.push(None);
    }
    let n = ring.len();
    if n < 2 {
        return Schedule::default();
    }

    let rounds = (n - 1) as u32;
    let mut games = Vec::new();
    for day in 1..=days {
        let round = (day - 1) % rounds;
        let flip = ((day - 1) / rounds) % 2 == 1;
        let mut order = Vec::with_capacity(n);
        order.push(ring[0]);
        for i in 0..n - 1 {
            order.push(ring[1 + (i + round as usize) % (n - 1)]);
        }
        for i in 0..n / 2 {
            if let (Some(a), Some(b)) = (order[i], order[n - 1 - i]) {
                let (home, away) = if (i % 2 == 0) != flip { (a, b) } else { (b, a) };
                games.push(ScheduledGame { day, home, away, time: None });
            }
        }
    }
    Schedule::new(games)
}
