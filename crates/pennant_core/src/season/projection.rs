//! Monte Carlo projection: replay the rest of the season (and the
//! postseason) many times from the current state and count outcomes.
//!
//! Replicas are independent, so they run on the rayon pool. Each replica's
//! seed is derived from the base seed and its index, which keeps the result
//! identical regardless of thread count.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::playoffs::Postseason;
use super::runner::Season;
use crate::dice::game_seed;
use crate::error::Result;
use crate::models::TeamId;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamProjection {
    pub team: TeamId,
    pub playoff_appearances: u32,
    pub championships: u32,
    pub mean_wins: f64,
    pub playoff_probability: f64,
    pub championship_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub replicas: u32,
    pub teams: BTreeMap<TeamId, TeamProjection>,
}

impl Projection {
    /// Teams ordered by championship probability, best first.
    pub fn ranked(&self) -> Vec<&TeamProjection> {
        let mut rows: Vec<&TeamProjection> = self.teams.values().collect();
        rows.sort_by(|a, b| {
            b.championship_probability
                .total_cmp(&a.championship_probability)
                .then_with(|| b.playoff_probability.total_cmp(&a.playoff_probability))
                .then_with(|| a.team.cmp(&b.team))
        });
        rows
    }
}

struct ReplicaOutcome {
    wins: BTreeMap<TeamId, u32>,
    qualifiers: Vec<TeamId>,
    champion: TeamId,
}

fn run_replica(season: &Season, seed: u64) -> Result<ReplicaOutcome> {
    let mut replica = season.clone();
    replica.reseed(seed);
    replica.play_to_end();

    let last_day = replica.last_day();
    let engine = replica.engine().clone();
    let structure = replica.structure().clone();
    let state = replica.state_mut();
    let wins = state.standings.iter().map(|s| (s.team, s.wins())).collect();
    let result =
        Postseason::new(&engine, seed, last_day).run(&structure, &state.standings, &mut state.teams)?;

    Ok(ReplicaOutcome { wins, qualifiers: result.qualifiers().collect(), champion: result.champion })
}

/// Projects `season` forward `replicas` times. The season itself is left
/// untouched.
pub fn project(season: &Season, replicas: u32, base_seed: u64) -> Result<Projection> {
    let outcomes = (0..replicas)
        .into_par_iter()
        .map(|index| run_replica(season, game_seed(base_seed, u32::MAX, index)))
        .collect::<Result<Vec<_>>>()?;

    let mut teams: BTreeMap<TeamId, TeamProjection> = season
        .structure()
        .team_ids()
        .map(|team| (team, TeamProjection { team, ..Default::default() }))
        .collect();
    let mut total_wins: BTreeMap<TeamId, u64> = BTreeMap::new();
    for outcome in &outcomes {
        for (team, wins) in &outcome.wins {
            *total_wins.entry(*team).or_default() += u64::from(*wins);
        }
        for team in &outcome.qualifiers {
            teams
                .entry(*team)
                .or_insert_with(|| TeamProjection { team: *team, ..Default::default() })
                .playoff_appearances += 1;
        }
        teams
            .entry(outcome.champion)
            .or_insert_with(|| TeamProjection { team: outcome.champion, ..Default::default() })
            .championships += 1;
    }

    if replicas > 0 {
        let n = f64::from(replicas);
        for (team, row) in teams.iter_mut() {
            row.mean_wins = total_wins.get(team).copied().unwrap_or(0) as f64 / n;
            row.playoff_probability = f64::from(row.playoff_appearances) / n;
            row.championship_probability = f64::from(row.championships) / n;
        }
    }
    log::info!("Projected {} replicas over {} teams", replicas, teams.len());
    Ok(Projection { replicas, teams })
}
