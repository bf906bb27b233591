//! Demo: import a roster, run a whole tournament with random results and print the outcome.
//! Run with: cargo run --bin simulate -- roster.csv
//! Env: FORMAT (single_elim, double_elim, round_robin, americano, mexicano, groups_playoffs),
//! COURTS (number of courts), CONFIG (optional JSON engine config).

use chrono::{Duration, Utc};
use padel_tournament_engine::import::read_teams_csv;
use padel_tournament_engine::store::{load_snapshot, TeamStore, TournamentStore};
use padel_tournament_engine::{
    Category, Court, EngineConfig, MemoryStore, RankingScope, SetScore, Tournament,
    TournamentFormat, TournamentService, TournamentStatus,
};
use rand::Rng;
use std::error::Error;
use std::fs::File;
use std::sync::Arc;

const MAX_ROUNDS: usize = 1000;

fn default_format() -> TournamentFormat {
    TournamentFormat::SingleElim
}

fn default_courts() -> usize {
    4
}

fn random_sets<R: Rng>(best_of: u8, rng: &mut R) -> Vec<SetScore> {
    let needed = best_of / 2 + 1;
    let (mut won_a, mut won_b) = (0, 0);
    let mut sets = Vec::new();
    while won_a < needed && won_b < needed {
        let number = (sets.len() + 1) as u8;
        let other = rng.gen_range(0..=4);
        if rng.gen_bool(0.5) {
            won_a += 1;
            sets.push(SetScore::new(number, 6, other));
        } else {
            won_b += 1;
            sets.push(SetScore::new(number, other, 6));
        }
    }
    sets
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let path = std::env::args().nth(1).ok_or("usage: simulate <roster.csv>")?;
    let format = std::env::var("FORMAT")
        .ok()
        .and_then(|f| serde_json::from_value(serde_json::Value::String(f)).ok())
        .unwrap_or_else(default_format);
    let court_count: usize = std::env::var("COURTS")
        .ok()
        .and_then(|c| c.parse().ok())
        .unwrap_or_else(default_courts);
    let config = match std::env::var("CONFIG") {
        Ok(file) => EngineConfig::from_json_file(file)?,
        Err(_) => EngineConfig::from_env(),
    };

    let store = Arc::new(MemoryStore::new());
    let start = Utc::now();
    let tournament = Tournament::new("Simulated Open", format, start, start + Duration::days(7))?;
    let tournament_id = tournament.id;
    let category = Category::new(tournament_id, "Open");
    let category_id = category.id;
    let (players, teams) = read_teams_csv(File::open(&path)?, tournament_id, category_id)?;
    store.save_tournament(tournament)?;
    store.save_category(category)?;
    store.save_players(players)?;
    store.save_teams(teams)?;

    let service = TournamentService::new(Arc::clone(&store), config);
    let courts: Vec<Court> = (1..=court_count).map(|i| Court::new(format!("Court {i}"))).collect();
    service.open_registration(tournament_id).await?;
    let launch = service.launch(tournament_id).await?;
    log::info!("Launched {:?} with {} matches", format, launch.matches.len());

    let mut rng = rand::thread_rng();
    for _ in 0..MAX_ROUNDS {
        if store.tournament(tournament_id)?.status == TournamentStatus::Finished {
            break;
        }
        service.schedule(tournament_id, &courts).await?;
        let snapshot = load_snapshot(&*store, tournament_id)?;
        let ready: Vec<_> = snapshot
            .matches
            .iter()
            .filter(|m| m.state.is_open() && m.teams().is_some())
            .map(|m| (m.id, m.best_of))
            .collect();
        if ready.is_empty() {
            log::warn!("No playable matches left");
            break;
        }
        for (match_id, best_of) in ready {
            let sets = random_sets(best_of, &mut rng);
            service.record_result(tournament_id, match_id, sets).await?;
        }
    }

    let snapshot = load_snapshot(&*store, tournament_id)?;
    let report = serde_json::json!({
        "tournament": snapshot.tournament,
        "matches": snapshot.matches,
        "standings": snapshot.standings,
        "player_standings": service.player_standings(tournament_id, category_id).await?,
        "leaderboard": service.leaderboard(RankingScope::Tournament, Some(tournament_id), Some(category_id))?,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
