//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use padel_tournament_engine::store::MemoryStore;
use padel_tournament_engine::{
    complete_match, launch_tournament, record_result, Category, EngineConfig, GameMatch, MatchId,
    Player, Progress, SetScore, Slot, Team, TeamId, Tournament, TournamentFormat,
    TournamentSnapshot,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap()
}

/// Tournament open for registration with one category and `n` seeded teams ("Team 01" = seed 1).
pub fn registered(format: TournamentFormat, n: usize) -> TournamentSnapshot {
    let mut tournament =
        Tournament::new("Test Open", format, start(), start() + Duration::days(2)).unwrap();
    tournament.open_registration().unwrap();
    let category = Category::new(tournament.id, "Open");
    let mut snapshot = TournamentSnapshot::new(tournament);
    for i in 1..=n {
        let a = Player::new(format!("Player {i}a"));
        let b = Player::new(format!("Player {i}b"));
        let team = Team::new(
            snapshot.tournament.id,
            category.id,
            format!("Team {i:02}"),
            [a.id, b.id],
        )
        .unwrap()
        .with_seed(i as u32);
        snapshot.players.push(a);
        snapshot.players.push(b);
        snapshot.teams.push(team);
    }
    snapshot.categories.push(category);
    snapshot
}

pub fn launched(format: TournamentFormat, n: usize) -> TournamentSnapshot {
    launched_with(format, n, &EngineConfig::default())
}

pub fn launched_with(format: TournamentFormat, n: usize, config: &EngineConfig) -> TournamentSnapshot {
    let mut snapshot = registered(format, n);
    launch_tournament(&mut snapshot, config, &mut StdRng::seed_from_u64(7)).unwrap();
    snapshot
}

pub fn seed_of(snapshot: &TournamentSnapshot, team: TeamId) -> u32 {
    snapshot.team(team).unwrap().seed.unwrap_or(u32::MAX)
}

pub fn team_named(snapshot: &TournamentSnapshot, name: &str) -> TeamId {
    snapshot.teams.iter().find(|t| t.name == name).unwrap().id
}

/// The better-seeded side of a match.
pub fn lower_seed(snapshot: &TournamentSnapshot, game: &GameMatch) -> TeamId {
    let (a, b) = game.teams().unwrap();
    if seed_of(snapshot, b) < seed_of(snapshot, a) {
        b
    } else {
        a
    }
}

/// Straight sets for `side`, as many as a best-of-`best_of` needs.
pub fn straight_sets(side: Slot, best_of: u8) -> Vec<SetScore> {
    (1..=best_of / 2 + 1)
        .map(|n| match side {
            Slot::A => SetScore::new(n, 6, 3),
            Slot::B => SetScore::new(n, 3, 6),
        })
        .collect()
}

/// Record a straight-sets win for `winner` and run progression.
pub fn play(
    snapshot: &mut TournamentSnapshot,
    store: &MemoryStore,
    config: &EngineConfig,
    match_id: MatchId,
    winner: TeamId,
) -> Progress {
    let game = snapshot.game(match_id).unwrap();
    let sets = straight_sets(game.slot_of(winner).unwrap(), game.best_of);
    record_result(snapshot, match_id, sets).unwrap();
    complete_match(snapshot, store, match_id, config).unwrap()
}

pub fn next_playable(snapshot: &TournamentSnapshot) -> Option<MatchId> {
    snapshot
        .matches
        .iter()
        .find(|m| m.state.is_open() && m.teams().is_some())
        .map(|m| m.id)
}

/// Play every match until none is playable, picking winners with `pick`.
pub fn play_out(
    snapshot: &mut TournamentSnapshot,
    store: &MemoryStore,
    config: &EngineConfig,
    pick: impl Fn(&TournamentSnapshot, &GameMatch) -> TeamId,
) -> Vec<Progress> {
    let mut steps = Vec::new();
    for _ in 0..1000 {
        let Some(match_id) = next_playable(snapshot) else { break };
        let winner = pick(snapshot, snapshot.game(match_id).unwrap());
        steps.push(play(snapshot, store, config, match_id, winner));
    }
    steps
}
