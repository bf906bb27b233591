//! Integration tests for group play: round-robin generation, group draws and playoff creation.

mod common;

use common::{launched, launched_with, lower_seed, play_out, registered, team_named};
use padel_tournament_engine::config::EngineConfig;
use padel_tournament_engine::logic::circle_pairings;
use padel_tournament_engine::store::MemoryStore;
use padel_tournament_engine::{
    generate_groups, generate_round_robin, Entrant, MatchMeta, Stage, Team, TeamId,
    TournamentFormat, TournamentStatus,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};

fn pair(a: TeamId, b: TeamId) -> (TeamId, TeamId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[test]
fn four_teams_play_three_rounds() {
    let snapshot = registered(TournamentFormat::RoundRobin, 4);
    let teams: Vec<&Team> = snapshot.teams.iter().collect();
    let draw = generate_round_robin(
        snapshot.tournament.id,
        snapshot.categories[0].id,
        &teams,
        &EngineConfig::default().formats,
    )
    .unwrap();

    assert_eq!(draw.groups.len(), 1);
    assert_eq!(draw.groups[0].name, "Group A");
    assert_eq!(draw.matches.len(), 6);
    for round in 1..=3 {
        assert_eq!(draw.matches.iter().filter(|m| m.stage == Stage::Pool(round)).count(), 2);
    }
    let pairs: HashSet<_> = draw
        .matches
        .iter()
        .map(|m| {
            let (a, b) = m.teams().unwrap();
            pair(a, b)
        })
        .collect();
    assert_eq!(pairs.len(), 6);
    assert!(draw.matches.iter().all(|m| matches!(
        &m.meta,
        MatchMeta::RoundRobin { group_name } if group_name == "Group A"
    )));

    assert_eq!(draw.standings.len(), 4);
    assert!(draw.standings.iter().all(|s| s.played == 0 && s.wins == 0));
}

#[test]
fn odd_count_sits_one_team_out_per_round() {
    let snapshot = launched(TournamentFormat::RoundRobin, 5);
    assert_eq!(snapshot.matches.len(), 10);
    let mut rests: HashMap<TeamId, u32> = HashMap::new();
    for round in 1..=5 {
        let playing: HashSet<TeamId> = snapshot
            .matches
            .iter()
            .filter(|m| m.stage == Stage::Pool(round))
            .flat_map(|m| [m.team_a.team().unwrap(), m.team_b.team().unwrap()])
            .collect();
        assert_eq!(playing.len(), 4);
        for team in &snapshot.teams {
            if !playing.contains(&team.id) {
                *rests.entry(team.id).or_default() += 1;
            }
        }
    }
    assert_eq!(rests.len(), 5);
    assert!(rests.values().all(|&r| r == 1));
}

#[test]
fn groups_are_dealt_snake_wise() {
    let snapshot = registered(TournamentFormat::GroupsPlayoffs, 8);
    let teams: Vec<&Team> = snapshot.teams.iter().collect();
    let draw = generate_groups(
        snapshot.tournament.id,
        snapshot.categories[0].id,
        &teams,
        &EngineConfig::default().formats,
        &mut StdRng::seed_from_u64(5),
    )
    .unwrap();

    assert_eq!(draw.groups.len(), 2);
    let names = |index: usize| -> HashSet<String> {
        draw.groups[index]
            .team_ids
            .iter()
            .map(|id| snapshot.team_name(*id))
            .collect()
    };
    let expected_a: HashSet<String> = ["Team 01", "Team 04", "Team 05", "Team 08"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(names(0), expected_a);
    assert_eq!(draw.groups[1].name, "Group B");
    assert_eq!(draw.matches.len(), 12);
    assert!(draw.matches.iter().all(|m| m.group_id.is_some()));
}

#[test]
fn uneven_groups_stay_balanced() {
    let snapshot = registered(TournamentFormat::GroupsPlayoffs, 10);
    let teams: Vec<&Team> = snapshot.teams.iter().collect();
    let draw = generate_groups(
        snapshot.tournament.id,
        snapshot.categories[0].id,
        &teams,
        &EngineConfig::default().formats,
        &mut StdRng::seed_from_u64(5),
    )
    .unwrap();
    assert_eq!(draw.groups.len(), 3);
    let sizes: Vec<usize> = draw.groups.iter().map(|g| g.team_ids.len()).collect();
    assert_eq!(sizes.iter().sum::<usize>(), 10);
    assert!(sizes.iter().all(|&s| s == 3 || s == 4));
}

#[test]
fn round_robin_finishes_with_standings() {
    let mut snapshot = launched(TournamentFormat::RoundRobin, 4);
    let store = MemoryStore::new();
    let config = EngineConfig::default();

    let steps = play_out(&mut snapshot, &store, &config, lower_seed);
    assert_eq!(steps.len(), 6);
    assert!(steps.last().unwrap().finished());
    assert_eq!(snapshot.tournament.status, TournamentStatus::Finished);

    let mut table = steps.last().unwrap().standings.clone();
    table.sort_by_key(|s| s.position);
    let order: Vec<&str> = table.iter().map(|s| s.team_name.as_str()).collect();
    assert_eq!(order, ["Team 01", "Team 02", "Team 03", "Team 04"]);
    assert_eq!(table[0].wins, 3);
    assert_eq!(table[3].losses, 3);
}

#[test]
fn completed_groups_spawn_playoffs() {
    let mut snapshot = launched(TournamentFormat::GroupsPlayoffs, 8);
    let store = MemoryStore::new();
    let config = EngineConfig::default();
    let group_of: HashMap<TeamId, _> = snapshot
        .groups
        .iter()
        .flat_map(|g| g.team_ids.iter().map(move |t| (*t, g.id)))
        .collect();

    let mut created = Vec::new();
    for _ in 0..12 {
        let id = common::next_playable(&snapshot).unwrap();
        let game = snapshot.game(id).unwrap().clone();
        assert!(matches!(game.stage, Stage::Pool(_)));
        let winner = lower_seed(&snapshot, &game);
        let progress = common::play(&mut snapshot, &store, &config, id, winner);
        created.extend(progress.created);
    }

    assert_eq!(created.len(), 3);
    let semis: Vec<_> = created.iter().filter(|m| m.stage == Stage::Winners(2)).collect();
    assert_eq!(semis.len(), 2);
    for semi in &semis {
        let (a, b) = semi.teams().unwrap();
        assert_ne!(group_of[&a], group_of[&b]);
    }
    assert_eq!(semis[0].team_a, Entrant::Team(team_named(&snapshot, "Team 01")));

    play_out(&mut snapshot, &store, &config, lower_seed);
    assert_eq!(snapshot.tournament.status, TournamentStatus::Finished);
    let final_match = snapshot
        .matches
        .iter()
        .find(|m| m.stage == Stage::Winners(1))
        .unwrap();
    assert_eq!(final_match.winner, Some(team_named(&snapshot, "Team 01")));
}

#[test]
fn single_qualifier_per_group_uses_smaller_bracket() {
    let mut config = EngineConfig::default();
    config.formats.playoff_qualifiers_per_group = 1;
    let mut snapshot = launched_with(TournamentFormat::GroupsPlayoffs, 8, &config);
    let store = MemoryStore::new();

    play_out(&mut snapshot, &store, &config, lower_seed);
    let playoff: Vec<_> = snapshot
        .matches
        .iter()
        .filter(|m| matches!(m.stage, Stage::Winners(_)))
        .collect();
    assert_eq!(playoff.len(), 1);
    assert_eq!(snapshot.tournament.status, TournamentStatus::Finished);
}

proptest! {
    #[test]
    fn every_pair_meets_exactly_once(n in 2usize..=12) {
        let mut seen: HashMap<(usize, usize), u32> = HashMap::new();
        let mut per_round_ok = true;
        for round in circle_pairings(n) {
            let mut in_round = HashSet::new();
            for (a, b) in round {
                per_round_ok &= in_round.insert(a) && in_round.insert(b);
                *seen.entry((a.min(b), a.max(b))).or_default() += 1;
            }
        }
        prop_assert!(per_round_ok);
        prop_assert_eq!(seen.len(), n * (n - 1) / 2);
        prop_assert!(seen.values().all(|&c| c == 1));
    }
}
