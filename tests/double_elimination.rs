//! Integration tests for double elimination: bracket topology, byes and the grand final reset.

mod common;

use common::{launched, lower_seed, play_out, team_named};
use padel_tournament_engine::logic::bracket::BracketLayout;
use padel_tournament_engine::store::MemoryStore;
use padel_tournament_engine::{
    EngineConfig, Entrant, GameMatch, MatchState, Slot, Stage, TournamentFormat, TournamentStatus,
};
use std::collections::HashMap;

fn find(matches: &[GameMatch], stage: Stage, number: u32) -> &GameMatch {
    matches
        .iter()
        .find(|m| m.stage == stage && m.match_number == number)
        .unwrap()
}

/// Every slot that is not an entry slot must be fed by exactly one match outcome.
fn assert_topology(size: usize) {
    let layout = BracketLayout::double(size);
    let k = layout.winners_rounds;
    assert_eq!(layout.losers_rounds(), 2 * (k - 1), "size {size}");

    let mut feeds: HashMap<(Stage, u32, Slot), u32> = HashMap::new();
    for stage in layout.stages() {
        for number in 1..=layout.matches_in(stage) {
            for feed in [layout.winner_target(stage, number), layout.loser_target(stage, number)]
                .into_iter()
                .flatten()
            {
                assert!(
                    feed.match_number >= 1 && feed.match_number <= layout.matches_in(feed.stage),
                    "size {size}: {stage:?} #{number} feeds missing {:?} #{}",
                    feed.stage,
                    feed.match_number
                );
                *feeds.entry((feed.stage, feed.match_number, feed.slot)).or_default() += 1;
            }
        }
    }

    for stage in layout.stages() {
        if stage == Stage::Winners(k) || stage == Stage::GrandFinal(2) {
            continue;
        }
        for number in 1..=layout.matches_in(stage) {
            for slot in [Slot::A, Slot::B] {
                assert_eq!(
                    feeds.get(&(stage, number, slot)).copied().unwrap_or(0),
                    1,
                    "size {size}: {stage:?} #{number} slot {slot:?}"
                );
            }
        }
    }
}

#[test]
fn topology_four() {
    assert_topology(4);
}

#[test]
fn topology_eight() {
    assert_topology(8);
}

#[test]
fn topology_sixteen() {
    assert_topology(16);
}

#[test]
fn match_counts_per_size() {
    for (teams, losers_matches) in [(4, 2), (8, 6), (16, 14)] {
        let snapshot = launched(TournamentFormat::DoubleElim, teams);
        let count = |f: fn(&Stage) -> bool| snapshot.matches.iter().filter(|m| f(&m.stage)).count();
        assert_eq!(count(|s| matches!(s, Stage::Winners(_))), teams - 1);
        assert_eq!(count(|s| matches!(s, Stage::Losers(_))), losers_matches);
        assert_eq!(count(|s| matches!(s, Stage::GrandFinal(_))), 2);
    }
}

#[test]
fn grand_finals_use_longer_format() {
    let snapshot = launched(TournamentFormat::DoubleElim, 8);
    assert_eq!(find(&snapshot.matches, Stage::GrandFinal(1), 1).best_of, 5);
    assert_eq!(find(&snapshot.matches, Stage::Winners(3), 1).best_of, 3);
    assert_eq!(find(&snapshot.matches, Stage::GrandFinal(1), 1).round(), -1);
    assert_eq!(find(&snapshot.matches, Stage::Losers(4), 1).round(), 1004);
}

#[test]
fn unbeaten_champion_skips_reset() {
    let mut snapshot = launched(TournamentFormat::DoubleElim, 4);
    let store = MemoryStore::new();
    let config = EngineConfig::default();

    let steps = play_out(&mut snapshot, &store, &config, lower_seed);
    // 2 + 1 winners, 2 losers, 1 grand final.
    assert_eq!(steps.len(), 6);
    assert!(steps.last().unwrap().finished());
    assert_eq!(snapshot.tournament.status, TournamentStatus::Finished);

    let grand_final = find(&snapshot.matches, Stage::GrandFinal(1), 1);
    assert_eq!(grand_final.winner, Some(team_named(&snapshot, "Team 01")));
    assert_eq!(grand_final.team_b, Entrant::Team(team_named(&snapshot, "Team 02")));
    let reset = find(&snapshot.matches, Stage::GrandFinal(2), 1);
    assert_eq!(reset.state, MatchState::Cancelled);
    assert_eq!(reset.teams(), None);
}

#[test]
fn losers_bracket_champion_forces_reset() {
    let mut snapshot = launched(TournamentFormat::DoubleElim, 4);
    let store = MemoryStore::new();
    let config = EngineConfig::default();

    let losers_side_wins_first_final = |s: &_, game: &GameMatch| {
        if game.stage == Stage::GrandFinal(1) {
            game.team_b.team().unwrap()
        } else {
            lower_seed(s, game)
        }
    };
    let steps = play_out(&mut snapshot, &store, &config, losers_side_wins_first_final);
    assert_eq!(steps.len(), 7);
    assert_eq!(snapshot.tournament.status, TournamentStatus::Finished);

    let first = find(&snapshot.matches, Stage::GrandFinal(1), 1);
    let reset = find(&snapshot.matches, Stage::GrandFinal(2), 1);
    assert_eq!(reset.team_a, first.team_a);
    assert_eq!(reset.team_b, first.team_b);
    assert!(reset.state.is_decided());
}

#[test]
fn winners_losers_drop_into_losers_bracket() {
    let mut snapshot = launched(TournamentFormat::DoubleElim, 4);
    let store = MemoryStore::new();
    let config = EngineConfig::default();

    // Both semi-finals: seeds 1 and 2 win.
    for number in 1..=2 {
        let game = find(&snapshot.matches, Stage::Winners(2), number).clone();
        let winner = lower_seed(&snapshot, &game);
        common::play(&mut snapshot, &store, &config, game.id, winner);
    }
    let first_losers = find(&snapshot.matches, Stage::Losers(2), 1);
    assert_eq!(first_losers.team_a, Entrant::Team(team_named(&snapshot, "Team 04")));
    assert_eq!(first_losers.team_b, Entrant::Team(team_named(&snapshot, "Team 03")));

    let winners_final = find(&snapshot.matches, Stage::Winners(1), 1).clone();
    let team_01 = team_named(&snapshot, "Team 01");
    common::play(&mut snapshot, &store, &config, winners_final.id, team_01);
    let losers_final = find(&snapshot.matches, Stage::Losers(1), 1);
    assert_eq!(losers_final.team_b, Entrant::Team(team_named(&snapshot, "Team 02")));
    let grand_final = find(&snapshot.matches, Stage::GrandFinal(1), 1);
    assert_eq!(grand_final.team_a, Entrant::Team(team_named(&snapshot, "Team 01")));
}

#[test]
fn three_teams_resolve_losers_bye() {
    let mut snapshot = launched(TournamentFormat::DoubleElim, 3);
    let store = MemoryStore::new();
    let config = EngineConfig::default();

    play_out(&mut snapshot, &store, &config, lower_seed);
    assert_eq!(snapshot.tournament.status, TournamentStatus::Finished);
    assert!(snapshot
        .matches
        .iter()
        .any(|m| matches!(m.stage, Stage::Losers(_)) && m.state == MatchState::Walkover));
    assert_eq!(
        find(&snapshot.matches, Stage::GrandFinal(1), 1).winner,
        Some(team_named(&snapshot, "Team 01"))
    );
}
