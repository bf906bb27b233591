//! Integration tests for single-elimination generation and progression.

mod common;

use common::{launched, lower_seed, play, play_out, registered, team_named};
use padel_tournament_engine::error::EngineError;
use padel_tournament_engine::store::MemoryStore;
use padel_tournament_engine::{
    generate_single_elimination, launch_tournament, record_result, EngineConfig, Entrant,
    GameMatch, MatchMeta, MatchState, SetScore, Stage, Team, TournamentFormat, TournamentStatus,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

fn find(matches: &[GameMatch], stage: Stage, number: u32) -> &GameMatch {
    matches
        .iter()
        .find(|m| m.stage == stage && m.match_number == number)
        .unwrap()
}

#[test]
fn eight_teams_make_seven_matches() {
    let snapshot = launched(TournamentFormat::SingleElim, 8);
    let matches = &snapshot.matches;
    assert_eq!(matches.len(), 7);
    assert_eq!(matches.iter().filter(|m| m.stage == Stage::Winners(3)).count(), 4);
    assert_eq!(matches.iter().filter(|m| m.stage == Stage::Winners(2)).count(), 2);
    assert_eq!(matches.iter().filter(|m| m.stage == Stage::Winners(1)).count(), 1);

    for game in matches {
        let entry = game.stage == Stage::Winners(3);
        assert_eq!(game.teams().is_some(), entry);
        assert_eq!(game.best_of, 3);
    }
    let first = find(matches, Stage::Winners(3), 1);
    assert_eq!(first.team_a, Entrant::Team(team_named(&snapshot, "Team 01")));
    assert_eq!(first.team_b, Entrant::Team(team_named(&snapshot, "Team 08")));
}

#[test]
fn round_names_count_down_to_final() {
    let snapshot = launched(TournamentFormat::SingleElim, 8);
    let name = |stage| match &find(&snapshot.matches, stage, 1).meta {
        MatchMeta::Bracket { round_name } => round_name.clone(),
        other => panic!("unexpected meta {other:?}"),
    };
    assert_eq!(name(Stage::Winners(3)), "Quarter-final");
    assert_eq!(name(Stage::Winners(2)), "Semi-final");
    assert_eq!(name(Stage::Winners(1)), "Final");
}

#[test]
fn byes_advance_top_seeds_immediately() {
    let snapshot = launched(TournamentFormat::SingleElim, 5);
    let matches = &snapshot.matches;
    assert_eq!(matches.len(), 7);
    assert_eq!(
        matches.iter().filter(|m| m.state == MatchState::Walkover).count(),
        3
    );

    let semi_1 = find(matches, Stage::Winners(2), 1);
    assert_eq!(semi_1.team_a, Entrant::Team(team_named(&snapshot, "Team 01")));
    assert_eq!(semi_1.team_b, Entrant::Tbd);

    // Seeds 2 and 3 both had byes and already meet.
    let semi_2 = find(matches, Stage::Winners(2), 2);
    assert_eq!(semi_2.team_a, Entrant::Team(team_named(&snapshot, "Team 03")));
    assert_eq!(semi_2.team_b, Entrant::Team(team_named(&snapshot, "Team 02")));
    assert_eq!(semi_2.state, MatchState::Pending);
}

#[test]
fn two_teams_play_only_the_final() {
    let snapshot = launched(TournamentFormat::SingleElim, 2);
    assert_eq!(snapshot.matches.len(), 1);
    assert_eq!(snapshot.matches[0].stage, Stage::Winners(1));
}

#[test]
fn one_team_is_rejected() {
    let team = Team::new(Uuid::new_v4(), Uuid::new_v4(), "Solo", [Uuid::new_v4(), Uuid::new_v4()])
        .unwrap();
    let result = generate_single_elimination(
        team.tournament_id,
        team.category_id,
        &[&team],
        &EngineConfig::default().formats,
        &mut StdRng::seed_from_u64(1),
    );
    assert!(matches!(
        result,
        Err(EngineError::InvalidTeamCount { count: 1, .. })
    ));
}

#[test]
fn launch_respects_team_bounds() {
    let mut snapshot = registered(TournamentFormat::SingleElim, 3);
    snapshot.tournament = snapshot.tournament.clone().with_team_bounds(4, 16);
    let result = launch_tournament(&mut snapshot, &EngineConfig::default(), &mut StdRng::seed_from_u64(1));
    assert!(matches!(
        result,
        Err(EngineError::InvalidTeamCount { count: 3, .. })
    ));
    assert_eq!(snapshot.tournament.status, TournamentStatus::Registration);
    assert!(snapshot.matches.is_empty());
}

#[test]
fn winners_fill_slots_by_match_parity() {
    let mut snapshot = launched(TournamentFormat::SingleElim, 8);
    let store = MemoryStore::new();
    let config = EngineConfig::default();

    let quarter_3 = find(&snapshot.matches, Stage::Winners(3), 3).id;
    let winner = team_named(&snapshot, "Team 03");
    let progress = play(&mut snapshot, &store, &config, quarter_3, winner);
    assert_eq!(progress.status, None);

    let semi_2 = find(&snapshot.matches, Stage::Winners(2), 2);
    assert_eq!(semi_2.team_a, Entrant::Team(winner));
    assert_eq!(semi_2.team_b, Entrant::Tbd);

    let quarter_4 = find(&snapshot.matches, Stage::Winners(3), 4).id;
    let winner_4 = team_named(&snapshot, "Team 02");
    play(&mut snapshot, &store, &config, quarter_4, winner_4);
    let semi_2 = find(&snapshot.matches, Stage::Winners(2), 2);
    assert_eq!(semi_2.team_b, Entrant::Team(winner_4));
}

#[test]
fn final_result_finishes_tournament() {
    let mut snapshot = launched(TournamentFormat::SingleElim, 8);
    let store = MemoryStore::new();
    let config = EngineConfig::default();

    let steps = play_out(&mut snapshot, &store, &config, lower_seed);
    assert_eq!(steps.len(), 7);
    assert!(steps.last().unwrap().finished());
    assert!(steps[..6].iter().all(|p| !p.finished()));
    assert_eq!(snapshot.tournament.status, TournamentStatus::Finished);

    let final_match = find(&snapshot.matches, Stage::Winners(1), 1);
    assert_eq!(final_match.winner, Some(team_named(&snapshot, "Team 01")));
}

#[test]
fn final_needs_both_semis() {
    let mut snapshot = launched(TournamentFormat::SingleElim, 4);
    let final_id = find(&snapshot.matches, Stage::Winners(1), 1).id;
    let result = record_result(&mut snapshot, final_id, vec![SetScore::new(1, 6, 0), SetScore::new(2, 6, 0)]);
    assert!(matches!(result, Err(EngineError::MatchNotReady { .. })));
}
