//! Integration tests for the CSV roster import.

use padel_tournament_engine::error::{EngineError, ImportError};
use padel_tournament_engine::import::read_teams_csv;
use padel_tournament_engine::{Player, Team};
use uuid::Uuid;

fn import(csv: &str) -> Result<(Vec<Player>, Vec<Team>), ImportError> {
    read_teams_csv(csv.as_bytes(), Uuid::new_v4(), Uuid::new_v4())
}

#[test]
fn rows_become_teams_and_shared_players() {
    let csv = "name,player_1,player_2,seed\n\
               Smash Bros, Ana , Bea,1\n\
               Net Ninjas,Carla,Dora,\n\
               Lob Stars,Ana,Eva,3\n";
    let (players, teams) = import(csv).unwrap();

    assert_eq!(players.len(), 5);
    assert_eq!(teams.len(), 3);
    let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Ana", "Bea", "Carla", "Dora", "Eva"]);

    assert_eq!(teams[0].name, "Smash Bros");
    assert_eq!(teams[0].seed, Some(1));
    assert_eq!(teams[1].seed, None);
    assert_eq!(teams[0].players[0], teams[2].players[0]);
    assert!(teams.iter().all(|t| t.category_id == teams[0].category_id));
}

#[test]
fn seed_column_is_optional() {
    let (_, teams) = import("name,player_1,player_2\nAces,Ana,Bea\n").unwrap();
    assert_eq!(teams[0].seed, None);
}

#[test]
fn duplicate_pair_is_rejected() {
    let csv = "name,player_1,player_2,seed\nOne,Ana,Bea,\nTwo,Bea,Ana,\n";
    assert!(matches!(
        import(csv),
        Err(ImportError::Engine(EngineError::InvalidTeam(_)))
    ));
}

#[test]
fn player_cannot_partner_themselves() {
    let csv = "name,player_1,player_2,seed\nSolo,Ana,Ana,\n";
    assert!(matches!(import(csv), Err(ImportError::InvalidRow { line: 2, .. })));
}

#[test]
fn blank_names_report_their_line() {
    let csv = "name,player_1,player_2,seed\nAces,Ana,Bea,\n ,Carla,Dora,\n";
    assert!(matches!(import(csv), Err(ImportError::InvalidRow { line: 3, .. })));
}

#[test]
fn malformed_seed_is_a_csv_error() {
    let csv = "name,player_1,player_2,seed\nAces,Ana,Bea,first\n";
    assert!(matches!(import(csv), Err(ImportError::Csv(_))));
}
