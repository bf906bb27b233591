//! Integration tests for group standings: ordering, tiebreaks and recomputation.

use padel_tournament_engine::logic::compute_standings;
use padel_tournament_engine::{
    Entrant, GameMatch, Group, MatchMeta, MatchState, SetScore, Slot, Stage, Standing, TeamId,
};
use std::collections::HashMap;
use uuid::Uuid;

struct Fixture {
    group: Group,
    names: HashMap<TeamId, String>,
    ids: HashMap<&'static str, TeamId>,
}

impl Fixture {
    fn new(names: &[&'static str]) -> Self {
        let ids: HashMap<&'static str, TeamId> = names.iter().map(|n| (*n, Uuid::new_v4())).collect();
        let group = Group::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Group A",
            names.iter().map(|n| ids[n]).collect(),
        );
        Self {
            group,
            names: ids.iter().map(|(n, id)| (*id, n.to_string())).collect(),
            ids,
        }
    }

    /// A decided match; the side winning more sets wins.
    fn result(&self, a: &str, b: &str, sets: &[(u32, u32)]) -> GameMatch {
        let mut game = GameMatch::new(
            self.group.tournament_id,
            self.group.category_id,
            Stage::Pool(1),
            1,
            3,
            MatchMeta::RoundRobin {
                group_name: self.group.name.clone(),
            },
        )
        .in_group(self.group.id)
        .with_teams(Entrant::Team(self.ids[a]), Entrant::Team(self.ids[b]));
        game.sets = sets
            .iter()
            .enumerate()
            .map(|(i, &(ga, gb))| SetScore::new(i as u8 + 1, ga, gb))
            .collect();
        let won_a = game.sets.iter().filter(|s| s.winner() == Some(Slot::A)).count();
        game.winner = Some(if won_a * 2 > game.sets.len() { self.ids[a] } else { self.ids[b] });
        game.state = MatchState::Done;
        game
    }

    fn table(&self, matches: &[GameMatch]) -> Vec<Standing> {
        let refs: Vec<&GameMatch> = matches.iter().collect();
        compute_standings(&self.group, &refs, |id| self.names[&id].clone())
    }
}

fn order(table: &[Standing]) -> Vec<&str> {
    table.iter().map(|s| s.team_name.as_str()).collect()
}

#[test]
fn head_to_head_beats_differential_for_two_way_ties() {
    let f = Fixture::new(&["Aces", "Blues", "Crows", "Doves"]);
    let matches = vec![
        f.result("Aces", "Blues", &[(6, 4)]),
        f.result("Crows", "Aces", &[(6, 0), (6, 0)]),
        f.result("Aces", "Doves", &[(6, 4)]),
        f.result("Blues", "Crows", &[(6, 0), (6, 0)]),
        f.result("Blues", "Doves", &[(6, 0), (6, 0)]),
        f.result("Doves", "Crows", &[(6, 4)]),
    ];
    let table = f.table(&matches);

    // Aces and Blues both won twice; Aces won their meeting despite a worse differential.
    assert_eq!(order(&table), ["Aces", "Blues", "Doves", "Crows"]);
    assert_eq!(table[0].differential, -8);
    assert_eq!(table[1].differential, 22);
    let positions: Vec<u32> = table.iter().map(|s| s.position).collect();
    assert_eq!(positions, [1, 2, 3, 4]);
}

#[test]
fn three_way_tie_falls_back_to_differential() {
    let f = Fixture::new(&["X", "Y", "Z"]);
    let matches = vec![
        f.result("X", "Y", &[(6, 0)]),
        f.result("Y", "Z", &[(6, 4)]),
        f.result("Z", "X", &[(6, 3)]),
    ];
    let table = f.table(&matches);
    assert_eq!(order(&table), ["X", "Z", "Y"]);
    assert!(table.iter().all(|s| s.wins == 1 && s.losses == 1));
}

#[test]
fn name_breaks_full_ties() {
    let f = Fixture::new(&["Zebras", "Ants"]);
    let table = f.table(&[]);
    assert_eq!(order(&table), ["Ants", "Zebras"]);
    assert!(table.iter().all(|s| s.played == 0));
}

#[test]
fn only_decided_matches_count() {
    let f = Fixture::new(&["Aces", "Blues"]);
    let mut pending = f.result("Aces", "Blues", &[(6, 1), (6, 1)]);
    pending.state = MatchState::Pending;
    pending.winner = None;
    let mut walkover = f.result("Blues", "Aces", &[]);
    walkover.state = MatchState::Walkover;
    walkover.winner = Some(f.ids["Blues"]);

    let table = f.table(&[pending, walkover]);
    assert_eq!(order(&table), ["Blues", "Aces"]);
    assert_eq!(table[0].played, 1);
    assert_eq!(table[0].points_for, 0);
}

#[test]
fn recomputation_is_idempotent() {
    let f = Fixture::new(&["Aces", "Blues", "Crows"]);
    let matches = vec![
        f.result("Aces", "Blues", &[(6, 2), (3, 6), (7, 6)]),
        f.result("Crows", "Blues", &[(6, 4), (6, 4)]),
    ];
    let first = f.table(&matches);
    let second = f.table(&matches);
    assert_eq!(first, second);
    // Aces and Crows never met, so the better differential leads.
    assert_eq!(order(&first), ["Crows", "Aces", "Blues"]);
    assert_eq!((first[1].points_for, first[1].points_against), (16, 14));
    assert_eq!(first[2].losses, 2);
}
