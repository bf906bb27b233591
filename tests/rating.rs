//! Integration tests for Elo updates across ranking scopes.

use padel_tournament_engine::config::RatingConfig;
use padel_tournament_engine::logic::{rate_match, rating_delta, team_deltas};
use padel_tournament_engine::store::{MemoryStore, RankingStore};
use padel_tournament_engine::{
    Entrant, GameMatch, MatchMeta, MatchState, Ranking, RankingKey, RankingScope, SetScore, Stage,
    Team,
};
use proptest::prelude::*;
use uuid::Uuid;

struct Duel {
    game: GameMatch,
    a: Team,
    b: Team,
}

/// Team A beats team B 6-3 6-4.
fn duel() -> Duel {
    let (tournament_id, category_id) = (Uuid::new_v4(), Uuid::new_v4());
    let a = Team::new(tournament_id, category_id, "Aces", [Uuid::new_v4(), Uuid::new_v4()]).unwrap();
    let b = Team::new(tournament_id, category_id, "Blues", [Uuid::new_v4(), Uuid::new_v4()]).unwrap();
    let mut game = GameMatch::new(
        tournament_id,
        category_id,
        Stage::Winners(1),
        1,
        3,
        MatchMeta::Bracket {
            round_name: "Final".into(),
        },
    )
    .with_teams(Entrant::Team(a.id), Entrant::Team(b.id));
    game.sets = vec![SetScore::new(1, 6, 3), SetScore::new(2, 6, 4)];
    game.winner = Some(a.id);
    game.state = MatchState::Done;
    Duel { game, a, b }
}

#[test]
fn equal_sides_split_half_k() {
    let (a, b) = team_deltas([1500, 1500], [1500, 1500], true, 24.0);
    assert_eq!(a, [12, 12]);
    assert_eq!(b, [-12, -12]);
}

#[test]
fn fresh_players_start_at_default_rating() {
    let duel = duel();
    let store = MemoryStore::new();
    let changes = rate_match(&store, &duel.game, &duel.a, &duel.b, &RatingConfig::default()).unwrap();

    // Two players per side, Tournament and Global scope each.
    assert_eq!(changes.len(), 8);
    assert!(changes.iter().all(|c| c.before == 1500));
    assert!(changes.iter().all(|c| c.delta().abs() == 12));

    let winner = store
        .ranking(&RankingKey::tournament(duel.game.tournament_id, duel.game.category_id, duel.a.players[0]))
        .unwrap()
        .unwrap();
    assert_eq!(winner.rating, 1512);
    assert_eq!(winner.wins, 1);
    assert_eq!(winner.points, 12);

    let loser = store.ranking(&RankingKey::global(duel.b.players[1])).unwrap().unwrap();
    assert_eq!(loser.rating, 1488);
    assert_eq!(loser.losses, 1);
    assert_eq!(loser.points, 7);
    assert!(store.ranking(&RankingKey::category(duel.game.category_id, duel.a.players[0])).unwrap().is_none());
}

#[test]
fn category_scope_is_opt_in() {
    let duel = duel();
    let store = MemoryStore::new();
    let config = RatingConfig {
        track_category_scope: true,
        ..RatingConfig::default()
    };
    let changes = rate_match(&store, &duel.game, &duel.a, &duel.b, &config).unwrap();
    assert_eq!(changes.len(), 12);

    let board = store
        .leaderboard(RankingScope::Category, None, Some(duel.game.category_id))
        .unwrap();
    assert_eq!(board.len(), 4);
    assert_eq!(board[0].rating, 1512);
    assert_eq!(board[3].rating, 1488);
}

#[test]
fn favourite_gains_less() {
    let duel = duel();
    let store = MemoryStore::new();
    for player in duel.a.players {
        let key = RankingKey::tournament(duel.game.tournament_id, duel.game.category_id, player);
        store.upsert_ranking(Ranking::new(key, 1700)).unwrap();
    }
    let changes = rate_match(&store, &duel.game, &duel.a, &duel.b, &RatingConfig::default()).unwrap();

    let tournament_gain: Vec<i32> = changes
        .iter()
        .filter(|c| c.key.scope == RankingScope::Tournament && duel.a.players.contains(&c.key.user_id))
        .map(|c| c.delta())
        .collect();
    assert_eq!(tournament_gain, [6, 6]);

    // Global rows were untouched before, so they move by the even split.
    let global = store.ranking(&RankingKey::global(duel.a.players[0])).unwrap().unwrap();
    assert_eq!(global.rating, 1512);
}

#[test]
fn undecided_match_changes_nothing() {
    let mut duel = duel();
    duel.game.winner = None;
    let store = MemoryStore::new();
    let changes = rate_match(&store, &duel.game, &duel.a, &duel.b, &RatingConfig::default()).unwrap();
    assert!(changes.is_empty());
    assert!(store.leaderboard(RankingScope::Global, None, None).unwrap().is_empty());
}

proptest! {
    #[test]
    fn deltas_are_zero_sum_within_rounding(a in 800i32..2400, b in 800i32..2400, k in 8u32..64) {
        let k = f64::from(k);
        let gain = rating_delta(f64::from(a), f64::from(b), true, k);
        let loss = rating_delta(f64::from(b), f64::from(a), false, k);
        prop_assert!((gain + loss).abs() <= 1);
        prop_assert!(gain >= 0 && loss <= 0);
    }
}
