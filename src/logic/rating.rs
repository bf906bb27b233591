//! Elo rating updates per completed match, tracked per ranking scope.

use crate::config::RatingConfig;
use crate::error::StoreError;
use crate::models::{GameMatch, PlayerId, Ranking, RankingKey, Team};
use crate::store::RankingStore;
use serde::{Deserialize, Serialize};

/// Expected score for a player rated `rating` against `opponent`.
pub fn expected_score(rating: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((opponent - rating) / 400.0))
}

/// Rounded Elo change for one player.
pub fn rating_delta(rating: f64, opponent: f64, won: bool, k_factor: f64) -> i32 {
    let actual = if won { 1.0 } else { 0.0 };
    (k_factor * (actual - expected_score(rating, opponent))).round() as i32
}

/// Deltas for a 2v2 match. Each player is rated individually against the opposing side's average.
pub fn team_deltas(side_a: [i32; 2], side_b: [i32; 2], a_won: bool, k_factor: f64) -> ([i32; 2], [i32; 2]) {
    let average = |side: [i32; 2]| f64::from(side[0] + side[1]) / 2.0;
    let (avg_a, avg_b) = (average(side_a), average(side_b));
    let a = side_a.map(|r| rating_delta(f64::from(r), avg_b, a_won, k_factor));
    let b = side_b.map(|r| rating_delta(f64::from(r), avg_a, !a_won, k_factor));
    (a, b)
}

/// One ranking row changed by a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingChange {
    pub key: RankingKey,
    pub before: i32,
    pub after: i32,
}

impl RatingChange {
    pub fn delta(&self) -> i32 {
        self.after - self.before
    }
}

/// Scope keys a match updates for one player.
fn keys_for(game: &GameMatch, player: PlayerId, config: &RatingConfig) -> Vec<RankingKey> {
    let mut keys = vec![
        RankingKey::tournament(game.tournament_id, game.category_id, player),
        RankingKey::global(player),
    ];
    if config.track_category_scope {
        keys.push(RankingKey::category(game.category_id, player));
    }
    keys
}

fn load_rows<S: RankingStore + ?Sized>(
    store: &S,
    game: &GameMatch,
    team: &Team,
    scope: usize,
    config: &RatingConfig,
) -> Result<[Ranking; 2], StoreError> {
    let row = |player: PlayerId| -> Result<Ranking, StoreError> {
        let key = keys_for(game, player, config)[scope];
        Ok(store
            .ranking(&key)?
            .unwrap_or_else(|| Ranking::new(key, config.default_rating)))
    };
    Ok([row(team.players[0])?, row(team.players[1])?])
}

/// Apply the rating update of a decided match to every tracked scope.
///
/// Missing ranking rows start at the configured default rating.
pub fn rate_match<S: RankingStore + ?Sized>(
    store: &S,
    game: &GameMatch,
    team_a: &Team,
    team_b: &Team,
    config: &RatingConfig,
) -> Result<Vec<RatingChange>, StoreError> {
    let Some(winner) = game.winner else {
        return Ok(Vec::new());
    };
    let a_won = winner == team_a.id;
    let (games_a, games_b) = game.games();

    let scopes = keys_for(game, team_a.players[0], config).len();
    let mut changes = Vec::new();
    for scope in 0..scopes {
        let rows_a = load_rows(store, game, team_a, scope, config)?;
        let rows_b = load_rows(store, game, team_b, scope, config)?;
        let (delta_a, delta_b) = team_deltas(
            [rows_a[0].rating, rows_a[1].rating],
            [rows_b[0].rating, rows_b[1].rating],
            a_won,
            config.k_factor,
        );

        let sides = [(rows_a, delta_a, a_won, games_a), (rows_b, delta_b, !a_won, games_b)];
        for (rows, deltas, won, games) in sides {
            for (mut row, delta) in rows.into_iter().zip(deltas) {
                let before = row.rating;
                row.rating += delta;
                if won {
                    row.wins += 1;
                } else {
                    row.losses += 1;
                }
                row.points += games;
                changes.push(RatingChange {
                    key: row.key,
                    before,
                    after: row.rating,
                });
                store.upsert_ranking(row)?;
            }
        }
    }
    Ok(changes)
}
