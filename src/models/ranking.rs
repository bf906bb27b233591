//! Ranking rows keyed by scope.

use crate::models::player::PlayerId;
use crate::models::tournament::{CategoryId, TournamentId};
use serde::{Deserialize, Serialize};

/// Which population a rating is tracked over.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingScope {
    /// One tournament category.
    Tournament,
    /// A category across tournaments.
    Category,
    Global,
}

/// Composite key: a player has at most one row per key.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct RankingKey {
    pub scope: RankingScope,
    pub tournament_id: Option<TournamentId>,
    pub category_id: Option<CategoryId>,
    pub user_id: PlayerId,
}

impl RankingKey {
    pub fn tournament(tournament_id: TournamentId, category_id: CategoryId, user_id: PlayerId) -> Self {
        Self {
            scope: RankingScope::Tournament,
            tournament_id: Some(tournament_id),
            category_id: Some(category_id),
            user_id,
        }
    }

    pub fn category(category_id: CategoryId, user_id: PlayerId) -> Self {
        Self {
            scope: RankingScope::Category,
            tournament_id: None,
            category_id: Some(category_id),
            user_id,
        }
    }

    pub fn global(user_id: PlayerId) -> Self {
        Self {
            scope: RankingScope::Global,
            tournament_id: None,
            category_id: None,
            user_id,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub key: RankingKey,
    pub rating: i32,
    pub wins: u32,
    pub losses: u32,
    /// Games won across rated matches.
    pub points: u32,
}

impl Ranking {
    /// Fresh row at the given starting rating.
    pub fn new(key: RankingKey, rating: i32) -> Self {
        Self {
            key,
            rating,
            wins: 0,
            losses: 0,
            points: 0,
        }
    }
}
