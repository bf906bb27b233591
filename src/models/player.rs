//! Player and Team data structures.

use crate::error::{EngineError, EngineResult};
use crate::models::tournament::{CategoryId, TournamentId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in teams, rankings and lookups).
pub type PlayerId = Uuid;

/// Unique identifier for a team.
pub type TeamId = Uuid;

/// Starting rating for teams and rankings without history.
pub const DEFAULT_RATING: i32 = 1500;

/// A registered player.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// An individual sign-up to a tournament category. Rotation formats draw their partnerships from
/// these when no teams are registered.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Signup {
    pub tournament_id: TournamentId,
    pub category_id: CategoryId,
    pub player_id: PlayerId,
}

/// A two-player team registered in one tournament category.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub tournament_id: TournamentId,
    pub category_id: CategoryId,
    pub name: String,
    pub players: [PlayerId; 2],
    /// Lower is stronger. `None` means unseeded.
    pub seed: Option<u32>,
    pub rating: i32,
}

impl Team {
    /// Create a team. The two players must be distinct.
    pub fn new(
        tournament_id: TournamentId,
        category_id: CategoryId,
        name: impl Into<String>,
        players: [PlayerId; 2],
    ) -> EngineResult<Self> {
        if players[0] == players[1] {
            return Err(EngineError::InvalidTeam(format!(
                "player {} cannot partner themselves",
                players[0]
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            tournament_id,
            category_id,
            name: name.into(),
            players,
            seed: None,
            rating: DEFAULT_RATING,
        })
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Order-independent identity of the partnership.
    pub fn pair_key(&self) -> (PlayerId, PlayerId) {
        pair_key(self.players[0], self.players[1])
    }

    pub fn has_player(&self, player: PlayerId) -> bool {
        self.players.contains(&player)
    }
}

/// Order-independent key for two players.
pub fn pair_key(a: PlayerId, b: PlayerId) -> (PlayerId, PlayerId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Check the (player pair, tournament) uniqueness invariant over a roster.
pub fn validate_roster(teams: &[Team]) -> EngineResult<()> {
    let mut seen = std::collections::HashSet::new();
    for team in teams {
        if team.players[0] == team.players[1] {
            return Err(EngineError::InvalidTeam(format!(
                "team {} lists the same player twice",
                team.name
            )));
        }
        if !seen.insert((team.tournament_id, team.pair_key())) {
            return Err(EngineError::InvalidTeam(format!(
                "pair of team {} is already registered in this tournament",
                team.name
            )));
        }
    }
    Ok(())
}
