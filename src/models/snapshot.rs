//! In-memory arena of one tournament's entities, indexed by id.

use crate::error::{EngineError, EngineResult, Entity};
use crate::models::game::{GameMatch, MatchId};
use crate::models::group::{Group, GroupId, Standing};
use crate::models::player::{Player, PlayerId, Signup, Team, TeamId};
use crate::models::tournament::{Category, CategoryId, Tournament};
use serde::{Deserialize, Serialize};

/// Everything the engine needs to reason about a tournament. The caller loads it from its
/// stores and writes back whatever the engine reports as changed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TournamentSnapshot {
    pub tournament: Tournament,
    pub categories: Vec<Category>,
    pub players: Vec<Player>,
    /// Individual sign-ups, in sign-up order.
    #[serde(default)]
    pub signups: Vec<Signup>,
    pub teams: Vec<Team>,
    pub groups: Vec<Group>,
    pub matches: Vec<GameMatch>,
    pub standings: Vec<Standing>,
}

impl TournamentSnapshot {
    pub fn new(tournament: Tournament) -> Self {
        Self {
            tournament,
            categories: Vec::new(),
            players: Vec::new(),
            signups: Vec::new(),
            teams: Vec::new(),
            groups: Vec::new(),
            matches: Vec::new(),
            standings: Vec::new(),
        }
    }

    pub fn category(&self, id: CategoryId) -> EngineResult<&Category> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .ok_or(EngineError::not_found(Entity::Category, id))
    }

    pub fn team(&self, id: TeamId) -> EngineResult<&Team> {
        self.teams
            .iter()
            .find(|t| t.id == id)
            .ok_or(EngineError::not_found(Entity::Team, id))
    }

    pub fn team_mut(&mut self, id: TeamId) -> EngineResult<&mut Team> {
        self.teams
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(EngineError::not_found(Entity::Team, id))
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn group(&self, id: GroupId) -> EngineResult<&Group> {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .ok_or(EngineError::not_found(Entity::Group, id))
    }

    pub fn game(&self, id: MatchId) -> EngineResult<&GameMatch> {
        self.matches
            .iter()
            .find(|m| m.id == id)
            .ok_or(EngineError::not_found(Entity::Match, id))
    }

    pub fn game_mut(&mut self, id: MatchId) -> EngineResult<&mut GameMatch> {
        self.matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(EngineError::not_found(Entity::Match, id))
    }

    /// Teams registered in a category, in registration order.
    pub fn teams_in(&self, category_id: CategoryId) -> Vec<&Team> {
        self.teams
            .iter()
            .filter(|t| t.category_id == category_id)
            .collect()
    }

    /// Players signed up individually for a category.
    pub fn signed_up_in(&self, category_id: CategoryId) -> impl Iterator<Item = PlayerId> + '_ {
        self.signups
            .iter()
            .filter(move |s| s.category_id == category_id)
            .map(|s| s.player_id)
    }

    pub fn matches_in(&self, category_id: CategoryId) -> impl Iterator<Item = &GameMatch> {
        self.matches
            .iter()
            .filter(move |m| m.category_id == category_id)
    }

    /// Any match left to play anywhere in the tournament.
    pub fn has_open_matches(&self) -> bool {
        self.matches.iter().any(|m| m.state.is_open())
    }

    /// Players of both teams of a match (fewer when slots are unresolved).
    pub fn match_players(&self, game: &GameMatch) -> Vec<PlayerId> {
        [game.team_a.team(), game.team_b.team()]
            .into_iter()
            .flatten()
            .filter_map(|id| self.team(id).ok())
            .flat_map(|t| t.players)
            .collect()
    }

    /// Display name for a team, falling back to its id.
    pub fn team_name(&self, id: TeamId) -> String {
        self.team(id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|_| id.to_string())
    }

    pub fn player_name(&self, id: PlayerId) -> String {
        self.player(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}
