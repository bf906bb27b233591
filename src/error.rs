//! Error types for the engine and its collaborator contracts.

use crate::models::{MatchId, MatchState, Slot, TournamentFormat, TournamentStatus};
use thiserror::Error;
use uuid::Uuid;

/// Kind of entity referenced by an [`EngineError::EntityNotFound`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Entity {
    Tournament,
    Category,
    Group,
    Match,
    Team,
    Player,
    Court,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Entity::Tournament => "tournament",
            Entity::Category => "category",
            Entity::Group => "group",
            Entity::Match => "match",
            Entity::Team => "team",
            Entity::Player => "player",
            Entity::Court => "court",
        };
        f.write_str(name)
    }
}

/// Errors returned by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{format:?} needs {reason}, got {count}")]
    InvalidTeamCount {
        format: TournamentFormat,
        count: usize,
        reason: &'static str,
    },

    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),

    #[error("{entity} not found: {id}")]
    EntityNotFound { entity: Entity, id: Uuid },

    #[error("Match {match_id} is not ready for progression (state {state:?})")]
    MatchNotReady { match_id: MatchId, state: MatchState },

    #[error("Tournament is {actual:?}; action requires {expected}")]
    InvalidState {
        expected: &'static str,
        actual: TournamentStatus,
    },

    #[error("Invalid team: {0}")]
    InvalidTeam(String),

    #[error("Invalid result: {0}")]
    InvalidResult(String),

    #[error("Slot {slot:?} of match {match_id} is already taken")]
    SlotTaken { match_id: MatchId, slot: Slot },

    #[error("No courts available")]
    NoCourts,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn not_found(entity: Entity, id: Uuid) -> Self {
        EngineError::EntityNotFound { entity, id }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: Uuid },

    #[error("Slot {slot:?} of match {match_id} is already taken")]
    SlotTaken { match_id: MatchId, slot: Slot },

    #[error("Store lock poisoned")]
    Poisoned,
}

/// Errors raised while importing a roster.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line {line}: {message}")]
    InvalidRow { line: u64, message: String },

    #[error(transparent)]
    Engine(#[from] EngineError),
}
