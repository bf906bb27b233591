//! Tournament, Category, TournamentFormat and TournamentStatus.

use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Unique identifier for a category.
pub type CategoryId = Uuid;

/// Competitive format used to generate and advance matches.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    SingleElim,
    DoubleElim,
    RoundRobin,
    Americano,
    Mexicano,
    GroupsPlayoffs,
}

impl TournamentFormat {
    /// Formats that rotate individual players through synthesized partnerships.
    pub fn is_rotation(self) -> bool {
        matches!(self, TournamentFormat::Americano | TournamentFormat::Mexicano)
    }
}

/// Lifecycle of a tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    #[default]
    Draft,
    Registration,
    Live,
    Finished,
    Cancelled,
}

impl TournamentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TournamentStatus::Finished | TournamentStatus::Cancelled)
    }
}

/// Scopes teams and matches within a tournament (e.g. by gender or level).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub tournament_id: TournamentId,
    pub name: String,
}

impl Category {
    pub fn new(tournament_id: TournamentId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            name: name.into(),
        }
    }
}

/// Tournament header: format, status, team bounds and time window.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    pub status: TournamentStatus,
    /// Entry bounds per category: teams, or players for rotation formats.
    pub min_teams: usize,
    pub max_teams: usize,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

impl Tournament {
    /// Create a Draft tournament. The window must be non-empty.
    pub fn new(
        name: impl Into<String>,
        format: TournamentFormat,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> EngineResult<Self> {
        if end_at <= start_at {
            return Err(EngineError::InvalidTimeRange(format!(
                "tournament window {start_at} .. {end_at} is empty"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            format,
            status: TournamentStatus::Draft,
            min_teams: 2,
            max_teams: 64,
            start_at,
            end_at,
        })
    }

    /// Set the allowed number of teams (or players for rotation formats) per category.
    pub fn with_team_bounds(mut self, min_teams: usize, max_teams: usize) -> Self {
        self.min_teams = min_teams;
        self.max_teams = max_teams.max(min_teams);
        self
    }

    /// Draft -> Registration.
    pub fn open_registration(&mut self) -> EngineResult<()> {
        self.transition(TournamentStatus::Draft, "draft", TournamentStatus::Registration)
    }

    /// Registration -> Live. Match generation happens in [`crate::logic::launch_tournament`].
    pub fn go_live(&mut self) -> EngineResult<()> {
        self.transition(TournamentStatus::Registration, "registration", TournamentStatus::Live)
    }

    /// Live -> Finished.
    pub fn finish(&mut self) -> EngineResult<()> {
        self.transition(TournamentStatus::Live, "live", TournamentStatus::Finished)
    }

    /// Any non-terminal status -> Cancelled.
    pub fn cancel(&mut self) -> EngineResult<()> {
        if self.status.is_terminal() {
            return Err(EngineError::InvalidState {
                expected: "a non-terminal status",
                actual: self.status,
            });
        }
        self.status = TournamentStatus::Cancelled;
        Ok(())
    }

    pub fn ensure_live(&self) -> EngineResult<()> {
        if self.status != TournamentStatus::Live {
            return Err(EngineError::InvalidState {
                expected: "live",
                actual: self.status,
            });
        }
        Ok(())
    }

    fn transition(
        &mut self,
        from: TournamentStatus,
        expected: &'static str,
        to: TournamentStatus,
    ) -> EngineResult<()> {
        if self.status != from {
            return Err(EngineError::InvalidState {
                expected,
                actual: self.status,
            });
        }
        self.status = to;
        Ok(())
    }
}
