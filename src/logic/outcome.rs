//! Write descriptions returned by the engine for the caller's store to apply.

use crate::error::{EngineError, EngineResult};
use crate::logic::rating::RatingChange;
use crate::models::{
    CourtId, Entrant, GameMatch, MatchId, MatchState, SetScore, Slot, Standing, TeamId,
    TournamentStatus,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Partial update of a match. `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchPatch {
    pub state: Option<MatchState>,
    pub winner: Option<Option<TeamId>>,
    pub court_id: Option<Option<CourtId>>,
    pub scheduled_at: Option<Option<DateTime<Utc>>>,
    pub sets: Option<Vec<SetScore>>,
}

impl MatchPatch {
    pub fn resolve(state: MatchState, winner: Option<TeamId>) -> Self {
        Self {
            state: Some(state),
            winner: Some(winner),
            ..Self::default()
        }
    }

    pub fn schedule(court_id: Option<CourtId>, scheduled_at: Option<DateTime<Utc>>) -> Self {
        Self {
            court_id: Some(court_id),
            scheduled_at: Some(scheduled_at),
            ..Self::default()
        }
    }

    pub fn apply(&self, game: &mut GameMatch) {
        if let Some(state) = self.state {
            game.state = state;
        }
        if let Some(winner) = self.winner {
            game.winner = winner;
        }
        if let Some(court_id) = self.court_id {
            game.court_id = court_id;
        }
        if let Some(scheduled_at) = self.scheduled_at {
            game.scheduled_at = scheduled_at;
        }
        if let Some(sets) = &self.sets {
            game.sets = sets.clone();
        }
    }
}

/// One write against the match store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum MatchWrite {
    /// Compare-and-set: succeeds only while the slot is unresolved (or already holds `entrant`).
    Fill {
        match_id: MatchId,
        slot: Slot,
        entrant: Entrant,
    },
    Patch { match_id: MatchId, patch: MatchPatch },
}

/// Everything a progression step changed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Progress {
    pub writes: Vec<MatchWrite>,
    /// Matches spawned by this step (playoff brackets).
    pub created: Vec<GameMatch>,
    /// Recomputed standings of the touched group.
    pub standings: Vec<Standing>,
    pub rating_changes: Vec<RatingChange>,
    /// Refreshed team ratings.
    pub team_ratings: Vec<(TeamId, i32)>,
    pub status: Option<TournamentStatus>,
}

impl Progress {
    pub fn finished(&self) -> bool {
        self.status == Some(TournamentStatus::Finished)
    }
}

/// Fill a slot in place with compare-and-set semantics and record the write.
///
/// Returns `true` when the slot changed.
pub(crate) fn fill_slot(
    game: &mut GameMatch,
    slot: Slot,
    entrant: Entrant,
    writes: &mut Vec<MatchWrite>,
) -> EngineResult<bool> {
    let current = game.entrant(slot);
    if current == entrant {
        return Ok(false);
    }
    if current.is_resolved() {
        return Err(EngineError::SlotTaken {
            match_id: game.id,
            slot,
        });
    }
    *game.entrant_mut(slot) = entrant;
    writes.push(MatchWrite::Fill {
        match_id: game.id,
        slot,
        entrant,
    });
    Ok(true)
}

/// Apply a patch in place and record it.
pub(crate) fn patch_match(game: &mut GameMatch, patch: MatchPatch, writes: &mut Vec<MatchWrite>) {
    patch.apply(game);
    writes.push(MatchWrite::Patch {
        match_id: game.id,
        patch,
    });
}
