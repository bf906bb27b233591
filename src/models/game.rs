//! Match (game), bracket stage, slots and set scores.

use crate::models::group::GroupId;
use crate::models::player::TeamId;
use crate::models::tournament::{CategoryId, TournamentId};
use crate::models::court::CourtId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Offset of the losers bracket in the legacy round-number encoding.
pub const LOSERS_ROUND_OFFSET: i32 = 1000;

/// One of the two sides of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    A,
    B,
}

impl Slot {
    /// Slot taken by the winner of feeder match `match_number` (odd -> A, even -> B).
    pub fn for_feeder(match_number: u32) -> Self {
        if match_number % 2 == 1 {
            Slot::A
        } else {
            Slot::B
        }
    }

    pub fn other(self) -> Self {
        match self {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        }
    }
}

/// Occupant of a match slot.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "team_id")]
pub enum Entrant {
    /// Not resolved yet; filled by progression.
    #[default]
    Tbd,
    Team(TeamId),
    /// Permanently empty: the opponent advances without playing.
    Bye,
}

impl Entrant {
    pub fn team(self) -> Option<TeamId> {
        match self {
            Entrant::Team(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_resolved(self) -> bool {
        !matches!(self, Entrant::Tbd)
    }
}

impl From<Option<TeamId>> for Entrant {
    fn from(team: Option<TeamId>) -> Self {
        team.map_or(Entrant::Bye, Entrant::Team)
    }
}

/// Match lifecycle: Pending -> Ongoing -> {Done, Walkover, Cancelled}.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    #[default]
    Pending,
    Ongoing,
    Done,
    Walkover,
    Cancelled,
}

impl MatchState {
    pub fn is_open(self) -> bool {
        matches!(self, MatchState::Pending | MatchState::Ongoing)
    }

    /// Done and Walkover both carry a winner and drive progression.
    pub fn is_decided(self) -> bool {
        matches!(self, MatchState::Done | MatchState::Walkover)
    }
}

/// Which part of the competition a match belongs to.
///
/// Elimination rounds count down toward the decider: `Winners(1)` is the final, `Losers(1)` the losers final.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "round")]
pub enum Stage {
    Winners(u32),
    Losers(u32),
    /// Leg 1 is the first grand final, leg 2 the reset.
    GrandFinal(u32),
    /// Round robin round or americano rotation, counted from 1.
    Pool(u32),
}

impl Stage {
    /// Signed ordering key: winners `r`, losers `1000 + r`, grand finals `-leg`, pool `r`.
    pub fn round_key(self) -> i32 {
        match self {
            Stage::Winners(r) | Stage::Pool(r) => r as i32,
            Stage::Losers(r) => LOSERS_ROUND_OFFSET + r as i32,
            Stage::GrandFinal(leg) => -(leg as i32),
        }
    }

    pub fn is_bracket(self) -> bool {
        !matches!(self, Stage::Pool(_))
    }
}

/// Format-specific match metadata.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "format")]
pub enum MatchMeta {
    Bracket { round_name: String },
    RoundRobin { group_name: String },
    Americano { court: u32, duration_minutes: u32 },
}

/// Games won by each side in one set.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SetScore {
    pub set_number: u8,
    pub games_a: u32,
    pub games_b: u32,
    pub tiebreak_a: Option<u32>,
    pub tiebreak_b: Option<u32>,
}

impl SetScore {
    pub fn new(set_number: u8, games_a: u32, games_b: u32) -> Self {
        Self {
            set_number,
            games_a,
            games_b,
            tiebreak_a: None,
            tiebreak_b: None,
        }
    }

    pub fn with_tiebreak(mut self, tiebreak_a: u32, tiebreak_b: u32) -> Self {
        self.tiebreak_a = Some(tiebreak_a);
        self.tiebreak_b = Some(tiebreak_b);
        self
    }

    /// Side that won the set; tiebreak points decide level game counts.
    pub fn winner(&self) -> Option<Slot> {
        let a = (self.games_a, self.tiebreak_a.unwrap_or(0));
        let b = (self.games_b, self.tiebreak_b.unwrap_or(0));
        match a.cmp(&b) {
            std::cmp::Ordering::Greater => Some(Slot::A),
            std::cmp::Ordering::Less => Some(Slot::B),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// A single match between two slots.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub category_id: CategoryId,
    pub group_id: Option<GroupId>,
    pub stage: Stage,
    /// Slot index within the round, from 1.
    pub match_number: u32,
    pub court_id: Option<CourtId>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub team_a: Entrant,
    pub team_b: Entrant,
    /// None until decided.
    pub winner: Option<TeamId>,
    pub state: MatchState,
    pub best_of: u8,
    pub meta: MatchMeta,
    pub sets: Vec<SetScore>,
}

impl GameMatch {
    pub fn new(
        tournament_id: TournamentId,
        category_id: CategoryId,
        stage: Stage,
        match_number: u32,
        best_of: u8,
        meta: MatchMeta,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            category_id,
            group_id: None,
            stage,
            match_number,
            court_id: None,
            scheduled_at: None,
            team_a: Entrant::Tbd,
            team_b: Entrant::Tbd,
            winner: None,
            state: MatchState::Pending,
            best_of,
            meta,
            sets: Vec::new(),
        }
    }

    pub fn with_teams(mut self, team_a: Entrant, team_b: Entrant) -> Self {
        self.team_a = team_a;
        self.team_b = team_b;
        self
    }

    pub fn in_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Legacy signed round number (see [`Stage::round_key`]).
    pub fn round(&self) -> i32 {
        self.stage.round_key()
    }

    pub fn entrant(&self, slot: Slot) -> Entrant {
        match slot {
            Slot::A => self.team_a,
            Slot::B => self.team_b,
        }
    }

    pub fn entrant_mut(&mut self, slot: Slot) -> &mut Entrant {
        match slot {
            Slot::A => &mut self.team_a,
            Slot::B => &mut self.team_b,
        }
    }

    /// Both team ids, when both slots hold a team.
    pub fn teams(&self) -> Option<(TeamId, TeamId)> {
        Some((self.team_a.team()?, self.team_b.team()?))
    }

    pub fn has_team(&self, team: TeamId) -> bool {
        self.team_a.team() == Some(team) || self.team_b.team() == Some(team)
    }

    pub fn slot_of(&self, team: TeamId) -> Option<Slot> {
        if self.team_a.team() == Some(team) {
            Some(Slot::A)
        } else if self.team_b.team() == Some(team) {
            Some(Slot::B)
        } else {
            None
        }
    }

    /// The other team of a decided match.
    pub fn loser(&self) -> Option<TeamId> {
        let winner = self.winner?;
        let slot = self.slot_of(winner)?;
        self.entrant(slot.other()).team()
    }

    /// Total games won by (side A, side B) over all sets.
    pub fn games(&self) -> (u32, u32) {
        self.sets
            .iter()
            .fold((0, 0), |(a, b), s| (a + s.games_a, b + s.games_b))
    }

    /// Games won by `team` and conceded by it, if it played this match.
    pub fn games_for(&self, team: TeamId) -> Option<(u32, u32)> {
        let (a, b) = self.games();
        match self.slot_of(team)? {
            Slot::A => Some((a, b)),
            Slot::B => Some((b, a)),
        }
    }

    pub fn duration_minutes_hint(&self) -> Option<u32> {
        match &self.meta {
            MatchMeta::Americano {
                duration_minutes, ..
            } => Some(*duration_minutes),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_keys_follow_legacy_encoding() {
        assert_eq!(Stage::Winners(3).round_key(), 3);
        assert_eq!(Stage::Losers(2).round_key(), 1002);
        assert_eq!(Stage::GrandFinal(1).round_key(), -1);
        assert_eq!(Stage::GrandFinal(2).round_key(), -2);
    }

    #[test]
    fn tiebreak_decides_level_set() {
        let set = SetScore::new(1, 6, 6).with_tiebreak(5, 7);
        assert_eq!(set.winner(), Some(Slot::B));
    }

    #[test]
    fn feeder_parity_picks_slot() {
        assert_eq!(Slot::for_feeder(1), Slot::A);
        assert_eq!(Slot::for_feeder(4), Slot::B);
    }
}
