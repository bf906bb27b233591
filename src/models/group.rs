//! Round-robin groups and their standings.

use crate::models::player::TeamId;
use crate::models::tournament::{CategoryId, TournamentId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a group.
pub type GroupId = Uuid;

/// Tournament/category scoped cluster of teams playing a round robin.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub tournament_id: TournamentId,
    pub category_id: CategoryId,
    pub name: String,
    pub team_ids: Vec<TeamId>,
}

impl Group {
    pub fn new(
        tournament_id: TournamentId,
        category_id: CategoryId,
        name: impl Into<String>,
        team_ids: Vec<TeamId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            category_id,
            name: name.into(),
            team_ids,
        }
    }
}

/// Display name for the group at `index` ("Group A", "Group B", ...).
pub fn group_name(index: usize) -> String {
    let letter = (b'A' + (index % 26) as u8) as char;
    if index < 26 {
        format!("Group {letter}")
    } else {
        format!("Group {letter}{}", index / 26)
    }
}

/// Group-scoped aggregate for one team. Recomputed from the group's matches, never patched.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub group_id: GroupId,
    pub team_id: TeamId,
    pub team_name: String,
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    pub points_for: u32,
    pub points_against: u32,
    pub differential: i64,
    /// 1-based rank after sorting.
    pub position: u32,
}

impl Standing {
    /// Zeroed row, as created when the group is generated.
    pub fn zeroed(group_id: GroupId, team_id: TeamId, team_name: impl Into<String>) -> Self {
        Self {
            group_id,
            team_id,
            team_name: team_name.into(),
            ..Self::default()
        }
    }
}
