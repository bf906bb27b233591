//! Data structures for the engine: tournaments, teams, matches, groups, rankings and courts.

mod court;
mod game;
mod group;
mod player;
mod ranking;
mod snapshot;
mod tournament;

pub use court::{Court, CourtId};
pub use game::{
    Entrant, GameMatch, MatchId, MatchMeta, MatchState, SetScore, Slot, Stage, LOSERS_ROUND_OFFSET,
};
pub use group::{group_name, Group, GroupId, Standing};
pub use player::{pair_key, validate_roster, Player, PlayerId, Signup, Team, TeamId, DEFAULT_RATING};
pub use ranking::{Ranking, RankingKey, RankingScope};
pub use snapshot::TournamentSnapshot;
pub use tournament::{Category, CategoryId, Tournament, TournamentFormat, TournamentId, TournamentStatus};
