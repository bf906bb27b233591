//! Collaborator contracts for the surrounding application's persistence, plus an in-memory
//! implementation.
//!
//! The engine never talks to these during a computation except through [`RankingStore`]; the
//! service layer loads a [`TournamentSnapshot`] before a step and applies the reported writes after.

mod memory;

pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::logic::outcome::{MatchPatch, MatchWrite, Progress};
use crate::models::{
    Category, CategoryId, Entrant, GameMatch, Group, GroupId, MatchId, Player, PlayerId, Ranking,
    RankingKey, RankingScope, Signup, Slot, Standing, Team, TeamId, Tournament, TournamentId,
    TournamentSnapshot,
};

pub type StoreResult<T> = Result<T, StoreError>;

pub trait TournamentStore: Send + Sync {
    fn tournament(&self, id: TournamentId) -> StoreResult<Tournament>;
    fn save_tournament(&self, tournament: Tournament) -> StoreResult<()>;
    fn categories(&self, tournament_id: TournamentId) -> StoreResult<Vec<Category>>;
    fn save_category(&self, category: Category) -> StoreResult<()>;
}

/// Team and player lookups. Writes cover registration and synthesized rotation teams.
pub trait TeamStore: Send + Sync {
    fn team(&self, id: TeamId) -> StoreResult<Team>;
    fn teams(&self, tournament_id: TournamentId) -> StoreResult<Vec<Team>>;
    fn teams_of_player(&self, player_id: PlayerId) -> StoreResult<Vec<Team>>;
    fn save_teams(&self, teams: Vec<Team>) -> StoreResult<()>;
    fn set_team_rating(&self, id: TeamId, rating: i32) -> StoreResult<()>;
    fn player(&self, id: PlayerId) -> StoreResult<Player>;
    fn save_players(&self, players: Vec<Player>) -> StoreResult<()>;
    /// Record individual sign-ups. Signing the same player up twice for a category is a no-op.
    fn sign_up(&self, signups: Vec<Signup>) -> StoreResult<()>;
    /// Sign-ups of a tournament in sign-up order.
    fn signups(&self, tournament_id: TournamentId) -> StoreResult<Vec<Signup>>;
    /// Every player of a tournament: signed up individually or on a registered team.
    fn tournament_players(&self, tournament_id: TournamentId) -> StoreResult<Vec<Player>>;
}

/// Filter for [`MatchStore::find`]; `None` fields match anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct MatchFilter {
    pub tournament_id: Option<TournamentId>,
    pub category_id: Option<CategoryId>,
    pub group_id: Option<GroupId>,
    /// Legacy signed round key.
    pub round: Option<i32>,
}

impl MatchFilter {
    pub fn tournament(tournament_id: TournamentId) -> Self {
        Self {
            tournament_id: Some(tournament_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, game: &GameMatch) -> bool {
        self.tournament_id.map_or(true, |id| id == game.tournament_id)
            && self.category_id.map_or(true, |id| id == game.category_id)
            && (self.group_id.is_none() || self.group_id == game.group_id)
            && self.round.map_or(true, |round| round == game.round())
    }
}

pub trait MatchStore: Send + Sync {
    fn create_many(&self, matches: Vec<GameMatch>) -> StoreResult<()>;
    fn find(&self, filter: &MatchFilter) -> StoreResult<Vec<GameMatch>>;
    fn update(&self, id: MatchId, patch: &MatchPatch) -> StoreResult<()>;
    fn delete(&self, id: MatchId) -> StoreResult<()>;
    /// Compare-and-set: writes `entrant` only if the slot is unresolved or already holds it.
    fn fill_slot(&self, id: MatchId, slot: Slot, entrant: Entrant) -> StoreResult<()>;
}

pub trait GroupStore: Send + Sync {
    fn group(&self, id: GroupId) -> StoreResult<Group>;
    fn groups(&self, tournament_id: TournamentId) -> StoreResult<Vec<Group>>;
    fn create_groups(&self, groups: Vec<Group>) -> StoreResult<()>;
}

pub trait StandingStore: Send + Sync {
    /// Upsert by (group, team).
    fn upsert_standings(&self, standings: Vec<Standing>) -> StoreResult<()>;
    /// Rows of a group ordered by position.
    fn standings(&self, group_id: GroupId) -> StoreResult<Vec<Standing>>;
}

pub trait RankingStore: Send + Sync {
    fn ranking(&self, key: &RankingKey) -> StoreResult<Option<Ranking>>;
    /// Upsert by composite key.
    fn upsert_ranking(&self, ranking: Ranking) -> StoreResult<()>;
    /// Rows of one scope bucket, sorted by rating then wins (descending).
    fn leaderboard(
        &self,
        scope: RankingScope,
        tournament_id: Option<TournamentId>,
        category_id: Option<CategoryId>,
    ) -> StoreResult<Vec<Ranking>>;
}

/// Every contract at once.
pub trait Store:
    TournamentStore + TeamStore + MatchStore + GroupStore + StandingStore + RankingStore
{
}

impl<T> Store for T where
    T: TournamentStore + TeamStore + MatchStore + GroupStore + StandingStore + RankingStore
{
}

/// Read everything the engine needs about one tournament.
pub fn load_snapshot<S: Store + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
) -> StoreResult<TournamentSnapshot> {
    let mut snapshot = TournamentSnapshot::new(store.tournament(tournament_id)?);
    snapshot.categories = store.categories(tournament_id)?;
    snapshot.teams = store.teams(tournament_id)?;
    snapshot.signups = store.signups(tournament_id)?;
    snapshot.players = store.tournament_players(tournament_id)?;
    snapshot.groups = store.groups(tournament_id)?;
    snapshot.matches = store.find(&MatchFilter::tournament(tournament_id))?;
    for group in &snapshot.groups {
        snapshot.standings.extend(store.standings(group.id)?);
    }
    Ok(snapshot)
}

/// Apply the writes of a progression step. Slot fills go through compare-and-set, so a step
/// racing another completion for the same slot fails with [`StoreError::SlotTaken`].
pub fn apply_progress<S: Store + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
    progress: &Progress,
) -> StoreResult<()> {
    for write in &progress.writes {
        match write {
            MatchWrite::Fill {
                match_id,
                slot,
                entrant,
            } => store.fill_slot(*match_id, *slot, *entrant)?,
            MatchWrite::Patch { match_id, patch } => store.update(*match_id, patch)?,
        }
    }
    if !progress.created.is_empty() {
        store.create_many(progress.created.clone())?;
    }
    if !progress.standings.is_empty() {
        store.upsert_standings(progress.standings.clone())?;
    }
    for &(team_id, rating) in &progress.team_ratings {
        store.set_team_rating(team_id, rating)?;
    }
    if let Some(status) = progress.status {
        let mut tournament = store.tournament(tournament_id)?;
        tournament.status = status;
        store.save_tournament(tournament)?;
    }
    Ok(())
}
