//! In-memory store: every table is a `RwLock<HashMap<..>>`.

use super::{
    GroupStore, MatchFilter, MatchStore, RankingStore, StandingStore, StoreResult, TeamStore,
    TournamentStore,
};
use crate::error::{Entity, StoreError};
use crate::logic::outcome::MatchPatch;
use crate::models::{
    Category, CategoryId, Entrant, GameMatch, Group, GroupId, MatchId, Player, PlayerId, Ranking,
    RankingKey, RankingScope, Signup, Slot, Standing, Team, TeamId, Tournament, TournamentId,
};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
pub struct MemoryStore {
    tournaments: RwLock<HashMap<TournamentId, Tournament>>,
    categories: RwLock<HashMap<CategoryId, Category>>,
    teams: RwLock<HashMap<TeamId, Team>>,
    players: RwLock<HashMap<PlayerId, Player>>,
    signups: RwLock<Vec<Signup>>,
    /// Insertion order is kept so `find` is deterministic.
    matches: RwLock<Vec<GameMatch>>,
    groups: RwLock<HashMap<GroupId, Group>>,
    standings: RwLock<HashMap<(GroupId, TeamId), Standing>>,
    rankings: RwLock<HashMap<RankingKey, Ranking>>,
}

fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| StoreError::Poisoned)
}

fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| StoreError::Poisoned)
}

fn not_found(entity: Entity, id: uuid::Uuid) -> StoreError {
    StoreError::NotFound { entity, id }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TournamentStore for MemoryStore {
    fn tournament(&self, id: TournamentId) -> StoreResult<Tournament> {
        read(&self.tournaments)?
            .get(&id)
            .cloned()
            .ok_or(not_found(Entity::Tournament, id))
    }

    fn save_tournament(&self, tournament: Tournament) -> StoreResult<()> {
        write(&self.tournaments)?.insert(tournament.id, tournament);
        Ok(())
    }

    fn categories(&self, tournament_id: TournamentId) -> StoreResult<Vec<Category>> {
        let mut categories: Vec<Category> = read(&self.categories)?
            .values()
            .filter(|c| c.tournament_id == tournament_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    fn save_category(&self, category: Category) -> StoreResult<()> {
        write(&self.categories)?.insert(category.id, category);
        Ok(())
    }
}

impl TeamStore for MemoryStore {
    fn team(&self, id: TeamId) -> StoreResult<Team> {
        read(&self.teams)?
            .get(&id)
            .cloned()
            .ok_or(not_found(Entity::Team, id))
    }

    fn teams(&self, tournament_id: TournamentId) -> StoreResult<Vec<Team>> {
        let mut teams: Vec<Team> = read(&self.teams)?
            .values()
            .filter(|t| t.tournament_id == tournament_id)
            .cloned()
            .collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    fn teams_of_player(&self, player_id: PlayerId) -> StoreResult<Vec<Team>> {
        Ok(read(&self.teams)?
            .values()
            .filter(|t| t.has_player(player_id))
            .cloned()
            .collect())
    }

    fn save_teams(&self, teams: Vec<Team>) -> StoreResult<()> {
        let mut table = write(&self.teams)?;
        for team in teams {
            table.insert(team.id, team);
        }
        Ok(())
    }

    fn set_team_rating(&self, id: TeamId, rating: i32) -> StoreResult<()> {
        write(&self.teams)?
            .get_mut(&id)
            .ok_or(not_found(Entity::Team, id))?
            .rating = rating;
        Ok(())
    }

    fn player(&self, id: PlayerId) -> StoreResult<Player> {
        read(&self.players)?
            .get(&id)
            .cloned()
            .ok_or(not_found(Entity::Player, id))
    }

    fn save_players(&self, players: Vec<Player>) -> StoreResult<()> {
        let mut table = write(&self.players)?;
        for player in players {
            table.insert(player.id, player);
        }
        Ok(())
    }

    fn sign_up(&self, signups: Vec<Signup>) -> StoreResult<()> {
        let mut table = write(&self.signups)?;
        for signup in signups {
            if !table.contains(&signup) {
                table.push(signup);
            }
        }
        Ok(())
    }

    fn signups(&self, tournament_id: TournamentId) -> StoreResult<Vec<Signup>> {
        Ok(read(&self.signups)?
            .iter()
            .filter(|s| s.tournament_id == tournament_id)
            .copied()
            .collect())
    }

    fn tournament_players(&self, tournament_id: TournamentId) -> StoreResult<Vec<Player>> {
        let mut ids: Vec<PlayerId> = self
            .signups(tournament_id)?
            .into_iter()
            .map(|s| s.player_id)
            .collect();
        for team in self.teams(tournament_id)? {
            ids.extend(team.players);
        }
        let mut seen = std::collections::HashSet::new();
        ids.retain(|id| seen.insert(*id));
        ids.into_iter().map(|id| self.player(id)).collect()
    }
}

impl MatchStore for MemoryStore {
    fn create_many(&self, matches: Vec<GameMatch>) -> StoreResult<()> {
        write(&self.matches)?.extend(matches);
        Ok(())
    }

    fn find(&self, filter: &MatchFilter) -> StoreResult<Vec<GameMatch>> {
        Ok(read(&self.matches)?
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }

    fn update(&self, id: MatchId, patch: &MatchPatch) -> StoreResult<()> {
        let mut table = write(&self.matches)?;
        let game = table
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(not_found(Entity::Match, id))?;
        patch.apply(game);
        Ok(())
    }

    fn delete(&self, id: MatchId) -> StoreResult<()> {
        let mut table = write(&self.matches)?;
        let before = table.len();
        table.retain(|m| m.id != id);
        if table.len() == before {
            return Err(not_found(Entity::Match, id));
        }
        Ok(())
    }

    fn fill_slot(&self, id: MatchId, slot: Slot, entrant: Entrant) -> StoreResult<()> {
        let mut table = write(&self.matches)?;
        let game = table
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(not_found(Entity::Match, id))?;
        let current = game.entrant(slot);
        if current == entrant {
            return Ok(());
        }
        if current.is_resolved() {
            return Err(StoreError::SlotTaken { match_id: id, slot });
        }
        *game.entrant_mut(slot) = entrant;
        Ok(())
    }
}

impl GroupStore for MemoryStore {
    fn group(&self, id: GroupId) -> StoreResult<Group> {
        read(&self.groups)?
            .get(&id)
            .cloned()
            .ok_or(not_found(Entity::Group, id))
    }

    fn groups(&self, tournament_id: TournamentId) -> StoreResult<Vec<Group>> {
        let mut groups: Vec<Group> = read(&self.groups)?
            .values()
            .filter(|g| g.tournament_id == tournament_id)
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    fn create_groups(&self, groups: Vec<Group>) -> StoreResult<()> {
        let mut table = write(&self.groups)?;
        for group in groups {
            table.insert(group.id, group);
        }
        Ok(())
    }
}

impl StandingStore for MemoryStore {
    fn upsert_standings(&self, standings: Vec<Standing>) -> StoreResult<()> {
        let mut table = write(&self.standings)?;
        for row in standings {
            table.insert((row.group_id, row.team_id), row);
        }
        Ok(())
    }

    fn standings(&self, group_id: GroupId) -> StoreResult<Vec<Standing>> {
        let mut rows: Vec<Standing> = read(&self.standings)?
            .values()
            .filter(|s| s.group_id == group_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.team_name.cmp(&b.team_name)));
        Ok(rows)
    }
}

impl RankingStore for MemoryStore {
    fn ranking(&self, key: &RankingKey) -> StoreResult<Option<Ranking>> {
        Ok(read(&self.rankings)?.get(key).cloned())
    }

    fn upsert_ranking(&self, ranking: Ranking) -> StoreResult<()> {
        write(&self.rankings)?.insert(ranking.key, ranking);
        Ok(())
    }

    fn leaderboard(
        &self,
        scope: RankingScope,
        tournament_id: Option<TournamentId>,
        category_id: Option<CategoryId>,
    ) -> StoreResult<Vec<Ranking>> {
        let mut rows: Vec<Ranking> = read(&self.rankings)?
            .values()
            .filter(|r| {
                r.key.scope == scope
                    && r.key.tournament_id == tournament_id
                    && r.key.category_id == category_id
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.rating.cmp(&a.rating).then_with(|| b.wins.cmp(&a.wins)));
        Ok(rows)
    }
}
