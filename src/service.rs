//! Async service around the engine. Each step for a tournament runs under that tournament's lock:
//! load a snapshot from the store, run the engine, write back what it reports. Different
//! tournaments don't share a lock and proceed in parallel.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, Entity, StoreError};
use crate::logic::{
    self, Launch, MatchWrite, Optimization, PlayerStanding, Progress, ScheduleOutcome,
    SchedulingConflict,
};
use crate::models::{
    CategoryId, Court, MatchId, Player, Ranking, RankingScope, SetScore, Signup, TeamId,
    TournamentId, TournamentSnapshot, TournamentStatus,
};
use crate::store::{apply_progress, load_snapshot, Store};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

pub struct TournamentService<S> {
    store: Arc<S>,
    config: EngineConfig,
    locks: StdMutex<HashMap<TournamentId, Arc<Mutex<()>>>>,
}

impl<S: Store> TournamentService<S> {
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self {
            store,
            config,
            locks: StdMutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn lock_for(&self, tournament_id: TournamentId) -> EngineResult<Arc<Mutex<()>>> {
        let mut locks = self.locks.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(locks.entry(tournament_id).or_default().clone())
    }

    /// Forget the lock of a tournament that is over or unknown, so the map only tracks
    /// tournaments that can still change. Writes to a finished or cancelled tournament fail their
    /// status check whichever lock they hold.
    fn release_if_settled(&self, tournament_id: TournamentId) -> EngineResult<()> {
        let settled = match self.store.tournament(tournament_id) {
            Ok(tournament) => tournament.status.is_terminal(),
            Err(StoreError::NotFound { .. }) => true,
            Err(e) => return Err(e.into()),
        };
        if settled {
            self.locks
                .lock()
                .map_err(|_| StoreError::Poisoned)?
                .remove(&tournament_id);
            log::debug!("Released lock of tournament {tournament_id}");
        }
        Ok(())
    }

    /// Run one step under the tournament's lock.
    async fn locked<T>(
        &self,
        tournament_id: TournamentId,
        step: impl FnOnce() -> EngineResult<T>,
    ) -> EngineResult<T> {
        let lock = self.lock_for(tournament_id)?;
        let result = {
            let _guard = lock.lock().await;
            step()
        };
        if let Err(e) = self.release_if_settled(tournament_id) {
            log::warn!("Could not check tournament {tournament_id} after a step: {e}");
        }
        result
    }

    fn snapshot(&self, tournament_id: TournamentId) -> EngineResult<TournamentSnapshot> {
        Ok(load_snapshot(&*self.store, tournament_id)?)
    }

    fn apply_writes(&self, writes: &[MatchWrite]) -> EngineResult<()> {
        for write in writes {
            match write {
                MatchWrite::Fill {
                    match_id,
                    slot,
                    entrant,
                } => self.store.fill_slot(*match_id, *slot, *entrant)?,
                MatchWrite::Patch { match_id, patch } => self.store.update(*match_id, patch)?,
            }
        }
        Ok(())
    }

    /// Load, run one progression step and write back what it changed. Callers hold the lock.
    fn progress_step(
        &self,
        tournament_id: TournamentId,
        step: impl FnOnce(&mut TournamentSnapshot, &S, &EngineConfig) -> EngineResult<Progress>,
    ) -> EngineResult<Progress> {
        let mut snapshot = self.snapshot(tournament_id)?;
        let progress = step(&mut snapshot, &*self.store, &self.config)?;
        apply_progress(&*self.store, tournament_id, &progress)?;
        Ok(progress)
    }

    /// Draft -> Registration.
    pub async fn open_registration(&self, tournament_id: TournamentId) -> EngineResult<()> {
        self.locked(tournament_id, || {
            let mut tournament = self.store.tournament(tournament_id)?;
            tournament.open_registration()?;
            self.store.save_tournament(tournament)?;
            Ok(())
        })
        .await
    }

    /// Sign players up individually for a category of a tournament still in Draft or
    /// Registration. Rotation formats build their partnerships from these at launch.
    pub async fn sign_up(
        &self,
        tournament_id: TournamentId,
        category_id: CategoryId,
        players: Vec<Player>,
    ) -> EngineResult<Vec<Signup>> {
        self.locked(tournament_id, || {
            let tournament = self.store.tournament(tournament_id)?;
            if !matches!(
                tournament.status,
                TournamentStatus::Draft | TournamentStatus::Registration
            ) {
                return Err(EngineError::InvalidState {
                    expected: "draft or registration",
                    actual: tournament.status,
                });
            }
            if !self
                .store
                .categories(tournament_id)?
                .iter()
                .any(|c| c.id == category_id)
            {
                return Err(EngineError::not_found(Entity::Category, category_id));
            }

            let signups: Vec<Signup> = players
                .iter()
                .map(|p| Signup {
                    tournament_id,
                    category_id,
                    player_id: p.id,
                })
                .collect();
            self.store.save_players(players)?;
            self.store.sign_up(signups.clone())?;
            log::info!(
                "Signed {} players up for category {category_id} of tournament {tournament_id}",
                signups.len()
            );
            Ok(signups)
        })
        .await
    }

    /// Generate every category and go live.
    pub async fn launch(&self, tournament_id: TournamentId) -> EngineResult<Launch> {
        self.locked(tournament_id, || {
            let mut snapshot = self.snapshot(tournament_id)?;
            let mut rng = StdRng::from_entropy();
            let launch = logic::launch_tournament(&mut snapshot, &self.config, &mut rng)?;

            self.store.save_teams(launch.teams.clone())?;
            self.store.create_groups(launch.groups.clone())?;
            self.store.upsert_standings(launch.standings.clone())?;
            self.store.create_many(launch.matches.clone())?;
            self.store.save_tournament(snapshot.tournament)?;
            Ok(launch)
        })
        .await
    }

    /// Cancel a tournament that has not finished.
    pub async fn cancel(&self, tournament_id: TournamentId) -> EngineResult<()> {
        self.locked(tournament_id, || {
            let mut tournament = self.store.tournament(tournament_id)?;
            tournament.cancel()?;
            self.store.save_tournament(tournament)?;
            Ok(())
        })
        .await
    }

    pub async fn start_match(&self, tournament_id: TournamentId, match_id: MatchId) -> EngineResult<()> {
        self.locked(tournament_id, || {
            let mut snapshot = self.snapshot(tournament_id)?;
            let write = logic::start_match(&mut snapshot, match_id)?;
            self.apply_writes(&[write])
        })
        .await
    }

    /// Record set scores, then progress the tournament.
    pub async fn record_result(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        sets: Vec<SetScore>,
    ) -> EngineResult<Progress> {
        self.locked(tournament_id, || {
            self.progress_step(tournament_id, |snapshot, store, config| {
                let write = logic::record_result(snapshot, match_id, sets)?;
                let mut progress = logic::complete_match(snapshot, store, match_id, config)?;
                progress.writes.insert(0, write);
                Ok(progress)
            })
        })
        .await
    }

    pub async fn record_walkover(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        no_show: TeamId,
    ) -> EngineResult<Progress> {
        self.locked(tournament_id, || {
            self.progress_step(tournament_id, |snapshot, store, config| {
                logic::record_walkover(snapshot, store, match_id, no_show, config)
            })
        })
        .await
    }

    pub async fn cancel_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
    ) -> EngineResult<Progress> {
        self.locked(tournament_id, || {
            self.progress_step(tournament_id, |snapshot, _, config| {
                logic::cancel_match(snapshot, match_id, config)
            })
        })
        .await
    }

    /// Place every schedulable match of a live tournament on a court. Conflicts come back in the
    /// outcome.
    pub async fn schedule(
        &self,
        tournament_id: TournamentId,
        courts: &[Court],
    ) -> EngineResult<ScheduleOutcome> {
        self.locked(tournament_id, || {
            let snapshot = self.snapshot(tournament_id)?;
            snapshot.tournament.ensure_live()?;
            let outcome = logic::schedule_matches(&snapshot, courts, &self.config.scheduling)?;
            self.apply_writes(&outcome.writes())?;
            Ok(outcome)
        })
        .await
    }

    pub async fn optimize_schedule(
        &self,
        tournament_id: TournamentId,
        courts: &[Court],
    ) -> EngineResult<Optimization> {
        self.locked(tournament_id, || {
            let snapshot = self.snapshot(tournament_id)?;
            snapshot.tournament.ensure_live()?;
            let optimization = logic::optimize_schedule(&snapshot, courts, &self.config.scheduling)?;
            self.apply_writes(&optimization.writes())?;
            Ok(optimization)
        })
        .await
    }

    pub async fn detect_conflicts(
        &self,
        tournament_id: TournamentId,
    ) -> EngineResult<Vec<SchedulingConflict>> {
        self.locked(tournament_id, || {
            let snapshot = self.snapshot(tournament_id)?;
            Ok(logic::detect_conflicts(&snapshot, &self.config.scheduling))
        })
        .await
    }

    /// Individual standings of a rotation category.
    pub async fn player_standings(
        &self,
        tournament_id: TournamentId,
        category_id: CategoryId,
    ) -> EngineResult<Vec<PlayerStanding>> {
        let snapshot = self.snapshot(tournament_id)?;
        snapshot.category(category_id)?;
        Ok(logic::rotation_standings(&snapshot, category_id))
    }

    pub fn leaderboard(
        &self,
        scope: RankingScope,
        tournament_id: Option<TournamentId>,
        category_id: Option<CategoryId>,
    ) -> EngineResult<Vec<Ranking>> {
        self.store
            .leaderboard(scope, tournament_id, category_id)
            .map_err(EngineError::from)
    }
}
