//! Padel tournament engine: library with models, format generation and progression logic.

pub mod config;
pub mod error;
pub mod import;
pub mod logic;
pub mod models;
pub mod service;
pub mod store;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult, Entity, ImportError, StoreError};
pub use logic::{
    cancel_match, complete_match, detect_conflicts, generate_double_elimination, generate_groups,
    generate_playoffs, generate_round_robin, generate_rotations, generate_single_elimination,
    launch_tournament, optimize_schedule, record_result, record_walkover, rotation_standings,
    schedule_matches, seed_bracket, standings_for_group, start_match, Launch, Progress,
};
pub use models::{
    Category, CategoryId, Court, CourtId, Entrant, GameMatch, Group, GroupId, MatchId, MatchMeta,
    MatchState, Player, PlayerId, Ranking, RankingKey, RankingScope, SetScore, Signup, Slot, Stage,
    Standing, Team, TeamId, Tournament, TournamentFormat, TournamentId, TournamentSnapshot,
    TournamentStatus,
};
pub use service::TournamentService;
pub use store::{MemoryStore, Store};
