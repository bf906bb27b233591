//! Tournament business logic: seeding, format generation, standings, ratings, progression and scheduling.

pub mod americano;
pub mod bracket;
mod final_selection;
mod finals;
mod group_play;
pub mod outcome;
mod progression;
pub mod rating;
pub mod scheduling;
pub mod seeding;
mod setup;
mod standings;

pub use americano::{
    generate_rotations, pairing_score, plan_rotations, rotation_standings, Pairing, PlayerStanding,
    RotationDraw, RotationHistory,
};
pub use bracket::BracketLayout;
pub use final_selection::{generate_playoffs, playoff_qualifiers};
pub use finals::{generate_double_elimination, generate_single_elimination};
pub use group_play::{circle_pairings, generate_groups, generate_round_robin, PoolDraw};
pub use outcome::{MatchPatch, MatchWrite, Progress};
pub use progression::{
    cancel_match, complete_match, record_result, record_walkover, start_match, winning_side,
};
pub use rating::{expected_score, rate_match, rating_delta, team_deltas, RatingChange};
pub use scheduling::{
    assign_courts, detect_conflicts, optimize_schedule, schedule_matches, Assignment, ConflictKind,
    Optimization, ScheduleOutcome, SchedulingConflict,
};
pub use seeding::{bracket_size, place_ranked, rank_teams, seed_bracket, seed_order};
pub use setup::{launch_tournament, Launch};
pub use standings::{compute_standings, group_complete, standings_for_group};
