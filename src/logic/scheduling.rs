//! Court and time assignment, conflict detection and schedule optimization.
//!
//! A pass keeps two availability maps (court -> next free instant, player -> next free instant)
//! and places each match at the earliest instant every map allows, inside the tournament window
//! and the court's daily window. Matches that cannot be placed are reported, not failed.

use crate::config::ScheduleConfig;
use crate::error::{EngineError, EngineResult};
use crate::logic::outcome::{MatchPatch, MatchWrite};
use crate::models::{
    Court, CourtId, GameMatch, MatchId, MatchState, PlayerId, Tournament, TournamentSnapshot,
};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A match placed on a court.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub match_id: MatchId,
    pub court_id: CourtId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum ConflictKind {
    /// No court and time fit the match.
    Unschedulable,
    /// A player is booked in two overlapping matches.
    Player(PlayerId),
    /// A court hosts two overlapping matches.
    Court(CourtId),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingConflict {
    pub match_id: MatchId,
    pub other_match_id: Option<MatchId>,
    pub kind: ConflictKind,
    pub reason: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub assignments: Vec<Assignment>,
    pub conflicts: Vec<SchedulingConflict>,
}

impl ScheduleOutcome {
    /// One court/time patch per assignment.
    pub fn writes(&self) -> Vec<MatchWrite> {
        self.assignments
            .iter()
            .map(|a| MatchWrite::Patch {
                match_id: a.match_id,
                patch: MatchPatch::schedule(Some(a.court_id), Some(a.start)),
            })
            .collect()
    }
}

/// Estimated length of a match: the rotation duration if it carries one, else by best-of.
pub fn estimated_duration(game: &GameMatch, config: &ScheduleConfig) -> Duration {
    let minutes = game
        .duration_minutes_hint()
        .unwrap_or_else(|| config.duration_for_best_of(game.best_of));
    Duration::minutes(i64::from(minutes))
}

/// Earliest start at or after `from` where `duration` fits the court's daily window without
/// running past `deadline`. A missing bound leaves that side of the day open: no `available_from`
/// opens at midnight, no `available_to` closes at the next midnight.
fn fit_court_window(
    court: &Court,
    from: DateTime<Utc>,
    duration: Duration,
    deadline: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if court.available_from.is_none() && court.available_to.is_none() {
        return (from + duration <= deadline).then_some(from);
    }
    let open = court.available_from.unwrap_or(NaiveTime::MIN);
    if court.available_to.is_some_and(|close| close <= open) {
        return None;
    }
    let at = |day: chrono::NaiveDate, time: NaiveTime| day.and_time(time).and_utc();
    let closing = |day: chrono::NaiveDate| match court.available_to {
        Some(close) => Some(at(day, close)),
        None => day.succ_opt().map(|next| at(next, NaiveTime::MIN)),
    };

    let mut day = from.date_naive();
    loop {
        let start = from.max(at(day, open));
        let end = start + duration;
        if end > deadline || start > deadline {
            return None;
        }
        if end <= closing(day)? {
            return Some(start);
        }
        day = day.succ_opt()?;
    }
}

/// Both teams known, still pending and not yet placed.
fn needs_schedule(game: &GameMatch) -> bool {
    game.state == MatchState::Pending && game.scheduled_at.is_none() && game.teams().is_some()
}

/// Assign courts and start times to every schedulable match of the snapshot.
///
/// Matches already holding a court and time keep them and block their court and players.
/// Matches are taken in ascending round key, then match number.
pub fn schedule_matches(
    snapshot: &TournamentSnapshot,
    courts: &[Court],
    config: &ScheduleConfig,
) -> EngineResult<ScheduleOutcome> {
    if courts.is_empty() {
        return Err(EngineError::NoCourts);
    }
    let tournament = &snapshot.tournament;
    let mut pass = Pass::new(tournament, config);
    for game in &snapshot.matches {
        if game.state == MatchState::Cancelled {
            continue;
        }
        if let (Some(court_id), Some(start)) = (game.court_id, game.scheduled_at) {
            let end = start + estimated_duration(game, config);
            pass.book(court_id, &snapshot.match_players(game), end);
        }
    }

    let mut queue: Vec<&GameMatch> = snapshot.matches.iter().filter(|m| needs_schedule(m)).collect();
    queue.sort_by_key(|m| (m.round(), m.match_number));

    let mut outcome = ScheduleOutcome::default();
    for game in queue {
        let players = snapshot.match_players(game);
        match pass.place(game, &players, courts) {
            Some(assignment) => outcome.assignments.push(assignment),
            None => {
                log::warn!("No court/time fits match {} ({:?})", game.id, game.stage);
                outcome.conflicts.push(SchedulingConflict {
                    match_id: game.id,
                    other_match_id: None,
                    kind: ConflictKind::Unschedulable,
                    reason: format!(
                        "no court free for {} minutes before {}",
                        estimated_duration(game, config).num_minutes(),
                        tournament.end_at
                    ),
                });
            }
        }
    }
    log::info!(
        "Scheduled {} matches on {} courts ({} conflicts)",
        outcome.assignments.len(),
        courts.len(),
        outcome.conflicts.len()
    );
    Ok(outcome)
}

/// Mutable availability state of one scheduling pass.
struct Pass<'a> {
    tournament: &'a Tournament,
    config: &'a ScheduleConfig,
    court_free: HashMap<CourtId, DateTime<Utc>>,
    player_free: HashMap<PlayerId, DateTime<Utc>>,
}

impl<'a> Pass<'a> {
    fn new(tournament: &'a Tournament, config: &'a ScheduleConfig) -> Self {
        Self {
            tournament,
            config,
            court_free: HashMap::new(),
            player_free: HashMap::new(),
        }
    }

    fn book(&mut self, court_id: CourtId, players: &[PlayerId], end: DateTime<Utc>) {
        let court_ready = end + Duration::minutes(i64::from(self.config.court_buffer_minutes));
        let player_ready = end + Duration::minutes(i64::from(self.config.player_buffer_minutes));
        let slot = self.court_free.entry(court_id).or_insert(court_ready);
        *slot = (*slot).max(court_ready);
        for &player in players {
            let slot = self.player_free.entry(player).or_insert(player_ready);
            *slot = (*slot).max(player_ready);
        }
    }

    fn place(&mut self, game: &GameMatch, players: &[PlayerId], courts: &[Court]) -> Option<Assignment> {
        let start = self.tournament.start_at;
        let duration = estimated_duration(game, self.config);
        let players_ready = players
            .iter()
            .filter_map(|p| self.player_free.get(p))
            .fold(start, |acc, &t| acc.max(t));

        let mut best: Option<(DateTime<Utc>, &Court)> = None;
        for court in courts {
            let court_ready = self.court_free.get(&court.id).copied().unwrap_or(start);
            let from = court_ready.max(players_ready);
            let Some(at) = fit_court_window(court, from, duration, self.tournament.end_at) else {
                continue;
            };
            if best.map_or(true, |(t, _)| at < t) {
                best = Some((at, court));
            }
        }

        let (at, court) = best?;
        let end = at + duration;
        self.book(court.id, players, end);
        Some(Assignment {
            match_id: game.id,
            court_id: court.id,
            start: at,
            end,
        })
    }
}

/// Pairwise check of every scheduled, non-cancelled match for shared players and courts.
pub fn detect_conflicts(snapshot: &TournamentSnapshot, config: &ScheduleConfig) -> Vec<SchedulingConflict> {
    let scheduled: Vec<(&GameMatch, DateTime<Utc>, DateTime<Utc>, Vec<PlayerId>)> = snapshot
        .matches
        .iter()
        .filter(|m| m.state != MatchState::Cancelled)
        .filter_map(|m| {
            let start = m.scheduled_at?;
            Some((m, start, start + estimated_duration(m, config), snapshot.match_players(m)))
        })
        .collect();

    let mut conflicts = Vec::new();
    for (i, (a, a_start, a_end, a_players)) in scheduled.iter().enumerate() {
        for (b, b_start, b_end, b_players) in &scheduled[i + 1..] {
            if !(a_start < b_end && b_start < a_end) {
                continue;
            }
            for player in a_players.iter().filter(|p| b_players.contains(p)) {
                conflicts.push(SchedulingConflict {
                    match_id: a.id,
                    other_match_id: Some(b.id),
                    kind: ConflictKind::Player(*player),
                    reason: format!("{} is booked in both matches", snapshot.player_name(*player)),
                });
            }
            if let (Some(court), Some(other)) = (a.court_id, b.court_id) {
                if court == other {
                    conflicts.push(SchedulingConflict {
                        match_id: a.id,
                        other_match_id: Some(b.id),
                        kind: ConflictKind::Court(court),
                        reason: format!("court overlaps between {a_start} and {b_end}"),
                    });
                }
            }
        }
    }
    conflicts
}

/// Result of re-running scheduling with tighter buffers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Optimization {
    /// Pending matches whose court and time were cleared before rescheduling.
    pub cleared: Vec<MatchId>,
    pub outcome: ScheduleOutcome,
    pub original_span_minutes: Option<i64>,
    pub optimized_span_minutes: Option<i64>,
}

impl Optimization {
    /// Clearing patches first, then the new assignments.
    pub fn writes(&self) -> Vec<MatchWrite> {
        self.cleared
            .iter()
            .map(|&match_id| MatchWrite::Patch {
                match_id,
                patch: MatchPatch::schedule(None, None),
            })
            .chain(self.outcome.writes())
            .collect()
    }
}

/// Minutes from the first scheduled start to the last scheduled end.
fn span_minutes(snapshot: &TournamentSnapshot, config: &ScheduleConfig) -> Option<i64> {
    let intervals = snapshot.matches.iter().filter_map(|m| {
        let start = m.scheduled_at?;
        Some((start, start + estimated_duration(m, config)))
    });
    let (first, last) = intervals.fold(None, |acc: Option<(DateTime<Utc>, DateTime<Utc>)>, (s, e)| {
        Some(acc.map_or((s, e), |(lo, hi)| (lo.min(s), hi.max(e))))
    })?;
    Some((last - first).num_minutes())
}

/// Clear the assignments of pending matches and schedule again with the optimized buffers.
pub fn optimize_schedule(
    snapshot: &TournamentSnapshot,
    courts: &[Court],
    config: &ScheduleConfig,
) -> EngineResult<Optimization> {
    let original_span_minutes = span_minutes(snapshot, config);

    let mut working = snapshot.clone();
    let mut cleared = Vec::new();
    for game in working.matches.iter_mut() {
        if game.state == MatchState::Pending && (game.scheduled_at.is_some() || game.court_id.is_some()) {
            game.scheduled_at = None;
            game.court_id = None;
            cleared.push(game.id);
        }
    }

    let tight = config.tightened();
    let outcome = schedule_matches(&working, courts, &tight)?;
    for assignment in &outcome.assignments {
        if let Ok(game) = working.game_mut(assignment.match_id) {
            game.court_id = Some(assignment.court_id);
            game.scheduled_at = Some(assignment.start);
        }
    }
    let optimized_span_minutes = span_minutes(&working, &tight);
    log::info!(
        "Schedule optimized: span {:?} -> {:?} minutes",
        original_span_minutes,
        optimized_span_minutes
    );
    Ok(Optimization {
        cleared,
        outcome,
        original_span_minutes,
        optimized_span_minutes,
    })
}

/// Spread courts over matches in turn, without times.
pub fn assign_courts(matches: &[&GameMatch], courts: &[Court]) -> EngineResult<Vec<(MatchId, CourtId)>> {
    if courts.is_empty() {
        return Err(EngineError::NoCourts);
    }
    Ok(matches
        .iter()
        .zip(courts.iter().cycle())
        .map(|(game, court)| (game.id, court.id))
        .collect())
}
