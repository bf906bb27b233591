//! Americano/Mexicano rotations: individual players, partnerships synthesized per round.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::logic::group_play::circle_pairings;
use crate::models::{
    pair_key, CategoryId, Entrant, GameMatch, MatchMeta, MatchState, Player, PlayerId, Stage, Team,
    TeamId, Tournament, TournamentFormat, TournamentSnapshot,
};
use chrono::Duration;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

const BASE_SCORE: i32 = 100;
const REPEAT_PARTNER_PENALTY: i32 = 50;
const CROSS_PARTNER_PENALTY: i32 = 10;

/// Who has partnered or faced whom so far. Threaded through each round's computation.
#[derive(Clone, Debug, Default)]
pub struct RotationHistory {
    partners: HashSet<(PlayerId, PlayerId)>,
    opponents: HashMap<(PlayerId, PlayerId), u32>,
}

impl RotationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_partnered(&self, a: PlayerId, b: PlayerId) -> bool {
        self.partners.contains(&pair_key(a, b))
    }

    pub fn times_opposed(&self, a: PlayerId, b: PlayerId) -> u32 {
        self.opponents.get(&pair_key(a, b)).copied().unwrap_or(0)
    }

    pub fn record(&mut self, pairing: &Pairing) {
        for side in [pairing.team_a, pairing.team_b] {
            self.partners.insert(pair_key(side[0], side[1]));
        }
        for a in pairing.team_a {
            for b in pairing.team_b {
                *self.opponents.entry(pair_key(a, b)).or_insert(0) += 1;
            }
        }
    }
}

/// One 2v2 grouping.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pairing {
    pub team_a: [PlayerId; 2],
    pub team_b: [PlayerId; 2],
}

/// Desirability of a grouping: 100, minus 50 per side whose players already partnered, minus 10
/// per cross-side pair that already partnered.
pub fn pairing_score(history: &RotationHistory, pairing: &Pairing) -> i32 {
    let mut score = BASE_SCORE;
    for side in [pairing.team_a, pairing.team_b] {
        if history.has_partnered(side[0], side[1]) {
            score -= REPEAT_PARTNER_PENALTY;
        }
    }
    for a in pairing.team_a {
        for b in pairing.team_b {
            if history.has_partnered(a, b) {
                score -= CROSS_PARTNER_PENALTY;
            }
        }
    }
    score
}

/// Build one round from this round's partnerships: repeatedly take the best-scoring pair of
/// partnerships. A leftover partnership (when their count is odd) sits the round out.
pub fn plan_round(history: &RotationHistory, partnerships: &[[PlayerId; 2]]) -> Vec<Pairing> {
    let mut remaining: Vec<[PlayerId; 2]> = partnerships.to_vec();
    let mut round = Vec::new();
    while remaining.len() >= 2 {
        let mut best: Option<(i32, usize, usize)> = None;
        for i in 0..remaining.len() {
            for j in i + 1..remaining.len() {
                let candidate = Pairing {
                    team_a: remaining[i],
                    team_b: remaining[j],
                };
                let score = pairing_score(history, &candidate);
                if best.map_or(true, |(s, _, _)| score > s) {
                    best = Some((score, i, j));
                }
            }
        }
        let (i, j) = best.map_or((0, 1), |(_, i, j)| (i, j));
        let team_b = remaining.remove(j);
        let team_a = remaining.remove(i);
        round.push(Pairing { team_a, team_b });
    }
    round
}

/// Plan every round for `players` (already in rotation order).
///
/// Partnerships are fixed first by the circle method over players, so each pair of players
/// partners exactly once across `n - 1` rounds. Only the grouping of those partnerships into
/// matches is greedy by [`pairing_score`]. This is stricter than a greedy pick over every 4-player
/// grouping: a side can never repeat a partnership, so the repeat-partner penalty never applies
/// here and only the cross-side penalty steers the grouping. [`plan_round`] still honours the full
/// score for callers that bring their own partnerships.
pub fn plan_rotations(players: &[PlayerId], history: &mut RotationHistory) -> Vec<Vec<Pairing>> {
    circle_pairings(players.len())
        .into_iter()
        .map(|pairs| {
            let partnerships: Vec<[PlayerId; 2]> =
                pairs.into_iter().map(|(a, b)| [players[a], players[b]]).collect();
            let round = plan_round(history, &partnerships);
            for pairing in &round {
                history.record(pairing);
            }
            round
        })
        .collect()
}

/// Teams synthesized for the partnerships plus the rotation matches.
#[derive(Clone, Debug, Default)]
pub struct RotationDraw {
    pub teams: Vec<Team>,
    pub matches: Vec<GameMatch>,
    pub history: RotationHistory,
}

/// Generate Americano or Mexicano rotations for the players of one category.
///
/// Needs an even number of at least four players. Mexicano also schedules each round from the
/// tournament start, spaced by the per-match duration plus the rotation buffer.
pub fn generate_rotations<R: Rng + ?Sized>(
    tournament: &Tournament,
    category_id: CategoryId,
    players: &[&Player],
    config: &EngineConfig,
    rng: &mut R,
) -> EngineResult<RotationDraw> {
    let format = tournament.format;
    if players.len() < 4 || players.len() % 2 != 0 {
        return Err(EngineError::InvalidTeamCount {
            format,
            count: players.len(),
            reason: "an even number of at least 4 players",
        });
    }

    let minutes = config.rotation.match_minutes;
    let slot_minutes = i64::from(minutes + config.rotation.rotation_buffer_minutes);
    let round_count = players.len() as i64 - 1;
    if format == TournamentFormat::Mexicano {
        if !(5..=30).contains(&minutes) {
            return Err(EngineError::InvalidTimeRange(format!(
                "match duration {minutes} min outside 5..=30"
            )));
        }
        let last_end = tournament.start_at
            + Duration::minutes(slot_minutes * (round_count - 1) + i64::from(minutes));
        if last_end > tournament.end_at {
            return Err(EngineError::InvalidTimeRange(format!(
                "{round_count} rounds end at {last_end}, after the tournament window closes at {}",
                tournament.end_at
            )));
        }
    }

    let mut order: Vec<PlayerId> = players.iter().map(|p| p.id).collect();
    order.shuffle(rng);
    let names: HashMap<PlayerId, &str> = players.iter().map(|p| (p.id, p.name.as_str())).collect();

    let mut history = RotationHistory::new();
    let rounds = plan_rotations(&order, &mut history);

    let mut teams: HashMap<(PlayerId, PlayerId), Team> = HashMap::new();
    let mut team_order: Vec<(PlayerId, PlayerId)> = Vec::new();
    let mut matches = Vec::new();
    for (r, round) in rounds.iter().enumerate() {
        let scheduled_at = (format == TournamentFormat::Mexicano)
            .then(|| tournament.start_at + Duration::minutes(slot_minutes * r as i64));
        for (court, pairing) in round.iter().enumerate() {
            let mut sides = [TeamId::nil(); 2];
            for (side, pair) in [pairing.team_a, pairing.team_b].into_iter().enumerate() {
                let key = pair_key(pair[0], pair[1]);
                if !teams.contains_key(&key) {
                    let name = format!(
                        "{} / {}",
                        names.get(&pair[0]).copied().unwrap_or("?"),
                        names.get(&pair[1]).copied().unwrap_or("?")
                    );
                    let team = Team::new(tournament.id, category_id, name, pair)?;
                    teams.insert(key, team);
                    team_order.push(key);
                }
                sides[side] = teams[&key].id;
            }
            let meta = MatchMeta::Americano {
                court: court as u32 + 1,
                duration_minutes: minutes,
            };
            let mut game = GameMatch::new(
                tournament.id,
                category_id,
                Stage::Pool(r as u32 + 1),
                court as u32 + 1,
                config.formats.americano_best_of,
                meta,
            )
            .with_teams(Entrant::Team(sides[0]), Entrant::Team(sides[1]));
            game.scheduled_at = scheduled_at;
            matches.push(game);
        }
    }

    let teams = team_order
        .into_iter()
        .filter_map(|key| teams.remove(&key))
        .collect();
    Ok(RotationDraw {
        teams,
        matches,
        history,
    })
}

/// Individual standing row for rotation formats. Computed on demand, never stored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStanding {
    pub player_id: PlayerId,
    pub name: String,
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    pub points_for: u32,
    pub points_against: u32,
    pub differential: i64,
    pub partners: BTreeSet<PlayerId>,
    pub opponents: BTreeSet<PlayerId>,
    pub position: u32,
}

/// Per-player aggregates over the Done, Walkover and Ongoing matches of a category.
///
/// Sorted by wins, differential and points-for (descending), then name.
pub fn rotation_standings(snapshot: &TournamentSnapshot, category_id: CategoryId) -> Vec<PlayerStanding> {
    let mut rows: HashMap<PlayerId, PlayerStanding> = HashMap::new();
    for team in snapshot.teams_in(category_id) {
        for player in team.players {
            rows.entry(player).or_insert_with(|| PlayerStanding {
                player_id: player,
                name: snapshot.player_name(player),
                ..PlayerStanding::default()
            });
        }
    }

    let counted = snapshot
        .matches_in(category_id)
        .filter(|m| m.state.is_decided() || m.state == MatchState::Ongoing);
    for game in counted {
        let Some((a, b)) = game.teams() else { continue };
        let (Ok(team_a), Ok(team_b)) = (snapshot.team(a), snapshot.team(b)) else {
            continue;
        };
        let (games_a, games_b) = game.games();
        for (team, other, scored, conceded) in
            [(team_a, team_b, games_a, games_b), (team_b, team_a, games_b, games_a)]
        {
            for (i, &player) in team.players.iter().enumerate() {
                let row = rows.entry(player).or_insert_with(|| PlayerStanding {
                    player_id: player,
                    name: snapshot.player_name(player),
                    ..PlayerStanding::default()
                });
                row.played += 1;
                match game.winner {
                    Some(w) if w == team.id => row.wins += 1,
                    Some(_) => row.losses += 1,
                    None => {}
                }
                row.points_for += scored;
                row.points_against += conceded;
                row.partners.insert(team.players[1 - i]);
                row.opponents.extend(other.players);
            }
        }
    }

    let mut table: Vec<PlayerStanding> = rows
        .into_values()
        .map(|mut row| {
            row.differential = i64::from(row.points_for) - i64::from(row.points_against);
            row
        })
        .collect();
    table.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then_with(|| b.differential.cmp(&a.differential))
            .then_with(|| b.points_for.cmp(&a.points_for))
            .then_with(|| a.name.cmp(&b.name))
    });
    for (i, row) in table.iter_mut().enumerate() {
        row.position = i as u32 + 1;
    }
    table
}
