//! Group stage: round-robin match generation (circle method) and group draws.

use crate::config::FormatConfig;
use crate::error::{EngineError, EngineResult};
use crate::logic::seeding::rank_teams;
use crate::models::{
    group_name, CategoryId, Entrant, GameMatch, Group, MatchMeta, Stage, Standing, Team, TeamId,
    TournamentFormat, TournamentId,
};
use rand::Rng;
use std::collections::HashMap;

/// Groups, their matches and zeroed standings, as produced at launch.
#[derive(Clone, Debug, Default)]
pub struct PoolDraw {
    pub groups: Vec<Group>,
    pub matches: Vec<GameMatch>,
    pub standings: Vec<Standing>,
}

impl PoolDraw {
    fn extend(&mut self, other: PoolDraw) {
        self.groups.extend(other.groups);
        self.matches.extend(other.matches);
        self.standings.extend(other.standings);
    }
}

/// Circle method over `n` entrants: one entrant stays fixed while the rest rotate.
///
/// Odd counts get a phantom bye entry; pairings against it are dropped. Returns one list of
/// index pairs per round: `n - 1` rounds for even `n`, `n` rounds for odd `n`.
pub fn circle_pairings(n: usize) -> Vec<Vec<(usize, usize)>> {
    if n < 2 {
        return Vec::new();
    }
    let mut slots: Vec<Option<usize>> = (0..n).map(Some).collect();
    if n % 2 == 1 {
        slots.push(None);
    }
    let m = slots.len();
    let mut rounds = Vec::with_capacity(m - 1);
    for _ in 0..m - 1 {
        let pairs = (0..m / 2)
            .filter_map(|i| match (slots[i], slots[m - 1 - i]) {
                (Some(a), Some(b)) => Some((a, b)),
                _ => None,
            })
            .collect();
        rounds.push(pairs);
        slots[1..].rotate_right(1);
    }
    rounds
}

/// Round robin over all teams of a category: one group, every pair meets once.
pub fn generate_round_robin(
    tournament_id: TournamentId,
    category_id: CategoryId,
    teams: &[&Team],
    config: &FormatConfig,
) -> EngineResult<PoolDraw> {
    if teams.len() < 2 {
        return Err(EngineError::InvalidTeamCount {
            format: TournamentFormat::RoundRobin,
            count: teams.len(),
            reason: "at least 2 teams",
        });
    }
    let ids: Vec<TeamId> = teams.iter().map(|t| t.id).collect();
    let group = Group::new(tournament_id, category_id, group_name(0), ids);
    Ok(draw_group(group, teams, config.round_robin_best_of))
}

/// Split a category into groups of about `group_size` teams and play a round robin in each.
///
/// Teams are ranked (seeds first, then shuffled) and dealt into groups snake-wise, so group
/// strength stays balanced.
pub fn generate_groups<R: Rng + ?Sized>(
    tournament_id: TournamentId,
    category_id: CategoryId,
    teams: &[&Team],
    config: &FormatConfig,
    rng: &mut R,
) -> EngineResult<PoolDraw> {
    let group_size = config.group_size.max(2);
    if teams.len() < 2 {
        return Err(EngineError::InvalidTeamCount {
            format: TournamentFormat::GroupsPlayoffs,
            count: teams.len(),
            reason: "at least 2 teams",
        });
    }
    let group_count = teams.len().div_ceil(group_size).min(teams.len() / 2);
    let ranked = rank_teams(teams, rng);

    let mut members: Vec<Vec<TeamId>> = vec![Vec::new(); group_count];
    for (i, id) in ranked.into_iter().enumerate() {
        let (row, col) = (i / group_count, i % group_count);
        let g = if row % 2 == 0 { col } else { group_count - 1 - col };
        members[g].push(id);
    }

    let by_id: HashMap<TeamId, &Team> = teams.iter().map(|t| (t.id, *t)).collect();
    let mut draw = PoolDraw::default();
    for (index, ids) in members.into_iter().enumerate() {
        let group_teams: Vec<&Team> = ids.iter().filter_map(|id| by_id.get(id).copied()).collect();
        let group = Group::new(tournament_id, category_id, group_name(index), ids);
        draw.extend(draw_group(group, &group_teams, config.round_robin_best_of));
    }
    Ok(draw)
}

fn draw_group(group: Group, teams: &[&Team], best_of: u8) -> PoolDraw {
    let mut matches = Vec::new();
    for (round, pairs) in circle_pairings(teams.len()).into_iter().enumerate() {
        for (number, (a, b)) in pairs.into_iter().enumerate() {
            let meta = MatchMeta::RoundRobin {
                group_name: group.name.clone(),
            };
            let game = GameMatch::new(
                group.tournament_id,
                group.category_id,
                Stage::Pool(round as u32 + 1),
                number as u32 + 1,
                best_of,
                meta,
            )
            .in_group(group.id)
            .with_teams(Entrant::Team(teams[a].id), Entrant::Team(teams[b].id));
            matches.push(game);
        }
    }
    let standings = teams
        .iter()
        .map(|t| Standing::zeroed(group.id, t.id, t.name.clone()))
        .collect();
    PoolDraw {
        groups: vec![group],
        matches,
        standings,
    }
}
