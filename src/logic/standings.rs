//! Group standings, recomputed from scratch from the group's decided matches.

use crate::error::EngineResult;
use crate::models::{GameMatch, Group, GroupId, Standing, TeamId, TournamentSnapshot};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Standings of one group of a snapshot.
pub fn standings_for_group(
    snapshot: &TournamentSnapshot,
    group_id: GroupId,
) -> EngineResult<Vec<Standing>> {
    let group = snapshot.group(group_id)?;
    let matches: Vec<&GameMatch> = snapshot
        .matches
        .iter()
        .filter(|m| m.group_id == Some(group_id))
        .collect();
    Ok(compute_standings(group, &matches, |id| snapshot.team_name(id)))
}

/// Rank the teams of `group` over its Done/Walkover matches.
///
/// Order: wins; head-to-head when exactly two teams share a win count and one of them won their
/// meetings; point differential; points for; team name. Positions are 1-based.
pub fn compute_standings(
    group: &Group,
    matches: &[&GameMatch],
    team_name: impl Fn(TeamId) -> String,
) -> Vec<Standing> {
    let mut rows: HashMap<TeamId, Standing> = group
        .team_ids
        .iter()
        .map(|&id| (id, Standing::zeroed(group.id, id, team_name(id))))
        .collect();

    let decided: Vec<&GameMatch> = matches
        .iter()
        .copied()
        .filter(|m| m.group_id == Some(group.id) && m.state.is_decided() && m.winner.is_some())
        .collect();

    for game in &decided {
        let Some((a, b)) = game.teams() else { continue };
        for team in [a, b] {
            let Some(row) = rows.get_mut(&team) else { continue };
            let (scored, conceded) = game.games_for(team).unwrap_or((0, 0));
            row.played += 1;
            if game.winner == Some(team) {
                row.wins += 1;
            } else {
                row.losses += 1;
            }
            row.points_for += scored;
            row.points_against += conceded;
        }
    }

    let mut table: Vec<Standing> = rows
        .into_values()
        .map(|mut row| {
            row.differential = i64::from(row.points_for) - i64::from(row.points_against);
            row
        })
        .collect();
    table.sort_by(compare_rows);
    apply_head_to_head(&mut table, &decided);
    for (i, row) in table.iter_mut().enumerate() {
        row.position = i as u32 + 1;
    }
    table
}

fn compare_rows(a: &Standing, b: &Standing) -> Ordering {
    b.wins
        .cmp(&a.wins)
        .then_with(|| b.differential.cmp(&a.differential))
        .then_with(|| b.points_for.cmp(&a.points_for))
        .then_with(|| a.team_name.cmp(&b.team_name))
}

/// Two-way ties on wins are broken by the meetings between the two teams.
fn apply_head_to_head(table: &mut [Standing], decided: &[&GameMatch]) {
    let mut start = 0;
    while start < table.len() {
        let wins = table[start].wins;
        let end = start + table[start..].iter().take_while(|r| r.wins == wins).count();
        if end - start == 2 {
            let (first, second) = (table[start].team_id, table[start + 1].team_id);
            let (first_wins, second_wins) = head_to_head(first, second, decided);
            if second_wins > first_wins {
                table.swap(start, start + 1);
            }
        }
        start = end;
    }
}

fn head_to_head(a: TeamId, b: TeamId, decided: &[&GameMatch]) -> (u32, u32) {
    decided
        .iter()
        .filter(|m| m.has_team(a) && m.has_team(b))
        .fold((0, 0), |(wa, wb), m| match m.winner {
            Some(w) if w == a => (wa + 1, wb),
            Some(w) if w == b => (wa, wb + 1),
            _ => (wa, wb),
        })
}

/// A group is complete when none of its matches is still pending or ongoing.
pub fn group_complete(snapshot: &TournamentSnapshot, group_id: GroupId) -> bool {
    snapshot
        .matches
        .iter()
        .filter(|m| m.group_id == Some(group_id))
        .all(|m| !m.state.is_open())
}
