//! Final selection: pick playoff qualifiers from the group stage and seed the playoff bracket.

use crate::config::FormatConfig;
use crate::error::{EngineError, EngineResult};
use crate::logic::bracket::BracketLayout;
use crate::logic::finals::build_bracket;
use crate::logic::seeding::place_ranked;
use crate::logic::standings::standings_for_group;
use crate::models::{CategoryId, GameMatch, GroupId, TeamId, TournamentFormat, TournamentSnapshot};
use std::collections::HashMap;

/// Qualifiers of a category, ranked for seeding: every group winner (group order), then every
/// runner-up, and so on down to `per_group` places.
pub fn playoff_qualifiers(
    snapshot: &TournamentSnapshot,
    category_id: CategoryId,
    per_group: usize,
) -> EngineResult<Vec<(TeamId, GroupId)>> {
    let mut groups: Vec<_> = snapshot
        .groups
        .iter()
        .filter(|g| g.category_id == category_id)
        .collect();
    groups.sort_by(|a, b| a.name.cmp(&b.name));

    let mut tables = Vec::with_capacity(groups.len());
    for group in &groups {
        tables.push((group.id, standings_for_group(snapshot, group.id)?));
    }

    let mut ranked = Vec::new();
    for place in 0..per_group {
        for (group_id, table) in &tables {
            if let Some(row) = table.get(place) {
                ranked.push((row.team_id, *group_id));
            }
        }
    }
    Ok(ranked)
}

/// Build the single-elimination playoff bracket of a category from its final group standings.
pub fn generate_playoffs(
    snapshot: &TournamentSnapshot,
    category_id: CategoryId,
    config: &FormatConfig,
) -> EngineResult<Vec<GameMatch>> {
    let qualifiers = playoff_qualifiers(snapshot, category_id, config.playoff_qualifiers_per_group)?;
    if qualifiers.len() < 2 {
        return Err(EngineError::InvalidTeamCount {
            format: TournamentFormat::GroupsPlayoffs,
            count: qualifiers.len(),
            reason: "at least 2 playoff qualifiers",
        });
    }
    let group_of: HashMap<TeamId, GroupId> = qualifiers.iter().copied().collect();
    let ranked: Vec<TeamId> = qualifiers.iter().map(|(team, _)| *team).collect();

    let mut placement = place_ranked(&ranked);
    separate_groupmates(&mut placement, &group_of);

    let layout = BracketLayout::single(placement.len());
    build_bracket(
        snapshot.tournament.id,
        category_id,
        &placement,
        layout,
        config,
    )
}

/// Swap second slots between first-round pairings so teams from the same group do not meet
/// straight away, when another pairing can take the swap without creating a new clash.
fn separate_groupmates(placement: &mut [Option<TeamId>], group_of: &HashMap<TeamId, GroupId>) {
    let group = |slot: Option<TeamId>| slot.and_then(|t| group_of.get(&t).copied());
    let clash = |placement: &[Option<TeamId>], pair: usize| {
        let (a, b) = (group(placement[2 * pair]), group(placement[2 * pair + 1]));
        a.is_some() && a == b
    };

    let pairs = placement.len() / 2;
    for i in 0..pairs {
        if !clash(placement, i) {
            continue;
        }
        for j in 0..pairs {
            if j == i || placement[2 * j + 1].is_none() {
                continue;
            }
            placement.swap(2 * i + 1, 2 * j + 1);
            if !clash(placement, i) && !clash(placement, j) {
                break;
            }
            placement.swap(2 * i + 1, 2 * j + 1);
        }
    }
}
