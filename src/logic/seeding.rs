//! Bracket seeding: seed ordering, standard placement permutation and byes.

use crate::models::{Team, TeamId};
use rand::seq::SliceRandom;
use rand::Rng;

/// Next power of two that holds `team_count` entrants (at least 2).
pub fn bracket_size(team_count: usize) -> usize {
    team_count.max(2).next_power_of_two()
}

/// Number of rounds in a bracket of `size` slots.
pub fn round_count(size: usize) -> u32 {
    size.max(2).trailing_zeros()
}

/// Seed numbers in bracket position order, paired consecutively into first-round matches.
///
/// Starts from `[1, 2]`; each doubling pairs every seed `s` with `max + 1 - s`, alternating which
/// side `s` takes so the halves mirror each other. Seeds 1 and 2 land in opposite halves, 1-4 in
/// separate quarters, and so on. For 8 slots: `[1, 8, 4, 5, 3, 6, 2, 7]`.
pub fn seed_order(size: usize) -> Vec<u32> {
    let size = bracket_size(size);
    let mut order: Vec<u32> = vec![1, 2];
    while order.len() < size {
        let max = (order.len() * 2) as u32;
        order = order
            .iter()
            .enumerate()
            .flat_map(|(i, &s)| {
                let partner = max + 1 - s;
                if i % 2 == 0 {
                    [s, partner]
                } else {
                    [partner, s]
                }
            })
            .collect();
    }
    order
        .chunks(2)
        .flat_map(|pair| [pair[0].min(pair[1]), pair[0].max(pair[1])])
        .collect()
}

/// Seeded teams ascending by seed (name breaks ties), then unseeded teams shuffled.
pub fn rank_teams<R: Rng + ?Sized>(teams: &[&Team], rng: &mut R) -> Vec<TeamId> {
    let mut seeded: Vec<&Team> = teams.iter().copied().filter(|t| t.seed.is_some()).collect();
    seeded.sort_by(|a, b| a.seed.cmp(&b.seed).then_with(|| a.name.cmp(&b.name)));

    let mut unseeded: Vec<TeamId> = teams
        .iter()
        .filter(|t| t.seed.is_none())
        .map(|t| t.id)
        .collect();
    unseeded.shuffle(rng);

    seeded.into_iter().map(|t| t.id).chain(unseeded).collect()
}

/// Place an already ranked list (index 0 = seed 1) into bracket positions.
/// Positions past the end of the list are byes (`None`), so the top seeds receive them.
pub fn place_ranked(ranked: &[TeamId]) -> Vec<Option<TeamId>> {
    seed_order(ranked.len())
        .into_iter()
        .map(|seed| ranked.get(seed as usize - 1).copied())
        .collect()
}

/// Full seeding: rank, then place. Output length is the bracket size.
pub fn seed_bracket<R: Rng + ?Sized>(teams: &[&Team], rng: &mut R) -> Vec<Option<TeamId>> {
    place_ranked(&rank_teams(teams, rng))
}
