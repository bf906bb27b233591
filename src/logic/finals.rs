//! Elimination brackets: single and double elimination match generation.

use crate::config::FormatConfig;
use crate::error::{EngineError, EngineResult};
use crate::logic::bracket::{propagate, BracketLayout};
use crate::logic::seeding::seed_bracket;
use crate::models::{
    CategoryId, Entrant, GameMatch, MatchMeta, Stage, Team, TeamId, TournamentFormat, TournamentId,
};
use rand::Rng;

/// Generate a single-elimination bracket for one category.
///
/// Round 1 is the final; the entry round is `Winners(k)` for `2^k` slots. Entry matches get the
/// seeded teams pairwise, deeper rounds start empty. Byes are settled immediately.
pub fn generate_single_elimination<R: Rng + ?Sized>(
    tournament_id: TournamentId,
    category_id: CategoryId,
    teams: &[&Team],
    config: &FormatConfig,
    rng: &mut R,
) -> EngineResult<Vec<GameMatch>> {
    if teams.len() < 2 {
        return Err(EngineError::InvalidTeamCount {
            format: TournamentFormat::SingleElim,
            count: teams.len(),
            reason: "at least 2 teams",
        });
    }
    let placement = seed_bracket(teams, rng);
    let layout = BracketLayout::single(placement.len());
    build_bracket(tournament_id, category_id, &placement, layout, config)
}

/// Generate a double-elimination bracket: winners bracket, losers bracket and two grand finals.
pub fn generate_double_elimination<R: Rng + ?Sized>(
    tournament_id: TournamentId,
    category_id: CategoryId,
    teams: &[&Team],
    config: &FormatConfig,
    rng: &mut R,
) -> EngineResult<Vec<GameMatch>> {
    if teams.len() < 2 {
        return Err(EngineError::InvalidTeamCount {
            format: TournamentFormat::DoubleElim,
            count: teams.len(),
            reason: "at least 2 teams",
        });
    }
    let placement = seed_bracket(teams, rng);
    let layout = BracketLayout::double(placement.len());
    build_bracket(tournament_id, category_id, &placement, layout, config)
}

/// Create every match of `layout`, fill the entry round from `placement` (`None` = bye) and
/// settle the byes.
pub(crate) fn build_bracket(
    tournament_id: TournamentId,
    category_id: CategoryId,
    placement: &[Option<TeamId>],
    layout: BracketLayout,
    config: &FormatConfig,
) -> EngineResult<Vec<GameMatch>> {
    let entry = Stage::Winners(layout.winners_rounds);
    let mut matches = Vec::new();
    for stage in layout.stages() {
        let best_of = match stage {
            Stage::GrandFinal(_) => config.grand_final_best_of,
            _ => config.bracket_best_of,
        };
        for number in 1..=layout.matches_in(stage) {
            let meta = MatchMeta::Bracket {
                round_name: layout.round_name(stage),
            };
            let mut game = GameMatch::new(tournament_id, category_id, stage, number, best_of, meta);
            if stage == entry {
                let i = 2 * (number as usize - 1);
                game = game.with_teams(
                    Entrant::from(placement.get(i).copied().flatten()),
                    Entrant::from(placement.get(i + 1).copied().flatten()),
                );
            }
            matches.push(game);
        }
    }

    // Generation writes are the created rows themselves.
    let mut discarded = Vec::new();
    for idx in 0..matches.len() {
        if matches[idx].stage == entry {
            propagate(&mut matches, &layout, idx, &mut discarded)?;
        }
    }
    Ok(matches)
}
