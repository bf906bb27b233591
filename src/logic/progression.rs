//! Match lifecycle and progression: results, walkovers, cancellations, and what a decided match
//! sets in motion (ratings, bracket advancement, standings, playoffs, tournament completion).

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, Entity};
use crate::logic::bracket::{propagate, BracketLayout};
use crate::logic::final_selection::generate_playoffs;
use crate::logic::outcome::{patch_match, MatchPatch, MatchWrite, Progress};
use crate::logic::rating::rate_match;
use crate::logic::standings::{group_complete, standings_for_group};
use crate::models::{
    CategoryId, GameMatch, GroupId, MatchId, MatchState, RankingKey, SetScore, Slot, Stage, TeamId,
    TournamentFormat, TournamentSnapshot, TournamentStatus,
};
use crate::store::RankingStore;

fn match_index(snapshot: &TournamentSnapshot, match_id: MatchId) -> EngineResult<usize> {
    snapshot
        .matches
        .iter()
        .position(|m| m.id == match_id)
        .ok_or(EngineError::not_found(Entity::Match, match_id))
}

fn not_ready(game: &GameMatch) -> EngineError {
    EngineError::MatchNotReady {
        match_id: game.id,
        state: game.state,
    }
}

/// Open match with both teams known.
fn playable(snapshot: &TournamentSnapshot, match_id: MatchId) -> EngineResult<(usize, TeamId, TeamId)> {
    snapshot.tournament.ensure_live()?;
    let idx = match_index(snapshot, match_id)?;
    let game = &snapshot.matches[idx];
    if !game.state.is_open() {
        return Err(not_ready(game));
    }
    let (a, b) = game.teams().ok_or_else(|| not_ready(game))?;
    Ok((idx, a, b))
}

/// Pending -> Ongoing.
pub fn start_match(snapshot: &mut TournamentSnapshot, match_id: MatchId) -> EngineResult<MatchWrite> {
    let (idx, _, _) = playable(snapshot, match_id)?;
    let game = &mut snapshot.matches[idx];
    if game.state != MatchState::Pending {
        return Err(not_ready(game));
    }
    let mut writes = Vec::new();
    let patch = MatchPatch {
        state: Some(MatchState::Ongoing),
        ..MatchPatch::default()
    };
    patch_match(game, patch, &mut writes);
    Ok(writes.remove(0))
}

/// Side that won the match, or why the sets don't decide it.
///
/// At most `best_of` sets, none level, and play stops as soon as one side has won a majority.
pub fn winning_side(sets: &[SetScore], best_of: u8) -> Result<Slot, String> {
    if sets.is_empty() {
        return Err("no sets recorded".to_string());
    }
    if sets.len() > usize::from(best_of) {
        return Err(format!("{} sets recorded for a best of {best_of}", sets.len()));
    }
    let needed = u32::from(best_of) / 2 + 1;
    let (mut won_a, mut won_b) = (0, 0);
    for (i, set) in sets.iter().enumerate() {
        if won_a == needed || won_b == needed {
            return Err(format!("set {} played after the match was decided", i + 1));
        }
        match set.winner() {
            Some(Slot::A) => won_a += 1,
            Some(Slot::B) => won_b += 1,
            None => return Err(format!("set {} has no winner", i + 1)),
        }
    }
    if won_a == needed {
        Ok(Slot::A)
    } else if won_b == needed {
        Ok(Slot::B)
    } else {
        Err(format!("neither side won {needed} sets"))
    }
}

/// Store the set scores of an open match and mark it Done with the derived winner.
///
/// Follow up with [`complete_match`] to progress the tournament.
pub fn record_result(
    snapshot: &mut TournamentSnapshot,
    match_id: MatchId,
    sets: Vec<SetScore>,
) -> EngineResult<MatchWrite> {
    let (idx, a, b) = playable(snapshot, match_id)?;
    let game = &mut snapshot.matches[idx];
    let side = winning_side(&sets, game.best_of).map_err(EngineError::InvalidResult)?;
    let winner = match side {
        Slot::A => a,
        Slot::B => b,
    };
    let patch = MatchPatch {
        sets: Some(sets),
        ..MatchPatch::resolve(MatchState::Done, Some(winner))
    };
    let mut writes = Vec::new();
    patch_match(game, patch, &mut writes);
    Ok(writes.remove(0))
}

/// Award an open match to the opponent of `no_show` and run the completion pipeline.
pub fn record_walkover<S: RankingStore + ?Sized>(
    snapshot: &mut TournamentSnapshot,
    rankings: &S,
    match_id: MatchId,
    no_show: TeamId,
    config: &EngineConfig,
) -> EngineResult<Progress> {
    let (idx, a, b) = playable(snapshot, match_id)?;
    let winner = if no_show == a {
        b
    } else if no_show == b {
        a
    } else {
        return Err(EngineError::InvalidTeam(format!(
            "team {no_show} is not playing match {match_id}"
        )));
    };
    let mut writes = Vec::new();
    patch_match(
        &mut snapshot.matches[idx],
        MatchPatch::resolve(MatchState::Walkover, Some(winner)),
        &mut writes,
    );
    let mut progress = complete_match(snapshot, rankings, match_id, config)?;
    writes.append(&mut progress.writes);
    progress.writes = writes;
    Ok(progress)
}

/// Cancel an open match. In a bracket both of its targets receive a bye; in a group the
/// standings are recomputed.
pub fn cancel_match(
    snapshot: &mut TournamentSnapshot,
    match_id: MatchId,
    config: &EngineConfig,
) -> EngineResult<Progress> {
    snapshot.tournament.ensure_live()?;
    let idx = match_index(snapshot, match_id)?;
    let game = &mut snapshot.matches[idx];
    if !game.state.is_open() {
        return Err(not_ready(game));
    }
    let (category_id, stage, group_id) = (game.category_id, game.stage, game.group_id);

    let mut progress = Progress::default();
    patch_match(
        game,
        MatchPatch::resolve(MatchState::Cancelled, None),
        &mut progress.writes,
    );
    if stage.is_bracket() {
        let layout = layout_of(snapshot, category_id);
        propagate(&mut snapshot.matches, &layout, idx, &mut progress.writes)?;
    } else if let Some(group_id) = group_id {
        let format = snapshot.tournament.format;
        update_group(snapshot, group_id, format, config, &mut progress)?;
    }
    check_finished(snapshot, &mut progress)?;
    Ok(progress)
}

/// Bracket shape of a category, read back from its matches.
fn layout_of(snapshot: &TournamentSnapshot, category_id: CategoryId) -> BracketLayout {
    let mut layout = BracketLayout {
        winners_rounds: 1,
        double: false,
    };
    for game in snapshot.matches_in(category_id) {
        match game.stage {
            Stage::Winners(r) => layout.winners_rounds = layout.winners_rounds.max(r),
            Stage::Losers(_) | Stage::GrandFinal(_) => layout.double = true,
            Stage::Pool(_) => {}
        }
    }
    layout
}

/// Progress the tournament after a match was decided (Done or Walkover, winner set).
///
/// Ratings are best-effort: a ranking store failure is logged and progression continues.
/// Walkovers are only rated when the configuration asks for it.
pub fn complete_match<S: RankingStore + ?Sized>(
    snapshot: &mut TournamentSnapshot,
    rankings: &S,
    match_id: MatchId,
    config: &EngineConfig,
) -> EngineResult<Progress> {
    snapshot.tournament.ensure_live()?;
    let idx = match_index(snapshot, match_id)?;
    let game = &snapshot.matches[idx];
    if !game.state.is_decided() || game.winner.is_none() {
        return Err(not_ready(game));
    }

    let mut progress = Progress::default();
    if game.state == MatchState::Done || config.rating.rate_walkovers {
        update_ratings(snapshot, rankings, idx, config, &mut progress);
    }

    let game = &snapshot.matches[idx];
    let (category_id, stage, group_id) = (game.category_id, game.stage, game.group_id);
    match (stage, snapshot.tournament.format) {
        (Stage::Pool(_), TournamentFormat::Americano | TournamentFormat::Mexicano) => {}
        (Stage::Pool(_), format) => {
            if let Some(group_id) = group_id {
                update_group(snapshot, group_id, format, config, &mut progress)?;
            }
        }
        (_, _) => {
            let layout = layout_of(snapshot, category_id);
            propagate(&mut snapshot.matches, &layout, idx, &mut progress.writes)?;
        }
    }

    check_finished(snapshot, &mut progress)?;
    Ok(progress)
}

fn update_ratings<S: RankingStore + ?Sized>(
    snapshot: &mut TournamentSnapshot,
    rankings: &S,
    idx: usize,
    config: &EngineConfig,
    progress: &mut Progress,
) {
    let game = &snapshot.matches[idx];
    let Some((a, b)) = game.teams() else { return };
    let (Ok(team_a), Ok(team_b)) = (snapshot.team(a), snapshot.team(b)) else {
        log::warn!("Skipping ratings for match {}: team missing", game.id);
        return;
    };
    match rate_match(rankings, game, team_a, team_b, &config.rating) {
        Ok(changes) => progress.rating_changes = changes,
        Err(e) => {
            log::warn!("Rating update failed for match {}: {}", game.id, e);
            return;
        }
    }

    let (tournament_id, category_id) = (game.tournament_id, game.category_id);
    for team_id in [a, b] {
        let Ok(team) = snapshot.team_mut(team_id) else { continue };
        let mut total = 0;
        for player in team.players {
            let key = RankingKey::tournament(tournament_id, category_id, player);
            match rankings.ranking(&key) {
                Ok(row) => total += row.map_or(config.rating.default_rating, |r| r.rating),
                Err(e) => {
                    log::warn!("Could not refresh rating of team {}: {}", team.name, e);
                    total = team.rating * 2;
                    break;
                }
            }
        }
        team.rating = (f64::from(total) / 2.0).round() as i32;
        progress.team_ratings.push((team_id, team.rating));
    }
}

fn update_group(
    snapshot: &mut TournamentSnapshot,
    group_id: GroupId,
    format: TournamentFormat,
    config: &EngineConfig,
    progress: &mut Progress,
) -> EngineResult<()> {
    let table = standings_for_group(snapshot, group_id)?;
    snapshot.standings.retain(|s| s.group_id != group_id);
    snapshot.standings.extend(table.iter().cloned());
    progress.standings = table;

    if format != TournamentFormat::GroupsPlayoffs || !group_complete(snapshot, group_id) {
        return Ok(());
    }
    let category_id = snapshot.group(group_id)?.category_id;
    let all_complete = snapshot
        .groups
        .iter()
        .filter(|g| g.category_id == category_id)
        .all(|g| group_complete(snapshot, g.id));
    let has_playoffs = snapshot
        .matches_in(category_id)
        .any(|m| matches!(m.stage, Stage::Winners(_)));
    if !all_complete || has_playoffs {
        return Ok(());
    }

    let playoffs = generate_playoffs(snapshot, category_id, &config.formats)?;
    log::debug!(
        "Group stage of category {} complete; {} playoff matches created",
        category_id,
        playoffs.len()
    );
    snapshot.matches.extend(playoffs.iter().cloned());
    progress.created = playoffs;
    Ok(())
}

fn check_finished(snapshot: &mut TournamentSnapshot, progress: &mut Progress) -> EngineResult<()> {
    if snapshot.has_open_matches() {
        return Ok(());
    }
    snapshot.tournament.finish()?;
    progress.status = Some(TournamentStatus::Finished);
    log::info!("Tournament {} finished", snapshot.tournament.id);
    Ok(())
}
