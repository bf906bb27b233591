//! Setup phase: validate the roster and launch the tournament (Registration -> Live), generating
//! the opening matches of every category.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, Entity};
use crate::logic::americano::generate_rotations;
use crate::logic::finals::{generate_double_elimination, generate_single_elimination};
use crate::logic::group_play::{generate_groups, generate_round_robin, PoolDraw};
use crate::models::{
    validate_roster, Category, CategoryId, Entrant, GameMatch, Group, Player, PlayerId, Standing, Team, TeamId,
    TournamentFormat, TournamentSnapshot, TournamentStatus,
};
use rand::Rng;
use std::collections::HashMap;

/// Everything created by a launch, for the caller's stores.
#[derive(Clone, Debug, Default)]
pub struct Launch {
    /// Partnerships synthesized by rotation formats.
    pub teams: Vec<Team>,
    pub groups: Vec<Group>,
    pub matches: Vec<GameMatch>,
    pub standings: Vec<Standing>,
}

impl Launch {
    fn absorb(&mut self, draw: PoolDraw) {
        self.groups.extend(draw.groups);
        self.matches.extend(draw.matches);
        self.standings.extend(draw.standings);
    }
}

/// Launch a tournament: check the roster, generate every category, then go live.
///
/// Nothing is changed when generation fails for any category. On success the snapshot holds the
/// new matches, groups, standings and teams, and its tournament is Live.
pub fn launch_tournament<R: Rng + ?Sized>(
    snapshot: &mut TournamentSnapshot,
    config: &EngineConfig,
    rng: &mut R,
) -> EngineResult<Launch> {
    let tournament = &snapshot.tournament;
    if tournament.status != TournamentStatus::Registration {
        return Err(EngineError::InvalidState {
            expected: "registration",
            actual: tournament.status,
        });
    }
    if snapshot.categories.is_empty() {
        return Err(EngineError::not_found(Entity::Category, tournament.id));
    }
    for team in &snapshot.teams {
        snapshot.category(team.category_id)?;
    }
    for signup in &snapshot.signups {
        snapshot.category(signup.category_id)?;
    }
    validate_roster(&snapshot.teams)?;

    let mut launch = Launch::default();
    for category in &snapshot.categories {
        generate_category(snapshot, category, config, rng, &mut launch)?;
    }

    snapshot.tournament.go_live()?;
    snapshot.teams.extend(launch.teams.iter().cloned());
    snapshot.groups.extend(launch.groups.iter().cloned());
    snapshot.matches.extend(launch.matches.iter().cloned());
    snapshot.standings.extend(launch.standings.iter().cloned());
    log::info!(
        "Tournament {} ({:?}) is live: {} categories, {} matches",
        snapshot.tournament.id,
        snapshot.tournament.format,
        snapshot.categories.len(),
        launch.matches.len()
    );
    Ok(launch)
}

fn generate_category<R: Rng + ?Sized>(
    snapshot: &TournamentSnapshot,
    category: &Category,
    config: &EngineConfig,
    rng: &mut R,
    launch: &mut Launch,
) -> EngineResult<()> {
    let tournament = &snapshot.tournament;
    let format = tournament.format;
    let teams = snapshot.teams_in(category.id);

    if format.is_rotation() {
        let players = rotation_players(snapshot, category.id, &teams)?;
        check_bounds(snapshot, format, players.len())?;
        let draw = generate_rotations(tournament, category.id, &players, config, rng)?;
        let (fresh, matches) = reuse_registered_pairs(&teams, draw.teams, draw.matches);
        launch.teams.extend(fresh);
        launch.matches.extend(matches);
        return Ok(());
    }

    check_bounds(snapshot, format, teams.len())?;
    let formats = &config.formats;
    let before = launch.matches.len();
    match format {
        TournamentFormat::SingleElim => launch.matches.extend(generate_single_elimination(
            tournament.id,
            category.id,
            &teams,
            formats,
            rng,
        )?),
        TournamentFormat::DoubleElim => launch.matches.extend(generate_double_elimination(
            tournament.id,
            category.id,
            &teams,
            formats,
            rng,
        )?),
        TournamentFormat::RoundRobin => {
            launch.absorb(generate_round_robin(tournament.id, category.id, &teams, formats)?)
        }
        TournamentFormat::GroupsPlayoffs => launch.absorb(generate_groups(
            tournament.id,
            category.id,
            &teams,
            formats,
            rng,
        )?),
        TournamentFormat::Americano | TournamentFormat::Mexicano => {}
    }
    log::info!(
        "Generated {:?} for category {}: {} matches",
        format,
        category.name,
        launch.matches.len() - before
    );
    Ok(())
}

/// Team bounds count entries: teams, or players for rotation formats, where partnerships are
/// only formed at launch.
fn check_bounds(snapshot: &TournamentSnapshot, format: TournamentFormat, count: usize) -> EngineResult<()> {
    let tournament = &snapshot.tournament;
    if count < tournament.min_teams || count > tournament.max_teams {
        return Err(EngineError::InvalidTeamCount {
            format,
            count,
            reason: "an entry count within the tournament bounds",
        });
    }
    Ok(())
}

/// Players of a rotation category: its individual sign-ups followed by everyone on its registered
/// teams. A tournament with a single category and neither falls back to every known player.
fn rotation_players<'a>(
    snapshot: &'a TournamentSnapshot,
    category_id: CategoryId,
    teams: &[&Team],
) -> EngineResult<Vec<&'a Player>> {
    let mut ids: Vec<PlayerId> = Vec::new();
    let candidates = snapshot
        .signed_up_in(category_id)
        .chain(teams.iter().flat_map(|t| t.players));
    for player in candidates {
        if !ids.contains(&player) {
            ids.push(player);
        }
    }
    if ids.is_empty() && snapshot.categories.len() == 1 {
        return Ok(snapshot.players.iter().collect());
    }
    ids.into_iter()
        .map(|id| {
            snapshot
                .player(id)
                .ok_or(EngineError::not_found(Entity::Player, id))
        })
        .collect()
}

/// A synthesized partnership that matches a registered team plays under the registered team, so
/// a pair stays unique within the tournament.
fn reuse_registered_pairs(
    registered: &[&Team],
    synthesized: Vec<Team>,
    mut matches: Vec<GameMatch>,
) -> (Vec<Team>, Vec<GameMatch>) {
    let by_pair: HashMap<(PlayerId, PlayerId), TeamId> =
        registered.iter().map(|t| (t.pair_key(), t.id)).collect();
    let mut renamed: HashMap<TeamId, TeamId> = HashMap::new();
    let mut fresh = Vec::new();
    for team in synthesized {
        match by_pair.get(&team.pair_key()) {
            Some(&existing) => {
                renamed.insert(team.id, existing);
            }
            None => fresh.push(team),
        }
    }
    if !renamed.is_empty() {
        for game in &mut matches {
            for entrant in [&mut game.team_a, &mut game.team_b] {
                if let Entrant::Team(id) = *entrant {
                    if let Some(&existing) = renamed.get(&id) {
                        *entrant = Entrant::Team(existing);
                    }
                }
            }
        }
    }
    (fresh, matches)
}
