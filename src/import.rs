//! Roster import from CSV: one team per row, `name,player_1,player_2,seed` (seed may be blank).

use crate::error::ImportError;
use crate::models::{validate_roster, CategoryId, Player, PlayerId, Team, TournamentId};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct TeamRow {
    name: String,
    player_1: String,
    player_2: String,
    #[serde(default)]
    seed: Option<u32>,
}

/// Parse a roster into players and teams of one category.
///
/// Players are identified by name: the same name on two rows is the same player.
pub fn read_teams_csv<R: Read>(
    reader: R,
    tournament_id: TournamentId,
    category_id: CategoryId,
) -> Result<(Vec<Player>, Vec<Team>), ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut players: Vec<Player> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();
    let mut teams = Vec::new();
    for (i, row) in csv_reader.deserialize::<TeamRow>().enumerate() {
        let line = i as u64 + 2;
        let row = row?;
        if row.name.is_empty() || row.player_1.is_empty() || row.player_2.is_empty() {
            return Err(ImportError::InvalidRow {
                line,
                message: "team and player names must not be empty".to_string(),
            });
        }

        let mut ids = [PlayerId::nil(); 2];
        for (slot, name) in [&row.player_1, &row.player_2].into_iter().enumerate() {
            let index = *by_name.entry(name.clone()).or_insert_with(|| {
                players.push(Player::new(name.as_str()));
                players.len() - 1
            });
            ids[slot] = players[index].id;
        }

        let team = Team::new(tournament_id, category_id, row.name, ids).map_err(|e| {
            ImportError::InvalidRow {
                line,
                message: e.to_string(),
            }
        })?;
        teams.push(match row.seed {
            Some(seed) => team.with_seed(seed),
            None => team,
        });
    }

    validate_roster(&teams)?;
    log::info!("Imported {} teams ({} players)", teams.len(), players.len());
    Ok((players, teams))
}
