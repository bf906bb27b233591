//! Elimination bracket topology and slot propagation.
//!
//! Winners rounds count down to the final (`Winners(1)`); the entry round is `Winners(k)` for a
//! bracket of `2^k` slots. A double-elimination losers bracket has `2(k-1)` rounds, counted down to
//! the losers final (`Losers(1)`). Counting from the losers entry round (`j = 1`):
//!
//! * `j = 1` takes the losers of the winners entry round, two per match;
//! * even `j` are drop-in rounds: survivors from `j - 1` (slot A) meet the losers of winners
//!   round depth `j / 2 + 1` (slot B), fed in reverse match order to delay rematches;
//! * odd `j > 1` are survivor rounds pairing the winners of `j - 1`.
//!
//! The winners final winner takes grand-final slot A, the losers final winner slot B.

use crate::error::EngineResult;
use crate::logic::outcome::{fill_slot, patch_match, MatchPatch, MatchWrite};
use crate::models::{CategoryId, Entrant, GameMatch, MatchState, Slot, Stage};
use std::collections::VecDeque;

/// Where a team goes after a match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Feed {
    pub stage: Stage,
    pub match_number: u32,
    pub slot: Slot,
}

impl Feed {
    fn new(stage: Stage, match_number: u32, slot: Slot) -> Self {
        Self {
            stage,
            match_number,
            slot,
        }
    }
}

/// Shape of one elimination bracket.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BracketLayout {
    pub winners_rounds: u32,
    pub double: bool,
}

impl BracketLayout {
    pub fn single(size: usize) -> Self {
        Self {
            winners_rounds: crate::logic::seeding::round_count(size),
            double: false,
        }
    }

    pub fn double(size: usize) -> Self {
        Self {
            double: true,
            ..Self::single(size)
        }
    }

    pub fn size(&self) -> u32 {
        1 << self.winners_rounds
    }

    pub fn losers_rounds(&self) -> u32 {
        if self.double {
            2 * (self.winners_rounds - 1)
        } else {
            0
        }
    }

    /// Losers round index counted from the losers entry round.
    fn losers_depth(&self, round: u32) -> u32 {
        self.losers_rounds() - round + 1
    }

    fn losers_round_at_depth(&self, depth: u32) -> u32 {
        self.losers_rounds() - depth + 1
    }

    pub fn matches_in(&self, stage: Stage) -> u32 {
        match stage {
            Stage::Winners(r) => 1 << (r - 1),
            Stage::Losers(r) => {
                let j = self.losers_depth(r);
                self.size() >> ((j + 1) / 2 + 1)
            }
            Stage::GrandFinal(_) => 1,
            Stage::Pool(_) => 0,
        }
    }

    /// Every stage of the bracket in play order (entry round first, grand finals last).
    pub fn stages(&self) -> Vec<Stage> {
        let mut stages: Vec<Stage> = (1..=self.winners_rounds).rev().map(Stage::Winners).collect();
        if self.double {
            stages.extend((1..=self.losers_rounds()).rev().map(Stage::Losers));
            stages.push(Stage::GrandFinal(1));
            stages.push(Stage::GrandFinal(2));
        }
        stages
    }

    /// Slot the winner of `(stage, match_number)` moves into. `None` for the deciding match and grand finals.
    pub fn winner_target(&self, stage: Stage, match_number: u32) -> Option<Feed> {
        match stage {
            Stage::Winners(1) if self.double => Some(Feed::new(Stage::GrandFinal(1), 1, Slot::A)),
            Stage::Winners(1) => None,
            Stage::Winners(r) => Some(Feed::new(
                Stage::Winners(r - 1),
                match_number.div_ceil(2),
                Slot::for_feeder(match_number),
            )),
            Stage::Losers(1) => Some(Feed::new(Stage::GrandFinal(1), 1, Slot::B)),
            Stage::Losers(r) => {
                if self.losers_depth(r) % 2 == 1 {
                    Some(Feed::new(Stage::Losers(r - 1), match_number, Slot::A))
                } else {
                    Some(Feed::new(
                        Stage::Losers(r - 1),
                        match_number.div_ceil(2),
                        Slot::for_feeder(match_number),
                    ))
                }
            }
            Stage::GrandFinal(_) | Stage::Pool(_) => None,
        }
    }

    /// Slot the loser of `(stage, match_number)` drops into. `None` when losing eliminates.
    pub fn loser_target(&self, stage: Stage, match_number: u32) -> Option<Feed> {
        if !self.double {
            return None;
        }
        let Stage::Winners(r) = stage else {
            return None;
        };
        let k = self.winners_rounds;
        if k == 1 {
            return Some(Feed::new(Stage::GrandFinal(1), 1, Slot::B));
        }
        let depth = k - r + 1;
        if depth == 1 {
            let round = self.losers_round_at_depth(1);
            return Some(Feed::new(
                Stage::Losers(round),
                match_number.div_ceil(2),
                Slot::for_feeder(match_number),
            ));
        }
        let round = self.losers_round_at_depth(2 * (depth - 1));
        let count = self.matches_in(stage);
        Some(Feed::new(Stage::Losers(round), count + 1 - match_number, Slot::B))
    }

    pub fn round_name(&self, stage: Stage) -> String {
        let prefix = if self.double { "Winners " } else { "" };
        match stage {
            Stage::Winners(1) => format!("{prefix}Final"),
            Stage::Winners(2) => format!("{prefix}Semi-final"),
            Stage::Winners(3) => format!("{prefix}Quarter-final"),
            Stage::Winners(r) => format!("{prefix}Round of {}", 1u32 << r),
            Stage::Losers(1) => "Losers Final".to_string(),
            Stage::Losers(r) => format!("Losers Round {}", self.losers_depth(r)),
            Stage::GrandFinal(1) => "Grand Final".to_string(),
            Stage::GrandFinal(_) => "Grand Final Reset".to_string(),
            Stage::Pool(r) => format!("Round {r}"),
        }
    }
}

fn position(matches: &[GameMatch], category_id: CategoryId, stage: Stage, number: u32) -> Option<usize> {
    matches
        .iter()
        .position(|m| m.category_id == category_id && m.stage == stage && m.match_number == number)
}

/// Push the outcome of match `start` through the bracket, resolving byes along the way.
///
/// Decided matches send their winner and loser (a bye when there is none) to their targets.
/// Cancelled matches send byes both ways. A pending match whose slots are all resolved but holds
/// fewer than two teams is settled immediately: one team wins by walkover, none cancels it.
pub(crate) fn propagate(
    matches: &mut [GameMatch],
    layout: &BracketLayout,
    start: usize,
    writes: &mut Vec<MatchWrite>,
) -> EngineResult<()> {
    let mut queue = VecDeque::from([start]);
    while let Some(idx) = queue.pop_front() {
        settle_byes(&mut matches[idx], writes);
        let game = &matches[idx];
        let category_id = game.category_id;
        let (stage, number, state) = (game.stage, game.match_number, game.state);
        let (winner, loser) = match state {
            MatchState::Done | MatchState::Walkover => match game.winner {
                Some(w) => (Entrant::Team(w), game.loser().map_or(Entrant::Bye, Entrant::Team)),
                None => continue,
            },
            MatchState::Cancelled => (Entrant::Bye, Entrant::Bye),
            MatchState::Pending | MatchState::Ongoing => continue,
        };

        if stage == Stage::GrandFinal(1) {
            decide_reset(matches, idx, writes)?;
            continue;
        }

        let targets = [
            (layout.winner_target(stage, number), winner),
            (layout.loser_target(stage, number), loser),
        ];
        for (feed, entrant) in targets {
            let Some(feed) = feed else { continue };
            let Some(target) = position(matches, category_id, feed.stage, feed.match_number) else {
                log::warn!("bracket target {:?} #{} missing", feed.stage, feed.match_number);
                continue;
            };
            if fill_slot(&mut matches[target], feed.slot, entrant, writes)? {
                log::debug!(
                    "filled {:?} #{} slot {:?} with {:?}",
                    feed.stage,
                    feed.match_number,
                    feed.slot,
                    entrant
                );
            }
            queue.push_back(target);
        }
    }
    Ok(())
}

/// Settle a pending match that cannot be played: a lone team walks over, no team cancels.
fn settle_byes(game: &mut GameMatch, writes: &mut Vec<MatchWrite>) {
    if game.state != MatchState::Pending {
        return;
    }
    let patch = match (game.team_a, game.team_b) {
        (Entrant::Team(t), Entrant::Bye) | (Entrant::Bye, Entrant::Team(t)) => {
            MatchPatch::resolve(MatchState::Walkover, Some(t))
        }
        (Entrant::Bye, Entrant::Bye) => MatchPatch::resolve(MatchState::Cancelled, None),
        _ => return,
    };
    patch_match(game, patch, writes);
}

/// After the first grand final: schedule the reset only when the losing side had never lost before.
fn decide_reset(
    matches: &mut [GameMatch],
    first_idx: usize,
    writes: &mut Vec<MatchWrite>,
) -> EngineResult<()> {
    let first = &matches[first_idx];
    let category_id = first.category_id;
    let first_id = first.id;
    let (team_a, team_b) = (first.team_a, first.team_b);
    let loser = match first.state {
        MatchState::Done | MatchState::Walkover => first.loser(),
        _ => None,
    };

    let needs_reset = loser.is_some_and(|loser| {
        !matches.iter().any(|m| {
            m.id != first_id
                && m.category_id == category_id
                && m.stage.is_bracket()
                && m.state.is_decided()
                && m.has_team(loser)
                && m.winner.is_some_and(|w| w != loser)
        })
    });

    let Some(reset_idx) = position(matches, category_id, Stage::GrandFinal(2), 1) else {
        return Ok(());
    };
    let reset = &mut matches[reset_idx];
    if needs_reset {
        fill_slot(reset, Slot::A, team_a, writes)?;
        fill_slot(reset, Slot::B, team_b, writes)?;
        log::info!("grand final reset scheduled (match {})", reset.id);
    } else if reset.state == MatchState::Pending && reset.teams().is_none() {
        patch_match(reset, MatchPatch::resolve(MatchState::Cancelled, None), writes);
    }
    Ok(())
}
