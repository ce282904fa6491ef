//! Swiss round pairing: bye selection, score-ordered pairing, rematch avoidance.

use crate::models::{GameMatch, Player, PlayerId};
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Reverse;

/// Upper bound on partner trials when searching for a rematch-free round.
const SEARCH_BUDGET: usize = 20_000;

/// Who received the bye this round.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ByeAward {
    pub player: PlayerId,
    /// Every candidate already had a bye, so this player gets a second one.
    pub repeat: bool,
}

/// A freshly paired round.
#[derive(Clone, Debug)]
pub struct RoundPairing {
    /// Paired matches in pairing order, then the bye match if any.
    pub matches: Vec<GameMatch>,
    pub bye: Option<ByeAward>,
    /// Pairs that had already met and were paired again as a last resort.
    pub rematches: Vec<(PlayerId, PlayerId)>,
}

#[derive(Clone, Debug)]
pub enum PairingOutcome {
    /// One or no candidates left: nothing to pair.
    Complete,
    Round(RoundPairing),
}

/// Pair `candidates` (active players, registration order) for `round`.
///
/// 1. With one or no candidates the tournament is complete.
/// 2. Odd count: the bye goes to the lowest-points player without a bye (then fewest wins,
///    then registration order); if everyone had one, to the lowest-points player overall.
/// 3. Shuffle the rest, then stable-sort by points descending.
/// 4. Pair front to back avoiding rematches; only if no rematch-free round is found,
///    fall back to greedy pairing that allows them.
///
/// Does not touch the players; the caller applies the bye award.
pub fn pair_round<R: Rng + ?Sized>(candidates: &[&Player], round: u32, rng: &mut R) -> PairingOutcome {
    if candidates.len() <= 1 {
        return PairingOutcome::Complete;
    }

    let bye = if candidates.len() % 2 == 1 {
        select_bye(candidates)
    } else {
        None
    };

    let mut order: Vec<&Player> = candidates
        .iter()
        .copied()
        .filter(|p| bye.map_or(true, |b| b.player != p.id))
        .collect();
    order.shuffle(rng);
    order.sort_by_key(|p| Reverse(p.points()));

    let pairs = find_rematch_free(&order).unwrap_or_else(|| pair_greedy(&order));

    let mut matches = Vec::with_capacity(pairs.len() + 1);
    let mut rematches = Vec::new();
    for (i, j) in pairs {
        let (p1, p2) = (order[i], order[j]);
        if have_met(p1, p2) {
            rematches.push((p1.id, p2.id));
        }
        matches.push(GameMatch::new(round, p1.id, p2.id));
    }
    if let Some(award) = bye {
        matches.push(GameMatch::bye(round, award.player));
    }

    PairingOutcome::Round(RoundPairing {
        matches,
        bye,
        rematches,
    })
}

/// Lowest points, then fewest wins; `min_by_key` keeps the first of equals (registration order).
fn select_bye(candidates: &[&Player]) -> Option<ByeAward> {
    let key = |p: &&&Player| (p.points(), p.wins);
    candidates
        .iter()
        .filter(|p| !p.had_bye)
        .min_by_key(key)
        .map(|p| ByeAward {
            player: p.id,
            repeat: false,
        })
        .or_else(|| {
            candidates.iter().min_by_key(key).map(|p| ByeAward {
                player: p.id,
                repeat: true,
            })
        })
}

fn have_met(a: &Player, b: &Player) -> bool {
    a.has_played(b.id) || b.has_played(a.id)
}

/// Depth-first search in pairing order; the first hit equals the greedy pairing when that has
/// no rematches.
fn find_rematch_free(order: &[&Player]) -> Option<Vec<(usize, usize)>> {
    let mut paired = vec![false; order.len()];
    let mut pairs = Vec::with_capacity(order.len() / 2);
    let mut budget = SEARCH_BUDGET;
    if search(order, &mut paired, &mut pairs, &mut budget) {
        Some(pairs)
    } else {
        None
    }
}

fn search(
    order: &[&Player],
    paired: &mut [bool],
    pairs: &mut Vec<(usize, usize)>,
    budget: &mut usize,
) -> bool {
    let Some(i) = paired.iter().position(|done| !done) else {
        return true;
    };
    paired[i] = true;
    for j in i + 1..order.len() {
        if paired[j] || have_met(order[i], order[j]) {
            continue;
        }
        if *budget == 0 {
            break;
        }
        *budget -= 1;
        paired[j] = true;
        pairs.push((i, j));
        if search(order, paired, pairs, budget) {
            return true;
        }
        pairs.pop();
        paired[j] = false;
    }
    paired[i] = false;
    false
}

/// Each unpaired player takes the first later player they have not met, else the first later player.
fn pair_greedy(order: &[&Player]) -> Vec<(usize, usize)> {
    let mut paired = vec![false; order.len()];
    let mut pairs = Vec::with_capacity(order.len() / 2);
    for i in 0..order.len() {
        if paired[i] {
            continue;
        }
        let mut open = (i + 1..order.len()).filter(|&j| !paired[j]);
        let partner = open
            .clone()
            .find(|&j| !have_met(order[i], order[j]))
            .or_else(|| open.next());
        if let Some(j) = partner {
            paired[i] = true;
            paired[j] = true;
            pairs.push((i, j));
        }
    }
    pairs
}
