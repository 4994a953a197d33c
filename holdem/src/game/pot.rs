//! Pot bookkeeping: sweeping round bets in, carving side pots around
//! short all-ins, and paying winners out.

use log::{debug, warn};
use std::collections::HashMap;

use super::entities::{Chips, PlayerId, SidePot};
use super::hand::EvaluatedHand;
use super::state::GameState;

/// Sweep every live bet into the pot structure and zero the bets.
///
/// When an in-hand player is all-in for less than the round's largest
/// bet, the round is split at each such level: everyone contributes up
/// to the level into that tier, and only players who covered the level
/// may win it. The lowest tier joins the main pot while no side pots
/// exist; afterwards new tiers extend the side-pot list, merging into
/// the newest one when the eligible players are identical. Folded bets
/// stay in whichever tiers they reach, as dead money.
pub(crate) fn collect_bets(state: &mut GameState) {
    let mut contributions: Vec<(PlayerId, Chips, bool, bool)> = Vec::new();
    for id in state.player_order.clone() {
        let Some(player) = state.players.get_mut(&id) else {
            continue;
        };
        if player.bet == 0 {
            continue;
        }
        contributions.push((id, player.bet, player.is_in_hand, player.is_all_in));
        player.bet = 0;
    }
    if contributions.is_empty() {
        return;
    }

    let max_bet = contributions.iter().map(|c| c.1).max().unwrap_or(0);
    let mut levels: Vec<Chips> = contributions
        .iter()
        .filter(|&&(_, bet, in_hand, all_in)| in_hand && all_in && bet < max_bet)
        .map(|c| c.1)
        .collect();
    if levels.is_empty() && state.side_pots.is_empty() {
        let total: Chips = contributions.iter().map(|c| c.1).sum();
        state.pot += total;
        return;
    }
    levels.push(max_bet);
    levels.sort_unstable();
    levels.dedup();

    let mut prev = 0;
    for (i, &level) in levels.iter().enumerate() {
        let amount: Chips = contributions
            .iter()
            .map(|&(_, bet, _, _)| bet.min(level).saturating_sub(prev))
            .sum();
        prev = level;
        if amount == 0 {
            continue;
        }
        let eligible: Vec<PlayerId> = contributions
            .iter()
            .filter(|&&(_, bet, in_hand, _)| in_hand && bet >= level)
            .map(|c| c.0)
            .collect();
        if i == 0 && state.side_pots.is_empty() {
            state.pot += amount;
        } else if let Some(last) = state
            .side_pots
            .last_mut()
            .filter(|sp| sp.eligible == eligible)
        {
            last.amount += amount;
        } else {
            debug!("opening a {amount}-chip side pot for {} players", eligible.len());
            state.side_pots.push(SidePot { amount, eligible });
        }
    }
}

/// Pay the main pot to `winners`, splitting evenly. Any bets not yet
/// swept are collected first, so an uncontested win mid-round settles
/// cleanly.
pub(crate) fn award(state: &mut GameState, winners: &[PlayerId]) {
    if winners.is_empty() {
        warn!("no winners to award the pot to");
        return;
    }
    collect_bets(state);
    let amount = std::mem::take(&mut state.pot);
    pay_out(state, amount, winners);
}

/// Pay each side pot to the best hand among its eligible players. A pot
/// whose every eligible player folded after it was carved falls through
/// to the best remaining hand overall.
pub(crate) fn award_side_pots(state: &mut GameState, hands: &HashMap<PlayerId, EvaluatedHand>) {
    let pots: Vec<SidePot> = state.side_pots.drain(..).collect();
    for side_pot in pots {
        let mut winners = best_among(state, &side_pot.eligible, hands);
        if winners.is_empty() {
            winners = best_among(state, &state.player_order.clone(), hands);
        }
        debug!(
            "side pot of {} goes to {} player(s)",
            side_pot.amount,
            winners.len()
        );
        pay_out(state, side_pot.amount, &winners);
    }
}

/// The candidates holding the strongest evaluated hand, in hand order.
/// Candidates without an entry in `hands` (folded players) are skipped.
pub(crate) fn best_among(
    state: &GameState,
    candidates: &[PlayerId],
    hands: &HashMap<PlayerId, EvaluatedHand>,
) -> Vec<PlayerId> {
    let mut best: Option<&EvaluatedHand> = None;
    let mut winners: Vec<PlayerId> = Vec::new();
    for id in &state.player_order {
        if !candidates.contains(id) {
            continue;
        }
        let Some(hand) = hands.get(id) else {
            continue;
        };
        match best {
            Some(current) if hand < current => {}
            Some(current) if hand == current => winners.push(*id),
            _ => {
                best = Some(hand);
                winners = vec![*id];
            }
        }
    }
    winners
}

/// Split `amount` evenly across `winners`. A remainder that does not
/// divide evenly goes one chip at a time to the winners in seating
/// order, starting left of the dealer, so no chip is ever lost.
fn pay_out(state: &mut GameState, amount: Chips, winners: &[PlayerId]) {
    if amount == 0 || winners.is_empty() {
        return;
    }
    let n = winners.len() as Chips;
    let share = amount / n;
    let mut remainder = amount % n;
    for id in winners {
        if let Some(player) = state.players.get_mut(id) {
            player.chips += share;
        }
    }
    if remainder == 0 {
        return;
    }
    let len = state.player_order.len();
    let dealer = state.dealer_idx.unwrap_or(0);
    for i in 1..=len {
        let id = state.player_order[(dealer + i) % len];
        if winners.contains(&id)
            && let Some(player) = state.players.get_mut(&id)
        {
            player.chips += 1;
            remainder -= 1;
            if remainder == 0 {
                break;
            }
        }
    }
    if remainder > 0 {
        warn!("{remainder} odd chips had no winner seat to land on");
    }
}
