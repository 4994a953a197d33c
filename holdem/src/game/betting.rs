//! Betting round rules: action validation, round-termination detection,
//! and turn advancement.
//!
//! Round state (last bet to match, minimum raise increment, action
//! closer) lives on [`GameState`]; the functions here read and update it
//! under the state machine's direction.

use log::debug;
use std::fmt;
use thiserror::Error;

use super::entities::{Chips, Player, PlayerId};
use super::state::GameState;

/// A betting intent from a client. `Raise` carries the target total bet
/// for the round, not the increment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlayerAction {
    Fold,
    Check,
    Call,
    Raise(Chips),
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Fold => "fold".to_string(),
            Self::Check => "check".to_string(),
            Self::Call => "call".to_string(),
            Self::Raise(total) => format!("raise to {total}"),
        };
        write!(f, "{repr}")
    }
}

/// Reasons an action is rejected. Rejected actions leave the game state
/// untouched.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ActionError {
    #[error("not this player's turn")]
    OutOfTurn,
    #[error("player is not in the hand")]
    NotInHand,
    #[error("player is already all-in")]
    AllIn,
    #[error("no betting round is open")]
    BettingClosed,
    #[error("cannot check while owing {owed}")]
    CheckWhileOwing { owed: Chips },
    #[error("raise must bring the total bet to at least {minimum}")]
    RaiseBelowMinimum { minimum: Chips },
    #[error("player is not at the table")]
    UnknownPlayer,
}

/// Validate and apply one action. Returns whether the betting round is
/// now closed, either because the action closer finished their turn
/// with nothing left owed or because [`should_end_round`] holds.
pub(crate) fn apply(
    state: &mut GameState,
    actor: PlayerId,
    action: PlayerAction,
) -> Result<bool, ActionError> {
    if !state.phase().is_betting() {
        return Err(ActionError::BettingClosed);
    }
    if state.current_turn_player() != Some(actor) {
        return Err(ActionError::OutOfTurn);
    }
    {
        let player = state
            .players
            .get(&actor)
            .ok_or(ActionError::UnknownPlayer)?;
        if !player.is_in_hand {
            return Err(ActionError::NotInHand);
        }
        if player.is_all_in {
            return Err(ActionError::AllIn);
        }
    }

    let at_closer = state.action_closer == Some(actor);
    let last_bet = state.last_bet;
    let min_total = last_bet + state.min_raise;
    let mut closed_by_closer = false;

    match action {
        PlayerAction::Fold => {
            let player = player_mut(state, actor)?;
            player.is_in_hand = false;
            player.has_acted = true;
            debug!("{} folds", player.name);
        }
        PlayerAction::Check => {
            let player = player_mut(state, actor)?;
            let owed = last_bet.saturating_sub(player.bet);
            if owed > 0 {
                return Err(ActionError::CheckWhileOwing { owed });
            }
            player.has_acted = true;
            debug!("{} checks", player.name);
            closed_by_closer = at_closer;
        }
        PlayerAction::Call => {
            let player = player_mut(state, actor)?;
            let owed = last_bet.saturating_sub(player.bet);
            if owed > 0 {
                // A call short of the full amount forces all-in.
                let paid = player.commit(owed);
                debug!("{} calls {paid} (all-in: {})", player.name, player.is_all_in);
            } else {
                debug!("{} checks (nothing owed)", player.name);
            }
            player.has_acted = true;
            closed_by_closer = at_closer;
        }
        PlayerAction::Raise(total) => {
            let new_total = {
                let player = player_mut(state, actor)?;
                let delta = total.saturating_sub(player.bet);
                if delta == 0 {
                    return Err(ActionError::RaiseBelowMinimum { minimum: min_total });
                }
                let forced_all_in = player.chips <= delta;
                if !forced_all_in && total < min_total {
                    return Err(ActionError::RaiseBelowMinimum { minimum: min_total });
                }
                player.commit(delta);
                player.has_acted = true;
                debug!(
                    "{} raises to {} (all-in: {})",
                    player.name, player.bet, player.is_all_in
                );
                player.bet
            };
            if new_total >= min_total {
                // A full raise reopens the action: everyone else must
                // act again, and the raiser now closes the round.
                state.min_raise = new_total - last_bet;
                state.last_bet = new_total;
                state.action_closer = Some(actor);
                let order = state.player_order.clone();
                for id in order {
                    if id == actor {
                        continue;
                    }
                    if let Some(p) = state.players.get_mut(&id)
                        && p.is_in_hand
                        && !p.is_all_in
                    {
                        p.has_acted = false;
                    }
                }
            } else if new_total > last_bet {
                // All-in short raise: others must match the new total,
                // but the action is not reopened and the minimum raise
                // increment is unchanged.
                state.last_bet = new_total;
            }
        }
    }

    Ok(closed_by_closer || should_end_round(state))
}

fn player_mut(state: &mut GameState, id: PlayerId) -> Result<&mut Player, ActionError> {
    state.players.get_mut(&id).ok_or(ActionError::UnknownPlayer)
}

/// A betting round is over when at most one player remains in the hand,
/// or when every in-hand player who can still act has acted and, if a
/// bet is outstanding, matched it. Checked after every accepted action
/// regardless of the action-closer shortcut, since all-ins and
/// disconnects can close a round without the nominal closer acting.
#[must_use]
pub fn should_end_round(state: &GameState) -> bool {
    let mut in_hand = 0;
    let mut can_act = 0;
    let mut settled = 0;
    for id in &state.player_order {
        let Some(p) = state.players.get(id) else {
            continue;
        };
        if !p.is_in_hand {
            continue;
        }
        in_hand += 1;
        if p.is_all_in {
            continue;
        }
        can_act += 1;
        if p.has_acted && (state.last_bet == 0 || p.bet == state.last_bet) {
            settled += 1;
        }
    }
    in_hand <= 1 || (can_act > 0 && settled == can_act)
}

/// Move the turn to the next seat that can act, scanning the hand order
/// once from the seat after the current turn and skipping folded,
/// all-in, and disconnected players. Returns false when nobody can act,
/// in which case the state machine forces the next phase.
pub(crate) fn advance_turn(state: &mut GameState) -> bool {
    let n = state.player_order.len();
    if n == 0 {
        return false;
    }
    let start = state.current_turn.unwrap_or(0);
    for i in 1..=n {
        let idx = (start + i) % n;
        let id = state.player_order[idx];
        if state.players.get(&id).is_some_and(Player::can_act) {
            state.current_turn = Some(idx);
            return true;
        }
    }
    false
}
