//! Property-based test: no sequence of accepted commands creates or
//! destroys chips. Stacks, live bets, and pots always sum to what the
//! seated players brought to the table.

use holdem::game::{GameConfig, GamePhase, GameState, PlayerAction, PlayerId};
use proptest::prelude::*;

fn seat_players(count: usize) -> (GameState, Vec<PlayerId>) {
    let mut state = GameState::new(GameConfig::default());
    let mut ids = Vec::new();
    for i in 0..count {
        let id = PlayerId::new();
        state.player_connected(id, format!("p{i}"));
        ids.push(id);
    }
    (state, ids)
}

fn decode_action(choice: u8, amount: u32) -> PlayerAction {
    match choice % 4 {
        0 => PlayerAction::Fold,
        1 => PlayerAction::Check,
        2 => PlayerAction::Call,
        _ => PlayerAction::Raise(amount),
    }
}

proptest! {
    /// Drive the table with arbitrary (often illegal) actions and keep
    /// checking the conservation invariant. Rejected actions must not
    /// move chips either.
    #[test]
    fn chips_are_conserved(
        player_count in 2usize..=5,
        moves in prop::collection::vec((any::<u8>(), 1u32..=2_500), 1..120),
    ) {
        let (mut state, ids) = seat_players(player_count);
        let expected = (player_count as u32) * 1000;
        prop_assert_eq!(state.total_chips(), expected);

        for id in &ids {
            state.set_ready(*id, true);
        }
        prop_assert_eq!(state.phase(), GamePhase::PreFlop);
        prop_assert_eq!(state.total_chips(), expected);

        for (choice, amount) in moves {
            match state.phase() {
                phase if phase.is_betting() => {
                    match state.current_turn_player() {
                        Some(actor) => {
                            // Errors are fine; they must leave the
                            // chips untouched.
                            let _ = state.apply_action(actor, decode_action(choice, amount));
                        }
                        // Everyone is all-in; run out the board.
                        None => {
                            state.next_phase();
                        }
                    }
                }
                GamePhase::Showdown => state.end_hand(),
                GamePhase::Waiting => {
                    for id in &ids {
                        state.set_ready(*id, true);
                    }
                }
                _ => unreachable!(),
            }
            prop_assert_eq!(state.total_chips(), expected);
        }
    }
}
