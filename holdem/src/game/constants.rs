//! Table-wide constants.

use super::entities::Chips;

/// Stack every player receives on their first connection.
pub const STARTING_CHIPS: Chips = 1000;

/// Forced bet posted by the seat left of the dealer.
pub const SMALL_BLIND: Chips = 10;

/// Forced bet posted two seats left of the dealer. Also the initial
/// minimum raise increment of every betting round.
pub const BIG_BLIND: Chips = 20;

/// Chat log is truncated to this many most-recent messages.
pub const MAX_CHAT_MESSAGES: usize = 50;

/// Hole cards dealt to each player.
pub const HOLE_CARDS: usize = 2;
