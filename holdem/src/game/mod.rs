//! Core game logic: cards, hand evaluation, betting, pots, and the
//! table state machine.

pub mod betting;
pub mod constants;
pub mod entities;
pub mod hand;
pub(crate) mod pot;
pub mod state;

pub use betting::{ActionError, PlayerAction, should_end_round};
pub use entities::{Card, Chips, PlayerId, SidePot, Suit, Value};
pub use hand::{EvaluatedHand, HandCategory, evaluate};
pub use state::{GameConfig, GamePhase, GameSnapshot, GameState, PlayerSnapshot, Transition};
