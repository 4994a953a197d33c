//! # Holdem
//!
//! A multiplayer Texas Hold'em table engine with a websocket-friendly
//! session layer.
//!
//! The crate splits into three layers:
//!
//! - [`game`]: pure game logic. Cards and the deck, 5-to-7-card hand
//!   evaluation, betting rounds, pot and side-pot accounting, and the
//!   [`game::GameState`] phase machine that ties them together. No IO,
//!   no async; every mutation reports follow-up work as a
//!   [`game::Transition`].
//! - [`table`]: the session actor. One [`table::TableActor`] task owns
//!   a `GameState`, consumes [`table::TableCommand`]s from its inbox,
//!   and pushes per-viewer snapshot frames to subscribers. Timed steps
//!   re-enter the inbox as generation-stamped commands.
//! - [`net`]: the JSON wire protocol shared with clients.
//!
//! ## Example
//!
//! ```
//! use holdem::game::{GameConfig, GamePhase, GameState, PlayerId};
//!
//! let mut table = GameState::new(GameConfig::default());
//! let alice = PlayerId::new();
//! let bob = PlayerId::new();
//! table.player_connected(alice, "alice".to_string());
//! table.player_connected(bob, "bob".to_string());
//! table.set_ready(alice, true);
//! table.set_ready(bob, true);
//! assert_eq!(table.phase(), GamePhase::PreFlop);
//! ```

pub mod game;
pub mod net;
pub mod table;

pub use game::{GameConfig, GamePhase, GameSnapshot, GameState, PlayerAction, PlayerId};
pub use table::{TableActor, TableConfig, TableHandle};
