//! Table actor command types.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::game::betting::PlayerAction;
use crate::game::entities::PlayerId;
use crate::game::state::GameSnapshot;

/// Commands a [`TableActor`](super::actor::TableActor) understands. All
/// table mutation flows through these, one at a time.
#[derive(Debug)]
pub enum TableCommand {
    /// A client connected or reconnected. The subscriber channel
    /// receives every broadcast frame, already serialized for this
    /// viewer.
    Connect {
        player_id: PlayerId,
        name: String,
        subscriber: mpsc::Sender<String>,
    },

    /// The client's socket went away.
    Disconnect { player_id: PlayerId },

    /// Seat rename, also accepted mid-session.
    SetName { player_id: PlayerId, name: String },

    /// Ready-check toggle; the hand starts when everyone eligible is
    /// ready.
    SetReady { player_id: PlayerId, is_ready: bool },

    /// A betting action. Invalid actions are logged and dropped.
    Action {
        player_id: PlayerId,
        action: PlayerAction,
    },

    /// Table chat.
    Chat { player_id: PlayerId, message: String },

    /// One-off state query, rendered for the given viewer.
    Snapshot {
        viewer: Option<PlayerId>,
        response: oneshot::Sender<GameSnapshot>,
    },

    /// Internal: a scheduled street advance fired. Dropped when the
    /// hand that scheduled it is already over.
    AdvancePhase { generation: u64 },

    /// Internal: the post-showdown reset timer fired.
    ResetHand { generation: u64 },

    /// Stop the actor.
    Close { response: oneshot::Sender<()> },
}

/// The table actor's inbox is gone; the table no longer exists.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
#[error("table is closed")]
pub struct TableClosed;
