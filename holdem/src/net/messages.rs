//! JSON wire protocol between clients and the table.
//!
//! Every frame is an envelope of a `type` tag and a `payload` object.
//! Unknown types and malformed payloads are dropped by the transport
//! layer; nothing on the wire can panic the table.

use serde::{Deserialize, Serialize};

use crate::game::betting::PlayerAction;
use crate::game::entities::{Chips, PlayerId};
use crate::game::state::GameSnapshot;

/// Frames a client may send.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientMessage {
    PlayerJoin(PlayerJoinPayload),
    PlayerReady(PlayerReadyPayload),
    PlayerAction(PlayerActionPayload),
    ChatMessage(ChatPayload),
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PlayerJoinPayload {
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerReadyPayload {
    #[serde(default)]
    pub is_ready: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerActionPayload {
    pub action: String,
    #[serde(default)]
    pub amount: Chips,
}

impl PlayerActionPayload {
    /// Map the wire action to an engine action. `amount` is only
    /// meaningful for raises, where it is the target total bet.
    #[must_use]
    pub fn to_action(&self) -> Option<PlayerAction> {
        match self.action.as_str() {
            "fold" => Some(PlayerAction::Fold),
            "check" => Some(PlayerAction::Check),
            "call" => Some(PlayerAction::Call),
            "raise" => Some(PlayerAction::Raise(self.amount)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatPayload {
    pub message: String,
}

/// Frames the server pushes.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once, immediately after the connection is accepted.
    YourId(YourIdPayload),
    /// The viewer-specific table snapshot, pushed after every change.
    GameState(GameSnapshot),
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct YourIdPayload {
    pub id: PlayerId,
}
