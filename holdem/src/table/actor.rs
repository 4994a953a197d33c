//! The table actor: single owner of a [`GameState`], fed by an mpsc
//! inbox and fanning snapshots out to subscribers.
//!
//! Timed steps (all-in runouts, the post-showdown pause) never block the
//! actor. They are spawned as sleep-then-send tasks that re-enter the
//! inbox as commands, stamped with the hand generation so a timer from a
//! finished hand is ignored.

use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

use super::config::TableConfig;
use super::messages::{TableClosed, TableCommand};
use crate::game::betting::PlayerAction;
use crate::game::entities::PlayerId;
use crate::game::state::{GamePhase, GameSnapshot, GameState, Transition};
use crate::net::messages::ServerMessage;

/// Cloneable handle for sending commands to a running table actor.
#[derive(Clone, Debug)]
pub struct TableHandle {
    sender: mpsc::Sender<TableCommand>,
}

impl TableHandle {
    pub async fn connect(
        &self,
        player_id: PlayerId,
        name: String,
        subscriber: mpsc::Sender<String>,
    ) -> Result<(), TableClosed> {
        self.send(TableCommand::Connect {
            player_id,
            name,
            subscriber,
        })
        .await
    }

    pub async fn disconnect(&self, player_id: PlayerId) -> Result<(), TableClosed> {
        self.send(TableCommand::Disconnect { player_id }).await
    }

    pub async fn set_name(&self, player_id: PlayerId, name: String) -> Result<(), TableClosed> {
        self.send(TableCommand::SetName { player_id, name }).await
    }

    pub async fn set_ready(&self, player_id: PlayerId, is_ready: bool) -> Result<(), TableClosed> {
        self.send(TableCommand::SetReady {
            player_id,
            is_ready,
        })
        .await
    }

    pub async fn action(
        &self,
        player_id: PlayerId,
        action: PlayerAction,
    ) -> Result<(), TableClosed> {
        self.send(TableCommand::Action { player_id, action }).await
    }

    pub async fn chat(&self, player_id: PlayerId, message: String) -> Result<(), TableClosed> {
        self.send(TableCommand::Chat { player_id, message }).await
    }

    /// Fetch a snapshot rendered for `viewer`.
    pub async fn snapshot(&self, viewer: Option<PlayerId>) -> Result<GameSnapshot, TableClosed> {
        let (response, receiver) = oneshot::channel();
        self.send(TableCommand::Snapshot { viewer, response })
            .await?;
        receiver.await.map_err(|_| TableClosed)
    }

    /// Stop the actor and wait for it to acknowledge.
    pub async fn close(&self) -> Result<(), TableClosed> {
        let (response, receiver) = oneshot::channel();
        self.send(TableCommand::Close { response }).await?;
        receiver.await.map_err(|_| TableClosed)
    }

    async fn send(&self, command: TableCommand) -> Result<(), TableClosed> {
        self.sender.send(command).await.map_err(|_| TableClosed)
    }
}

/// Owns the game state for one table and processes commands serially.
pub struct TableActor {
    config: TableConfig,
    state: GameState,
    inbox: mpsc::Receiver<TableCommand>,
    /// Clone of the inbox sender, used by deferred-step timers.
    sender: mpsc::Sender<TableCommand>,
    subscribers: HashMap<PlayerId, mpsc::Sender<String>>,
    /// Bumped every time a hand ends. Deferred commands stamped with an
    /// older generation are stale and dropped.
    generation: u64,
}

impl TableActor {
    #[must_use]
    pub fn new(config: TableConfig) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(100);
        let actor = Self {
            config,
            state: GameState::new(config.game),
            inbox,
            sender: sender.clone(),
            subscribers: HashMap::new(),
            generation: 0,
        };
        (actor, TableHandle { sender })
    }

    /// Process commands until closed or until every handle is dropped.
    pub async fn run(mut self) {
        info!("table actor started");
        while let Some(command) = self.inbox.recv().await {
            if self.handle_command(command) {
                break;
            }
        }
        info!("table actor stopped");
    }

    /// Returns true when the actor should stop.
    fn handle_command(&mut self, command: TableCommand) -> bool {
        let phase_before = self.state.phase();

        match command {
            TableCommand::Connect {
                player_id,
                name,
                subscriber,
            } => {
                self.subscribers.insert(player_id, subscriber);
                self.state.player_connected(player_id, name);
                self.broadcast();
            }
            TableCommand::Disconnect { player_id } => {
                self.subscribers.remove(&player_id);
                let transition = self.state.player_disconnected(player_id);
                self.apply_transition(transition);
                self.broadcast();
            }
            TableCommand::SetName { player_id, name } => {
                self.state.set_player_name(player_id, name);
                self.broadcast();
            }
            TableCommand::SetReady {
                player_id,
                is_ready,
            } => {
                let transition = self.state.set_ready(player_id, is_ready);
                self.apply_transition(transition);
                self.broadcast();
            }
            TableCommand::Action { player_id, action } => {
                match self.state.apply_action(player_id, action) {
                    Ok(transition) => {
                        self.apply_transition(transition);
                        self.broadcast();
                    }
                    Err(err) => {
                        warn!("rejected action {action} from {}: {err}", player_id.short());
                    }
                }
            }
            TableCommand::Chat { player_id, message } => {
                self.state.push_chat(player_id, message);
                self.broadcast();
            }
            TableCommand::Snapshot { viewer, response } => {
                let _ = response.send(self.state.snapshot_for(viewer));
            }
            TableCommand::AdvancePhase { generation } => {
                if generation != self.generation {
                    debug!("dropping stale street advance");
                } else {
                    let transition = self.state.next_phase();
                    self.apply_transition(transition);
                    self.broadcast();
                }
            }
            TableCommand::ResetHand { generation } => {
                if generation != self.generation {
                    debug!("dropping stale hand reset");
                } else {
                    self.state.end_hand();
                    self.broadcast();
                }
            }
            TableCommand::Close { response } => {
                let _ = response.send(());
                return true;
            }
        }

        if phase_before != GamePhase::Waiting && self.state.phase() == GamePhase::Waiting {
            self.generation = self.generation.wrapping_add(1);
        }
        false
    }

    fn apply_transition(&mut self, transition: Transition) {
        match transition {
            Transition::None => {}
            Transition::DeferredPhase => {
                self.schedule(self.config.runout_delay, false);
            }
            Transition::DeferredReset => {
                self.schedule(self.config.showdown_delay, true);
            }
        }
    }

    fn schedule(&self, delay: Duration, reset: bool) {
        let sender = self.sender.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let command = if reset {
                TableCommand::ResetHand { generation }
            } else {
                TableCommand::AdvancePhase { generation }
            };
            let _ = sender.send(command).await;
        });
    }

    /// Push a personalized snapshot frame to every subscriber. A
    /// subscriber whose queue is full or closed is treated as a lost
    /// connection: unsubscribed and folded out of any live hand.
    fn broadcast(&mut self) {
        let mut lost: Vec<PlayerId> = Vec::new();
        for (&id, subscriber) in &self.subscribers {
            let frame = ServerMessage::GameState(self.state.snapshot_for(Some(id)));
            let encoded = match serde_json::to_string(&frame) {
                Ok(encoded) => encoded,
                Err(err) => {
                    error!("failed to encode snapshot for {}: {err}", id.short());
                    continue;
                }
            };
            if let Err(err) = subscriber.try_send(encoded) {
                match err {
                    mpsc::error::TrySendError::Full(_) => {
                        warn!("subscriber {} fell behind, dropping them", id.short());
                    }
                    mpsc::error::TrySendError::Closed(_) => {
                        debug!("subscriber {} is gone", id.short());
                    }
                }
                lost.push(id);
            }
        }
        if lost.is_empty() {
            return;
        }
        let phase_before = self.state.phase();
        for id in lost {
            self.subscribers.remove(&id);
            let transition = self.state.player_disconnected(id);
            self.apply_transition(transition);
        }
        if phase_before != GamePhase::Waiting && self.state.phase() == GamePhase::Waiting {
            self.generation = self.generation.wrapping_add(1);
        }
        // The forced folds changed the state everyone sees.
        self.broadcast();
    }
}
