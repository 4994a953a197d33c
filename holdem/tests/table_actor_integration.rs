//! Integration tests for the table actor: command handling, per-viewer
//! broadcasts, deferred transitions, and slow-subscriber eviction.

use std::time::Duration;

use holdem::game::{GameConfig, GamePhase, GameSnapshot, PlayerAction, PlayerId};
use holdem::net::messages::ServerMessage;
use holdem::table::{TableActor, TableConfig, TableHandle};
use tokio::sync::mpsc;

fn fast_config() -> TableConfig {
    TableConfig {
        game: GameConfig::default(),
        runout_delay: Duration::from_millis(10),
        showdown_delay: Duration::from_millis(10),
        subscriber_capacity: 64,
    }
}

fn spawn_table() -> TableHandle {
    let (actor, handle) = TableActor::new(fast_config());
    tokio::spawn(actor.run());
    handle
}

async fn connect(
    handle: &TableHandle,
    name: &str,
    capacity: usize,
) -> (PlayerId, mpsc::Receiver<String>) {
    let id = PlayerId::new();
    let (tx, rx) = mpsc::channel(capacity);
    handle.connect(id, name.to_string(), tx).await.unwrap();
    (id, rx)
}

async fn recv_state(rx: &mut mpsc::Receiver<String>) -> GameSnapshot {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for a frame")
            .expect("subscriber channel closed");
        if let Ok(ServerMessage::GameState(snapshot)) = serde_json::from_str(&frame) {
            return snapshot;
        }
    }
}

async fn wait_for<F>(rx: &mut mpsc::Receiver<String>, mut predicate: F) -> GameSnapshot
where
    F: FnMut(&GameSnapshot) -> bool,
{
    loop {
        let snapshot = recv_state(rx).await;
        if predicate(&snapshot) {
            return snapshot;
        }
    }
}

fn on_turn(snapshot: &GameSnapshot) -> PlayerId {
    let idx = usize::try_from(snapshot.current_turn_index).expect("a betting round is open");
    snapshot.player_order[idx]
}

#[tokio::test]
async fn ready_players_start_a_hand_and_see_redacted_snapshots() {
    let handle = spawn_table();
    let (alice, mut rx_alice) = connect(&handle, "alice", 64).await;
    let (bob, mut rx_bob) = connect(&handle, "bob", 64).await;

    handle.set_ready(alice, true).await.unwrap();
    handle.set_ready(bob, true).await.unwrap();

    let started = wait_for(&mut rx_alice, |s| s.game_phase == GamePhase::PreFlop).await;
    assert!(started.game_started);
    assert_eq!(started.player_order.len(), 2);
    // Alice sees her own hole cards but not Bob's.
    assert_eq!(started.players[&alice].hand.len(), 2);
    assert!(started.players[&bob].hand.is_empty());

    // And symmetrically for Bob.
    let bob_view = wait_for(&mut rx_bob, |s| s.game_phase == GamePhase::PreFlop).await;
    assert_eq!(bob_view.players[&bob].hand.len(), 2);
    assert!(bob_view.players[&alice].hand.is_empty());
}

#[tokio::test]
async fn chat_reaches_every_subscriber() {
    let handle = spawn_table();
    let (alice, _rx_alice) = connect(&handle, "alice", 64).await;
    let (_bob, mut rx_bob) = connect(&handle, "bob", 64).await;

    handle.chat(alice, "good luck".to_string()).await.unwrap();

    let snapshot = wait_for(&mut rx_bob, |s| {
        s.chat_messages
            .iter()
            .any(|m| m.message == "good luck")
    })
    .await;
    let chat = snapshot
        .chat_messages
        .iter()
        .find(|m| m.message == "good luck")
        .unwrap();
    assert_eq!(chat.player_id, alice.to_string());
}

#[tokio::test]
async fn all_in_hand_runs_out_and_resets_on_timers() {
    let handle = spawn_table();
    let (alice, mut rx_alice) = connect(&handle, "alice", 256).await;
    let (bob, _rx_bob) = connect(&handle, "bob", 256).await;

    handle.set_ready(alice, true).await.unwrap();
    handle.set_ready(bob, true).await.unwrap();
    let started = wait_for(&mut rx_alice, |s| s.game_phase == GamePhase::PreFlop).await;

    // Shove and call; the actor's timers must then walk the board out
    // to showdown and reset the table without further input.
    let first = on_turn(&started);
    handle.action(first, PlayerAction::Raise(1000)).await.unwrap();
    let second = if first == alice { bob } else { alice };
    handle.action(second, PlayerAction::Call).await.unwrap();

    let showdown = wait_for(&mut rx_alice, |s| s.game_phase == GamePhase::Showdown).await;
    assert_eq!(showdown.community_cards.len(), 5);
    assert_eq!(showdown.pot, 0);
    let chips: u32 = showdown.players.values().map(|p| p.chips).sum();
    assert_eq!(chips, 2000);
    // Both live hands are open at showdown.
    assert!(showdown.players.values().all(|p| p.hand.len() == 2));

    let reset = wait_for(&mut rx_alice, |s| s.game_phase == GamePhase::Waiting).await;
    assert!(!reset.game_started);
}

#[tokio::test]
async fn slow_subscriber_is_dropped_without_hurting_others() {
    let handle = spawn_table();
    let (_alice, mut rx_alice) = connect(&handle, "alice", 64).await;
    // Bob's outbound queue holds a single frame and is never drained.
    let (bob, _rx_bob_kept_undrained) = connect(&handle, "bob", 1).await;

    // Each broadcast attempt pushes Bob's queue over; the actor must
    // evict him and keep serving Alice.
    for i in 0..3 {
        handle.chat(bob, format!("filler {i}")).await.unwrap();
    }

    let snapshot = wait_for(&mut rx_alice, |s| s.players.len() == 1).await;
    assert!(!snapshot.players.contains_key(&bob));
}

#[tokio::test]
async fn snapshot_query_and_close() {
    let handle = spawn_table();
    let (_alice, _rx) = connect(&handle, "alice", 64).await;

    let snapshot = handle.snapshot(None).await.unwrap();
    assert_eq!(snapshot.game_phase, GamePhase::Waiting);
    assert_eq!(snapshot.players.len(), 1);
    assert_eq!(snapshot.dealer_index, -1);

    handle.close().await.unwrap();
    assert!(handle.snapshot(None).await.is_err());
}

#[tokio::test]
async fn disconnect_mid_hand_forfeits_to_the_opponent() {
    let handle = spawn_table();
    let (alice, mut rx_alice) = connect(&handle, "alice", 256).await;
    let (bob, _rx_bob) = connect(&handle, "bob", 256).await;

    handle.set_ready(alice, true).await.unwrap();
    handle.set_ready(bob, true).await.unwrap();
    wait_for(&mut rx_alice, |s| s.game_phase == GamePhase::PreFlop).await;

    handle.disconnect(bob).await.unwrap();

    // Bob is folded out, Alice wins the blinds, and the table resets
    // with Bob's seat freed.
    let snapshot = wait_for(&mut rx_alice, |s| s.game_phase == GamePhase::Waiting).await;
    assert!(!snapshot.players.contains_key(&bob));
    // Alice joined first, so she dealt and posted the big blind; the
    // forfeit nets her Bob's small blind.
    assert_eq!(snapshot.players[&alice].chips, 1010);
}
