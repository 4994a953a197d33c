//! The authoritative table state and its phase machine.
//!
//! One [`GameState`] per table, owned by a single actor task. Every
//! mutation returns a [`Transition`] telling the owner whether a
//! deferred step (street runout, post-showdown reset) must be scheduled;
//! the state itself never sleeps or spawns.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use super::betting::{self, ActionError, PlayerAction};
use super::constants::{BIG_BLIND, HOLE_CARDS, MAX_CHAT_MESSAGES, SMALL_BLIND, STARTING_CHIPS};
use super::entities::{Card, ChatMessage, Chips, Deck, Player, PlayerId, SidePot};
use super::hand::{self, EvaluatedHand};
use super::pot;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GamePhase {
    Waiting,
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl GamePhase {
    /// Phases with an open betting round.
    #[must_use]
    pub fn is_betting(self) -> bool {
        matches!(self, Self::PreFlop | Self::Flop | Self::Turn | Self::River)
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::PreFlop => "pre-flop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
        };
        write!(f, "{repr}")
    }
}

/// Follow-up work the caller must schedule after a mutation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Transition {
    #[default]
    None,
    /// Nobody left who can act; deal the next street after a short
    /// pause so clients can watch the runout.
    DeferredPhase,
    /// Showdown resolved; reset to waiting after the display pause.
    DeferredReset,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct GameConfig {
    pub starting_chips: Chips,
    pub small_blind: Chips,
    pub big_blind: Chips,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_chips: STARTING_CHIPS,
            small_blind: SMALL_BLIND,
            big_blind: BIG_BLIND,
        }
    }
}

#[derive(Debug)]
pub struct GameState {
    pub(crate) config: GameConfig,
    pub(crate) players: HashMap<PlayerId, Player>,
    /// Join order, stable across hands.
    pub(crate) seating: Vec<PlayerId>,
    /// Seats dealt into the current hand, fixed at hand start.
    pub(crate) player_order: Vec<PlayerId>,
    pub(crate) dealer_idx: Option<usize>,
    /// Index into `player_order` of the seat due to act.
    pub(crate) current_turn: Option<usize>,
    pub(crate) phase: GamePhase,
    pub(crate) deck: Deck,
    pub(crate) community: Vec<Card>,
    pub(crate) pot: Chips,
    pub(crate) side_pots: Vec<SidePot>,
    /// Highest total bet of the current round.
    pub(crate) last_bet: Chips,
    /// Minimum increment a raise must add on top of `last_bet`.
    pub(crate) min_raise: Chips,
    /// The seat whose no-owed action closes the round, absent further
    /// raises.
    pub(crate) action_closer: Option<PlayerId>,
    pub(crate) ready: HashMap<PlayerId, bool>,
    pub(crate) winning_hand_desc: String,
    pub(crate) chat: VecDeque<ChatMessage>,
}

impl GameState {
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            players: HashMap::new(),
            seating: Vec::new(),
            player_order: Vec::new(),
            dealer_idx: None,
            current_turn: None,
            phase: GamePhase::Waiting,
            deck: Deck::default(),
            community: Vec::new(),
            pot: 0,
            side_pots: Vec::new(),
            last_bet: 0,
            min_raise: config.big_blind,
            action_closer: None,
            ready: HashMap::new(),
            winning_hand_desc: String::new(),
            chat: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[must_use]
    pub fn pot(&self) -> Chips {
        self.pot
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// The player due to act, if a betting round is open.
    #[must_use]
    pub fn current_turn_player(&self) -> Option<PlayerId> {
        self.current_turn
            .and_then(|idx| self.player_order.get(idx))
            .copied()
    }

    /// Sum of every chip on the table: stacks, live bets, and all pots.
    /// Constant between a join and the next roster change.
    #[must_use]
    pub fn total_chips(&self) -> Chips {
        let held: Chips = self.players.values().map(|p| p.chips + p.bet).sum();
        let side: Chips = self.side_pots.iter().map(|sp| sp.amount).sum();
        held + self.pot + side
    }

    /// Seat a new player, or mark a returning one connected again.
    pub fn player_connected(&mut self, id: PlayerId, name: String) {
        if let Some(player) = self.players.get_mut(&id) {
            player.is_connected = true;
            if !name.is_empty() {
                player.name = name;
            }
            info!("player {} reconnected", player.name);
            return;
        }
        info!("player {name} ({}) joined", id.short());
        self.players
            .insert(id, Player::new(id, name, self.config.starting_chips));
        self.seating.push(id);
        self.ready.insert(id, false);
    }

    pub fn set_player_name(&mut self, id: PlayerId, name: String) {
        if name.is_empty() {
            return;
        }
        if let Some(player) = self.players.get_mut(&id) {
            debug!("player {} renamed to {name}", player.name);
            player.name = name;
        }
    }

    /// Handle a dropped connection. Between hands the seat is freed
    /// immediately; mid-hand the player is folded in place, which may
    /// close the betting round or even the hand.
    pub fn player_disconnected(&mut self, id: PlayerId) -> Transition {
        let (was_in_hand, name) = match self.players.get_mut(&id) {
            Some(player) => {
                player.is_connected = false;
                (player.is_in_hand, player.name.clone())
            }
            None => return Transition::None,
        };
        info!("player {name} disconnected");

        match self.phase {
            GamePhase::Waiting => {
                self.remove_player(id);
                Transition::None
            }
            // The pot is already settled; the seat is freed at reset.
            GamePhase::Showdown => Transition::None,
            _ => {
                if !was_in_hand {
                    return Transition::None;
                }
                if let Some(player) = self.players.get_mut(&id) {
                    player.is_in_hand = false;
                    player.has_acted = true;
                }
                debug!("folding {name} out of the live hand");
                if let Some(transition) = self.maybe_short_circuit() {
                    return transition;
                }
                if betting::should_end_round(self) {
                    return self.next_phase();
                }
                if self.current_turn_player() == Some(id) && !betting::advance_turn(self) {
                    return self.next_phase();
                }
                Transition::None
            }
        }
    }

    /// Flip a player's ready flag. When every connected, funded player
    /// is ready and at least two qualify, the next hand starts. Returns
    /// `DeferredPhase` when the blinds put everyone all-in immediately,
    /// so the owner can pace the runout.
    pub fn set_ready(&mut self, id: PlayerId, is_ready: bool) -> Transition {
        if let Some(flag) = self.ready.get_mut(&id) {
            *flag = is_ready;
        }
        if self.phase != GamePhase::Waiting {
            return Transition::None;
        }
        let eligible: Vec<PlayerId> = self
            .seating
            .iter()
            .copied()
            .filter(|pid| {
                self.players
                    .get(pid)
                    .is_some_and(|p| p.is_connected && p.chips > 0)
            })
            .collect();
        if eligible.len() < 2 {
            return Transition::None;
        }
        if eligible
            .iter()
            .all(|pid| self.ready.get(pid).copied().unwrap_or(false))
        {
            return self.start_hand(eligible);
        }
        Transition::None
    }

    fn start_hand(&mut self, order: Vec<PlayerId>) -> Transition {
        let n = order.len();
        info!("starting a hand with {n} players");

        self.phase = GamePhase::PreFlop;
        self.player_order = order;
        self.community.clear();
        self.side_pots.clear();
        self.pot = 0;
        self.winning_hand_desc.clear();
        for flag in self.ready.values_mut() {
            *flag = false;
        }
        for id in &self.player_order {
            if let Some(player) = self.players.get_mut(id) {
                player.reset_for_hand();
            }
        }

        let dealer = match self.dealer_idx {
            Some(d) => (d + 1) % n,
            None => 0,
        };
        self.dealer_idx = Some(dealer);

        self.deck = Deck::default();
        self.deck.shuffle();
        for id in self.player_order.clone() {
            for _ in 0..HOLE_CARDS {
                if let Some(card) = self.deck.deal()
                    && let Some(player) = self.players.get_mut(&id)
                {
                    player.hand.push(card);
                }
            }
        }

        // With two players the dealer still posts nothing here; the two
        // seats after the dealer wrap around onto the dealer's opponent
        // and the dealer themselves.
        let sb_idx = (dealer + 1) % n;
        let bb_idx = (dealer + 2) % n;
        let small_blind = self.config.small_blind;
        let big_blind = self.config.big_blind;
        self.post_blind(sb_idx, small_blind);
        self.post_blind(bb_idx, big_blind);

        // The bet to match is the full big blind even if the blind seat
        // could only post a short all-in.
        self.last_bet = big_blind;
        self.min_raise = big_blind;
        self.action_closer = Some(self.player_order[bb_idx]);
        self.current_turn = Some((bb_idx + 1) % n);
        let first_can_act = self
            .current_turn_player()
            .and_then(|pid| self.players.get(&pid))
            .is_some_and(Player::can_act);
        let transition = if first_can_act || betting::advance_turn(self) {
            Transition::None
        } else {
            // The blinds consumed every stack; nobody gets a turn and
            // the streets must run out on the clock.
            debug!("blinds put every seat all-in; running out the board");
            self.current_turn = None;
            Transition::DeferredPhase
        };

        self.push_system_chat(format!("New hand started with {n} players"));
        transition
    }

    fn post_blind(&mut self, seat: usize, amount: Chips) {
        let id = self.player_order[seat];
        if let Some(player) = self.players.get_mut(&id) {
            let posted = player.commit(amount);
            debug!("{} posts blind of {posted}", player.name);
        }
    }

    /// Apply a betting action and run the follow-on bookkeeping: hand
    /// short-circuit, round closure, turn advancement.
    pub fn apply_action(
        &mut self,
        actor: PlayerId,
        action: PlayerAction,
    ) -> Result<Transition, ActionError> {
        let round_closed = betting::apply(self, actor, action)?;
        if let Some(transition) = self.maybe_short_circuit() {
            return Ok(transition);
        }
        if round_closed {
            return Ok(self.next_phase());
        }
        if !betting::advance_turn(self) {
            return Ok(self.next_phase());
        }
        Ok(Transition::None)
    }

    /// If at most one player remains in the hand, award everything to
    /// the survivor without a showdown and end the hand.
    fn maybe_short_circuit(&mut self) -> Option<Transition> {
        if !self.phase.is_betting() {
            return None;
        }
        let survivors: Vec<PlayerId> = self
            .player_order
            .iter()
            .copied()
            .filter(|id| self.players.get(id).is_some_and(|p| p.is_in_hand))
            .collect();
        if survivors.len() > 1 {
            return None;
        }

        pot::collect_bets(self);
        // The sole survivor takes the side pots too, eligible or not.
        let tiered: Chips = self.side_pots.drain(..).map(|sp| sp.amount).sum();
        self.pot += tiered;

        if let Some(&winner) = survivors.first() {
            let name = self
                .players
                .get(&winner)
                .map_or_else(|| winner.short(), |p| p.name.clone());
            info!("{name} wins {} uncontested", self.pot);
            self.winning_hand_desc = format!("{name} wins (everyone else folded)");
            pot::award(self, &[winner]);
        } else {
            warn!("hand ended with no players left in it");
            self.pot = 0;
        }
        self.end_hand();
        Some(Transition::None)
    }

    /// Close the current betting round and move to the next street, or
    /// to showdown after the river. Returns `DeferredPhase` when nobody
    /// can act on the new street (everyone all-in), so the owner can
    /// pace the runout.
    pub fn next_phase(&mut self) -> Transition {
        pot::collect_bets(self);

        match self.phase {
            GamePhase::PreFlop => {
                self.phase = GamePhase::Flop;
                self.deal_community(3);
            }
            GamePhase::Flop => {
                self.phase = GamePhase::Turn;
                self.deal_community(1);
            }
            GamePhase::Turn => {
                self.phase = GamePhase::River;
                self.deal_community(1);
            }
            GamePhase::River => return self.showdown(),
            GamePhase::Waiting | GamePhase::Showdown => return Transition::None,
        }
        debug!("dealt the {}", self.phase);

        for id in self.player_order.clone() {
            if let Some(player) = self.players.get_mut(&id)
                && player.is_in_hand
                && !player.is_all_in
            {
                player.has_acted = false;
            }
        }
        self.last_bet = 0;
        self.min_raise = self.config.big_blind;

        // Post-flop action starts left of the dealer and closes on the
        // last able seat at or before the dealer.
        let n = self.player_order.len();
        let dealer = self.dealer_idx.unwrap_or(0);
        self.current_turn = None;
        self.action_closer = None;
        for i in 1..=n {
            let idx = (dealer + i) % n;
            let id = self.player_order[idx];
            if self.players.get(&id).is_some_and(Player::can_act) {
                self.current_turn = Some(idx);
                break;
            }
        }
        for i in 0..n {
            let idx = (dealer + n - i) % n;
            let id = self.player_order[idx];
            if self.players.get(&id).is_some_and(Player::can_act) {
                self.action_closer = Some(id);
                break;
            }
        }

        if self.current_turn.is_none() {
            debug!("no one can act on the {}; running out the board", self.phase);
            return Transition::DeferredPhase;
        }
        Transition::None
    }

    fn deal_community(&mut self, count: usize) {
        self.deck.burn();
        for _ in 0..count {
            if let Some(card) = self.deck.deal() {
                self.community.push(card);
            }
        }
    }

    fn showdown(&mut self) -> Transition {
        self.phase = GamePhase::Showdown;
        self.current_turn = None;
        self.action_closer = None;

        let mut hands: HashMap<PlayerId, EvaluatedHand> = HashMap::new();
        for id in &self.player_order {
            let Some(player) = self.players.get(id) else {
                continue;
            };
            if !player.is_in_hand || player.hand.len() != HOLE_CARDS {
                continue;
            }
            let mut cards = player.hand.clone();
            cards.extend(&self.community);
            hands.insert(*id, hand::evaluate(&cards));
        }
        if hands.is_empty() {
            warn!("showdown reached with no live hands");
            self.end_hand();
            return Transition::None;
        }

        let winners = pot::best_among(self, &self.player_order.clone(), &hands);
        self.winning_hand_desc = if let [sole] = winners[..] {
            let name = self
                .players
                .get(&sole)
                .map_or_else(|| sole.short(), |p| p.name.clone());
            let category = &hands[&sole].category;
            info!("{name} wins the showdown with {category}");
            format!("{name} wins with {category}")
        } else {
            info!("split pot between {} players", winners.len());
            "Split pot!".to_string()
        };

        pot::award(self, &winners);
        pot::award_side_pots(self, &hands);
        Transition::DeferredReset
    }

    /// Return to waiting: clear per-hand state, then drop busted and
    /// departed players.
    pub fn end_hand(&mut self) {
        self.phase = GamePhase::Waiting;
        for player in self.players.values_mut() {
            player.reset_after_hand();
        }
        self.player_order.clear();
        self.community.clear();
        self.side_pots.clear();
        self.pot = 0;
        self.last_bet = 0;
        self.min_raise = self.config.big_blind;
        self.current_turn = None;
        self.action_closer = None;

        let gone: Vec<PlayerId> = self
            .seating
            .iter()
            .copied()
            .filter(|id| {
                self.players
                    .get(id)
                    .is_none_or(|p| p.chips == 0 || !p.is_connected)
            })
            .collect();
        let mut eliminated = 0;
        for id in gone {
            if let Some(player) = self.players.get(&id) {
                if player.chips == 0 && player.is_connected {
                    eliminated += 1;
                }
                info!("removing player {} from the table", player.name);
            }
            self.remove_player(id);
        }
        if eliminated > 0 {
            self.push_system_chat(format!("{eliminated} player(s) eliminated"));
        }
    }

    fn remove_player(&mut self, id: PlayerId) {
        self.players.remove(&id);
        self.ready.remove(&id);
        self.seating.retain(|pid| *pid != id);
    }

    pub fn push_chat(&mut self, id: PlayerId, message: String) {
        if !self.players.contains_key(&id) || message.is_empty() {
            return;
        }
        self.push_chat_message(ChatMessage {
            player_id: id.to_string(),
            message,
            timestamp: chrono::Utc::now(),
        });
    }

    pub fn push_system_chat(&mut self, message: String) {
        self.push_chat_message(ChatMessage {
            player_id: "system".to_string(),
            message,
            timestamp: chrono::Utc::now(),
        });
    }

    fn push_chat_message(&mut self, message: ChatMessage) {
        self.chat.push_back(message);
        while self.chat.len() > MAX_CHAT_MESSAGES {
            self.chat.pop_front();
        }
    }

    /// Render the state as one viewer sees it. Hole cards other than
    /// the viewer's own are omitted until showdown; the state itself is
    /// untouched, so repeated calls for the same viewer are identical.
    #[must_use]
    pub fn snapshot_for(&self, viewer: Option<PlayerId>) -> GameSnapshot {
        let reveal_all = self.phase == GamePhase::Showdown;
        let players = self
            .players
            .values()
            .map(|p| {
                let own = viewer == Some(p.id);
                let hand = if own || (reveal_all && p.is_in_hand) {
                    p.hand.clone()
                } else {
                    Vec::new()
                };
                (
                    p.id,
                    PlayerSnapshot {
                        id: p.id,
                        name: p.name.clone(),
                        is_connected: p.is_connected,
                        hand,
                        chips: p.chips,
                        bet: p.bet,
                        is_in_hand: p.is_in_hand,
                        is_all_in: p.is_all_in,
                        has_acted: p.has_acted,
                    },
                )
            })
            .collect();

        GameSnapshot {
            players,
            player_ready: self.ready.clone(),
            game_started: self.phase != GamePhase::Waiting,
            pot: self.pot,
            side_pots: self.side_pots.clone(),
            player_order: self.player_order.clone(),
            dealer_index: index_or_minus_one(self.dealer_idx),
            current_turn_index: index_or_minus_one(self.current_turn),
            game_phase: self.phase,
            last_bet: self.last_bet,
            min_raise: self.min_raise,
            community_cards: self.community.clone(),
            winning_hand_desc: self.winning_hand_desc.clone(),
            chat_messages: self.chat.iter().cloned().collect(),
        }
    }
}

fn index_or_minus_one(idx: Option<usize>) -> i64 {
    idx.map_or(-1, |i| i as i64)
}

/// Per-viewer rendering of one player.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub is_connected: bool,
    pub hand: Vec<Card>,
    pub chips: Chips,
    pub bet: Chips,
    pub is_in_hand: bool,
    pub is_all_in: bool,
    pub has_acted: bool,
}

/// Per-viewer rendering of the whole table, pushed to clients after
/// every mutation. Seat indices are `-1` when unset.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub players: HashMap<PlayerId, PlayerSnapshot>,
    pub player_ready: HashMap<PlayerId, bool>,
    pub game_started: bool,
    pub pot: Chips,
    pub side_pots: Vec<SidePot>,
    pub player_order: Vec<PlayerId>,
    pub dealer_index: i64,
    pub current_turn_index: i64,
    pub game_phase: GamePhase,
    pub last_bet: Chips,
    pub min_raise: Chips,
    pub community_cards: Vec<Card>,
    pub winning_hand_desc: String,
    pub chat_messages: Vec<ChatMessage>,
}
