//! Core value types: cards, the deck, players, and pots.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::constants::HOLE_CARDS;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Hearts => "♥",
            Self::Diamonds => "♦",
            Self::Clubs => "♣",
            Self::Spades => "♠",
        };
        write!(f, "{repr}")
    }
}

/// Numeric card rank, 2..=14 with the ace high as 14. The evaluator
/// additionally treats the ace as 1 when looking for the wheel.
pub type Value = u8;

pub const ACE: Value = 14;

/// An immutable playing card.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card {
    pub rank: Value,
    pub suit: Suit,
}

impl Card {
    #[must_use]
    pub const fn new(rank: Value, suit: Suit) -> Self {
        Self { rank, suit }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rank = match self.rank {
            ACE => "A".to_string(),
            13 => "K".to_string(),
            12 => "Q".to_string(),
            11 => "J".to_string(),
            v => v.to_string(),
        };
        write!(f, "{rank}{}", self.suit)
    }
}

/// A standard 52-card deck. A fresh deck is built and shuffled at the
/// start of every hand; cards are dealt from the front.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    next: usize,
}

impl Default for Deck {
    fn default() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in 2..=ACE {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards, next: 0 }
    }
}

impl Deck {
    /// Shuffle the full deck and rewind the deal position. Fairness
    /// against third parties is not a goal, so any thread-local RNG
    /// will do.
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut rand::rng());
        self.next = 0;
    }

    pub fn deal(&mut self) -> Option<Card> {
        let card = self.cards.get(self.next).copied();
        if card.is_some() {
            self.next += 1;
        }
        card
    }

    /// Discard the top card before dealing a street.
    pub fn burn(&mut self) {
        if self.next < self.cards.len() {
            self.next += 1;
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.next
    }
}

/// Whole chips. Stacks, bets, and pots never go fractional.
pub type Chips = u32;

/// Stable session identity. A player keeps the same id for the lifetime
/// of their connection; it doubles as the key of the entity table.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct PlayerId(Uuid);

impl PlayerId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short prefix used for default display names.
    #[must_use]
    pub fn short(&self) -> String {
        self.0.to_string().chars().take(8).collect()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A seated participant. Created on first connection with the starting
/// stack; chips carry over across hands until the player is eliminated
/// or leaves for good.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_connected: bool,
    pub hand: Vec<Card>,
    pub chips: Chips,
    /// Current-round bet, swept into the pot when the round closes.
    pub bet: Chips,
    pub is_in_hand: bool,
    pub is_all_in: bool,
    pub has_acted: bool,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, name: String, chips: Chips) -> Self {
        Self {
            id,
            name,
            is_connected: true,
            hand: Vec::with_capacity(HOLE_CARDS),
            chips,
            bet: 0,
            is_in_hand: false,
            is_all_in: false,
            has_acted: false,
        }
    }

    /// Move chips from the stack to the current-round bet, capped at
    /// what the player has. A player whose stack empties is all-in.
    pub fn commit(&mut self, amount: Chips) -> Chips {
        let actual = amount.min(self.chips);
        self.chips -= actual;
        self.bet += actual;
        if self.chips == 0 && self.is_in_hand {
            self.is_all_in = true;
        }
        actual
    }

    pub fn reset_for_hand(&mut self) {
        self.hand.clear();
        self.bet = 0;
        self.is_in_hand = true;
        self.is_all_in = false;
        self.has_acted = false;
    }

    pub fn reset_after_hand(&mut self) {
        self.hand.clear();
        self.bet = 0;
        self.is_in_hand = false;
        self.is_all_in = false;
        self.has_acted = false;
    }

    /// Able to take a betting action right now.
    #[must_use]
    pub fn can_act(&self) -> bool {
        self.is_in_hand && self.is_connected && !self.is_all_in
    }
}

/// A pot tier restricted to the players who contributed at that betting
/// level. Arises when someone is all-in for less than others wagered.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidePot {
    pub amount: Chips,
    #[serde(rename = "eligibleIds")]
    pub eligible: Vec<PlayerId>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub player_id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
