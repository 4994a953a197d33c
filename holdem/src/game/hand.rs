//! Five-of-seven hand evaluation.
//!
//! [`evaluate`] reduces 5 to 7 cards to a comparable strength value:
//! a category plus an ordered tie-break key, most significant first.
//! Comparison is plain [`Ord`] on [`EvaluatedHand`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::entities::{ACE, Card, Suit, Value};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum HandCategory {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "High Card",
            Self::OnePair => "One Pair",
            Self::TwoPair => "Two Pair",
            Self::ThreeOfAKind => "Three of a Kind",
            Self::Straight => "Straight",
            Self::Flush => "Flush",
            Self::FullHouse => "Full House",
            Self::FourOfAKind => "Four of a Kind",
            Self::StraightFlush => "Straight Flush",
        };
        write!(f, "{repr}")
    }
}

/// Result of evaluating a hand. Ordering compares the category first,
/// then the tie-break values element-wise; within a category both hands
/// carry the same number of tie-break values.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct EvaluatedHand {
    pub category: HandCategory,
    pub tiebreak: Vec<Value>,
}

impl EvaluatedHand {
    fn new(category: HandCategory, tiebreak: Vec<Value>) -> Self {
        Self { category, tiebreak }
    }
}

impl fmt::Display for EvaluatedHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.category.fmt(f)
    }
}

/// Evaluate the best 5-card hand available in `cards` (5 to 7 cards).
///
/// Flushes are checked first: within a single deck, at most one suit
/// can reach five cards out of seven, and a 7-card flush rules out
/// quads and full houses, so the flush/straight-flush branch may return
/// early without considering rank groups.
#[must_use]
pub fn evaluate(cards: &[Card]) -> EvaluatedHand {
    debug_assert!(
        (5..=7).contains(&cards.len()),
        "evaluate expects 5-7 cards, got {}",
        cards.len()
    );

    let mut rank_counts: HashMap<Value, u8> = HashMap::with_capacity(cards.len());
    let mut suit_ranks: HashMap<Suit, Vec<Value>> = HashMap::with_capacity(4);
    for card in cards {
        *rank_counts.entry(card.rank).or_default() += 1;
        suit_ranks.entry(card.suit).or_default().push(card.rank);
    }

    if let Some(ranks) = suit_ranks.into_values().find(|ranks| ranks.len() >= 5) {
        let suited = sorted_desc(ranks);
        if let Some(high) = find_straight(&suited) {
            return EvaluatedHand::new(HandCategory::StraightFlush, vec![high]);
        }
        return EvaluatedHand::new(HandCategory::Flush, suited[..5].to_vec());
    }

    // Rank groups, each sorted high first.
    let mut quads: Vec<Value> = Vec::new();
    let mut trips: Vec<Value> = Vec::new();
    let mut pairs: Vec<Value> = Vec::new();
    for (&rank, &count) in &rank_counts {
        match count {
            4 => quads.push(rank),
            3 => trips.push(rank),
            2 => pairs.push(rank),
            _ => {}
        }
    }
    quads.sort_unstable_by(|a, b| b.cmp(a));
    trips.sort_unstable_by(|a, b| b.cmp(a));
    pairs.sort_unstable_by(|a, b| b.cmp(a));

    let distinct = sorted_desc(rank_counts.keys().copied().collect());

    if let Some(&quad) = quads.first() {
        let kicker = best_excluding(&distinct, &[quad]);
        return EvaluatedHand::new(HandCategory::FourOfAKind, vec![quad, kicker]);
    }

    if let Some(&trip) = trips.first() {
        // A second set of trips fills the house just as well as a pair.
        let pair_candidate = pairs.first().copied().max(trips.get(1).copied());
        if let Some(pair) = pair_candidate {
            return EvaluatedHand::new(HandCategory::FullHouse, vec![trip, pair]);
        }
    }

    if let Some(high) = find_straight(&distinct) {
        return EvaluatedHand::new(HandCategory::Straight, vec![high]);
    }

    if let Some(&trip) = trips.first() {
        let mut values = vec![trip];
        values.extend(kickers_excluding(&distinct, &[trip], 2));
        return EvaluatedHand::new(HandCategory::ThreeOfAKind, values);
    }

    if pairs.len() >= 2 {
        let (high, low) = (pairs[0], pairs[1]);
        let kicker = best_excluding(&distinct, &[high, low]);
        return EvaluatedHand::new(HandCategory::TwoPair, vec![high, low, kicker]);
    }

    if let Some(&pair) = pairs.first() {
        let mut values = vec![pair];
        values.extend(kickers_excluding(&distinct, &[pair], 3));
        return EvaluatedHand::new(HandCategory::OnePair, values);
    }

    EvaluatedHand::new(HandCategory::HighCard, distinct[..5].to_vec())
}

fn sorted_desc(mut values: Vec<Value>) -> Vec<Value> {
    values.sort_unstable_by(|a, b| b.cmp(a));
    values
}

fn best_excluding(distinct_desc: &[Value], used: &[Value]) -> Value {
    distinct_desc
        .iter()
        .copied()
        .find(|v| !used.contains(v))
        .unwrap_or(0)
}

fn kickers_excluding(distinct_desc: &[Value], used: &[Value], take: usize) -> Vec<Value> {
    distinct_desc
        .iter()
        .copied()
        .filter(|v| !used.contains(v))
        .take(take)
        .collect()
}

/// Scan a descending, duplicate-free rank list for five consecutive
/// values and return the straight's high card. The wheel (A-2-3-4-5)
/// is only reported when no higher straight exists, and its represented
/// high card is 5, not the ace.
fn find_straight(distinct_desc: &[Value]) -> Option<Value> {
    if distinct_desc.len() >= 5 {
        for window in distinct_desc.windows(5) {
            if window.windows(2).all(|pair| pair[0] == pair[1] + 1) {
                return Some(window[0]);
            }
        }
    }
    let wheel = [ACE, 5, 4, 3, 2];
    if wheel.iter().all(|v| distinct_desc.contains(v)) {
        return Some(5);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(ranks_suits: &[(Value, Suit)]) -> Vec<Card> {
        ranks_suits
            .iter()
            .map(|&(rank, suit)| Card::new(rank, suit))
            .collect()
    }

    use Suit::{Clubs as C, Diamonds as D, Hearts as H, Spades as S};

    #[test]
    fn wheel_is_a_five_high_straight() {
        let hand = evaluate(&cards(&[(14, S), (2, H), (3, D), (4, C), (5, S)]));
        assert_eq!(hand.category, HandCategory::Straight);
        assert_eq!(hand.tiebreak, vec![5]);
    }

    #[test]
    fn broadway_is_an_ace_high_straight() {
        let hand = evaluate(&cards(&[(10, S), (11, H), (12, D), (13, C), (14, S)]));
        assert_eq!(hand.category, HandCategory::Straight);
        assert_eq!(hand.tiebreak, vec![14]);
    }

    #[test]
    fn six_high_straight_beats_the_wheel_in_the_same_cards() {
        // A-2-3-4-5-6 holds both straights; the 6-high one must win out.
        let hand = evaluate(&cards(&[(14, S), (2, H), (3, D), (4, C), (5, S), (6, H)]));
        assert_eq!(hand.category, HandCategory::Straight);
        assert_eq!(hand.tiebreak, vec![6]);
    }

    #[test]
    fn straight_flush_outranks_plain_flush() {
        let hand = evaluate(&cards(&[
            (9, S),
            (8, S),
            (7, S),
            (6, S),
            (5, S),
            (14, H),
            (14, D),
        ]));
        assert_eq!(hand.category, HandCategory::StraightFlush);
        assert_eq!(hand.tiebreak, vec![9]);
    }

    #[test]
    fn flush_takes_top_five_of_suit() {
        let hand = evaluate(&cards(&[
            (2, S),
            (5, S),
            (9, S),
            (11, S),
            (13, S),
            (3, S),
            (14, H),
        ]));
        assert_eq!(hand.category, HandCategory::Flush);
        assert_eq!(hand.tiebreak, vec![13, 11, 9, 5, 3]);
    }

    #[test]
    fn four_of_a_kind_beats_full_house() {
        let quads = evaluate(&cards(&[(2, S), (2, H), (2, D), (2, C), (3, S)]));
        let house = evaluate(&cards(&[(14, S), (14, H), (14, D), (13, C), (13, S)]));
        assert_eq!(quads.category, HandCategory::FourOfAKind);
        assert_eq!(house.category, HandCategory::FullHouse);
        assert!(quads > house);
    }

    #[test]
    fn two_trips_make_a_full_house() {
        let hand = evaluate(&cards(&[
            (14, S),
            (14, H),
            (14, D),
            (13, C),
            (13, S),
            (13, H),
            (12, S),
        ]));
        assert_eq!(hand.category, HandCategory::FullHouse);
        assert_eq!(hand.tiebreak, vec![14, 13]);
    }

    #[test]
    fn two_pair_tiebreak_orders_high_pair_first() {
        let kings_up = evaluate(&cards(&[(13, S), (13, H), (2, D), (2, C), (9, S)]));
        let queens_up = evaluate(&cards(&[(12, S), (12, H), (11, D), (11, C), (14, S)]));
        assert_eq!(kings_up.category, HandCategory::TwoPair);
        assert_eq!(kings_up.tiebreak, vec![13, 2, 9]);
        assert!(kings_up > queens_up);
    }

    #[test]
    fn three_pairs_keep_the_best_kicker() {
        // AA KK QQ + J: kicker must be the queen, not the jack.
        let hand = evaluate(&cards(&[
            (14, S),
            (14, H),
            (13, D),
            (13, C),
            (12, S),
            (12, H),
            (11, S),
        ]));
        assert_eq!(hand.category, HandCategory::TwoPair);
        assert_eq!(hand.tiebreak, vec![14, 13, 12]);
    }

    #[test]
    fn one_pair_carries_three_kickers() {
        let hand = evaluate(&cards(&[(8, S), (8, H), (14, D), (11, C), (6, S), (4, H)]));
        assert_eq!(hand.category, HandCategory::OnePair);
        assert_eq!(hand.tiebreak, vec![8, 14, 11, 6]);
    }

    #[test]
    fn high_card_takes_top_five() {
        let hand = evaluate(&cards(&[
            (2, S),
            (5, H),
            (7, D),
            (9, C),
            (11, S),
            (13, H),
            (14, D),
        ]));
        assert_eq!(hand.category, HandCategory::HighCard);
        assert_eq!(hand.tiebreak, vec![14, 13, 11, 9, 7]);
    }

    #[test]
    fn quad_kicker_breaks_ties() {
        let quads_ace = evaluate(&cards(&[(7, S), (7, H), (7, D), (7, C), (14, S), (2, H)]));
        let quads_king = evaluate(&cards(&[(7, S), (7, H), (7, D), (7, C), (13, S), (2, H)]));
        assert_eq!(quads_ace.tiebreak, vec![7, 14]);
        assert!(quads_ace > quads_king);
    }

    #[test]
    fn equal_hands_compare_equal() {
        let a = evaluate(&cards(&[(10, S), (10, H), (8, D), (6, C), (4, S)]));
        let b = evaluate(&cards(&[(10, D), (10, C), (8, H), (6, S), (4, H)]));
        assert_eq!(a, b);
    }
}
