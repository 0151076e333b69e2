//! Pure, stateless Septica rules. Every function here takes its whole world
//! as arguments; the state machine in `game` owns all mutation.

use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::rank::Rank;
use core::fmt;

pub const INITIAL_HAND_SIZE: usize = 4;
pub const POINT_CARDS_TOTAL: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    CardNotInHand,
    CannotBeatTopCard,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::CardNotInHand => write!(f, "card is not in the player's hand"),
            MoveError::CannotBeatTopCard => write!(f, "card cannot beat the top table card"),
        }
    }
}

impl std::error::Error for MoveError {}

/// Whether `attacker` beats `target`. `table_count` is the number of cards
/// already on the table at the moment the attacker is laid; it only matters
/// for the eight rule. The three conditions are independent, with no
/// precedence between them.
pub fn can_beat(attacker: Card, target: Card, table_count: usize) -> bool {
    attacker.rank == Rank::Seven
        || (attacker.rank == Rank::Eight && table_count % 3 == 0)
        || attacker.rank == target.rank
}

/// Cards the hand may legally play. Any card opens a trick; against a top
/// card only beats are legal.
pub fn valid_moves(hand: &Hand, top_table_card: Option<Card>, table_count: usize) -> Vec<Card> {
    match top_table_card {
        None => hand.iter().copied().collect(),
        Some(top) => hand
            .iter()
            .copied()
            .filter(|&card| can_beat(card, top, table_count))
            .collect(),
    }
}

pub fn has_valid_move(hand: &Hand, top_table_card: Option<Card>, table_count: usize) -> bool {
    match top_table_card {
        None => !hand.is_empty(),
        Some(top) => hand.iter().any(|&card| can_beat(card, top, table_count)),
    }
}

/// A trick ends the moment every other player, in turn order after
/// `current_player_index`, has nothing that beats the current top card.
pub fn is_trick_complete(table_cards: &[Card], hands: &[Hand], current_player_index: usize) -> bool {
    let Some(&top) = table_cards.last() else {
        return false;
    };
    let table_count = table_cards.len();
    (1..hands.len()).all(|offset| {
        let index = (current_player_index + offset) % hands.len();
        !has_valid_move(&hands[index], Some(top), table_count)
    })
}

/// Left-to-right fold: the incumbent starts at position 0 and each
/// challenger's eight-rule check uses its own 1-based table position. The
/// last successful beat wins; with none, the opener keeps the trick.
pub fn determine_trick_winner(table_cards: &[Card]) -> usize {
    assert!(
        !table_cards.is_empty(),
        "trick winner requires at least one table card"
    );
    let mut winner_index = 0;
    for (index, &challenger) in table_cards.iter().enumerate().skip(1) {
        if can_beat(challenger, table_cards[winner_index], index + 1) {
            winner_index = index;
        }
    }
    winner_index
}

pub fn calculate_points(cards: &[Card]) -> u32 {
    cards.iter().map(|card| card.point_value()).sum()
}

pub fn is_game_complete(hands: &[Hand], deck_empty: bool) -> bool {
    deck_empty && hands.iter().all(|hand| hand.is_empty())
}

/// `None` on a scoreless game or a shared maximum.
pub fn determine_game_winner(scores: &[u32]) -> Option<usize> {
    let max = scores.iter().copied().max()?;
    if max == 0 {
        return None;
    }
    let mut leaders = scores.iter().enumerate().filter(|&(_, &s)| s == max);
    let (winner, _) = leaders.next()?;
    if leaders.next().is_some() {
        None
    } else {
        Some(winner)
    }
}

/// Round-robin deal from the front of the deck, `INITIAL_HAND_SIZE` passes.
pub fn deal_initial_hands(deck: &mut Deck, player_count: usize) -> Vec<Hand> {
    let mut hands = vec![Hand::new(); player_count];
    for _ in 0..INITIAL_HAND_SIZE {
        for hand in hands.iter_mut() {
            if let Some(card) = deck.draw() {
                hand.add(card);
            }
        }
    }
    hands
}

pub fn validate_move(
    card: Card,
    hand: &Hand,
    top_table_card: Option<Card>,
    table_count: usize,
) -> Result<(), MoveError> {
    if !hand.contains(card) {
        return Err(MoveError::CardNotInHand);
    }
    if let Some(top) = top_table_card {
        if !can_beat(card, top, table_count) {
            return Err(MoveError::CannotBeatTopCard);
        }
    }
    Ok(())
}
