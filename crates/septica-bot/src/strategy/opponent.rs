use septica_core::game::state::GameState;
use septica_core::model::card::Card;
use septica_core::model::hand::Hand;

/// How many completed tricks the point-card prediction looks back over.
const PREDICTION_WINDOW: usize = 3;

/// Lightweight opponent model built from public information: the table, the
/// trick history, and the strategist's own hand. Nothing here peeks at the
/// opponent's cards.
#[derive(Debug, Clone)]
pub struct OpponentModel {
    recent_cards: Vec<Card>,
    visible_cards: Vec<Card>,
}

impl OpponentModel {
    pub fn from_state(state: &GameState) -> Self {
        let history = state.trick_history();
        let start = history.len().saturating_sub(PREDICTION_WINDOW);
        let recent_cards = history[start..]
            .iter()
            .flat_map(|trick| trick.cards.iter().copied())
            .collect();

        let mut visible_cards: Vec<Card> = history
            .iter()
            .flat_map(|trick| trick.cards.iter().copied())
            .collect();
        visible_cards.extend_from_slice(state.table_cards());

        Self {
            recent_cards,
            visible_cards,
        }
    }

    /// Frequency-based guess: a run of point cards in the recent tricks
    /// suggests the opponent is flushing out tens and aces.
    pub fn opponent_likely_plays_point(&self) -> bool {
        let points = self
            .recent_cards
            .iter()
            .filter(|card| card.is_point_card())
            .count();
        points >= 2
    }

    /// Occurrences of each rank among everything the strategist can see,
    /// including its own hand. Indexed by `Rank::value()`.
    pub fn rank_frequencies(&self, own_hand: &Hand) -> [u32; 15] {
        let mut counts = [0u32; 15];
        for card in self.visible_cards.iter().chain(own_hand.iter()) {
            counts[card.rank.value() as usize] += 1;
        }
        counts
    }
}
