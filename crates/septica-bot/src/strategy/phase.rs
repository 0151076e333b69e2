use crate::strategy::opponent::OpponentModel;
use septica_core::game::state::GameState;
use septica_core::model::card::Card;
use septica_core::model::hand::Hand;

/// Where the game stands, judged from the cards still held and how close
/// anyone is to the target score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStage {
    Early,
    Mid,
    End,
}

pub fn detect_stage(state: &GameState) -> GameStage {
    let cards_in_hands: usize = state.players().iter().map(|p| p.hand().len()).sum();
    let someone_near_target = state
        .players()
        .iter()
        .any(|p| p.score() + 2 >= state.target_score());

    if cards_in_hands <= 6 || someone_near_target {
        GameStage::End
    } else if cards_in_hands > 16 {
        GameStage::Early
    } else {
        GameStage::Mid
    }
}

/// Early game: gather information and hoard leverage. Leads the lowest card
/// that is neither a seven nor worth points; cornered with only wilds and
/// point cards, it gives up a point before a seven when points are the
/// scarcer resource.
pub fn choose_early(valid_moves: &[Card]) -> Card {
    if let Some(&card) = valid_moves
        .iter()
        .filter(|c| !c.is_wild() && !c.is_point_card())
        .min_by_key(|c| c.rank)
    {
        return card;
    }

    let points: Vec<Card> = valid_moves
        .iter()
        .copied()
        .filter(|c| c.is_point_card())
        .collect();
    let wilds: Vec<Card> = valid_moves.iter().copied().filter(|c| c.is_wild()).collect();

    if !points.is_empty() && points.len() < wilds.len() {
        points[0]
    } else if let Some(&seven) = wilds.first() {
        seven
    } else {
        valid_moves[0]
    }
}

/// Mid game: lead a seven when the opponent looks likely to throw a point
/// card, otherwise lead the rank already seen most often. Sevens enter the
/// frequency race only when spending one is strategically justified.
pub fn choose_mid(hand: &Hand, state: &GameState, valid_moves: &[Card]) -> Card {
    let model = OpponentModel::from_state(state);

    if model.opponent_likely_plays_point() {
        if let Some(&seven) = valid_moves.iter().find(|c| c.is_wild()) {
            return seven;
        }
    }

    let frequencies = model.rank_frequencies(hand);
    let spend_seven = should_use_seven_strategically(hand, state);
    valid_moves
        .iter()
        .copied()
        .filter(|c| spend_seven || !c.is_wild())
        .max_by_key(|c| frequencies[c.rank.value() as usize])
        .unwrap_or(valid_moves[0])
}

/// End game: experts always spend a held seven; everyone else pressures the
/// opponent with the highest non-wild card.
pub fn choose_end(valid_moves: &[Card], always_spend_seven: bool) -> Card {
    if always_spend_seven {
        if let Some(&seven) = valid_moves.iter().find(|c| c.is_wild()) {
            return seven;
        }
    }
    valid_moves
        .iter()
        .copied()
        .filter(|c| !c.is_wild())
        .max_by_key(|c| c.rank)
        .unwrap_or(valid_moves[0])
}

pub fn should_use_seven_strategically(hand: &Hand, state: &GameState) -> bool {
    state.points_on_table() >= 1 || hand.iter().filter(|c| c.is_wild()).count() >= 3
}
