use crate::model::card::Card;
use crate::model::player::PlayerId;
use serde::{Deserialize, Serialize};

/// Engine notifications, delivered to every player's statistics synchronously
/// and in transition order before the triggering call returns. External
/// consumers drain them from the game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    CardPlayed {
        player_id: PlayerId,
        card: Card,
    },
    TrickWon {
        player_id: PlayerId,
        points: u32,
    },
    GameEnded {
        winner_id: Option<PlayerId>,
        final_scores: Vec<(PlayerId, u32)>,
    },
}
