use crate::game::state::{CompletedTrick, GamePhase, GameResult, GameState, PlayedMove};
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::player::{Player, PlayerId, PlayerKind, PlayerStatistics};
use serde::{Deserialize, Serialize};

/// Serializable session layout consumed by the save/load collaborator. The
/// tagged `kind` field reconstructs human and AI agents directly, without
/// decode-time heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    pub hand: Vec<Card>,
    pub score: u32,
    pub statistics: PlayerStatistics,
    pub kind: PlayerKind,
}

impl PlayerRecord {
    fn capture(player: &Player) -> Self {
        Self {
            id: player.id(),
            name: player.name().to_string(),
            hand: player.hand().cards().to_vec(),
            score: player.score(),
            statistics: *player.stats(),
            kind: player.kind(),
        }
    }

    fn restore(self) -> Player {
        Player::from_parts(
            self.id,
            self.name,
            Hand::with_cards(self.hand),
            self.score,
            self.statistics,
            self.kind,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub id: u64,
    pub phase: GamePhase,
    pub round_number: u32,
    pub trick_number: u32,
    pub target_score: u32,
    pub players: Vec<PlayerRecord>,
    pub current_player_index: usize,
    pub dealer_index: usize,
    pub deck: Vec<Card>,
    pub table_cards: Vec<Card>,
    pub trick_history: Vec<CompletedTrick>,
    pub last_move: Option<PlayedMove>,
    pub result: Option<GameResult>,
}

impl GameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            id: state.id(),
            phase: state.phase(),
            round_number: state.round_number(),
            trick_number: state.trick_number(),
            target_score: state.target_score(),
            players: state.players().iter().map(PlayerRecord::capture).collect(),
            current_player_index: state.current_player_index(),
            dealer_index: state.dealer_index(),
            deck: state.deck().cards().to_vec(),
            table_cards: state.table_cards().to_vec(),
            trick_history: state.trick_history().to_vec(),
            last_move: state.last_move(),
            result: state.result().cloned(),
        }
    }

    pub fn restore(self) -> GameState {
        GameState::from_parts(
            self.id,
            self.phase,
            self.players.into_iter().map(PlayerRecord::restore).collect(),
            self.round_number,
            self.trick_number,
            self.target_score,
            self.current_player_index,
            self.dealer_index,
            Deck::from_cards(self.deck),
            self.table_cards,
            self.trick_history,
            self.last_move,
            self.result,
        )
    }

    pub fn to_json(state: &GameState) -> serde_json::Result<String> {
        let snapshot = Self::capture(state);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
