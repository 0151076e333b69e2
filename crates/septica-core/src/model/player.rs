use crate::game::events::GameEvent;
use crate::model::hand::Hand;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// AI strength. The bot crate maps each level to concrete decision
/// parameters; the core only carries it so agents round-trip through the
/// session snapshot without reconstruction heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiDifficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerKind {
    Human,
    Ai(AiDifficulty),
}

impl PlayerKind {
    pub const fn is_ai(self) -> bool {
        matches!(self, PlayerKind::Ai(_))
    }

    pub const fn difficulty(self) -> Option<AiDifficulty> {
        match self {
            PlayerKind::Human => None,
            PlayerKind::Ai(difficulty) => Some(difficulty),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatistics {
    pub cards_played: u32,
    pub tricks_won: u32,
    pub points_captured: u32,
    pub games_won: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    name: String,
    hand: Hand,
    score: u32,
    stats: PlayerStatistics,
    kind: PlayerKind,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, kind: PlayerKind) -> Self {
        Self {
            id,
            name: name.into(),
            hand: Hand::new(),
            score: 0,
            stats: PlayerStatistics::default(),
            kind,
        }
    }

    pub fn human(id: PlayerId, name: impl Into<String>) -> Self {
        Self::new(id, name, PlayerKind::Human)
    }

    pub fn ai(id: PlayerId, name: impl Into<String>, difficulty: AiDifficulty) -> Self {
        Self::new(id, name, PlayerKind::Ai(difficulty))
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Scores only ever increase within a game.
    pub fn add_score(&mut self, points: u32) {
        self.score += points;
    }

    pub fn stats(&self) -> &PlayerStatistics {
        &self.stats
    }

    pub fn kind(&self) -> PlayerKind {
        self.kind
    }

    pub fn reset_for_new_game(&mut self) {
        self.hand.clear();
        self.score = 0;
    }

    /// Statistics bookkeeping; every engine event is delivered here
    /// synchronously, in transition order.
    pub fn record_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::CardPlayed { player_id, .. } => {
                if *player_id == self.id {
                    self.stats.cards_played += 1;
                }
            }
            GameEvent::TrickWon { player_id, points } => {
                if *player_id == self.id {
                    self.stats.tricks_won += 1;
                    self.stats.points_captured += points;
                }
            }
            GameEvent::GameEnded { winner_id, .. } => {
                if *winner_id == Some(self.id) {
                    self.stats.games_won += 1;
                }
            }
        }
    }

    pub(crate) fn from_parts(
        id: PlayerId,
        name: String,
        hand: Hand,
        score: u32,
        stats: PlayerStatistics,
        kind: PlayerKind,
    ) -> Self {
        Self {
            id,
            name,
            hand,
            score,
            stats,
            kind,
        }
    }
}
