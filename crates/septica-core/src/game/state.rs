use crate::game::events::GameEvent;
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::player::{Player, PlayerId};
use crate::rules::{self, MoveError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

pub const PLAYER_COUNT: usize = 2;
pub const DEFAULT_TARGET_SCORE: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Setup,
    Playing,
    Paused,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayedMove {
    pub player_id: PlayerId,
    pub card: Card,
    pub trick_number: u32,
}

/// Immutable once appended to the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedTrick {
    pub trick_number: u32,
    pub cards: Vec<Card>,
    pub winner_id: PlayerId,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub winner_id: Option<PlayerId>,
    pub final_scores: Vec<(PlayerId, u32)>,
    pub total_tricks: usize,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    PlayerNotFound(PlayerId),
    NotPlayerTurn,
    InvalidMove(MoveError),
    GameNotInProgress,
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayError::PlayerNotFound(id) => write!(f, "no player with id {id}"),
            PlayError::NotPlayerTurn => write!(f, "it is not this player's turn"),
            PlayError::InvalidMove(reason) => write!(f, "invalid move: {reason}"),
            PlayError::GameNotInProgress => write!(f, "the game is not in progress"),
        }
    }
}

impl std::error::Error for PlayError {}

impl From<MoveError> for PlayError {
    fn from(reason: MoveError) -> Self {
        PlayError::InvalidMove(reason)
    }
}

#[derive(Debug, Clone)]
pub struct GameState {
    id: u64,
    phase: GamePhase,
    players: Vec<Player>,
    round_number: u32,
    trick_number: u32,
    target_score: u32,
    current_player_index: usize,
    dealer_index: usize,
    deck: Deck,
    table_cards: Vec<Card>,
    trick_history: Vec<CompletedTrick>,
    last_move: Option<PlayedMove>,
    result: Option<GameResult>,
    events: Vec<GameEvent>,
    started_at: Instant,
}

impl GameState {
    pub fn new(players: Vec<Player>, target_score: u32) -> Self {
        assert_eq!(players.len(), PLAYER_COUNT, "septica is a two-player game");
        Self {
            id: rand::random(),
            phase: GamePhase::Setup,
            players,
            round_number: 1,
            trick_number: 1,
            target_score,
            current_player_index: 0,
            dealer_index: 0,
            deck: Deck::standard(),
            table_cards: Vec::new(),
            trick_history: Vec::new(),
            last_move: None,
            result: None,
            events: Vec::new(),
            started_at: Instant::now(),
        }
    }

    /// Resets everything and deals a fresh round, leaving the game in
    /// `Playing` with the dealer leading the first trick.
    pub fn setup_new_game<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.phase = GamePhase::Setup;
        self.round_number = 1;
        self.trick_number = 1;
        self.current_player_index = self.dealer_index;
        self.table_cards.clear();
        self.trick_history.clear();
        self.last_move = None;
        self.result = None;
        self.events.clear();
        self.started_at = Instant::now();

        for player in self.players.iter_mut() {
            player.reset_for_new_game();
        }

        self.deck = Deck::shuffled(rng);
        let hands = rules::deal_initial_hands(&mut self.deck, self.players.len());
        for (player, hand) in self.players.iter_mut().zip(hands) {
            *player.hand_mut() = hand;
        }

        self.phase = GamePhase::Playing;
    }

    /// The sole mutating entry point during play. A rejected move leaves the
    /// state untouched.
    pub fn play_card(&mut self, card: Card, player_id: PlayerId) -> Result<(), PlayError> {
        let player_index = self.player_index(player_id)?;
        if self.phase != GamePhase::Playing {
            return Err(PlayError::GameNotInProgress);
        }
        if player_index != self.current_player_index {
            return Err(PlayError::NotPlayerTurn);
        }

        rules::validate_move(
            card,
            self.players[player_index].hand(),
            self.top_table_card(),
            self.table_cards.len(),
        )?;

        let removed = self.players[player_index].hand_mut().remove(card);
        debug_assert!(removed, "validate_move guarantees the card is held");
        self.table_cards.push(card);
        self.last_move = Some(PlayedMove {
            player_id,
            card,
            trick_number: self.trick_number,
        });
        self.dispatch(GameEvent::CardPlayed { player_id, card });

        let hands: Vec<_> = self.players.iter().map(|p| p.hand().clone()).collect();
        if rules::is_trick_complete(&self.table_cards, &hands, self.current_player_index) {
            self.resolve_trick();
        } else {
            self.current_player_index = (self.current_player_index + 1) % self.players.len();
        }

        self.finish_if_over();
        Ok(())
    }

    /// Advances the turn when the current player has no legal card. The
    /// orchestrator is responsible for only calling this in that situation.
    pub fn skip_current_player(&mut self) -> Result<(), PlayError> {
        if self.phase != GamePhase::Playing {
            return Err(PlayError::GameNotInProgress);
        }
        debug_assert!(
            !self.current_player_can_move(),
            "skip requested while a legal move exists"
        );
        self.current_player_index = (self.current_player_index + 1) % self.players.len();
        Ok(())
    }

    pub fn valid_moves_for_current_player(&self) -> Vec<Card> {
        if self.phase != GamePhase::Playing {
            return Vec::new();
        }
        rules::valid_moves(
            self.current_player().hand(),
            self.top_table_card(),
            self.table_cards.len(),
        )
    }

    pub fn current_player_can_move(&self) -> bool {
        !self.valid_moves_for_current_player().is_empty()
    }

    pub fn pause(&mut self) -> bool {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
            true
        } else {
            false
        }
    }

    pub fn resume(&mut self) -> bool {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
            true
        } else {
            false
        }
    }

    /// Concedes the game; the opponent wins regardless of scores.
    pub fn forfeit(&mut self, player_id: PlayerId) -> Result<(), PlayError> {
        let player_index = self.player_index(player_id)?;
        if !matches!(self.phase, GamePhase::Playing | GamePhase::Paused) {
            return Err(PlayError::GameNotInProgress);
        }
        let winner_index = (player_index + 1) % self.players.len();
        let winner_id = self.players[winner_index].id();
        self.finish_game(Some(winner_id));
        Ok(())
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == player_id)
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn trick_number(&self) -> u32 {
        self.trick_number
    }

    pub fn target_score(&self) -> u32 {
        self.target_score
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn dealer_index(&self) -> usize {
        self.dealer_index
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player_index]
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn table_cards(&self) -> &[Card] {
        &self.table_cards
    }

    pub fn top_table_card(&self) -> Option<Card> {
        self.table_cards.last().copied()
    }

    pub fn points_on_table(&self) -> u32 {
        rules::calculate_points(&self.table_cards)
    }

    pub fn trick_history(&self) -> &[CompletedTrick] {
        &self.trick_history
    }

    pub fn last_move(&self) -> Option<PlayedMove> {
        self.last_move
    }

    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    /// Hands queued events to the caller, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn player_index(&self, player_id: PlayerId) -> Result<usize, PlayError> {
        self.players
            .iter()
            .position(|p| p.id() == player_id)
            .ok_or(PlayError::PlayerNotFound(player_id))
    }

    fn dispatch(&mut self, event: GameEvent) {
        for player in self.players.iter_mut() {
            player.record_event(&event);
        }
        self.events.push(event);
    }

    fn resolve_trick(&mut self) {
        assert!(
            !self.table_cards.is_empty(),
            "trick resolution requires table cards"
        );
        // Within a trick the turn strictly alternates, so the opener of
        // `table_cards[0]` sits `len - 1` seats before the player who just
        // completed it (still the current player at this point).
        let player_count = self.players.len();
        let leader_index = (self.current_player_index + player_count
            - (self.table_cards.len() - 1) % player_count)
            % player_count;
        let winner_offset = rules::determine_trick_winner(&self.table_cards);
        let winner_index = (leader_index + winner_offset) % player_count;
        let winner_id = self.players[winner_index].id();
        let points = rules::calculate_points(&self.table_cards);

        self.players[winner_index].add_score(points);
        self.trick_history.push(CompletedTrick {
            trick_number: self.trick_number,
            cards: std::mem::take(&mut self.table_cards),
            winner_id,
            points,
        });
        self.dispatch(GameEvent::TrickWon {
            player_id: winner_id,
            points,
        });

        // Winner leads the next trick.
        self.current_player_index = winner_index;
        self.trick_number += 1;
        self.replenish_hands(winner_index);
    }

    /// Tops hands back up toward `INITIAL_HAND_SIZE`, round-robin from the
    /// trick winner, until the deck runs dry.
    fn replenish_hands(&mut self, from_index: usize) {
        loop {
            let mut drew = false;
            for offset in 0..self.players.len() {
                let index = (from_index + offset) % self.players.len();
                if self.players[index].hand().len() < rules::INITIAL_HAND_SIZE {
                    if let Some(card) = self.deck.draw() {
                        self.players[index].hand_mut().add(card);
                        drew = true;
                    }
                }
            }
            if !drew {
                break;
            }
        }
    }

    fn finish_if_over(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let hands: Vec<_> = self.players.iter().map(|p| p.hand().clone()).collect();
        let out_of_cards = rules::is_game_complete(&hands, self.deck.is_empty());
        let target_reached = self
            .players
            .iter()
            .any(|p| p.score() >= self.target_score);
        if out_of_cards || target_reached {
            let scores: Vec<u32> = self.players.iter().map(|p| p.score()).collect();
            let winner_id =
                rules::determine_game_winner(&scores).map(|index| self.players[index].id());
            self.finish_game(winner_id);
        }
    }

    fn finish_game(&mut self, winner_id: Option<PlayerId>) {
        let final_scores: Vec<_> = self
            .players
            .iter()
            .map(|p| (p.id(), p.score()))
            .collect();
        self.result = Some(GameResult {
            winner_id,
            final_scores: final_scores.clone(),
            total_tricks: self.trick_history.len(),
            duration: self.started_at.elapsed(),
        });
        self.phase = GamePhase::Finished;
        self.dispatch(GameEvent::GameEnded {
            winner_id,
            final_scores,
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: u64,
        phase: GamePhase,
        players: Vec<Player>,
        round_number: u32,
        trick_number: u32,
        target_score: u32,
        current_player_index: usize,
        dealer_index: usize,
        deck: Deck,
        table_cards: Vec<Card>,
        trick_history: Vec<CompletedTrick>,
        last_move: Option<PlayedMove>,
        result: Option<GameResult>,
    ) -> Self {
        Self {
            id,
            phase,
            players,
            round_number,
            trick_number,
            target_score,
            current_player_index,
            dealer_index,
            deck,
            table_cards,
            trick_history,
            last_move,
            result,
            events: Vec::new(),
            started_at: Instant::now(),
        }
    }
}
