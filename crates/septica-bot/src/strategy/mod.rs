mod opponent;
mod phase;

pub use opponent::OpponentModel;
pub use phase::{GameStage, detect_stage, should_use_seven_strategically};

use rand::Rng;
use rand::seq::SliceRandom;
use septica_core::game::state::GameState;
use septica_core::model::card::Card;
use septica_core::model::hand::Hand;
use septica_core::model::player::{AiDifficulty, Player, PlayerKind};
use septica_core::model::rank::Rank;
use septica_core::rules;
use std::time::Duration;
use tracing::{Level, event};

/// Concrete decision parameters behind a difficulty level.
///
/// `look_ahead_depth` is carried for tuning but the strategy is heuristic;
/// a real search may be added at Hard/Expert without changing the
/// `choose_card` contract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    pub thinking_delay: Duration,
    pub accuracy: f64,
    pub look_ahead_depth: u32,
}

impl DifficultyProfile {
    pub const fn for_difficulty(difficulty: AiDifficulty) -> Self {
        match difficulty {
            AiDifficulty::Easy => Self {
                thinking_delay: Duration::from_millis(1000),
                accuracy: 0.3,
                look_ahead_depth: 1,
            },
            AiDifficulty::Medium => Self {
                thinking_delay: Duration::from_millis(1500),
                accuracy: 0.6,
                look_ahead_depth: 2,
            },
            AiDifficulty::Hard => Self {
                thinking_delay: Duration::from_millis(2000),
                accuracy: 0.85,
                look_ahead_depth: 3,
            },
            AiDifficulty::Expert => Self {
                thinking_delay: Duration::from_millis(2500),
                accuracy: 0.95,
                look_ahead_depth: 4,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Strategy {
    difficulty: AiDifficulty,
    profile: DifficultyProfile,
}

impl Strategy {
    pub fn new(difficulty: AiDifficulty) -> Self {
        Self {
            difficulty,
            profile: DifficultyProfile::for_difficulty(difficulty),
        }
    }

    /// Overrides the stock parameters; used by tests and by hosts that want
    /// instant decisions.
    pub fn with_profile(difficulty: AiDifficulty, profile: DifficultyProfile) -> Self {
        Self {
            difficulty,
            profile,
        }
    }

    pub fn difficulty(&self) -> AiDifficulty {
        self.difficulty
    }

    pub fn profile(&self) -> DifficultyProfile {
        self.profile
    }

    /// Picks a card from `valid_moves`. The accuracy gate dominates: an
    /// inaccurate draw plays uniformly at random before any heuristic runs.
    pub fn choose_card<R: Rng + ?Sized>(
        &self,
        hand: &Hand,
        state: &GameState,
        valid_moves: &[Card],
        rng: &mut R,
    ) -> Card {
        assert!(
            !valid_moves.is_empty(),
            "strategy invoked without a legal move"
        );

        if rng.r#gen::<f64>() > self.profile.accuracy {
            let chosen = *valid_moves.choose(rng).expect("non-empty valid moves");
            self.log_decision(None, valid_moves, chosen, "accuracy_miss");
            return chosen;
        }

        let (stage, chosen) = if state.table_cards().is_empty() {
            let stage = phase::detect_stage(state);
            let chosen = match stage {
                GameStage::Early => phase::choose_early(valid_moves),
                GameStage::Mid => phase::choose_mid(hand, state, valid_moves),
                GameStage::End => phase::choose_end(
                    valid_moves,
                    self.difficulty == AiDifficulty::Expert,
                ),
            };
            (Some(stage), chosen)
        } else {
            (None, Self::choose_throw_card(state, valid_moves))
        };

        let chosen = self.perturb(chosen, valid_moves, rng);
        self.log_decision(stage, valid_moves, chosen, "heuristic");
        chosen
    }

    /// Continuing someone else's trick: take a guaranteed rank match, cut
    /// with a seven when points are at stake, otherwise throw the cheapest
    /// card held.
    fn choose_throw_card(state: &GameState, valid_moves: &[Card]) -> Card {
        let opening = state.table_cards().first().copied();
        if let Some(opening) = opening {
            if let Some(&matching) = valid_moves.iter().find(|c| c.rank == opening.rank) {
                return matching;
            }
        }

        if state.points_on_table() > 0 {
            if let Some(&seven) = valid_moves.iter().find(|c| c.is_wild()) {
                return seven;
            }
        }

        valid_moves
            .iter()
            .copied()
            .find(|c| !matches!(c.rank, Rank::Seven | Rank::Ten | Rank::Jack))
            .unwrap_or(valid_moves[0])
    }

    /// Difficulty-dependent second guess applied after the heuristics.
    fn perturb<R: Rng + ?Sized>(&self, chosen: Card, valid_moves: &[Card], rng: &mut R) -> Card {
        match self.difficulty {
            AiDifficulty::Easy => {
                if rng.gen_bool(0.40) {
                    *valid_moves.choose(rng).expect("non-empty valid moves")
                } else {
                    chosen
                }
            }
            AiDifficulty::Medium => {
                if rng.gen_bool(0.20) {
                    valid_moves
                        .iter()
                        .copied()
                        .find(|&c| !c.is_wild() && c != chosen)
                        .unwrap_or(chosen)
                } else {
                    chosen
                }
            }
            AiDifficulty::Hard => {
                if rng.gen_bool(0.10) {
                    valid_moves
                        .iter()
                        .copied()
                        .find(|&c| (c.is_wild() || c.is_point_card()) && c != chosen)
                        .unwrap_or(chosen)
                } else {
                    chosen
                }
            }
            AiDifficulty::Expert => chosen,
        }
    }

    fn log_decision(
        &self,
        stage: Option<GameStage>,
        valid_moves: &[Card],
        chosen: Card,
        reason: &str,
    ) {
        if !tracing::enabled!(Level::INFO) {
            return;
        }
        event!(
            target: "septica_bot::play",
            Level::INFO,
            difficulty = ?self.difficulty,
            stage = ?stage,
            valid_count = valid_moves.len(),
            chosen = %chosen,
            reason,
        );
    }
}

/// True when joining the trick can still pay off: a guaranteed rank match
/// against the opening card, or a seven while points sit on the table.
pub fn should_continue_trick(hand: &Hand, state: &GameState) -> bool {
    let Some(&opening) = state.table_cards().first() else {
        return false;
    };
    hand.iter().any(|c| c.rank == opening.rank)
        || (hand.iter().any(|c| c.is_wild()) && state.points_on_table() > 0)
}

/// Single dispatch point over the agent kind: humans decide externally, AI
/// agents delegate to the strategy. `None` also signals "no legal card".
pub fn decide<R: Rng + ?Sized>(
    player: &Player,
    state: &GameState,
    rng: &mut R,
) -> Option<Card> {
    match player.kind() {
        PlayerKind::Human => None,
        PlayerKind::Ai(difficulty) => {
            let valid_moves = rules::valid_moves(
                player.hand(),
                state.top_table_card(),
                state.table_cards().len(),
            );
            if valid_moves.is_empty() {
                return None;
            }
            Some(Strategy::new(difficulty).choose_card(player.hand(), state, &valid_moves, rng))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DifficultyProfile, GameStage, Strategy, decide, detect_stage, should_continue_trick,
    };
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use septica_core::game::serialization::{GameSnapshot, PlayerRecord};
    use septica_core::game::state::{GamePhase, GameState};
    use septica_core::model::card::Card;
    use septica_core::model::hand::Hand;
    use septica_core::model::player::{AiDifficulty, PlayerId, PlayerKind, PlayerStatistics};
    use septica_core::model::rank::Rank;
    use septica_core::model::suit::Suit;
    use std::time::Duration;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    /// Builds a Playing-phase state with exact hands, table, and scores via
    /// the public snapshot path.
    fn rigged_state(
        hands: [Vec<Card>; 2],
        scores: [u32; 2],
        table_cards: Vec<Card>,
        deck: Vec<Card>,
    ) -> GameState {
        let [hand_a, hand_b] = hands;
        let players = vec![
            PlayerRecord {
                id: PlayerId(1),
                name: "Bot A".to_string(),
                hand: hand_a,
                score: scores[0],
                statistics: PlayerStatistics::default(),
                kind: PlayerKind::Ai(AiDifficulty::Expert),
            },
            PlayerRecord {
                id: PlayerId(2),
                name: "Bot B".to_string(),
                hand: hand_b,
                score: scores[1],
                statistics: PlayerStatistics::default(),
                kind: PlayerKind::Human,
            },
        ];
        GameSnapshot {
            id: 1,
            phase: GamePhase::Playing,
            round_number: 1,
            trick_number: 1,
            target_score: 8,
            players,
            current_player_index: 0,
            dealer_index: 0,
            deck,
            table_cards,
            trick_history: Vec::new(),
            last_move: None,
            result: None,
        }
        .restore()
    }

    fn exact(difficulty: AiDifficulty) -> Strategy {
        // Accuracy 1.0 makes the gate a no-op so heuristics are observable.
        Strategy::with_profile(
            difficulty,
            DifficultyProfile {
                thinking_delay: Duration::ZERO,
                accuracy: 1.0,
                look_ahead_depth: 1,
            },
        )
    }

    #[test]
    fn profiles_scale_with_difficulty() {
        let easy = DifficultyProfile::for_difficulty(AiDifficulty::Easy);
        let expert = DifficultyProfile::for_difficulty(AiDifficulty::Expert);
        assert!(easy.accuracy < expert.accuracy);
        assert!(easy.thinking_delay < expert.thinking_delay);
        assert!(easy.look_ahead_depth < expert.look_ahead_depth);
    }

    #[test]
    fn zero_accuracy_still_plays_a_legal_card() {
        let state = rigged_state(
            [
                vec![card(Rank::Nine, Suit::Clubs), card(Rank::King, Suit::Hearts)],
                vec![card(Rank::Queen, Suit::Spades)],
            ],
            [0, 0],
            Vec::new(),
            Vec::new(),
        );
        let strategy = Strategy::with_profile(
            AiDifficulty::Easy,
            DifficultyProfile {
                thinking_delay: Duration::ZERO,
                accuracy: 0.0,
                look_ahead_depth: 1,
            },
        );
        let hand = state.players()[0].hand().clone();
        let valid = state.valid_moves_for_current_player();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..50 {
            let chosen = strategy.choose_card(&hand, &state, &valid, &mut rng);
            assert!(valid.contains(&chosen));
        }
    }

    #[test]
    fn throw_card_takes_the_guaranteed_rank_match() {
        let state = rigged_state(
            [
                vec![card(Rank::Nine, Suit::Hearts), card(Rank::Seven, Suit::Spades)],
                vec![card(Rank::King, Suit::Hearts)],
            ],
            [0, 0],
            vec![card(Rank::Nine, Suit::Clubs)],
            Vec::new(),
        );
        let hand = state.players()[0].hand().clone();
        let valid = state.valid_moves_for_current_player();
        let mut rng = StdRng::seed_from_u64(1);
        let chosen = exact(AiDifficulty::Expert).choose_card(&hand, &state, &valid, &mut rng);
        assert_eq!(chosen, card(Rank::Nine, Suit::Hearts));
    }

    #[test]
    fn throw_card_cuts_with_a_seven_when_points_are_at_stake() {
        // Trick opened with a ten: one point on the table, no rank match held.
        let state = rigged_state(
            [
                vec![card(Rank::Seven, Suit::Spades), card(Rank::Eight, Suit::Hearts)],
                vec![card(Rank::King, Suit::Hearts)],
            ],
            [0, 0],
            vec![
                card(Rank::Ten, Suit::Clubs),
                card(Rank::King, Suit::Diamonds),
                card(Rank::King, Suit::Spades),
            ],
            Vec::new(),
        );
        let hand = state.players()[0].hand().clone();
        let valid = state.valid_moves_for_current_player();
        // Both the seven and the eight (table count 3) are legal here.
        assert_eq!(valid.len(), 2);
        let mut rng = StdRng::seed_from_u64(1);
        let chosen = exact(AiDifficulty::Expert).choose_card(&hand, &state, &valid, &mut rng);
        assert_eq!(chosen, card(Rank::Seven, Suit::Spades));
    }

    #[test]
    fn throw_card_saves_the_seven_on_a_pointless_trick() {
        let state = rigged_state(
            [
                vec![card(Rank::Seven, Suit::Spades), card(Rank::Eight, Suit::Hearts)],
                vec![card(Rank::King, Suit::Hearts)],
            ],
            [0, 0],
            vec![
                card(Rank::King, Suit::Clubs),
                card(Rank::King, Suit::Diamonds),
                card(Rank::King, Suit::Spades),
            ],
            Vec::new(),
        );
        let hand = state.players()[0].hand().clone();
        let valid = state.valid_moves_for_current_player();
        let mut rng = StdRng::seed_from_u64(1);
        let chosen = exact(AiDifficulty::Expert).choose_card(&hand, &state, &valid, &mut rng);
        assert_eq!(chosen, card(Rank::Eight, Suit::Hearts));
    }

    #[test]
    fn stage_detection_follows_cards_and_scores() {
        let big_hand: Vec<Card> = Suit::ALL
            .iter()
            .flat_map(|&s| {
                [
                    card(Rank::Nine, s),
                    card(Rank::Jack, s),
                    card(Rank::Queen, s),
                ]
            })
            .collect();
        let early = rigged_state(
            [big_hand.clone(), big_hand.clone()],
            [0, 0],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(detect_stage(&early), GameStage::Early);

        let end_by_cards = rigged_state(
            [vec![card(Rank::Nine, Suit::Clubs)], vec![card(Rank::King, Suit::Hearts)]],
            [0, 0],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(detect_stage(&end_by_cards), GameStage::End);

        let end_by_score = rigged_state(
            [big_hand.clone(), big_hand],
            [7, 0],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(detect_stage(&end_by_score), GameStage::End);

        let four_each = vec![
            card(Rank::Nine, Suit::Clubs),
            card(Rank::Jack, Suit::Clubs),
            card(Rank::Queen, Suit::Clubs),
            card(Rank::King, Suit::Clubs),
        ];
        let mid = rigged_state(
            [four_each.clone(), four_each],
            [0, 0],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(detect_stage(&mid), GameStage::Mid);
    }

    #[test]
    fn mid_game_lead_follows_rank_frequency_and_hoards_sevens() {
        // Eight cards in play keeps the game in the mid stage; with no
        // history and nothing on the table, frequency comes from the
        // strategist's own hand, and the lone seven stays out of the race.
        let state = rigged_state(
            [
                vec![
                    card(Rank::Nine, Suit::Clubs),
                    card(Rank::Nine, Suit::Hearts),
                    card(Rank::King, Suit::Spades),
                    card(Rank::Seven, Suit::Diamonds),
                ],
                vec![
                    card(Rank::Queen, Suit::Clubs),
                    card(Rank::Queen, Suit::Hearts),
                    card(Rank::Jack, Suit::Spades),
                    card(Rank::Ace, Suit::Diamonds),
                ],
            ],
            [0, 0],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(detect_stage(&state), GameStage::Mid);

        let hand = state.players()[0].hand().clone();
        let valid = state.valid_moves_for_current_player();
        let mut rng = StdRng::seed_from_u64(2);
        let chosen = exact(AiDifficulty::Expert).choose_card(&hand, &state, &valid, &mut rng);
        assert_eq!(chosen.rank, Rank::Nine);
    }

    #[test]
    fn expert_opens_with_the_seven_in_the_endgame() {
        let state = rigged_state(
            [
                vec![card(Rank::Seven, Suit::Spades), card(Rank::King, Suit::Hearts)],
                vec![card(Rank::Nine, Suit::Clubs)],
            ],
            [0, 0],
            Vec::new(),
            Vec::new(),
        );
        let hand = state.players()[0].hand().clone();
        let valid = state.valid_moves_for_current_player();
        let mut rng = StdRng::seed_from_u64(5);

        let expert = exact(AiDifficulty::Expert).choose_card(&hand, &state, &valid, &mut rng);
        assert_eq!(expert, card(Rank::Seven, Suit::Spades));
    }

    #[test]
    fn continuing_a_trick_is_judged_by_match_or_cut() {
        let state = rigged_state(
            [
                vec![card(Rank::Nine, Suit::Hearts)],
                vec![card(Rank::King, Suit::Hearts)],
            ],
            [0, 0],
            vec![card(Rank::Nine, Suit::Clubs)],
            Vec::new(),
        );
        let matching = Hand::with_cards(vec![card(Rank::Nine, Suit::Spades)]);
        assert!(should_continue_trick(&matching, &state));

        let useless = Hand::with_cards(vec![card(Rank::King, Suit::Clubs)]);
        assert!(!should_continue_trick(&useless, &state));

        // A seven only pays when points are on the table.
        let seven = Hand::with_cards(vec![card(Rank::Seven, Suit::Clubs)]);
        assert!(!should_continue_trick(&seven, &state));
    }

    #[test]
    fn humans_never_decide_autonomously() {
        let state = rigged_state(
            [
                vec![card(Rank::Nine, Suit::Clubs)],
                vec![card(Rank::King, Suit::Hearts)],
            ],
            [0, 0],
            Vec::new(),
            Vec::new(),
        );
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(decide(&state.players()[1], &state, &mut rng), None);
        assert!(decide(&state.players()[0], &state, &mut rng).is_some());
    }

    #[test]
    fn decide_reports_none_without_a_legal_card() {
        // AI holds a nine against a king: nothing beats it.
        let state = rigged_state(
            [
                vec![card(Rank::Nine, Suit::Clubs)],
                vec![card(Rank::King, Suit::Hearts)],
            ],
            [0, 0],
            vec![card(Rank::King, Suit::Spades)],
            Vec::new(),
        );
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(decide(&state.players()[0], &state, &mut rng), None);
    }
}
