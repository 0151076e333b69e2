use crate::strategy::Strategy;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use septica_core::game::state::GameState;
use septica_core::model::card::Card;
use septica_core::model::hand::Hand;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const CANCEL_POLL_STEP: Duration = Duration::from_millis(10);

#[derive(Debug, Default)]
struct Slot {
    done: bool,
    card: Option<Card>,
}

/// Handle to one in-flight AI decision. The caller owns at most one per game
/// instance and must cancel it whenever the game leaves `Playing` before the
/// decision lands; a cancelled handle never yields a card.
pub struct ThinkHandle {
    cancelled: Arc<AtomicBool>,
    slot: Arc<Mutex<Slot>>,
    thread: Option<JoinHandle<()>>,
}

pub struct Thinker;

impl Thinker {
    /// Runs the strategy on its own thread after the difficulty's thinking
    /// delay. The state is a snapshot: the live game must not be mutated
    /// while the decision is outstanding.
    pub fn spawn(
        strategy: Strategy,
        hand: Hand,
        state: GameState,
        valid_moves: Vec<Card>,
        seed: u64,
    ) -> ThinkHandle {
        assert!(
            !valid_moves.is_empty(),
            "thinker spawned without a legal move"
        );
        let cancelled = Arc::new(AtomicBool::new(false));
        let slot = Arc::new(Mutex::new(Slot::default()));

        let thread_cancelled = Arc::clone(&cancelled);
        let thread_slot = Arc::clone(&slot);
        let thread = thread::spawn(move || {
            let delay = strategy.profile().thinking_delay;
            let mut waited = Duration::ZERO;
            while waited < delay {
                if thread_cancelled.load(Ordering::Acquire) {
                    thread_slot.lock().done = true;
                    return;
                }
                let step = CANCEL_POLL_STEP.min(delay - waited);
                thread::sleep(step);
                waited += step;
            }

            let mut rng = StdRng::seed_from_u64(seed);
            let card = strategy.choose_card(&hand, &state, &valid_moves, &mut rng);

            let mut slot = thread_slot.lock();
            slot.card = Some(card);
            slot.done = true;
        });

        ThinkHandle {
            cancelled,
            slot,
            thread: Some(thread),
        }
    }
}

impl ThinkHandle {
    /// Non-blocking check; `None` until the decision lands, and forever once
    /// cancelled.
    pub fn poll(&self) -> Option<Card> {
        if self.cancelled.load(Ordering::Acquire) {
            return None;
        }
        let slot = self.slot.lock();
        if slot.done { slot.card } else { None }
    }

    pub fn is_finished(&self) -> bool {
        self.slot.lock().done || self.thread.as_ref().is_none_or(|t| t.is_finished())
    }

    /// Discards the decision, whether or not it has already been computed.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Blocks until the thinking thread exits, then reports its decision.
    pub fn wait(mut self) -> Option<Card> {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        self.poll()
    }
}

#[cfg(test)]
mod tests {
    use super::Thinker;
    use crate::strategy::{DifficultyProfile, Strategy};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use septica_core::game::state::{DEFAULT_TARGET_SCORE, GameState};
    use septica_core::model::player::{AiDifficulty, Player, PlayerId};
    use std::time::Duration;

    fn quick_strategy(delay_ms: u64) -> Strategy {
        Strategy::with_profile(
            AiDifficulty::Expert,
            DifficultyProfile {
                thinking_delay: Duration::from_millis(delay_ms),
                accuracy: 1.0,
                look_ahead_depth: 1,
            },
        )
    }

    fn playing_game(seed: u64) -> GameState {
        let players = vec![
            Player::ai(PlayerId(1), "Bot A", AiDifficulty::Expert),
            Player::ai(PlayerId(2), "Bot B", AiDifficulty::Expert),
        ];
        let mut game = GameState::new(players, DEFAULT_TARGET_SCORE);
        let mut rng = StdRng::seed_from_u64(seed);
        game.setup_new_game(&mut rng);
        game
    }

    #[test]
    fn decision_lands_after_the_delay() {
        let game = playing_game(8);
        let hand = game.current_player().hand().clone();
        let valid = game.valid_moves_for_current_player();

        let handle = Thinker::spawn(quick_strategy(5), hand, game, valid.clone(), 1);
        let card = handle.wait().expect("uncancelled decision resolves");
        assert!(valid.contains(&card));
    }

    #[test]
    fn cancelled_decision_is_discarded() {
        let game = playing_game(8);
        let hand = game.current_player().hand().clone();
        let valid = game.valid_moves_for_current_player();

        let handle = Thinker::spawn(quick_strategy(300), hand, game, valid, 1);
        handle.cancel();
        assert!(handle.is_cancelled());
        assert_eq!(handle.wait(), None);
    }

    #[test]
    fn cancel_after_completion_still_discards_the_card() {
        let game = playing_game(8);
        let hand = game.current_player().hand().clone();
        let valid = game.valid_moves_for_current_player();

        let handle = Thinker::spawn(quick_strategy(1), hand, game, valid, 1);
        while !handle.is_finished() {
            std::thread::sleep(Duration::from_millis(1));
        }
        handle.cancel();
        assert_eq!(handle.poll(), None);
    }

    #[test]
    fn poll_is_none_while_thinking() {
        let game = playing_game(8);
        let hand = game.current_player().hand().clone();
        let valid = game.valid_moves_for_current_player();

        let handle = Thinker::spawn(quick_strategy(500), hand, game, valid, 1);
        assert_eq!(handle.poll(), None);
        handle.cancel();
        assert_eq!(handle.wait(), None);
    }
}
