//! Memory-matching mini-game
//!
//! Turn-based state machine: a fixed-size hand of cards (at most six)
//! is drawn at setup and shown face-up; when the countdown reaches zero
//! the cards flip face-down and a target word is revealed. Every guess
//! increments `tries`. A correct guess pins the card face-up and
//! advances the target; an incorrect guess locks input until the
//! rejection animation is resolved, so a double tap cannot be processed
//! twice. When every card is matched the game completes and exactly one
//! `MemoryAttempt` is recorded.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::identity::IdentityResolver;
use crate::models::{CourseRef, MemoryAttempt, RecordId, VocabSnapshot};
use crate::remote::RemoteDocuments;
use crate::storage::LocalCache;
use crate::store::{Record, StoreName, SyncedStore};

const MEMORY_ATTEMPTS: StoreName = StoreName {
    cache_key: "memory_attempts_v2",
    remote_field: "memoryScores",
};

impl Record for MemoryAttempt {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn recorded_at(&self) -> Option<DateTime<Utc>> {
        Some(self.date)
    }
}

/// One card on the board
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryCard {
    pub vocab: VocabSnapshot,
    pub face_up: bool,
    pub matched: bool,
}

/// Where the game stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Cards face-up, memorize them
    Countdown { seconds_remaining: u32 },
    /// A target is shown, waiting for a tap
    AwaitingGuess,
    /// Wrong card; input locked until the rejection is resolved
    Mismatch,
    /// All cards matched
    Completed,
}

/// What a guess did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// Correct card; `finished` when it was the last one
    Matched { finished: bool },
    /// Wrong card; input is now locked until resolved
    Mismatched,
    /// Tap ignored (countdown running, input locked, matched card, or
    /// out of range)
    Ignored,
}

/// The memory-matching game state machine
pub struct MemoryGame {
    cards: Vec<MemoryCard>,
    /// Target order over card indices
    order: Vec<usize>,
    target_pos: usize,
    tries: u32,
    phase: GamePhase,
}

impl MemoryGame {
    /// Maximum hand size drawn at setup
    pub const MAX_CARDS: usize = 6;

    /// Draw a hand from the vocabulary pool and start the countdown
    pub fn new<R: Rng>(mut pool: Vec<VocabSnapshot>, countdown_seconds: u32, rng: &mut R) -> Self {
        pool.shuffle(rng);
        pool.truncate(Self::MAX_CARDS);

        let cards = pool
            .into_iter()
            .map(|vocab| MemoryCard {
                vocab,
                face_up: true,
                matched: false,
            })
            .collect::<Vec<_>>();

        let mut order: Vec<usize> = (0..cards.len()).collect();
        order.shuffle(rng);

        let mut game = Self {
            cards,
            order,
            target_pos: 0,
            tries: 0,
            phase: GamePhase::Countdown {
                seconds_remaining: countdown_seconds,
            },
        };
        if countdown_seconds == 0 {
            game.begin_guessing();
        }
        game
    }

    /// Advance the countdown by one second
    pub fn tick(&mut self) -> GamePhase {
        if let GamePhase::Countdown { seconds_remaining } = self.phase {
            let remaining = seconds_remaining.saturating_sub(1);
            if remaining == 0 {
                self.begin_guessing();
            } else {
                self.phase = GamePhase::Countdown {
                    seconds_remaining: remaining,
                };
            }
        }
        self.phase
    }

    /// The word currently being asked for
    pub fn target(&self) -> Option<&VocabSnapshot> {
        match self.phase {
            GamePhase::AwaitingGuess | GamePhase::Mismatch => self
                .order
                .get(self.target_pos)
                .map(|&i| &self.cards[i].vocab),
            _ => None,
        }
    }

    /// Tap a card
    pub fn guess(&mut self, card_index: usize) -> GuessOutcome {
        if self.phase != GamePhase::AwaitingGuess {
            return GuessOutcome::Ignored;
        }
        let Some(card) = self.cards.get(card_index) else {
            return GuessOutcome::Ignored;
        };
        if card.matched {
            return GuessOutcome::Ignored;
        }

        self.tries += 1;

        if self.order[self.target_pos] == card_index {
            let card = &mut self.cards[card_index];
            card.matched = true;
            card.face_up = true;
            self.target_pos += 1;

            if self.target_pos == self.order.len() {
                self.phase = GamePhase::Completed;
                return GuessOutcome::Matched { finished: true };
            }
            return GuessOutcome::Matched { finished: false };
        }

        self.phase = GamePhase::Mismatch;
        GuessOutcome::Mismatched
    }

    /// Finish the rejection animation and accept input again
    pub fn resolve_mismatch(&mut self) -> GamePhase {
        if self.phase == GamePhase::Mismatch {
            self.phase = GamePhase::AwaitingGuess;
        }
        self.phase
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn tries(&self) -> u32 {
        self.tries
    }

    pub fn cards(&self) -> &[MemoryCard] {
        &self.cards
    }

    pub fn is_completed(&self) -> bool {
        self.phase == GamePhase::Completed
    }

    fn begin_guessing(&mut self) {
        for card in &mut self.cards {
            card.face_up = false;
        }
        self.phase = if self.cards.is_empty() {
            GamePhase::Completed
        } else {
            GamePhase::AwaitingGuess
        };
    }
}

/// The memory-attempt collection
pub struct MemoryScoreStore {
    inner: SyncedStore<MemoryAttempt>,
}

impl MemoryScoreStore {
    pub fn new(
        cache: Arc<dyn LocalCache>,
        remote: Arc<dyn RemoteDocuments>,
        identity: Arc<IdentityResolver>,
    ) -> Self {
        Self {
            inner: SyncedStore::new(MEMORY_ATTEMPTS, cache, remote, identity),
        }
    }

    pub async fn load(&mut self) {
        self.inner.load().await;
    }

    /// Record a finished game as exactly one attempt
    ///
    /// Consumes the game, so the same round cannot be recorded twice.
    /// Returns `None` without recording when the game is not completed.
    pub fn record(
        &mut self,
        game: MemoryGame,
        context_title: impl Into<String>,
        course: Option<CourseRef>,
        folder: Option<RecordId>,
    ) -> Option<MemoryAttempt> {
        if !game.is_completed() {
            return None;
        }

        let vocab = game
            .cards
            .iter()
            .map(|card| card.vocab.clone())
            .collect::<Vec<_>>();

        let mut attempt = MemoryAttempt::new(game.tries, context_title, vocab);
        if let Some(course) = course {
            attempt = attempt.with_course(course);
        }
        if let Some(folder) = folder {
            attempt = attempt.with_folder(folder);
        }

        let stored = attempt.clone();
        self.inner.mutate(|records| records.push(stored));
        Some(attempt)
    }

    pub fn delete(&mut self, id: &RecordId) {
        self.inner.delete(id);
    }

    /// Attempts, newest first
    pub fn records(&self) -> &[MemoryAttempt] {
        self.inner.records()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::FixedIdentity;
    use crate::storage::FileCache;
    use crate::testutil::MemoryRemote;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn pool(n: usize) -> Vec<VocabSnapshot> {
        (0..n)
            .map(|i| VocabSnapshot::new(format!("w-{i}"), format!("词{i}"), format!("cí {i}")))
            .collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    /// Play the countdown out and return the game ready for guesses
    fn started(pool_size: usize) -> MemoryGame {
        let mut game = MemoryGame::new(pool(pool_size), 3, &mut rng());
        while matches!(game.phase(), GamePhase::Countdown { .. }) {
            game.tick();
        }
        game
    }

    fn target_card_index(game: &MemoryGame) -> usize {
        let target = game.target().unwrap().clone();
        game.cards()
            .iter()
            .position(|c| c.vocab.id == target.id && !c.matched)
            .unwrap()
    }

    fn wrong_card_index(game: &MemoryGame) -> usize {
        let target = game.target().unwrap().clone();
        game.cards()
            .iter()
            .position(|c| c.vocab.id != target.id && !c.matched)
            .unwrap()
    }

    fn attempts(temp_dir: &TempDir) -> MemoryScoreStore {
        MemoryScoreStore::new(
            Arc::new(FileCache::new(temp_dir.path())),
            Arc::new(MemoryRemote::new()),
            Arc::new(IdentityResolver::new(Arc::new(FixedIdentity::guest()))),
        )
    }

    #[test]
    fn test_setup_draws_at_most_six_face_up() {
        let game = MemoryGame::new(pool(10), 3, &mut rng());

        assert_eq!(game.cards().len(), MemoryGame::MAX_CARDS);
        assert!(game.cards().iter().all(|c| c.face_up && !c.matched));
        assert_eq!(
            game.phase(),
            GamePhase::Countdown {
                seconds_remaining: 3
            }
        );
    }

    #[test]
    fn test_small_pool_uses_every_card() {
        let game = MemoryGame::new(pool(4), 3, &mut rng());
        assert_eq!(game.cards().len(), 4);
    }

    #[test]
    fn test_countdown_flips_cards_down_and_reveals_target() {
        let mut game = MemoryGame::new(pool(6), 2, &mut rng());
        assert!(game.target().is_none());

        game.tick();
        assert_eq!(
            game.phase(),
            GamePhase::Countdown {
                seconds_remaining: 1
            }
        );

        game.tick();
        assert_eq!(game.phase(), GamePhase::AwaitingGuess);
        assert!(game.cards().iter().all(|c| !c.face_up));
        assert!(game.target().is_some());
    }

    #[test]
    fn test_guesses_ignored_during_countdown() {
        let mut game = MemoryGame::new(pool(6), 3, &mut rng());
        assert_eq!(game.guess(0), GuessOutcome::Ignored);
        assert_eq!(game.tries(), 0);
    }

    #[test]
    fn test_perfect_run_has_one_try_per_card() {
        let mut game = started(6);

        for turn in 0..6 {
            let outcome = game.guess(target_card_index(&game));
            assert_eq!(
                outcome,
                GuessOutcome::Matched {
                    finished: turn == 5
                }
            );
        }

        assert_eq!(game.tries(), 6);
        assert_eq!(game.phase(), GamePhase::Completed);
    }

    #[test]
    fn test_mismatch_locks_input_until_resolved() {
        let mut game = started(6);

        assert_eq!(game.guess(wrong_card_index(&game)), GuessOutcome::Mismatched);
        assert_eq!(game.phase(), GamePhase::Mismatch);
        assert_eq!(game.tries(), 1);

        // Locked: the double tap is not processed
        assert_eq!(game.guess(0), GuessOutcome::Ignored);
        assert_eq!(game.tries(), 1);

        game.resolve_mismatch();
        assert_eq!(game.phase(), GamePhase::AwaitingGuess);
        assert_eq!(game.guess(target_card_index(&game)), GuessOutcome::Matched { finished: false });
    }

    #[test]
    fn test_tries_never_below_matched_pairs() {
        let mut game = started(6);
        let mut matched = 0u32;

        while !game.is_completed() {
            if matched % 2 == 0 {
                game.guess(wrong_card_index(&game));
                game.resolve_mismatch();
            }
            game.guess(target_card_index(&game));
            matched += 1;
            assert!(game.tries() >= matched);
        }
    }

    #[test]
    fn test_matched_card_cannot_be_guessed_again() {
        let mut game = started(6);
        let index = target_card_index(&game);
        game.guess(index);

        assert_eq!(game.guess(index), GuessOutcome::Ignored);
        assert_eq!(game.tries(), 1);
    }

    #[tokio::test]
    async fn test_completed_game_records_exactly_one_attempt() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = attempts(&temp_dir);
        store.load().await;

        let mut game = started(6);
        while !game.is_completed() {
            game.guess(target_card_index(&game));
        }

        let attempt = store
            .record(game, "HSK 1 · Basics · Greetings", Some(CourseRef::new(1, 1, 1)), None)
            .unwrap();

        assert_eq!(attempt.tries, 6);
        assert_eq!(attempt.vocab.len(), 6);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_unfinished_game_is_not_recorded() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = attempts(&temp_dir);
        store.load().await;

        let game = started(6);
        assert!(store.record(game, "unfinished", None, None).is_none());
        assert!(store.is_empty());
    }
}
