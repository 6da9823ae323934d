//! Study session controller.
//!
//! A session owns the ephemeral state of one study run over a deck: the
//! working card order (star-filtered, then optionally shuffled), the current
//! position, flip/answer state and running accuracy. Grading events update the
//! in-memory [`DeckProgress`] and immediately save the whole map. A failed save
//! is logged and reported on the outcome; the in-memory state is kept.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError, StudyError};
use crate::grading::{self, GradeReport};
use crate::progress::{percent, DeckProgress};
use crate::store::{DeckCatalog, ProgressStore};
use crate::types::{Card, CardProgress, Deck, MasteryStatus, StudyMode};

/// How a session builds and grades its working sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    pub mode: StudyMode,
    pub shuffle: bool,
    pub starred_only: bool,
    pub smart_grading: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            mode: StudyMode::FlipCard,
            shuffle: false,
            starred_only: false,
            smart_grading: true,
        }
    }
}

/// Running counters for the current session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub reviewed: u32,
    pub correct: u32,
}

impl SessionStats {
    /// Accuracy as a whole percent, `None` before the first grading event.
    pub fn accuracy_percent(&self) -> Option<u32> {
        percent(self.correct as usize, self.reviewed as usize)
    }
}

/// Typed-recall state of the current card.
#[derive(Debug, Clone)]
pub enum AnswerState {
    Unanswered,
    Answered(AnsweredCard),
}

/// A typed answer that has been graded.
#[derive(Debug, Clone)]
pub struct AnsweredCard {
    pub card_id: i64,
    /// Status before this answer, used when the verdict is overridden.
    pub previous_status: MasteryStatus,
    /// Whether the answer currently counts as correct.
    pub counted_correct: bool,
    pub report: GradeReport,
}

/// Result of a grading event.
#[derive(Debug, Clone)]
pub struct GradeOutcome {
    pub card_id: i64,
    pub previous_status: MasteryStatus,
    pub status: MasteryStatus,
    pub is_correct: bool,
    /// Present for typed answers.
    pub report: Option<GradeReport>,
    /// Set when the progress save failed. The in-memory progress is kept.
    pub save_error: Option<StoreError>,
}

/// Result of toggling a card's star.
#[derive(Debug, Clone)]
pub struct StarOutcome {
    pub card_id: i64,
    pub starred: bool,
    pub save_error: Option<StoreError>,
}

/// One continuous study interaction with a deck.
pub struct StudySession {
    user_id: String,
    deck: Deck,
    progress: DeckProgress,
    store: Arc<dyn ProgressStore>,
    options: SessionOptions,
    order: Vec<usize>,
    position: usize,
    answer: AnswerState,
    flipped: bool,
    stats: SessionStats,
    rng: StdRng,
}

impl StudySession {
    /// Look up a deck in the catalog and start a session on it.
    pub fn open(
        catalog: &dyn DeckCatalog,
        store: Arc<dyn ProgressStore>,
        user_id: &str,
        deck_id: &str,
        options: SessionOptions,
    ) -> Result<Self> {
        let deck = catalog
            .get_deck(deck_id)?
            .ok_or_else(|| StudyError::DeckNotFound(deck_id.to_string()))?;
        Self::new(store, user_id, deck, options)
    }

    /// Start a session, loading the user's progress for the deck.
    pub fn new(
        store: Arc<dyn ProgressStore>,
        user_id: &str,
        deck: Deck,
        options: SessionOptions,
    ) -> Result<Self> {
        let progress = store.load(user_id, &deck.id)?;

        let mut session = Self {
            user_id: user_id.to_string(),
            deck,
            progress,
            store,
            options,
            order: Vec::new(),
            position: 0,
            answer: AnswerState::Unanswered,
            flipped: false,
            stats: SessionStats::default(),
            rng: StdRng::from_entropy(),
        };
        session.rederive();
        Ok(session)
    }

    /// Use a seeded shuffle and rebuild the working sequence.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.rederive();
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn progress(&self) -> &DeckProgress {
        &self.progress
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn answer_state(&self) -> &AnswerState {
        &self.answer
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Number of cards in the working sequence.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no card matches the current filters.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current(&self) -> Option<&Card> {
        self.order.get(self.position).map(|&i| &self.deck.cards[i])
    }

    pub fn current_progress(&self) -> Option<CardProgress> {
        self.current().map(|card| self.progress.get(card.id))
    }

    /// Cards in working order.
    pub fn sequence(&self) -> impl Iterator<Item = &Card> + '_ {
        self.order.iter().map(|&i| &self.deck.cards[i])
    }

    /// Move to the next card, wrapping around.
    pub fn next(&mut self) -> Option<&Card> {
        self.step(1)
    }

    /// Move to the previous card, wrapping around.
    pub fn prev(&mut self) -> Option<&Card> {
        let back = self.order.len().saturating_sub(1);
        self.step(back)
    }

    fn step(&mut self, offset: usize) -> Option<&Card> {
        if self.order.is_empty() {
            return None;
        }
        self.position = (self.position + offset) % self.order.len();
        self.reset_card_state();
        self.current()
    }

    fn reset_card_state(&mut self) {
        self.flipped = false;
        self.answer = AnswerState::Unanswered;
    }

    /// Turn the current flip card over. Returns the new side.
    pub fn flip(&mut self) -> Result<bool> {
        self.require_mode(StudyMode::FlipCard)?;
        if self.is_empty() {
            return Err(StudyError::NoCards);
        }
        self.flipped = !self.flipped;
        Ok(self.flipped)
    }

    /// Grade the current flip card (thumbs up/down) and advance.
    pub fn grade_flip(&mut self, is_correct: bool) -> Result<GradeOutcome> {
        self.require_mode(StudyMode::FlipCard)?;
        let card_id = self.current().ok_or(StudyError::NoCards)?.id;

        let previous_status = self.progress.status(card_id);
        let status = self.progress.record(card_id, is_correct);
        self.count(is_correct);
        let save_error = self.persist();
        self.step(1);

        Ok(GradeOutcome {
            card_id,
            previous_status,
            status,
            is_correct,
            report: None,
            save_error,
        })
    }

    /// Grade a typed answer for the current card.
    ///
    /// The card stays current so the verdict can be shown and overridden;
    /// call [`next`](Self::next) to move on.
    pub fn submit_answer(&mut self, typed: &str) -> Result<GradeOutcome> {
        self.require_mode(StudyMode::TypedRecall)?;
        if grading::strip_markup(typed).trim().is_empty() {
            return Err(StudyError::EmptyAnswer);
        }
        if matches!(self.answer, AnswerState::Answered(_)) {
            return Err(StudyError::AlreadyAnswered);
        }
        let card = self.current().ok_or(StudyError::NoCards)?;
        let card_id = card.id;
        let report = grading::grade(typed, card, self.options.smart_grading);

        let is_correct = report.verdict.is_correct();
        let previous_status = self.progress.status(card_id);
        let status = self.progress.record(card_id, is_correct);
        self.count(is_correct);
        let save_error = self.persist();

        tracing::debug!(
            card_id,
            verdict = ?report.verdict,
            similarity = report.similarity,
            "graded typed answer"
        );

        self.answer = AnswerState::Answered(AnsweredCard {
            card_id,
            previous_status,
            counted_correct: is_correct,
            report: report.clone(),
        });

        Ok(GradeOutcome {
            card_id,
            previous_status,
            status,
            is_correct,
            report: Some(report),
            save_error,
        })
    }

    /// Replace the grader's verdict for the answered card ("I was right" /
    /// "I was wrong"). The status is recomputed from the pre-answer status.
    pub fn override_verdict(&mut self, is_correct: bool) -> Result<GradeOutcome> {
        let AnswerState::Answered(answered) = &mut self.answer else {
            return Err(StudyError::NotAnswered);
        };

        let card_id = answered.card_id;
        let previous_status = answered.previous_status;
        let was_correct = answered.counted_correct;
        answered.counted_correct = is_correct;

        match (was_correct, is_correct) {
            (false, true) => self.stats.correct += 1,
            (true, false) => self.stats.correct = self.stats.correct.saturating_sub(1),
            _ => {}
        }

        let status = previous_status.next(is_correct);
        self.progress.set_status(card_id, status);
        let save_error = self.persist();

        Ok(GradeOutcome {
            card_id,
            previous_status,
            status,
            is_correct,
            report: None,
            save_error,
        })
    }

    /// Star or unstar a card. The working sequence is left as-is until the
    /// next re-derivation.
    pub fn toggle_star(&mut self, card_id: i64) -> Result<StarOutcome> {
        if self.deck.card(card_id).is_none() {
            return Err(StudyError::UnknownCard(card_id));
        }
        let starred = self.progress.toggle_star(card_id);
        let save_error = self.persist();
        Ok(StarOutcome {
            card_id,
            starred,
            save_error,
        })
    }

    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.options.shuffle = shuffle;
        self.rederive();
    }

    pub fn set_starred_only(&mut self, starred_only: bool) {
        self.options.starred_only = starred_only;
        self.rederive();
    }

    /// Draw a fresh order (only reorders when shuffling is on).
    pub fn reshuffle(&mut self) {
        self.rederive();
    }

    /// Adopt progress pushed from another session or device. The working
    /// sequence is not rebuilt.
    pub fn apply_remote(&mut self, progress: DeckProgress) {
        self.progress = progress;
    }

    fn rederive(&mut self) {
        let starred_only = self.options.starred_only;
        let progress = &self.progress;

        self.order = self
            .deck
            .cards
            .iter()
            .enumerate()
            .filter(|(_, card)| !starred_only || progress.is_starred(card.id))
            .map(|(i, _)| i)
            .collect();

        if self.options.shuffle {
            self.order.shuffle(&mut self.rng);
        }

        self.position = 0;
        self.reset_card_state();

        tracing::debug!(
            deck_id = %self.deck.id,
            cards = self.order.len(),
            shuffle = self.options.shuffle,
            starred_only,
            "derived working sequence"
        );
    }

    fn require_mode(&self, mode: StudyMode) -> Result<()> {
        if self.options.mode == mode {
            return Ok(());
        }
        Err(StudyError::WrongMode(match mode {
            StudyMode::FlipCard => "flip-card",
            StudyMode::TypedRecall => "typed-recall",
        }))
    }

    fn count(&mut self, is_correct: bool) {
        self.stats.reviewed += 1;
        if is_correct {
            self.stats.correct += 1;
        }
    }

    fn persist(&self) -> Option<StoreError> {
        match self.store.save(&self.user_id, &self.deck.id, &self.progress) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(
                    user_id = %self.user_id,
                    deck_id = %self.deck.id,
                    error = %e,
                    "failed to save deck progress"
                );
                Some(e)
            }
        }
    }
}
