//! Quiz session state machine: drives one attempt over a shuffled deck.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::fmt;
use thiserror::Error;

use crate::model::{CategoryId, Flashcard, ScoreReport, SetId};
use crate::shuffle::shuffle_with;

//
// ─── PHASES & ERRORS ───────────────────────────────────────────────────────────
//

/// Where a session is in its lifecycle.
///
/// `Answering` and `Submitted` alternate once per card until the deck is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    NotStarted,
    Answering,
    Submitted,
    Completed,
}

impl QuizPhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuizPhase::NotStarted => "not started",
            QuizPhase::Answering => "answering",
            QuizPhase::Submitted => "submitted",
            QuizPhase::Completed => "completed",
        }
    }

    /// True while the session is between `start` and completion.
    #[must_use]
    pub fn is_in_progress(self) -> bool {
        matches!(self, QuizPhase::Answering | QuizPhase::Submitted)
    }
}

impl fmt::Display for QuizPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations a caller can attempt on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizAction {
    Start,
    SetAnswer,
    Submit,
    Advance,
    Cancel,
}

impl fmt::Display for QuizAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuizAction::Start => "start",
            QuizAction::SetAnswer => "set an answer",
            QuizAction::Submit => "submit",
            QuizAction::Advance => "advance",
            QuizAction::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("cannot start a quiz with an empty deck")]
    EmptyDeck,

    #[error("cannot {action} while the quiz is {phase}")]
    InvalidTransition { phase: QuizPhase, action: QuizAction },
}

//
// ─── GRADING ───────────────────────────────────────────────────────────────────
//

/// Compares an answer with a solution, ignoring surrounding whitespace and case.
#[must_use]
pub fn grade_answer(answer: &str, solution: &str) -> bool {
    answer.trim().to_lowercase() == solution.trim().to_lowercase()
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Result of moving past a submitted card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The next card is ready for an answer.
    Next,
    /// The deck is exhausted; the report is emitted exactly once.
    Completed(ScoreReport),
}

/// Snapshot for rendering a progress bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuizProgress {
    /// 1-based position of the current card.
    pub position: usize,
    pub total: usize,
    pub fraction: f64,
    pub is_last: bool,
}

/// One in-memory quiz attempt.
///
/// Never persisted; it is dropped after `advance` emits a report or after `cancel`.
pub struct QuizSession {
    set_id: SetId,
    category_id: CategoryId,
    deck: Vec<Flashcard>,
    cursor: usize,
    current_answer: String,
    phase: QuizPhase,
    correct_count: u32,
    last_outcome: Option<bool>,
}

impl QuizSession {
    #[must_use]
    pub fn new(set_id: SetId, category_id: CategoryId) -> Self {
        Self {
            set_id,
            category_id,
            deck: Vec::new(),
            cursor: 0,
            current_answer: String::new(),
            phase: QuizPhase::NotStarted,
            correct_count: 0,
            last_outcome: None,
        }
    }

    /// Shuffle `deck` with the thread-local RNG and begin answering.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyDeck` for an empty deck, or
    /// `QuizError::InvalidTransition` if the session was already started.
    pub fn start(&mut self, deck: &[Flashcard]) -> Result<(), QuizError> {
        self.start_with_rng(deck, &mut rand::rng())
    }

    /// Like [`QuizSession::start`] with a caller-supplied random source.
    ///
    /// # Errors
    ///
    /// See [`QuizSession::start`].
    pub fn start_with_rng<R: Rng + ?Sized>(
        &mut self,
        deck: &[Flashcard],
        rng: &mut R,
    ) -> Result<(), QuizError> {
        self.require(QuizPhase::NotStarted, QuizAction::Start)?;
        if deck.is_empty() {
            return Err(QuizError::EmptyDeck);
        }

        self.deck = shuffle_with(deck, rng);
        self.cursor = 0;
        self.current_answer.clear();
        self.correct_count = 0;
        self.last_outcome = None;
        self.phase = QuizPhase::Answering;
        Ok(())
    }

    /// Overwrite the pending answer for the current card.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` unless the current card is still unanswered.
    pub fn set_answer(&mut self, text: impl Into<String>) -> Result<(), QuizError> {
        self.require(QuizPhase::Answering, QuizAction::SetAnswer)?;
        self.current_answer = text.into();
        Ok(())
    }

    /// Grade the pending answer against the current card.
    ///
    /// A second call before `advance` returns the first outcome and leaves the
    /// score untouched.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` if no card is active.
    pub fn submit(&mut self) -> Result<bool, QuizError> {
        match self.phase {
            QuizPhase::Submitted => Ok(self.last_outcome.unwrap_or(false)),
            QuizPhase::Answering => {
                let correct = grade_answer(&self.current_answer, self.deck[self.cursor].solution());
                if correct {
                    self.correct_count += 1;
                }
                self.last_outcome = Some(correct);
                self.phase = QuizPhase::Submitted;
                Ok(correct)
            }
            phase => Err(QuizError::InvalidTransition {
                phase,
                action: QuizAction::Submit,
            }),
        }
    }

    /// Move past the submitted card, completing the session on the last one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` if the current card was not submitted.
    pub fn advance(&mut self, completed_at: DateTime<Utc>) -> Result<Advance, QuizError> {
        self.require(QuizPhase::Submitted, QuizAction::Advance)?;

        if self.is_last_card() {
            self.phase = QuizPhase::Completed;
            let report = ScoreReport::new(
                self.set_id,
                self.category_id,
                self.correct_count,
                self.total_questions(),
                completed_at,
            );
            return Ok(Advance::Completed(report));
        }

        self.cursor += 1;
        self.current_answer.clear();
        self.last_outcome = None;
        self.phase = QuizPhase::Answering;
        Ok(Advance::Next)
    }

    /// Abandon the session without producing a report.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidTransition` if the session already completed.
    pub fn cancel(self) -> Result<(), QuizError> {
        if self.phase == QuizPhase::Completed {
            return Err(QuizError::InvalidTransition {
                phase: self.phase,
                action: QuizAction::Cancel,
            });
        }
        Ok(())
    }

    fn require(&self, expected: QuizPhase, action: QuizAction) -> Result<(), QuizError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(QuizError::InvalidTransition {
                phase: self.phase,
                action,
            })
        }
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn set_id(&self) -> SetId {
        self.set_id
    }

    #[must_use]
    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    /// The shuffled deck, fixed for the life of the session.
    #[must_use]
    pub fn deck(&self) -> &[Flashcard] {
        &self.deck
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The card being answered, if the session is in progress.
    #[must_use]
    pub fn current_card(&self) -> Option<&Flashcard> {
        if self.phase.is_in_progress() {
            self.deck.get(self.cursor)
        } else {
            None
        }
    }

    #[must_use]
    pub fn current_answer(&self) -> &str {
        &self.current_answer
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.phase == QuizPhase::Submitted
    }

    /// Grade of the current card once submitted.
    #[must_use]
    pub fn last_outcome(&self) -> Option<bool> {
        self.last_outcome
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        u32::try_from(self.deck.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn is_last_card(&self) -> bool {
        !self.deck.is_empty() && self.cursor + 1 == self.deck.len()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == QuizPhase::Completed
    }

    /// Progress through the deck, or `None` before `start`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> Option<QuizProgress> {
        if self.deck.is_empty() {
            return None;
        }
        let position = self.cursor + 1;
        Some(QuizProgress {
            position,
            total: self.deck.len(),
            fraction: position as f64 / self.deck.len() as f64,
            is_last: self.is_last_card(),
        })
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("set_id", &self.set_id)
            .field("deck_len", &self.deck.len())
            .field("cursor", &self.cursor)
            .field("phase", &self.phase)
            .field("correct_count", &self.correct_count)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
