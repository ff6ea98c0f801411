use std::sync::Arc;

use quiz_core::gate::{CompletionGate, SetMembershipGate};
use quiz_core::model::{Flashcard, SetId};
use quiz_core::quiz::{Advance, QuizError, QuizSession};
use quiz_core::scoring::RewardPolicy;
use storage::repository::{
    CategoryRepository, FlashcardRepository, ProfileRepository, RewardPersistence, Storage,
};
use tracing::{debug, info};

use super::rewards::CompletedQuiz;
use crate::Clock;
use crate::error::QuizServiceError;
use crate::notify::NotificationSink;

/// What happened after moving past a submitted card.
#[derive(Debug, Clone)]
pub enum QuizStep {
    Next,
    Completed(Box<CompletedQuiz>),
}

/// Drives quiz sessions against storage and applies rewards on completion.
#[derive(Clone)]
pub struct QuizService {
    pub(super) clock: Clock,
    pub(super) policy: RewardPolicy,
    pub(super) gate: Arc<dyn CompletionGate + Send + Sync>,
    pub(super) categories: Arc<dyn CategoryRepository>,
    pub(super) cards: Arc<dyn FlashcardRepository>,
    pub(super) profiles: Arc<dyn ProfileRepository>,
    pub(super) rewards: Arc<dyn RewardPersistence>,
    pub(super) notifier: Arc<dyn NotificationSink>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        policy: RewardPolicy,
        categories: Arc<dyn CategoryRepository>,
        cards: Arc<dyn FlashcardRepository>,
        profiles: Arc<dyn ProfileRepository>,
        rewards: Arc<dyn RewardPersistence>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            clock,
            policy,
            gate: Arc::new(SetMembershipGate),
            categories,
            cards,
            profiles,
            rewards,
            notifier,
        }
    }

    /// Wire the service to every repository in `storage`.
    #[must_use]
    pub fn from_storage(
        clock: Clock,
        policy: RewardPolicy,
        storage: &Storage,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self::new(
            clock,
            policy,
            Arc::clone(&storage.categories),
            Arc::clone(&storage.cards),
            Arc::clone(&storage.profiles),
            Arc::clone(&storage.rewards),
            notifier,
        )
    }

    /// Override the completion gate.
    #[must_use]
    pub fn with_gate(mut self, gate: Arc<dyn CompletionGate + Send + Sync>) -> Self {
        self.gate = gate;
        self
    }

    #[must_use]
    pub fn policy(&self) -> &RewardPolicy {
        &self.policy
    }

    /// Load a set's cards and start a shuffled session over them.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::EmptySet` if the set has no cards, or storage errors.
    pub async fn start_quiz(&self, set_id: SetId) -> Result<QuizSession, QuizServiceError> {
        let cards = self.cards.cards_for_set(set_id).await?;
        let Some(category_id) = cards.first().map(Flashcard::category_id) else {
            return Err(QuizServiceError::EmptySet(set_id));
        };

        let mut session = QuizSession::new(set_id, category_id);
        session.start(&cards).map_err(|err| match err {
            QuizError::EmptyDeck => QuizServiceError::EmptySet(set_id),
            other => other.into(),
        })?;

        info!(%set_id, %category_id, cards = cards.len(), "quiz started");
        Ok(session)
    }

    /// Record `answer` for the current card and grade it.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Quiz` if the current card was already submitted
    /// or the session is not in progress.
    pub fn answer(&self, session: &mut QuizSession, answer: &str) -> Result<bool, QuizServiceError> {
        session.set_answer(answer)?;
        let correct = session.submit()?;
        debug!(
            set_id = %session.set_id(),
            position = session.cursor() + 1,
            correct,
            "answer graded"
        );
        Ok(correct)
    }

    /// Move to the next card, or complete the quiz and apply its rewards.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Quiz` before the current card is submitted. If
    /// the reward cannot be saved, returns `QuizServiceError::Unsaved` holding
    /// the report; pass it to [`QuizService::complete`] to try again.
    pub async fn advance(&self, session: &mut QuizSession) -> Result<QuizStep, QuizServiceError> {
        match session.advance(self.clock.now())? {
            Advance::Next => Ok(QuizStep::Next),
            Advance::Completed(report) => {
                let completed = self.complete(report).await?;
                Ok(QuizStep::Completed(Box::new(completed)))
            }
        }
    }

    /// Abandon a session; no report is produced and nothing is persisted.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Quiz` if the session already completed.
    pub fn cancel(&self, session: QuizSession) -> Result<(), QuizServiceError> {
        let set_id = session.set_id();
        session.cancel()?;
        info!(%set_id, "quiz cancelled");
        Ok(())
    }
}
