use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{CardId, CategoryId, SetId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CardError {
    #[error("prompt cannot be empty")]
    EmptyPrompt,

    #[error("solution cannot be empty")]
    EmptySolution,
}

//
// ─── FLASHCARD ─────────────────────────────────────────────────────────────────
//

/// A single prompt/solution pair owned by a set.
///
/// Flashcards are immutable once created; a quiz only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    id: CardId,
    prompt: String,
    solution: String,
    category_id: CategoryId,
    set_id: SetId,
}

impl Flashcard {
    /// Build a flashcard, rejecting blank prompt or solution text.
    ///
    /// # Errors
    ///
    /// Returns `CardError::EmptyPrompt` or `CardError::EmptySolution` when the
    /// respective text is empty after trimming.
    pub fn new(
        id: CardId,
        prompt: impl Into<String>,
        solution: impl Into<String>,
        category_id: CategoryId,
        set_id: SetId,
    ) -> Result<Self, CardError> {
        let prompt = prompt.into();
        let solution = solution.into();

        if prompt.trim().is_empty() {
            return Err(CardError::EmptyPrompt);
        }
        if solution.trim().is_empty() {
            return Err(CardError::EmptySolution);
        }

        Ok(Self {
            id,
            prompt,
            solution,
            category_id,
            set_id,
        })
    }

    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn solution(&self) -> &str {
        &self.solution
    }

    #[must_use]
    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    #[must_use]
    pub fn set_id(&self) -> SetId {
        self.set_id
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_fails_if_prompt_blank() {
        let err = Flashcard::new(
            CardId::new(1),
            "   ",
            "ok",
            CategoryId::new(1),
            SetId::new(1),
        )
        .unwrap_err();
        assert_eq!(err, CardError::EmptyPrompt);
    }

    #[test]
    fn card_fails_if_solution_blank() {
        let err = Flashcard::new(CardId::new(1), "Q", "\n", CategoryId::new(1), SetId::new(1))
            .unwrap_err();
        assert_eq!(err, CardError::EmptySolution);
    }

    #[test]
    fn card_keeps_text_verbatim() {
        let card = Flashcard::new(
            CardId::new(3),
            "Capital of France?",
            " Paris ",
            CategoryId::new(2),
            SetId::new(9),
        )
        .unwrap();
        assert_eq!(card.prompt(), "Capital of France?");
        assert_eq!(card.solution(), " Paris ");
        assert_eq!(card.category_id(), CategoryId::new(2));
        assert_eq!(card.set_id(), SetId::new(9));
    }
}
