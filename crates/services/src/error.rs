//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{CategoryId, ScoreReport, SetId};
use quiz_core::quiz::QuizError;
use storage::repository::StorageError;

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("set {0} has no flashcards")]
    EmptySet(SetId),
    #[error("category {0} does not exist")]
    CategoryNotFound(CategoryId),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// A finished quiz whose result could not be applied. The report is kept so
    /// the caller can hand it back to `QuizService::complete`.
    #[error("result of set {} was not saved: {source}", .report.set_id())]
    Unsaved {
        report: Box<ScoreReport>,
        #[source]
        source: Box<QuizServiceError>,
    },
}

impl QuizServiceError {
    /// Take back the report of a quiz whose rewards were not saved.
    #[must_use]
    pub fn into_unsaved_report(self) -> Option<ScoreReport> {
        match self {
            QuizServiceError::Unsaved { report, .. } => Some(*report),
            _ => None,
        }
    }
}

/// Errors emitted by `LoginService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoginServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
