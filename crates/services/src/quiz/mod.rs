mod rewards;
mod service;

// Public API of the quiz subsystem.
pub use crate::error::QuizServiceError;
pub use rewards::CompletedQuiz;
pub use service::{QuizService, QuizStep};
