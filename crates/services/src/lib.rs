#![forbid(unsafe_code)]

pub mod error;
pub mod login_service;
pub mod notify;
pub mod quiz;

pub use quiz_core::Clock;

pub use error::{LoginServiceError, QuizServiceError};
pub use login_service::{LoginService, LoginSummary};
pub use notify::{Notification, NotificationSink, RecordingNotifier, TracingNotifier};
pub use quiz::{CompletedQuiz, QuizService, QuizStep};
