use thiserror::Error;

use crate::model::{CardError, ReportError};
use crate::quiz::QuizError;
use crate::scoring::PolicyError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Card(#[from] CardError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
}
