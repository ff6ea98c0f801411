use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{CategoryId, SetId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReportError {
    #[error("a report needs at least one question")]
    NoQuestions,

    #[error("raw score ({raw_score}) exceeds total questions ({total_questions})")]
    ScoreExceedsTotal {
        raw_score: u32,
        total_questions: u32,
    },
}

/// Outcome of one completed quiz session.
///
/// Produced exactly once by the quiz state machine and consumed by the reward calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    set_id: SetId,
    category_id: CategoryId,
    raw_score: u32,
    total_questions: u32,
    completed_at: DateTime<Utc>,
}

impl ScoreReport {
    pub(crate) fn new(
        set_id: SetId,
        category_id: CategoryId,
        raw_score: u32,
        total_questions: u32,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            set_id,
            category_id,
            raw_score,
            total_questions,
            completed_at,
        }
    }

    /// Rehydrate a report from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the counts are inconsistent.
    pub fn from_persisted(
        set_id: SetId,
        category_id: CategoryId,
        raw_score: u32,
        total_questions: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, ReportError> {
        if total_questions == 0 {
            return Err(ReportError::NoQuestions);
        }
        if raw_score > total_questions {
            return Err(ReportError::ScoreExceedsTotal {
                raw_score,
                total_questions,
            });
        }
        Ok(Self::new(
            set_id,
            category_id,
            raw_score,
            total_questions,
            completed_at,
        ))
    }

    #[must_use]
    pub fn set_id(&self) -> SetId {
        self.set_id
    }

    #[must_use]
    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    #[must_use]
    pub fn raw_score(&self) -> u32 {
        self.raw_score
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Whole-number percentage of correct answers, rounded down.
    #[must_use]
    pub fn grade_percent(&self) -> u32 {
        if self.total_questions == 0 {
            return 0;
        }
        let pct = u64::from(self.raw_score) * 100 / u64::from(self.total_questions);
        u32::try_from(pct).unwrap_or(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn grade_rounds_down() {
        let report =
            ScoreReport::from_persisted(SetId::new(1), CategoryId::new(1), 2, 3, fixed_now())
                .unwrap();
        assert_eq!(report.grade_percent(), 66);
    }

    #[test]
    fn persisted_report_rejects_score_above_total() {
        let err = ScoreReport::from_persisted(SetId::new(1), CategoryId::new(1), 4, 3, fixed_now())
            .unwrap_err();
        assert_eq!(
            err,
            ReportError::ScoreExceedsTotal {
                raw_score: 4,
                total_questions: 3
            }
        );
    }

    #[test]
    fn persisted_report_rejects_empty_quiz() {
        let err = ScoreReport::from_persisted(SetId::new(1), CategoryId::new(1), 0, 0, fixed_now())
            .unwrap_err();
        assert_eq!(err, ReportError::NoQuestions);
    }
}
