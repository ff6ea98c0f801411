use quiz_core::model::ScoreReport;
use quiz_core::scoring::{ResultsSummary, RewardOutcome, apply_report};
use storage::repository::StorageError;
use tracing::{debug, info, warn};

use super::service::QuizService;
use crate::error::QuizServiceError;
use crate::notify::Notification;

/// Everything the results screen needs after a quiz finishes.
#[derive(Debug, Clone)]
pub struct CompletedQuiz {
    pub report: ScoreReport,
    pub category_name: String,
    pub outcome: RewardOutcome,
    pub summary: ResultsSummary,
}

impl QuizService {
    /// Apply a finished session's report and persist the new snapshot once.
    ///
    /// A set already rewarded in this period only gets its report recorded in
    /// the profile history.
    ///
    /// Nothing is written unless the whole snapshot is, so a failed call can be
    /// retried with the same report.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Unsaved` carrying the report, wrapping
    /// `CategoryNotFound` if the report's category is missing or storage errors
    /// from loading/persisting.
    pub async fn complete(&self, report: ScoreReport) -> Result<CompletedQuiz, QuizServiceError> {
        match self.complete_inner(&report).await {
            Ok(done) => Ok(done),
            Err(err) => {
                warn!(set_id = %report.set_id(), error = %err, "failed to apply quiz rewards");
                self.notifier.show(Notification::Error(err.to_string()));
                Err(QuizServiceError::Unsaved {
                    report: Box::new(report),
                    source: Box::new(err),
                })
            }
        }
    }

    async fn complete_inner(&self, report: &ScoreReport) -> Result<CompletedQuiz, QuizServiceError> {
        let profile = self.profiles.load_profile().await?;
        let category = self
            .categories
            .find_category(report.category_id())
            .await?
            .ok_or(QuizServiceError::CategoryNotFound(report.category_id()))?;

        let outcome = apply_report(
            report,
            &profile,
            category.points(),
            &self.policy,
            self.gate.as_ref(),
        );

        if outcome.rewarded {
            self.rewards
                .persist_reward(&outcome.profile, outcome.category_points)
                .await
                .map_err(|err| match err {
                    StorageError::NotFound => {
                        QuizServiceError::CategoryNotFound(report.category_id())
                    }
                    other => other.into(),
                })?;
        } else {
            // only the history changed
            self.profiles.save_profile(&outcome.profile).await?;
        }

        self.announce(report, &outcome);

        let summary =
            ResultsSummary::build(report, &outcome, self.policy.level_up_condition());

        Ok(CompletedQuiz {
            report: report.clone(),
            category_name: category.name().to_owned(),
            outcome,
            summary,
        })
    }

    fn announce(&self, report: &ScoreReport, outcome: &RewardOutcome) {
        if !outcome.rewarded {
            debug!(set_id = %report.set_id(), "set already rewarded this period");
            self.notifier.show(Notification::AlreadyRewarded {
                set_id: report.set_id(),
            });
            return;
        }

        info!(
            set_id = %report.set_id(),
            score = report.raw_score(),
            total = report.total_questions(),
            xp = outcome.profile.xp(),
            leveled_up_by = outcome.leveled_up_by,
            "quiz rewarded"
        );
        self.notifier.show(Notification::Rewarded {
            xp: outcome.xp_awarded,
        });
        if outcome.leveled_up_by > 0 {
            self.notifier.show(Notification::LevelUp {
                levels: outcome.leveled_up_by,
                currency: outcome.currency_awarded,
            });
        }
    }
}
