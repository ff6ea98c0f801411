use std::sync::Arc;

use quiz_core::gate::{is_new_reward_period, reset_completion_gate};
use quiz_core::streak::{WeekCalendar, record_login, week_calendar};
use storage::repository::ProfileRepository;
use tracing::{info, warn};

use crate::Clock;
use crate::error::LoginServiceError;
use crate::notify::{Notification, NotificationSink};

/// Result of recording a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSummary {
    pub streak: u32,
    /// True when this login opened a new reward period and cleared completed sets.
    pub gate_reset: bool,
    pub week: WeekCalendar,
}

/// Records logins, maintains the streak and rolls the daily reward gate.
#[derive(Clone)]
pub struct LoginService {
    clock: Clock,
    profiles: Arc<dyn ProfileRepository>,
    notifier: Arc<dyn NotificationSink>,
}

impl LoginService {
    #[must_use]
    pub fn new(
        clock: Clock,
        profiles: Arc<dyn ProfileRepository>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            clock,
            profiles,
            notifier,
        }
    }

    /// Record a login at the clock's current local time.
    ///
    /// The first login of a new local day also clears the completion gate, so
    /// every set can earn rewards once more.
    ///
    /// # Errors
    ///
    /// Returns `LoginServiceError::Storage` if the profile cannot be loaded or saved.
    pub async fn record_login(&self) -> Result<LoginSummary, LoginServiceError> {
        let now = self.clock.now_local();
        let today = now.date_naive();

        let profile = self.profiles.load_profile().await?;
        let gate_reset = is_new_reward_period(&profile, today);
        let base = if gate_reset {
            reset_completion_gate(&profile)
        } else {
            profile.clone()
        };
        let next = record_login(&base, now);

        if let Err(err) = self.profiles.save_profile(&next).await {
            warn!(error = %err, "failed to save login");
            self.notifier.show(Notification::Error(err.to_string()));
            return Err(err.into());
        }

        info!(streak = next.streak(), gate_reset, "login recorded");
        if next.streak() > profile.streak() && next.streak() > 1 {
            self.notifier.show(Notification::StreakExtended {
                streak: next.streak(),
            });
        }

        Ok(LoginSummary {
            streak: next.streak(),
            gate_reset,
            week: week_calendar(next.login_timestamps(), today),
        })
    }

    /// Read-only view of the current week's logins.
    ///
    /// # Errors
    ///
    /// Returns `LoginServiceError::Storage` if the profile cannot be loaded.
    pub async fn current_week(&self) -> Result<WeekCalendar, LoginServiceError> {
        let profile = self.profiles.load_profile().await?;
        Ok(week_calendar(profile.login_timestamps(), self.clock.today()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use chrono::Duration;
    use quiz_core::model::SetId;
    use quiz_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn service(clock: Clock, repo: &InMemoryRepository) -> (LoginService, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let svc = LoginService::new(clock, Arc::new(repo.clone()), notifier.clone());
        (svc, notifier)
    }

    #[tokio::test]
    async fn consecutive_days_extend_streak() {
        let repo = InMemoryRepository::new();
        let mut clock = fixed_clock();

        for expected in 1..=3 {
            let (svc, _) = service(clock, &repo);
            let summary = svc.record_login().await.unwrap();
            assert_eq!(summary.streak, expected);
            clock.advance(Duration::days(1));
        }

        let (svc, notifier) = service(clock, &repo);
        assert_eq!(svc.record_login().await.unwrap().streak, 4);
        assert_eq!(
            notifier.take(),
            vec![Notification::StreakExtended { streak: 4 }]
        );
    }

    #[tokio::test]
    async fn same_day_login_keeps_gate_and_streak() {
        let repo = InMemoryRepository::new();
        let mut clock = fixed_clock();
        let (svc, _) = service(clock, &repo);
        svc.record_login().await.unwrap();

        let mut profile = repo.load_profile().await.unwrap();
        profile = quiz_core::model::UserProfile::from_persisted(
            profile.xp(),
            profile.currency(),
            [SetId::new(8)],
            profile.login_timestamps().to_vec(),
            profile.streak(),
            [],
        );
        repo.save_profile(&profile).await.unwrap();

        clock.advance(Duration::minutes(30));
        let (svc, notifier) = service(clock, &repo);
        let summary = svc.record_login().await.unwrap();

        assert_eq!(summary.streak, 1);
        assert!(!summary.gate_reset);
        assert!(notifier.take().is_empty());
        let stored = repo.load_profile().await.unwrap();
        assert!(stored.completed_set_ids().contains(&SetId::new(8)));
    }

    #[tokio::test]
    async fn new_day_resets_completion_gate() {
        let repo = InMemoryRepository::new();
        let mut clock = fixed_clock();
        let (svc, _) = service(clock, &repo);
        svc.record_login().await.unwrap();

        let profile = repo.load_profile().await.unwrap();
        let with_done = quiz_core::model::UserProfile::from_persisted(
            10,
            0,
            [SetId::new(1), SetId::new(2)],
            profile.login_timestamps().to_vec(),
            profile.streak(),
            [],
        );
        repo.save_profile(&with_done).await.unwrap();

        clock.advance(Duration::days(1));
        let (svc, _) = service(clock, &repo);
        let summary = svc.record_login().await.unwrap();

        assert!(summary.gate_reset);
        assert_eq!(summary.streak, 2);
        let stored = repo.load_profile().await.unwrap();
        assert!(stored.completed_set_ids().is_empty());
        assert_eq!(stored.xp(), 10);
    }

    #[tokio::test]
    async fn week_view_tolerates_no_logins() {
        let repo = InMemoryRepository::new();
        let (svc, _) = service(fixed_clock(), &repo);
        let week = svc.current_week().await.unwrap();
        assert_eq!(week.days.len(), 7);
        assert_eq!(week.logged_days(), 0);
    }
}
