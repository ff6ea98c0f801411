//! Fire-and-forget user notifications.

use std::fmt;
use std::sync::Mutex;

use quiz_core::model::SetId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Rewarded { xp: u64 },
    LevelUp { levels: u64, currency: u64 },
    AlreadyRewarded { set_id: SetId },
    StreakExtended { streak: u32 },
    Error(String),
}

impl Notification {
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Notification::Error(_))
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Rewarded { xp } => write!(f, "+{xp} XP"),
            Notification::LevelUp { levels: 1, currency } => {
                write!(f, "Level up! +{currency} coins")
            }
            Notification::LevelUp { levels, currency } => {
                write!(f, "{levels} levels up! +{currency} coins")
            }
            Notification::AlreadyRewarded { set_id } => {
                write!(f, "Set {set_id} already rewarded today, no points this time")
            }
            Notification::StreakExtended { streak } => write!(f, "{streak} day streak!"),
            Notification::Error(msg) => write!(f, "Something went wrong: {msg}"),
        }
    }
}

/// Receiver for user-facing messages. Implementations must not block.
pub trait NotificationSink: Send + Sync {
    fn show(&self, notification: Notification);
}

/// Sink that only logs through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn show(&self, notification: Notification) {
        if notification.is_error() {
            tracing::warn!(%notification, "notification");
        } else {
            tracing::info!(%notification, "notification");
        }
    }
}

/// Sink that keeps every notification, for tests and batch callers.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything shown so far.
    #[must_use]
    pub fn take(&self) -> Vec<Notification> {
        self.shown
            .lock()
            .map(|mut shown| std::mem::take(&mut *shown))
            .unwrap_or_default()
    }
}

impl NotificationSink for RecordingNotifier {
    fn show(&self, notification: Notification) {
        if let Ok(mut shown) = self.shown.lock() {
            shown.push(notification);
        }
    }
}
