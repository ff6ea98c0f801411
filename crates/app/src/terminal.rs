use services::{Notification, NotificationSink};

/// Prints notifications for the person at the terminal and logs them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier;

impl NotificationSink for TerminalNotifier {
    fn show(&self, notification: Notification) {
        if notification.is_error() {
            tracing::warn!(%notification, "notification");
            eprintln!("! {notification}");
        } else {
            tracing::debug!(%notification, "notification");
            println!("* {notification}");
        }
    }
}
