//! Desktop notification action.

use std::time::Duration;

use notify_rust::{Notification, Timeout};

use crate::error::{ActionError, Result};

/// Shows a title/body notification to the user.
#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
pub trait Notifier: Send {
    fn notify(&self, title: &str, body: &str) -> Result<()>;
}

/// Notifier backed by the freedesktop notification service.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    app_name: String,
    timeout: Duration,
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new("hotplug-notify")
    }
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        Notification::new()
            .appname(&self.app_name)
            .summary(title)
            .body(body)
            .icon("drive-removable-media")
            .timeout(Timeout::Milliseconds(timeout_millis(self.timeout)))
            .show()
            .map(|_| ())
            .map_err(|e| ActionError::Notification(e.to_string()))
    }
}

// Saturates instead of wrapping for very long timeouts
fn timeout_millis(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_notifier_config() {
        let notifier = DesktopNotifier::new("test-app").with_timeout(Duration::from_secs(2));
        assert_eq!(notifier.app_name(), "test-app");
        assert_eq!(notifier.timeout, Duration::from_secs(2));
        assert_eq!(DesktopNotifier::default().app_name(), "hotplug-notify");
    }

    #[test]
    fn test_timeout_millis_saturates() {
        assert_eq!(timeout_millis(Duration::from_secs(5)), 5_000);
        assert_eq!(timeout_millis(Duration::from_secs(u64::from(u32::MAX))), u32::MAX);
    }

    #[test]
    fn test_mock_notifier_failure_is_an_error_value() {
        let mut mock = MockNotifier::new();
        mock.expect_notify()
            .withf(|title, body| title == "USB Connected" && body.is_empty())
            .times(1)
            .returning(|_, _| Err(ActionError::Notification("no daemon".to_string())));

        let err = mock.notify("USB Connected", "").unwrap_err();
        assert_eq!(err.to_string(), "Failed to show notification: no daemon");
    }
}
