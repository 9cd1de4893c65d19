use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while starting or running the hotplug monitor
#[derive(Error, Debug)]
pub enum MonitorError {
    /// The event source could not be subscribed to
    #[error("Failed to subscribe to device events: {0}")]
    Subscribe(#[source] std::io::Error),

    /// The dispatch worker could not build its runtime or thread
    #[error("Failed to start dispatch worker: {0}")]
    Worker(#[source] std::io::Error),

    /// The worker did not report a subscription result in time
    #[error("Timed out after {0:?} waiting for the event subscription")]
    StartupTimeout(Duration),

    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The worker went away without reporting
    #[error("Dispatch worker disconnected")]
    WorkerDisconnected,

    /// The worker thread panicked
    #[error("Dispatch worker panicked")]
    WorkerPanicked,
}

/// Result type for monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = MonitorError::Subscribe(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "netlink bind refused",
        ));
        assert_eq!(
            error.to_string(),
            "Failed to subscribe to device events: netlink bind refused"
        );

        let error = MonitorError::Configuration("no subsystems".to_string());
        assert_eq!(error.to_string(), "Configuration error: no subsystems");

        let error = MonitorError::StartupTimeout(Duration::from_secs(5));
        assert_eq!(
            error.to_string(),
            "Timed out after 5s waiting for the event subscription"
        );
    }
}
