//! Configuration for the hotplug monitor
//!
//! These are plain values handed to the monitor by its caller; nothing here is read from
//! the environment or the command line.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{MonitorError, Result};

/// Configuration for the HotplugMonitor
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Show a desktop notification per attach/detach
    /// Default: true
    pub notifications: bool,

    /// Play an audio cue per attach/detach
    /// Default: true
    pub sound: bool,

    /// User override for the connect sound
    /// Default: None (bundled sound)
    pub connect_sound: Option<PathBuf>,

    /// User override for the disconnect sound
    /// Default: None (bundled sound)
    pub disconnect_sound: Option<PathBuf>,

    /// udev subsystems to subscribe to
    /// Default: ["usb", "block"]
    pub subsystems: Vec<String>,

    /// Only deliver devices carrying this udev tag
    /// Default: Some("seat")
    pub tag: Option<String>,

    /// How long `start` waits for the subscription result
    /// Default: 5 seconds
    pub startup_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            notifications: true,
            sound: true,
            connect_sound: None,
            disconnect_sound: None,
            subsystems: vec!["usb".to_string(), "block".to_string()],
            tag: Some("seat".to_string()),
            startup_timeout: Duration::from_secs(5),
        }
    }
}

impl MonitorConfig {
    /// Create a new MonitorConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Console summaries only: no notification, no sound
    pub fn silent() -> Self {
        Self {
            notifications: false,
            sound: false,
            ..Default::default()
        }
    }

    pub fn with_notifications(mut self, enabled: bool) -> Self {
        self.notifications = enabled;
        self
    }

    pub fn with_sound(mut self, enabled: bool) -> Self {
        self.sound = enabled;
        self
    }

    pub fn with_connect_sound(mut self, path: impl Into<PathBuf>) -> Self {
        self.connect_sound = Some(path.into());
        self
    }

    pub fn with_disconnect_sound(mut self, path: impl Into<PathBuf>) -> Self {
        self.disconnect_sound = Some(path.into());
        self
    }

    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag;
        self
    }

    pub fn connect_sound(&self) -> Option<&Path> {
        self.connect_sound.as_deref()
    }

    pub fn disconnect_sound(&self) -> Option<&Path> {
        self.disconnect_sound.as_deref()
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if self.subsystems.is_empty() {
            return Err(MonitorError::Configuration(
                "At least one subsystem must be monitored".to_string(),
            ));
        }

        if self.subsystems.iter().any(|s| s.is_empty()) {
            return Err(MonitorError::Configuration(
                "Subsystem names must not be empty".to_string(),
            ));
        }

        if self.startup_timeout == Duration::ZERO {
            return Err(MonitorError::Configuration(
                "Startup timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
