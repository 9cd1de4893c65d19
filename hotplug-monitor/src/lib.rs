//! # Hotplug Monitor
//!
//! Subscribes to kernel device lifecycle events and dispatches side effects per event.
//!
//! ## Overview
//!
//! The monitor owns one dedicated worker thread with its own tokio runtime. That thread
//! subscribes to an [`EventSource`] (the udev netlink monitor on Linux), then loops over three
//! mutually exclusive wake causes:
//!
//! - **Cancellation** requested through a [`CancelHandle`]: the loop drains and stops
//! - **Source error**: fatal to the subscription, the loop stops without resubscribing
//! - **Event**: normalized into a [`DeviceRecord`] and handed to the [`Dispatcher`]
//!
//! Dispatch (summary, notification, sound) runs to completion before the next wake, so slow
//! actions throttle consumption instead of interleaving.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hotplug_monitor::{HotplugMonitor, MonitorConfig};
//!
//! let config = MonitorConfig::default().with_sound(false);
//! let monitor = HotplugMonitor::start_udev(&config)?;
//!
//! for record in monitor.iter() {
//!     println!("{}", record.display_name());
//! }
//! ```
//!
//! ## Lifecycle
//!
//! `Idle` → `Running` once subscribed; a subscribe failure is returned from
//! [`HotplugMonitor::start`] and the loop never runs. `Running` → `Draining` → `Stopped` on
//! cancellation, `Running` → `Stopped` on a source error. Reaching `Stopped` closes the
//! record stream so iteration ends.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod iter;
pub mod monitor;
pub mod source;
pub mod worker;

pub use config::MonitorConfig;
pub use dispatch::{Dispatch, Dispatcher};
pub use error::{MonitorError, Result};
pub use iter::DeviceEventIterator;
pub use monitor::HotplugMonitor;
pub use source::{ChannelSource, EventSource, EventStream, SourceSender};
pub use worker::{CancelHandle, LoopState, StopReason};

#[cfg(target_os = "linux")]
pub use source::UdevSource;

// Re-export commonly used types from dependencies
pub use hotplug_device::DeviceRecord;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CancelHandle, DeviceRecord, Dispatch, Dispatcher, EventSource, HotplugMonitor,
        LoopState, MonitorConfig, MonitorError, Result, StopReason,
    };
}
