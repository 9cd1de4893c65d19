//! Sync-first hotplug monitor
//!
//! Owns the dispatch worker and exposes a fully synchronous API: start, iterate over
//! dispatched records, cancel, wait. All async work is hidden in the worker thread.

use std::sync::{mpsc, Arc, Mutex};
use std::thread::JoinHandle;

use tokio::sync::watch;

use hotplug_device::DeviceRecord;

use crate::config::MonitorConfig;
use crate::dispatch::Dispatcher;
use crate::error::{MonitorError, Result};
use crate::iter::DeviceEventIterator;
use crate::source::EventSource;
use crate::worker::{spawn_dispatch_worker, CancelHandle, LoopState, StopReason, WorkerLink};

/// Running hotplug monitor
///
/// # Example
///
/// ```rust,ignore
/// use hotplug_monitor::{HotplugMonitor, MonitorConfig};
///
/// let monitor = HotplugMonitor::start_udev(&MonitorConfig::default())?;
///
/// let cancel = monitor.cancel_handle();
/// ctrlc::set_handler(move || cancel.cancel())?;
///
/// // Blocks until the loop stops
/// for record in monitor.iter() {
///     tracing::debug!("Handled {}", record.display_message());
/// }
/// ```
pub struct HotplugMonitor {
    cancel: CancelHandle,
    state_rx: watch::Receiver<LoopState>,
    record_rx: Arc<Mutex<mpsc::Receiver<DeviceRecord>>>,
    worker: Option<JoinHandle<Option<StopReason>>>,
}

impl HotplugMonitor {
    /// Subscribe to `source` and start dispatching with `dispatcher`.
    ///
    /// Blocks until the subscription is established. A subscription failure is returned
    /// here and the loop never runs.
    pub fn start(
        config: &MonitorConfig,
        source: impl EventSource,
        dispatcher: Dispatcher,
    ) -> Result<Self> {
        config.validate()?;

        let (startup_tx, startup_rx) = mpsc::channel();
        let (state_tx, state_rx) = watch::channel(LoopState::Idle);
        let (record_tx, record_rx) = mpsc::channel();
        let (cancel, cancel_rx) = CancelHandle::new();

        let worker = spawn_dispatch_worker(
            Box::new(source),
            dispatcher,
            WorkerLink {
                startup_tx,
                state_tx,
                cancel_rx,
                record_tx,
            },
        )
        .map_err(MonitorError::Worker)?;

        match startup_rx.recv_timeout(config.startup_timeout) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = worker.join();
                return Err(e);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                cancel.cancel();
                return Err(MonitorError::StartupTimeout(config.startup_timeout));
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(match worker.join() {
                    Ok(_) => MonitorError::WorkerDisconnected,
                    Err(_) => MonitorError::WorkerPanicked,
                });
            }
        }

        tracing::debug!("Hotplug monitor running");

        Ok(Self {
            cancel,
            state_rx,
            record_rx: Arc::new(Mutex::new(record_rx)),
            worker: Some(worker),
        })
    }

    /// Start on the system's udev netlink monitor with the standard dispatcher.
    #[cfg(target_os = "linux")]
    pub fn start_udev(config: &MonitorConfig) -> Result<Self> {
        Self::start(
            config,
            crate::source::UdevSource::from_config(config),
            Dispatcher::from_config(config),
        )
    }

    /// Blocking iterator over dispatched records; ends when the loop stops.
    pub fn iter(&self) -> DeviceEventIterator {
        DeviceEventIterator::new(Arc::clone(&self.record_rx))
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Request cancellation; see [`CancelHandle::cancel`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn state(&self) -> LoopState {
        *self.state_rx.borrow()
    }

    pub fn is_stopped(&self) -> bool {
        self.state() == LoopState::Stopped
    }

    /// Block until the loop stops and return why.
    ///
    /// Does not cancel; pair with [`cancel`](Self::cancel) or a [`CancelHandle`].
    pub fn wait(mut self) -> Result<StopReason> {
        let worker = self.worker.take().ok_or(MonitorError::WorkerDisconnected)?;
        match worker.join() {
            Ok(Some(reason)) => Ok(reason),
            Ok(None) => Err(MonitorError::WorkerDisconnected),
            Err(_) => Err(MonitorError::WorkerPanicked),
        }
    }
}

impl Drop for HotplugMonitor {
    fn drop(&mut self) {
        if self.worker.is_some() {
            tracing::debug!("HotplugMonitor dropping in state {:?}, cancelling", self.state());
            self.cancel.cancel();
        }
    }
}

impl std::fmt::Debug for HotplugMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotplugMonitor")
            .field("state", &self.state())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
