//! Dispatch worker thread
//!
//! Spawns a thread with its own single-threaded tokio runtime. The thread subscribes to the
//! event source, then services exactly one wake cause per iteration: cancellation, a source
//! error, or one raw event. Dispatching an event runs to completion before the next wake, so
//! at most one set of actions is ever in flight.

use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

use futures::StreamExt;
use tokio::sync::watch;

use hotplug_device::DeviceRecord;

use crate::dispatch::Dispatcher;
use crate::error::{MonitorError, Result};
use crate::source::EventSource;

/// Lifecycle of the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopState {
    /// Not yet subscribed
    Idle,
    /// Receiving events
    Running,
    /// Cancellation observed, releasing the subscription
    Draining,
    /// Terminal
    Stopped,
}

/// Why a running loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Cancellation was requested
    Cancelled,
    /// The source raised its error signal
    SourceError(String),
    /// The source stream ended
    SourceClosed,
}

/// Cooperative cancellation for a dispatch loop.
///
/// Cheap to clone and safe to trigger from any thread, including a signal handler.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub(crate) fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { tx: Arc::new(tx) }, rx)
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Channels connecting the worker to its owning monitor.
pub(crate) struct WorkerLink {
    pub startup_tx: mpsc::Sender<Result<()>>,
    pub state_tx: watch::Sender<LoopState>,
    pub cancel_rx: watch::Receiver<bool>,
    pub record_tx: mpsc::Sender<DeviceRecord>,
}

/// Spawns the dispatch worker thread
///
/// The thread returns the reason the loop stopped, or `None` if it never reached Running
/// (the startup error is reported through `startup_tx` instead).
pub(crate) fn spawn_dispatch_worker(
    source: Box<dyn EventSource>,
    dispatcher: Dispatcher,
    link: WorkerLink,
) -> std::io::Result<JoinHandle<Option<StopReason>>> {
    thread::Builder::new()
        .name("hotplug-dispatch".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!("Failed to create tokio runtime for dispatch worker: {}", e);
                    link.state_tx.send_replace(LoopState::Stopped);
                    let _ = link.startup_tx.send(Err(MonitorError::Worker(e)));
                    return None;
                }
            };

            rt.block_on(run_dispatch_loop(source, dispatcher, link))
        })
}

/// Resolves once cancellation is requested or every cancel handle is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|cancelled| *cancelled).await;
}

/// Main dispatch loop running inside the worker's runtime
async fn run_dispatch_loop(
    source: Box<dyn EventSource>,
    mut dispatcher: Dispatcher,
    link: WorkerLink,
) -> Option<StopReason> {
    let WorkerLink {
        startup_tx,
        state_tx,
        mut cancel_rx,
        record_tx,
    } = link;

    let mut events = match source.subscribe() {
        Ok(events) => events,
        Err(e) => {
            tracing::error!("Failed to subscribe to device events: {}", e);
            state_tx.send_replace(LoopState::Stopped);
            let _ = startup_tx.send(Err(MonitorError::Subscribe(e)));
            return None;
        }
    };

    state_tx.send_replace(LoopState::Running);
    let _ = startup_tx.send(Ok(()));
    tracing::info!("Dispatch loop started");

    let mut forwarding = true;
    let reason = loop {
        tokio::select! {
            biased;

            _ = cancelled(&mut cancel_rx) => {
                tracing::info!("Dispatch loop received cancellation");
                state_tx.send_replace(LoopState::Draining);
                break StopReason::Cancelled;
            }

            item = events.next() => match item {
                Some(Ok(properties)) => {
                    let record = DeviceRecord::from_property_map(&properties);
                    if dispatcher.handle(&record).is_handled() && forwarding {
                        if record_tx.send(record).is_err() {
                            tracing::debug!("Record receiver dropped, no longer forwarding");
                            forwarding = false;
                        }
                    }
                }
                Some(Err(e)) => {
                    tracing::error!("Monitor error: {}", e);
                    break StopReason::SourceError(e.to_string());
                }
                None => {
                    tracing::warn!("Device event stream ended");
                    break StopReason::SourceClosed;
                }
            }
        }
    };

    // Release the subscription, announce Stopped, then close the record stream
    drop(events);
    state_tx.send_replace(LoopState::Stopped);
    drop(record_tx);
    tracing::info!("Dispatch loop stopped: {:?}", reason);

    Some(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_handle() {
        let (handle, rx) = CancelHandle::new();
        assert!(!handle.is_cancelled());

        let clone = handle.clone();
        clone.cancel();
        clone.cancel();

        assert!(handle.is_cancelled());
        assert!(*rx.borrow());
    }

    #[test]
    fn test_loop_state_debug() {
        assert!(format!("{:?}", LoopState::Draining).contains("Draining"));
    }
}
