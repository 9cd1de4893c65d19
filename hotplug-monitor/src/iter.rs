//! Sync iterator over dispatched device records
//!
//! Provides a blocking iterator interface for consuming the records the dispatch loop
//! handled, without requiring async/await. Iteration ends once the loop is Stopped.

use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use hotplug_device::DeviceRecord;

/// Blocking iterator over dispatched records
///
/// This iterator blocks on `next()` until a record is available or the
/// loop has stopped. Use `try_recv()` for non-blocking access.
pub struct DeviceEventIterator {
    rx: Arc<Mutex<mpsc::Receiver<DeviceRecord>>>,
}

impl DeviceEventIterator {
    pub(crate) fn new(rx: Arc<Mutex<mpsc::Receiver<DeviceRecord>>>) -> Self {
        Self { rx }
    }

    /// Block until a record is available
    ///
    /// Returns `None` once the dispatch loop has stopped.
    pub fn recv(&self) -> Option<DeviceRecord> {
        self.rx.lock().ok()?.recv().ok()
    }

    /// Try to receive a record without blocking
    pub fn try_recv(&self) -> Option<DeviceRecord> {
        self.rx.lock().ok()?.try_recv().ok()
    }

    /// Block until a record is available or timeout expires
    pub fn recv_timeout(&self, timeout: Duration) -> Option<DeviceRecord> {
        self.rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    /// Get a non-blocking iterator over currently available records
    pub fn try_iter(&self) -> TryIterator<'_> {
        TryIterator { inner: self }
    }
}

impl Iterator for DeviceEventIterator {
    type Item = DeviceRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

impl Clone for DeviceEventIterator {
    fn clone(&self) -> Self {
        Self {
            rx: Arc::clone(&self.rx),
        }
    }
}

/// Non-blocking iterator over currently available records
pub struct TryIterator<'a> {
    inner: &'a DeviceEventIterator,
}

impl<'a> Iterator for TryIterator<'a> {
    type Item = DeviceRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.try_recv()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iter_with_sender() -> (mpsc::Sender<DeviceRecord>, DeviceEventIterator) {
        let (tx, rx) = mpsc::channel();
        (tx, DeviceEventIterator::new(Arc::new(Mutex::new(rx))))
    }

    #[test]
    fn test_try_recv_empty() {
        let (_tx, iter) = iter_with_sender();
        assert!(iter.try_recv().is_none());
    }

    #[test]
    fn test_recv_timeout_empty() {
        let (_tx, iter) = iter_with_sender();

        let start = std::time::Instant::now();
        assert!(iter.recv_timeout(Duration::from_millis(50)).is_none());
        assert!(start.elapsed() >= Duration::from_millis(45));
    }

    #[test]
    fn test_iteration_ends_when_sender_drops() {
        let (tx, iter) = iter_with_sender();
        tx.send(DeviceRecord::from_properties([("ACTION", "add")])).unwrap();
        tx.send(DeviceRecord::from_properties([("ACTION", "remove")])).unwrap();
        drop(tx);

        let actions: Vec<String> = iter.map(|r| r.event.action).collect();
        assert_eq!(actions, vec!["add", "remove"]);
    }

    #[test]
    fn test_try_iter_and_clone() {
        let (tx, iter) = iter_with_sender();
        let other = iter.clone();
        tx.send(DeviceRecord::default()).unwrap();

        assert_eq!(other.try_iter().count(), 1);
        assert_eq!(iter.try_iter().count(), 0);
    }
}
