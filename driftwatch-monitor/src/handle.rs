//! The monitor handle: status, producer access, and shutdown.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crossbeam_channel::Sender;

use driftwatch_core::traits::{Cancellable, CancellationToken};

use crate::lock::InstanceLock;
use crate::queue::{ChangeProducer, ChangeQueue};

/// Point-in-time view of a running monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorStatus {
    pub running: bool,
    /// The last attempted scan was deferred over a resource ceiling.
    pub throttled: bool,
    pub last_scan_at: Option<i64>,
    pub last_error: Option<String>,
    pub scans_completed: u64,
    pub files_checked: u64,
    pub alerts_created: u64,
    pub alerts_suppressed: u64,
    pub queue_len: usize,
}

/// Counters shared between the scheduler thread and the handle.
pub(crate) struct SharedState {
    pub running: AtomicBool,
    pub throttled: AtomicBool,
    pub last_scan_at: AtomicI64,
    pub scans_completed: AtomicU64,
    pub files_checked: AtomicU64,
    pub alerts_created: AtomicU64,
    pub alerts_suppressed: AtomicU64,
    pub last_error: Mutex<Option<String>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            throttled: AtomicBool::new(false),
            last_scan_at: AtomicI64::new(0),
            scans_completed: AtomicU64::new(0),
            files_checked: AtomicU64::new(0),
            alerts_created: AtomicU64::new(0),
            alerts_suppressed: AtomicU64::new(0),
            last_error: Mutex::new(None),
        }
    }

    pub fn set_error(&self, message: String) {
        if let Ok(mut guard) = self.last_error.lock() {
            *guard = Some(message);
        }
    }
}

/// Owner-side handle returned by `Monitor::start`. Dropping the handle
/// stops the monitor.
pub struct MonitorHandle {
    pub(crate) shared: Arc<SharedState>,
    pub(crate) queue: Arc<ChangeQueue>,
    pub(crate) cancel: CancellationToken,
    pub(crate) stop_tx: Sender<()>,
    pub(crate) thread: Option<JoinHandle<()>>,
    pub(crate) _lock: InstanceLock,
}

impl MonitorHandle {
    /// Producer handle for the external change source.
    pub fn producer(&self) -> ChangeProducer {
        self.queue.producer()
    }

    pub fn status(&self) -> MonitorStatus {
        let last_scan_at = self.shared.last_scan_at.load(Ordering::Relaxed);
        MonitorStatus {
            running: self.shared.running.load(Ordering::Relaxed),
            throttled: self.shared.throttled.load(Ordering::Relaxed),
            last_scan_at: (last_scan_at > 0).then_some(last_scan_at),
            last_error: self
                .shared
                .last_error
                .lock()
                .ok()
                .and_then(|guard| guard.clone()),
            scans_completed: self.shared.scans_completed.load(Ordering::Relaxed),
            files_checked: self.shared.files_checked.load(Ordering::Relaxed),
            alerts_created: self.shared.alerts_created.load(Ordering::Relaxed),
            alerts_suppressed: self.shared.alerts_suppressed.load(Ordering::Relaxed),
            queue_len: self.queue.len(),
        }
    }

    /// Signal cancellation, let the in-flight batch finish, and join
    /// the scheduler thread. Idempotent.
    pub fn stop(&mut self) {
        self.cancel.cancel();
        let _ = self.stop_tx.send(());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        self.shared.running.store(false, Ordering::Relaxed);
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.stop();
        }
    }
}
