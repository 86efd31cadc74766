//! Isolated concurrent channel fan-out.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use rustc_hash::FxHashSet;
use tracing::warn;

use driftwatch_core::clock::now_secs;
use driftwatch_core::traits::ChannelHandler;
use driftwatch_core::types::{Alert, DeliveryRecord};

/// Deliver one alert to every handler concurrently.
///
/// Each handler runs on its own thread and must report within
/// `timeout`. Failures, panics, and timeouts become failure records;
/// they never block or fail a sibling channel. Handlers that outlive
/// the deadline are left to finish into a dropped channel rather than
/// being killed, so a slow delivery can still land.
pub fn fan_out(
    handlers: Vec<(String, Arc<dyn ChannelHandler>)>,
    alert: &Alert,
    timeout: Duration,
) -> Vec<DeliveryRecord> {
    let names: Vec<String> = handlers.iter().map(|(name, _)| name.clone()).collect();
    let (tx, rx) = bounded::<(String, bool, Option<String>)>(handlers.len());

    for (name, handler) in handlers {
        let tx = tx.clone();
        let alert = alert.clone();
        std::thread::spawn(move || {
            let result =
                std::panic::catch_unwind(AssertUnwindSafe(|| handler.send(&alert)));
            let outcome = match result {
                Ok(Ok(())) => (name, true, None),
                Ok(Err(e)) => (name, false, Some(e.to_string())),
                Err(_) => (name, false, Some("channel handler panicked".to_string())),
            };
            let _ = tx.send(outcome);
        });
    }
    drop(tx);

    let deadline = Instant::now() + timeout;
    let mut records = Vec::with_capacity(names.len());
    let mut responded: FxHashSet<String> = FxHashSet::default();

    while responded.len() < names.len() {
        match rx.recv_deadline(deadline) {
            Ok((name, success, detail)) => {
                responded.insert(name.clone());
                records.push(DeliveryRecord {
                    channel: name,
                    success,
                    detail,
                    at: now_secs(),
                });
            }
            Err(_) => break,
        }
    }

    for name in names {
        if !responded.contains(&name) {
            warn!(channel = %name, timeout_ms = timeout.as_millis() as u64,
                "channel delivery timed out");
            records.push(DeliveryRecord {
                channel: name,
                success: false,
                detail: Some(format!("timed out after {}ms", timeout.as_millis())),
                at: now_secs(),
            });
        }
    }

    records
}
