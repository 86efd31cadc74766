//! The scheduling loop.

use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, tick, Receiver};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use driftwatch_alert::AlertSystem;
use driftwatch_core::clock::now_secs;
use driftwatch_core::config::WatchConfig;
use driftwatch_core::errors::{ConfigError, ScanError};
use driftwatch_core::traits::{
    Cancellable, CancellationToken, ResourceProbe, SignatureExtractor,
    SpecificationSource,
};
use driftwatch_core::types::{
    ChangeEvent, ChangeKind, DriftReport, FileSignatures, Specification,
};
use driftwatch_detect::detector::classify::signatures_match;
use driftwatch_detect::DriftDetector;
use driftwatch_store::queries::{baselines, scan_runs};
use driftwatch_store::DatabaseManager;

use crate::handle::{MonitorHandle, SharedState};
use crate::lock::InstanceLock;
use crate::queue::ChangeQueue;

/// Size of the per-batch detection pool. Detection is read-only and
/// CPU-light; a small bound keeps the monitor from competing with the
/// developer's own builds.
const SCAN_THREADS: usize = 4;

/// External collaborators the monitor drives.
pub struct MonitorDeps {
    pub specs: Arc<dyn SpecificationSource>,
    pub extractor: Arc<dyn SignatureExtractor>,
    pub alerts: Arc<AlertSystem>,
    pub db: Arc<DatabaseManager>,
    pub probe: Box<dyn ResourceProbe>,
}

pub struct Monitor;

impl Monitor {
    /// Validate configuration, take the instance lock, and spawn the
    /// scheduling loop. Every failure here is fatal; nothing after
    /// this returns an error to the caller.
    pub fn start(
        project_path: &Path,
        config: WatchConfig,
        deps: MonitorDeps,
    ) -> Result<MonitorHandle, ConfigError> {
        WatchConfig::validate(&config)?;
        if !project_path.is_dir() {
            return Err(ConfigError::InvalidProjectPath {
                path: project_path.display().to_string(),
            });
        }

        let lock = InstanceLock::acquire(&project_path.join(".driftwatch"))?;

        let monitor = &config.monitor;
        let queue = ChangeQueue::new(
            monitor.effective_queue_capacity(),
            monitor.effective_overflow(),
        );
        let shared = Arc::new(SharedState::new());
        let cancel = CancellationToken::new();
        let (stop_tx, stop_rx) = bounded(1);

        let watch = compile_patterns(&monitor.effective_watch_patterns())?;
        let ignore = compile_patterns(&monitor.effective_ignore_patterns())?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(SCAN_THREADS.min(monitor.effective_batch_size()))
            .thread_name(|i| format!("driftwatch-scan-{i}"))
            .build()
            .map_err(|e| ConfigError::ValidationFailed {
                field: "scheduler".to_string(),
                message: format!("worker pool: {e}"),
            })?;

        let scheduler = Scheduler {
            project_root: project_path.to_path_buf(),
            config,
            deps,
            pool,
            watch,
            ignore,
            queue: Arc::clone(&queue),
            shared: Arc::clone(&shared),
            cancel: cancel.clone(),
            stop_rx,
        };

        shared.running.store(true, Ordering::Relaxed);
        let thread = std::thread::Builder::new()
            .name("driftwatch-scheduler".to_string())
            .spawn(move || scheduler.run())
            .map_err(|e| ConfigError::ValidationFailed {
                field: "scheduler".to_string(),
                message: format!("spawn: {e}"),
            })?;

        Ok(MonitorHandle {
            shared,
            queue,
            cancel,
            stop_tx,
            thread: Some(thread),
            _lock: lock,
        })
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<glob::Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            glob::Pattern::new(p).map_err(|e| ConfigError::ValidationFailed {
                field: "monitor.watch_patterns".to_string(),
                message: format!("invalid glob '{p}': {e}"),
            })
        })
        .collect()
}

/// What one call to `run_cycle` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleOutcome {
    /// Nothing was pending.
    Idle,
    /// A batch went through detection.
    Scanned,
    /// The batch was requeued over a resource ceiling.
    Deferred,
}

struct Scheduler {
    project_root: PathBuf,
    config: WatchConfig,
    deps: MonitorDeps,
    pool: rayon::ThreadPool,
    watch: Vec<glob::Pattern>,
    ignore: Vec<glob::Pattern>,
    queue: Arc<ChangeQueue>,
    shared: Arc<SharedState>,
    cancel: CancellationToken,
    stop_rx: Receiver<()>,
}

impl Scheduler {
    fn run(mut self) {
        let interval = self.config.monitor.effective_scan_interval_secs();
        let batch_size = self.config.monitor.effective_batch_size();
        let ticker = tick(Duration::from_secs(interval));
        let stop_rx = self.stop_rx.clone();
        let notify_rx = self.queue.notify().clone();
        info!(root = %self.project_root.display(), interval_secs = interval,
            "monitor loop started");

        loop {
            select! {
                recv(stop_rx) -> _ => break,
                recv(ticker) -> _ => self.drain_backlog(batch_size),
                recv(notify_rx) -> _ => {
                    // Early wake only once a full batch is pending;
                    // smaller bursts wait for the tick.
                    if self.queue.len() >= batch_size {
                        self.drain_backlog(batch_size);
                    }
                }
            }
            if self.cancel.is_cancelled() {
                break;
            }
        }

        self.shared.running.store(false, Ordering::Relaxed);
        info!("monitor loop stopped");
    }

    /// Run cycles until the backlog is below a full batch. A deferred
    /// batch ends the drain; it waits for the next tick instead of
    /// spinning on the resource probe.
    fn drain_backlog(&mut self, batch_size: usize) {
        while self.run_cycle() == CycleOutcome::Scanned
            && self.queue.len() >= batch_size
            && !self.cancel.is_cancelled()
        {}
    }

    /// One cycle: drain, filter, throttle-or-scan. Never returns an
    /// error; everything recoverable is logged and counted.
    fn run_cycle(&mut self) -> CycleOutcome {
        if self.cancel.is_cancelled() {
            return CycleOutcome::Idle;
        }
        let batch = self.collect_batch();
        if batch.is_empty() {
            return CycleOutcome::Idle;
        }

        let sample = self.deps.probe.sample();
        let monitor = &self.config.monitor;
        if sample.cpu_percent > monitor.effective_max_cpu_percent()
            || sample.memory_mb > monitor.effective_max_memory_mb()
        {
            debug!(cpu = sample.cpu_percent, memory_mb = sample.memory_mb,
                deferred = batch.len(), "resource ceiling hit, deferring scan");
            self.shared.throttled.store(true, Ordering::Relaxed);
            self.queue.requeue_front(batch);
            self.record_deferred_run();
            return CycleOutcome::Deferred;
        }
        self.shared.throttled.store(false, Ordering::Relaxed);

        self.scan(batch);
        CycleOutcome::Scanned
    }

    /// Log a deferred cycle in the scan-run history.
    fn record_deferred_run(&self) {
        let now = now_secs();
        let result = self.deps.db.with_writer(|conn| {
            let id = scan_runs::insert_start(conn, now)?;
            scan_runs::complete(
                conn,
                id,
                now,
                &scan_runs::ScanRunUpdate {
                    throttled: true,
                    status: "deferred".to_string(),
                    ..Default::default()
                },
            )
        });
        if let Err(e) = result {
            warn!(error = %e, "failed to record deferred scan run");
        }
    }

    /// Drain up to a batch of events, deduplicated by path (latest
    /// event wins, first-seen order preserved) and filtered through
    /// the watch/ignore globs.
    fn collect_batch(&self) -> Vec<ChangeEvent> {
        let drained = self.queue.drain(self.config.monitor.effective_batch_size());

        let mut order: Vec<PathBuf> = Vec::new();
        let mut latest: FxHashMap<PathBuf, ChangeEvent> = FxHashMap::default();
        for event in drained {
            if !latest.contains_key(&event.path) {
                order.push(event.path.clone());
            }
            latest.insert(event.path.clone(), event);
        }

        order
            .into_iter()
            .filter(|path| self.is_watched(path))
            .filter_map(|path| latest.remove(&path))
            .collect()
    }

    fn is_watched(&self, path: &Path) -> bool {
        let rel = path.strip_prefix(&self.project_root).unwrap_or(path);
        self.watch.iter().any(|p| p.matches_path(rel))
            && !self.ignore.iter().any(|p| p.matches_path(rel))
    }

    fn scan(&self, batch: Vec<ChangeEvent>) {
        let started_at = now_secs();
        let clock = Instant::now();

        let run_id = self
            .deps
            .db
            .with_writer(|conn| scan_runs::insert_start(conn, started_at))
            .map_err(|e| warn!(error = %e, "failed to open scan run"))
            .ok();

        let baselines_snapshot = self
            .deps
            .db
            .with_reader(baselines::load_snapshot)
            .unwrap_or_else(|e| {
                warn!(error = %e, "baseline load failed, scanning without history");
                Default::default()
            });

        let detector = DriftDetector::new(
            self.config.detector.clone(),
            &self.config.monitor.effective_enabled_checks(),
            Arc::new(baselines_snapshot),
        );
        let specs = Arc::clone(&self.deps.specs);
        let extractor = Arc::clone(&self.deps.extractor);

        // Per-file checks are independent and read-only against the
        // spec/baseline snapshots, so they fan out on the bounded pool.
        type FileResult =
            Result<(Option<Arc<Specification>>, FileSignatures, DriftReport), ScanError>;
        let results: Vec<(ChangeEvent, FileResult)> = self.pool.install(|| {
            batch
                .par_iter()
                .map(|event| {
                    let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
                        check_file(specs.as_ref(), extractor.as_ref(), &detector, event)
                    }))
                    .unwrap_or_else(|_| {
                        Err(ScanError::DetectionPanicked {
                            path: event.path.display().to_string(),
                        })
                    });
                    (event.clone(), outcome)
                })
                .collect()
        });

        let mut files_checked = 0i64;
        let mut reports_produced = 0i64;
        let mut created = 0u32;
        let mut suppressed = 0u32;
        let mut scan_errors = 0i64;

        for (event, result) in results {
            match result {
                Ok((spec, signatures, report)) => {
                    files_checked += 1;
                    if report.is_empty() {
                        if let Some(note) = &report.note {
                            debug!(file = %event.path.display(), note = %note,
                                "nothing to compare");
                        }
                    } else {
                        reports_produced += 1;
                        let outcome = self.deps.alerts.process_report(&report);
                        created += outcome.created;
                        suppressed += outcome.suppressed;
                    }
                    if let Some(spec) = spec {
                        self.update_baseline(&event.path, &spec, &signatures, &report);
                    }
                }
                Err(e) => {
                    scan_errors += 1;
                    warn!(file = %event.path.display(), error = %e, "file scan failed");
                    self.shared.set_error(e.to_string());
                    self.deps
                        .alerts
                        .report_scan_failure(&event.path, &e.to_string());
                }
            }
        }

        self.shared
            .last_scan_at
            .store(started_at, Ordering::Relaxed);
        self.shared.scans_completed.fetch_add(1, Ordering::Relaxed);
        self.shared
            .files_checked
            .fetch_add(files_checked as u64, Ordering::Relaxed);
        self.shared
            .alerts_created
            .fetch_add(u64::from(created), Ordering::Relaxed);
        self.shared
            .alerts_suppressed
            .fetch_add(u64::from(suppressed), Ordering::Relaxed);

        if let Some(run_id) = run_id {
            let update = scan_runs::ScanRunUpdate {
                files_checked,
                reports_produced,
                alerts_created: i64::from(created),
                alerts_suppressed: i64::from(suppressed),
                scan_errors,
                throttled: false,
                duration_ms: clock.elapsed().as_millis() as i64,
                status: if scan_errors > 0 { "partial" } else { "completed" }.to_string(),
                error: None,
            };
            if let Err(e) = self
                .deps
                .db
                .with_writer(|conn| scan_runs::complete(conn, run_id, now_secs(), &update))
            {
                warn!(error = %e, "failed to close scan run");
            }
        }

        if let Err(e) = self.deps.db.checkpoint() {
            debug!(error = %e, "wal checkpoint failed");
        }

        debug!(
            files = files_checked,
            reports = reports_produced,
            created,
            suppressed,
            errors = scan_errors,
            "scan cycle finished"
        );
    }

    /// Record the accepted state for the next scan's comparisons:
    /// elements whose signature matched the spec, and the spec
    /// document only once the file is fully aligned (so stale-doc
    /// findings persist until the code catches up).
    fn update_baseline(
        &self,
        path: &Path,
        spec: &Specification,
        signatures: &FileSignatures,
        report: &DriftReport,
    ) {
        let now = now_secs();
        let path_str = path.display().to_string();

        let observed: Vec<baselines::ObservedElement> = spec
            .elements
            .iter()
            .filter_map(|element| {
                signatures.get(&element.id).and_then(|obs| {
                    signatures_match(&element.signature, &obs.signature).then(|| {
                        baselines::ObservedElement {
                            element_id: element.id.clone(),
                            signature: obs.signature.clone(),
                            behavior_hash: obs.behavior_hash,
                            is_public: element.is_public,
                        }
                    })
                })
            })
            .collect();

        let result = self.deps.db.with_writer(|conn| {
            if !observed.is_empty() {
                baselines::upsert_elements(conn, &path_str, &observed, now)?;
            }
            if report.is_empty() {
                baselines::upsert_doc(conn, &path_str, spec.doc_hash, spec.revision, now)?;
            }
            Ok(())
        });
        if let Err(e) = result {
            warn!(file = %path_str, error = %e, "baseline update failed");
        }
    }
}

/// Check one file: resolve its spec, extract (or synthesize, for
/// deletions) its signatures, run the detector.
fn check_file(
    specs: &dyn SpecificationSource,
    extractor: &dyn SignatureExtractor,
    detector: &DriftDetector,
    event: &ChangeEvent,
) -> Result<(Option<Arc<Specification>>, FileSignatures, DriftReport), ScanError> {
    let spec = match specs.spec_for(&event.path) {
        Ok(spec) => spec,
        // An unloadable spec is informational, never an alert: the
        // report stays empty and carries the reason as its note.
        Err(e) => {
            let mut report = DriftReport::without_spec(&event.path);
            report.note = Some(e.to_string());
            return Ok((None, FileSignatures::default(), report));
        }
    };
    let signatures = match event.kind {
        // A deleted file has no signatures; against a spec that still
        // expects them, that is drift worth reporting.
        ChangeKind::Deleted => FileSignatures::missing_file(),
        _ => extractor.extract(&event.path)?,
    };
    let report = detector.check(&event.path, &signatures, spec.as_deref());
    Ok((spec, signatures, report))
}
