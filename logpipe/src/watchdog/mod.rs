//! Execution-time watchdog.
//!
//! Every pipeline run registers with the watchdog for its duration. A
//! background thread polls the registered runs and:
//!
//! - reports a run once when it crosses the warning threshold;
//! - expires a run that crosses the expiry threshold: reports it to the
//!   metrics tracker and cancels its token so the executor stops at the
//!   next step boundary.
//!
//! Expiry and normal completion race on a single compare-and-set, so a run
//! is reported by exactly one of them.

mod config;
mod watched;

pub use config::{WatchdogConfig, DEFAULT_EXPIRY_THRESHOLD_MS, DEFAULT_WARNING_THRESHOLD_MS};
pub use watched::WatchedExecution;

use crate::cancellation::CancellationToken;
use crate::document::Document;
use crate::errors::WatchdogError;
use crate::metrics::MetricsTracker;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Callback invoked once for each run crossing the warning threshold.
pub type OvertimeCallback = Arc<dyn Fn(&WatchedExecution) + Send + Sync>;

/// How long [`ExecutionTimeWatchdog::close`] waits for the poller.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// State shared between the watchdog handle and its poller.
struct WatchdogState {
    config: WatchdogConfig,
    entries: DashMap<u64, Arc<WatchedExecution>>,
    metrics: Arc<dyn MetricsTracker>,
    on_overtime: OvertimeCallback,
}

impl WatchdogState {
    fn snapshot(&self) -> Vec<Arc<WatchedExecution>> {
        self.entries.iter().map(|e| Arc::clone(e.value())).collect()
    }

    fn scan(&self) {
        let executions = self.snapshot();
        if executions.is_empty() {
            return;
        }
        let warning = self.config.warning_threshold();
        let expiry = self.config.expiry_threshold();

        for execution in &executions {
            if !execution.is_finished()
                && execution.elapsed() > warning
                && execution.try_mark_overtime()
            {
                self.notify_overtime(execution);
            }
        }

        for execution in &executions {
            if execution.elapsed() > expiry && execution.try_finish() {
                self.expire(execution);
            }
        }
    }

    fn notify_overtime(&self, execution: &WatchedExecution) {
        warn!(
            pipeline_id = execution.pipeline_id(),
            execution_id = execution.execution_id(),
            elapsed_ms = u64::try_from(execution.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Pipeline execution is taking longer than expected"
        );
        if catch_unwind(AssertUnwindSafe(|| (self.on_overtime)(execution))).is_err() {
            warn!(
                execution_id = execution.execution_id(),
                "Overtime callback panicked"
            );
        }
        self.metrics
            .execution_overtime(execution.pipeline_id(), execution.document());
    }

    fn expire(&self, execution: &WatchedExecution) {
        warn!(
            pipeline_id = execution.pipeline_id(),
            execution_id = execution.execution_id(),
            ingest_timestamp = %execution.ingest_timestamp(),
            "Pipeline execution expired"
        );
        self.metrics
            .pipeline_expired(execution.pipeline_id(), execution.document());
        execution.cancellation().cancel(format!(
            "expired after {}ms",
            self.config.expiry_threshold_ms
        ));
    }
}

/// Supervises in-flight pipeline executions.
///
/// The poller runs on its own thread with a dedicated single-threaded
/// runtime, so it keeps ticking while `execute` blocks the callers' threads.
pub struct ExecutionTimeWatchdog {
    state: Arc<WatchdogState>,
    next_id: AtomicU64,
    shutdown_tx: Mutex<Option<mpsc::Sender<()>>>,
    stopped_rx: Mutex<Option<oneshot::Receiver<()>>>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl ExecutionTimeWatchdog {
    /// Validates the config and starts the poller thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thresholds are invalid or the poller thread
    /// cannot be started.
    pub fn new(
        config: WatchdogConfig,
        metrics: Arc<dyn MetricsTracker>,
        on_overtime: OvertimeCallback,
    ) -> Result<Arc<Self>, WatchdogError> {
        config.validate()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(WatchdogError::spawn)?;

        let state = Arc::new(WatchdogState {
            config,
            entries: DashMap::new(),
            metrics,
            on_overtime,
        });
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        let (stopped_tx, stopped_rx) = oneshot::channel::<()>();

        let poller_state = Arc::clone(&state);
        let handle = std::thread::Builder::new()
            .name("logpipe-watchdog".to_string())
            .spawn(move || {
                runtime.block_on(poll(poller_state, shutdown_rx));
                let _ = stopped_tx.send(());
            })
            .map_err(WatchdogError::spawn)?;

        info!(
            warning_threshold_ms = config.warning_threshold_ms,
            expiry_threshold_ms = config.expiry_threshold_ms,
            "Execution watchdog started"
        );

        Ok(Arc::new(Self {
            state,
            next_id: AtomicU64::new(1),
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            stopped_rx: Mutex::new(Some(stopped_rx)),
            poller: Mutex::new(Some(handle)),
        }))
    }

    /// Creates a watchdog without an overtime callback.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn with_metrics(
        config: WatchdogConfig,
        metrics: Arc<dyn MetricsTracker>,
    ) -> Result<Arc<Self>, WatchdogError> {
        Self::new(config, metrics, Arc::new(|_: &WatchedExecution| {}))
    }

    /// The thresholds in use.
    #[must_use]
    pub fn config(&self) -> WatchdogConfig {
        self.state.config
    }

    /// Registers a run and returns its execution id.
    ///
    /// The document is cloned: the watchdog reports the run with the
    /// document as it was at ingest.
    pub fn start(
        &self,
        pipeline_id: &str,
        doc: &Document,
        cancellation: Arc<CancellationToken>,
    ) -> u64 {
        let execution_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let execution = WatchedExecution::new(execution_id, pipeline_id, doc.clone(), cancellation);
        self.state.entries.insert(execution_id, Arc::new(execution));
        execution_id
    }

    /// Marks a run as finished.
    ///
    /// Returns true if the run had already finished (the watchdog expired
    /// it) or is unknown, false if this call finished it.
    pub fn stop(&self, execution_id: u64) -> bool {
        self.state
            .entries
            .get(&execution_id)
            .map_or(true, |execution| !execution.try_finish())
    }

    /// Deregisters a run.
    pub fn remove(&self, execution_id: u64) {
        self.state.entries.remove(&execution_id);
    }

    /// Returns a registered run.
    #[must_use]
    pub fn get(&self, execution_id: u64) -> Option<Arc<WatchedExecution>> {
        self.state
            .entries
            .get(&execution_id)
            .map(|execution| Arc::clone(execution.value()))
    }

    /// Number of registered runs.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.state.entries.len()
    }

    /// Returns true while the poller is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.poller
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the poller, waiting a short grace period for it to exit.
    ///
    /// A poller still busy after the grace period is detached and exits
    /// after its current scan.
    pub async fn close(&self) {
        // Dropping the sender wakes the poller.
        drop(self.shutdown_tx.lock().take());
        let stopped = self.stopped_rx.lock().take();
        let Some(stopped) = stopped else {
            return;
        };

        if tokio::time::timeout(CLOSE_GRACE, stopped).await.is_err() {
            warn!("Watchdog did not stop in time, detaching it");
            return;
        }
        let handle = self.poller.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("Watchdog poller panicked");
            }
        }
    }
}

impl std::fmt::Debug for ExecutionTimeWatchdog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionTimeWatchdog")
            .field("config", &self.state.config)
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}

/// The poller loop. Ends when the shutdown channel fires or its sender is
/// dropped with the watchdog.
async fn poll(state: Arc<WatchdogState>, mut shutdown_rx: mpsc::Receiver<()>) {
    let period = state.config.poll_period();
    debug!(
        period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
        "Starting watchdog"
    );
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => state.scan(),
            _ = shutdown_rx.recv() => {
                debug!("Shutting down watchdog");
                break;
            }
        }
    }
}
