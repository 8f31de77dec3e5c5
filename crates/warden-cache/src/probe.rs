//! One-shot connectivity self-test.

use crate::{CacheOutcome, CacheStore, CacheTable, ScanCriteria};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Result of a connectivity probe. Only ever logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeReport {
    /// The backend answered a bounded scan.
    Reachable { sampled: usize },
    /// The backend failed or timed out.
    Unreachable(String),
    /// Reads are disabled, so there was nothing to check.
    Skipped,
}

/// Guard ensuring a probe runs at most once.
#[derive(Debug, Default)]
pub struct ConnectivityProbe {
    started: AtomicBool,
}

static PROCESS_PROBE: ConnectivityProbe = ConnectivityProbe::new();

impl ConnectivityProbe {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            started: AtomicBool::new(false),
        }
    }

    /// Claims the probe. Only the first caller gets `true`.
    pub fn try_claim(&self) -> bool {
        self.started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    #[must_use]
    pub fn has_run(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Spawns the probe in the background if this guard has not run yet.
    ///
    /// Returns `None` on every call after the first. Never blocks.
    pub fn spawn(&self, store: Arc<CacheStore>) -> Option<JoinHandle<ProbeReport>> {
        if !self.try_claim() {
            return None;
        }
        Some(tokio::spawn(async move { run_probe(&store).await }))
    }
}

/// Spawns the process-wide startup probe. Later calls are no-ops.
pub fn spawn_startup_probe(store: Arc<CacheStore>) -> Option<JoinHandle<ProbeReport>> {
    PROCESS_PROBE.spawn(store)
}

/// Runs a `Limit(1)` scan of the identity table and logs the result.
pub async fn run_probe(store: &CacheStore) -> ProbeReport {
    if !store.reads_enabled() {
        info!(backend = store.backend_name(), "Cache reads disabled; connectivity test skipped");
        return ProbeReport::Skipped;
    }

    let table = store.table_name(CacheTable::Identity);
    let report = match store.scan(CacheTable::Identity, ScanCriteria::Limit(1)).await {
        Ok(CacheOutcome::Ok(entries)) => ProbeReport::Reachable {
            sampled: entries.len(),
        },
        // Reads were switched off between the check and the scan.
        Ok(CacheOutcome::NotFound) => ProbeReport::Skipped,
        Ok(CacheOutcome::BackendError(detail)) => ProbeReport::Unreachable(detail),
        Err(e) => ProbeReport::Unreachable(e.to_string()),
    };

    match &report {
        ProbeReport::Reachable { sampled } => {
            info!(backend = store.backend_name(), %table, sampled, "Cache connection successful");
        }
        ProbeReport::Unreachable(detail) => {
            warn!(backend = store.backend_name(), %table, error = %detail, "Cache connection failed");
        }
        ProbeReport::Skipped => {
            info!(backend = store.backend_name(), "Cache connectivity test skipped");
        }
    }

    report
}
