// Metrics hooks for the `matcher` crate.
//
// Callers install a global `MatchMetrics` implementation via [`set_match_metrics`];
// every matching chain then reports which case committed, or that a chain was
// resolved without any case matching. Instrumentation stays decoupled from any
// specific metrics backend.
use std::sync::{Arc, RwLock};

use once_cell::sync::OnceCell;

use crate::types::CaseKind;

/// Metrics observer for matching chains.
pub trait MatchMetrics: Send + Sync {
    /// A case committed a result.
    ///
    /// `position` is the 1-based position of the committing case in its chain;
    /// an `otherwise` default counts as a case.
    fn record_commit(&self, kind: CaseKind, position: usize);

    /// A chain was resolved with `get` while still unmatched.
    fn record_miss(&self, cases: usize);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn MatchMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn MatchMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn MatchMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global match metrics recorder.
///
/// This is typically called once during startup so every chain shares the
/// same metrics backend.
pub fn set_match_metrics(recorder: Option<Arc<dyn MatchMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
