use std::sync::Arc;

use tracing::debug;

use super::dashboard::{Acceptance, SharedDashboard};
use super::types::ClassifiedSnapshot;
use crate::client::{RequestParams, SnapshotSource};
use crate::error::AcquisitionError;
use crate::render::{DashboardView, RenderTarget};

/// How a single poll cycle settled.
#[derive(Debug)]
pub enum CycleOutcome {
    /// The response was accepted into the dashboard.
    Applied(ClassifiedSnapshot),
    /// The response arrived after a newer one and was dropped.
    Stale { seq: u64 },
    /// Acquisition failed; dashboard state is unchanged apart from the
    /// server status.
    Failed(AcquisitionError),
}

impl CycleOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// One request/response round trip feeding the dashboard.
///
/// Cycles carry no mutual exclusion: several may be in flight at once and
/// the dashboard sorts out ordering via sequence numbers.
pub struct PollCycle {
    source: Arc<dyn SnapshotSource>,
    params: RequestParams,
    dashboard: SharedDashboard,
    targets: Vec<Arc<dyn RenderTarget>>,
}

impl PollCycle {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        params: RequestParams,
        dashboard: SharedDashboard,
    ) -> Self {
        Self {
            source,
            params,
            dashboard,
            targets: Vec::new(),
        }
    }

    /// Adds a render target refreshed after every settled cycle.
    #[must_use]
    pub fn with_target(mut self, target: Arc<dyn RenderTarget>) -> Self {
        self.targets.push(target);
        self
    }

    pub fn dashboard(&self) -> &SharedDashboard {
        &self.dashboard
    }

    pub fn params(&self) -> &RequestParams {
        &self.params
    }

    /// Runs the cycle to completion.
    ///
    /// The busy indicator is engaged for the whole round trip and released
    /// on every exit path, including cancellation of the future.
    pub async fn run(&self) -> CycleOutcome {
        let busy = BusyGuard::engage(&self.dashboard);
        let seq = busy.seq;
        debug!(seq, "poll cycle dispatched");

        let result = self.source.fetch(&self.params).await;

        let outcome = {
            let mut dashboard = self.dashboard.lock();
            match result {
                Ok(snapshot) => match dashboard.accept(seq, snapshot) {
                    Acceptance::Applied(c) => CycleOutcome::Applied(c),
                    Acceptance::Stale { seq, .. } => CycleOutcome::Stale { seq },
                },
                Err(err) => {
                    dashboard.record_failure(seq, &err);
                    CycleOutcome::Failed(err)
                }
            }
        };
        drop(busy);

        self.refresh_targets();
        outcome
    }

    fn refresh_targets(&self) {
        if self.targets.is_empty() {
            return;
        }
        let view = DashboardView::build(&self.dashboard.lock());
        for target in &self.targets {
            target.refresh(&view);
        }
    }
}

/// Holds one in-flight slot on the dashboard until dropped.
struct BusyGuard {
    dashboard: SharedDashboard,
    seq: u64,
}

impl BusyGuard {
    fn engage(dashboard: &SharedDashboard) -> Self {
        let seq = dashboard.lock().begin_cycle();
        Self {
            dashboard: Arc::clone(dashboard),
            seq,
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.dashboard.lock().end_cycle();
    }
}
