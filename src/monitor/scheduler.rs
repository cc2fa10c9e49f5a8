use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::info;

use super::cycle::{CycleOutcome, PollCycle};
use crate::error::SchedulerError;

/// Whether auto-run is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    AutoRunning { interval: Duration },
}

impl SchedulerState {
    pub fn is_running(self) -> bool {
        matches!(self, Self::AutoRunning { .. })
    }
}

/// Triggers poll cycles once or on a fixed interval.
///
/// Every cycle runs as its own task, so a slow response never delays the
/// next tick and cycles may overlap. Stopping auto-run cancels future ticks
/// only; cycles already dispatched run to completion.
pub struct Scheduler {
    cycle: Arc<PollCycle>,
    auto: Option<AutoRun>,
}

struct AutoRun {
    interval: Duration,
    ticker: JoinHandle<()>,
}

impl Scheduler {
    pub fn new(cycle: Arc<PollCycle>) -> Self {
        Self { cycle, auto: None }
    }

    pub fn cycle(&self) -> &Arc<PollCycle> {
        &self.cycle
    }

    /// Dispatches exactly one poll cycle.
    pub fn trigger_once(&self) -> JoinHandle<CycleOutcome> {
        let cycle = Arc::clone(&self.cycle);
        tokio::spawn(async move { cycle.run().await })
    }

    /// Runs one cycle immediately, then one every `interval_ms`.
    ///
    /// Calling this while already running replaces the previous interval.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidInterval`] for a zero interval; the
    /// scheduler state is left unchanged.
    pub fn start_auto(&mut self, interval_ms: u64) -> Result<(), SchedulerError> {
        if interval_ms == 0 {
            return Err(SchedulerError::InvalidInterval(interval_ms));
        }
        self.stop_auto();

        let interval = Duration::from_millis(interval_ms);
        let cycle = Arc::clone(&self.cycle);
        let ticker = tokio::spawn(async move {
            let mut ticks = time::interval(interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let cycle = Arc::clone(&cycle);
                tokio::spawn(async move { cycle.run().await });
            }
        });

        info!(interval_ms, "auto-run started");
        self.auto = Some(AutoRun { interval, ticker });
        Ok(())
    }

    /// Cancels future auto-run ticks.
    ///
    /// # Returns
    ///
    /// `true` if auto-run was active.
    pub fn stop_auto(&mut self) -> bool {
        match self.auto.take() {
            Some(auto) => {
                auto.ticker.abort();
                info!("auto-run stopped");
                true
            }
            None => false,
        }
    }

    /// Starts auto-run when idle, stops it when running.
    ///
    /// # Errors
    ///
    /// Propagates [`SchedulerError::InvalidInterval`] when starting.
    pub fn toggle_auto(&mut self, interval_ms: u64) -> Result<SchedulerState, SchedulerError> {
        if self.auto.is_some() {
            self.stop_auto();
        } else {
            self.start_auto(interval_ms)?;
        }
        Ok(self.state())
    }

    pub fn state(&self) -> SchedulerState {
        match &self.auto {
            Some(auto) => SchedulerState::AutoRunning {
                interval: auto.interval,
            },
            None => SchedulerState::Idle,
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(auto) = self.auto.take() {
            auto.ticker.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::client::{RequestParams, SnapshotSource};
    use crate::error::AcquisitionError;
    use crate::monitor::dashboard::Dashboard;
    use crate::monitor::fixtures::snapshot;
    use crate::monitor::types::Snapshot;

    #[derive(Default)]
    struct Counting(AtomicUsize);

    #[async_trait]
    impl SnapshotSource for Counting {
        async fn fetch(&self, _: &RequestParams) -> Result<Snapshot, AcquisitionError> {
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            Ok(snapshot(n as f64, 100.0))
        }
    }

    fn scheduler() -> (Scheduler, Arc<Counting>) {
        let source = Arc::new(Counting::default());
        let params = RequestParams {
            weather: "sunny".into(),
            homes: 20,
            battery_cap: 10.0,
        };
        let cycle = PollCycle::new(
            Arc::clone(&source) as Arc<dyn SnapshotSource>,
            params,
            Dashboard::default().shared(),
        );
        (Scheduler::new(Arc::new(cycle)), source)
    }

    #[tokio::test]
    async fn trigger_once_runs_one_cycle() {
        let (sched, source) = scheduler();
        let outcome = sched.trigger_once().await.unwrap();
        assert!(outcome.is_applied());
        assert_eq!(source.0.load(Ordering::SeqCst), 1);
        assert_eq!(sched.state(), SchedulerState::Idle);
    }

    #[tokio::test]
    async fn zero_interval_is_rejected() {
        let (mut sched, source) = scheduler();
        assert_eq!(
            sched.start_auto(0),
            Err(SchedulerError::InvalidInterval(0))
        );
        assert_eq!(sched.state(), SchedulerState::Idle);
        tokio::task::yield_now().await;
        assert_eq!(source.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn auto_runs_immediately_then_on_interval() {
        let (mut sched, source) = scheduler();
        sched.start_auto(1_000).unwrap();
        assert!(sched.state().is_running());

        time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(source.0.load(Ordering::SeqCst), 3);

        assert!(sched.stop_auto());
        time::sleep(Duration::from_millis(5_000)).await;
        assert_eq!(source.0.load(Ordering::SeqCst), 3);
        assert_eq!(sched.state(), SchedulerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_switches_state() {
        let (mut sched, _source) = scheduler();
        let state = sched.toggle_auto(500).unwrap();
        assert_eq!(
            state,
            SchedulerState::AutoRunning {
                interval: Duration::from_millis(500)
            }
        );
        assert_eq!(sched.toggle_auto(500).unwrap(), SchedulerState::Idle);
        assert!(!sched.stop_auto());
    }
}
