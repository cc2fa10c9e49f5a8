//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::oneshot;

use microgrid_monitor::client::{RequestParams, SnapshotSource};
use microgrid_monitor::error::AcquisitionError;
use microgrid_monitor::monitor::cue::AlertCue;
use microgrid_monitor::monitor::{Dashboard, PollCycle, Scheduler, SharedDashboard, Snapshot};

/// Default request parameters (sunny, 20 homes, 10 kWh battery).
pub fn params() -> RequestParams {
    RequestParams {
        weather: "sunny".to_string(),
        homes: 20,
        battery_cap: 10.0,
    }
}

/// A `/simulate` payload with the given demand and supply.
pub fn payload(hour: u32, demand_kw: f64, supply_kw: f64) -> Value {
    json!({
        "hour": hour,
        "weather": "sunny",
        "homes": 20,
        "solar_power_kw": 42.5,
        "battery_level_percent": 64.0,
        "battery_support_kw": 3.0,
        "total_demand_kw": demand_kw,
        "total_supply_kw": supply_kw,
        "distribution": { "hospital_kw": 40.0, "school_kw": 25.0, "homes_kw": 55.0 },
        "suggestions": ["Shift laundry to midday."],
        "alert": if supply_kw >= demand_kw { "Grid stable." } else { "Supply shortage!" },
        "cloud_cover_percent": 20.0,
        "current_time": "12:00",
    })
}

pub fn snapshot(demand_kw: f64, supply_kw: f64) -> Snapshot {
    snapshot_at(12, demand_kw, supply_kw)
}

pub fn snapshot_at(hour: u32, demand_kw: f64, supply_kw: f64) -> Snapshot {
    serde_json::from_value(payload(hour, demand_kw, supply_kw)).expect("fixture payload parses")
}

/// Counts how often the alert cue was played.
#[derive(Clone, Default)]
pub struct CountingCue(pub Arc<AtomicUsize>);

impl CountingCue {
    pub fn plays(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl AlertCue for CountingCue {
    fn play(&mut self) -> io::Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Cue whose playback always fails.
pub struct BrokenCue;

impl AlertCue for BrokenCue {
    fn play(&mut self) -> io::Result<()> {
        Err(io::Error::other("no audio device"))
    }
}

type Reply = Result<Snapshot, AcquisitionError>;

enum Step {
    Ready(Reply),
    Gated(oneshot::Receiver<Reply>),
}

/// Snapshot source answering fetches from a script, in call order.
///
/// Gated steps block until the test releases them, which lets a test
/// control completion order of overlapping cycles.
#[derive(Default)]
pub struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_ready(&self, reply: Reply) {
        self.steps.lock().push_back(Step::Ready(reply));
    }

    /// Queues a step that resolves when the returned sender fires.
    pub fn push_gated(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.steps.lock().push_back(Step::Gated(rx));
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for ScriptedSource {
    async fn fetch(&self, _params: &RequestParams) -> Reply {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().pop_front();
        match step {
            Some(Step::Ready(reply)) => reply,
            Some(Step::Gated(rx)) => rx.await.unwrap_or_else(|_| Err(unavailable())),
            None => Err(unavailable()),
        }
    }
}

/// Acquisition error used for scripted failures.
pub fn unavailable() -> AcquisitionError {
    AcquisitionError::Status {
        status: 503,
        body: "unavailable".to_string(),
    }
}

/// Scheduler over `source` with a fresh dashboard using `cue`.
pub fn scheduler(source: Arc<ScriptedSource>, cue: Box<dyn AlertCue>) -> Scheduler {
    let cycle = PollCycle::new(source, params(), Dashboard::new(cue).shared());
    Scheduler::new(Arc::new(cycle))
}

pub fn dashboard(scheduler: &Scheduler) -> &SharedDashboard {
    scheduler.cycle().dashboard()
}

/// Yields until `cond` holds, giving spawned cycles a chance to settle.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if cond() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
