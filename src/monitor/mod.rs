//! Client-side monitoring engine: classification, history, and polling.

/// Alert cue played on shortage.
pub mod cue;
/// Poll cycle orchestration.
pub mod cycle;
pub mod dashboard;
/// Bounded newest-first history store.
pub mod history;
pub mod processor;
/// Single-shot and auto-run triggering.
pub mod scheduler;
pub mod types;

pub use cycle::{CycleOutcome, PollCycle};
pub use dashboard::{Dashboard, ServerStatus, SharedDashboard};
pub use history::{HISTORY_CAPACITY, HistoryStore};
pub use scheduler::{Scheduler, SchedulerState};
pub use types::{ClassifiedSnapshot, Snapshot, Status, Trend};
