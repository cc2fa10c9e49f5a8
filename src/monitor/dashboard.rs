//! The dashboard controller: sole owner of all mutable monitoring state.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::cue::{AlertCue, Silent};
use super::history::HistoryStore;
use super::types::{ClassifiedSnapshot, Snapshot};
use crate::error::{AcquisitionError, ExportError};
use crate::io::export;

/// Dashboard shared between the scheduler, poll cycles, and UI adapters.
///
/// Lock it only for synchronous work; never hold the guard across `.await`.
pub type SharedDashboard = Arc<Mutex<Dashboard>>;

/// Reachability of the simulation service as last observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerStatus {
    Online,
    Offline { reason: String },
}

impl ServerStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

/// Result of offering a sequenced response to the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum Acceptance {
    /// The snapshot was classified and recorded.
    Applied(ClassifiedSnapshot),
    /// A newer response had already been applied; this one was dropped.
    Stale { seq: u64, last_applied: u64 },
}

/// Monitoring state for one session.
///
/// Holds the history (with its trend baseline), the shortage counter, the
/// last observed server status, and the bookkeeping that orders overlapping
/// poll cycles.
pub struct Dashboard {
    history: HistoryStore,
    current: Option<ClassifiedSnapshot>,
    shortage_count: u64,
    server: ServerStatus,
    last_cycle_failed: bool,
    next_seq: u64,
    last_applied_seq: u64,
    in_flight: usize,
    cue: Box<dyn AlertCue>,
}

impl fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("history_len", &self.history.len())
            .field("shortage_count", &self.shortage_count)
            .field("server", &self.server)
            .field("last_applied_seq", &self.last_applied_seq)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(Box::new(Silent))
    }
}

impl Dashboard {
    /// Creates an empty dashboard that plays `cue` on each shortage.
    pub fn new(cue: Box<dyn AlertCue>) -> Self {
        Self {
            history: HistoryStore::new(),
            current: None,
            shortage_count: 0,
            server: ServerStatus::Online,
            last_cycle_failed: false,
            next_seq: 0,
            last_applied_seq: 0,
            in_flight: 0,
            cue,
        }
    }

    /// Wraps the dashboard for sharing across tasks.
    pub fn shared(self) -> SharedDashboard {
        Arc::new(Mutex::new(self))
    }

    /// Registers a new in-flight cycle and returns its sequence number.
    pub fn begin_cycle(&mut self) -> u64 {
        self.in_flight += 1;
        self.next_seq += 1;
        self.next_seq
    }

    /// Releases one in-flight cycle.
    pub fn end_cycle(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Number of cycles dispatched but not yet settled.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Returns `true` while any cycle is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    /// Offers the response of cycle `seq`.
    ///
    /// Responses that settle after a newer one has been applied are dropped
    /// so the dashboard always reflects the most recently dispatched request.
    pub fn accept(&mut self, seq: u64, snapshot: Snapshot) -> Acceptance {
        if seq <= self.last_applied_seq {
            warn!(
                seq,
                last_applied = self.last_applied_seq,
                "discarding stale simulation response"
            );
            return Acceptance::Stale {
                seq,
                last_applied: self.last_applied_seq,
            };
        }
        self.last_applied_seq = seq;
        Acceptance::Applied(self.ingest(snapshot))
    }

    /// Classifies and records a snapshot outside of cycle sequencing.
    ///
    /// Bumps the shortage counter and attempts the alert cue when the
    /// snapshot classifies as shortage.
    pub fn ingest(&mut self, snapshot: Snapshot) -> ClassifiedSnapshot {
        let classified = self.history.classify(snapshot);
        self.history.push(classified.clone());
        self.current = Some(classified.clone());
        self.server = ServerStatus::Online;
        self.last_cycle_failed = false;

        if classified.status.is_shortage() {
            self.shortage_count += 1;
            info!(count = self.shortage_count, "supply shortage detected");
            if let Err(e) = self.cue.play() {
                debug!("alert cue failed: {e}");
            }
        }
        classified
    }

    /// Marks the service offline after cycle `seq` failed.
    ///
    /// History and trend baseline are left untouched. A failure older than
    /// the last applied response is ignored.
    ///
    /// # Returns
    ///
    /// `true` if the failure was recorded.
    pub fn record_failure(&mut self, seq: u64, err: &AcquisitionError) -> bool {
        if seq < self.last_applied_seq {
            debug!(seq, "ignoring failure of superseded cycle: {err}");
            return false;
        }
        warn!(seq, "poll cycle failed: {err}");
        self.server = ServerStatus::Offline {
            reason: err.to_string(),
        };
        self.last_cycle_failed = true;
        true
    }

    /// Empties the history and resets the trend baseline.
    ///
    /// The shortage counter is deliberately left as is.
    pub fn clear_history(&mut self) {
        self.history.clear();
        info!("history cleared");
    }

    /// Writes the history as CSV.
    ///
    /// # Errors
    ///
    /// [`ExportError::EmptyHistory`] when there is nothing to export.
    pub fn write_csv(&self, writer: impl Write) -> Result<(), ExportError> {
        export::write_csv(&self.history, writer)
    }

    /// Exports the history as CSV to `path`.
    ///
    /// # Errors
    ///
    /// [`ExportError::EmptyHistory`] when there is nothing to export; no
    /// file is created in that case.
    pub fn export_csv(&self, path: &Path) -> Result<(), ExportError> {
        export::export_csv(&self.history, path)?;
        info!(rows = self.history.len(), path = %path.display(), "history exported");
        Ok(())
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Latest accepted snapshot; survives [`clear_history`](Self::clear_history).
    pub fn current(&self) -> Option<&ClassifiedSnapshot> {
        self.current.as_ref()
    }

    pub fn shortage_count(&self) -> u64 {
        self.shortage_count
    }

    pub fn server_status(&self) -> &ServerStatus {
        &self.server
    }

    /// Returns `true` if the most recently settled cycle failed.
    pub fn last_cycle_failed(&self) -> bool {
        self.last_cycle_failed
    }
}
