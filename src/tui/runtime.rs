//! TUI application state and the actions bound to keys.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::{ReportFormat, SimulationClient};
use crate::config::ExportConfig;
use crate::error::ExportError;
use crate::monitor::{CycleOutcome, Scheduler};
use crate::preference::{PreferenceStore, Theme};
use crate::render::{DashboardView, Severity, auto_status_label};

/// One-line feedback shown in the footer after a user action.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub text: String,
    pub severity: Severity,
}

impl Notice {
    fn good(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Good,
        }
    }

    fn bad(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Bad,
        }
    }
}

/// TUI application state.
pub struct App {
    scheduler: Scheduler,
    client: SimulationClient,
    prefs: PreferenceStore,
    export: ExportConfig,
    /// Auto-run interval used when toggling on.
    interval_ms: u64,
    /// Last cycle started with `r`; the run key is inert until it settles.
    manual: Option<JoinHandle<CycleOutcome>>,
    /// Active color theme.
    pub theme: Theme,
    /// Latest action feedback.
    pub notice: Option<Notice>,
    /// Whether the user has requested quit.
    pub quit: bool,
    notices_tx: mpsc::UnboundedSender<Notice>,
    notices_rx: mpsc::UnboundedReceiver<Notice>,
}

impl App {
    pub fn new(
        scheduler: Scheduler,
        client: SimulationClient,
        prefs: PreferenceStore,
        interval_ms: u64,
        export: ExportConfig,
    ) -> Self {
        let theme = prefs.get();
        let (notices_tx, notices_rx) = mpsc::unbounded_channel();
        Self {
            scheduler,
            client,
            prefs,
            export,
            interval_ms,
            manual: None,
            theme,
            notice: None,
            quit: false,
            notices_tx,
            notices_rx,
        }
    }

    /// Snapshot of the dashboard for drawing.
    pub fn view(&self) -> DashboardView {
        DashboardView::build(&self.scheduler.cycle().dashboard().lock())
    }

    pub fn auto_label(&self) -> String {
        auto_status_label(self.scheduler.state())
    }

    /// Whether a manually started cycle is still outstanding.
    pub fn run_pending(&self) -> bool {
        self.manual.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn run_once(&mut self) {
        if self.run_pending() {
            debug!("run ignored, previous manual cycle still in flight");
            self.notice = Some(Notice::bad("Simulation already running"));
            return;
        }
        self.manual = Some(self.scheduler.trigger_once());
    }

    pub fn toggle_auto(&mut self) {
        if let Err(e) = self.scheduler.toggle_auto(self.interval_ms) {
            self.notice = Some(Notice::bad(e.to_string()));
        }
    }

    pub fn clear_history(&mut self) {
        self.scheduler.cycle().dashboard().lock().clear_history();
        self.notice = None;
    }

    pub fn export_csv(&mut self) {
        let path = &self.export.csv_path;
        let result = self.scheduler.cycle().dashboard().lock().export_csv(path);
        self.notice = Some(match result {
            Ok(()) => Notice::good(format!("Saved {}", path.display())),
            Err(e @ ExportError::EmptyHistory) => Notice::bad(e.to_string()),
            Err(e) => {
                warn!(path = %path.display(), "csv export failed: {e}");
                Notice::bad(format!("Export failed: {e}"))
            }
        });
    }

    /// Starts a report download; the result arrives as a notice.
    pub fn download(&mut self, format: ReportFormat) {
        let client = self.client.clone();
        let dir = self.export.download_dir.clone();
        let tx = self.notices_tx.clone();
        tokio::spawn(async move {
            let notice = match client.download(format, &dir).await {
                Ok(path) => Notice::good(format!("Saved {}", path.display())),
                Err(e) => Notice::bad(e.to_string()),
            };
            let _ = tx.send(notice);
        });
    }

    pub fn toggle_theme(&mut self) {
        match self.prefs.set(self.theme.toggled()) {
            Ok(theme) => self.theme = theme,
            Err(e) => {
                warn!("theme not persisted: {e}");
                self.theme = self.theme.toggled();
                self.notice = Some(Notice::bad("Theme preference could not be saved"));
            }
        }
    }

    /// Moves finished background results into `notice`.
    pub fn drain_notices(&mut self) {
        while let Ok(notice) = self.notices_rx.try_recv() {
            self.notice = Some(notice);
        }
    }

    /// Stops auto-run; cycles already dispatched still finish.
    pub fn shutdown(&mut self) {
        self.scheduler.stop_auto();
    }
}
