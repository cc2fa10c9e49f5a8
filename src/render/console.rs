//! Plain-text dashboard printer for the `once` and `watch` commands.

use std::fmt::Write as _;
use std::io::{self, Write};

use super::{DashboardView, HistoryTable, RenderTarget, Severity};

/// Prints a text block to stdout after every settled cycle.
#[derive(Debug, Default)]
pub struct ConsoleRenderer;

impl RenderTarget for ConsoleRenderer {
    fn refresh(&self, view: &DashboardView) {
        let text = format_view(view);
        let mut out = io::stdout().lock();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}

/// Formats a view as the multi-line block the console renderer prints.
pub fn format_view(view: &DashboardView) -> String {
    let mut out = String::new();
    let marker = match view.alert.severity {
        Severity::Good => "[OK]",
        Severity::Bad => "[!!]",
        Severity::Neutral => "[--]",
    };

    let _ = writeln!(
        out,
        "--- {} | {} ---",
        view.server_status, view.shortage_badge
    );
    let _ = writeln!(out, "{marker} {}", view.alert.text);

    if let Some(s) = &view.stats {
        let _ = writeln!(
            out,
            "hour={} time={} cloud={}%  solar={} kW  battery={}%",
            s.hour,
            s.current_time.as_deref().unwrap_or("-"),
            s.cloud_cover_percent.as_deref().unwrap_or("-"),
            s.solar_kw,
            s.battery_percent,
        );
        let _ = writeln!(
            out,
            "demand={} kW  supply={} kW  hospital={} school={} homes={}",
            s.demand_kw, s.supply_kw, s.hospital_kw, s.school_kw, s.homes_kw,
        );
    }

    for line in &view.suggestions {
        let _ = writeln!(out, "  - {line}");
    }

    match &view.history {
        HistoryTable::Placeholder(text) => {
            let _ = writeln!(out, "history: {text}");
        }
        HistoryTable::Rows(rows) => {
            let _ = writeln!(out, "history ({} runs):", rows.len());
            for r in rows {
                let _ = writeln!(
                    out,
                    "  {:>2}  h={:<4} {:<8} homes={:<4} demand={:<8} supply={:<8} {}",
                    r.index, r.hour, r.weather, r.homes, r.demand_kw, r.supply_kw, r.status
                );
            }
        }
    }
    out
}
