//! Presentation-neutral view of the dashboard and the render target seam.
//!
//! Nothing here mutates monitoring state. Adapters (console printer, TUI)
//! receive a [`DashboardView`] and draw it however they like.

pub mod console;
mod view;

pub use view::{
    AlertBanner, BreakdownBar, DashboardView, HistoryRow, HistoryTable, Severity, StatCards,
    TrendSeries, auto_status_label,
};

/// A presentation surface refreshed after each settled poll cycle.
pub trait RenderTarget: Send + Sync {
    fn refresh(&self, view: &DashboardView);
}
