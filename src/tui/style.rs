//! Theme palettes and auto-scaling helpers for the TUI.

use ratatui::style::Color;

use crate::preference::Theme;
use crate::render::Severity;

/// Colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub header_fg: Color,
    pub header_bg: Color,
    pub muted: Color,
    pub good: Color,
    pub bad: Color,
    pub demand: Color,
    pub supply: Color,
    pub bar: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                fg: Color::Black,
                bg: Color::White,
                header_fg: Color::White,
                header_bg: Color::Blue,
                muted: Color::Gray,
                good: Color::Green,
                bad: Color::Red,
                demand: Color::Red,
                supply: Color::Blue,
                bar: Color::Blue,
            },
            Theme::Dark => Self {
                fg: Color::White,
                bg: Color::Black,
                header_fg: Color::Black,
                header_bg: Color::Cyan,
                muted: Color::DarkGray,
                good: Color::LightGreen,
                bad: Color::LightRed,
                demand: Color::LightRed,
                supply: Color::LightCyan,
                bar: Color::Cyan,
            },
        }
    }

    pub fn severity(&self, severity: Severity) -> Color {
        match severity {
            Severity::Good => self.good,
            Severity::Bad => self.bad,
            Severity::Neutral => self.muted,
        }
    }
}

/// Computes Y-axis bounds from chart data points with 10% padding.
///
/// The lower bound never drops below zero since power values are
/// non-negative.
pub fn auto_bounds_y(demand: &[(f64, f64)], supply: &[(f64, f64)]) -> [f64; 2] {
    let all = demand.iter().chain(supply.iter()).map(|&(_, y)| y);
    let min = all.clone().fold(f64::INFINITY, f64::min);
    let max = all.fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    let range = (max - min).max(0.1);
    let pad = range * 0.1;
    [(min - pad).max(0.0), max + pad]
}
