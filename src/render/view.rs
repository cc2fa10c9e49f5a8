use crate::monitor::dashboard::Dashboard;
use crate::monitor::processor;
use crate::monitor::scheduler::SchedulerState;
use crate::monitor::types::{ClassifiedSnapshot, Status, Trend};

const SERVER_ONLINE: &str = "Server Online";
const SERVER_OFFLINE: &str = "Server Offline / Error";
const FAILURE_ALERT: &str = "Error running simulation. Please check server.";
const WAITING_ALERT: &str = "Waiting for first simulation...";
const NO_RUNS_YET: &str = "No runs yet. Run simulation to add records.";
const HISTORY_CLEARED: &str = "History cleared. Run simulation to add new records.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Neutral,
    Good,
    Bad,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertBanner {
    pub text: String,
    pub severity: Severity,
}

/// Formatted stat values for the latest snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct StatCards {
    pub current_time: Option<String>,
    pub hour: String,
    pub cloud_cover_percent: Option<String>,
    pub sunrise_time: Option<String>,
    pub sunset_time: Option<String>,
    pub solar_kw: String,
    pub battery_percent: String,
    /// Demand with its trend arrow, e.g. `"150 ↑"`.
    pub demand_kw: String,
    /// Supply with its trend arrow.
    pub supply_kw: String,
    pub hospital_kw: String,
    pub school_kw: String,
    pub homes_kw: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    /// 1-based display position (1 = most recent).
    pub index: usize,
    pub hour: String,
    pub weather: String,
    pub homes: u32,
    pub demand_kw: f64,
    pub supply_kw: f64,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryTable {
    Rows(Vec<HistoryRow>),
    /// Explanatory single row shown when there is nothing to list.
    Placeholder(&'static str),
}

/// One bar of the current-snapshot breakdown chart.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownBar {
    pub label: &'static str,
    pub value_kw: f64,
}

/// Demand and supply across the history, oldest to newest.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrendSeries {
    pub labels: Vec<String>,
    pub demand_kw: Vec<f64>,
    pub supply_kw: Vec<f64>,
}

/// Everything a render target needs, detached from the live dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub server_online: bool,
    pub server_status: &'static str,
    pub busy: bool,
    pub shortage_count: u64,
    pub shortage_badge: String,
    pub alert: AlertBanner,
    pub stats: Option<StatCards>,
    pub suggestions: Vec<String>,
    pub history: HistoryTable,
    pub breakdown: Vec<BreakdownBar>,
    pub trend: TrendSeries,
}

impl DashboardView {
    /// Captures a view of the dashboard's current state.
    pub fn build(dashboard: &Dashboard) -> Self {
        let current = dashboard.current();
        let server_online = dashboard.server_status().is_online();

        Self {
            server_online,
            server_status: if server_online {
                SERVER_ONLINE
            } else {
                SERVER_OFFLINE
            },
            busy: dashboard.is_busy(),
            shortage_count: dashboard.shortage_count(),
            shortage_badge: format!("Shortages: {}", dashboard.shortage_count()),
            alert: alert_banner(current, dashboard.last_cycle_failed()),
            stats: current.map(stat_cards),
            suggestions: current
                .map(|c| {
                    processor::suggestion_lines(&c.snapshot)
                        .into_iter()
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            history: history_table(dashboard),
            breakdown: current.map(breakdown).unwrap_or_default(),
            trend: trend_series(dashboard),
        }
    }
}

/// Label for the auto-run indicator.
pub fn auto_status_label(state: SchedulerState) -> String {
    match state {
        SchedulerState::Idle => "Auto Run: OFF".to_string(),
        SchedulerState::AutoRunning { interval } => {
            format!("Auto Run: ON ({} sec)", interval.as_secs_f64())
        }
    }
}

fn alert_banner(current: Option<&ClassifiedSnapshot>, failed: bool) -> AlertBanner {
    if failed {
        return AlertBanner {
            text: FAILURE_ALERT.to_string(),
            severity: Severity::Bad,
        };
    }
    match current {
        Some(c) => AlertBanner {
            text: if c.snapshot.alert.is_empty() {
                c.status.to_string()
            } else {
                c.snapshot.alert.clone()
            },
            severity: match c.status {
                Status::Ok => Severity::Good,
                Status::Shortage => Severity::Bad,
            },
        },
        None => AlertBanner {
            text: WAITING_ALERT.to_string(),
            severity: Severity::Neutral,
        },
    }
}

fn with_arrow(value: f64, trend: Trend) -> String {
    match trend {
        Trend::None => value.to_string(),
        t => format!("{value} {}", t.arrow()),
    }
}

fn stat_cards(c: &ClassifiedSnapshot) -> StatCards {
    let s = &c.snapshot;
    StatCards {
        current_time: s.current_time.clone(),
        hour: s.hour.to_string(),
        cloud_cover_percent: s.cloud_cover_percent.map(|v| v.to_string()),
        sunrise_time: s.sunrise_time.clone(),
        sunset_time: s.sunset_time.clone(),
        solar_kw: s.solar_power_kw.to_string(),
        battery_percent: s.battery_level_percent.to_string(),
        demand_kw: with_arrow(s.total_demand_kw, c.demand_trend),
        supply_kw: with_arrow(s.total_supply_kw, c.supply_trend),
        hospital_kw: s.distribution.hospital_kw.to_string(),
        school_kw: s.distribution.school_kw.to_string(),
        homes_kw: s.distribution.homes_kw.to_string(),
    }
}

fn history_table(dashboard: &Dashboard) -> HistoryTable {
    let history = dashboard.history();
    if history.is_empty() {
        return HistoryTable::Placeholder(if history.was_cleared() {
            HISTORY_CLEARED
        } else {
            NO_RUNS_YET
        });
    }
    HistoryTable::Rows(
        history
            .iter()
            .enumerate()
            .map(|(i, c)| HistoryRow {
                index: i + 1,
                hour: c.snapshot.hour.to_string(),
                weather: c.snapshot.weather.clone(),
                homes: c.snapshot.homes,
                demand_kw: c.snapshot.total_demand_kw,
                supply_kw: c.snapshot.total_supply_kw,
                status: c.snapshot.status(),
            })
            .collect(),
    )
}

fn breakdown(c: &ClassifiedSnapshot) -> Vec<BreakdownBar> {
    let s = &c.snapshot;
    vec![
        BreakdownBar {
            label: "Solar",
            value_kw: s.solar_power_kw,
        },
        BreakdownBar {
            label: "Battery Support",
            value_kw: s.battery_support_kw.unwrap_or(0.0),
        },
        BreakdownBar {
            label: "Total Supply",
            value_kw: s.total_supply_kw,
        },
        BreakdownBar {
            label: "Total Demand",
            value_kw: s.total_demand_kw,
        },
    ]
}

fn trend_series(dashboard: &Dashboard) -> TrendSeries {
    let mut series = TrendSeries::default();
    for (i, c) in dashboard.history().oldest_first().enumerate() {
        series.labels.push(format!("Run {}", i + 1));
        series.demand_kw.push(c.snapshot.total_demand_kw);
        series.supply_kw.push(c.snapshot.total_supply_kw);
    }
    series
}
