//! TUI layout and widget rendering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, Paragraph, Row, Table,
    Wrap,
};

use super::controls;
use super::runtime::App;
use super::style::{self, Palette};
use crate::monitor::Status;
use crate::render::{DashboardView, HistoryTable};

/// Renders the full TUI frame.
pub fn render(frame: &mut Frame, app: &App, view: &DashboardView) {
    let palette = Palette::for_theme(app.theme);
    frame.render_widget(
        Block::default().style(Style::default().fg(palette.fg).bg(palette.bg)),
        frame.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // header
            Constraint::Length(3),  // alert banner
            Constraint::Length(4),  // stat cards
            Constraint::Min(10),    // charts
            Constraint::Length(14), // suggestions + history
            Constraint::Length(1),  // footer
        ])
        .split(frame.area());

    render_header(frame, app, view, &palette, chunks[0]);
    render_alert(frame, view, &palette, chunks[1]);
    render_stats(frame, view, chunks[2]);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[3]);
    render_breakdown(frame, view, &palette, charts[0]);
    render_trend(frame, view, &palette, charts[1]);

    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[4]);
    render_suggestions(frame, view, lower[0]);
    render_history(frame, view, &palette, lower[1]);

    render_footer(frame, app, &palette, chunks[5]);
}

/// Header bar: server status, shortage badge, auto-run state.
fn render_header(frame: &mut Frame, app: &App, view: &DashboardView, p: &Palette, area: Rect) {
    let server_color = if view.server_online { p.good } else { p.bad };
    let mut spans = vec![
        Span::styled(
            " MICROGRID ",
            Style::default()
                .fg(p.header_fg)
                .bg(p.header_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(view.server_status, Style::default().fg(server_color)),
        Span::raw(" │ "),
        Span::styled(
            view.shortage_badge.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ "),
        Span::raw(app.auto_label()),
    ];
    if view.busy {
        spans.push(Span::styled(
            " │ running...",
            Style::default().fg(p.muted),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_alert(frame: &mut Frame, view: &DashboardView, p: &Palette, area: Rect) {
    let color = p.severity(view.alert.severity);
    let alert = Paragraph::new(Line::from(Span::styled(
        view.alert.text.as_str(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )))
    .block(
        Block::default()
            .title(" Alert ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    );
    frame.render_widget(alert, area);
}

fn render_stats(frame: &mut Frame, view: &DashboardView, area: Rect) {
    let lines = match &view.stats {
        Some(s) => vec![
            Line::from(format!(
                "  hour={}  time={}  cloud={}%  sunrise={}  sunset={}",
                s.hour,
                s.current_time.as_deref().unwrap_or("-"),
                s.cloud_cover_percent.as_deref().unwrap_or("-"),
                s.sunrise_time.as_deref().unwrap_or("-"),
                s.sunset_time.as_deref().unwrap_or("-"),
            )),
            Line::from(format!(
                "  solar={} kW  battery={}%  demand={} kW  supply={} kW  hospital={} school={} homes={}",
                s.solar_kw,
                s.battery_percent,
                s.demand_kw,
                s.supply_kw,
                s.hospital_kw,
                s.school_kw,
                s.homes_kw,
            )),
        ],
        None => vec![Line::from("  No snapshot yet.")],
    };
    let block = Block::default().title(" Current ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Current snapshot breakdown as a bar chart.
fn render_breakdown(frame: &mut Frame, view: &DashboardView, p: &Palette, area: Rect) {
    // Bars take integer heights; tenths of a kW keep small values visible.
    let bars: Vec<Bar> = view
        .breakdown
        .iter()
        .map(|b| {
            Bar::default()
                .label(Line::from(b.label))
                .value((b.value_kw * 10.0).round().max(0.0) as u64)
                .text_value(b.value_kw.to_string())
                .style(Style::default().fg(p.bar))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .title(" Energy Breakdown (kW) ")
                .borders(Borders::ALL),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(9)
        .bar_gap(1);
    frame.render_widget(chart, area);
}

/// Demand vs supply across the history, oldest to newest.
fn render_trend(frame: &mut Frame, view: &DashboardView, p: &Palette, area: Rect) {
    let demand: Vec<(f64, f64)> = view
        .trend
        .demand_kw
        .iter()
        .enumerate()
        .map(|(i, &v)| ((i + 1) as f64, v))
        .collect();
    let supply: Vec<(f64, f64)> = view
        .trend
        .supply_kw
        .iter()
        .enumerate()
        .map(|(i, &v)| ((i + 1) as f64, v))
        .collect();

    let y_bounds = style::auto_bounds_y(&demand, &supply);
    let x_hi = (demand.len() as f64).max(2.0);

    let datasets = vec![
        Dataset::default()
            .name("Demand")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(p.demand))
            .data(&demand),
        Dataset::default()
            .name("Supply")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(p.supply))
            .data(&supply),
    ];

    let x_labels = match (view.trend.labels.first(), view.trend.labels.last()) {
        (Some(first), Some(last)) => vec![first.clone(), last.clone()],
        _ => vec![String::new(), String::new()],
    };
    let y_labels = vec![
        format!("{:.1}", y_bounds[0]),
        format!("{:.1}", y_bounds[1]),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(" Demand vs Supply ")
                .borders(Borders::ALL),
        )
        .x_axis(Axis::default().bounds([1.0, x_hi]).labels(x_labels))
        .y_axis(
            Axis::default()
                .title("kW")
                .bounds(y_bounds)
                .labels(y_labels),
        );
    frame.render_widget(chart, area);
}

fn render_suggestions(frame: &mut Frame, view: &DashboardView, area: Rect) {
    let lines: Vec<Line> = view
        .suggestions
        .iter()
        .map(|s| Line::from(format!("• {s}")))
        .collect();
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(" Suggestions ").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn render_history(frame: &mut Frame, view: &DashboardView, p: &Palette, area: Rect) {
    let block = Block::default().title(" History ").borders(Borders::ALL);

    let rows: Vec<Row> = match &view.history {
        HistoryTable::Placeholder(text) => {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                *text,
                Style::default().fg(p.muted),
            )))
            .block(block);
            frame.render_widget(paragraph, area);
            return;
        }
        HistoryTable::Rows(rows) => rows
            .iter()
            .map(|r| {
                let status_color = match r.status {
                    Status::Ok => p.good,
                    Status::Shortage => p.bad,
                };
                Row::new(vec![
                    Cell::from(r.index.to_string()),
                    Cell::from(r.hour.clone()),
                    Cell::from(r.weather.clone()),
                    Cell::from(r.homes.to_string()),
                    Cell::from(r.demand_kw.to_string()),
                    Cell::from(r.supply_kw.to_string()),
                    Cell::from(r.status.to_string()).style(Style::default().fg(status_color)),
                ])
            })
            .collect(),
    };

    let header = Row::new(vec![
        "#", "Hour", "Weather", "Homes", "Demand", "Supply", "Status",
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));
    let widths = [
        Constraint::Length(3),
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(9),
    ];
    frame.render_widget(Table::new(rows, widths).header(header).block(block), area);
}

/// Footer with keybinding hints and the latest notice.
fn render_footer(frame: &mut Frame, app: &App, p: &Palette, area: Rect) {
    let mut spans = vec![Span::styled(controls::HELP, Style::default().fg(p.muted))];
    if let Some(notice) = &app.notice {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            notice.text.as_str(),
            Style::default().fg(p.severity(notice.severity)),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
