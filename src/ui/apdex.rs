//! Apdex view rendering.
//!
//! Shows score and response-time trends, the bucket distribution, and a
//! table of every classified time-slice.

use chrono::{Local, TimeZone};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Sparkline, Table, TableState},
    Frame,
};

use crate::app::{App, SeriesData};
use crate::data::classify::weekday_name;
use crate::data::Bucket;
use crate::ui::common::{placeholder, render_message};

/// Render the Apdex view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let series = match app.series.loaded() {
        Some(series) => series,
        None => {
            if let Some(msg) = placeholder(app, &app.series) {
                render_message(frame, app, area, "Apdex", msg);
            }
            return;
        }
    };

    let [top, table_area] =
        Layout::vertical([Constraint::Length(9), Constraint::Min(5)]).areas(area);
    let [trends, distribution] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(30)]).areas(top);

    render_trends(frame, app, series, trends);
    render_distribution(frame, app, series, distribution);
    render_table(frame, app, series, table_area);
}

fn block<'a>(app: &App, title: String) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

fn render_trends(frame: &mut Frame, app: &App, series: &SeriesData, area: Rect) {
    let outer = block(app, " Trends ".to_string());
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let [apdex_area, response_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Fill(1)]).areas(inner);

    // Sparklines take integers; scores become hundredths
    let scores: Vec<u64> = series
        .chart_apdex()
        .iter()
        .map(|p| (p.score.clamp(0.0, 1.0) * 100.0).round() as u64)
        .collect();
    let response: Vec<u64> = series
        .chart_response_time()
        .iter()
        .map(|p| p.response_time.max(0.0).round() as u64)
        .collect();
    let peak = response.iter().copied().max().unwrap_or(0);

    frame.render_widget(
        Sparkline::default()
            .block(Block::default().title(format!("Apdex ({} points)", scores.len())))
            .data(&scores)
            .max(100)
            .style(Style::default().fg(app.theme.highlight)),
        apdex_area,
    );
    frame.render_widget(
        Sparkline::default()
            .block(Block::default().title(format!("Response time (peak {} ms)", peak)))
            .data(&response)
            .style(Style::default().fg(app.theme.warning)),
        response_area,
    );
}

fn render_distribution(frame: &mut Frame, app: &App, series: &SeriesData, area: Rect) {
    let shares = series.distribution();
    let lines: Vec<Line> = Bucket::ALL
        .iter()
        .zip(shares)
        .map(|(bucket, share)| {
            let bar = "█".repeat((share / 10.0).round() as usize);
            Line::from(vec![
                Span::styled(format!(" {:<7}", bucket.label()), app.theme.bucket_style(*bucket)),
                Span::raw(format!("{:>5.1}% ", share)),
                Span::styled(bar, Style::default().fg(app.theme.bucket_color(*bucket))),
            ])
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines).block(block(app, " Buckets ".to_string())),
        area,
    );
}

fn format_slice_start(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn render_table(frame: &mut Frame, app: &App, series: &SeriesData, area: Rect) {
    let header = Row::new(vec![
        "From", "Day", "Score", "Bucket", "Txns", "S/T/F", "Resp ms", "Reqs",
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = series
        .apdex
        .iter()
        .enumerate()
        .map(|(i, p)| {
            // Both series share range and resolution, so they pair by index
            let response = series.response_time.get(i);
            let bucket_cell = Cell::from(p.bucket.label()).style(app.theme.bucket_style(p.bucket));
            let day = if p.business_hours {
                Span::raw(weekday_name(p.day_of_week))
            } else {
                Span::styled(
                    weekday_name(p.day_of_week),
                    Style::default().add_modifier(Modifier::DIM),
                )
            };

            Row::new(vec![
                Cell::from(format_slice_start(p.from)),
                Cell::from(day),
                Cell::from(format!("{:.2}", p.score)),
                bucket_cell,
                Cell::from(p.txn_count.to_string()),
                Cell::from(format!("{}/{}/{}", p.txn_success, p.txn_tolerate, p.txn_fail)),
                Cell::from(
                    response
                        .map(|r| format!("{:.1}", r.response_time))
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::from(
                    response
                        .map(|r| r.request_count.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(17),
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Length(7),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ];

    let selected = app.selected_row.min(rows.len().saturating_sub(1));
    let position_info = if rows.is_empty() {
        String::new()
    } else {
        format!(" [{}/{}]", selected + 1, rows.len())
    };
    let title = format!(" Time-slices{} [e:export] ", position_info);

    let table = Table::new(rows, widths)
        .header(header)
        .block(block(app, title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}
