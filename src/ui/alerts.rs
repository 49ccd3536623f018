//! Events and Violations view rendering.

use chrono::{Local, TimeZone, Utc};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use slawatch_types::{EventKind, Priority};

use crate::app::App;
use crate::data::datetime::past_date_relative;
use crate::data::duration::format_duration;
use crate::ui::common::{placeholder, render_message};

fn format_ms(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn relative(ms: i64) -> String {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(then) => past_date_relative(then, Utc::now()),
        None => "-".to_string(),
    }
}

/// "[x] Label" markers for a filter row in a block title.
fn toggles<T: Copy + PartialEq>(
    all: &[T],
    selected: impl Fn(T) -> bool,
    label: impl Fn(T) -> &'static str,
) -> String {
    all.iter()
        .map(|item| {
            let mark = if selected(*item) { "x" } else { " " };
            format!("[{}] {}", mark, label(*item))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn table_block<'a>(app: &App, title: String) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

/// Render the Events view: recent alert events, newest first.
pub fn render_events(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = placeholder(app, &app.events) {
        render_message(frame, app, area, "Events", msg);
        return;
    }

    let events = app.visible_events();
    let header = Row::new(vec!["When", "Age", "Type", "Priority", "Description"])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = events
        .iter()
        .map(|e| {
            let priority = match e.priority {
                Some(p) => Cell::from(p.label()).style(app.theme.priority_style(p)),
                None => Cell::from("-"),
            };
            Row::new(vec![
                Cell::from(format_ms(e.timestamp)),
                Cell::from(relative(e.timestamp)),
                Cell::from(e.event_type.as_str()).style(app.theme.event_style(e.event_type)),
                priority,
                Cell::from(e.description.clone()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(19),
        Constraint::Length(16),
        Constraint::Length(22),
        Constraint::Length(9),
        Constraint::Fill(1),
    ];

    let total = app.events.loaded().map_or(0, Vec::len);
    let kinds = toggles(
        &EventKind::ALL,
        |k| app.event_filter.shows(k),
        |k| k.label(),
    );
    let priorities = toggles(
        &Priority::ALL,
        |p| app.event_filter.priorities().contains(&p),
        |p| p.label(),
    );
    let title = format!(
        " Events ({}/{}) {} | {} ",
        events.len(),
        total,
        kinds,
        priorities
    );

    let selected = app.selected_row.min(rows.len().saturating_sub(1));
    let table = Table::new(rows, widths)
        .header(header)
        .block(table_block(app, title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(table, area, &mut state);
}

/// Render the Violations view: one page of buffered violations.
pub fn render_violations(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = placeholder(app, &app.violations) {
        render_message(frame, app, area, "Violations", msg);
        return;
    }

    let pager = &app.pager;
    let header = Row::new(vec![
        "ID", "Label", "Duration", "Opened", "Closed", "Condition", "Priority",
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = pager
        .current_page()
        .iter()
        .map(|v| {
            let closed = match v.closed_at {
                Some(ms) => Cell::from(format_ms(ms)),
                None => Cell::from(Line::from(Span::styled(
                    "open",
                    Style::default()
                        .fg(app.theme.critical)
                        .add_modifier(Modifier::BOLD),
                ))),
            };
            Row::new(vec![
                Cell::from(v.id.to_string()),
                Cell::from(v.label.clone()),
                Cell::from(format_duration(v.duration)),
                Cell::from(format_ms(v.opened_at)),
                closed,
                Cell::from(v.condition_name.clone()),
                Cell::from(v.priority.label()).style(app.theme.priority_style(v.priority)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Fill(2),
        Constraint::Length(9),
        Constraint::Length(19),
        Constraint::Length(19),
        Constraint::Fill(1),
        Constraint::Length(9),
    ];

    let priorities = toggles(
        &Priority::ALL,
        |p| pager.priorities().contains(&p),
        |p| p.label(),
    );
    let more = if pager.is_exhausted() { "" } else { "+" };
    let title = format!(
        " Violations page {}/{}{} ({} buffered) {} ",
        pager.page() + 1,
        pager.buffered_pages().max(1),
        more,
        pager.filtered().len(),
        priorities
    );

    let selected = app.selected_row.min(rows.len().saturating_sub(1));
    let table = Table::new(rows, widths)
        .header(header)
        .block(table_block(app, title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(table, area, &mut state);
}
