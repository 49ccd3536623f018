//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, the help and
//! alert overlays, and the placeholder shown while a view has no data.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, LoadState, View};
use crate::data::Bucket;

/// Tab labels, in [`View::ALL`] order.
pub const TAB_TITLES: [&str; 4] = [" 1:Apdex ", " 2:Events ", " 3:Violations ", " 4:Setup "];

/// Render the header bar with the selected application and its score.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let app_title = if app.session.has_app() {
        Span::styled(
            app.session.app_title().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled("no application", Style::default().add_modifier(Modifier::DIM))
    };

    let score = match app.summary_score() {
        Some(score) => {
            let bucket = Bucket::evaluate(score, true);
            Span::styled(format!("{:.2}", score), app.theme.bucket_style(bucket))
        }
        None => Span::styled("-", Style::default().add_modifier(Modifier::DIM)),
    };

    let mut spans = vec![
        Span::styled(" SLAWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        app_title,
        Span::raw(" │ Apdex "),
        score,
        Span::raw(" │ "),
        Span::raw(app.range_label()),
    ];
    if !app.session.has_api_key() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            "not logged in",
            Style::default().fg(app.theme.warning),
        ));
    }
    if app.session.any_loading() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            "loading…",
            Style::default().fg(app.theme.highlight),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = TAB_TITLES.iter().map(|t| Line::from(*t)).collect();
    let selected = View::ALL
        .iter()
        .position(|v| *v == app.current_view)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .padding("", "")
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the upstream, available controls, and temporary status messages.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = if app.key_input.is_some() {
        "Type API key | Enter:save Esc:cancel"
    } else {
        match app.current_view {
            View::Apdex => "[/]:resolution t:span r:refresh e:export ?:help q:quit",
            View::Events => "i/v/n:types p/P:priority r:refresh ?:help q:quit",
            View::Violations => "PgUp/PgDn:page p/P:priority e:export r:refresh ?:help q:quit",
            View::Setup => "a:API key Enter:select c:clear app C:clear key ?:help q:quit",
        }
    };

    let status = format!(" {} | {}", app.source_description(), controls);
    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Message for a view whose data is not loaded, or `None` once it is.
pub fn placeholder<T>(app: &App, state: &LoadState<T>) -> Option<(String, Style)> {
    let dim = Style::default().add_modifier(Modifier::DIM);
    match state {
        LoadState::Loaded(_) => None,
        LoadState::Idle => Some(("Press r to load".to_string(), dim)),
        LoadState::Loading => Some((
            "Loading…".to_string(),
            Style::default().fg(app.theme.highlight),
        )),
        LoadState::Empty => Some(("No data".to_string(), dim)),
        LoadState::Unauthenticated(_) => {
            let msg = if app.session.has_api_key() {
                "No application selected. Pick one on the Setup view (4)."
            } else {
                "Not logged in. Enter an API key on the Setup view (4)."
            };
            Some((msg.to_string(), Style::default().fg(app.theme.warning)))
        }
        LoadState::Failed(err) => Some((
            format!("Error: {} | r:retry", err),
            Style::default().fg(app.theme.critical),
        )),
    }
}

/// Render a bordered block with a centered message.
pub fn render_message(frame: &mut Frame, app: &App, area: Rect, title: &str, msg: (String, Style)) {
    let (text, style) = msg;
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    let paragraph = Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(paragraph, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  1-4 Tab     Switch views"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  PgUp/PgDn   Violation pages"),
        Line::from(""),
        section(" Apdex"),
        Line::from("  [ / ]       Coarser / finer resolution"),
        Line::from("  t           Cycle time span"),
        Line::from(""),
        section(" Alerts"),
        Line::from("  p / P       Toggle Critical / Warning"),
        Line::from("  i / v / n   Toggle incidents / violations"),
        Line::from("              / notifications"),
        Line::from(""),
        section(" Setup"),
        Line::from("  a           Enter API key"),
        Line::from("  Enter       Select application"),
        Line::from("  c / C       Clear application / key"),
        Line::from(""),
        section(" General"),
        Line::from("  r           Refresh view"),
        Line::from("  e           Export view"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);
    let help_area = centered(area, 46, 32);

    // Clear the area behind the help
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// Render a blocking notice; any key dismisses it.
pub fn render_alert(frame: &mut Frame, app: &App, area: Rect, message: &str) {
    let block = Block::default()
        .title(" Request abandoned ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.critical));

    let text = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to continue",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];
    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(block);
    let alert_area = centered(area, 60, 8);

    frame.render_widget(Clear, alert_area);
    frame.render_widget(paragraph, alert_area);
}
