//! Setup view: API key entry and application selection.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::common::{placeholder, render_message};

/// Show only the last four characters of a key.
pub fn mask_key(key: &str) -> String {
    let count = key.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = key.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}

/// Render the Setup view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let [session_area, apps_area] =
        Layout::vertical([Constraint::Length(5), Constraint::Min(3)]).areas(area);

    render_session(frame, app, session_area);

    if let Some(msg) = placeholder(app, &app.applications) {
        render_message(frame, app, apps_area, "Applications", msg);
        return;
    }
    render_applications(frame, app, apps_area);
}

fn render_session(frame: &mut Frame, app: &App, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let key_line = match (&app.key_input, app.session.api_key()) {
        (Some(input), _) => Line::from(vec![
            Span::styled(" API key:     ", bold),
            Span::styled(
                format!("{}_", mask_key(input)),
                Style::default().fg(app.theme.highlight),
            ),
        ]),
        (None, Some(key)) => Line::from(vec![
            Span::styled(" API key:     ", bold),
            Span::raw(mask_key(key)),
        ]),
        (None, None) => Line::from(vec![
            Span::styled(" API key:     ", bold),
            Span::styled("not set (a to enter)", Style::default().fg(app.theme.warning)),
        ]),
    };

    let app_line = match app.session.app_id() {
        Some(id) => Line::from(vec![
            Span::styled(" Application: ", bold),
            Span::raw(format!("{} ", app.session.app_title())),
            Span::styled(format!("({})", id), dim),
        ]),
        None => Line::from(vec![
            Span::styled(" Application: ", bold),
            Span::styled("none selected", dim),
        ]),
    };

    let block = Block::default()
        .title(" Session ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(vec![key_line, app_line]).block(block), area);
}

fn render_applications(frame: &mut Frame, app: &App, area: Rect) {
    let Some(applications) = app.applications.loaded() else {
        return;
    };
    let current = app.session.app_id();

    let header = Row::new(vec!["ID", "Name"]).height(1).style(app.theme.header);
    let rows: Vec<Row> = applications
        .iter()
        .map(|a| {
            let id = a.id.to_string();
            let style = if current == Some(id.as_str()) {
                Style::default().fg(app.theme.healthy)
            } else {
                Style::default()
            };
            Row::new(vec![id, a.name.clone()]).style(style)
        })
        .collect();

    let title = format!(" Applications ({}) [Enter:select] ", applications.len());
    let table = Table::new(rows, [Constraint::Length(12), Constraint::Fill(1)])
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(app.selected_row.min(applications.len().saturating_sub(1))));
    frame.render_stateful_widget(table, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("abcdefgh"), "****efgh");
        assert_eq!(mask_key("abc"), "***");
        assert_eq!(mask_key(""), "");
    }
}
