//! Terminal UI rendering using ratatui.
//!
//! Each view is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`apdex`]: Score and response-time trends, bucket shares, time-slice table
//! - [`alerts`]: Recent alert events and paged violations
//! - [`setup`]: API key entry and application selection
//! - [`common`]: Shared components (header, tabs, status bar, overlays)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (apdex/alerts/setup::render)         │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - common::render_alert
//!    - common::render_help
//! ```

pub mod alerts;
pub mod apdex;
pub mod common;
pub mod setup;
pub mod theme;

use ratatui::{
    layout::{Constraint, Layout},
    Frame,
};

use crate::app::{App, View};

pub use theme::Theme;

/// Draw one full frame.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let [header, tabs, content, status] = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Tabs
        Constraint::Min(8),    // Content
        Constraint::Length(1), // Status bar
    ])
    .areas(area);

    common::render_header(frame, app, header);
    common::render_tabs(frame, app, tabs);

    match app.current_view {
        View::Apdex => apdex::render(frame, app, content),
        View::Events => alerts::render_events(frame, app, content),
        View::Violations => alerts::render_violations(frame, app, content),
        View::Setup => setup::render(frame, app, content),
    }

    common::render_status_bar(frame, app, status);

    if app.show_help {
        common::render_help(frame, app, area);
    }
    if let Some(message) = &app.alert {
        common::render_alert(frame, app, area, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::source::Fetcher;
    use crate::testing::FakeApi;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::Arc;
    use tokio::runtime::Handle;

    fn render_to_string(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[tokio::test]
    async fn test_every_view_renders_without_data() {
        let fetcher = Fetcher::new(Arc::new(FakeApi::default()), Handle::current(), "fake");
        let mut app = App::new(fetcher, &Settings::default()).unwrap();
        app.fetch_series();

        for view in View::ALL {
            app.set_view(view);
            let screen = render_to_string(&app);
            assert!(screen.contains("SLAWATCH"));
        }
        app.set_view(View::Apdex);
        assert!(render_to_string(&app).contains("Not logged in"));
    }

    #[tokio::test]
    async fn test_alert_overlay_renders() {
        let fetcher = Fetcher::new(Arc::new(FakeApi::default()), Handle::current(), "fake");
        let mut app = App::new(fetcher, &Settings::default()).unwrap();
        app.alert = Some("too many requests".to_string());
        assert!(render_to_string(&app).contains("too many requests"));
    }
}
