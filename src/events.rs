use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use slawatch_types::{EventKind, Priority};

use crate::app::{App, View};
use crate::ui::common::TAB_TITLES;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // A blocking notice swallows the key that dismisses it
    if app.alert.is_some() {
        app.dismiss_alert();
        return;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.key_input.is_some() {
        handle_key_input(app, key);
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Char('1') => app.set_view(View::Apdex),
        KeyCode::Char('2') => app.set_view(View::Events),
        KeyCode::Char('3') => app.set_view(View::Violations),
        KeyCode::Char('4') => app.set_view(View::Setup),

        // Navigation (up/down for rows, left/right for tabs)
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Violation pages, or jump 10 rows elsewhere
        KeyCode::PageUp => match app.current_view {
            View::Violations => app.prev_violation_page(),
            _ => app.select_prev_n(10),
        },
        KeyCode::PageDown => match app.current_view {
            View::Violations => app.next_violation_page(),
            _ => app.select_next_n(10),
        },

        KeyCode::Esc => app.set_view(View::Apdex),

        // Query form
        KeyCode::Char('[') => app.coarser_resolution(),
        KeyCode::Char(']') => app.finer_resolution(),
        KeyCode::Char('t') => app.cycle_span(),

        // Alert filters
        KeyCode::Char('p') => app.toggle_priority(Priority::Critical),
        KeyCode::Char('P') => app.toggle_priority(Priority::Warning),
        KeyCode::Char('i') => app.toggle_event_kind(EventKind::Incidents),
        KeyCode::Char('v') => app.toggle_event_kind(EventKind::Violations),
        KeyCode::Char('n') => app.toggle_event_kind(EventKind::Notifications),

        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('e') => app.export_current(),
        KeyCode::Char('?') => app.toggle_help(),

        // Setup
        KeyCode::Char('a') if app.current_view == View::Setup => app.start_key_input(),
        KeyCode::Enter if app.current_view == View::Setup => app.select_application(),
        KeyCode::Char('c') if app.current_view == View::Setup => app.clear_application(),
        KeyCode::Char('C') if app.current_view == View::Setup => app.clear_api_key(),

        _ => {}
    }
}

/// Handle key input while the API key is being typed
fn handle_key_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_key_input(),
        KeyCode::Esc => app.cancel_key_input(),
        KeyCode::Backspace => app.key_pop(),
        KeyCode::Char(c) => app.key_push(c),
        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        // Tab clicks (row 1, after header)
        MouseEventKind::Down(MouseButton::Left) if mouse.row == 1 => {
            let mut start = 0u16;
            for (title, view) in TAB_TITLES.iter().zip(View::ALL) {
                // Each tab is followed by a one-column divider
                let end = start + title.chars().count() as u16 + 1;
                if mouse.column < end {
                    app.set_view(view);
                    break;
                }
                start = end;
            }
        }

        _ => {}
    }
}
