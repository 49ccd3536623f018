//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use slawatch_types::{EventType, Priority};

use crate::data::Bucket;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for warnings.
    pub warning: Color,
    /// Color for critical alerts and errors.
    pub critical: Color,
    /// Color for healthy values.
    pub healthy: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// One color per Apdex bucket, in bucket order.
    pub buckets: [Color; 6],
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            buckets: [
                Color::LightBlue,
                Color::Green,
                Color::Yellow,
                Color::Red,
                Color::Magenta,
                Color::DarkGray,
            ],
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::DarkGray,
            buckets: [
                Color::Blue,
                Color::Green,
                Color::Yellow,
                Color::Red,
                Color::Magenta,
                Color::Gray,
            ],
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn bucket_color(&self, bucket: Bucket) -> Color {
        self.buckets[bucket.index() as usize]
    }

    pub fn bucket_style(&self, bucket: Bucket) -> Style {
        let style = Style::default().fg(self.bucket_color(bucket));
        match bucket {
            Bucket::Down => style.add_modifier(Modifier::BOLD),
            _ => style,
        }
    }

    pub fn priority_style(&self, priority: Priority) -> Style {
        match priority {
            Priority::Warning => Style::default().fg(self.warning),
            Priority::Critical => Style::default().fg(self.critical).add_modifier(Modifier::BOLD),
        }
    }

    /// Style for an event type; attention-needing types stand out.
    pub fn event_style(&self, event_type: EventType) -> Style {
        if event_type.is_attention() {
            Style::default().fg(self.critical)
        } else {
            Style::default().fg(self.healthy)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_bucket_has_a_color() {
        let theme = Theme::dark();
        for bucket in Bucket::ALL {
            let _ = theme.bucket_color(bucket);
        }
        assert_eq!(theme.bucket_color(Bucket::Blue), Color::LightBlue);
        assert_eq!(Theme::light().bucket_color(Bucket::NotApplicable), Color::Gray);
    }
}
