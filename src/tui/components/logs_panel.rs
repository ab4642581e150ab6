//! Log strip component
//!
//! Shows the newest system log entries, color-coded by level. Always follows
//! the tail; there's nothing to select.

use crate::logging::{LogBuffer, LogEntry};
use crate::tui::theme::Theme;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Shown before anything has been logged
pub const EMPTY_LOGS: &str = "No log entries yet";

/// `HH:MM:SS LEVEL module: message`, where module is the last path segment of the target
pub fn format_log_entry(entry: &LogEntry) -> String {
    let module = entry.target.rsplit("::").next().unwrap_or(&entry.target);
    format!(
        "{} {:5} {}: {}",
        entry.timestamp.format("%H:%M:%S"),
        entry.level.as_str(),
        module,
        entry.message
    )
}

/// Render the newest entries that fit in `area`
pub fn render(f: &mut Frame, area: Rect, buffer: &LogBuffer, theme: &Theme) {
    let rows = area.height.saturating_sub(2) as usize;

    let items: Vec<ListItem> = if buffer.is_empty() {
        vec![ListItem::new(EMPTY_LOGS).style(Style::default().fg(theme.muted))]
    } else {
        buffer
            .recent(rows)
            .iter()
            .map(|entry| {
                ListItem::new(format_log_entry(entry))
                    .style(Style::default().fg(theme.log_color(entry.level)))
            })
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border))
            .title(format!(" System Logs ({}) ", buffer.len())),
    );

    f.render_widget(list, area);
}
