// Title bar component
//
// Renders the app title with a busy indicator and the export platform.

use crate::tui::app::App;
use crate::tui::theme::Theme;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Window title
pub const APP_TITLE: &str = "知识洞见卡生成器";

/// Render the title bar at the top of the screen
pub fn render(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let indicator = if app.session.is_loading() {
        format!(" {} analyzing", app.spinner_char())
    } else if app.session.is_exporting() {
        format!(" {} exporting", app.spinner_char())
    } else {
        String::new()
    };

    let title = Paragraph::new(format!(" ✦ {}{}", APP_TITLE, indicator))
        .style(Style::default().fg(theme.title).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(theme.title))
                .title_top(Line::from(format!(" {} ", app.platform)).right_aligned()),
        );

    f.render_widget(title, area);
}
