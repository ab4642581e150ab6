// UI rendering logic
//
// Called on every frame. The screen is a title bar, the generator (article
// input beside or above the card preview), a log strip and a status bar,
// with the toast drawn over everything.

use super::app::App;
use super::components::{logs_panel, preview, status_bar, title_bar};
use super::layout::Breakpoint;
use super::theme::Theme;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Shown in the empty article pane
pub const INPUT_PLACEHOLDER: &str =
    "在此粘贴文章内容，我们将为您智能提取核心洞见并生成高美感卡片...";

/// Shown while extraction runs
pub const LOADING_MESSAGE: &str = "正在分析洞见...";

/// Footnote under the article pane
pub const MODEL_NOTE: &str = "基于 Gemini 3.0 深度分析，自动匹配配色与逻辑结构。";

/// Main UI render function - called on every frame
pub fn draw(f: &mut Frame, app: &App) {
    let theme = Theme::default();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Generator
            Constraint::Length(6), // System logs
            Constraint::Length(3), // Status bar
        ])
        .split(f.area());

    title_bar::render(f, chunks[0], app, &theme);
    render_generator(f, chunks[1], app, &theme);
    logs_panel::render(f, chunks[2], &app.log_buffer, &theme);
    status_bar::render(f, chunks[3], app, &theme);

    if let Some(toast) = &app.toast {
        toast.render(f, f.area(), &theme);
    }
}

fn render_generator(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let bp = Breakpoint::from_width(area.width);
    let direction = match bp {
        Breakpoint::Stacked => Direction::Vertical,
        Breakpoint::SideBySide => Direction::Horizontal,
    };
    let share = bp.input_share();
    let panes = Layout::default()
        .direction(direction)
        .constraints([
            Constraint::Percentage(share),
            Constraint::Percentage(100 - share),
        ])
        .split(area);

    // Error banner sits under the article it refers to
    match app.session.error_message() {
        Some(message) => {
            let column = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(3)])
                .split(panes[0]);
            render_input(f, column[0], app, theme);
            render_error(f, column[1], &message, theme);
        }
        None => render_input(f, panes[0], app, theme),
    }

    if app.session.is_loading() {
        render_loading(f, panes[1], app, theme);
    } else {
        let card = app.session.card().map(|card| card.as_ref());
        preview::render(f, panes[1], card, app.preview_scroll, theme);
    }
}

fn render_input(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border_focused))
        .title(format!(" 文章内容 ({} 字) ", app.input.chars().count()))
        .title_bottom(Line::from(Span::styled(
            format!(" {} ", MODEL_NOTE),
            Style::default().fg(theme.muted),
        )));

    if app.input.is_empty() {
        let placeholder = Paragraph::new(Span::styled(
            INPUT_PLACEHOLDER,
            Style::default().fg(theme.muted),
        ))
        .wrap(Wrap { trim: false })
        .block(block);
        f.render_widget(placeholder, area);
        return;
    }

    // Keep the end of the text (where typing happens) in view
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    let text = format!("{}▏", app.input);
    let scroll = wrapped_height(&text, inner_width).saturating_sub(inner_height);

    let input = Paragraph::new(text)
        .style(Style::default().fg(theme.fg))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(block);
    f.render_widget(input, area);
}

fn render_error(f: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let banner = Paragraph::new(format!(" ⚠ {}", message))
        .style(Style::default().fg(theme.error))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(theme.error)),
        );
    f.render_widget(banner, area);
}

fn render_loading(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let lines = vec![
        Line::default(),
        Line::from(Span::styled(
            format!("{} {}", app.spinner_char(), LOADING_MESSAGE),
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        )),
    ];
    let loading = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border))
            .title(" 洞见卡预览 "),
    );
    f.render_widget(loading, area);
}

/// Rows `text` occupies when wrapped at `width` cells (approximate; ignores word breaks)
fn wrapped_height(text: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    let rows: usize = text
        .split('\n')
        .map(|line| line.width().div_ceil(width).max(1))
        .sum();
    rows.min(u16::MAX as usize) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_height_counts_cjk_cells() {
        assert_eq!(wrapped_height("", 10), 1);
        assert_eq!(wrapped_height("abc\n\nde", 10), 3);
        // 6 CJK chars are 12 cells
        assert_eq!(wrapped_height("深度工作力量", 10), 2);
    }
}
