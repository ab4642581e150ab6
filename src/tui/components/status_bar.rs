// Status bar component
//
// Key hints at the bottom. The export hint is named for the platform path
// it will take.

use crate::tui::app::App;
use crate::tui::theme::Theme;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Primary action label
pub const GENERATE_LABEL: &str = "立即生成洞见卡";

/// Hint line for the current state
pub fn hints(app: &App) -> String {
    let mut parts = vec![format!("^G {}", GENERATE_LABEL)];
    if app.session.can_export() {
        parts.push(format!("^E {}", app.export_label()));
    }
    parts.push("^L 清空".to_string());
    parts.push("PgUp/PgDn 滚动".to_string());
    parts.push("Esc 退出".to_string());
    format!(" {}", parts.join(" │ "))
}

/// Render the status bar
pub fn render(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let status = Paragraph::new(hints(app))
        .style(Style::default().fg(theme.fg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(theme.border)),
        );

    f.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{FixedProbe, PlatformClass};
    use crate::extract::ExtractionError;
    use crate::card::fixtures::card;
    use crate::extract::fake::ScriptedExtractor;
    use crate::logging::LogBuffer;
    use crate::tui::app::{Command, JobResult};
    use std::sync::Arc;

    #[test]
    fn test_export_hint_hidden_without_card() {
        let app = App::new(
            Err(ExtractionError::MissingApiKey),
            Box::new(FixedProbe(PlatformClass::Desktop)),
            LogBuffer::new(),
        );
        let line = hints(&app);
        assert!(line.contains("立即生成洞见卡"));
        assert!(!line.contains("复制到剪贴板"));
    }

    #[test]
    fn test_export_hint_kept_beside_validation_error() {
        let extractor = ScriptedExtractor::returning(Ok(card(3)));
        let mut app = App::new(
            Ok(Arc::new(extractor)),
            Box::new(FixedProbe(PlatformClass::Desktop)),
            LogBuffer::new(),
        );
        app.input = "article".to_string();
        let Some(Command::Extract { extractor, ticket }) = app.request_generate() else {
            panic!("expected extract command");
        };
        let result = extractor.extract(ticket.input());
        app.apply(JobResult::Extracted { ticket, result });

        app.input.clear();
        assert!(app.request_generate().is_none());
        assert!(app.session.error_message().is_some());
        assert!(hints(&app).contains("^E 复制到剪贴板"));
    }
}
