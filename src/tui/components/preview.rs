//! Card preview component
//!
//! A text rendition of the card in the card's own colors. It follows the same
//! section order as the image: header, core insight, stages, before/after,
//! quote. The exported image is the real artifact; this is what the user
//! checks before exporting.

use crate::card::InsightCardData;
use crate::render::glyph_for;
use crate::tui::theme::{card_color, Theme};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Shown in the preview pane before any card exists
pub const EMPTY_PREVIEW: &str = "等待灵感注入...";

/// Preview lines for a card
pub fn card_lines(card: &InsightCardData) -> Vec<Line<'static>> {
    let colors = card.colors();
    let primary = card_color(&colors.primary);
    let secondary = card_color(&colors.secondary);
    let accent = card_color(&colors.accent);

    let mut lines = vec![
        Line::from(Span::styled(
            card.title().to_string(),
            Style::default().fg(primary).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            card.subtitle().to_string(),
            Style::default().fg(secondary).add_modifier(Modifier::ITALIC),
        )),
        Line::default(),
        Line::from(Span::styled(
            "✦ CORE INSIGHT 核心洞见",
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(card.core_insight().to_string()),
        Line::default(),
    ];

    for (i, stage) in card.stages().iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {} ", glyph_for(&stage.icon, i + 1)),
                Style::default().fg(accent),
            ),
            Span::styled(
                stage.label.clone(),
                Style::default().fg(primary).add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(format!("   {}", stage.description)));
    }
    lines.push(Line::default());

    let transformation = card.transformation();
    lines.push(Line::from(vec![
        Span::styled("BEFORE / 过去  ", Style::default().fg(secondary)),
        Span::raw(transformation.before.clone()),
    ]));
    lines.push(Line::from(vec![
        Span::styled(
            "AFTER / 跃迁   ",
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ),
        Span::raw(transformation.after.clone()),
    ]));
    lines.push(Line::default());

    lines.push(Line::from(Span::styled(
        format!("“ {} ”", card.wisdom_quote()),
        Style::default().fg(primary).add_modifier(Modifier::ITALIC),
    )));

    lines
}

/// Render the preview pane
pub fn render(
    f: &mut Frame,
    area: Rect,
    card: Option<&InsightCardData>,
    scroll: u16,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border))
        .title(" 洞见卡预览 ");

    let paragraph = match card {
        Some(card) => Paragraph::new(card_lines(card))
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        None => Paragraph::new(vec![
            Line::default(),
            Line::from(Span::styled(
                EMPTY_PREVIEW,
                Style::default().fg(theme.muted),
            )),
        ])
        .alignment(Alignment::Center),
    };

    f.render_widget(paragraph.block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::fixtures::card;

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_preview_follows_card_order() {
        let text = plain(&card_lines(&card(3)));

        let pos = |needle: &str| {
            text.iter()
                .position(|l| l.contains(needle))
                .unwrap_or_else(|| panic!("{} missing", needle))
        };
        assert_eq!(pos("深度工作的力量"), 0);
        assert!(pos("CORE INSIGHT") < pos("阶段1"));
        assert!(pos("阶段1") < pos("阶段2"));
        assert!(pos("阶段3") < pos("BEFORE"));
        assert!(pos("BEFORE") < pos("AFTER"));
        assert!(pos("AFTER") < pos("“"));
    }

    #[test]
    fn test_preview_uses_card_palette() {
        let lines = card_lines(&card(3));
        let title_style = lines[0].spans[0].style;
        assert_eq!(title_style.fg, Some(ratatui::style::Color::Rgb(0x1E, 0x3A, 0x5F)));
    }
}
