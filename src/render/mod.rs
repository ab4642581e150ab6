//! Card renderer: validated card in, fixed layout out
//!
//! [`render`] is pure: the same card and context always produce the same
//! [`CardLayout`]. The layout is a flat list of drawing primitives in paint
//! order on a 750-unit canvas; [`CardLayout::to_svg`] serializes it through
//! an askama template for rasterization.
//!
//! Sections, top to bottom: header, core-insight panel, one row per stage,
//! before/after panel, wisdom quote, footer. When everything fits inside the
//! minimum height, the quote and footer are pushed to the bottom.

mod icons;
mod layout;

pub use icons::glyph_for;
pub use layout::{Anchor, Element, TextRun};

use crate::card::{HexColor, InsightCardData};
use askama::Template;
use chrono::{Datelike, Local, NaiveDate};
use layout::*;

/// Inputs to rendering that don't come from the card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    /// Date printed in the footer
    pub date: NaiveDate,
}

impl RenderContext {
    /// Context stamped with today's local date
    pub fn today() -> Self {
        Self {
            date: Local::now().date_naive(),
        }
    }

    /// Footer date in zh-CN short form (`2026/1/5`)
    pub fn footer_date(&self) -> String {
        format!("{}/{}/{}", self.date.year(), self.date.month(), self.date.day())
    }
}

/// A fully positioned card
#[derive(Debug, Clone, PartialEq)]
pub struct CardLayout {
    width: f32,
    height: f32,
    background: HexColor,
    elements: Vec<Element>,
}

impl CardLayout {
    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Text runs in paint order
    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text(t) => Some(t),
            _ => None,
        })
    }

    /// Serialize as a standalone SVG document; all card text is escaped
    pub fn to_svg(&self) -> Result<String, askama::Error> {
        CardSvg {
            layout: self,
            radius: CORNER_RADIUS,
        }
        .render()
    }
}

#[derive(Template)]
#[template(path = "card.svg", escape = "html")]
struct CardSvg<'a> {
    layout: &'a CardLayout,
    radius: f32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Layout
// ─────────────────────────────────────────────────────────────────────────────

// Vertical rhythm (Tailwind spacing, 1 step = 4 units)
const HEADER_GAP: f32 = 8.0;
const SECTION_GAP: f32 = 40.0;
const BLOCK_GAP: f32 = 48.0;
const PANEL_PADDING: f32 = 32.0;
const STAGE_GAP: f32 = 24.0;
const BADGE_SIZE: f32 = 56.0;

/// Lay out a card
pub fn render(card: &InsightCardData, ctx: &RenderContext) -> CardLayout {
    let colors = card.colors();
    let primary = colors.primary.as_str();
    let secondary = colors.secondary.as_str();
    let accent = colors.accent.as_str();

    let mut body = Canvas::new();

    // Decorative circle: 256 across, hanging 80 past the top-right corner
    body.circle(CARD_WIDTH + 80.0 - 128.0, -80.0 + 128.0, 128.0, accent, 0.1);

    let mut y = PADDING;

    // ── Header ──────────────────────────────────────────────────────────────
    let title_style = TextStyle::new(TITLE_SIZE, primary)
        .serif()
        .weight(700)
        .leading(1.25);
    let title_x = CONTENT_X + 6.0 + 16.0;
    let title = wrap(card.title(), TITLE_SIZE, CONTENT_X + CONTENT_WIDTH - title_x);
    let title_height = title_style.block_height(title.len());
    let row_height = title_height.max(40.0);

    body.rect(CONTENT_X, y + (row_height - 40.0) / 2.0, 6.0, 40.0, 3.0, primary, 1.0);
    body.text_block(&title, title_x, y + (row_height - title_height) / 2.0, &title_style);
    y += row_height + HEADER_GAP;

    let subtitle_style = TextStyle::new(SECTION_SIZE, secondary)
        .weight(500)
        .opacity(0.8);
    let subtitle_x = CONTENT_X + 24.0;
    let subtitle = wrap(card.subtitle(), SECTION_SIZE, CONTENT_X + CONTENT_WIDTH - subtitle_x);
    y += body.text_block(&subtitle, subtitle_x, y, &subtitle_style);
    y += SECTION_GAP;

    // ── Core insight ────────────────────────────────────────────────────────
    let label_style = TextStyle::new(NOTE_SIZE, accent).weight(700);
    let insight_style = TextStyle::new(BODY_SIZE, SLATE_800).weight(500).leading(1.8);
    let inner_x = CONTENT_X + 6.0 + PANEL_PADDING;
    let insight = wrap(
        card.core_insight(),
        BODY_SIZE,
        CONTENT_WIDTH - 6.0 - 2.0 * PANEL_PADDING,
    );
    let panel_height = PANEL_PADDING
        + label_style.line_height()
        + 12.0
        + insight_style.block_height(insight.len())
        + PANEL_PADDING;

    body.rect(CONTENT_X, y, CONTENT_WIDTH, panel_height, 16.0, WHITE, 0.6);
    body.rect(CONTENT_X, y, 6.0, panel_height, 3.0, accent, 1.0);
    let label = format!("{} CORE INSIGHT 核心洞见", icons::glyph_for("fa-lightbulb", 0));
    let mut inner_y = y + PANEL_PADDING;
    inner_y += body.text_block(&[label], inner_x, inner_y, &label_style) + 12.0;
    body.text_block(&insight, inner_x, inner_y, &insight_style);
    y += panel_height + BLOCK_GAP;

    // ── Stages ──────────────────────────────────────────────────────────────
    let badge_style = TextStyle::new(24.0, primary)
        .anchor(Anchor::Middle)
        .leading(BADGE_SIZE / 24.0);
    let stage_label_style = TextStyle::new(STAGE_LABEL_SIZE, primary).serif().weight(700);
    let stage_desc_style = TextStyle::new(BODY_SIZE, SLATE_600).leading(1.6);
    let stage_x = CONTENT_X + BADGE_SIZE + STAGE_GAP;
    let stage_width = CONTENT_X + CONTENT_WIDTH - stage_x;

    for (i, stage) in card.stages().iter().enumerate() {
        if i > 0 {
            y += STAGE_GAP;
        }

        body.rect(CONTENT_X, y, BADGE_SIZE, BADGE_SIZE, 16.0, primary, 32.0 / 255.0);
        let glyph = icons::glyph_for(&stage.icon, i + 1);
        body.text_block(&[glyph], CONTENT_X + BADGE_SIZE / 2.0, y, &badge_style);

        let label = wrap(&stage.label, STAGE_LABEL_SIZE, stage_width);
        let description = wrap(&stage.description, BODY_SIZE, stage_width);
        let mut text_y = y + 4.0;
        text_y += body.text_block(&label, stage_x, text_y, &stage_label_style) + 8.0;
        text_y += body.text_block(&description, stage_x, text_y, &stage_desc_style);

        y = text_y.max(y + BADGE_SIZE);
    }
    y += BLOCK_GAP;

    // ── Transformation ──────────────────────────────────────────────────────
    let column_width = CONTENT_WIDTH / 2.0;
    let divider_x = CONTENT_X + column_width;
    let left_x = CONTENT_X;
    let right_x = divider_x + 24.0;
    let text_width = column_width - 24.0;

    let before_label = TextStyle::new(NOTE_SIZE, SLATE_400).weight(700);
    let after_label = TextStyle::new(NOTE_SIZE, accent).weight(700);
    let before_style = TextStyle::new(BODY_SIZE, SLATE_500).italic().leading(1.6);
    let after_style = TextStyle::new(BODY_SIZE, primary).weight(700).leading(1.6);

    let transformation = card.transformation();
    let before = wrap(&transformation.before, BODY_SIZE, text_width);
    let after = wrap(&transformation.after, BODY_SIZE, text_width);

    body.rule(CONTENT_X, y, CONTENT_X + CONTENT_WIDTH, y, SLATE_200);
    let column_y = y + PANEL_PADDING;
    let heading_height = before_label.line_height() + 8.0;
    body.text_block(&["BEFORE / 过去".to_string()], left_x, column_y, &before_label);
    body.text_block(&["AFTER / 跃迁".to_string()], right_x, column_y, &after_label);
    let before_height = body.text_block(&before, left_x, column_y + heading_height, &before_style);
    let after_height = body.text_block(&after, right_x, column_y + heading_height, &after_style);

    let column_height = heading_height + before_height.max(after_height);
    body.rule(divider_x, column_y, divider_x, column_y + column_height, SLATE_200);
    y = column_y + column_height + PANEL_PADDING;
    body.rule(CONTENT_X, y, CONTENT_X + CONTENT_WIDTH, y, SLATE_200);
    y += BLOCK_GAP;

    // ── Tail: quote + footer, laid out from 0 then placed ───────────────────
    let mut tail = Canvas::new();

    let quote_style = TextStyle::new(BODY_SIZE, primary)
        .serif()
        .weight(600)
        .italic()
        .anchor(Anchor::Middle)
        .leading(1.8);
    let quote = wrap(
        &format!("“{}”", card.wisdom_quote()),
        BODY_SIZE,
        CONTENT_WIDTH - 80.0,
    );
    let box_height = 24.0 + quote_style.block_height(quote.len()) + 24.0;

    let glyph_style = TextStyle::new(60.0, accent).serif().weight(700).opacity(0.1).leading(1.0);
    tail.text_block(&["“".to_string()], CONTENT_X - 16.0, -16.0, &glyph_style);
    tail.rect(CONTENT_X, 0.0, CONTENT_WIDTH, box_height, 12.0, WHITE, 0.4);
    tail.text_block(&quote, CARD_WIDTH / 2.0, 24.0, &quote_style);

    let footer_y = box_height + BLOCK_GAP;
    let footer_style = TextStyle::new(NOTE_SIZE, SLATE_400);
    tail.rule(CONTENT_X, footer_y, CONTENT_X + CONTENT_WIDTH, footer_y, SLATE_200);
    let brand = format!("{} Knowledge Insight Card", icons::glyph_for("fa-brain", 0));
    let footer_height = tail.text_block(&[brand], CONTENT_X, footer_y + 24.0, &footer_style);
    tail.text_block(
        &[ctx.footer_date()],
        CONTENT_X + CONTENT_WIDTH,
        footer_y + 24.0,
        &footer_style.clone().anchor(Anchor::End),
    );
    let tail_height = footer_y + 24.0 + footer_height;

    let tail_top = place_tail(y, tail_height);
    tail.shift_y(tail_top);
    body.append(tail);

    CardLayout {
        width: CARD_WIDTH,
        height: (tail_top + tail_height + PADDING).max(MIN_HEIGHT),
        background: colors.background.clone(),
        elements: body.into_elements(),
    }
}

/// Top of the quote+footer tail
///
/// The tail follows the body directly unless the card would end above the
/// minimum height, in which case it absorbs the free space (the footer ends
/// at the bottom padding).
fn place_tail(body_end: f32, tail_height: f32) -> f32 {
    body_end.max(MIN_HEIGHT - PADDING - tail_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::fixtures::{card, card_json};
    use pretty_assertions::assert_eq;

    fn ctx() -> RenderContext {
        RenderContext {
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        }
    }

    fn find<'a>(layout: &'a CardLayout, content: &str) -> &'a TextRun {
        layout
            .texts()
            .find(|t| t.content == content)
            .unwrap_or_else(|| panic!("no text run {:?}", content))
    }

    #[test]
    fn test_render_is_deterministic() {
        let card = card(4);
        assert_eq!(render(&card, &ctx()), render(&card, &ctx()));
        assert_eq!(
            render(&card, &ctx()).to_svg().unwrap(),
            render(&card, &ctx()).to_svg().unwrap()
        );
    }

    #[test]
    fn test_one_row_per_stage_in_order() {
        for n in 3..=5 {
            let layout = render(&card(n), &ctx());
            let labels: Vec<&TextRun> = layout
                .texts()
                .filter(|t| t.content.starts_with("阶段"))
                .collect();
            assert_eq!(labels.len(), n);
            for (i, run) in labels.iter().enumerate() {
                assert_eq!(run.content, format!("阶段{}", i + 1));
            }
            assert!(labels.windows(2).all(|w| w[0].y < w[1].y));
        }
    }

    #[test]
    fn test_before_left_of_after() {
        let layout = render(&card(3), &ctx());
        let before = find(&layout, "BEFORE / 过去");
        let after = find(&layout, "AFTER / 跃迁");
        assert!(before.x < after.x);
        assert_eq!(before.y, after.y);
    }

    #[test]
    fn test_short_content_pushes_tail_down() {
        // 300 units of body + 200 of tail leaves 470 free
        assert_eq!(place_tail(300.0, 200.0), MIN_HEIGHT - PADDING - 200.0);
        // Once the body is long enough the tail just follows it
        assert_eq!(place_tail(900.0, 200.0), 900.0);
    }

    #[test]
    fn test_height_never_below_minimum_and_footer_at_bottom() {
        let layout = render(&card(3), &ctx());
        assert!(layout.height() >= MIN_HEIGHT);

        let date = find(&layout, "2026/1/5");
        assert_eq!(date.anchor, Anchor::End);
        // Footer line box ends at the bottom padding
        let bottom = date.y - (27.0 - NOTE_SIZE) / 2.0 - NOTE_SIZE * 0.85 + 27.0;
        assert!(
            (bottom - (layout.height() - PADDING)).abs() < 0.05,
            "bottom={}",
            bottom
        );
    }

    #[test]
    fn test_long_content_grows_card() {
        let mut value = card_json(5);
        value["coreInsight"] = "专注是一种可以训练的能力。".repeat(40).into();
        let long = InsightCardData::from_json(&value.to_string()).unwrap();

        let layout = render(&long, &ctx());
        assert!(layout.height() > MIN_HEIGHT);

        let short = render(&card(5), &ctx());
        let quote_y = |l: &CardLayout| {
            l.texts()
                .find(|t| t.content.starts_with('“') && t.content.len() > 3)
                .map(|t| t.y)
                .unwrap()
        };
        assert!(quote_y(&layout) > quote_y(&short));
    }

    #[test]
    fn test_palette_applied() {
        let layout = render(&card(3), &ctx());
        assert_eq!(find(&layout, "阶段1").fill, "#1e3a5f");
        assert_eq!(find(&layout, "AFTER / 跃迁").fill, "#ee6c4d");
        let svg = layout.to_svg().unwrap();
        assert!(svg.contains(r##"fill="#f7f9fc""##));
    }

    #[test]
    fn test_svg_escapes_card_text() {
        let mut value = card_json(3);
        value["title"] = r#"A <b>bold</b> & "quoted" idea"#.into();
        let card = InsightCardData::from_json(&value.to_string()).unwrap();

        let svg = render(&card, &ctx()).to_svg().unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(!svg.contains("<b>"));
        assert!(svg.contains("&lt;b&gt;"));
        assert!(svg.contains("&amp;"));
    }

    #[test]
    fn test_svg_dimensions_match_layout() {
        let layout = render(&card(3), &ctx());
        let svg = layout.to_svg().unwrap();
        assert!(svg.contains(r#"width="750""#));
        assert!(svg.contains(&format!(r#"height="{}""#, layout.height())));
    }

    #[test]
    fn test_footer_date_has_no_padding() {
        let ctx = RenderContext {
            date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
        };
        assert_eq!(ctx.footer_date(), "2026/10/18");
        assert_eq!(super::tests::ctx().footer_date(), "2026/1/5");
    }
}
