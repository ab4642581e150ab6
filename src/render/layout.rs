// Drawing primitives and the block-layout helpers the card is built from
//
// Units are CSS pixels of the logical 750-wide card. Text is laid out in
// line boxes: a block of N lines at line height L occupies N*L, and each
// baseline sits where a browser would put it for a centered em box.

use std::fmt;

/// Logical card width
pub const CARD_WIDTH: f32 = 750.0;
/// Minimum card height; content shorter than this pushes the tail down
pub const MIN_HEIGHT: f32 = 1000.0;
/// Inner padding on every side
pub const PADDING: f32 = 30.0;
/// Card corner radius
pub const CORNER_RADIUS: f32 = 16.0;

/// Left edge of content
pub const CONTENT_X: f32 = PADDING;
/// Width between the paddings
pub const CONTENT_WIDTH: f32 = CARD_WIDTH - 2.0 * PADDING;

// Type scale
pub const TITLE_SIZE: f32 = 40.0;
pub const SECTION_SIZE: f32 = 32.0;
pub const STAGE_LABEL_SIZE: f32 = 28.0;
pub const BODY_SIZE: f32 = 22.0;
pub const NOTE_SIZE: f32 = 18.0;

// Fixed neutrals (Tailwind slate scale)
pub const SLATE_200: &str = "#e2e8f0";
pub const SLATE_400: &str = "#94a3b8";
pub const SLATE_500: &str = "#64748b";
pub const SLATE_600: &str = "#475569";
pub const SLATE_800: &str = "#1e293b";
pub const WHITE: &str = "#ffffff";

/// Ascent of the em box as a fraction of font size
const ASCENT: f32 = 0.85;

/// Round to 1/100 unit so serialized coordinates stay short
fn px(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

// ─────────────────────────────────────────────────────────────────────────────
// Primitives
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFamily {
    Serif,
    Sans,
}

impl FontFamily {
    /// CSS font-family list, CJK faces first
    pub fn css(&self) -> &'static str {
        match self {
            Self::Serif => "Noto Serif CJK SC, Source Han Serif SC, Songti SC, serif",
            Self::Sans => "Noto Sans CJK SC, Source Han Sans SC, PingFang SC, Microsoft YaHei, sans-serif",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RectShape {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rx: f32,
    pub fill: String,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleShape {
    pub cx: f32,
    pub cy: f32,
    pub r: f32,
    pub fill: String,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineShape {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub stroke: String,
    pub stroke_width: f32,
}

/// One line of text, positioned by its baseline
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub weight: u16,
    pub family: FontFamily,
    pub fill: String,
    pub opacity: f32,
    pub italic: bool,
    pub anchor: Anchor,
    pub content: String,
}

/// A drawable, in paint order
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Rect(RectShape),
    Circle(CircleShape),
    Line(LineShape),
    Text(TextRun),
}

impl Element {
    fn shift_y(&mut self, dy: f32) {
        match self {
            Self::Rect(r) => r.y = px(r.y + dy),
            Self::Circle(c) => c.cy = px(c.cy + dy),
            Self::Line(l) => {
                l.y1 = px(l.y1 + dy);
                l.y2 = px(l.y2 + dy);
            }
            Self::Text(t) => t.y = px(t.y + dy),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Text styling and wrapping
// ─────────────────────────────────────────────────────────────────────────────

/// How a text block is drawn
#[derive(Debug, Clone)]
pub struct TextStyle {
    pub size: f32,
    pub weight: u16,
    pub family: FontFamily,
    pub fill: String,
    pub opacity: f32,
    pub italic: bool,
    pub anchor: Anchor,
    /// Line height as a multiple of `size`
    pub leading: f32,
}

impl TextStyle {
    pub fn new(size: f32, fill: impl Into<String>) -> Self {
        Self {
            size,
            weight: 400,
            family: FontFamily::Sans,
            fill: fill.into(),
            opacity: 1.0,
            italic: false,
            anchor: Anchor::Start,
            leading: 1.5,
        }
    }

    pub fn weight(mut self, weight: u16) -> Self {
        self.weight = weight;
        self
    }

    pub fn serif(mut self) -> Self {
        self.family = FontFamily::Serif;
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn leading(mut self, leading: f32) -> Self {
        self.leading = leading;
        self
    }

    pub fn line_height(&self) -> f32 {
        self.size * self.leading
    }

    /// Height of `lines` lines in this style
    pub fn block_height(&self, lines: usize) -> f32 {
        lines as f32 * self.line_height()
    }
}

/// Wrap `text` to fit `width` units at `size`
///
/// Measured in display columns: a column is half an em, so CJK glyphs take
/// two and Latin glyphs one. Breaks follow Unicode line-break rules, which
/// allows breaks between CJK characters; lines are filled greedily the way a
/// browser does. Never returns an empty vec.
pub fn wrap(text: &str, size: f32, width: f32) -> Vec<String> {
    let columns = ((width / (size * 0.5)).floor() as usize).max(1);
    let options = textwrap::Options::new(columns)
        .word_separator(textwrap::WordSeparator::UnicodeBreakProperties)
        .wrap_algorithm(textwrap::WrapAlgorithm::FirstFit);

    let lines: Vec<String> = textwrap::wrap(text.trim(), options)
        .into_iter()
        .map(|line| line.into_owned())
        .collect();

    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

/// Drop characters XML 1.0 can't carry (C0 controls other than tab/newline,
/// U+FFFE, U+FFFF); valid JSON strings may still contain them
pub fn xml_text(text: &str) -> String {
    text.chars()
        .filter(|&c| {
            matches!(c,
                '\t' | '\n' | '\r'
                | '\u{20}'..='\u{D7FF}'
                | '\u{E000}'..='\u{FFFD}'
                | '\u{10000}'..='\u{10FFFF}')
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Canvas
// ─────────────────────────────────────────────────────────────────────────────

/// Accumulates elements in paint order
#[derive(Debug, Default)]
pub struct Canvas {
    elements: Vec<Element>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, rx: f32, fill: &str, opacity: f32) {
        self.elements.push(Element::Rect(RectShape {
            x: px(x),
            y: px(y),
            width: px(width),
            height: px(height),
            rx,
            fill: fill.to_string(),
            opacity,
        }));
    }

    pub fn circle(&mut self, cx: f32, cy: f32, r: f32, fill: &str, opacity: f32) {
        self.elements.push(Element::Circle(CircleShape {
            cx: px(cx),
            cy: px(cy),
            r: px(r),
            fill: fill.to_string(),
            opacity,
        }));
    }

    /// Horizontal or vertical 1-unit rule
    pub fn rule(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, stroke: &str) {
        self.elements.push(Element::Line(LineShape {
            x1: px(x1),
            y1: px(y1),
            x2: px(x2),
            y2: px(y2),
            stroke: stroke.to_string(),
            stroke_width: 1.0,
        }));
    }

    /// Draw pre-wrapped lines with their first line box at `top`; returns the
    /// block height
    pub fn text_block(&mut self, lines: &[String], x: f32, top: f32, style: &TextStyle) -> f32 {
        let line_height = style.line_height();
        let baseline_offset = (line_height - style.size) / 2.0 + style.size * ASCENT;

        for (i, line) in lines.iter().enumerate() {
            self.elements.push(Element::Text(TextRun {
                x: px(x),
                y: px(top + i as f32 * line_height + baseline_offset),
                size: style.size,
                weight: style.weight,
                family: style.family,
                fill: style.fill.clone(),
                opacity: style.opacity,
                italic: style.italic,
                anchor: style.anchor,
                content: xml_text(line),
            }));
        }

        style.block_height(lines.len())
    }

    /// Move every element down by `dy`
    pub fn shift_y(&mut self, dy: f32) {
        for element in &mut self.elements {
            element.shift_y(dy);
        }
    }

    pub fn append(&mut self, other: Canvas) {
        self.elements.extend(other.elements);
    }

    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_counts_cjk_as_double_width() {
        // 22-unit text in 220 units = 20 columns = 10 CJK glyphs per line
        let lines = wrap("一二三四五六七八九十甲乙丙", 22.0, 220.0);
        assert_eq!(lines, vec!["一二三四五六七八九十", "甲乙丙"]);
    }

    #[test]
    fn test_wrap_keeps_latin_words_whole() {
        let lines = wrap("deep work beats shallow work", 20.0, 120.0);
        assert!(lines.iter().all(|l| l.chars().count() <= 12));
        assert!(lines.iter().any(|l| l.contains("shallow")));
    }

    #[test]
    fn test_wrap_never_empty() {
        assert_eq!(wrap("", 22.0, 300.0), vec![String::new()]);
    }

    #[test]
    fn test_text_block_strips_non_xml_chars() {
        let mut canvas = Canvas::new();
        let style = TextStyle::new(20.0, SLATE_800);
        canvas.text_block(&["深度\u{1}工作\u{FFFE}\t!".to_string()], 0.0, 0.0, &style);

        let Some(Element::Text(run)) = canvas.into_elements().pop() else {
            panic!("expected a text run");
        };
        assert_eq!(run.content, "深度工作\t!");
        assert_eq!(xml_text("plain 文本"), "plain 文本");
    }

    #[test]
    fn test_text_block_height_and_baselines() {
        let mut canvas = Canvas::new();
        let style = TextStyle::new(20.0, SLATE_800).leading(2.0);
        let lines = vec!["a".to_string(), "b".to_string()];
        let height = canvas.text_block(&lines, 10.0, 100.0, &style);
        assert_eq!(height, 80.0);

        let ys: Vec<f32> = canvas
            .into_elements()
            .into_iter()
            .filter_map(|e| match e {
                Element::Text(t) => Some(t.y),
                _ => None,
            })
            .collect();
        assert_eq!(ys, vec![127.0, 167.0]);
    }

    #[test]
    fn test_shift_moves_every_element() {
        let mut canvas = Canvas::new();
        canvas.rect(0.0, 10.0, 5.0, 5.0, 0.0, WHITE, 1.0);
        canvas.rule(0.0, 20.0, 5.0, 20.0, SLATE_200);
        canvas.shift_y(100.0);
        let elements = canvas.into_elements();
        assert!(matches!(&elements[0], Element::Rect(r) if r.y == 110.0));
        assert!(matches!(&elements[1], Element::Line(l) if l.y1 == 120.0 && l.y2 == 120.0));
    }
}
