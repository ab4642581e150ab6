// Colors for the TUI
//
// Chrome uses a fixed slate/indigo palette; the card preview takes its
// colors from the card itself.

use crate::card::HexColor;
use crate::logging::LogLevel;
use ratatui::style::Color;
use ratatui::widgets::BorderType;

/// UI chrome colors
#[derive(Debug, Clone)]
pub struct Theme {
    pub fg: Color,
    pub muted: Color,
    pub border: Color,
    pub border_focused: Color,
    pub border_type: BorderType,

    pub title: Color,
    pub highlight: Color,
    pub error: Color,
    pub toast_bg: Color,

    pub log_error: Color,
    pub log_warn: Color,
    pub log_info: Color,
    pub log_debug: Color,
}

// Tailwind shades
const SLATE_200: Color = Color::Rgb(226, 232, 240);
const SLATE_500: Color = Color::Rgb(100, 116, 139);
const SLATE_600: Color = Color::Rgb(71, 85, 105);
const SLATE_800: Color = Color::Rgb(30, 41, 59);
const INDIGO_300: Color = Color::Rgb(165, 180, 252);
const INDIGO_400: Color = Color::Rgb(129, 140, 248);
const INDIGO_500: Color = Color::Rgb(99, 102, 241);
const RED_400: Color = Color::Rgb(248, 113, 113);

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: SLATE_200,
            muted: SLATE_500,
            border: SLATE_600,
            border_focused: INDIGO_400,
            border_type: BorderType::Rounded,

            title: INDIGO_300,
            highlight: INDIGO_500,
            error: RED_400,
            toast_bg: SLATE_800,

            log_error: Color::Red,
            log_warn: Color::Yellow,
            log_info: Color::Blue,
            log_debug: Color::DarkGray,
        }
    }
}

impl Theme {
    pub fn log_color(&self, level: LogLevel) -> Color {
        match level {
            LogLevel::Error => self.log_error,
            LogLevel::Warn => self.log_warn,
            LogLevel::Info => self.log_info,
            LogLevel::Debug | LogLevel::Trace => self.log_debug,
        }
    }
}

/// Terminal color for a card palette entry
pub fn card_color(color: &HexColor) -> Color {
    let (r, g, b) = color.rgb();
    Color::Rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_color_maps_rgb() {
        let color = HexColor::parse("#EE6C4D").unwrap();
        assert_eq!(card_color(&color), Color::Rgb(0xEE, 0x6C, 0x4D));
    }
}
