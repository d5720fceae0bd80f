use ratatui::style::Color;

use crate::config::Theme;
use crate::models::Priority;

/// Parse a theme color: named ("blue", "lightred"), "#RRGGBB", "#RGB" or "rgb(r, g, b)".
/// Unknown strings fall back to white.
pub fn parse_color(color_str: &str) -> Color {
    let s = color_str.trim().to_lowercase();
    match s.as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "gray" | "grey" | "lightgray" | "lightgrey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        _ => parse_hex_color(&s).or_else(|| parse_rgb_color(&s)).unwrap_or(Color::White),
    }
}

fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#')?;
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    match hex.len() {
        6 => Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        // #RGB expands each digit: 0xF -> 0xFF
        3 => {
            let (r, g, b) = (channel(0..1)?, channel(1..2)?, channel(2..3)?);
            Some(Color::Rgb((r << 4) | r, (g << 4) | g, (b << 4) | b))
        }
        _ => None,
    }
}

fn parse_rgb_color(s: &str) -> Option<Color> {
    let content = s.strip_prefix("rgb(")?.strip_suffix(')')?;
    let parts: Vec<u8> = content
        .split(',')
        .map(|p| p.trim().parse::<u8>().ok())
        .collect::<Option<_>>()?;
    match parts.as_slice() {
        [r, g, b] => Some(Color::Rgb(*r, *g, *b)),
        _ => None,
    }
}

/// Black or white, whichever reads better on `background`
pub fn get_contrast_text_color(background: Color) -> Color {
    let dark = match background {
        Color::Rgb(r, g, b) => {
            // perceived brightness, ITU-R BT.601 weights
            let luma = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
            luma < 128.0
        }
        Color::Black | Color::Blue | Color::Magenta | Color::Red | Color::DarkGray => true,
        _ => false,
    };
    if dark { Color::White } else { Color::Black }
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::LightRed,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::LightGreen,
    }
}

/// Theme strings resolved once per frame
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub error_fg: Color,
}

impl Palette {
    pub fn from_theme(theme: &Theme) -> Self {
        let highlight_bg = parse_color(&theme.highlight_bg);
        let highlight_fg = if theme.highlight_fg.trim().is_empty() {
            get_contrast_text_color(highlight_bg)
        } else {
            parse_color(&theme.highlight_fg)
        };
        Self {
            fg: parse_color(&theme.fg),
            bg: parse_color(&theme.bg),
            highlight_bg,
            highlight_fg,
            error_fg: parse_color(&theme.error_fg),
        }
    }
}
