use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::widgets::color::Palette;
use crate::tui::widgets::truncate;

const SEPARATOR: &str = " • ";

/// One line: the status message when there is one, otherwise as many key hints as fit
pub fn render_status_bar(f: &mut Frame, area: Rect, message: Option<&str>, key_hints: &[String], palette: &Palette) {
    let max_width = area.width as usize;
    let (content, style) = match message {
        Some(msg) => (
            truncate(msg, max_width),
            Style::default().fg(palette.highlight_fg).bg(palette.highlight_bg).add_modifier(Modifier::BOLD),
        ),
        None => (fit_hints(key_hints, max_width), Style::default().fg(palette.fg).bg(palette.bg)),
    };
    f.render_widget(Paragraph::new(content).style(style), area);
}

/// Join hints with bullets, ending in "..." when some had to be dropped
fn fit_hints(key_hints: &[String], max_width: usize) -> String {
    let mut text = String::new();
    for hint in key_hints {
        let extra = if text.is_empty() { 0 } else { SEPARATOR.chars().count() };
        if text.chars().count() + extra + hint.chars().count() > max_width {
            if text.is_empty() {
                return truncate(hint, max_width);
            }
            if text.chars().count() + 3 <= max_width {
                text.push_str("...");
            } else {
                text = truncate(&text, max_width);
            }
            return text;
        }
        if !text.is_empty() {
            text.push_str(SEPARATOR);
        }
        text.push_str(hint);
    }
    text
}
