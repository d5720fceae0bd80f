use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::state::PendingDelete;
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::popup_area;

pub fn render_confirm_delete(f: &mut Frame, area: Rect, pending: &PendingDelete, palette: &Palette) {
    let base = Style::default().fg(palette.fg).bg(palette.bg);
    let selected = Style::default().fg(palette.highlight_fg).bg(palette.highlight_bg);

    let popup_area = popup_area(area, 50, 35);
    // keep the list from showing through
    f.render_widget(Clear, popup_area);

    let mut lines = vec![
        Line::from(Span::styled("Delete this task?", base)),
        Line::from(""),
        Line::from(Span::styled(pending.title.clone(), base)),
        Line::from(""),
    ];
    for (index, option) in ["Delete", "Cancel"].iter().enumerate() {
        let is_selected = index == pending.selection;
        let prefix = if is_selected { "> " } else { "  " };
        lines.push(Line::from(Span::styled(
            format!("{}{}", prefix, option),
            if is_selected { selected } else { base },
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("↑↓ to choose, Enter to confirm, Esc to cancel", base)));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Confirm Delete")
                .title_alignment(Alignment::Center)
                .style(base),
        )
        .style(base)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup_area);
}
