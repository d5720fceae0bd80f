use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::tui::state::{HomeState, HOME_MENU};
use crate::tui::widgets::color::Palette;

pub fn render_home(f: &mut Frame, area: Rect, home: &HomeState, palette: &Palette) {
    let base = Style::default().fg(palette.fg).bg(palette.bg);
    let [summary_area, menu_area] = Layout::vertical([Constraint::Length(5), Constraint::Min(3)]).areas(area);

    let counts = home.counts;
    let summary = Paragraph::new(vec![
        Line::from(vec![Span::raw("Total tasks: "), Span::styled(counts.total.to_string(), base.add_modifier(Modifier::BOLD))]),
        Line::from(format!("Pending: {}", counts.pending)),
        Line::from(format!("Completed: {}", counts.completed)),
    ])
    .style(base)
    .block(Block::default().borders(Borders::ALL).title("Summary").style(base));
    f.render_widget(summary, summary_area);

    let items: Vec<ListItem> = HOME_MENU.iter().map(|(_, label)| ListItem::new(*label)).collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Menu").style(base))
        .style(base)
        .highlight_style(Style::default().fg(palette.highlight_fg).bg(palette.highlight_bg))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(home.selected));
    f.render_stateful_widget(list, menu_area, &mut state);
}
