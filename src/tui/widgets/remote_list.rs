use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::state::{RemoteLoad, RemoteState};
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::truncate;

pub fn render_remote_list(f: &mut Frame, area: Rect, state: &RemoteState, retry_key: &str, palette: &Palette) {
    let base = Style::default().fg(palette.fg).bg(palette.bg);

    match &state.load {
        RemoteLoad::Loading => {
            let block = Block::default().borders(Borders::ALL).title("Tasks from the API").style(base);
            let loading = Paragraph::new("Loading tasks...").alignment(Alignment::Center).style(base).block(block);
            f.render_widget(loading, area);
        }
        RemoteLoad::Failed(message) => {
            let block = Block::default().borders(Borders::ALL).title("Tasks from the API").style(base);
            let lines = vec![
                Line::from(Span::styled(
                    "Could not load tasks",
                    Style::default().fg(palette.error_fg).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(message.clone()),
                Line::from(""),
                Line::from(format!("Press {} to retry", retry_key)),
            ];
            let error = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .style(base)
                .block(block);
            f.render_widget(error, area);
        }
        RemoteLoad::Loaded { tasks, total } => {
            let title = format!("Tasks from the API - showing {} of {}", tasks.len(), total);
            let block = Block::default().borders(Borders::ALL).title(title).style(base);
            if tasks.is_empty() {
                let empty = Paragraph::new("No tasks")
                    .alignment(Alignment::Center)
                    .style(base.add_modifier(Modifier::DIM))
                    .block(block);
                f.render_widget(empty, area);
                return;
            }

            let max_width = area.width.saturating_sub(4) as usize;
            let items: Vec<ListItem> = tasks
                .iter()
                .map(|task| {
                    let status = if task.completed { "✓" } else { "○" };
                    let line = format!("{} #{} {} (user {})", status, task.id, task.title, task.owner_id);
                    ListItem::new(truncate(&line, max_width))
                })
                .collect();

            let list = List::new(items)
                .block(block)
                .style(base)
                .highlight_style(Style::default().fg(palette.highlight_fg).bg(palette.highlight_bg))
                .highlight_symbol("> ");
            let mut list_state = ListState::default();
            list_state.select(Some(state.selected));
            f.render_stateful_widget(list, area, &mut list_state);
        }
    }
}
