use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::models::Task;
use crate::tui::state::{priority_filter_label, FilterRow, TaskListState};
use crate::tui::widgets::color::{priority_color, Palette};
use crate::tui::widgets::truncate;

pub fn render_task_list(f: &mut Frame, area: Rect, list: &TaskListState, palette: &Palette) {
    let base = Style::default().fg(palette.fg).bg(palette.bg);

    let list_area = if let Some(row) = list.filter_panel {
        let [filter_area, rest] = Layout::vertical([Constraint::Length(4), Constraint::Min(3)]).areas(area);
        render_filter_panel(f, filter_area, list, row, palette);
        rest
    } else {
        area
    };

    let visible = list.visible();
    let title = format!(
        "My Tasks ({}/{}) - status: {}, priority: {}",
        visible.len(),
        list.tasks.len(),
        list.filter.status.label(),
        priority_filter_label(list.filter.priority)
    );
    let block = Block::default().borders(Borders::ALL).title(title).style(base);

    if visible.is_empty() {
        let empty = Paragraph::new("No tasks")
            .alignment(Alignment::Center)
            .style(base.add_modifier(Modifier::DIM))
            .block(block);
        f.render_widget(empty, list_area);
        return;
    }

    // 2 for borders, 2 for the highlight symbol
    let max_width = list_area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = visible.iter().map(|task| task_item(task, max_width)).collect();

    let widget = List::new(items)
        .block(block)
        .style(base)
        .highlight_style(Style::default().fg(palette.highlight_fg).bg(palette.highlight_bg))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(list.selected));
    f.render_stateful_widget(widget, list_area, &mut state);
}

fn task_item(task: &Task, max_width: usize) -> ListItem<'static> {
    let status_indicator = if task.completed { "✓" } else { "○" };
    let title_style = if task.completed {
        Style::default().add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };

    let first = Line::from(vec![
        Span::raw(format!("{} ", status_indicator)),
        Span::styled(truncate(&task.title, max_width.saturating_sub(2)), title_style),
    ]);
    let second = Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<6}", task.priority.label()), Style::default().fg(priority_color(task.priority))),
        Span::raw(format!(" due {}  ", task.due_date)),
        Span::styled(
            truncate(&task.description, max_width.saturating_sub(22)),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);
    ListItem::new(vec![first, second])
}

fn render_filter_panel(f: &mut Frame, area: Rect, list: &TaskListState, row: FilterRow, palette: &Palette) {
    let base = Style::default().fg(palette.fg).bg(palette.bg);
    let focused = Style::default().fg(palette.highlight_fg).bg(palette.highlight_bg);

    let status = format!("Status:   ◀ {} ▶", list.filter.status.label());
    let priority = format!("Priority: ◀ {} ▶", priority_filter_label(list.filter.priority));
    let lines = vec![
        Line::from(Span::styled(status, if row == FilterRow::Status { focused } else { base })),
        Line::from(Span::styled(priority, if row == FilterRow::Priority { focused } else { base })),
    ];

    let panel = Paragraph::new(lines)
        .style(base)
        .block(Block::default().borders(Borders::ALL).title("Filters").style(base));
    f.render_widget(panel, area);
}
