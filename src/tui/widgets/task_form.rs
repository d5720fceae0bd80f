use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::models::Priority;
use crate::tui::state::{FormField, TaskForm, TextInput};
use crate::tui::widgets::color::{priority_color, Palette};

/// Title and priority chosen on step 1, shown above the due date on step 2
pub struct StepSummary<'a> {
    pub title: &'a str,
    pub priority: Priority,
}

pub fn render_task_form(
    f: &mut Frame,
    area: Rect,
    heading: &str,
    form: &TaskForm,
    summary: Option<StepSummary>,
    palette: &Palette,
) {
    let base = Style::default().fg(palette.fg).bg(palette.bg);
    let outer = Block::default().borders(Borders::ALL).title(heading.to_string()).style(base);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let mut constraints = Vec::new();
    if summary.is_some() {
        constraints.push(Constraint::Length(3));
    }
    for _ in form.fields() {
        constraints.push(Constraint::Length(3)); // input box
        constraints.push(Constraint::Length(1)); // inline error
    }
    constraints.push(Constraint::Min(0));
    let rows = Layout::vertical(constraints).split(inner);

    let mut row = 0;
    if let Some(summary) = summary {
        let text = vec![
            Line::from(format!("Title: {}", summary.title)),
            Line::from(vec![
                Span::raw("Priority: "),
                Span::styled(summary.priority.label().to_uppercase(), Style::default().fg(priority_color(summary.priority))),
            ]),
        ];
        f.render_widget(Paragraph::new(text).style(base), rows[row]);
        row += 1;
    }

    for &field in form.fields() {
        let focused = form.focused() == field;
        let border_style = if focused {
            Style::default().fg(palette.highlight_bg).add_modifier(Modifier::BOLD)
        } else {
            base
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(field.label())
            .border_style(border_style)
            .style(base);
        let box_area = rows[row];
        let input_area = block.inner(box_area);

        match form.input(field) {
            Some(input) => {
                let (visible, cursor_x) = visible_text(input, input_area.width as usize);
                f.render_widget(Paragraph::new(visible).block(block).style(base), box_area);
                if focused {
                    f.set_cursor_position((input_area.x + cursor_x as u16, input_area.y));
                }
            }
            None => {
                f.render_widget(Paragraph::new(priority_line(form.priority, focused)).block(block).style(base), box_area);
            }
        }

        if let Some(error) = form.errors.get(field) {
            f.render_widget(
                Paragraph::new(error.to_string()).style(Style::default().fg(palette.error_fg).bg(palette.bg)),
                rows[row + 1],
            );
        } else if focused && field == FormField::DueDate {
            f.render_widget(
                Paragraph::new("t: today  w: +7 days  +/-: shift a day").style(base.add_modifier(Modifier::DIM)),
                rows[row + 1],
            );
        }
        row += 2;
    }
}

/// Slice of the input that fits `width`, keeping the cursor on screen
fn visible_text(input: &TextInput, width: usize) -> (String, usize) {
    let width = width.max(1);
    let offset = input.cursor().saturating_sub(width - 1);
    let visible: String = input.value().chars().skip(offset).take(width).collect();
    (visible, input.cursor() - offset)
}

fn priority_line(selected: Priority, focused: bool) -> Line<'static> {
    let mut spans = Vec::new();
    for priority in Priority::ALL {
        let mut style = Style::default().fg(priority_color(priority));
        let label = if priority == selected {
            style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
            format!(" [{}] ", priority.label())
        } else {
            format!("  {}  ", priority.label())
        };
        spans.push(Span::styled(label, style));
    }
    if focused {
        spans.push(Span::raw("  (←/→ or h/m/l)"));
    }
    Line::from(spans)
}
