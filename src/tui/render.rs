use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::navigation::{Route, RouteKind};
use crate::tui::app::{App, Screen};
use crate::tui::layout::Layout;
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::confirm_delete::render_confirm_delete;
use crate::tui::widgets::help::render_help;
use crate::tui::widgets::home::render_home;
use crate::tui::widgets::remote_list::render_remote_list;
use crate::tui::widgets::status_bar::render_status_bar;
use crate::tui::widgets::task_form::{render_task_form, StepSummary};
use crate::tui::widgets::task_list::render_task_list;
use crate::utils::format_key_binding_for_display;

pub fn render(f: &mut Frame, app: &App, layout: &Layout) {
    let palette = Palette::from_theme(&app.config.theme);
    let base = Style::default().fg(palette.fg).bg(palette.bg);

    let outer = Block::default()
        .borders(Borders::ALL)
        .title(format!("Taskdeck - {}", screen_title(app.navigator.current().kind())))
        .style(base);
    let full = f.area();
    f.render_widget(outer, full);

    let area = layout.main_area;
    match app.screen() {
        Screen::Home(home) => render_home(f, area, home, &palette),
        Screen::Details(form) => render_task_form(f, area, "Basic information", form, None, &palette),
        Screen::DueDate(form) => {
            let summary = match app.navigator.current() {
                Route::CreateStep2 { title, priority, .. } => Some(StepSummary { title, priority: *priority }),
                _ => None,
            };
            render_task_form(f, area, "Due date", form, summary, &palette);
        }
        Screen::Edit { form, .. } => render_task_form(f, area, "Edit information", form, None, &palette),
        Screen::TaskList(list) => {
            render_task_list(f, area, list, &palette);
            if let Some(pending) = &list.pending_delete {
                render_confirm_delete(f, area, pending, &palette);
            }
        }
        Screen::Remote(state) => {
            let retry_key = format_key_binding_for_display(&app.config.key_bindings.refresh);
            render_remote_list(f, area, state, &retry_key, &palette);
        }
    }

    render_status_bar(
        f,
        layout.status_area,
        app.status_message.as_deref(),
        &key_hints(app),
        &palette,
    );

    if app.show_help {
        render_help(f, layout.inner_area, &app.config.key_bindings, &palette);
    }
}

fn screen_title(kind: RouteKind) -> &'static str {
    match kind {
        RouteKind::Home => "Task Manager",
        RouteKind::CreateStep1 => "New Task (step 1/2)",
        RouteKind::CreateStep2 => "New Task (step 2/2)",
        RouteKind::MyTasks => "My Tasks",
        RouteKind::EditTask => "Edit Task",
        RouteKind::ApiTasks => "Tasks from the API",
    }
}

fn key_hints(app: &App) -> Vec<String> {
    let kb = &app.config.key_bindings;
    let hint = |binding: &str, label: &str| format!("{}: {}", format_key_binding_for_display(binding), label);

    let mut hints = match app.screen() {
        Screen::Home(_) => vec![hint(&kb.select, "Open"), hint(&kb.quit, "Quit")],
        Screen::Details(_) => vec![hint("Tab", "Next field"), hint(&kb.save, "Next step"), hint(&kb.back, "Back")],
        Screen::DueDate(_) | Screen::Edit { .. } => {
            vec![hint("Tab", "Next field"), hint(&kb.save, "Save"), hint(&kb.back, "Back")]
        }
        Screen::TaskList(list) if list.pending_delete.is_some() => {
            vec![hint(&kb.select, "Confirm"), hint(&kb.back, "Cancel")]
        }
        Screen::TaskList(list) if list.filter_panel.is_some() => {
            vec![hint("←/→", "Change"), hint("↑/↓", "Switch filter"), hint(&kb.filter, "Close")]
        }
        Screen::TaskList(_) => vec![
            hint(&kb.new, "New"),
            hint(&kb.toggle_task_status, "Toggle"),
            hint(&kb.edit, "Edit"),
            hint(&kb.delete, "Delete"),
            hint(&kb.filter, "Filter"),
            hint(&kb.back, "Back"),
        ],
        Screen::Remote(_) => vec![hint(&kb.import, "Import"), hint(&kb.refresh, "Reload"), hint(&kb.back, "Back")],
    };
    hints.push(hint(&kb.help, "Help"));
    hints
}
