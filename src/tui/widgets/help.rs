use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::config::KeyBindings;
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::popup_area;
use crate::utils::format_key_binding_for_display;

pub fn render_help(f: &mut Frame, area: Rect, bindings: &KeyBindings, palette: &Palette) {
    let base = Style::default().fg(palette.fg).bg(palette.bg);
    let popup_area = popup_area(area, 60, 80);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(bindings))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(base),
        )
        .style(base)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, popup_area);
}

fn build_help_text(bindings: &KeyBindings) -> String {
    let key = |binding: &str| format_key_binding_for_display(binding);
    let mut text = String::new();

    text.push_str("Navigation:\n");
    text.push_str(&format!("  {} / {}: Move up/down\n", key(&bindings.list_up), key(&bindings.list_down)));
    text.push_str(&format!("  {}: Open / select\n", key(&bindings.select)));
    text.push_str(&format!("  {}: Back\n", key(&bindings.back)));
    text.push('\n');

    text.push_str("My tasks:\n");
    text.push_str(&format!("  {}: New task\n", key(&bindings.new)));
    text.push_str(&format!("  {}: Edit task\n", key(&bindings.edit)));
    text.push_str(&format!("  {}: Toggle pending/completed\n", key(&bindings.toggle_task_status)));
    text.push_str(&format!("  {}: Delete task\n", key(&bindings.delete)));
    text.push_str(&format!("  {}: Show/hide filters (←/→ change a filter)\n", key(&bindings.filter)));
    text.push('\n');

    text.push_str("Forms:\n");
    text.push_str("  Tab / Shift+Tab: Next/previous field\n");
    text.push_str(&format!("  {}: Save\n", key(&bindings.save)));
    text.push_str("  Enter on the last field: Save\n");
    text.push_str("  Due date: t today, w +7 days, +/- one day\n");
    text.push('\n');

    text.push_str("Tasks from the API:\n");
    text.push_str(&format!("  {}: Reload\n", key(&bindings.refresh)));
    text.push_str(&format!("  {}: Import selected task\n", key(&bindings.import)));
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Quit (Ctrl+c anywhere)\n", key(&bindings.quit)));
    text.push_str(&format!("  {}: Show/hide help\n", key(&bindings.help)));

    text
}
