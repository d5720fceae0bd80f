pub mod color;
pub mod confirm_delete;
pub mod help;
pub mod home;
pub mod remote_list;
pub mod status_bar;
pub mod task_form;
pub mod task_list;

use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// Centered rect taking a percentage of `area`, as in the ratatui popup example
pub fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

/// Cut `text` to `max_width` chars, ending with "..." when shortened
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.chars().count() > max_width {
        text.chars().take(max_width.saturating_sub(3)).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
