use ratatui::layout::{Constraint, Layout as RatLayout, Rect};

pub struct Layout {
    /// Area inside the outer border
    pub inner_area: Rect,
    pub main_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Minimum inner size: the longest form needs four labelled fields plus error lines
    pub const MIN_WIDTH: u16 = 40;
    pub const MIN_HEIGHT: u16 = 14;

    pub fn calculate(size: Rect) -> Self {
        let width = size.width.max(Self::MIN_WIDTH + 2);
        let height = size.height.max(Self::MIN_HEIGHT + 2);
        let size = Rect::new(size.x, size.y, width, height);

        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        let [main_area, status_area] =
            RatLayout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner_area);

        Self {
            inner_area,
            main_area,
            status_area,
        }
    }

    pub fn fits(width: u16, height: u16) -> bool {
        width >= Self::MIN_WIDTH + 2 && height >= Self::MIN_HEIGHT + 2
    }
}
