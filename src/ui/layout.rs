use tui::layout::{Constraint, Layout, Rect, Size};

pub const HEADER_HEIGHT: u16 = 3;
pub const NAV_HEIGHT: u16 = 3;
pub const FOOTER_HEIGHT: u16 = 1;
pub const LOG_PANE_HEIGHT: u16 = 10;

/// Pre-computed layout areas for the main draw loop.
pub struct LayoutAreas {
    /// Title plus the three control labels: [title, period, sort, teams].
    pub header: [Rect; 4],
    /// Zero-sized when the navigation bar is hidden.
    pub nav: Rect,
    pub main: Rect,
    pub footer: Rect,
    /// Zero-sized unless the log pane is shown.
    pub logs: Rect,
}

impl LayoutAreas {
    pub fn new(size: Size) -> Self {
        let rect = Rect::new(0, 0, size.width, size.height);
        Self::from_rect(rect, true, false)
    }

    pub fn update(&mut self, area: Rect, show_nav: bool, show_logs: bool) {
        *self = Self::from_rect(area, show_nav, show_logs);
    }

    fn from_rect(area: Rect, show_nav: bool, show_logs: bool) -> Self {
        let nav_height = if show_nav { NAV_HEIGHT } else { 0 };
        let log_height = if show_logs { LOG_PANE_HEIGHT } else { 0 };

        let [header, nav, main, logs, footer] = Layout::vertical([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(nav_height),
            Constraint::Fill(1),
            Constraint::Length(log_height),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .areas(area);

        LayoutAreas {
            header: Self::split_header(header),
            nav,
            main,
            footer,
            logs,
        }
    }

    fn split_header(area: Rect) -> [Rect; 4] {
        Layout::horizontal([
            Constraint::Length(16),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
        ])
        .areas(area)
    }
}
