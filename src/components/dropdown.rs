use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::{Block, BorderType, Borders, Clear, Widget};

/// One row in a dropdown.
#[derive(Debug, Clone)]
pub struct DropdownItem {
    pub label: String,
    /// The currently applied value, marked with a bullet.
    pub current: bool,
    /// Multi-select rows carry a checkbox.
    pub checked: Option<bool>,
}

impl DropdownItem {
    pub fn single(label: impl Into<String>, current: bool) -> Self {
        Self { label: label.into(), current, checked: None }
    }

    pub fn check(label: impl Into<String>, checked: bool) -> Self {
        Self { label: label.into(), current: false, checked: Some(checked) }
    }

    fn text(&self) -> String {
        match self.checked {
            Some(true) => format!("[x] {}", self.label),
            Some(false) => format!("[ ] {}", self.label),
            None if self.current => format!("● {}", self.label),
            None => format!("  {}", self.label),
        }
    }
}

/// A popup list drawn over the page, anchored below its control.
pub struct Dropdown<'a> {
    pub title: &'a str,
    pub items: &'a [DropdownItem],
    pub cursor: usize,
    /// Shown at the bottom border, e.g. key hints.
    pub footer: Option<&'a str>,
}

impl Dropdown<'_> {
    /// Rows the popup wants, including borders.
    pub fn desired_height(&self) -> u16 {
        (self.items.len().max(1) as u16).saturating_add(2)
    }

    pub fn desired_width(&self) -> u16 {
        let widest = self
            .items
            .iter()
            .map(|i| i.text().chars().count())
            .chain([self.title.chars().count() + 2])
            .chain(self.footer.map(|f| f.chars().count() + 2))
            .max()
            .unwrap_or_default();
        (widest as u16).saturating_add(4)
    }
}

/// First row shown so that `cursor` stays within a window of `rows`.
pub fn scroll_start(cursor: usize, rows: usize, len: usize) -> usize {
    if rows == 0 || len <= rows {
        return 0;
    }
    cursor.saturating_sub(rows - 1).min(len - rows)
}

/// Place a `width` x `height` popup below `anchor`, kept inside `bounds`.
pub fn popup_area(anchor: Rect, width: u16, height: u16, bounds: Rect) -> Rect {
    let width = width.min(bounds.width);
    let y = anchor.y.saturating_add(anchor.height).max(bounds.y);
    let max_y = bounds.y + bounds.height;
    let height = height.min(max_y.saturating_sub(y));
    let x = anchor.x.min((bounds.x + bounds.width).saturating_sub(width)).max(bounds.x);
    Rect::new(x, y, width, height)
}

impl Widget for Dropdown<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 3 || area.width < 4 {
            return;
        }
        Clear.render(area, buf);

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Yellow))
            .title(format!(" {} ", self.title));
        if let Some(footer) = self.footer {
            block = block.title_bottom(format!(" {footer} "));
        }
        let inner = block.inner(area);
        block.render(area, buf);

        if self.items.is_empty() {
            buf.set_string(inner.x, inner.y, "  (none)", Style::default().fg(Color::DarkGray));
            return;
        }

        let rows = inner.height as usize;
        let start = scroll_start(self.cursor, rows, self.items.len());
        let width = inner.width as usize;

        for (row, (idx, item)) in self.items.iter().enumerate().skip(start).take(rows).enumerate() {
            let y = inner.y + row as u16;
            let style = if idx == self.cursor {
                Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if item.current || item.checked == Some(true) {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            let mut text: String = item.text().chars().take(width).collect();
            let pad = width.saturating_sub(text.chars().count());
            text.extend(std::iter::repeat_n(' ', pad));
            buf.set_string(inner.x, y, text, style);
        }
    }
}
