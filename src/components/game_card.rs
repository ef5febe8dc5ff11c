use extrainnings_api::Game;
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::{Block, BorderType, Borders, Widget};

use crate::state::period::short_date;

/// Rows per card: six content lines plus the border.
pub const CARD_HEIGHT: u16 = 8;

/// Narrowest card that still fits "Excitement: 10.00" and a short team pair.
pub const MIN_CARD_WIDTH: u16 = 28;

pub const MASKED_SCORE: &str = "? - ?";

/// Score line body. A score only exists once both sides are present.
pub fn score_label(game: &Game, revealed: bool) -> String {
    match game.score() {
        None => "TBD".to_string(),
        Some(_) if !revealed => MASKED_SCORE.to_string(),
        Some((away, home)) => format!("{away} - {home}"),
    }
}

pub fn highlight_label(game: &Game) -> String {
    match game.highlight() {
        Some(url) => format!("Watch Highlights: {url}"),
        None => "No highlights available".to_string(),
    }
}

/// Number of card columns for a given content width.
pub fn columns_for_width(width: u16) -> usize {
    match width {
        0..60 => 1,
        60..100 => 2,
        100..140 => 3,
        _ => 4,
    }
}

/// One game rendered as a bordered card.
pub struct GameCard<'a> {
    pub game: &'a Game,
    /// 1-based position within its section.
    pub number: usize,
    pub revealed: bool,
    pub selected: bool,
}

impl<'a> Widget for GameCard<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 4 || area.height < 3 {
            return;
        }

        let border = if self.selected { Color::Yellow } else { Color::DarkGray };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border));
        let inner = block.inner(area);
        block.render(area, buf);

        let score_style = if self.game.score().is_some() && !self.revealed {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };
        let highlight_style = if self.game.highlight().is_some() {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let lines = [
            (
                format!("Game {}", self.number),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            (
                format!("{} vs {}", self.game.away_team, self.game.home_team),
                Style::default().fg(Color::Gray),
            ),
            (format!("Score: {}", score_label(self.game, self.revealed)), score_style),
            (
                format!("Excitement: {:.2}", self.game.excitement_score),
                Style::default().fg(Color::Green),
            ),
            (short_date(self.game.game_date), Style::default().fg(Color::DarkGray)),
            (highlight_label(self.game), highlight_style),
        ];

        let width = inner.width as usize;
        for (dy, (text, style)) in lines.into_iter().enumerate() {
            let y = inner.y + dy as u16;
            if y >= inner.y + inner.height {
                break;
            }
            let clipped: String = text.chars().take(width).collect();
            buf.set_string(inner.x, y, clipped, style);
        }
    }
}
