use crate::state::messages::RequestToken;
use crate::state::period::{DateRange, PeriodSelection};
use extrainnings_api::{GameQuery, GameResponse, SortOption, parse_calendar_date};
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Fetch state
// ---------------------------------------------------------------------------

/// Outcome of one remote fetch. Exactly one of the three at any time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FetchState<T> {
    #[default]
    Loading,
    Error(String),
    Success(T),
}

impl<T> FetchState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }
}

// ---------------------------------------------------------------------------
// Dropdowns
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DropdownState {
    pub open: bool,
    pub cursor: usize,
}

impl DropdownState {
    pub fn open_at(&mut self, cursor: usize) {
        self.open = true;
        self.cursor = cursor;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn move_down(&mut self, len: usize) {
        if self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Custom range form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CustomField {
    #[default]
    Start,
    End,
}

const DATE_INPUT_LEN: usize = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomRangeForm {
    pub open: bool,
    pub start: String,
    pub end: String,
    pub focus: CustomField,
    pub error: Option<String>,
}

impl CustomRangeForm {
    /// Open the form, pre-filled with the last applied range if there is one.
    pub fn open_with(&mut self, current: Option<DateRange>) {
        if let Some(range) = current {
            self.start = extrainnings_api::format_calendar_date(range.start);
            self.end = extrainnings_api::format_calendar_date(range.end);
        }
        self.focus = CustomField::Start;
        self.error = None;
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.error = None;
    }

    /// Apply is only offered once both inputs have something in them.
    pub fn can_submit(&self) -> bool {
        !self.start.trim().is_empty() && !self.end.trim().is_empty()
    }

    pub fn switch_field(&mut self) {
        self.focus = match self.focus {
            CustomField::Start => CustomField::End,
            CustomField::End => CustomField::Start,
        };
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            CustomField::Start => &mut self.start,
            CustomField::End => &mut self.end,
        }
    }

    pub fn push_char(&mut self, c: char) {
        if !(c.is_ascii_digit() || c == '-') {
            return;
        }
        let field = self.focused_mut();
        if field.len() < DATE_INPUT_LEN {
            field.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.focused_mut().pop();
    }

    /// Parse both inputs. On failure the form stays open with an error line.
    pub fn submit(&mut self) -> Option<DateRange> {
        if !self.can_submit() {
            return None;
        }
        let Some(start) = parse_calendar_date(&self.start) else {
            self.error = Some(format!("Start date '{}' is not YYYY-MM-DD", self.start));
            return None;
        };
        let Some(end) = parse_calendar_date(&self.end) else {
            self.error = Some(format!("End date '{}' is not YYYY-MM-DD", self.end));
            return None;
        };
        self.close();
        Some(DateRange::new(start, end))
    }
}

// ---------------------------------------------------------------------------
// Team filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamFilter {
    /// Selection order is preserved for the label.
    pub selected: Vec<String>,
}

impl TeamFilter {
    pub fn toggle(&mut self, team: &str) {
        if let Some(idx) = self.selected.iter().position(|t| t == team) {
            self.selected.remove(idx);
        } else {
            self.selected.push(team.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, team: &str) -> bool {
        self.selected.iter().any(|t| t == team)
    }

    pub fn label(&self) -> String {
        match self.selected.as_slice() {
            [] => "All Teams".to_string(),
            [team] => team.clone(),
            teams => format!("{} teams selected", teams.len()),
        }
    }

    /// The API filters on one team; a single selection goes to the server.
    pub fn query_team(&self) -> Option<String> {
        match self.selected.as_slice() {
            [team] => Some(team.clone()),
            _ => None,
        }
    }

    /// Several teams are filtered locally after the fetch.
    pub fn local_filter(&self) -> &[String] {
        if self.selected.len() > 1 { &self.selected[..] } else { &[] }
    }
}

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardState {
    /// Game ids whose score has been revealed. Scores start hidden.
    pub revealed: HashSet<i64>,
    /// Index into the flattened section order.
    pub selected: usize,
    /// First visible line of the section list.
    pub scroll: u16,
}

impl CardState {
    pub fn is_revealed(&self, game_id: i64) -> bool {
        self.revealed.contains(&game_id)
    }

    pub fn toggle_reveal(&mut self, game_id: i64) {
        if !self.revealed.remove(&game_id) {
            self.revealed.insert(game_id);
        }
    }

    pub fn select_next(&mut self, total: usize) {
        if self.selected + 1 < total {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Back to the first card, keeping reveals. Used when the visible set changes.
    pub fn select_first(&mut self) {
        self.selected = 0;
        self.scroll = 0;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// Whole app state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Overlay {
    #[default]
    None,
    PeriodMenu,
    SortMenu,
    TeamMenu,
    CustomRange,
    Help,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub period: PeriodSelection,
    pub sort: SortOption,
    pub teams: TeamFilter,

    pub games: FetchState<GameResponse>,
    pub team_list: FetchState<Vec<String>>,
    pub season_list: FetchState<Vec<String>>,

    pub period_menu: DropdownState,
    pub sort_menu: DropdownState,
    pub team_menu: DropdownState,
    pub custom_form: CustomRangeForm,
    pub show_help: bool,
    pub show_logs: bool,

    pub cards: CardState,

    /// Token of the newest games request. Responses with any other token are stale.
    pub latest_request: Option<RequestToken>,
    /// Query behind `latest_request`, used to skip refetching identical parameters.
    pub last_query: Option<GameQuery>,

    pub running: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self { running: true, ..Default::default() }
    }

    /// The topmost open overlay, if any. At most one is open at a time.
    pub fn overlay(&self) -> Overlay {
        if self.custom_form.open {
            Overlay::CustomRange
        } else if self.period_menu.open {
            Overlay::PeriodMenu
        } else if self.sort_menu.open {
            Overlay::SortMenu
        } else if self.team_menu.open {
            Overlay::TeamMenu
        } else if self.show_help {
            Overlay::Help
        } else {
            Overlay::None
        }
    }

    pub fn close_overlays(&mut self) {
        self.period_menu.close();
        self.sort_menu.close();
        self.team_menu.close();
        self.custom_form.close();
        self.show_help = false;
    }
}
