use chrono::{Datelike, NaiveDate};

// ---------------------------------------------------------------------------
// Look-back tables
// ---------------------------------------------------------------------------
//
// The listing is anchored on the last day of the 2024 postseason. Every period
// kind indexes into a fixed table rather than doing arithmetic against the
// wall clock, so offset N always names the same span.

type Ymd = (i32, u32, u32);

/// Days with games, newest first.
const DAY_TABLE: [Ymd; 35] = [
    (2024, 10, 30),
    (2024, 10, 29),
    (2024, 10, 28),
    (2024, 10, 26),
    (2024, 10, 25),
    (2024, 10, 20),
    (2024, 10, 19),
    (2024, 10, 18),
    (2024, 10, 17),
    (2024, 10, 16),
    (2024, 10, 15),
    (2024, 10, 14),
    (2024, 10, 13),
    (2024, 10, 12),
    (2024, 10, 11),
    (2024, 10, 10),
    (2024, 10, 9),
    (2024, 10, 8),
    (2024, 10, 7),
    (2024, 10, 6),
    (2024, 10, 5),
    (2024, 10, 4),
    (2024, 10, 3),
    (2024, 10, 2),
    (2024, 10, 1),
    (2024, 9, 30),
    (2024, 9, 29),
    (2024, 9, 28),
    (2024, 9, 27),
    (2024, 9, 26),
    (2024, 9, 25),
    (2024, 9, 24),
    (2024, 9, 23),
    (2024, 9, 22),
    (2024, 9, 21),
];

/// Seven-day windows ending on the anchor day, newest first.
const WEEK_TABLE: [(Ymd, Ymd); 8] = [
    ((2024, 10, 24), (2024, 10, 30)),
    ((2024, 10, 17), (2024, 10, 23)),
    ((2024, 10, 10), (2024, 10, 16)),
    ((2024, 10, 3), (2024, 10, 9)),
    ((2024, 9, 26), (2024, 10, 2)),
    ((2024, 9, 19), (2024, 9, 25)),
    ((2024, 9, 12), (2024, 9, 18)),
    ((2024, 9, 5), (2024, 9, 11)),
];

/// Whole calendar months, newest first.
const MONTH_TABLE: [(Ymd, Ymd); 8] = [
    ((2024, 10, 1), (2024, 10, 31)),
    ((2024, 9, 1), (2024, 9, 30)),
    ((2024, 8, 1), (2024, 8, 31)),
    ((2024, 7, 1), (2024, 7, 31)),
    ((2024, 6, 1), (2024, 6, 30)),
    ((2024, 5, 1), (2024, 5, 31)),
    ((2024, 4, 1), (2024, 4, 30)),
    ((2024, 3, 1), (2024, 3, 31)),
];

const BASE_SEASON: i32 = 2024;
const SEASON_LOOKBACK: usize = 2;
const SEASON_START: (u32, u32) = (3, 1);
const SEASON_END: (u32, u32) = (11, 30);

// ---------------------------------------------------------------------------
// Period kinds and ranges
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PeriodKind {
    Day,
    Week,
    #[default]
    Month,
    Season,
    Custom,
}

impl PeriodKind {
    pub const ALL: [PeriodKind; 5] = [
        PeriodKind::Day,
        PeriodKind::Week,
        PeriodKind::Month,
        PeriodKind::Season,
        PeriodKind::Custom,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PeriodKind::Day => "Day",
            PeriodKind::Week => "Week",
            PeriodKind::Month => "Month",
            PeriodKind::Season => "Season",
            PeriodKind::Custom => "Custom Range",
        }
    }

    /// Largest navigable offset. Custom ranges are not navigable.
    pub fn max_offset(self) -> usize {
        match self {
            PeriodKind::Day => DAY_TABLE.len() - 1,
            PeriodKind::Week => WEEK_TABLE.len() - 1,
            PeriodKind::Month => MONTH_TABLE.len() - 1,
            PeriodKind::Season => SEASON_LOOKBACK,
            PeriodKind::Custom => 0,
        }
    }
}

/// Inclusive span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    fn from_table((start, end): (Ymd, Ymd)) -> Option<Self> {
        Some(Self::new(ymd(start)?, ymd(end)?))
    }
}

fn ymd((year, month, day): Ymd) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Span covered by `offset` periods back from the most recent one. Offsets
/// past the end of a table clamp to its oldest entry. `None` for `Custom`,
/// whose range only comes from user input.
pub fn date_range(kind: PeriodKind, offset: usize) -> Option<DateRange> {
    let offset = offset.min(kind.max_offset());
    match kind {
        PeriodKind::Day => {
            let day = ymd(DAY_TABLE[offset])?;
            Some(DateRange::new(day, day))
        }
        PeriodKind::Week => DateRange::from_table(WEEK_TABLE[offset]),
        PeriodKind::Month => DateRange::from_table(MONTH_TABLE[offset]),
        PeriodKind::Season => {
            let year = BASE_SEASON - offset as i32;
            DateRange::from_table((
                (year, SEASON_START.0, SEASON_START.1),
                (year, SEASON_END.0, SEASON_END.1),
            ))
        }
        PeriodKind::Custom => None,
    }
}

// ---------------------------------------------------------------------------
// Titles
// ---------------------------------------------------------------------------

pub fn period_title(kind: PeriodKind, range: &DateRange) -> String {
    match kind {
        PeriodKind::Day => date_heading(range.start),
        PeriodKind::Week => format!(
            "{} - {}",
            range.start.format("%b %-d"),
            range.end.format("%b %-d, %Y")
        ),
        PeriodKind::Month => range.start.format("%B %Y").to_string(),
        PeriodKind::Season => format!("{} Season", range.start.year()),
        PeriodKind::Custom => format!("{} - {}", short_date(range.start), short_date(range.end)),
    }
}

/// "Wednesday, October 30, 2024"
pub fn date_heading(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// "Oct 30, 2024"
pub fn short_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

// ---------------------------------------------------------------------------
// Selection + navigation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodSelection {
    pub kind: PeriodKind,
    /// Periods back from the most recent. Always within `[0, kind.max_offset()]`.
    pub offset: usize,
    /// Only ever set from the custom range form; survives kind changes.
    pub custom_range: Option<DateRange>,
}

impl PeriodSelection {
    pub fn is_custom(&self) -> bool {
        self.kind == PeriodKind::Custom
    }

    /// Switch period kind. The offset always snaps back to the current period.
    pub fn set_kind(&mut self, kind: PeriodKind) {
        self.kind = kind;
        self.offset = 0;
    }

    pub fn apply_custom_range(&mut self, range: DateRange) {
        self.custom_range = Some(range);
        self.set_kind(PeriodKind::Custom);
    }

    /// One period further into the past. Returns false at the oldest entry.
    pub fn older(&mut self) -> bool {
        let next = (self.offset + 1).min(self.kind.max_offset());
        let changed = next != self.offset;
        self.offset = next;
        changed
    }

    /// One period closer to the present. Returns false at offset 0.
    pub fn newer(&mut self) -> bool {
        let next = self.offset.saturating_sub(1);
        let changed = next != self.offset;
        self.offset = next;
        changed
    }

    /// Back to the current period.
    pub fn reset(&mut self) -> bool {
        let changed = self.offset != 0;
        self.offset = 0;
        changed
    }

    pub fn can_go_older(&self) -> bool {
        !self.is_custom() && self.offset < self.kind.max_offset()
    }

    pub fn can_go_newer(&self) -> bool {
        !self.is_custom() && self.offset > 0
    }

    pub fn range(&self) -> Option<DateRange> {
        match self.kind {
            PeriodKind::Custom => self.custom_range,
            kind => date_range(kind, self.offset),
        }
    }

    pub fn title(&self) -> Option<String> {
        self.range().map(|range| period_title(self.kind, &range))
    }
}
