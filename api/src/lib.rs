pub mod client;
pub mod wire;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// Domain types. These mirror the /games JSON shape field for field
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Game {
    pub id: i64,
    pub game_id: i64,
    #[serde(deserialize_with = "calendar_date")]
    pub game_date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub home_score: Option<i64>,
    #[serde(default)]
    pub away_score: Option<i64>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub excitement_score: f64,
    #[serde(default)]
    pub season: i32,
    #[serde(default)]
    pub highlight_url: Option<String>,
}

impl Game {
    /// (away, home) when the game is final. A half-populated pair counts as unplayed.
    pub fn score(&self) -> Option<(i64, i64)> {
        match (self.away_score, self.home_score) {
            (Some(away), Some(home)) => Some((away, home)),
            _ => None,
        }
    }

    pub fn involves(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }

    pub fn highlight(&self) -> Option<&str> {
        self.highlight_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GameResponse {
    #[serde(default)]
    pub games: Vec<Game>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOption {
    #[default]
    Excitement,
    Date,
}

impl SortOption {
    pub const ALL: [SortOption; 2] = [SortOption::Excitement, SortOption::Date];

    pub fn as_query(&self) -> &'static str {
        match self {
            SortOption::Excitement => "excitement",
            SortOption::Date => "date",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOption::Excitement => "Most Exciting",
            SortOption::Date => "Date",
        }
    }
}

/// Parameters for `GET /games`. `None` fields are left off the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameQuery {
    pub sort: SortOption,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub limit: Option<u32>,
    pub team: Option<String>,
    pub season: Option<String>,
    pub page: Option<u32>,
}

impl GameQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("sort", self.sort.as_query().to_string())];
        if let Some(start) = self.start {
            pairs.push(("start", format_calendar_date(start)));
        }
        if let Some(end) = self.end {
            pairs.push(("end", format_calendar_date(end)));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(team) = self.team.as_deref().filter(|t| !t.is_empty()) {
            pairs.push(("team", team.to_string()));
        }
        if let Some(season) = self.season.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("season", season.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }
}

// ---------------------------------------------------------------------------
// Calendar dates
// ---------------------------------------------------------------------------

/// Parse `YYYY-MM-DD` by splitting the components. A trailing time part
/// (`2024-10-30T00:00:00`) is ignored rather than interpreted.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.trim().split(['T', ' ']).next()?;
    let mut parts = date_part.splitn(3, '-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    let day = parts.next()?.parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid calendar date: {raw}")))
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game_json(extra: &str) -> String {
        format!(
            r#"{{"id": 7, "game_id": 745001, "game_date": "2024-10-30",
                "home_team": "NYY", "away_team": "LAD"{extra}}}"#
        )
    }

    #[test]
    fn calendar_date_is_decomposed_not_shifted() {
        let date = parse_calendar_date("2024-01-01").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(format_calendar_date(date), "2024-01-01");
    }

    #[test]
    fn calendar_date_ignores_time_suffix() {
        assert_eq!(
            parse_calendar_date("2024-10-30T00:00:00"),
            NaiveDate::from_ymd_opt(2024, 10, 30)
        );
    }

    #[test]
    fn calendar_date_rejects_garbage() {
        assert_eq!(parse_calendar_date(""), None);
        assert_eq!(parse_calendar_date("2024-13-01"), None);
        assert_eq!(parse_calendar_date("Oct 30"), None);
    }

    #[test]
    fn game_with_null_optionals_deserializes() {
        let json = game_json(
            r#", "home_score": null, "away_score": null,
                "excitement_score": null, "season": 2024, "highlight_url": null"#,
        );
        let game: Game = serde_json::from_str(&json).unwrap();
        assert_eq!(game.score(), None);
        assert_eq!(game.excitement_score, 0.0);
        assert_eq!(game.highlight(), None);
    }

    #[test]
    fn game_with_missing_optionals_deserializes() {
        let game: Game = serde_json::from_str(&game_json("")).unwrap();
        assert_eq!(game.score(), None);
        assert_eq!(game.season, 0);
    }

    #[test]
    fn half_populated_score_reads_as_unplayed() {
        let json = game_json(r#", "home_score": 4, "away_score": null"#);
        let game: Game = serde_json::from_str(&json).unwrap();
        assert_eq!(game.score(), None);
    }

    #[test]
    fn score_is_away_then_home() {
        let json = game_json(r#", "home_score": 4, "away_score": 7, "excitement_score": 8.25"#);
        let game: Game = serde_json::from_str(&json).unwrap();
        assert_eq!(game.score(), Some((7, 4)));
        assert!(game.involves("NYY"));
        assert!(game.involves("LAD"));
        assert!(!game.involves("BOS"));
    }

    #[test]
    fn blank_highlight_is_treated_as_absent() {
        let json = game_json(r#", "highlight_url": "  ""#);
        let game: Game = serde_json::from_str(&json).unwrap();
        assert_eq!(game.highlight(), None);
    }

    #[test]
    fn query_pairs_omit_absent_fields() {
        let query = GameQuery {
            sort: SortOption::Date,
            limit: Some(500),
            ..Default::default()
        };
        assert_eq!(
            query.to_pairs(),
            vec![("sort", "date".to_string()), ("limit", "500".to_string())]
        );
    }

    #[test]
    fn query_pairs_include_range_and_team() {
        let query = GameQuery {
            sort: SortOption::Excitement,
            start: NaiveDate::from_ymd_opt(2024, 10, 1),
            end: NaiveDate::from_ymd_opt(2024, 10, 31),
            limit: Some(100),
            team: Some("BOS".into()),
            season: None,
            page: Some(2),
        };
        let pairs = query.to_pairs();
        assert_eq!(pairs[1], ("start", "2024-10-01".to_string()));
        assert_eq!(pairs[2], ("end", "2024-10-31".to_string()));
        assert!(pairs.contains(&("team", "BOS".to_string())));
        assert!(pairs.contains(&("page", "2".to_string())));
        assert!(!pairs.iter().any(|(k, _)| *k == "season"));
    }

    #[test]
    fn empty_team_is_omitted() {
        let query = GameQuery {
            team: Some(String::new()),
            ..Default::default()
        };
        assert!(!query.to_pairs().iter().any(|(k, _)| *k == "team"));
    }
}
