use crate::state::period::{PeriodSelection, date_heading};
use chrono::NaiveDate;
use extrainnings_api::{Game, SortOption};
use std::collections::BTreeMap;

/// One heading plus the games listed under it.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    /// A single calendar day, used by custom ranges.
    Date { date: NaiveDate, games: Vec<Game> },
    /// The whole selected period.
    Period { title: String, games: Vec<Game> },
}

impl Section {
    pub fn heading(&self) -> String {
        match self {
            Section::Date { date, .. } => date_heading(*date),
            Section::Period { title, .. } => title.clone(),
        }
    }

    pub fn games(&self) -> &[Game] {
        match self {
            Section::Date { games, .. } | Section::Period { games, .. } => games,
        }
    }
}

/// Arrange a fetched game list into display sections.
///
/// Custom ranges get one section per distinct `game_date`, oldest day first.
/// Every other period kind gets exactly one section titled after the period.
/// Games inside a section follow `sort`. The input slice is left untouched.
pub fn organize(games: &[Game], selection: &PeriodSelection, sort: SortOption) -> Vec<Section> {
    if selection.is_custom() {
        let mut by_date: BTreeMap<NaiveDate, Vec<Game>> = BTreeMap::new();
        for game in games {
            by_date.entry(game.game_date).or_default().push(game.clone());
        }
        return by_date
            .into_iter()
            .map(|(date, mut games)| {
                sort_games(&mut games, sort);
                Section::Date { date, games }
            })
            .collect();
    }

    let mut sorted = games.to_vec();
    sort_games(&mut sorted, sort);
    vec![Section::Period {
        title: selection.title().unwrap_or_default(),
        games: sorted,
    }]
}

/// Stable, so equal keys keep the server's order.
pub fn sort_games(games: &mut [Game], sort: SortOption) {
    match sort {
        SortOption::Excitement => {
            games.sort_by(|a, b| b.excitement_score.total_cmp(&a.excitement_score))
        }
        SortOption::Date => games.sort_by(|a, b| b.game_date.cmp(&a.game_date)),
    }
}

/// Keep games where either side is one of `teams`. An empty selection keeps everything.
pub fn filter_by_teams(games: &[Game], teams: &[String]) -> Vec<Game> {
    if teams.is_empty() {
        return games.to_vec();
    }
    games
        .iter()
        .filter(|game| teams.iter().any(|team| game.involves(team)))
        .cloned()
        .collect()
}
