use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, FetchState};
use crate::state::messages::{NetworkRequest, RequestToken};
use crate::state::period::PeriodKind;
use crate::state::sections::{Section, filter_by_teams, organize};
use extrainnings_api::{Game, GameQuery, GameResponse, SortOption};
use log::debug;

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    next_token: RequestToken,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let app = Self {
            state: AppState::new(),
            settings,
            next_token: RequestToken::default(),
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    /// The games query implied by the current controls.
    pub fn current_query(&self) -> GameQuery {
        let range = self.state.period.range();
        GameQuery {
            sort: self.state.sort,
            start: range.map(|r| r.start),
            end: range.map(|r| r.end),
            limit: Some(self.settings.limit),
            team: self.state.teams.query_team(),
            season: None,
            page: None,
        }
    }

    /// A games request if the controls changed the query since the last one.
    pub fn games_request_if_changed(&mut self) -> Option<NetworkRequest> {
        let query = self.current_query();
        if self.state.last_query.as_ref() == Some(&query) {
            return None;
        }
        Some(self.issue_games_request(query))
    }

    fn issue_games_request(&mut self, query: GameQuery) -> NetworkRequest {
        self.next_token = self.next_token.next();
        let token = self.next_token;
        self.state.latest_request = Some(token);
        self.state.last_query = Some(query.clone());
        self.state.games = FetchState::Loading;
        NetworkRequest::LoadGames { token, query }
    }

    /// Everything the page needs on first show.
    pub fn startup_requests(&mut self) -> Vec<NetworkRequest> {
        let mut requests = vec![NetworkRequest::LoadTeams, NetworkRequest::LoadSeasons];
        let query = self.current_query();
        requests.push(self.issue_games_request(query));
        requests
    }

    /// Start over from defaults, like reloading the page, and refetch everything.
    pub fn reload(&mut self) -> Vec<NetworkRequest> {
        let show_logs = self.state.show_logs;
        self.state = AppState::new();
        self.state.show_logs = show_logs;
        self.startup_requests()
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    fn is_current(&self, token: RequestToken) -> bool {
        if self.state.latest_request == Some(token) {
            return true;
        }
        debug!(
            "discarding stale games response {} (latest {:?})",
            token.0,
            self.state.latest_request.map(|t| t.0)
        );
        false
    }

    /// Returns false when the response was stale and ignored.
    pub fn on_games_loaded(&mut self, token: RequestToken, response: GameResponse) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.state.games = FetchState::Success(response);
        self.state.cards.reset();
        true
    }

    pub fn on_games_failed(&mut self, token: RequestToken, message: String) -> bool {
        if !self.is_current(token) {
            return false;
        }
        let message = if message.trim().is_empty() {
            "An error occurred".to_string()
        } else {
            message
        };
        self.state.games = FetchState::Error(message);
        true
    }

    pub fn on_teams_loaded(&mut self, teams: Vec<String>) {
        self.state.team_list = FetchState::Success(teams);
    }

    pub fn on_teams_failed(&mut self, message: String) {
        self.state.team_list = FetchState::Error(message);
    }

    pub fn on_seasons_loaded(&mut self, seasons: Vec<String>) {
        self.state.season_list = FetchState::Success(seasons);
    }

    pub fn on_seasons_failed(&mut self, message: String) {
        self.state.season_list = FetchState::Error(message);
    }

    // -----------------------------------------------------------------------
    // Derived view data
    // -----------------------------------------------------------------------

    /// Fetched games after any local team filtering.
    pub fn visible_games(&self) -> Vec<Game> {
        let Some(response) = self.state.games.data() else {
            return Vec::new();
        };
        filter_by_teams(&response.games, self.state.teams.local_filter())
    }

    pub fn sections(&self) -> Vec<Section> {
        organize(&self.visible_games(), &self.state.period, self.state.sort)
    }

    pub fn selected_game_id(&self) -> Option<i64> {
        self.sections()
            .iter()
            .flat_map(|s| s.games().iter())
            .nth(self.state.cards.selected)
            .map(|g| g.id)
    }

    // -----------------------------------------------------------------------
    // Period dropdown + custom range
    // -----------------------------------------------------------------------

    pub fn open_period_menu(&mut self) {
        self.state.close_overlays();
        let cursor = PeriodKind::ALL
            .iter()
            .position(|k| *k == self.state.period.kind)
            .unwrap_or_default();
        self.state.period_menu.open_at(cursor);
    }

    pub fn period_menu_choose(&mut self) {
        let Some(kind) = PeriodKind::ALL.get(self.state.period_menu.cursor).copied() else {
            return;
        };
        self.state.period_menu.close();
        self.choose_period(kind);
    }

    /// Picking Custom Range asks for dates first; the rest switch immediately.
    pub fn choose_period(&mut self, kind: PeriodKind) {
        if kind == PeriodKind::Custom {
            let current = self.state.period.custom_range;
            self.state.custom_form.open_with(current);
            return;
        }
        self.state.period.set_kind(kind);
    }

    pub fn submit_custom_range(&mut self) {
        if let Some(range) = self.state.custom_form.submit() {
            self.state.period.apply_custom_range(range);
        }
    }

    // -----------------------------------------------------------------------
    // Sort dropdown
    // -----------------------------------------------------------------------

    pub fn open_sort_menu(&mut self) {
        self.state.close_overlays();
        let cursor = SortOption::ALL
            .iter()
            .position(|s| *s == self.state.sort)
            .unwrap_or_default();
        self.state.sort_menu.open_at(cursor);
    }

    pub fn sort_menu_choose(&mut self) {
        if let Some(sort) = SortOption::ALL.get(self.state.sort_menu.cursor).copied() {
            self.state.sort = sort;
        }
        self.state.sort_menu.close();
    }

    // -----------------------------------------------------------------------
    // Team dropdown
    // -----------------------------------------------------------------------

    pub fn open_team_menu(&mut self) {
        self.state.close_overlays();
        self.state.team_menu.open_at(0);
    }

    pub fn team_count(&self) -> usize {
        self.state.team_list.data().map_or(0, Vec::len)
    }

    pub fn team_menu_toggle(&mut self) {
        let Some(team) = self
            .state
            .team_list
            .data()
            .and_then(|teams| teams.get(self.state.team_menu.cursor))
            .cloned()
        else {
            return;
        };
        self.state.teams.toggle(&team);
        self.state.cards.select_first();
    }

    pub fn clear_teams(&mut self) {
        if self.state.teams.selected.is_empty() {
            return;
        }
        self.state.teams.clear();
        self.state.cards.select_first();
    }

    pub fn teams_label(&self) -> String {
        if self.state.team_list.is_loading() {
            return "Loading teams...".to_string();
        }
        self.state.teams.label()
    }

    // -----------------------------------------------------------------------
    // Period navigation
    // -----------------------------------------------------------------------

    pub fn navigate_older(&mut self) -> bool {
        !self.state.period.is_custom() && self.state.period.older()
    }

    pub fn navigate_newer(&mut self) -> bool {
        !self.state.period.is_custom() && self.state.period.newer()
    }

    pub fn back_to_current(&mut self) -> bool {
        !self.state.period.is_custom() && self.state.period.reset()
    }

    // -----------------------------------------------------------------------
    // Cards
    // -----------------------------------------------------------------------

    pub fn select_next_card(&mut self) {
        let total = self.sections().iter().map(|s| s.games().len()).sum();
        self.state.cards.select_next(total);
    }

    pub fn select_prev_card(&mut self) {
        self.state.cards.select_prev();
    }

    pub fn toggle_reveal_selected(&mut self) {
        if let Some(id) = self.selected_game_id() {
            self.state.cards.toggle_reveal(id);
        }
    }

    // -----------------------------------------------------------------------
    // Misc
    // -----------------------------------------------------------------------

    pub fn toggle_help(&mut self) {
        let show = !self.state.show_help;
        self.state.close_overlays();
        self.state.show_help = show;
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn quit(&mut self) {
        self.state.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_state::Overlay;
    use chrono::NaiveDate;

    fn app() -> App {
        App::new(AppSettings::default())
    }

    fn game(id: i64, date: &str, excitement: f64, home: &str, away: &str) -> Game {
        Game {
            id,
            game_id: 700_000 + id,
            game_date: extrainnings_api::parse_calendar_date(date).unwrap(),
            home_team: home.into(),
            away_team: away.into(),
            home_score: None,
            away_score: None,
            excitement_score: excitement,
            season: 2024,
            highlight_url: None,
        }
    }

    fn response(games: Vec<Game>) -> GameResponse {
        let total = games.len() as u64;
        GameResponse { games, total, page: 1, limit: 500 }
    }

    fn token_of(request: &NetworkRequest) -> RequestToken {
        match request {
            NetworkRequest::LoadGames { token, .. } => *token,
            other => panic!("expected a games request, got {other:?}"),
        }
    }

    #[test]
    fn default_query_is_current_month_by_excitement() {
        let query = app().current_query();
        assert_eq!(query.sort, SortOption::Excitement);
        assert_eq!(query.start, NaiveDate::from_ymd_opt(2024, 10, 1));
        assert_eq!(query.end, NaiveDate::from_ymd_opt(2024, 10, 31));
        assert_eq!(query.limit, Some(500));
        assert_eq!(query.team, None);
    }

    #[test]
    fn startup_requests_lists_and_games() {
        let mut app = app();
        let requests = app.startup_requests();
        assert_eq!(requests.len(), 3);
        assert!(requests.contains(&NetworkRequest::LoadTeams));
        assert!(requests.contains(&NetworkRequest::LoadSeasons));
        assert!(app.state.games.is_loading());
    }

    #[test]
    fn unchanged_query_does_not_refetch() {
        let mut app = app();
        app.startup_requests();
        assert!(app.games_request_if_changed().is_none());

        assert!(app.navigate_older());
        let request = app.games_request_if_changed().unwrap();
        let NetworkRequest::LoadGames { query, .. } = request else {
            panic!("expected games request");
        };
        assert_eq!(query.start, NaiveDate::from_ymd_opt(2024, 9, 1));

        assert!(app.navigate_newer());
        assert!(app.games_request_if_changed().is_some());
        assert!(app.games_request_if_changed().is_none());
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut app = app();
        let first = token_of(&app.startup_requests()[2]);
        app.navigate_older();
        let second = token_of(&app.games_request_if_changed().unwrap());
        assert!(second > first);

        assert!(!app.on_games_loaded(first, response(vec![game(1, "2024-10-30", 5.0, "A", "B")])));
        assert!(app.state.games.is_loading());

        assert!(!app.on_games_failed(first, "timeout".into()));
        assert!(app.state.games.is_loading());

        assert!(app.on_games_loaded(second, response(vec![])));
        assert!(app.state.games.data().is_some());
    }

    #[test]
    fn failure_without_message_gets_generic_text() {
        let mut app = app();
        let token = token_of(&app.startup_requests()[2]);
        app.on_games_failed(token, String::new());
        assert_eq!(app.state.games, FetchState::Error("An error occurred".into()));
    }

    #[test]
    fn month_example_renders_one_titled_section() {
        let mut app = app();
        let token = token_of(&app.startup_requests()[2]);
        app.on_games_loaded(
            token,
            response(vec![
                game(1, "2024-10-30", 9.1, "NYY", "LAD"),
                game(2, "2024-10-29", 9.8, "NYY", "LAD"),
            ]),
        );
        let sections = app.sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].heading(), "October 2024");
        let ids: Vec<i64> = sections[0].games().iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn choosing_custom_opens_form_before_switching() {
        let mut app = app();
        app.open_period_menu();
        app.state.period_menu.cursor = 4;
        app.period_menu_choose();
        assert_eq!(app.state.overlay(), Overlay::CustomRange);
        assert_eq!(app.state.period.kind, PeriodKind::Month);

        app.state.custom_form.start = "2024-10-01".into();
        app.state.custom_form.end = "2024-10-05".into();
        app.submit_custom_range();
        assert!(app.state.period.is_custom());
        assert_eq!(app.state.overlay(), Overlay::None);

        let query = app.current_query();
        assert_eq!(query.start, NaiveDate::from_ymd_opt(2024, 10, 1));
        assert_eq!(query.end, NaiveDate::from_ymd_opt(2024, 10, 5));
    }

    #[test]
    fn arrow_navigation_is_suppressed_in_custom_mode() {
        let mut app = app();
        app.state.custom_form.start = "2024-10-01".into();
        app.state.custom_form.end = "2024-10-05".into();
        app.submit_custom_range();
        assert!(!app.navigate_older());
        assert!(!app.navigate_newer());
        assert!(!app.back_to_current());
    }

    #[test]
    fn period_change_resets_offset() {
        let mut app = app();
        app.navigate_older();
        app.navigate_older();
        app.open_period_menu();
        app.state.period_menu.cursor = 0;
        app.period_menu_choose();
        assert_eq!(app.state.period.kind, PeriodKind::Day);
        assert_eq!(app.state.period.offset, 0);
    }

    #[test]
    fn sort_menu_changes_query() {
        let mut app = app();
        app.startup_requests();
        app.open_sort_menu();
        app.state.sort_menu.move_down(SortOption::ALL.len());
        app.sort_menu_choose();
        assert_eq!(app.state.sort, SortOption::Date);
        let request = app.games_request_if_changed().unwrap();
        let NetworkRequest::LoadGames { query, .. } = request else {
            panic!("expected games request");
        };
        assert_eq!(query.sort, SortOption::Date);
    }

    #[test]
    fn multiple_teams_filter_locally() {
        let mut app = app();
        let token = token_of(&app.startup_requests()[2]);
        app.on_teams_loaded(vec!["BOS".into(), "NYY".into(), "SEA".into()]);
        app.on_games_loaded(
            token,
            response(vec![
                game(1, "2024-10-30", 1.0, "BOS", "TB"),
                game(2, "2024-10-30", 2.0, "NYY", "LAD"),
                game(3, "2024-10-30", 3.0, "HOU", "SEA"),
            ]),
        );

        app.open_team_menu();
        app.team_menu_toggle();
        assert_eq!(app.current_query().team.as_deref(), Some("BOS"));

        app.state.team_menu.move_down(app.team_count());
        app.state.team_menu.move_down(app.team_count());
        app.team_menu_toggle();
        assert_eq!(app.current_query().team, None);
        assert_eq!(app.teams_label(), "2 teams selected");

        let ids: Vec<i64> = app.visible_games().iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn changing_local_team_filter_returns_to_first_card() {
        let mut app = app();
        let token = token_of(&app.startup_requests()[2]);
        app.on_teams_loaded(vec!["AAA".into(), "BBB".into(), "CCC".into()]);
        let teams = ["AAA", "BBB", "CCC"];
        let games = (0..13)
            .map(|i| game(i + 1, "2024-10-30", i as f64, teams[i as usize % 3], "ZZZ"))
            .collect();
        app.on_games_loaded(token, response(games));

        app.open_team_menu();
        app.team_menu_toggle();
        app.state.team_menu.move_down(app.team_count());
        app.team_menu_toggle();
        // Two teams drop the team parameter, so the unfiltered query is unchanged.
        assert!(app.games_request_if_changed().is_none());
        assert_eq!(app.visible_games().len(), 9);

        for _ in 0..8 {
            app.select_next_card();
        }
        app.state.cards.scroll = 66;
        app.toggle_reveal_selected();
        let revealed = app.selected_game_id().unwrap();

        // AAA+BBB becomes BBB+CCC: same query, different local filter.
        app.state.team_menu.cursor = 0;
        app.team_menu_toggle();
        app.state.team_menu.cursor = 2;
        app.team_menu_toggle();
        assert!(app.games_request_if_changed().is_none());
        assert_eq!(app.state.cards.selected, 0);
        assert_eq!(app.state.cards.scroll, 0);
        assert!(app.selected_game_id().is_some());
        assert!(app.state.cards.is_revealed(revealed));

        app.state.cards.selected = 5;
        app.clear_teams();
        assert_eq!(app.state.cards.selected, 0);
        assert_eq!(app.visible_games().len(), 13);
        assert!(app.games_request_if_changed().is_none());
    }

    #[test]
    fn reveal_follows_selection_and_clears_on_reload_of_games() {
        let mut app = app();
        let token = token_of(&app.startup_requests()[2]);
        app.on_games_loaded(
            token,
            response(vec![
                game(1, "2024-10-30", 1.0, "BOS", "TB"),
                game(2, "2024-10-30", 2.0, "NYY", "LAD"),
            ]),
        );
        // Excitement order puts game 2 first.
        app.toggle_reveal_selected();
        assert!(app.state.cards.is_revealed(2));
        app.select_next_card();
        app.select_next_card();
        assert_eq!(app.selected_game_id(), Some(1));

        app.navigate_older();
        let token = token_of(&app.games_request_if_changed().unwrap());
        app.on_games_loaded(token, response(vec![]));
        assert!(app.state.cards.revealed.is_empty());
        assert_eq!(app.state.cards.selected, 0);
    }

    #[test]
    fn reload_restores_defaults_and_refetches() {
        let mut app = app();
        app.startup_requests();
        app.navigate_older();
        app.state.teams.toggle("BOS");
        let requests = app.reload();
        assert_eq!(requests.len(), 3);
        assert_eq!(app.state.period.offset, 0);
        assert!(app.state.teams.selected.is_empty());
        assert!(app.state.team_list.is_loading());
    }

    #[test]
    fn teams_label_while_loading() {
        let mut app = app();
        assert_eq!(app.teams_label(), "Loading teams...");
        app.on_teams_failed("down".into());
        assert_eq!(app.teams_label(), "All Teams");
    }
}
