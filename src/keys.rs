use crate::app::App;
use crate::state::app_state::{FetchState, Overlay};
use crate::state::messages::NetworkRequest;
use crate::state::period::PeriodKind;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use extrainnings_api::SortOption;
use log::error;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;
    let requests = apply_key(&mut guard, key_event);
    drop(guard);

    for request in requests {
        if let Err(e) = network_requests.send(request).await {
            error!("Failed to send network request: {e}");
        }
    }
}

/// Update the app for one key press and return the requests it implies.
pub fn apply_key(app: &mut App, key_event: KeyEvent) -> Vec<NetworkRequest> {
    if matches!((key_event.code, key_event.modifiers), (Char('c'), KeyModifiers::CONTROL)) {
        app.quit();
        return Vec::new();
    }

    match app.state.overlay() {
        Overlay::CustomRange => custom_range_keys(app, key_event),
        Overlay::PeriodMenu => match key_event.code {
            Char('j') | KeyCode::Down => app.state.period_menu.move_down(PeriodKind::ALL.len()),
            Char('k') | KeyCode::Up => app.state.period_menu.move_up(),
            KeyCode::Enter | Char(' ') => app.period_menu_choose(),
            KeyCode::Esc | Char('p') | Char('q') => app.state.period_menu.close(),
            _ => {}
        },
        Overlay::SortMenu => match key_event.code {
            Char('j') | KeyCode::Down => app.state.sort_menu.move_down(SortOption::ALL.len()),
            Char('k') | KeyCode::Up => app.state.sort_menu.move_up(),
            KeyCode::Enter | Char(' ') => app.sort_menu_choose(),
            KeyCode::Esc | Char('s') | Char('q') => app.state.sort_menu.close(),
            _ => {}
        },
        Overlay::TeamMenu => {
            let count = app.team_count();
            match key_event.code {
                Char('j') | KeyCode::Down => app.state.team_menu.move_down(count),
                Char('k') | KeyCode::Up => app.state.team_menu.move_up(),
                Char(' ') => app.team_menu_toggle(),
                Char('c') => app.clear_teams(),
                KeyCode::Enter | KeyCode::Esc | Char('t') | Char('q') => app.state.team_menu.close(),
                _ => {}
            }
        }
        Overlay::Help => match key_event.code {
            KeyCode::Esc | Char('?') | Char('q') => app.toggle_help(),
            _ => {}
        },
        Overlay::None => return page_keys(app, key_event),
    }

    app.games_request_if_changed().into_iter().collect()
}

fn custom_range_keys(app: &mut App, key_event: KeyEvent) {
    if key_event.code == KeyCode::Enter {
        app.submit_custom_range();
        return;
    }
    let form = &mut app.state.custom_form;
    match key_event.code {
        KeyCode::Esc => form.close(),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.switch_field(),
        KeyCode::Backspace => form.backspace(),
        Char(c) => form.push_char(c),
        _ => {}
    }
}

fn page_keys(app: &mut App, key_event: KeyEvent) -> Vec<NetworkRequest> {
    match key_event.code {
        Char('q') => app.quit(),

        // Controls
        Char('p') => app.open_period_menu(),
        Char('s') => app.open_sort_menu(),
        Char('t') => app.open_team_menu(),

        // Period navigation
        Char('h') | KeyCode::Left => {
            app.navigate_older();
        }
        Char('l') | KeyCode::Right => {
            app.navigate_newer();
        }
        Char('0') | KeyCode::Home => {
            app.back_to_current();
        }

        // Cards
        Char('j') | KeyCode::Down => app.select_next_card(),
        Char('k') | KeyCode::Up => app.select_prev_card(),
        KeyCode::Enter | Char(' ') => app.toggle_reveal_selected(),

        Char('r') => return app.reload(),

        // Global
        Char('?') => app.toggle_help(),
        Char('"') => app.toggle_show_logs(),
        _ => {}
    }

    // A failed load with unchanged controls is only retried through 'r'.
    if matches!(app.state.games, FetchState::Error(_)) && app.state.last_query == Some(app.current_query()) {
        return Vec::new();
    }
    app.games_request_if_changed().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_settings::AppSettings;
    use chrono::NaiveDate;

    fn press(app: &mut App, code: KeyCode) -> Vec<NetworkRequest> {
        apply_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn started() -> App {
        let mut app = App::new(AppSettings::default());
        app.startup_requests();
        app
    }

    #[test]
    fn test_arrow_keys_refetch_once_per_change() {
        let mut app = started();
        assert_eq!(press(&mut app, KeyCode::Left).len(), 1);
        assert_eq!(press(&mut app, Char('l')).len(), 1);
        // Already at the newest period.
        assert!(press(&mut app, KeyCode::Right).is_empty());
    }

    #[test]
    fn test_period_menu_flow() {
        let mut app = started();
        press(&mut app, Char('p'));
        assert_eq!(app.state.overlay(), Overlay::PeriodMenu);
        // Month -> Season
        press(&mut app, Char('j'));
        let requests = press(&mut app, KeyCode::Enter);
        assert_eq!(app.state.period.kind, PeriodKind::Season);
        let [NetworkRequest::LoadGames { query, .. }] = requests.as_slice() else {
            panic!("expected a single games request");
        };
        assert_eq!(query.start, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(query.end, NaiveDate::from_ymd_opt(2024, 11, 30));
    }

    #[test]
    fn test_custom_form_typing_and_apply() {
        let mut app = started();
        press(&mut app, Char('p'));
        press(&mut app, Char('j'));
        press(&mut app, Char('j'));
        assert!(press(&mut app, KeyCode::Enter).is_empty());
        assert_eq!(app.state.overlay(), Overlay::CustomRange);

        for c in "2024-10-01".chars() {
            press(&mut app, Char(c));
        }
        // Apply is disabled with one field empty.
        assert!(press(&mut app, KeyCode::Enter).is_empty());
        press(&mut app, KeyCode::Tab);
        for c in "2024-10-05".chars() {
            press(&mut app, Char(c));
        }
        let requests = press(&mut app, KeyCode::Enter);
        assert_eq!(requests.len(), 1);
        assert!(app.state.period.is_custom());

        // Period navigation does nothing in custom mode.
        assert!(press(&mut app, KeyCode::Left).is_empty());
    }

    #[test]
    fn test_typing_q_in_form_is_text_not_quit() {
        let mut app = started();
        app.choose_period(PeriodKind::Custom);
        press(&mut app, Char('q'));
        assert!(app.state.running);
        assert_eq!(app.state.overlay(), Overlay::CustomRange);
    }

    #[test]
    fn test_retry_reloads_everything() {
        let mut app = started();
        let token = app.state.latest_request.unwrap();
        app.on_games_failed(token, "boom".into());
        assert!(press(&mut app, Char('j')).is_empty());
        let requests = press(&mut app, Char('r'));
        assert_eq!(requests.len(), 3);
        assert!(app.state.games.is_loading());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = started();
        apply_key(&mut app, KeyEvent::new(Char('c'), KeyModifiers::CONTROL));
        assert!(!app.state.running);

        let mut app = started();
        press(&mut app, Char('q'));
        assert!(!app.state.running);
    }

    #[test]
    fn test_escape_closes_dropdown_without_change() {
        let mut app = started();
        press(&mut app, Char('s'));
        press(&mut app, Char('j'));
        assert!(press(&mut app, KeyCode::Esc).is_empty());
        assert_eq!(app.state.sort, SortOption::Excitement);
        assert_eq!(app.state.overlay(), Overlay::None);
    }
}
