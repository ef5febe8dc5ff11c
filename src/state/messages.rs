use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use extrainnings_api::{GameQuery, GameResponse};

/// Identifies one games request. Later requests always carry larger tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(pub u64);

impl RequestToken {
    pub fn next(self) -> Self {
        RequestToken(self.0 + 1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkRequest {
    LoadGames { token: RequestToken, query: GameQuery },
    LoadTeams,
    LoadSeasons,
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    GamesLoaded { token: RequestToken, response: GameResponse },
    GamesFailed { token: RequestToken, message: String },
    TeamsLoaded { teams: Vec<String> },
    TeamsFailed { message: String },
    SeasonsLoaded { seasons: Vec<String> },
    SeasonsFailed { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
