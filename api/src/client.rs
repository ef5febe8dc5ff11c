use crate::wire::{SeasonId, SeasonsResponse, TeamsResponse};
use crate::{GameQuery, GameResponse};
use reqwest::{Client, Url};
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Client for the EXTRAINNINGS games service.
#[derive(Debug, Clone)]
pub struct ExtraInningsApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    InvalidUrl(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::InvalidUrl(msg) => write!(f, "Invalid URL: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ExtraInningsApi {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent("extrainnings/0.1 (terminal game browser)")
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /games` with the query's present fields as parameters.
    pub async fn fetch_games(&self, query: &GameQuery) -> ApiResult<GameResponse> {
        let url = self.endpoint("games", &query.to_pairs())?;
        self.get(url).await
    }

    /// `GET /teams`: flat list of team names.
    pub async fn fetch_teams(&self) -> ApiResult<Vec<String>> {
        let url = self.endpoint("teams", &[])?;
        let raw: TeamsResponse = self.get(url).await?;
        Ok(raw.teams)
    }

    /// `GET /seasons`: season identifiers, newest first as served.
    pub async fn fetch_seasons(&self) -> ApiResult<Vec<String>> {
        let url = self.endpoint("seasons", &[])?;
        let raw: SeasonsResponse = self.get(url).await?;
        Ok(raw.seasons.into_iter().map(SeasonId::into_label).collect())
    }

    fn endpoint(&self, path: &str, params: &[(&'static str, String)]) -> ApiResult<Url> {
        let raw = format!("{}/{path}", self.base_url);
        let url = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params)
        };
        url.map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        let label = url.to_string();
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, label.clone()))?;

        let response = response
            .error_for_status()
            .map_err(|e| ApiError::Api(e, label.clone()))?;

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, label))
    }
}
