use extrainnings_api::client::DEFAULT_BASE_URL;
use log::LevelFilter;
use std::time::Duration;

pub const API_URL_VAR: &str = "EXTRAINNINGS_API_URL";
pub const LOG_LEVEL_VAR: &str = "EXTRAINNINGS_LOG";
pub const DEFAULT_LIMIT: u32 = 500;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub api_base_url: String,
    /// Page size sent as `limit` with every games request.
    pub limit: u32,
    pub request_timeout: Duration,
    pub log_level: Option<LevelFilter>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            limit: DEFAULT_LIMIT,
            request_timeout: DEFAULT_TIMEOUT,
            log_level: None,
        }
    }
}

/// Values given on the command line. They win over the environment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub api_url: Option<String>,
    pub limit: Option<u32>,
}

impl AppSettings {
    /// Read once at startup, after `.env` has been loaded into the environment.
    pub fn load(overrides: CliOverrides) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), overrides)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>, overrides: CliOverrides) -> Self {
        let defaults = Self::default();

        let api_base_url = overrides
            .api_url
            .or_else(|| lookup(API_URL_VAR))
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.api_base_url);

        let log_level = lookup(LOG_LEVEL_VAR).and_then(|raw| raw.trim().parse::<LevelFilter>().ok());

        Self {
            api_base_url,
            limit: overrides.limit.filter(|l| *l > 0).unwrap_or(defaults.limit),
            request_timeout: defaults.request_timeout,
            log_level,
        }
    }
}
