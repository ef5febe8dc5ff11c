/// Raw response shapes for the list endpoints. `/games` decodes straight into
/// the domain `GameResponse`; these only exist to unwrap the envelopes.
use serde::Deserialize;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct TeamsResponse {
    #[serde(default)]
    pub teams: Vec<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct SeasonsResponse {
    #[serde(default)]
    pub seasons: Vec<SeasonId>,
}

/// The server emits season years as integers; older builds sent strings.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum SeasonId {
    Year(i64),
    Name(String),
}

impl SeasonId {
    pub fn into_label(self) -> String {
        match self {
            SeasonId::Year(year) => year.to_string(),
            SeasonId::Name(name) => name,
        }
    }
}
