//! Client for the public anime master-data API [MB-ANI]
//!
//! The API lists the anime broadcast in a year, optionally narrowed to one
//! cours (broadcast season): `<base>/<year>` or `<base>/<year>/<cours>`.
//! The response is a JSON array of titles.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("AniColle/", env!("CARGO_PKG_VERSION"));

/// Valid cours numbers: 1 = winter, 2 = spring, 3 = summer, 4 = autumn
pub const COURS_RANGE: std::ops::RangeInclusive<u8> = 1..=4;

/// Anime API client errors
#[derive(Debug, Error)]
pub enum AnimeApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// One title from the master list
///
/// Only `id` and `title` are guaranteed; the remaining fields are passed
/// through when the upstream provides them.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AnimeEntry {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub title_short1: Option<String>,
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default)]
    pub twitter_account: Option<String>,
    #[serde(default)]
    pub twitter_hash_tag: Option<String>,
    #[serde(default)]
    pub cours_id: Option<i64>,
    #[serde(default)]
    pub sequel: Option<i64>,
    #[serde(default)]
    pub sex: Option<i64>,
}

/// Anime API client
#[derive(Debug, Clone)]
pub struct AnimeClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl AnimeClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AnimeApiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AnimeApiError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the request URL for a year and optional cours
    pub fn search_url(&self, year: u16, cours: Option<u8>) -> String {
        match cours {
            Some(c) => format!("{}/{}/{}", self.base_url, year, c),
            None => format!("{}/{}", self.base_url, year),
        }
    }

    /// Fetch the titles broadcast in `year` (and `cours`, if given)
    pub async fn search(&self, year: u16, cours: Option<u8>) -> Result<Vec<AnimeEntry>, AnimeApiError> {
        let url = self.search_url(year, cours);
        debug!("Querying anime API: {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| AnimeApiError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Anime API returned {} for {}", status, url);
            return Err(AnimeApiError::ApiError(status.as_u16(), body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AnimeApiError::NetworkError(e.to_string()))?;

        parse_entries(&body)
    }
}

/// Parse the upstream body, which must be a JSON array of entries
pub fn parse_entries(body: &str) -> Result<Vec<AnimeEntry>, AnimeApiError> {
    serde_json::from_str::<Vec<AnimeEntry>>(body).map_err(|e| AnimeApiError::ParseError(e.to_string()))
}
