//! Anime search by broadcast year and cours [MB-ANI]
//!
//! The first search arrives as a POST form; page links come back as GET
//! with the same `year`/`cours` plus `page`. Both end in [`run_search`].

use anicolle_common::pagination::{calculate_pagination, page_slice, parse_page, Pagination, PAGE_SIZE};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::anime_client::{AnimeEntry, COURS_RANGE};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Years the search accepts
pub const YEAR_RANGE: std::ops::RangeInclusive<u16> = 1900..=2100;

/// GET query; values are raw strings because empty form fields are common
#[derive(Debug, Default, Deserialize)]
pub struct AnimeSearchQuery {
    pub year: Option<String>,
    pub cours: Option<String>,
    pub page: Option<String>,
}

/// POST body
///
/// Fields are loose JSON so form-style bodies (`{"year": ""}`,
/// `{"year": "2020"}`) get the same validation as numbers.
#[derive(Debug, Default, Deserialize)]
pub struct AnimeSearchRequest {
    pub year: Option<Value>,
    pub cours: Option<Value>,
    pub page: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct AnimeSearchResponse {
    pub anime_list: Vec<AnimeEntry>,
    pub year: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cours: Option<u8>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

fn missing_year() -> ApiError {
    ApiError::BadRequest("please select a broadcast year".to_string())
}

/// Text form of a loose JSON field; `null` means absent
fn field_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Parse an optional numeric form field; blank means absent
fn parse_field<T: std::str::FromStr>(raw: Option<&str>, name: &str) -> ApiResult<Option<T>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<T>()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("invalid {}: {}", name, s))),
    }
}

/// Year field; anything unparsable counts as no selection
fn parse_year(raw: Option<&str>) -> ApiResult<Option<u16>> {
    parse_field::<u16>(raw, "year").map_err(|_| missing_year())
}

/// Validate the search parameters
pub fn validate_search(year: Option<u16>, cours: Option<u8>) -> ApiResult<(u16, Option<u8>)> {
    let year = year.ok_or_else(missing_year)?;
    if !YEAR_RANGE.contains(&year) {
        return Err(ApiError::BadRequest(format!("invalid year: {}", year)));
    }
    if let Some(c) = cours {
        if !COURS_RANGE.contains(&c) {
            return Err(ApiError::BadRequest(format!("cours must be 1-4, got {}", c)));
        }
    }
    Ok((year, cours))
}

async fn run_search(
    state: &AppState,
    year: Option<u16>,
    cours: Option<u8>,
    page: Option<i64>,
) -> ApiResult<Json<AnimeSearchResponse>> {
    let (year, cours) = validate_search(year, cours)?;

    let all = state.anime_client.search(year, cours).await?;
    let pagination = calculate_pagination(all.len() as i64, page, PAGE_SIZE);
    let anime_list = all[page_slice(&all, &pagination)].to_vec();

    info!(
        "Anime search year={} cours={:?}: {} results, page {}/{}",
        year, cours, pagination.total_results, pagination.page, pagination.total_pages
    );

    Ok(Json(AnimeSearchResponse {
        anime_list,
        year,
        cours,
        pagination,
    }))
}

/// GET /api/anime/search?year=&cours=&page=
pub async fn search_anime_get(
    State(state): State<AppState>,
    Query(query): Query<AnimeSearchQuery>,
) -> ApiResult<Json<AnimeSearchResponse>> {
    let year = parse_year(query.year.as_deref())?;
    let cours = parse_field::<u8>(query.cours.as_deref(), "cours")?;
    run_search(&state, year, cours, parse_page(query.page.as_deref())).await
}

/// POST /api/anime/search
pub async fn search_anime_post(
    State(state): State<AppState>,
    Json(request): Json<AnimeSearchRequest>,
) -> ApiResult<Json<AnimeSearchResponse>> {
    let year = parse_year(field_text(request.year.as_ref()).as_deref())?;
    let cours = parse_field::<u8>(field_text(request.cours.as_ref()).as_deref(), "cours")?;
    let page = parse_page(field_text(request.page.as_ref()).as_deref());
    run_search(&state, year, cours, page).await
}
