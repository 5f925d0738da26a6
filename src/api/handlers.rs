//! HTTP request handlers for the leaderboard API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::types::{clamp_score, Player, RankedEntry, Score};
use crate::core::{AppState, Error, Result};
use crate::system::{format_uptime, metrics::Metrics};
use crate::{log_debug, log_error, log_info};

// Response types

/// Error body returned for every failed request
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    /// Human readable reason
    pub error: String,
}

/// One page of the global ranking
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    /// Entries in ranking order
    pub entries: Vec<RankedEntry>,
    /// Population size
    pub total_users: usize,
    /// Effective page size
    pub limit: usize,
    /// Effective offset
    pub offset: usize,
    /// Whether entries follow this page
    pub has_more: bool,
}

/// A player's standing as returned by search and lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRank {
    /// Dense rank
    pub global_rank: u32,
    /// Player name
    pub username: String,
    /// Player score
    pub rating: Score,
}

impl From<RankedEntry> for UserRank {
    fn from(entry: RankedEntry) -> Self {
        Self {
            global_rank: entry.rank,
            username: entry.name,
            rating: entry.score,
        }
    }
}

/// Name search results
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Matches, best score first
    pub results: Vec<UserRank>,
    /// The query as received
    pub query: String,
    /// Number of results
    pub count: usize,
}

/// Population statistics
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    /// Population size
    pub total_users: usize,
    /// Lowest score, 0 when empty
    pub min_rating: Score,
    /// Highest score, 0 when empty
    pub max_rating: Score,
}

/// Player created through the API
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUser {
    /// Generated id
    pub id: String,
    /// Player name
    pub username: String,
    /// Stored score after clamping
    pub rating: Score,
    /// Rank right after insertion
    pub global_rank: u32,
}

/// Health probe body
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always "healthy" while the process serves requests
    pub status: String,
    /// Time since startup
    pub uptime: String,
    /// Crate version
    pub version: String,
}

/// Service description served at `/`
#[derive(Serialize)]
pub struct InfoResponse {
    /// Service name
    pub name: String,
    /// Crate version
    pub version: String,
    /// Available routes
    pub endpoints: Vec<String>,
}

// Request types

/// Paging parameters, parsed leniently
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    /// Requested page size
    pub limit: Option<String>,
    /// Requested offset
    pub offset: Option<String>,
}

/// Search parameters, parsed leniently
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Name fragment
    pub q: Option<String>,
    /// Requested result count
    pub limit: Option<String>,
}

/// Body of `POST /api/users`
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Unique name
    pub username: String,
    /// Initial score, clamped into range
    pub rating: i64,
}

/// Requested limit if it parses to `1..=max`, otherwise `default`
pub fn parse_limit(raw: Option<&str>, default: usize, max: usize) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&limit| limit > 0 && limit <= max)
        .unwrap_or(default)
}

/// Requested offset if it parses to a non-negative integer, otherwise 0
pub fn parse_offset(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok()).unwrap_or(0)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if self.is_server_error() {
            log_error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn count_request(kind: &str) {
    Metrics::global().queries.requests.with_label_values(&[kind]).inc();
}

/// Build a leaderboard page body from query parameters
pub fn leaderboard_page(state: &AppState, params: &PageParams) -> LeaderboardResponse {
    let server = &state.config.server;
    let limit = parse_limit(params.limit.as_deref(), server.default_page_limit, server.max_page_limit);
    let offset = parse_offset(params.offset.as_deref());

    let page = state.store.page(limit, offset);
    let has_more = page.has_more(limit, offset);
    LeaderboardResponse {
        entries: page.entries,
        total_users: page.total,
        limit,
        offset,
        has_more,
    }
}

/// Run a name search for `query`
pub fn search_results(state: &AppState, query: &str, limit: usize) -> SearchResponse {
    let results: Vec<UserRank> = state
        .store
        .search(query, limit)
        .into_iter()
        .map(UserRank::from)
        .collect();
    SearchResponse {
        count: results.len(),
        results,
        query: query.to_string(),
    }
}

// Leaderboard handlers

/// GET /api/leaderboard
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Json<LeaderboardResponse> {
    count_request("page");
    Json(leaderboard_page(&state, &params))
}

/// GET /api/users/search
pub async fn search_users(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let query = params.q.unwrap_or_default();
    if query.is_empty() {
        return Json(SearchResponse {
            results: Vec::new(),
            query,
            count: 0,
        });
    }

    count_request("search");
    let server = &state.config.server;
    let limit = parse_limit(params.limit.as_deref(), server.default_page_limit, server.max_page_limit);
    Json(search_results(&state, &query, limit))
}

/// GET /api/users/:username
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserRank>> {
    count_request("lookup");
    state
        .store
        .rank_of(&username)
        .map(|entry| Json(UserRank::from(entry)))
        .ok_or_else(|| Error::not_found(format!("user {}", username)))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreatedUser>)> {
    let username = request.username.trim().to_string();
    if username.is_empty() {
        return Err(Error::invalid_input("username must not be empty"));
    }

    let player = Player::new(Uuid::new_v4().to_string(), username.as_str(), clamp_score(request.rating));
    let id = player.id.clone();
    if !state.store.insert(player) {
        return Err(Error::already_exists(format!("user {}", username)));
    }

    let entry = state
        .store
        .rank_of(&username)
        .ok_or_else(|| Error::internal(format!("user {} missing after insert", username)))?;
    log_info!(username = %entry.name, rating = entry.score, "user created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedUser {
            id,
            username: entry.name,
            rating: entry.score,
            global_rank: entry.rank,
        }),
    ))
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    count_request("stats");
    let stats = state.store.stats();
    Json(StatsResponse {
        total_users: stats.total,
        min_rating: stats.min,
        max_rating: stats.max,
    })
}

// System handlers

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime: format_uptime(state.started_at),
        version: crate::VERSION.to_string(),
    })
}

/// GET /
pub async fn root_handler() -> Json<InfoResponse> {
    log_debug!("service info requested");
    let endpoints = [
        "GET /api/leaderboard?limit=50&offset=0",
        "GET /api/users/search?q=name&limit=50",
        "GET /api/users/:username",
        "POST /api/users",
        "GET /api/stats",
        "GET /api/stream",
        "GET /api/stream/search?q=name",
        "GET /health",
    ];
    Json(InfoResponse {
        name: crate::NAME.to_string(),
        version: crate::VERSION.to_string(),
        endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_parsing_is_lenient() {
        assert_eq!(parse_limit(None, 50, 100), 50);
        assert_eq!(parse_limit(Some("10"), 50, 100), 10);
        assert_eq!(parse_limit(Some("100"), 50, 100), 100);
        assert_eq!(parse_limit(Some("101"), 50, 100), 50);
        assert_eq!(parse_limit(Some("0"), 50, 100), 50);
        assert_eq!(parse_limit(Some("-3"), 50, 100), 50);
        assert_eq!(parse_limit(Some("ten"), 50, 100), 50);
    }

    #[test]
    fn offset_parsing_is_lenient() {
        assert_eq!(parse_offset(None), 0);
        assert_eq!(parse_offset(Some("25")), 25);
        assert_eq!(parse_offset(Some("-1")), 0);
        assert_eq!(parse_offset(Some("x")), 0);
    }

    #[test]
    fn user_rank_wire_names() {
        let json = serde_json::to_value(UserRank::from(RankedEntry::new(3, "amy", 1200))).unwrap();
        assert_eq!(json, serde_json::json!({"globalRank": 3, "username": "amy", "rating": 1200}));
    }

    #[test]
    fn errors_map_to_status() {
        assert_eq!(Error::not_found("x").into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(Error::already_exists("x").into_response().status(), StatusCode::CONFLICT);
        assert_eq!(Error::invalid_input("x").into_response().status(), StatusCode::BAD_REQUEST);
    }
}
