//! REST API routes.

use axum::{
    body::Bytes,
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, Request, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

use crate::api::error::ApiError;
use crate::persistence::{CreateOutcome, ReplaceOutcome};
use crate::state::AppState;
use routebook_core::models::{Pagination, Route, RoutePage};
use routebook_core::validation::parse_route_input;

/// Prefix shared by every API path.
pub const API_PREFIX: &str = "/api";

/// Create the API router.
///
/// Anything outside `/api` falls through to the static front end.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/routes", get(list_routes).post(create_route))
        .route(
            "/api/routes/:id",
            get(get_route).put(replace_route).delete(delete_route),
        )
        .fallback(fallback)
}

/// Location of a saved route.
pub fn route_location(id: i64) -> String {
    format!("{}/routes/{}", API_PREFIX, id)
}

// === Request types ===

/// Raw pagination values; bad numbers fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Default)]
pub struct ListRoutesQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListRoutesQuery {
    /// Pick `limit` and `offset` out of decoded query pairs. A repeated key
    /// keeps its first value.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let first = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        };
        Self {
            limit: first("limit"),
            offset: first("offset"),
        }
    }

    fn pagination(&self) -> Pagination {
        Pagination::from_query(self.limit.as_deref(), self.offset.as_deref())
    }
}

/// Ids are positive integers; anything else cannot name a route.
fn parse_route_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(ApiError::NotFound)
}

/// A path segment that cannot even be decoded names no route either.
fn route_id(path: Result<Path<String>, PathRejection>) -> Result<i64, ApiError> {
    let Path(raw) = path.map_err(|_| ApiError::NotFound)?;
    parse_route_id(&raw)
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "uptime": state.uptime().as_secs_f64(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn list_routes(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<RoutePage>, ApiError> {
    let query = match query {
        Ok(Query(pairs)) => ListRoutesQuery::from_pairs(&pairs),
        Err(_) => ListRoutesQuery::default(),
    };
    let page = state.list_routes(query.pagination()).await?;
    Ok(Json(page))
}

async fn create_route(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let input = parse_route_input(&body)?;

    match state.create_route(&input).await? {
        CreateOutcome::Created(route) => Ok((
            StatusCode::CREATED,
            [(header::LOCATION, route_location(route.id))],
            Json(route),
        )
            .into_response()),
        // Already saved: clients treat an empty 204 as success
        CreateOutcome::Duplicate => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

async fn get_route(
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Route>, ApiError> {
    let id = route_id(id)?;
    state
        .get_route(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn replace_route(
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<Json<Route>, ApiError> {
    let id = route_id(id)?;
    let input = parse_route_input(&body)?;

    match state.replace_route(id, &input).await? {
        ReplaceOutcome::Replaced(route) => Ok(Json(route)),
        ReplaceOutcome::NotFound => Err(ApiError::NotFound),
        ReplaceOutcome::Conflict => Err(ApiError::Conflict),
    }
}

async fn delete_route(
    State(state): State<Arc<AppState>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = route_id(id)?;
    if state.delete_route(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

fn is_api_path(path: &str) -> bool {
    path == API_PREFIX || path.starts_with("/api/")
}

/// Unknown API paths get a JSON 404; everything else is the single-page
/// front end, with `index.html` standing in for paths that match no file.
async fn fallback(State(state): State<Arc<AppState>>, request: Request) -> Response {
    if is_api_path(request.uri().path()) {
        return ApiError::NotFound.into_response();
    }

    let static_dir = &state.config().static_dir;
    let spa = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));
    match spa.oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}
