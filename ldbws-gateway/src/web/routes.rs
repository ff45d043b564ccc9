//! HTTP route handlers.

use askama::Template;
use axum::body::Bytes;
use axum::{
    Router,
    extract::{OriginalUri, State},
    http::{HeaderValue, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::gateway::BoardQuery;
use crate::ldbws::DEFAULT_PREFIX;

use super::error::AppError;
use super::extract::PathParams;
use super::state::AppState;
use super::templates::{BoardTemplate, BoardView, IndexTemplate};

/// Create the application router.
///
/// The JSON API is served both at the root and under the legacy
/// `/ldbws-rest-proxy/v0.1` prefix; each request path is its own cache key.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/departure-board/:from", get(departure_board))
        .route("/departure-board/:from/:to", get(departure_board_to))
        .route("/arrival-board/:to", get(arrival_board))
        .route("/arrival-board/:to/:from", get(arrival_board_from))
        .route("/service-details/*service_id", get(service_details));

    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/d/:from", get(departures_page))
        .route("/d/:from/:to", get(departures_page_to))
        .merge(api.clone())
        .nest(DEFAULT_PREFIX, api)
        .fallback(no_route)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn no_route(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::no_route(uri.path())
}

// ============================================================================
// JSON API
// ============================================================================

async fn departure_board(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    PathParams(from): PathParams<String>,
) -> Result<Response, AppError> {
    serve_json(&state, uri.path(), BoardQuery::Departures { from, to: None }).await
}

async fn departure_board_to(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    PathParams((from, to)): PathParams<(String, String)>,
) -> Result<Response, AppError> {
    let query = BoardQuery::Departures { from, to: Some(to) };
    serve_json(&state, uri.path(), query).await
}

async fn arrival_board(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    PathParams(to): PathParams<String>,
) -> Result<Response, AppError> {
    serve_json(&state, uri.path(), BoardQuery::Arrivals { to, from: None }).await
}

async fn arrival_board_from(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    PathParams((to, from)): PathParams<(String, String)>,
) -> Result<Response, AppError> {
    let query = BoardQuery::Arrivals { to, from: Some(from) };
    serve_json(&state, uri.path(), query).await
}

/// Service IDs may contain `/`, hence the wildcard capture.
async fn service_details(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    PathParams(service_id): PathParams<String>,
) -> Result<Response, AppError> {
    serve_json(&state, uri.path(), BoardQuery::ServiceDetails { service_id }).await
}

/// Serve `query` through the gateway, keyed by the request path.
async fn serve_json(state: &AppState, path: &str, query: BoardQuery) -> Result<Response, AppError> {
    let body: Bytes = state
        .gateway
        .serve(path, query)
        .await
        .map_err(|e| AppError::from_gateway(path, e))?;

    Ok((
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        body,
    )
        .into_response())
}

// ============================================================================
// HTML view
// ============================================================================

/// Index page listing every known station.
async fn index_page(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Html<String>, AppError> {
    IndexTemplate::new(state.gateway.stations())
        .render()
        .map(Html)
        .map_err(|e| AppError::internal(uri.path(), e))
}

async fn departures_page(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    PathParams(from): PathParams<String>,
) -> Result<Html<String>, AppError> {
    board_page(&state, uri.path(), from, None).await
}

async fn departures_page_to(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    PathParams((from, to)): PathParams<(String, String)>,
) -> Result<Html<String>, AppError> {
    board_page(&state, uri.path(), from, Some(to)).await
}

/// Render a departure board.
///
/// The document is fetched through the gateway under its canonical API path,
/// so the HTML view shares cache entries with upper-case API requests.
async fn board_page(
    state: &AppState,
    path: &str,
    from: String,
    to: Option<String>,
) -> Result<Html<String>, AppError> {
    let key = match &to {
        Some(to) => format!("/departure-board/{}/{}", canonical(&from), canonical(to)),
        None => format!("/departure-board/{}", canonical(&from)),
    };

    let body = state
        .gateway
        .serve(&key, BoardQuery::Departures { from, to })
        .await
        .map_err(|e| AppError::from_gateway(path, e))?;

    let board: BoardView =
        serde_json::from_slice(&body).map_err(|e| AppError::internal(path, e))?;

    BoardTemplate { board }
        .render()
        .map(Html)
        .map_err(|e| AppError::internal(path, e))
}

fn canonical(code: &str) -> String {
    code.to_ascii_uppercase()
}
