//! Request handlers. Aggregation and drawing run on the blocking pool.

use super::app::AppState;
use super::page;
use crate::charts::{ChartError, ChartKind, StaticChartRenderer};
use crate::data::FilterOptions;
use crate::stats::{AggregateError, Aggregator, DashboardFilters, DashboardSummary};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unknown chart '{0}'")]
    UnknownChart(String),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error("Failed to render page: {0}")]
    Template(#[from] askama::Error),
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::UnknownChart(_) => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            err => {
                log::error!("Request failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// GET /
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    Ok(Html(page::render(state.table.options())?))
}

/// GET /api/options
pub async fn options(State(state): State<AppState>) -> Json<FilterOptions> {
    Json(state.table.options().clone())
}

/// GET /api/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Query(filters): Query<DashboardFilters>,
) -> Result<Json<DashboardSummary>, ApiError> {
    log::debug!("Dashboard request with {:?}", filters);
    let summary =
        tokio::task::spawn_blocking(move || Aggregator::summary(&state.table, &filters)).await??;
    Ok(Json(summary))
}

/// GET /charts/{kind}
pub async fn chart(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(filters): Query<DashboardFilters>,
) -> Result<Response, ApiError> {
    let kind: ChartKind = kind.parse().map_err(|_| ApiError::UnknownChart(kind))?;
    log::debug!("Rendering {} with {:?}", kind, filters);
    let svg = tokio::task::spawn_blocking(move || StaticChartRenderer::render(kind, &state, &filters))
        .await??;
    Ok((
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        svg,
    )
        .into_response())
}

/// GET /healthz
pub async fn healthz() -> &'static str {
    "ok"
}
