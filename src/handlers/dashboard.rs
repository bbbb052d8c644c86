use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::dashboard::DashboardQuery;
use crate::AppState;

/// Aggregated order counts, revenue, top customers/articles and a daily
/// trend, filtered by date range and optional customer/status.
async fn metrics(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.dashboard.metrics(query).await?))
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/", get(metrics))
}
