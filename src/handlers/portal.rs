//! Production-portal routes. These authenticate with the opaque portal
//! token, never with the back-office JWT.

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path, State},
    http::{header, request::Parts},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::entities::employee;
use crate::errors::ServiceError;
use crate::services::portal::{LogProductionRequest, PortalLoginRequest};
use crate::AppState;

/// The employee behind a valid portal session token.
pub struct PortalWorker(pub employee::Model);

fn portal_token(parts: &Parts) -> Result<String, ServiceError> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
        .ok_or_else(|| ServiceError::Unauthorized("Missing portal token".to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for PortalWorker {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = portal_token(parts)?;
        let worker = state.services.portal.authenticate(&token).await?;
        Ok(PortalWorker(worker))
    }
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<PortalLoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.portal.login(request).await?))
}

/// The employee's assigned orders with progress.
async fn dashboard(
    State(state): State<AppState>,
    PortalWorker(worker): PortalWorker,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.portal.dashboard(worker.id).await?))
}

async fn get_order(
    State(state): State<AppState>,
    PortalWorker(worker): PortalWorker,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state
            .services
            .portal
            .get_assigned_order(worker.id, order_id)
            .await?,
    ))
}

/// Log processed quantity against an assigned order.
async fn log_production(
    State(state): State<AppState>,
    PortalWorker(worker): PortalWorker,
    Path(order_id): Path<Uuid>,
    Json(request): Json<LogProductionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state
            .services
            .portal
            .log_production(worker.id, order_id, request)
            .await?,
    ))
}

async fn logout(
    State(state): State<AppState>,
    parts: axum::http::HeaderMap,
) -> Result<impl IntoResponse, ServiceError> {
    let token = parts
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ServiceError::Unauthorized("Missing portal token".to_string()))?;

    state.services.portal.logout(token).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

pub fn portal_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/dashboard", get(dashboard))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/processings", post(log_production))
        .route("/logout", post(logout))
}
