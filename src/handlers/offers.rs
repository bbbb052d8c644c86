use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use super::common::{ListQuery, Paginated};
use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::offers::{CreateOfferRequest, UpdateOfferRequest};
use crate::AppState;

async fn create_offer(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<CreateOfferRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.offers.create_offer(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_offers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state
        .services
        .offers
        .list_offers(query.page(), query.per_page(&state.config), query.search())
        .await?;
    Ok(Json(Paginated::from(page)))
}

async fn get_offer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.offers.get_offer(id).await?))
}

async fn update_offer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(request): Json<UpdateOfferRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.offers.update_offer(id, request).await?))
}

async fn delete_offer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.offers.remove_offer(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Preview the next offer number without reserving it.
async fn generate_number(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let offer_number = state.services.offers.generate_offer_number().await?;
    Ok(Json(json!({ "offer_number": offer_number })))
}

pub fn offer_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_offer))
        .route("/", get(list_offers))
        .route("/generate-number", get(generate_number))
        .route("/:id", get(get_offer))
        .route("/:id", put(update_offer))
        .route("/:id", delete(delete_offer))
}
