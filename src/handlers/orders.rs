use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::common::{ListQuery, Paginated};
use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::orders::{CreateOrderRequest, UpdateOrderRequest};
use crate::AppState;

/// List parameters: the shared pagination/search set plus an optional
/// status filter.
#[derive(Debug, Deserialize)]
struct OrderListQuery {
    #[serde(default = "default_page")]
    page: u64,
    per_page: Option<u64>,
    search: Option<String>,
    status: Option<String>,
}

fn default_page() -> u64 {
    1
}

async fn create_order(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.orders.create_order(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let list_query = ListQuery {
        page: query.page,
        per_page: query.per_page,
        search: query.search,
    };
    let page = state
        .services
        .orders
        .list_orders(
            list_query.page(),
            list_query.per_page(&state.config),
            list_query.search(),
            query.status.as_deref(),
        )
        .await?;
    Ok(Json(Paginated::from(page)))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.orders.get_order(id).await?))
}

async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.orders.update_order(id, request).await?))
}

async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.orders.remove_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Preview the next production number without reserving it.
async fn generate_number(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let number = state.services.orders.generate_production_number().await?;
    Ok(Json(json!({ "order_production_number": number })))
}

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/", get(list_orders))
        .route("/generate-number", get(generate_number))
        .route("/:id", get(get_order))
        .route("/:id", put(update_order))
        .route("/:id", delete(delete_order))
}
