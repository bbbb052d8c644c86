use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;

use super::common::{ListQuery, Paginated};
use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::customers::{
    CreateCustomerRequest, DivisionRequest, ShippingAddressRequest, UpdateCustomerRequest,
};
use crate::AppState;

async fn create_customer(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.customers.create_customer(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state
        .services
        .customers
        .list_customers(query.page(), query.per_page(&state.config), query.search())
        .await?;
    Ok(Json(Paginated::from(page)))
}

async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let customer = state.services.customers.get_customer(id).await?;
    Ok(Json(customer))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.customers.update_customer(id, request).await?;
    Ok(Json(updated))
}

async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.customers.remove_customer(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Divisions of one customer, for the offer form selects.
async fn load_divisions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let divisions = state.services.customers.list_divisions(id).await?;
    Ok(Json(divisions))
}

/// Divisions with their shipping addresses, for the order form.
async fn get_divisions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let tree = state.services.customers.get_division_tree(id).await?;
    Ok(Json(tree))
}

async fn create_division(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(request): Json<DivisionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.customers.create_division(id, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_division(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(request): Json<DivisionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.customers.update_division(id, request).await?;
    Ok(Json(updated))
}

async fn delete_division(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.customers.remove_division(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_shipping_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(request): Json<ShippingAddressRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state
        .services
        .customers
        .create_shipping_address(id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_shipping_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(request): Json<ShippingAddressRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .services
        .customers
        .update_shipping_address(id, request)
        .await?;
    Ok(Json(updated))
}

async fn delete_shipping_address(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.customers.remove_shipping_address(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_customer))
        .route("/", get(list_customers))
        .route("/:id", get(get_customer))
        .route("/:id", put(update_customer))
        .route("/:id", delete(delete_customer))
        .route("/:id/load-divisions", get(load_divisions))
        .route("/:id/get-divisions", get(get_divisions))
        .route("/:id/divisions", post(create_division))
        .route("/divisions/:id", put(update_division))
        .route("/divisions/:id", delete(delete_division))
        .route(
            "/divisions/:id/shipping-addresses",
            post(create_shipping_address),
        )
        .route("/shipping-addresses/:id", put(update_shipping_address))
        .route("/shipping-addresses/:id", delete(delete_shipping_address))
}
