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
use crate::services::employees::{
    ContractRequest, CreateEmployeeRequest, TogglePortalRequest, UpdateEmployeeRequest,
};
use crate::AppState;

async fn create_employee(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<CreateEmployeeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.employees.create_employee(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_employees(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state
        .services
        .employees
        .list_employees(query.page(), query.per_page(&state.config), query.search())
        .await?;
    Ok(Json(Paginated::from(page)))
}

async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.employees.get_employee(id).await?))
}

async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(request): Json<UpdateEmployeeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state.services.employees.update_employee(id, request).await?,
    ))
}

async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.employees.remove_employee(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Enable or disable shop-floor portal access for an employee.
async fn toggle_portal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(request): Json<TogglePortalRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state.services.employees.toggle_portal(id, request).await?,
    ))
}

async fn create_contract(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(request): Json<ContractRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state
        .services
        .employees
        .create_contract(id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_contracts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.employees.list_contracts(id).await?))
}

async fn update_contract(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(request): Json<ContractRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state.services.employees.update_contract(id, request).await?,
    ))
}

async fn delete_contract(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.employees.remove_contract(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn assign_order(
    State(state): State<AppState>,
    Path((id, order_id)): Path<(Uuid, Uuid)>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let assignment = state.services.employees.assign_order(id, order_id).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn unassign_order(
    State(state): State<AppState>,
    Path((id, order_id)): Path<(Uuid, Uuid)>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .employees
        .unassign_order(id, order_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_assigned_orders(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.employees.get_employee(id).await?;
    Ok(Json(
        state.services.employees.list_assigned_orders(id).await?,
    ))
}

pub fn employee_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_employee))
        .route("/", get(list_employees))
        .route("/:id", get(get_employee))
        .route("/:id", put(update_employee))
        .route("/:id", delete(delete_employee))
        .route("/:id/toggle-portal", post(toggle_portal))
        .route("/:id/contracts", post(create_contract))
        .route("/:id/contracts", get(list_contracts))
        .route("/contracts/:id", put(update_contract))
        .route("/contracts/:id", delete(delete_contract))
        .route("/:id/orders/:order_id", post(assign_order))
        .route("/:id/orders/:order_id", delete(unassign_order))
        .route("/:id/orders", get(list_assigned_orders))
}
