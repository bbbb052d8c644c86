//! Lasline back-office API
//!
//! This crate provides the HTTP backend for the Lasline manufacturing
//! back office: customer registry, commercial offers, articles with LAS
//! coding, production orders and the shop-floor production portal.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod storage;
pub mod validation;

use axum::{extract::State, response::Json, routing::get, Router};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use handlers::AppServices;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub auth: Arc<auth::AuthService>,
    pub storage: storage::AttachmentStore,
    pub services: AppServices,
}

/// Envelope for the status and health endpoints
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

/// Versioned API route tree. Authentication is enforced per handler: the
/// back-office resources extract `AuthUser`, the portal extracts its own
/// session token, and `/auth/login`, `/portal/login`, `/status` and
/// `/health` stay public.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .nest("/auth", handlers::auth::auth_routes())
        .nest("/customers", handlers::customers::customer_routes())
        .nest("/offers", handlers::offers::offer_routes())
        .nest("/articles", handlers::articles::article_routes())
        .nest("/orders", handlers::orders::order_routes())
        .nest("/employees", handlers::employees::employee_routes())
        .nest("/dashboard", handlers::dashboard::dashboard_routes())
        .nest("/portal", handlers::portal::portal_routes())
        // Lookup registries
        .nest("/activities", handlers::lookups::activities::routes())
        .nest("/sectors", handlers::lookups::sectors::routes())
        .nest("/seasonalities", handlers::lookups::seasonalities::routes())
        .nest("/order-types", handlers::lookups::order_types::routes())
        .nest("/las-families", handlers::lookups::las_families::routes())
        .nest("/las-work-lines", handlers::lookups::las_work_lines::routes())
        .nest("/ls-resources", handlers::lookups::ls_resources::routes())
        .nest(
            "/article-categories",
            handlers::lookups::article_categories::routes(),
        )
        .nest("/materials", handlers::lookups::materials::routes())
        .nest("/machineries", handlers::lookups::machineries::routes())
        .nest("/pallet-types", handlers::lookups::pallet_types::routes())
        .nest(
            "/critical-issues",
            handlers::lookups::critical_issues::routes(),
        )
        .nest("/suppliers", handlers::lookups::suppliers::routes())
}

/// Full application router, shared by the binary and the test harness.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_routes())
        .with_state(state)
}

async fn api_status() -> Json<ApiResponse<Value>> {
    let version = env!("CARGO_PKG_VERSION");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "service": "lasline-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Json(ApiResponse::success(status_data))
}

async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<Value>> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    Json(ApiResponse::success(health_data))
}
