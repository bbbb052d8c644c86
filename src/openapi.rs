use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lasline API",
        version = "0.3.0",
        description = r#"
Back-office API for the Lasline manufacturing plant.

Resources follow REST conventions under `/api/v1`: customers with their
divisions and shipping addresses, commercial offers, articles with LAS
coding and instruction sheets, production orders, employees, and the
lookup registries behind the offer and article forms.

All rows are soft-deleted: `DELETE` marks them removed and every listing
excludes removed rows. List endpoints accept `page`, `per_page` (default
15, max 100) and `search`, and report `current_page`, `last_page` and
`total`.

Back-office endpoints require a JWT from `POST /api/v1/auth/login`. The
shop-floor production portal under `/api/v1/portal` uses its own opaque
session token from `POST /api/v1/portal/login`.
"#
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::handlers::auth::LoginRequest,
        crate::handlers::auth::LoginResponse,
    )),
    tags(
        (name = "customers", description = "Customer registry with divisions and shipping addresses"),
        (name = "offers", description = "Commercial offers and offer-number generation"),
        (name = "articles", description = "Articles, LAS codes, instructions and attachments"),
        (name = "orders", description = "Production orders and progress tracking"),
        (name = "employees", description = "Employees, contracts and order assignments"),
        (name = "portal", description = "Shop-floor production portal"),
        (name = "dashboard", description = "Aggregated order and revenue metrics"),
    )
)]
pub struct ApiDoc;

/// Swagger UI plus the generated OpenAPI document.
pub fn swagger_routes() -> Router<AppState> {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
