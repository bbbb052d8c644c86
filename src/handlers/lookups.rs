//! Routers for the lookup registries. The nine name-only registries share
//! one handler set, stamped out per resource by `lookup_router!`; the
//! richer lookups are written out below.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;

use super::common::{file_response, read_upload, ListQuery, Paginated};
use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::lookups::{
    CriticalIssueRequest, LasFamilyRequest, NameRequest, PalletTypeRequest, SupplierRequest,
};
use crate::storage::AttachmentScope;
use crate::AppState;

macro_rules! lookup_router {
    ($mod_name:ident, $create:ident, $get:ident, $list:ident, $update:ident, $remove:ident) => {
        pub mod $mod_name {
            use super::*;

            async fn create(
                State(state): State<AppState>,
                _user: AuthUser,
                Json(request): Json<NameRequest>,
            ) -> Result<impl IntoResponse, ServiceError> {
                let created = state.services.lookups.$create(request).await?;
                Ok((StatusCode::CREATED, Json(created)))
            }

            async fn list(
                State(state): State<AppState>,
                Query(query): Query<ListQuery>,
                _user: AuthUser,
            ) -> Result<impl IntoResponse, ServiceError> {
                let page = state
                    .services
                    .lookups
                    .$list(query.page(), query.per_page(&state.config), query.search())
                    .await?;
                Ok(Json(Paginated::from(page)))
            }

            async fn get_one(
                State(state): State<AppState>,
                Path(id): Path<Uuid>,
                _user: AuthUser,
            ) -> Result<impl IntoResponse, ServiceError> {
                Ok(Json(state.services.lookups.$get(id).await?))
            }

            async fn update(
                State(state): State<AppState>,
                Path(id): Path<Uuid>,
                _user: AuthUser,
                Json(request): Json<NameRequest>,
            ) -> Result<impl IntoResponse, ServiceError> {
                Ok(Json(state.services.lookups.$update(id, request).await?))
            }

            async fn remove(
                State(state): State<AppState>,
                Path(id): Path<Uuid>,
                _user: AuthUser,
            ) -> Result<impl IntoResponse, ServiceError> {
                state.services.lookups.$remove(id).await?;
                Ok(StatusCode::NO_CONTENT)
            }

            pub fn routes() -> Router<AppState> {
                Router::new()
                    .route("/", post(create))
                    .route("/", get(list))
                    .route("/:id", get(get_one))
                    .route("/:id", put(update))
                    .route("/:id", delete(remove))
            }
        }
    };
}

lookup_router!(
    activities,
    create_activity,
    get_activity,
    list_activities,
    update_activity,
    remove_activity
);
lookup_router!(
    sectors,
    create_sector,
    get_sector,
    list_sectors,
    update_sector,
    remove_sector
);
lookup_router!(
    seasonalities,
    create_seasonality,
    get_seasonality,
    list_seasonalities,
    update_seasonality,
    remove_seasonality
);
lookup_router!(
    order_types,
    create_order_type,
    get_order_type,
    list_order_types,
    update_order_type,
    remove_order_type
);
lookup_router!(
    las_work_lines,
    create_las_work_line,
    get_las_work_line,
    list_las_work_lines,
    update_las_work_line,
    remove_las_work_line
);
lookup_router!(
    ls_resources,
    create_ls_resource,
    get_ls_resource,
    list_ls_resources,
    update_ls_resource,
    remove_ls_resource
);
lookup_router!(
    article_categories,
    create_article_category,
    get_article_category,
    list_article_categories,
    update_article_category,
    remove_article_category
);
lookup_router!(
    materials,
    create_material,
    get_material,
    list_materials,
    update_material,
    remove_material
);
lookup_router!(
    machineries,
    create_machinery,
    get_machinery,
    list_machineries,
    update_machinery,
    remove_machinery
);

pub mod las_families {
    use super::*;

    async fn create(
        State(state): State<AppState>,
        _user: AuthUser,
        Json(request): Json<LasFamilyRequest>,
    ) -> Result<impl IntoResponse, ServiceError> {
        let created = state.services.lookups.create_las_family(request).await?;
        Ok((StatusCode::CREATED, Json(created)))
    }

    async fn list(
        State(state): State<AppState>,
        Query(query): Query<ListQuery>,
        _user: AuthUser,
    ) -> Result<impl IntoResponse, ServiceError> {
        let page = state
            .services
            .lookups
            .list_las_families(query.page(), query.per_page(&state.config), query.search())
            .await?;
        Ok(Json(Paginated::from(page)))
    }

    async fn get_one(
        State(state): State<AppState>,
        Path(id): Path<Uuid>,
        _user: AuthUser,
    ) -> Result<impl IntoResponse, ServiceError> {
        Ok(Json(state.services.lookups.get_las_family(id).await?))
    }

    async fn update(
        State(state): State<AppState>,
        Path(id): Path<Uuid>,
        _user: AuthUser,
        Json(request): Json<LasFamilyRequest>,
    ) -> Result<impl IntoResponse, ServiceError> {
        Ok(Json(
            state.services.lookups.update_las_family(id, request).await?,
        ))
    }

    async fn remove(
        State(state): State<AppState>,
        Path(id): Path<Uuid>,
        _user: AuthUser,
    ) -> Result<impl IntoResponse, ServiceError> {
        state.services.lookups.remove_las_family(id).await?;
        Ok(StatusCode::NO_CONTENT)
    }

    pub fn routes() -> Router<AppState> {
        Router::new()
            .route("/", post(create))
            .route("/", get(list))
            .route("/:id", get(get_one))
            .route("/:id", put(update))
            .route("/:id", delete(remove))
    }
}

pub mod pallet_types {
    use super::*;

    async fn create(
        State(state): State<AppState>,
        _user: AuthUser,
        Json(request): Json<PalletTypeRequest>,
    ) -> Result<impl IntoResponse, ServiceError> {
        let created = state.services.lookups.create_pallet_type(request).await?;
        Ok((StatusCode::CREATED, Json(created)))
    }

    async fn list(
        State(state): State<AppState>,
        Query(query): Query<ListQuery>,
        _user: AuthUser,
    ) -> Result<impl IntoResponse, ServiceError> {
        let page = state
            .services
            .lookups
            .list_pallet_types(query.page(), query.per_page(&state.config), query.search())
            .await?;
        Ok(Json(Paginated::from(page)))
    }

    async fn get_one(
        State(state): State<AppState>,
        Path(id): Path<Uuid>,
        _user: AuthUser,
    ) -> Result<impl IntoResponse, ServiceError> {
        Ok(Json(state.services.lookups.get_pallet_type(id).await?))
    }

    async fn update(
        State(state): State<AppState>,
        Path(id): Path<Uuid>,
        _user: AuthUser,
        Json(request): Json<PalletTypeRequest>,
    ) -> Result<impl IntoResponse, ServiceError> {
        Ok(Json(
            state.services.lookups.update_pallet_type(id, request).await?,
        ))
    }

    async fn remove(
        State(state): State<AppState>,
        Path(id): Path<Uuid>,
        _user: AuthUser,
    ) -> Result<impl IntoResponse, ServiceError> {
        state.services.lookups.remove_pallet_type(id).await?;
        Ok(StatusCode::NO_CONTENT)
    }

    /// Attach the technical sheet PDF to a pallet type.
    async fn upload_sheet(
        State(state): State<AppState>,
        Path(id): Path<Uuid>,
        _user: AuthUser,
        multipart: Multipart,
    ) -> Result<impl IntoResponse, ServiceError> {
        state.services.lookups.get_pallet_type(id).await?;

        let (filename, bytes) = read_upload(multipart).await?;
        let stored = state
            .storage
            .save(AttachmentScope::PalletTechnicalSheet, id, &filename, &bytes)
            .await?;

        let updated = state
            .services
            .lookups
            .set_pallet_technical_sheet(id, stored)
            .await?;
        Ok(Json(updated))
    }

    async fn download_sheet(
        State(state): State<AppState>,
        Path(id): Path<Uuid>,
        _user: AuthUser,
    ) -> Result<impl IntoResponse, ServiceError> {
        let pallet = state.services.lookups.get_pallet_type(id).await?;
        let filename = pallet.technical_sheet.ok_or_else(|| {
            ServiceError::NotFound("Pallet type has no technical sheet".to_string())
        })?;

        let bytes = state
            .storage
            .read(AttachmentScope::PalletTechnicalSheet, id, &filename)
            .await?;
        Ok(file_response(&filename, bytes))
    }

    pub fn routes() -> Router<AppState> {
        Router::new()
            .route("/", post(create))
            .route("/", get(list))
            .route("/:id", get(get_one))
            .route("/:id", put(update))
            .route("/:id", delete(remove))
            .route("/:id/technical-sheet", post(upload_sheet))
            .route("/:id/technical-sheet", get(download_sheet))
    }
}

pub mod critical_issues {
    use super::*;

    async fn create(
        State(state): State<AppState>,
        _user: AuthUser,
        Json(request): Json<CriticalIssueRequest>,
    ) -> Result<impl IntoResponse, ServiceError> {
        let created = state.services.lookups.create_critical_issue(request).await?;
        Ok((StatusCode::CREATED, Json(created)))
    }

    async fn list(
        State(state): State<AppState>,
        Query(query): Query<ListQuery>,
        _user: AuthUser,
    ) -> Result<impl IntoResponse, ServiceError> {
        let page = state
            .services
            .lookups
            .list_critical_issues(query.page(), query.per_page(&state.config), query.search())
            .await?;
        Ok(Json(Paginated::from(page)))
    }

    async fn get_one(
        State(state): State<AppState>,
        Path(id): Path<Uuid>,
        _user: AuthUser,
    ) -> Result<impl IntoResponse, ServiceError> {
        Ok(Json(state.services.lookups.get_critical_issue(id).await?))
    }

    async fn update(
        State(state): State<AppState>,
        Path(id): Path<Uuid>,
        _user: AuthUser,
        Json(request): Json<CriticalIssueRequest>,
    ) -> Result<impl IntoResponse, ServiceError> {
        Ok(Json(
            state
                .services
                .lookups
                .update_critical_issue(id, request)
                .await?,
        ))
    }

    async fn remove(
        State(state): State<AppState>,
        Path(id): Path<Uuid>,
        _user: AuthUser,
    ) -> Result<impl IntoResponse, ServiceError> {
        state.services.lookups.remove_critical_issue(id).await?;
        Ok(StatusCode::NO_CONTENT)
    }

    pub fn routes() -> Router<AppState> {
        Router::new()
            .route("/", post(create))
            .route("/", get(list))
            .route("/:id", get(get_one))
            .route("/:id", put(update))
            .route("/:id", delete(remove))
    }
}

pub mod suppliers {
    use super::*;

    async fn create(
        State(state): State<AppState>,
        _user: AuthUser,
        Json(request): Json<SupplierRequest>,
    ) -> Result<impl IntoResponse, ServiceError> {
        let created = state.services.lookups.create_supplier(request).await?;
        Ok((StatusCode::CREATED, Json(created)))
    }

    async fn list(
        State(state): State<AppState>,
        Query(query): Query<ListQuery>,
        _user: AuthUser,
    ) -> Result<impl IntoResponse, ServiceError> {
        let page = state
            .services
            .lookups
            .list_suppliers(query.page(), query.per_page(&state.config), query.search())
            .await?;
        Ok(Json(Paginated::from(page)))
    }

    async fn get_one(
        State(state): State<AppState>,
        Path(id): Path<Uuid>,
        _user: AuthUser,
    ) -> Result<impl IntoResponse, ServiceError> {
        Ok(Json(state.services.lookups.get_supplier(id).await?))
    }

    async fn update(
        State(state): State<AppState>,
        Path(id): Path<Uuid>,
        _user: AuthUser,
        Json(request): Json<SupplierRequest>,
    ) -> Result<impl IntoResponse, ServiceError> {
        Ok(Json(
            state.services.lookups.update_supplier(id, request).await?,
        ))
    }

    async fn remove(
        State(state): State<AppState>,
        Path(id): Path<Uuid>,
        _user: AuthUser,
    ) -> Result<impl IntoResponse, ServiceError> {
        state.services.lookups.remove_supplier(id).await?;
        Ok(StatusCode::NO_CONTENT)
    }

    pub fn routes() -> Router<AppState> {
        Router::new()
            .route("/", post(create))
            .route("/", get(list))
            .route("/:id", get(get_one))
            .route("/:id", put(update))
            .route("/:id", delete(remove))
    }
}
