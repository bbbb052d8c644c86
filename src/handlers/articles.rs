use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::common::{file_response, read_upload, ListQuery, Paginated};
use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::articles::{
    CreateArticleRequest, InstructionRequest, UpdateArticleRequest,
};
use crate::storage::AttachmentScope;
use crate::AppState;

#[derive(Debug, Deserialize)]
struct LasCodeQuery {
    family_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct CopyLayoutRequest {
    target_article_id: Uuid,
}

async fn create_article(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<CreateArticleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.articles.create_article(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state
        .services
        .articles
        .list_articles(query.page(), query.per_page(&state.config), query.search())
        .await?;
    Ok(Json(Paginated::from(page)))
}

/// Article detail with materials, machineries, critical issues and
/// instructions resolved.
async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.articles.get_article_detail(id).await?))
}

async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(request): Json<UpdateArticleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(
        state.services.articles.update_article(id, request).await?,
    ))
}

async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.articles.remove_article(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Preview the next LAS code for a family without reserving it.
async fn get_las_code(
    State(state): State<AppState>,
    Query(query): Query<LasCodeQuery>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let cod_article_las = state.services.articles.peek_las_code(query.family_id).await?;
    Ok(Json(json!({ "cod_article_las": cod_article_las })))
}

async fn upload_line_layout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.articles.get_article(id).await?;

    let (filename, bytes) = read_upload(multipart).await?;
    let stored = state
        .storage
        .save(AttachmentScope::ArticleLineLayout, id, &filename, &bytes)
        .await?;

    let updated = state
        .services
        .articles
        .set_line_layout(id, Some(stored))
        .await?;
    Ok(Json(updated))
}

async fn download_line_layout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let article = state.services.articles.get_article(id).await?;
    let filename = article
        .line_layout
        .ok_or_else(|| ServiceError::NotFound("Article has no line layout".to_string()))?;

    let bytes = state
        .storage
        .read(AttachmentScope::ArticleLineLayout, id, &filename)
        .await?;
    Ok(file_response(&filename, bytes))
}

/// Duplicate the line layout of one article onto another, used when a new
/// article is cloned from an offer template.
async fn copy_line_layout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(request): Json<CopyLayoutRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let source = state.services.articles.get_article(id).await?;
    let filename = source
        .line_layout
        .ok_or_else(|| ServiceError::NotFound("Article has no line layout".to_string()))?;

    state
        .services
        .articles
        .get_article(request.target_article_id)
        .await?;

    let stored = state
        .storage
        .copy(
            AttachmentScope::ArticleLineLayout,
            id,
            AttachmentScope::ArticleLineLayout,
            request.target_article_id,
            &filename,
        )
        .await?;

    let updated = state
        .services
        .articles
        .set_line_layout(request.target_article_id, Some(stored))
        .await?;
    Ok(Json(updated))
}

async fn create_instruction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    Json(request): Json<InstructionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state
        .services
        .articles
        .create_instruction(id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_instructions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.articles.get_article(id).await?;
    Ok(Json(state.services.articles.list_instructions(id).await?))
}

async fn get_instruction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.articles.get_instruction(id).await?))
}

async fn delete_instruction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.articles.remove_instruction(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_instruction_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.articles.get_instruction(id).await?;

    let (filename, bytes) = read_upload(multipart).await?;
    let stored = state
        .storage
        .save(AttachmentScope::InstructionDocument, id, &filename, &bytes)
        .await?;

    let updated = state
        .services
        .articles
        .set_instruction_document(id, Some(stored))
        .await?;
    Ok(Json(updated))
}

async fn download_instruction_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let instruction = state.services.articles.get_instruction(id).await?;
    let filename = instruction
        .document
        .ok_or_else(|| ServiceError::NotFound("Instruction has no document".to_string()))?;

    let bytes = state
        .storage
        .read(AttachmentScope::InstructionDocument, id, &filename)
        .await?;
    Ok(file_response(&filename, bytes))
}

pub fn article_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_article))
        .route("/", get(list_articles))
        .route("/get-las-code", get(get_las_code))
        .route("/:id", get(get_article))
        .route("/:id", put(update_article))
        .route("/:id", delete(delete_article))
        .route("/:id/line-layout", post(upload_line_layout))
        .route("/:id/line-layout", get(download_line_layout))
        .route("/:id/line-layout/copy", post(copy_line_layout))
        .route("/:id/instructions", post(create_instruction))
        .route("/:id/instructions", get(list_instructions))
        .route("/instructions/:id", get(get_instruction))
        .route("/instructions/:id", delete(delete_instruction))
        .route(
            "/instructions/:id/document",
            post(upload_instruction_document),
        )
        .route(
            "/instructions/:id/document",
            get(download_instruction_document),
        )
}
