use crate::{
    db::DbPool,
    entities::article::{self, ActiveModel as ArticleActiveModel, Entity as ArticleEntity},
    entities::article_critical_issue,
    entities::article_instruction::{self, InstructionKind},
    entities::article_machinery,
    entities::article_material,
    entities::critical_issue,
    entities::las_family,
    entities::machinery,
    entities::material,
    entities::offer,
    entities::production_order,
    errors::ServiceError,
    events::{Event, EventSender},
    services::{codes, PageData},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateArticleRequest {
    pub offer_id: Uuid,
    pub category_id: Option<Uuid>,
    pub pallet_type_id: Option<Uuid>,

    /// Explicit LAS code; generated from the offer's family when absent.
    #[validate(regex(
        path = "crate::validation::LAS_CODE_RE",
        message = "Article code must match LAS{family}{4-digit sequence}"
    ))]
    pub cod_article_las: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Description is required"))]
    pub description: String,

    pub unit_price: Decimal,

    #[validate(range(min = 1, message = "Pieces per pallet must be positive"))]
    pub pieces_per_pallet: Option<i32>,

    #[serde(default)]
    pub material_ids: Vec<Uuid>,
    #[serde(default)]
    pub machinery_ids: Vec<Uuid>,
    #[serde(default)]
    pub critical_issue_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct UpdateArticleRequest {
    pub category_id: Option<Uuid>,
    pub pallet_type_id: Option<Uuid>,

    #[validate(length(min = 1, max = 255, message = "Description cannot be empty"))]
    pub description: Option<String>,

    pub unit_price: Option<Decimal>,

    #[validate(range(min = 1, message = "Pieces per pallet must be positive"))]
    pub pieces_per_pallet: Option<i32>,

    pub material_ids: Option<Vec<Uuid>>,
    pub machinery_ids: Option<Vec<Uuid>>,
    pub critical_issue_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct InstructionRequest {
    pub kind: String,

    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    pub notes: Option<String>,
}

/// Article with its selections resolved, as shown on the detail form.
#[derive(Debug, Serialize)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub article: article::Model,
    pub materials: Vec<material::Model>,
    pub machineries: Vec<machinery::Model>,
    pub critical_issues: Vec<critical_issue::Model>,
    pub instructions: Vec<article_instruction::Model>,
}

/// Service for manufactured articles and their instruction sheets
#[derive(Clone)]
pub struct ArticleService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

/// Replace the active pivot rows of one article with the requested set:
/// rows missing from the set are soft-removed, new ones are inserted.
macro_rules! sync_pivot {
    ($fn_name:ident, $module:ident, $other_field:ident) => {
        async fn $fn_name<C: ConnectionTrait>(
            db: &C,
            article_id: Uuid,
            wanted: &[Uuid],
        ) -> Result<(), ServiceError> {
            let existing = $module::Entity::find()
                .filter($module::Column::ArticleId.eq(article_id))
                .filter($module::Column::Removed.eq(false))
                .all(db)
                .await
                .map_err(ServiceError::DatabaseError)?;

            for row in &existing {
                if !wanted.contains(&row.$other_field) {
                    let mut active: $module::ActiveModel = row.clone().into();
                    active.removed = Set(true);
                    active.update(db).await.map_err(ServiceError::DatabaseError)?;
                }
            }

            for id in wanted {
                if !existing.iter().any(|row| row.$other_field == *id) {
                    $module::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        article_id: Set(article_id),
                        $other_field: Set(*id),
                        removed: Set(false),
                        created_at: Set(Utc::now()),
                    }
                    .insert(db)
                    .await
                    .map_err(ServiceError::DatabaseError)?;
                }
            }

            Ok(())
        }
    };
}

sync_pivot!(sync_materials, article_material, material_id);
sync_pivot!(sync_machineries, article_machinery, machinery_id);
sync_pivot!(sync_critical_issues, article_critical_issue, critical_issue_id);

impl ArticleService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to send article event");
            }
        }
    }

    async fn family_code_of_offer<C: ConnectionTrait>(
        db: &C,
        offer_id: Uuid,
    ) -> Result<String, ServiceError> {
        let parent = offer::Entity::find_by_id(offer_id)
            .filter(offer::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Offer with ID {} not found", offer_id))
            })?;

        let family = las_family::Entity::find_by_id(parent.las_family_id)
            .filter(las_family::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "LAS family with ID {} not found",
                    parent.las_family_id
                ))
            })?;

        Ok(family.code)
    }

    async fn assert_las_code_free<C: ConnectionTrait>(
        db: &C,
        code: &str,
    ) -> Result<(), ServiceError> {
        let duplicate = ArticleEntity::find()
            .filter(article::Column::CodArticleLas.eq(code))
            .filter(article::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Article code {} is already in use",
                code
            )));
        }
        Ok(())
    }

    /// Next free LAS code for a family, without reserving it (the
    /// `get-las-code` endpoint behind the article form).
    #[instrument(skip(self))]
    pub async fn peek_las_code(&self, family_id: Uuid) -> Result<String, ServiceError> {
        let db = &*self.db_pool;

        let family = las_family::Entity::find_by_id(family_id)
            .filter(las_family::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("LAS family with ID {} not found", family_id))
            })?;

        codes::next_las_code(db, &family.code).await
    }

    /// Creates an article under an offer. Code generation, uniqueness
    /// check, insert and pivot rows share one transaction; a generated
    /// code is retried once if a concurrent creation claimed it.
    #[instrument(skip(self, request), fields(offer_id = %request.offer_id))]
    pub async fn create_article(
        &self,
        request: CreateArticleRequest,
    ) -> Result<article::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let generated = request.cod_article_las.is_none();
        let mut attempts = if generated { 2 } else { 1 };

        loop {
            attempts -= 1;

            let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

            let family_code = Self::family_code_of_offer(&txn, request.offer_id).await?;

            let code = match &request.cod_article_las {
                Some(explicit) => {
                    // An explicit code must still belong to the offer's family.
                    let expected_prefix = format!("LAS{}", family_code);
                    if !explicit.starts_with(&expected_prefix) {
                        return Err(ServiceError::ValidationError(format!(
                            "Article code must start with {}",
                            expected_prefix
                        )));
                    }
                    explicit.clone()
                }
                None => codes::next_las_code(&txn, &family_code).await?,
            };

            match Self::assert_las_code_free(&txn, &code).await {
                Ok(()) => {}
                Err(ServiceError::Conflict(_)) if generated && attempts > 0 => {
                    txn.rollback().await.map_err(ServiceError::DatabaseError)?;
                    continue;
                }
                Err(e) => return Err(e),
            }

            let id = Uuid::new_v4();
            let inserted = ArticleActiveModel {
                id: Set(id),
                offer_id: Set(request.offer_id),
                category_id: Set(request.category_id),
                pallet_type_id: Set(request.pallet_type_id),
                cod_article_las: Set(code.clone()),
                description: Set(request.description.clone()),
                unit_price: Set(request.unit_price),
                pieces_per_pallet: Set(request.pieces_per_pallet),
                line_layout: Set(None),
                removed: Set(false),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

            sync_materials(&txn, id, &request.material_ids).await?;
            sync_machineries(&txn, id, &request.machinery_ids).await?;
            sync_critical_issues(&txn, id, &request.critical_issue_ids).await?;

            txn.commit().await.map_err(ServiceError::DatabaseError)?;

            info!(article_id = %id, cod_article_las = %code, "Article created");
            self.emit(Event::ArticleCreated(id)).await;

            return Ok(inserted);
        }
    }

    /// Fetch one active article.
    #[instrument(skip(self))]
    pub async fn get_article(&self, article_id: Uuid) -> Result<article::Model, ServiceError> {
        let db = &*self.db_pool;

        ArticleEntity::find_by_id(article_id)
            .filter(article::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Article with ID {} not found", article_id))
            })
    }

    /// Article with materials, machineries, critical issues and
    /// instructions resolved.
    #[instrument(skip(self))]
    pub async fn get_article_detail(
        &self,
        article_id: Uuid,
    ) -> Result<ArticleDetail, ServiceError> {
        let db = &*self.db_pool;
        let article = self.get_article(article_id).await?;

        let material_ids: Vec<Uuid> = article_material::Entity::find()
            .filter(article_material::Column::ArticleId.eq(article_id))
            .filter(article_material::Column::Removed.eq(false))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|row| row.material_id)
            .collect();

        let machinery_ids: Vec<Uuid> = article_machinery::Entity::find()
            .filter(article_machinery::Column::ArticleId.eq(article_id))
            .filter(article_machinery::Column::Removed.eq(false))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|row| row.machinery_id)
            .collect();

        let issue_ids: Vec<Uuid> = article_critical_issue::Entity::find()
            .filter(article_critical_issue::Column::ArticleId.eq(article_id))
            .filter(article_critical_issue::Column::Removed.eq(false))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|row| row.critical_issue_id)
            .collect();

        let materials = material::Entity::find()
            .filter(material::Column::Id.is_in(material_ids))
            .filter(material::Column::Removed.eq(false))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let machineries = machinery::Entity::find()
            .filter(machinery::Column::Id.is_in(machinery_ids))
            .filter(machinery::Column::Removed.eq(false))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let critical_issues = critical_issue::Entity::find()
            .filter(critical_issue::Column::Id.is_in(issue_ids))
            .filter(critical_issue::Column::Removed.eq(false))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let instructions = self.list_instructions(article_id).await?;

        Ok(ArticleDetail {
            article,
            materials,
            machineries,
            critical_issues,
            instructions,
        })
    }

    /// Paginated listing of active articles; the search term matches the
    /// LAS code, the description or the parent offer number.
    #[instrument(skip(self))]
    pub async fn list_articles(
        &self,
        page: u64,
        per_page: u64,
        search: Option<&str>,
    ) -> Result<PageData<article::Model>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = ArticleEntity::find()
            .filter(article::Column::Removed.eq(false))
            .order_by_asc(article::Column::CodArticleLas);

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term);
            query = query
                .join(JoinType::InnerJoin, article::Relation::Offer.def())
                .filter(
                    Condition::any()
                        .add(article::Column::CodArticleLas.like(&pattern))
                        .add(article::Column::Description.like(&pattern))
                        .add(offer::Column::OfferNumber.like(&pattern)),
                );
        }

        let paginator = query.paginate(db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let items = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(PageData {
            items,
            total,
            page,
            per_page,
        })
    }

    /// Applies a partial update, re-syncing pivot selections when present.
    /// The LAS code and parent offer are immutable after creation.
    #[instrument(skip(self, request))]
    pub async fn update_article(
        &self,
        article_id: Uuid,
        request: UpdateArticleRequest,
    ) -> Result<article::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let existing = self.get_article(article_id).await?;

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let mut active: ArticleActiveModel = existing.into();
        if request.category_id.is_some() {
            active.category_id = Set(request.category_id);
        }
        if request.pallet_type_id.is_some() {
            active.pallet_type_id = Set(request.pallet_type_id);
        }
        if let Some(description) = request.description {
            active.description = Set(description);
        }
        if let Some(price) = request.unit_price {
            active.unit_price = Set(price);
        }
        if request.pieces_per_pallet.is_some() {
            active.pieces_per_pallet = Set(request.pieces_per_pallet);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active
            .update(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if let Some(ids) = &request.material_ids {
            sync_materials(&txn, article_id, ids).await?;
        }
        if let Some(ids) = &request.machinery_ids {
            sync_machineries(&txn, article_id, ids).await?;
        }
        if let Some(ids) = &request.critical_issue_ids {
            sync_critical_issues(&txn, article_id, ids).await?;
        }

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        self.emit(Event::ArticleUpdated(article_id)).await;
        Ok(updated)
    }

    /// Soft-deletes an article. Rejected while it still has active
    /// production orders.
    #[instrument(skip(self))]
    pub async fn remove_article(&self, article_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let existing = self.get_article(article_id).await?;

        let active_orders = production_order::Entity::find()
            .filter(production_order::Column::ArticleId.eq(article_id))
            .filter(production_order::Column::Removed.eq(false))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if active_orders > 0 {
            return Err(ServiceError::InvalidOperation(
                "Cannot delete an article that still has production orders".to_string(),
            ));
        }

        let mut active: ArticleActiveModel = existing.into();
        active.removed = Set(true);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(article_id = %article_id, "Article removed");
        self.emit(Event::ArticleRemoved(article_id)).await;

        Ok(())
    }

    /// Records the stored filename of the line layout drawing.
    #[instrument(skip(self))]
    pub async fn set_line_layout(
        &self,
        article_id: Uuid,
        filename: Option<String>,
    ) -> Result<article::Model, ServiceError> {
        let db = &*self.db_pool;
        let existing = self.get_article(article_id).await?;

        let mut active: ArticleActiveModel = existing.into();
        active.line_layout = Set(filename);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)
    }

    /// Active instructions of an article, grouped by kind in the UI.
    #[instrument(skip(self))]
    pub async fn list_instructions(
        &self,
        article_id: Uuid,
    ) -> Result<Vec<article_instruction::Model>, ServiceError> {
        let db = &*self.db_pool;

        article_instruction::Entity::find()
            .filter(article_instruction::Column::ArticleId.eq(article_id))
            .filter(article_instruction::Column::Removed.eq(false))
            .order_by_asc(article_instruction::Column::Code)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Fetch one active instruction.
    #[instrument(skip(self))]
    pub async fn get_instruction(
        &self,
        instruction_id: Uuid,
    ) -> Result<article_instruction::Model, ServiceError> {
        let db = &*self.db_pool;

        article_instruction::Entity::find_by_id(instruction_id)
            .filter(article_instruction::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Instruction with ID {} not found",
                    instruction_id
                ))
            })
    }

    /// Creates an instruction sheet with a generated per-kind code.
    #[instrument(skip(self, request), fields(article_id = %article_id))]
    pub async fn create_instruction(
        &self,
        article_id: Uuid,
        request: InstructionRequest,
    ) -> Result<article_instruction::Model, ServiceError> {
        request.validate()?;

        let kind = InstructionKind::from_str(&request.kind).map_err(|_| {
            ServiceError::InvalidInput(format!("Unknown instruction kind: {}", request.kind))
        })?;

        let db = &*self.db_pool;
        self.get_article(article_id).await?;

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let code = codes::next_instruction_code(&txn, kind).await?;

        let inserted = article_instruction::ActiveModel {
            id: Set(Uuid::new_v4()),
            article_id: Set(article_id),
            kind: Set(kind.to_string()),
            code: Set(code),
            title: Set(request.title),
            document: Set(None),
            notes: Set(request.notes),
            removed: Set(false),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::DatabaseError)?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        Ok(inserted)
    }

    /// Records the stored filename of the instruction PDF.
    #[instrument(skip(self))]
    pub async fn set_instruction_document(
        &self,
        instruction_id: Uuid,
        filename: Option<String>,
    ) -> Result<article_instruction::Model, ServiceError> {
        let db = &*self.db_pool;
        let existing = self.get_instruction(instruction_id).await?;

        let mut active: article_instruction::ActiveModel = existing.into();
        active.document = Set(filename);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)
    }

    /// Soft-deletes an instruction sheet.
    #[instrument(skip(self))]
    pub async fn remove_instruction(&self, instruction_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let existing = self.get_instruction(instruction_id).await?;

        let mut active: article_instruction::ActiveModel = existing.into();
        active.removed = Set(true);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)?;

        Ok(())
    }
}
