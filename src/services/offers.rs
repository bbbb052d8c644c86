use crate::{
    db::DbPool,
    entities::article,
    entities::customer,
    entities::customer_division,
    entities::las_family,
    entities::offer::{self, ActiveModel as OfferActiveModel, Entity as OfferEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{codes, PageData},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateOfferRequest {
    pub customer_id: Uuid,
    pub customer_division_id: Uuid,
    pub las_family_id: Uuid,
    pub activity_id: Option<Uuid>,
    pub sector_id: Option<Uuid>,
    pub seasonality_id: Option<Uuid>,
    pub order_type_id: Option<Uuid>,
    pub las_work_line_id: Option<Uuid>,
    pub ls_resource_id: Option<Uuid>,

    /// Explicit offer number; generated for the current year when absent.
    #[validate(regex(
        path = "crate::validation::OFFER_NUMBER_RE",
        message = "Offer number must match YYYY_NNN_NN_A"
    ))]
    pub offer_number: Option<String>,

    pub offer_date: NaiveDate,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct UpdateOfferRequest {
    pub activity_id: Option<Uuid>,
    pub sector_id: Option<Uuid>,
    pub seasonality_id: Option<Uuid>,
    pub order_type_id: Option<Uuid>,
    pub las_work_line_id: Option<Uuid>,
    pub ls_resource_id: Option<Uuid>,
    pub offer_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Service for commercial offers
#[derive(Clone)]
pub struct OfferService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl OfferService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to send offer event");
            }
        }
    }

    async fn assert_division_of_customer<C: ConnectionTrait>(
        db: &C,
        customer_id: Uuid,
        division_id: Uuid,
    ) -> Result<(), ServiceError> {
        customer::Entity::find_by_id(customer_id)
            .filter(customer::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Customer with ID {} not found", customer_id))
            })?;

        let division = customer_division::Entity::find_by_id(division_id)
            .filter(customer_division::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Division with ID {} not found", division_id))
            })?;

        if division.customer_id != customer_id {
            return Err(ServiceError::ValidationError(
                "Division does not belong to the selected customer".to_string(),
            ));
        }

        Ok(())
    }

    async fn assert_offer_number_free<C: ConnectionTrait>(
        db: &C,
        number: &str,
    ) -> Result<(), ServiceError> {
        let duplicate = OfferEntity::find()
            .filter(offer::Column::OfferNumber.eq(number))
            .filter(offer::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Offer number {} is already in use",
                number
            )));
        }
        Ok(())
    }

    /// Next free offer number for the current year, without reserving it.
    #[instrument(skip(self))]
    pub async fn generate_offer_number(&self) -> Result<String, ServiceError> {
        codes::next_offer_number(&*self.db_pool).await
    }

    /// Creates an offer. Number generation, uniqueness check and insert
    /// share one transaction; a generated number is retried once if a
    /// concurrent creation claimed it between generation and insert.
    #[instrument(skip(self, request), fields(customer_id = %request.customer_id))]
    pub async fn create_offer(
        &self,
        request: CreateOfferRequest,
    ) -> Result<offer::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let generated = request.offer_number.is_none();
        let mut attempts = if generated { 2 } else { 1 };

        loop {
            attempts -= 1;

            let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

            Self::assert_division_of_customer(
                &txn,
                request.customer_id,
                request.customer_division_id,
            )
            .await?;

            las_family::Entity::find_by_id(request.las_family_id)
                .filter(las_family::Column::Removed.eq(false))
                .one(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "LAS family with ID {} not found",
                        request.las_family_id
                    ))
                })?;

            let number = match &request.offer_number {
                Some(explicit) => explicit.clone(),
                None => codes::next_offer_number(&txn).await?,
            };

            match Self::assert_offer_number_free(&txn, &number).await {
                Ok(()) => {}
                Err(ServiceError::Conflict(_)) if generated && attempts > 0 => {
                    // Lost the race on a generated number; regenerate.
                    txn.rollback().await.map_err(ServiceError::DatabaseError)?;
                    continue;
                }
                Err(e) => return Err(e),
            }

            let id = Uuid::new_v4();
            let inserted = OfferActiveModel {
                id: Set(id),
                customer_id: Set(request.customer_id),
                customer_division_id: Set(request.customer_division_id),
                activity_id: Set(request.activity_id),
                sector_id: Set(request.sector_id),
                seasonality_id: Set(request.seasonality_id),
                order_type_id: Set(request.order_type_id),
                las_family_id: Set(request.las_family_id),
                las_work_line_id: Set(request.las_work_line_id),
                ls_resource_id: Set(request.ls_resource_id),
                offer_number: Set(number.clone()),
                offer_date: Set(request.offer_date),
                status: Set(request.status.clone()),
                notes: Set(request.notes.clone()),
                removed: Set(false),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

            txn.commit().await.map_err(ServiceError::DatabaseError)?;

            info!(offer_id = %id, offer_number = %number, "Offer created");
            self.emit(Event::OfferCreated(id)).await;

            return Ok(inserted);
        }
    }

    /// Fetch one active offer.
    #[instrument(skip(self))]
    pub async fn get_offer(&self, offer_id: Uuid) -> Result<offer::Model, ServiceError> {
        let db = &*self.db_pool;

        OfferEntity::find_by_id(offer_id)
            .filter(offer::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Offer with ID {} not found", offer_id)))
    }

    /// Paginated listing of active offers; the search term matches the
    /// offer number or the customer's business name.
    #[instrument(skip(self))]
    pub async fn list_offers(
        &self,
        page: u64,
        per_page: u64,
        search: Option<&str>,
    ) -> Result<PageData<offer::Model>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = OfferEntity::find()
            .filter(offer::Column::Removed.eq(false))
            .order_by_desc(offer::Column::OfferDate);

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term);
            query = query
                .join(JoinType::InnerJoin, offer::Relation::Customer.def())
                .filter(
                    Condition::any()
                        .add(offer::Column::OfferNumber.like(&pattern))
                        .add(customer::Column::BusinessName.like(&pattern)),
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

    /// Applies a partial update. The offer number and the commercial
    /// parties are immutable after creation.
    #[instrument(skip(self, request))]
    pub async fn update_offer(
        &self,
        offer_id: Uuid,
        request: UpdateOfferRequest,
    ) -> Result<offer::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let existing = self.get_offer(offer_id).await?;

        let mut active: OfferActiveModel = existing.into();
        if request.activity_id.is_some() {
            active.activity_id = Set(request.activity_id);
        }
        if request.sector_id.is_some() {
            active.sector_id = Set(request.sector_id);
        }
        if request.seasonality_id.is_some() {
            active.seasonality_id = Set(request.seasonality_id);
        }
        if request.order_type_id.is_some() {
            active.order_type_id = Set(request.order_type_id);
        }
        if request.las_work_line_id.is_some() {
            active.las_work_line_id = Set(request.las_work_line_id);
        }
        if request.ls_resource_id.is_some() {
            active.ls_resource_id = Set(request.ls_resource_id);
        }
        if let Some(date) = request.offer_date {
            active.offer_date = Set(date);
        }
        if request.status.is_some() {
            active.status = Set(request.status);
        }
        if request.notes.is_some() {
            active.notes = Set(request.notes);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        self.emit(Event::OfferUpdated(offer_id)).await;
        Ok(updated)
    }

    /// Soft-deletes an offer. Rejected while it still has active articles.
    #[instrument(skip(self))]
    pub async fn remove_offer(&self, offer_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let existing = self.get_offer(offer_id).await?;

        let active_articles = article::Entity::find()
            .filter(article::Column::OfferId.eq(offer_id))
            .filter(article::Column::Removed.eq(false))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if active_articles > 0 {
            return Err(ServiceError::InvalidOperation(
                "Cannot delete an offer that still has articles".to_string(),
            ));
        }

        let mut active: OfferActiveModel = existing.into();
        active.removed = Set(true);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(offer_id = %offer_id, "Offer removed");
        self.emit(Event::OfferRemoved(offer_id)).await;

        Ok(())
    }
}
