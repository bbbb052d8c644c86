use crate::{
    db::DbPool,
    entities::article,
    entities::customer,
    entities::customer_shipping_address,
    entities::offer,
    entities::production_order::{
        self, ActiveModel as OrderActiveModel, Entity as OrderEntity, OrderStatus, StatusSemaforo,
    },
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
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub article_id: Uuid,
    pub shipping_address_id: Option<Uuid>,

    /// Explicit production number; generated for the current year when
    /// absent.
    #[validate(regex(
        path = "crate::validation::PRODUCTION_NUMBER_RE",
        message = "Production number must match YYYY.NNNN"
    ))]
    pub order_production_number: Option<String>,

    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i32,

    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct UpdateOrderRequest {
    pub shipping_address_id: Option<Uuid>,

    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: Option<i32>,

    #[validate(range(min = 0, message = "Worked quantity cannot be negative"))]
    pub worked_quantity: Option<i32>,

    pub delivery_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub status_semaforo: Option<StatusSemaforo>,
    pub notes: Option<String>,
}

/// Production order enriched with the derived progress fields shown in
/// every order list.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: production_order::Model,
    pub progress_percent: u32,
    pub remaining_quantity: i32,
}

impl From<production_order::Model> for OrderResponse {
    fn from(order: production_order::Model) -> Self {
        let progress_percent = order.progress_percent();
        let remaining_quantity = order.remaining_quantity();
        Self {
            order,
            progress_percent,
            remaining_quantity,
        }
    }
}

/// Service for production orders
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to send order event");
            }
        }
    }

    async fn assert_number_free<C: ConnectionTrait>(
        db: &C,
        number: &str,
    ) -> Result<(), ServiceError> {
        let duplicate = OrderEntity::find()
            .filter(production_order::Column::OrderProductionNumber.eq(number))
            .filter(production_order::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Production number {} is already in use",
                number
            )));
        }
        Ok(())
    }

    /// Next free production number for the current year, without reserving
    /// it.
    #[instrument(skip(self))]
    pub async fn generate_production_number(&self) -> Result<String, ServiceError> {
        codes::next_production_number(&*self.db_pool).await
    }

    /// Creates a production order in `Pianificato`. Number generation,
    /// uniqueness check and insert share one transaction; a generated
    /// number is retried once if a concurrent creation claimed it.
    #[instrument(skip(self, request), fields(article_id = %request.article_id))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let generated = request.order_production_number.is_none();
        let mut attempts = if generated { 2 } else { 1 };

        loop {
            attempts -= 1;

            let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

            article::Entity::find_by_id(request.article_id)
                .filter(article::Column::Removed.eq(false))
                .one(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "Article with ID {} not found",
                        request.article_id
                    ))
                })?;

            if let Some(address_id) = request.shipping_address_id {
                customer_shipping_address::Entity::find_by_id(address_id)
                    .filter(customer_shipping_address::Column::Removed.eq(false))
                    .one(&txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!(
                            "Shipping address with ID {} not found",
                            address_id
                        ))
                    })?;
            }

            let number = match &request.order_production_number {
                Some(explicit) => explicit.clone(),
                None => codes::next_production_number(&txn).await?,
            };

            match Self::assert_number_free(&txn, &number).await {
                Ok(()) => {}
                Err(ServiceError::Conflict(_)) if generated && attempts > 0 => {
                    txn.rollback().await.map_err(ServiceError::DatabaseError)?;
                    continue;
                }
                Err(e) => return Err(e),
            }

            let id = Uuid::new_v4();
            let inserted = OrderActiveModel {
                id: Set(id),
                article_id: Set(request.article_id),
                shipping_address_id: Set(request.shipping_address_id),
                order_production_number: Set(number.clone()),
                quantity: Set(request.quantity),
                worked_quantity: Set(0),
                delivery_date: Set(request.delivery_date),
                status: Set(OrderStatus::Pianificato.to_string()),
                status_semaforo: Set(StatusSemaforo::default()),
                notes: Set(request.notes.clone()),
                removed: Set(false),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

            txn.commit().await.map_err(ServiceError::DatabaseError)?;

            info!(order_id = %id, order_production_number = %number, "Production order created");
            self.emit(Event::OrderCreated(id)).await;

            return Ok(inserted.into());
        }
    }

    /// Fetch one active order.
    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        Ok(self.get_order_model(order_id).await?.into())
    }

    pub(crate) async fn get_order_model(
        &self,
        order_id: Uuid,
    ) -> Result<production_order::Model, ServiceError> {
        let db = &*self.db_pool;

        OrderEntity::find_by_id(order_id)
            .filter(production_order::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order with ID {} not found", order_id))
            })
    }

    /// Paginated listing of active orders, optionally restricted to one
    /// status; the search term matches the production number, the article
    /// code or the customer's business name.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        page: u64,
        per_page: u64,
        search: Option<&str>,
        status: Option<&str>,
    ) -> Result<PageData<OrderResponse>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = OrderEntity::find()
            .filter(production_order::Column::Removed.eq(false))
            .order_by_desc(production_order::Column::CreatedAt);

        if let Some(status) = status.map(str::trim).filter(|s| !s.is_empty()) {
            // Reject unknown statuses instead of silently matching nothing.
            OrderStatus::from_str(status)
                .map_err(|_| ServiceError::InvalidStatus(format!("Unknown status: {}", status)))?;
            query = query.filter(production_order::Column::Status.eq(status));
        }

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term);
            query = query
                .join(JoinType::InnerJoin, production_order::Relation::Article.def())
                .join(JoinType::InnerJoin, article::Relation::Offer.def())
                .join(JoinType::InnerJoin, offer::Relation::Customer.def())
                .filter(
                    Condition::any()
                        .add(production_order::Column::OrderProductionNumber.like(&pattern))
                        .add(article::Column::CodArticleLas.like(&pattern))
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
            items: items.into_iter().map(OrderResponse::from).collect(),
            total,
            page,
            per_page,
        })
    }

    /// Applies a partial update. Raising `worked_quantity` above zero
    /// advances Pianificato/Lanciato to In Avanzamento; an explicit
    /// `status` in the request wins over the derivation.
    #[instrument(skip(self, request))]
    pub async fn update_order(
        &self,
        order_id: Uuid,
        request: UpdateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate()?;

        if let Some(semaforo) = &request.status_semaforo {
            if !semaforo.is_valid() {
                return Err(ServiceError::ValidationError(
                    "Semaphore values must be 0, 1 or 2".to_string(),
                ));
            }
        }

        let explicit_status = match &request.status {
            Some(raw) => Some(
                OrderStatus::from_str(raw)
                    .map_err(|_| ServiceError::InvalidStatus(format!("Unknown status: {}", raw)))?,
            ),
            None => None,
        };

        let db = &*self.db_pool;
        let existing = self.get_order_model(order_id).await?;
        let old_status = existing.status.clone();
        let current_status = OrderStatus::from_str(&existing.status)
            .map_err(|_| ServiceError::InvalidStatus(existing.status.clone()))?;

        let worked = request.worked_quantity.unwrap_or(existing.worked_quantity);

        let new_status = match explicit_status {
            Some(status) => status,
            None if worked > 0 && current_status.advances_on_work() => OrderStatus::InAvanzamento,
            None => current_status,
        };

        let mut active: OrderActiveModel = existing.into();
        if request.shipping_address_id.is_some() {
            active.shipping_address_id = Set(request.shipping_address_id);
        }
        if let Some(quantity) = request.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(worked_quantity) = request.worked_quantity {
            active.worked_quantity = Set(worked_quantity);
        }
        if request.delivery_date.is_some() {
            active.delivery_date = Set(request.delivery_date);
        }
        if let Some(semaforo) = request.status_semaforo {
            active.status_semaforo = Set(semaforo);
        }
        if request.notes.is_some() {
            active.notes = Set(request.notes);
        }
        active.status = Set(new_status.to_string());
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        if old_status != updated.status {
            self.emit(Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status: updated.status.clone(),
            })
            .await;
        } else {
            self.emit(Event::OrderUpdated(order_id)).await;
        }

        Ok(updated.into())
    }

    /// Register quantity produced against an order, advancing the status
    /// on the first logged piece. Shared by the back office and the
    /// shop-floor portal; runs on the caller's transaction.
    pub(crate) async fn apply_worked_delta<C: ConnectionTrait>(
        db: &C,
        order: production_order::Model,
        delta: i32,
    ) -> Result<(production_order::Model, Option<(String, String)>), ServiceError> {
        if delta <= 0 {
            return Err(ServiceError::ValidationError(
                "Processed quantity must be positive".to_string(),
            ));
        }

        let current_status = OrderStatus::from_str(&order.status)
            .map_err(|_| ServiceError::InvalidStatus(order.status.clone()))?;
        let old_status = order.status.clone();

        let new_worked = order.worked_quantity + delta;
        let new_status = if current_status.advances_on_work() {
            OrderStatus::InAvanzamento
        } else {
            current_status
        };

        let mut active: OrderActiveModel = order.into();
        active.worked_quantity = Set(new_worked);
        active.status = Set(new_status.to_string());
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        let transition = if old_status != updated.status {
            Some((old_status, updated.status.clone()))
        } else {
            None
        };

        Ok((updated, transition))
    }

    /// Soft-deletes a production order.
    #[instrument(skip(self))]
    pub async fn remove_order(&self, order_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let existing = self.get_order_model(order_id).await?;

        let mut active: OrderActiveModel = existing.into();
        active.removed = Set(true);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(order_id = %order_id, "Production order removed");
        self.emit(Event::OrderRemoved(order_id)).await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_response_carries_derived_fields() {
        let model = production_order::Model {
            id: Uuid::new_v4(),
            article_id: Uuid::new_v4(),
            shipping_address_id: None,
            order_production_number: "2025.0001".to_string(),
            quantity: 200,
            worked_quantity: 50,
            delivery_date: None,
            status: OrderStatus::InAvanzamento.to_string(),
            status_semaforo: StatusSemaforo::default(),
            notes: None,
            removed: false,
            created_at: Utc::now(),
            updated_at: None,
        };

        let response = OrderResponse::from(model);
        assert_eq!(response.progress_percent, 25);
        assert_eq!(response.remaining_quantity, 150);
    }
}
