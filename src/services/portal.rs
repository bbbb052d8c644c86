//! Shop-floor production portal.
//!
//! Factory employees authenticate with badge code + PIN and receive an
//! opaque session token, entirely separate from the back-office JWT
//! session. Tokens are random, stored as SHA-256 digests, and die on
//! logout, on expiry, or when the back office disables the employee's
//! portal access.

use crate::{
    auth::AuthService,
    db::DbPool,
    entities::employee::{self, Entity as EmployeeEntity},
    entities::employee_portal_token::{self, Entity as TokenEntity},
    entities::order_assignment,
    entities::production_log,
    entities::production_order,
    errors::ServiceError,
    events::{Event, EventSender},
    services::orders::{OrderResponse, OrderService},
};
use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

const TOKEN_LENGTH: usize = 48;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PortalLoginRequest {
    #[validate(length(min = 1, max = 50, message = "Employee code is required"))]
    pub employee_code: String,
    #[validate(length(min = 4, max = 12, message = "PIN must be 4-12 characters"))]
    pub pin: String,
}

/// Clear token handed to the client exactly once, plus the employee it
/// belongs to.
#[derive(Debug, Serialize)]
pub struct PortalSession {
    pub token: String,
    pub employee_id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LogProductionRequest {
    #[validate(range(min = 1, message = "Processed quantity must be positive"))]
    pub quantity: i32,
}

/// Service backing the production portal
#[derive(Clone)]
pub struct PortalService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    token_ttl: Duration,
}

fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn generate_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

impl PortalService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        token_ttl: std::time::Duration,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            token_ttl: Duration::from_std(token_ttl).unwrap_or_else(|_| Duration::hours(12)),
        }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to send portal event");
            }
        }
    }

    /// Badge code + PIN login. Succeeds only for active employees with
    /// portal access enabled.
    #[instrument(skip(self, request), fields(employee_code = %request.employee_code))]
    pub async fn login(&self, request: PortalLoginRequest) -> Result<PortalSession, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        let worker = EmployeeEntity::find()
            .filter(employee::Column::EmployeeCode.eq(request.employee_code.clone()))
            .filter(employee::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::AuthError("Invalid badge code or PIN".to_string()))?;

        if !worker.portal_enabled {
            return Err(ServiceError::Forbidden(
                "Portal access is not enabled for this employee".to_string(),
            ));
        }

        let pin_hash = worker
            .portal_pin_hash
            .as_deref()
            .ok_or_else(|| ServiceError::AuthError("Invalid badge code or PIN".to_string()))?;

        if !AuthService::verify_secret(&request.pin, pin_hash)? {
            return Err(ServiceError::AuthError(
                "Invalid badge code or PIN".to_string(),
            ));
        }

        let token = generate_token();
        let now = Utc::now();

        employee_portal_token::ActiveModel {
            id: Set(Uuid::new_v4()),
            employee_id: Set(worker.id),
            token_hash: Set(hash_token(&token)),
            created_at: Set(now),
            expires_at: Set(now + self.token_ttl),
            revoked: Set(false),
        }
        .insert(db)
        .await
        .map_err(ServiceError::DatabaseError)?;

        info!(employee_id = %worker.id, "Portal session opened");
        self.emit(Event::PortalSessionOpened(worker.id)).await;

        Ok(PortalSession {
            token,
            employee_id: worker.id,
            first_name: worker.first_name,
            last_name: worker.last_name,
        })
    }

    /// Resolve a bearer token to its employee. Fails for unknown, expired
    /// or revoked tokens and for employees disabled after login.
    #[instrument(skip(self, token))]
    pub async fn authenticate(&self, token: &str) -> Result<employee::Model, ServiceError> {
        let db = &*self.db_pool;

        let row = TokenEntity::find()
            .filter(employee_portal_token::Column::TokenHash.eq(hash_token(token)))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid portal session".to_string()))?;

        if !row.is_usable(Utc::now()) {
            return Err(ServiceError::Unauthorized(
                "Portal session expired".to_string(),
            ));
        }

        let worker = EmployeeEntity::find_by_id(row.employee_id)
            .filter(employee::Column::Removed.eq(false))
            .filter(employee::Column::PortalEnabled.eq(true))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid portal session".to_string()))?;

        Ok(worker)
    }

    /// Active orders assigned to the logged-in employee, with progress.
    #[instrument(skip(self))]
    pub async fn dashboard(&self, employee_id: Uuid) -> Result<Vec<OrderResponse>, ServiceError> {
        let db = &*self.db_pool;

        let order_ids: Vec<Uuid> = order_assignment::Entity::find()
            .filter(order_assignment::Column::EmployeeId.eq(employee_id))
            .filter(order_assignment::Column::Removed.eq(false))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .map(|row| row.order_id)
            .collect();

        let orders = production_order::Entity::find()
            .filter(production_order::Column::Id.is_in(order_ids))
            .filter(production_order::Column::Removed.eq(false))
            .order_by_asc(production_order::Column::OrderProductionNumber)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(orders.into_iter().map(OrderResponse::from).collect())
    }

    /// Fetch one assigned order for the portal's order page.
    #[instrument(skip(self))]
    pub async fn get_assigned_order(
        &self,
        employee_id: Uuid,
        order_id: Uuid,
    ) -> Result<OrderResponse, ServiceError> {
        let db = &*self.db_pool;

        self.assert_assigned(employee_id, order_id).await?;

        let order = production_order::Entity::find_by_id(order_id)
            .filter(production_order::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order with ID {} not found", order_id))
            })?;

        Ok(order.into())
    }

    async fn assert_assigned(
        &self,
        employee_id: Uuid,
        order_id: Uuid,
    ) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let assignment = order_assignment::Entity::find()
            .filter(order_assignment::Column::EmployeeId.eq(employee_id))
            .filter(order_assignment::Column::OrderId.eq(order_id))
            .filter(order_assignment::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if assignment.is_none() {
            return Err(ServiceError::Forbidden(
                "Order is not assigned to this employee".to_string(),
            ));
        }
        Ok(())
    }

    /// Log processed quantity against an assigned order. The log row and
    /// the order update commit atomically; the first logged piece advances
    /// Pianificato/Lanciato to In Avanzamento.
    #[instrument(skip(self, request), fields(employee_id = %employee_id, order_id = %order_id))]
    pub async fn log_production(
        &self,
        employee_id: Uuid,
        order_id: Uuid,
        request: LogProductionRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        self.assert_assigned(employee_id, order_id).await?;

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let order = production_order::Entity::find_by_id(order_id)
            .filter(production_order::Column::Removed.eq(false))
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order with ID {} not found", order_id))
            })?;

        production_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            employee_id: Set(employee_id),
            quantity: Set(request.quantity),
            logged_at: Set(Utc::now()),
            removed: Set(false),
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::DatabaseError)?;

        let (updated, transition) =
            OrderService::apply_worked_delta(&txn, order, request.quantity).await?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        self.emit(Event::ProductionLogged {
            order_id,
            employee_id,
            quantity: request.quantity,
        })
        .await;

        if let Some((old_status, new_status)) = transition {
            self.emit(Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            })
            .await;
        }

        Ok(updated.into())
    }

    /// Revoke the presented session token.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, token: &str) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let row = TokenEntity::find()
            .filter(employee_portal_token::Column::TokenHash.eq(hash_token(token)))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if let Some(row) = row {
            let employee_id = row.employee_id;
            let mut active: employee_portal_token::ActiveModel = row.into();
            active.revoked = Set(true);
            active.update(db).await.map_err(ServiceError::DatabaseError)?;
            self.emit(Event::PortalSessionClosed(employee_id)).await;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_alphanumeric_and_fixed_length() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn token_hash_is_stable_hex_digest() {
        let token = "abc123";
        assert_eq!(hash_token(token), hash_token(token));
        assert_eq!(hash_token(token).len(), 64);
        assert_ne!(hash_token(token), hash_token("abc124"));
    }
}
