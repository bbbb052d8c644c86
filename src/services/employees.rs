use crate::{
    auth::AuthService,
    db::DbPool,
    entities::employee::{self, ActiveModel as EmployeeActiveModel, Entity as EmployeeEntity},
    entities::employee_contract,
    entities::employee_portal_token,
    entities::order_assignment,
    entities::production_order,
    entities::supplier,
    errors::ServiceError,
    events::{Event, EventSender},
    services::PageData,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateEmployeeRequest {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, max = 50, message = "Employee code is required"))]
    pub employee_code: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct UpdateEmployeeRequest {
    #[validate(length(min = 1, max = 100, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TogglePortalRequest {
    pub enabled: bool,
    /// Required when enabling portal access for the first time; re-sets
    /// the PIN when provided on an already-enabled employee.
    #[validate(length(min = 4, max = 12, message = "PIN must be 4-12 characters"))]
    pub pin: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ContractRequest {
    pub supplier_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100, message = "Contract type is required"))]
    pub contract_type: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Service for employees, their contracts and order assignments
#[derive(Clone)]
pub struct EmployeeService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl EmployeeService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to send employee event");
            }
        }
    }

    /// Creates an employee, rejecting a badge code already used by an
    /// active row.
    #[instrument(skip(self, request), fields(employee_code = %request.employee_code))]
    pub async fn create_employee(
        &self,
        request: CreateEmployeeRequest,
    ) -> Result<employee::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        let duplicate = EmployeeEntity::find()
            .filter(employee::Column::EmployeeCode.eq(request.employee_code.clone()))
            .filter(employee::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "An employee with code {} already exists",
                request.employee_code
            )));
        }

        let id = Uuid::new_v4();
        let model = EmployeeActiveModel {
            id: Set(id),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            employee_code: Set(request.employee_code),
            email: Set(request.email),
            phone: Set(request.phone),
            portal_enabled: Set(false),
            portal_pin_hash: Set(None),
            removed: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::DatabaseError)?;

        info!(employee_id = %id, "Employee created");
        self.emit(Event::EmployeeCreated(id)).await;

        Ok(model)
    }

    /// Fetch one active employee.
    #[instrument(skip(self))]
    pub async fn get_employee(&self, employee_id: Uuid) -> Result<employee::Model, ServiceError> {
        let db = &*self.db_pool;

        EmployeeEntity::find_by_id(employee_id)
            .filter(employee::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Employee with ID {} not found", employee_id))
            })
    }

    /// Paginated listing of active employees, searchable by name or badge
    /// code.
    #[instrument(skip(self))]
    pub async fn list_employees(
        &self,
        page: u64,
        per_page: u64,
        search: Option<&str>,
    ) -> Result<PageData<employee::Model>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = EmployeeEntity::find()
            .filter(employee::Column::Removed.eq(false))
            .order_by_asc(employee::Column::LastName);

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term);
            query = query.filter(
                Condition::any()
                    .add(employee::Column::FirstName.like(&pattern))
                    .add(employee::Column::LastName.like(&pattern))
                    .add(employee::Column::EmployeeCode.like(&pattern)),
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

    /// Applies a partial update to an active employee.
    #[instrument(skip(self, request))]
    pub async fn update_employee(
        &self,
        employee_id: Uuid,
        request: UpdateEmployeeRequest,
    ) -> Result<employee::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let existing = self.get_employee(employee_id).await?;

        let mut active: EmployeeActiveModel = existing.into();
        if let Some(v) = request.first_name {
            active.first_name = Set(v);
        }
        if let Some(v) = request.last_name {
            active.last_name = Set(v);
        }
        if request.email.is_some() {
            active.email = Set(request.email);
        }
        if request.phone.is_some() {
            active.phone = Set(request.phone);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        self.emit(Event::EmployeeUpdated(employee_id)).await;
        Ok(updated)
    }

    /// Soft-deletes an employee and revokes any portal session.
    #[instrument(skip(self))]
    pub async fn remove_employee(&self, employee_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let existing = self.get_employee(employee_id).await?;

        self.revoke_tokens(employee_id).await?;

        let mut active: EmployeeActiveModel = existing.into();
        active.removed = Set(true);
        active.portal_enabled = Set(false);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(employee_id = %employee_id, "Employee removed");
        Ok(())
    }

    /// Enables or disables portal access. Disabling revokes every open
    /// session; enabling requires a PIN on record.
    #[instrument(skip(self, request), fields(employee_id = %employee_id, enabled = request.enabled))]
    pub async fn toggle_portal(
        &self,
        employee_id: Uuid,
        request: TogglePortalRequest,
    ) -> Result<employee::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let existing = self.get_employee(employee_id).await?;

        let pin_hash = match (&request.pin, &existing.portal_pin_hash) {
            (Some(pin), _) => Some(AuthService::hash_secret(pin)?),
            (None, Some(hash)) => Some(hash.clone()),
            (None, None) if request.enabled => {
                return Err(ServiceError::ValidationError(
                    "A PIN is required to enable portal access".to_string(),
                ));
            }
            (None, None) => None,
        };

        if !request.enabled {
            self.revoke_tokens(employee_id).await?;
        }

        let mut active: EmployeeActiveModel = existing.into();
        active.portal_enabled = Set(request.enabled);
        active.portal_pin_hash = Set(pin_hash);
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        self.emit(Event::EmployeePortalToggled {
            employee_id,
            enabled: request.enabled,
        })
        .await;

        Ok(updated)
    }

    async fn revoke_tokens(&self, employee_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let open_tokens = employee_portal_token::Entity::find()
            .filter(employee_portal_token::Column::EmployeeId.eq(employee_id))
            .filter(employee_portal_token::Column::Revoked.eq(false))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        for token in open_tokens {
            let mut active: employee_portal_token::ActiveModel = token.into();
            active.revoked = Set(true);
            active.update(db).await.map_err(ServiceError::DatabaseError)?;
        }

        Ok(())
    }

    /// Adds a contract to an active employee.
    #[instrument(skip(self, request))]
    pub async fn create_contract(
        &self,
        employee_id: Uuid,
        request: ContractRequest,
    ) -> Result<employee_contract::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        self.get_employee(employee_id).await?;

        if let Some(supplier_id) = request.supplier_id {
            supplier::Entity::find_by_id(supplier_id)
                .filter(supplier::Column::Removed.eq(false))
                .one(db)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Supplier with ID {} not found", supplier_id))
                })?;
        }

        if let Some(end) = request.end_date {
            if end < request.start_date {
                return Err(ServiceError::ValidationError(
                    "Contract end date cannot precede its start date".to_string(),
                ));
            }
        }

        employee_contract::ActiveModel {
            id: Set(Uuid::new_v4()),
            employee_id: Set(employee_id),
            supplier_id: Set(request.supplier_id),
            contract_type: Set(request.contract_type),
            start_date: Set(request.start_date),
            end_date: Set(request.end_date),
            removed: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::DatabaseError)
    }

    /// Active contracts of an employee.
    #[instrument(skip(self))]
    pub async fn list_contracts(
        &self,
        employee_id: Uuid,
    ) -> Result<Vec<employee_contract::Model>, ServiceError> {
        let db = &*self.db_pool;
        self.get_employee(employee_id).await?;

        employee_contract::Entity::find()
            .filter(employee_contract::Column::EmployeeId.eq(employee_id))
            .filter(employee_contract::Column::Removed.eq(false))
            .order_by_desc(employee_contract::Column::StartDate)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn get_contract(
        &self,
        contract_id: Uuid,
    ) -> Result<employee_contract::Model, ServiceError> {
        let db = &*self.db_pool;
        employee_contract::Entity::find_by_id(contract_id)
            .filter(employee_contract::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Contract with ID {} not found", contract_id))
            })
    }

    /// Updates an active contract.
    #[instrument(skip(self, request))]
    pub async fn update_contract(
        &self,
        contract_id: Uuid,
        request: ContractRequest,
    ) -> Result<employee_contract::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let existing = self.get_contract(contract_id).await?;

        if let Some(supplier_id) = request.supplier_id {
            supplier::Entity::find_by_id(supplier_id)
                .filter(supplier::Column::Removed.eq(false))
                .one(db)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Supplier with ID {} not found", supplier_id))
                })?;
        }

        if let Some(end) = request.end_date {
            if end < request.start_date {
                return Err(ServiceError::ValidationError(
                    "Contract end date cannot precede its start date".to_string(),
                ));
            }
        }

        let mut active: employee_contract::ActiveModel = existing.into();
        active.supplier_id = Set(request.supplier_id);
        active.contract_type = Set(request.contract_type);
        active.start_date = Set(request.start_date);
        active.end_date = Set(request.end_date);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)
    }

    /// Soft-deletes a contract.
    #[instrument(skip(self))]
    pub async fn remove_contract(&self, contract_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let existing = self.get_contract(contract_id).await?;

        let mut active: employee_contract::ActiveModel = existing.into();
        active.removed = Set(true);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)?;

        Ok(())
    }

    /// Assigns a production order to an employee; re-assigning an active
    /// pair is a no-op.
    #[instrument(skip(self))]
    pub async fn assign_order(
        &self,
        employee_id: Uuid,
        order_id: Uuid,
    ) -> Result<order_assignment::Model, ServiceError> {
        let db = &*self.db_pool;
        self.get_employee(employee_id).await?;

        production_order::Entity::find_by_id(order_id)
            .filter(production_order::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order with ID {} not found", order_id))
            })?;

        let existing = order_assignment::Entity::find()
            .filter(order_assignment::Column::EmployeeId.eq(employee_id))
            .filter(order_assignment::Column::OrderId.eq(order_id))
            .filter(order_assignment::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if let Some(assignment) = existing {
            return Ok(assignment);
        }

        order_assignment::ActiveModel {
            id: Set(Uuid::new_v4()),
            employee_id: Set(employee_id),
            order_id: Set(order_id),
            removed: Set(false),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .map_err(ServiceError::DatabaseError)
    }

    /// Soft-removes an assignment.
    #[instrument(skip(self))]
    pub async fn unassign_order(
        &self,
        employee_id: Uuid,
        order_id: Uuid,
    ) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let existing = order_assignment::Entity::find()
            .filter(order_assignment::Column::EmployeeId.eq(employee_id))
            .filter(order_assignment::Column::OrderId.eq(order_id))
            .filter(order_assignment::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound("Assignment not found".to_string())
            })?;

        let mut active: order_assignment::ActiveModel = existing.into();
        active.removed = Set(true);
        active.update(db).await.map_err(ServiceError::DatabaseError)?;

        Ok(())
    }

    /// Active orders assigned to an employee.
    #[instrument(skip(self))]
    pub async fn list_assigned_orders(
        &self,
        employee_id: Uuid,
    ) -> Result<Vec<production_order::Model>, ServiceError> {
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

        production_order::Entity::find()
            .filter(production_order::Column::Id.is_in(order_ids))
            .filter(production_order::Column::Removed.eq(false))
            .order_by_asc(production_order::Column::OrderProductionNumber)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}
