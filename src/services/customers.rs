use crate::{
    db::DbPool,
    entities::customer::{self, ActiveModel as CustomerActiveModel, Entity as CustomerEntity},
    entities::customer_division::{self, Entity as DivisionEntity},
    entities::customer_shipping_address::{self, Entity as ShippingAddressEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    services::PageData,
};
use chrono::Utc;
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
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 255, message = "Business name is required"))]
    pub business_name: String,
    #[validate(regex(
        path = "crate::validation::VAT_NUMBER_RE",
        message = "VAT number must be 11 digits"
    ))]
    pub vat_number: String,
    pub tax_code: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    #[validate(regex(
        path = "crate::validation::POSTAL_CODE_RE",
        message = "Postal code must be 5 digits"
    ))]
    pub postal_code: Option<String>,
    #[validate(regex(
        path = "crate::validation::PROVINCE_RE",
        message = "Province must be a 2-letter code"
    ))]
    pub province: Option<String>,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 255, message = "Business name cannot be empty"))]
    pub business_name: Option<String>,
    #[validate(regex(
        path = "crate::validation::VAT_NUMBER_RE",
        message = "VAT number must be 11 digits"
    ))]
    pub vat_number: Option<String>,
    pub tax_code: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    #[validate(regex(
        path = "crate::validation::POSTAL_CODE_RE",
        message = "Postal code must be 5 digits"
    ))]
    pub postal_code: Option<String>,
    #[validate(regex(
        path = "crate::validation::PROVINCE_RE",
        message = "Province must be a 2-letter code"
    ))]
    pub province: Option<String>,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct DivisionRequest {
    #[validate(length(min = 1, max = 150, message = "Name is required"))]
    pub name: String,
    pub contact_name: Option<String>,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ShippingAddressRequest {
    #[validate(length(min = 1, max = 150, message = "Label is required"))]
    pub label: String,
    #[validate(length(min = 1, max = 255, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, max = 150, message = "City is required"))]
    pub city: String,
    #[validate(regex(
        path = "crate::validation::POSTAL_CODE_RE",
        message = "Postal code must be 5 digits"
    ))]
    pub postal_code: String,
    #[validate(regex(
        path = "crate::validation::PROVINCE_RE",
        message = "Province must be a 2-letter code"
    ))]
    pub province: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Division with its active shipping addresses, as consumed by the offer
/// and order forms in the view layer.
#[derive(Debug, Serialize)]
pub struct DivisionTree {
    #[serde(flatten)]
    pub division: customer_division::Model,
    pub shipping_addresses: Vec<customer_shipping_address::Model>,
}

/// Service for the customer registry and its division/address tree
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl CustomerService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to send customer event");
            }
        }
    }

    /// Creates a customer, rejecting a VAT number already used by an
    /// active row.
    #[instrument(skip(self, request), fields(vat_number = %request.vat_number))]
    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<customer::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        let duplicate = CustomerEntity::find()
            .filter(customer::Column::VatNumber.eq(request.vat_number.clone()))
            .filter(customer::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A customer with VAT number {} already exists",
                request.vat_number
            )));
        }

        let id = Uuid::new_v4();
        let model = CustomerActiveModel {
            id: Set(id),
            business_name: Set(request.business_name),
            vat_number: Set(request.vat_number),
            tax_code: Set(request.tax_code),
            address: Set(request.address),
            city: Set(request.city),
            postal_code: Set(request.postal_code),
            province: Set(request.province),
            email: Set(request.email),
            phone: Set(request.phone),
            notes: Set(request.notes),
            removed: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::DatabaseError)?;

        info!(customer_id = %id, "Customer created");
        self.emit(Event::CustomerCreated(id)).await;

        Ok(model)
    }

    /// Fetch one active customer.
    #[instrument(skip(self))]
    pub async fn get_customer(&self, customer_id: Uuid) -> Result<customer::Model, ServiceError> {
        let db = &*self.db_pool;

        CustomerEntity::find_by_id(customer_id)
            .filter(customer::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Customer with ID {} not found", customer_id))
            })
    }

    /// Paginated listing of active customers, optionally filtered by a
    /// search term over business name, VAT number and city.
    #[instrument(skip(self))]
    pub async fn list_customers(
        &self,
        page: u64,
        per_page: u64,
        search: Option<&str>,
    ) -> Result<PageData<customer::Model>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = CustomerEntity::find()
            .filter(customer::Column::Removed.eq(false))
            .order_by_asc(customer::Column::BusinessName);

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term);
            query = query.filter(
                Condition::any()
                    .add(customer::Column::BusinessName.like(&pattern))
                    .add(customer::Column::VatNumber.like(&pattern))
                    .add(customer::Column::City.like(&pattern)),
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

    /// Applies a partial update to an active customer.
    #[instrument(skip(self, request))]
    pub async fn update_customer(
        &self,
        customer_id: Uuid,
        request: UpdateCustomerRequest,
    ) -> Result<customer::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let existing = self.get_customer(customer_id).await?;

        if let Some(vat) = &request.vat_number {
            let duplicate = CustomerEntity::find()
                .filter(customer::Column::VatNumber.eq(vat.clone()))
                .filter(customer::Column::Removed.eq(false))
                .filter(customer::Column::Id.ne(customer_id))
                .one(db)
                .await
                .map_err(ServiceError::DatabaseError)?;
            if duplicate.is_some() {
                return Err(ServiceError::Conflict(format!(
                    "A customer with VAT number {} already exists",
                    vat
                )));
            }
        }

        let mut active: CustomerActiveModel = existing.into();
        if let Some(v) = request.business_name {
            active.business_name = Set(v);
        }
        if let Some(v) = request.vat_number {
            active.vat_number = Set(v);
        }
        if request.tax_code.is_some() {
            active.tax_code = Set(request.tax_code);
        }
        if request.address.is_some() {
            active.address = Set(request.address);
        }
        if request.city.is_some() {
            active.city = Set(request.city);
        }
        if request.postal_code.is_some() {
            active.postal_code = Set(request.postal_code);
        }
        if request.province.is_some() {
            active.province = Set(request.province);
        }
        if request.email.is_some() {
            active.email = Set(request.email);
        }
        if request.phone.is_some() {
            active.phone = Set(request.phone);
        }
        if request.notes.is_some() {
            active.notes = Set(request.notes);
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        self.emit(Event::CustomerUpdated(customer_id)).await;
        Ok(updated)
    }

    /// Soft-deletes a customer. Rejected while it still has active
    /// divisions.
    #[instrument(skip(self))]
    pub async fn remove_customer(&self, customer_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let existing = self.get_customer(customer_id).await?;

        let active_divisions = DivisionEntity::find()
            .filter(customer_division::Column::CustomerId.eq(customer_id))
            .filter(customer_division::Column::Removed.eq(false))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if active_divisions > 0 {
            return Err(ServiceError::InvalidOperation(
                "Cannot delete a customer that still has divisions".to_string(),
            ));
        }

        let mut active: CustomerActiveModel = existing.into();
        active.removed = Set(true);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)?;

        info!(customer_id = %customer_id, "Customer removed");
        self.emit(Event::CustomerRemoved(customer_id)).await;

        Ok(())
    }

    /// Active divisions of a customer (the `load-divisions` lookup).
    #[instrument(skip(self))]
    pub async fn list_divisions(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<customer_division::Model>, ServiceError> {
        let db = &*self.db_pool;
        self.get_customer(customer_id).await?;

        DivisionEntity::find()
            .filter(customer_division::Column::CustomerId.eq(customer_id))
            .filter(customer_division::Column::Removed.eq(false))
            .order_by_asc(customer_division::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Division plus shipping-address tree (the `get-divisions` lookup).
    #[instrument(skip(self))]
    pub async fn get_division_tree(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<DivisionTree>, ServiceError> {
        let db = &*self.db_pool;
        let divisions = self.list_divisions(customer_id).await?;

        let mut tree = Vec::with_capacity(divisions.len());
        for division in divisions {
            let shipping_addresses = ShippingAddressEntity::find()
                .filter(customer_shipping_address::Column::DivisionId.eq(division.id))
                .filter(customer_shipping_address::Column::Removed.eq(false))
                .order_by_asc(customer_shipping_address::Column::Label)
                .all(db)
                .await
                .map_err(ServiceError::DatabaseError)?;
            tree.push(DivisionTree {
                division,
                shipping_addresses,
            });
        }

        Ok(tree)
    }

    /// Adds a division to an active customer.
    #[instrument(skip(self, request))]
    pub async fn create_division(
        &self,
        customer_id: Uuid,
        request: DivisionRequest,
    ) -> Result<customer_division::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        self.get_customer(customer_id).await?;

        let model = customer_division::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(customer_id),
            name: Set(request.name),
            contact_name: Set(request.contact_name),
            email: Set(request.email),
            phone: Set(request.phone),
            removed: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::DatabaseError)?;

        Ok(model)
    }

    async fn get_division(
        &self,
        division_id: Uuid,
    ) -> Result<customer_division::Model, ServiceError> {
        let db = &*self.db_pool;
        DivisionEntity::find_by_id(division_id)
            .filter(customer_division::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Division with ID {} not found", division_id))
            })
    }

    /// Updates an active division.
    #[instrument(skip(self, request))]
    pub async fn update_division(
        &self,
        division_id: Uuid,
        request: DivisionRequest,
    ) -> Result<customer_division::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let existing = self.get_division(division_id).await?;

        let mut active: customer_division::ActiveModel = existing.into();
        active.name = Set(request.name);
        active.contact_name = Set(request.contact_name);
        active.email = Set(request.email);
        active.phone = Set(request.phone);
        active.updated_at = Set(Some(Utc::now()));

        active.update(db).await.map_err(ServiceError::DatabaseError)
    }

    /// Soft-deletes a division. Rejected while it still has active
    /// shipping addresses.
    #[instrument(skip(self))]
    pub async fn remove_division(&self, division_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let existing = self.get_division(division_id).await?;

        let active_addresses = ShippingAddressEntity::find()
            .filter(customer_shipping_address::Column::DivisionId.eq(division_id))
            .filter(customer_shipping_address::Column::Removed.eq(false))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if active_addresses > 0 {
            return Err(ServiceError::InvalidOperation(
                "Cannot delete a division that still has shipping addresses".to_string(),
            ));
        }

        let mut active: customer_division::ActiveModel = existing.into();
        active.removed = Set(true);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)?;

        Ok(())
    }

    /// Adds a shipping address to an active division.
    #[instrument(skip(self, request))]
    pub async fn create_shipping_address(
        &self,
        division_id: Uuid,
        request: ShippingAddressRequest,
    ) -> Result<customer_shipping_address::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        self.get_division(division_id).await?;

        let model = customer_shipping_address::ActiveModel {
            id: Set(Uuid::new_v4()),
            division_id: Set(division_id),
            label: Set(request.label),
            address: Set(request.address),
            city: Set(request.city),
            postal_code: Set(request.postal_code),
            province: Set(request.province),
            is_default: Set(request.is_default),
            removed: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::DatabaseError)?;

        Ok(model)
    }

    pub async fn get_shipping_address(
        &self,
        address_id: Uuid,
    ) -> Result<customer_shipping_address::Model, ServiceError> {
        let db = &*self.db_pool;
        ShippingAddressEntity::find_by_id(address_id)
            .filter(customer_shipping_address::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Shipping address with ID {} not found",
                    address_id
                ))
            })
    }

    /// Updates an active shipping address.
    #[instrument(skip(self, request))]
    pub async fn update_shipping_address(
        &self,
        address_id: Uuid,
        request: ShippingAddressRequest,
    ) -> Result<customer_shipping_address::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let existing = self.get_shipping_address(address_id).await?;

        let mut active: customer_shipping_address::ActiveModel = existing.into();
        active.label = Set(request.label);
        active.address = Set(request.address);
        active.city = Set(request.city);
        active.postal_code = Set(request.postal_code);
        active.province = Set(request.province);
        active.is_default = Set(request.is_default);
        active.updated_at = Set(Some(Utc::now()));

        active.update(db).await.map_err(ServiceError::DatabaseError)
    }

    /// Soft-deletes a shipping address.
    #[instrument(skip(self))]
    pub async fn remove_shipping_address(&self, address_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let existing = self.get_shipping_address(address_id).await?;

        let mut active: customer_shipping_address::ActiveModel = existing.into();
        active.removed = Set(true);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)?;

        Ok(())
    }
}
