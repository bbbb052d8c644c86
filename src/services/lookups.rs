//! CRUD over the flat lookup registries referenced by offers and articles.
//!
//! The nine name-only registries share one implementation, stamped out per
//! entity by `lookup_crud!`. The richer lookups (LAS families, pallet
//! types, critical issues, suppliers) are written out below.

use crate::{
    db::DbPool,
    entities::{
        activity, article_category, critical_issue, las_family, las_work_line, ls_resource,
        machinery, material, order_type, pallet_type, seasonality, sector, supplier,
    },
    errors::ServiceError,
    services::PageData,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NameRequest {
    #[validate(length(min = 1, max = 150, message = "Name must be between 1 and 150 characters"))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LasFamilyRequest {
    #[validate(length(min = 1, max = 150, message = "Name must be between 1 and 150 characters"))]
    pub name: String,
    #[validate(regex(
        path = "crate::validation::FAMILY_CODE_RE",
        message = "Family code must be 1-4 uppercase letters or digits"
    ))]
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PalletTypeRequest {
    #[validate(length(min = 1, max = 150, message = "Name must be between 1 and 150 characters"))]
    pub name: String,
    #[validate(range(min = 1, message = "Length must be positive"))]
    pub length_mm: i32,
    #[validate(range(min = 1, message = "Width must be positive"))]
    pub width_mm: i32,
    #[validate(range(min = 1, message = "Height must be positive"))]
    pub height_mm: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CriticalIssueRequest {
    #[validate(length(min = 1, max = 150, message = "Name must be between 1 and 150 characters"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SupplierRequest {
    #[validate(length(min = 1, max = 255, message = "Business name is required"))]
    pub business_name: String,
    #[validate(regex(
        path = "crate::validation::VAT_NUMBER_RE",
        message = "VAT number must be 11 digits"
    ))]
    pub vat_number: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Clone)]
pub struct LookupService {
    db_pool: Arc<DbPool>,
}

impl LookupService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }
}

/// Stamps out create/get/list/update/remove for a name-only registry.
macro_rules! lookup_crud {
    ($module:ident, $label:literal, $create:ident, $get:ident, $list:ident, $update:ident, $remove:ident) => {
        impl LookupService {
            #[instrument(skip(self, request))]
            pub async fn $create(
                &self,
                request: NameRequest,
            ) -> Result<$module::Model, ServiceError> {
                request.validate()?;
                let db = &*self.db_pool;

                let duplicate = $module::Entity::find()
                    .filter($module::Column::Name.eq(request.name.clone()))
                    .filter($module::Column::Removed.eq(false))
                    .one(db)
                    .await
                    .map_err(ServiceError::DatabaseError)?;
                if duplicate.is_some() {
                    return Err(ServiceError::Conflict(format!(
                        concat!("A ", $label, " named {} already exists"),
                        request.name
                    )));
                }

                $module::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    name: Set(request.name),
                    removed: Set(false),
                    ..Default::default()
                }
                .insert(db)
                .await
                .map_err(ServiceError::DatabaseError)
            }

            #[instrument(skip(self))]
            pub async fn $get(&self, id: Uuid) -> Result<$module::Model, ServiceError> {
                let db = &*self.db_pool;
                $module::Entity::find_by_id(id)
                    .filter($module::Column::Removed.eq(false))
                    .one(db)
                    .await
                    .map_err(ServiceError::DatabaseError)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!(
                            concat!("No ", $label, " with ID {}"),
                            id
                        ))
                    })
            }

            #[instrument(skip(self))]
            pub async fn $list(
                &self,
                page: u64,
                per_page: u64,
                search: Option<&str>,
            ) -> Result<PageData<$module::Model>, ServiceError> {
                let db = &*self.db_pool;

                let mut query = $module::Entity::find()
                    .filter($module::Column::Removed.eq(false))
                    .order_by_asc($module::Column::Name);

                if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
                    query = query.filter($module::Column::Name.like(format!("%{}%", term)));
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

            #[instrument(skip(self, request))]
            pub async fn $update(
                &self,
                id: Uuid,
                request: NameRequest,
            ) -> Result<$module::Model, ServiceError> {
                request.validate()?;
                let db = &*self.db_pool;
                let existing = self.$get(id).await?;

                let duplicate = $module::Entity::find()
                    .filter($module::Column::Name.eq(request.name.clone()))
                    .filter($module::Column::Removed.eq(false))
                    .filter($module::Column::Id.ne(id))
                    .one(db)
                    .await
                    .map_err(ServiceError::DatabaseError)?;
                if duplicate.is_some() {
                    return Err(ServiceError::Conflict(format!(
                        concat!("A ", $label, " named {} already exists"),
                        request.name
                    )));
                }

                let mut active: $module::ActiveModel = existing.into();
                active.name = Set(request.name);
                active.updated_at = Set(Some(Utc::now()));
                active.update(db).await.map_err(ServiceError::DatabaseError)
            }

            #[instrument(skip(self))]
            pub async fn $remove(&self, id: Uuid) -> Result<(), ServiceError> {
                let db = &*self.db_pool;
                let existing = self.$get(id).await?;

                let mut active: $module::ActiveModel = existing.into();
                active.removed = Set(true);
                active.updated_at = Set(Some(Utc::now()));
                active.update(db).await.map_err(ServiceError::DatabaseError)?;
                Ok(())
            }
        }
    };
}

lookup_crud!(
    activity,
    "activity",
    create_activity,
    get_activity,
    list_activities,
    update_activity,
    remove_activity
);
lookup_crud!(
    sector,
    "sector",
    create_sector,
    get_sector,
    list_sectors,
    update_sector,
    remove_sector
);
lookup_crud!(
    seasonality,
    "seasonality",
    create_seasonality,
    get_seasonality,
    list_seasonalities,
    update_seasonality,
    remove_seasonality
);
lookup_crud!(
    order_type,
    "order type",
    create_order_type,
    get_order_type,
    list_order_types,
    update_order_type,
    remove_order_type
);
lookup_crud!(
    las_work_line,
    "work line",
    create_las_work_line,
    get_las_work_line,
    list_las_work_lines,
    update_las_work_line,
    remove_las_work_line
);
lookup_crud!(
    ls_resource,
    "resource",
    create_ls_resource,
    get_ls_resource,
    list_ls_resources,
    update_ls_resource,
    remove_ls_resource
);
lookup_crud!(
    article_category,
    "article category",
    create_article_category,
    get_article_category,
    list_article_categories,
    update_article_category,
    remove_article_category
);
lookup_crud!(
    material,
    "material",
    create_material,
    get_material,
    list_materials,
    update_material,
    remove_material
);
lookup_crud!(
    machinery,
    "machinery",
    create_machinery,
    get_machinery,
    list_machineries,
    update_machinery,
    remove_machinery
);

impl LookupService {
    /// Creates a LAS family, rejecting duplicate names or codes among
    /// active rows. The code feeds article code generation.
    #[instrument(skip(self, request))]
    pub async fn create_las_family(
        &self,
        request: LasFamilyRequest,
    ) -> Result<las_family::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let duplicate = las_family::Entity::find()
            .filter(
                sea_orm::Condition::any()
                    .add(las_family::Column::Name.eq(request.name.clone()))
                    .add(las_family::Column::Code.eq(request.code.clone())),
            )
            .filter(las_family::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A LAS family with name {} or code {} already exists",
                request.name, request.code
            )));
        }

        las_family::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            code: Set(request.code),
            removed: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn get_las_family(&self, id: Uuid) -> Result<las_family::Model, ServiceError> {
        let db = &*self.db_pool;
        las_family::Entity::find_by_id(id)
            .filter(las_family::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("No LAS family with ID {}", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_las_families(
        &self,
        page: u64,
        per_page: u64,
        search: Option<&str>,
    ) -> Result<PageData<las_family::Model>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = las_family::Entity::find()
            .filter(las_family::Column::Removed.eq(false))
            .order_by_asc(las_family::Column::Code);

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term);
            query = query.filter(
                sea_orm::Condition::any()
                    .add(las_family::Column::Name.like(&pattern))
                    .add(las_family::Column::Code.like(&pattern)),
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

    #[instrument(skip(self, request))]
    pub async fn update_las_family(
        &self,
        id: Uuid,
        request: LasFamilyRequest,
    ) -> Result<las_family::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let existing = self.get_las_family(id).await?;

        let duplicate = las_family::Entity::find()
            .filter(
                sea_orm::Condition::any()
                    .add(las_family::Column::Name.eq(request.name.clone()))
                    .add(las_family::Column::Code.eq(request.code.clone())),
            )
            .filter(las_family::Column::Removed.eq(false))
            .filter(las_family::Column::Id.ne(id))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A LAS family with name {} or code {} already exists",
                request.name, request.code
            )));
        }

        let mut active: las_family::ActiveModel = existing.into();
        active.name = Set(request.name);
        active.code = Set(request.code);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn remove_las_family(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let existing = self.get_las_family(id).await?;

        let mut active: las_family::ActiveModel = existing.into();
        active.removed = Set(true);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)?;
        Ok(())
    }

    #[instrument(skip(self, request))]
    pub async fn create_pallet_type(
        &self,
        request: PalletTypeRequest,
    ) -> Result<pallet_type::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        pallet_type::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            length_mm: Set(request.length_mm),
            width_mm: Set(request.width_mm),
            height_mm: Set(request.height_mm),
            technical_sheet: Set(None),
            removed: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn get_pallet_type(&self, id: Uuid) -> Result<pallet_type::Model, ServiceError> {
        let db = &*self.db_pool;
        pallet_type::Entity::find_by_id(id)
            .filter(pallet_type::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("No pallet type with ID {}", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_pallet_types(
        &self,
        page: u64,
        per_page: u64,
        search: Option<&str>,
    ) -> Result<PageData<pallet_type::Model>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = pallet_type::Entity::find()
            .filter(pallet_type::Column::Removed.eq(false))
            .order_by_asc(pallet_type::Column::Name);

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(pallet_type::Column::Name.like(format!("%{}%", term)));
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

    #[instrument(skip(self, request))]
    pub async fn update_pallet_type(
        &self,
        id: Uuid,
        request: PalletTypeRequest,
    ) -> Result<pallet_type::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let existing = self.get_pallet_type(id).await?;

        let mut active: pallet_type::ActiveModel = existing.into();
        active.name = Set(request.name);
        active.length_mm = Set(request.length_mm);
        active.width_mm = Set(request.width_mm);
        active.height_mm = Set(request.height_mm);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)
    }

    /// Records the stored filename of the pallet technical sheet.
    #[instrument(skip(self))]
    pub async fn set_pallet_technical_sheet(
        &self,
        id: Uuid,
        filename: String,
    ) -> Result<pallet_type::Model, ServiceError> {
        let db = &*self.db_pool;
        let existing = self.get_pallet_type(id).await?;

        let mut active: pallet_type::ActiveModel = existing.into();
        active.technical_sheet = Set(Some(filename));
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn remove_pallet_type(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let existing = self.get_pallet_type(id).await?;

        let mut active: pallet_type::ActiveModel = existing.into();
        active.removed = Set(true);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)?;
        Ok(())
    }

    #[instrument(skip(self, request))]
    pub async fn create_critical_issue(
        &self,
        request: CriticalIssueRequest,
    ) -> Result<critical_issue::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let duplicate = critical_issue::Entity::find()
            .filter(critical_issue::Column::Name.eq(request.name.clone()))
            .filter(critical_issue::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A critical issue named {} already exists",
                request.name
            )));
        }

        critical_issue::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            description: Set(request.description),
            removed: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn get_critical_issue(
        &self,
        id: Uuid,
    ) -> Result<critical_issue::Model, ServiceError> {
        let db = &*self.db_pool;
        critical_issue::Entity::find_by_id(id)
            .filter(critical_issue::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("No critical issue with ID {}", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_critical_issues(
        &self,
        page: u64,
        per_page: u64,
        search: Option<&str>,
    ) -> Result<PageData<critical_issue::Model>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = critical_issue::Entity::find()
            .filter(critical_issue::Column::Removed.eq(false))
            .order_by_asc(critical_issue::Column::Name);

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(critical_issue::Column::Name.like(format!("%{}%", term)));
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

    #[instrument(skip(self, request))]
    pub async fn update_critical_issue(
        &self,
        id: Uuid,
        request: CriticalIssueRequest,
    ) -> Result<critical_issue::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let existing = self.get_critical_issue(id).await?;

        let mut active: critical_issue::ActiveModel = existing.into();
        active.name = Set(request.name);
        active.description = Set(request.description);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn remove_critical_issue(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let existing = self.get_critical_issue(id).await?;

        let mut active: critical_issue::ActiveModel = existing.into();
        active.removed = Set(true);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)?;
        Ok(())
    }

    #[instrument(skip(self, request))]
    pub async fn create_supplier(
        &self,
        request: SupplierRequest,
    ) -> Result<supplier::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let duplicate = supplier::Entity::find()
            .filter(supplier::Column::VatNumber.eq(request.vat_number.clone()))
            .filter(supplier::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A supplier with VAT number {} already exists",
                request.vat_number
            )));
        }

        supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            business_name: Set(request.business_name),
            vat_number: Set(request.vat_number),
            email: Set(request.email),
            phone: Set(request.phone),
            removed: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn get_supplier(&self, id: Uuid) -> Result<supplier::Model, ServiceError> {
        let db = &*self.db_pool;
        supplier::Entity::find_by_id(id)
            .filter(supplier::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("No supplier with ID {}", id)))
    }

    #[instrument(skip(self))]
    pub async fn list_suppliers(
        &self,
        page: u64,
        per_page: u64,
        search: Option<&str>,
    ) -> Result<PageData<supplier::Model>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = supplier::Entity::find()
            .filter(supplier::Column::Removed.eq(false))
            .order_by_asc(supplier::Column::BusinessName);

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term);
            query = query.filter(
                sea_orm::Condition::any()
                    .add(supplier::Column::BusinessName.like(&pattern))
                    .add(supplier::Column::VatNumber.like(&pattern)),
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

    #[instrument(skip(self, request))]
    pub async fn update_supplier(
        &self,
        id: Uuid,
        request: SupplierRequest,
    ) -> Result<supplier::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let existing = self.get_supplier(id).await?;

        let duplicate = supplier::Entity::find()
            .filter(supplier::Column::VatNumber.eq(request.vat_number.clone()))
            .filter(supplier::Column::Removed.eq(false))
            .filter(supplier::Column::Id.ne(id))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A supplier with VAT number {} already exists",
                request.vat_number
            )));
        }

        let mut active: supplier::ActiveModel = existing.into();
        active.business_name = Set(request.business_name);
        active.vat_number = Set(request.vat_number);
        active.email = Set(request.email);
        active.phone = Set(request.phone);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn remove_supplier(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let existing = self.get_supplier(id).await?;

        let mut active: supplier::ActiveModel = existing.into();
        active.removed = Set(true);
        active.updated_at = Set(Some(Utc::now()));
        active.update(db).await.map_err(ServiceError::DatabaseError)?;
        Ok(())
    }
}
