use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Factory employee. `employee_code` (the badge number) is unique among
/// non-removed rows. Portal access is off until toggled on, which also
/// sets `portal_pin_hash`; the PIN itself is never stored.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,

    #[validate(length(min = 1, max = 50, message = "Employee code is required"))]
    pub employee_code: String,

    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    pub phone: Option<String>,

    pub portal_enabled: bool,
    #[serde(skip_serializing)]
    #[sea_orm(column_type = "Text", nullable)]
    pub portal_pin_hash: Option<String>,

    pub removed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::employee_contract::Entity")]
    Contract,
    #[sea_orm(has_many = "super::employee_portal_token::Entity")]
    PortalToken,
    #[sea_orm(has_many = "super::order_assignment::Entity")]
    OrderAssignment,
    #[sea_orm(has_many = "super::production_log::Entity")]
    ProductionLog,
}

impl Related<super::employee_contract::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contract.def()
    }
}

impl Related<super::employee_portal_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PortalToken.def()
    }
}

impl Related<super::order_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderAssignment.def()
    }
}

impl Related<super::production_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductionLog.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        let now = Utc::now();

        if insert {
            active_model.created_at = Set(now);
        }

        if let ActiveValue::NotSet = active_model.updated_at {
            active_model.updated_at = Set(Some(now));
        }

        Ok(active_model)
    }
}
